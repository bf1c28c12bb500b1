//! Error types for the stylesheet and theme-loading boundaries.
//!
//! The processing pipeline itself never propagates errors: failed fetches,
//! failed expressions, and duplicate overrides are all absorbed internally
//! (see the crate docs). These types exist for the two surfaces where a
//! caller-visible error is meaningful: retrieving stylesheet text through a
//! [`StyleSource`](crate::StyleSource), and loading theme definitions from
//! files.

use thiserror::Error;

/// Errors produced by [`StyleSource`](crate::StyleSource) implementations.
///
/// The processor treats every variant the same way: the offending stylesheet
/// is logged and skipped, and scanning continues with the remaining sheets.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The stylesheet could not be retrieved.
    #[error("failed to fetch stylesheet {origin}: {message}")]
    Fetch { origin: String, message: String },

    /// The stylesheet exists but its text is not readable from this origin.
    #[error("stylesheet {origin} is not readable from this origin")]
    CrossOrigin { origin: String },
}

/// Errors produced when loading a [`Theme`](crate::Theme) from a document.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The theme file could not be read.
    #[error("failed to read theme file: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not a valid theme definition.
    #[error("failed to parse theme: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Fetch {
            origin: "app.css".into(),
            message: "timed out".into(),
        };
        assert!(err.to_string().contains("app.css"));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_theme_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ThemeError = io.into();
        assert!(matches!(err, ThemeError::Io(_)));
    }
}
