//! Host-document boundaries.
//!
//! The engine never touches a real rendering surface directly. Everything it
//! needs from the host (the set of known stylesheets, a place to publish
//! generated override text, class tokens on rendering-tree nodes, and image
//! preloading) is expressed as a trait here, so the same pipeline runs
//! against a browser bridge, a server-side renderer, or the in-memory
//! implementations used by the test suite.
//!
//! # Example
//!
//! ```rust
//! use style_shifter::{MemorySink, StaticSheets, StyleSource};
//!
//! let sheets = StaticSheets::new()
//!     .add("app.css", ".btn { /*![demo.bg]*/ background: red; }");
//! assert_eq!(sheets.origins(), vec!["app.css".to_string()]);
//!
//! let sink = MemorySink::new();
//! assert!(sink.get("style-shifter-demo").is_none());
//! ```

use std::collections::HashMap;

use crate::error::SourceError;
use crate::theme::DependencySignal;

/// Provides stylesheet source text to the processor.
///
/// Origins are opaque identifiers (typically URLs). [`fetch`](Self::fetch)
/// may fail (cross-origin restrictions, network errors) and the processor
/// skips the failing sheet and keeps scanning the rest.
pub trait StyleSource {
    /// Every known stylesheet origin, in discovery order.
    ///
    /// Discovery order is significant: it is the first key of override
    /// precedence (earlier sheets win ties).
    fn origins(&self) -> Vec<String>;

    /// Fetches the source text for one origin.
    fn fetch(&self, origin: &str) -> Result<String, SourceError>;
}

/// Receives the synthesized override text.
///
/// A block is a named, replaceable unit of style text owned by one processor
/// namespace; publishing replaces the block's previous content wholesale.
pub trait StyleSink {
    /// Publishes `css` under `block`, replacing any previous content.
    fn publish(&mut self, block: &str, css: &str);
}

/// Class tokens on a rendering-tree node.
///
/// Themes attach to nodes by class name; see
/// [`Theme::apply_to`](crate::Theme::apply_to).
pub trait ClassList {
    /// Returns `true` when the token is present.
    fn contains_class(&self, name: &str) -> bool;

    /// Adds the token.
    fn add_class(&mut self, name: &str);

    /// Removes the token if present.
    fn remove_class(&mut self, name: &str);
}

/// Asynchronously resolves a theme's image dependencies.
///
/// Implementations start loading `url` and invoke
/// [`DependencySignal::finish`] when the load settles. Success and failure
/// both count as settled; the theme only cares that the dependency is no
/// longer pending.
pub trait ImagePreloader {
    /// Begins loading `url`; `signal` must be finished exactly once.
    fn preload(&self, url: &str, signal: DependencySignal);
}

/// An in-memory [`StyleSource`] over a fixed list of sheets.
#[derive(Debug, Clone, Default)]
pub struct StaticSheets {
    sheets: Vec<(String, String)>,
}

impl StaticSheets {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet, returning `self` for chaining.
    pub fn add(mut self, origin: impl Into<String>, text: impl Into<String>) -> Self {
        self.sheets.push((origin.into(), text.into()));
        self
    }
}

impl StyleSource for StaticSheets {
    fn origins(&self) -> Vec<String> {
        self.sheets.iter().map(|(origin, _)| origin.clone()).collect()
    }

    fn fetch(&self, origin: &str) -> Result<String, SourceError> {
        self.sheets
            .iter()
            .find(|(candidate, _)| candidate == origin)
            .map(|(_, text)| text.clone())
            .ok_or_else(|| SourceError::Fetch {
                origin: origin.to_string(),
                message: "unknown origin".to_string(),
            })
    }
}

/// An in-memory [`StyleSink`] keeping the last published text per block.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    blocks: HashMap<String, String>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current content of a block, if it was ever published.
    pub fn get(&self, block: &str) -> Option<&str> {
        self.blocks.get(block).map(String::as_str)
    }
}

impl StyleSink for MemorySink {
    fn publish(&mut self, block: &str, css: &str) {
        self.blocks.insert(block.to_string(), css.to_string());
    }
}

/// An in-memory [`ClassList`], standing in for a rendering-tree node.
#[derive(Debug, Clone, Default)]
pub struct ClassSet {
    classes: Vec<String>,
}

impl ClassSet {
    /// Creates an empty class set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current tokens, in insertion order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl ClassList for ClassSet {
    fn contains_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }

    fn add_class(&mut self, name: &str) {
        self.classes.push(name.to_string());
    }

    fn remove_class(&mut self, name: &str) {
        self.classes.retain(|c| c != name);
    }
}
