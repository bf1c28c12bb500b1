//! Positional extraction of a marker's CSS context.
//!
//! The engine deliberately does not tokenize CSS. Every question it asks
//! about the source text (which property follows a marker, whether the
//! declaration is `!important`, which selector encloses it) is answered by
//! substring scanning around the marker's byte offset. This is cheap, works
//! on any well-formed stylesheet, and is isolated in this module so a real
//! tokenizer could replace it without touching evaluation or the store.
//!
//! All scanning is offset-based on `&str`. The delimiters involved are all
//! ASCII, so positions found by `find`/`rfind` are always char boundaries;
//! pathological input (markers inside string literals, braces in `content`
//! values) produces unspecified context but never a panic.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::util::{strip_whitespace, trim_css};

/// Token closing a marker comment; the property name follows it.
const MARKER_CLOSE: &str = "]*/";

/// How far past the `:` to look when testing for `!important`.
const IMPORTANT_LOOKAHEAD: usize = 100;

/// Matches a declaration value up to its terminator, within the bounded
/// lookahead window. `.` excludes newlines, so the value must sit on the
/// marker's line.
static DECLARATION_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":(.+?)([;}])").expect("declaration-value pattern"));

/// Matches the original declaration value after a marker, stopping at the
/// declaration terminator, a comment opener, a closing brace, or the end of
/// the scanned window.
static ORIGINAL_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":(.*?)([;/}]|$)").expect("original-value pattern"));

/// Collapses runs of two or more spaces to a single space.
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"  +").expect("multi-space pattern"));

/// The CSS context extracted around one marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RuleContext {
    /// The property name the marker precedes; empty when none was found.
    pub property: String,
    /// The canonical raw rule name enclosing the marker; empty when none
    /// was found.
    pub rule_name: String,
    /// Whether the declaration carries `!important`.
    pub important: bool,
}

/// Extracts the property, enclosing rule name, and important flag for the
/// marker starting at `marker`.
pub(crate) fn rule_context(src: &str, marker: usize) -> RuleContext {
    let mut result = RuleContext::default();

    let Some(close) = src.get(marker..).and_then(|tail| tail.find(MARKER_CLOSE)) else {
        return result;
    };
    let prop_start = marker + close + MARKER_CLOSE.len();
    let Some(colon) = src[prop_start..].find(':') else {
        return result;
    };
    let prop_end = prop_start + colon;

    result.property = strip_whitespace(&src[prop_start..prop_end]);

    let window: String = src[prop_end..].chars().take(IMPORTANT_LOOKAHEAD).collect();
    result.important = DECLARATION_VALUE
        .captures(&window)
        .is_some_and(|captures| captures[1].contains("!important"));

    if result.property.is_empty() {
        return result;
    }

    let Some(block_open) = src[..prop_start].rfind('{') else {
        return result;
    };

    // Walk back from the enclosing block toward the previous rule boundary,
    // an at-rule opener, or the start of text.
    let bytes = src.as_bytes();
    let mut i = block_open;
    loop {
        match bytes[i] {
            b'}' => {
                result.rule_name = extract_rule_name(src, block_open, false);
                break;
            }
            b'@' => {
                result.rule_name = extract_rule_name(src, block_open, true);
                break;
            }
            _ => {}
        }
        if i == 0 {
            result.rule_name = extract_rule_name(src, block_open, false);
            break;
        }
        i -= 1;
    }

    result
}

/// Extracts and canonicalizes the rule name enclosing `index`.
///
/// The captured span runs from just past the previous `}` (or from the `@`
/// of an enclosing at-rule, or from the start of text) up to the nearest
/// `{` at or before `index`. Canonicalization collapses multi-space runs,
/// splits on commas, trims each piece, and rejoins with commas.
pub(crate) fn extract_rule_name(src: &str, index: usize, at_rule: bool) -> String {
    let search_end = (index + 1).min(src.len());
    let Some(end) = src[..search_end].rfind('{') else {
        return String::new();
    };

    let start = if at_rule {
        src[..end].rfind('@').unwrap_or(0)
    } else {
        src[..end].rfind('}').map_or(0, |p| p + 1)
    };

    let collapsed = MULTI_SPACE.replace_all(&src[start..end], " ");
    collapsed
        .split(',')
        .map(trim_css)
        .collect::<Vec<_>>()
        .join(",")
}

/// Extracts the original declaration value following the marker at
/// `marker`, for `%value%` references.
///
/// Scans from the marker to the next `}` and takes the text between the
/// first `:` and the declaration terminator.
pub(crate) fn original_value(src: &str, marker: usize) -> Option<String> {
    let window_end = src[marker..].find('}').map(|i| marker + i)?;
    let captures = ORIGINAL_VALUE.captures(&src[marker..window_end])?;
    Some(captures[1].trim().to_string())
}
