//! # Style Shifter - Expression-Based Stylesheet Override Engine
//!
//! `style-shifter` derives theme-scoped override stylesheets from ordinary
//! CSS annotated with marker comments. A marker embeds one expression
//! immediately before the declaration it overrides:
//!
//! ```css
//! .button {
//!     /*![demo.bg]*/ background: #fafafa;
//!     /*![opacify(demo.accent, 0.5)]*/ border-color: #ddd;
//! }
//! ```
//!
//! Adding a theme named `dark` with data `{ "bg": "#000", ... }` produces a
//! published override block containing `.dark .button { background: #000;
//! ... }`. The original stylesheet is never modified, and the overrides
//! only apply beneath a node carrying the theme's class token.
//!
//! ## Core Concepts
//!
//! - [`CssProcessor`]: scans stylesheets, evaluates markers, accumulates
//!   overrides, and publishes one replaceable block per namespace
//! - [`Theme`]: a named data set with fonts and an asynchronous ready
//!   lifecycle gated on external dependencies
//! - [`CascadeRegistry`]: ordered fallback data per namespace, filling in
//!   fields a theme's data leaves unset
//! - Marker functions: built-ins (`url`, `toPx`, `toRem`, `opacify`,
//!   `tint`, `invert`, `printf`, `mapSvgColors`, `local`, `global`,
//!   `setRuleScope`) plus anything registered via
//!   [`CssProcessor::register_function`]
//! - Host boundaries: [`StyleSource`], [`StyleSink`], [`ClassList`], and
//!   [`ImagePreloader`] traits, with in-memory implementations for tests
//!   and embedding
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use style_shifter::{ClassList, ClassSet, CssProcessor, MemorySink, StaticSheets, Theme};
//!
//! let sheets = StaticSheets::new().add(
//!     "app.css",
//!     ".button { /*![demo.bg]*/ background: red; }",
//! );
//!
//! let mut processor = CssProcessor::new(
//!     "demo",
//!     Box::new(sheets),
//!     Box::new(MemorySink::new()),
//! );
//!
//! let theme = Theme::new("demo", "dark", json!({ "bg": "#000" }));
//! theme.settle();
//! processor.add_theme(&theme);
//!
//! // Attach the theme to a node; the published overrides now apply to it.
//! let mut node = ClassSet::new();
//! theme.apply_to(&mut node);
//! assert!(node.contains_class("dark"));
//! ```
//!
//! ## Failure Model
//!
//! Nothing in the pipeline throws to its caller. Unreachable stylesheets
//! are skipped, failed marker expressions record nothing, unknown functions
//! and unresolvable paths quietly produce no result, and duplicate
//! (rule, property) overrides are dropped at synthesis; first writer wins.
//! Failures worth knowing about are reported through the [`log`] facade.
//!
//! ## Scanning, Not Parsing
//!
//! The engine intentionally scans stylesheet text by position instead of
//! tokenizing it: markers are located by substring search and their CSS
//! context is recovered by walking the surrounding text. That makes the
//! engine cheap and tolerant of anything a browser would accept, at the
//! cost of undefined (but non-panicking) behavior when markers hide inside
//! string literals or comments containing braces.

mod defines;
mod document;
mod error;
mod expr;
mod functions;
mod processor;
mod theme;
mod util;

// Error types
pub use error::{SourceError, ThemeError};

// Processor exports
pub use processor::{CssProcessor, Override, OverrideHook};

// Theme exports
pub use theme::{CascadeRegistry, DependencySignal, Theme, ThemeSpec};

// Host boundary exports
pub use document::{
    ClassList, ClassSet, ImagePreloader, MemorySink, StaticSheets, StyleSink, StyleSource,
};

// Variable store exports
pub use defines::{Defines, GlobalDefines};

// Marker function surface
pub use functions::{parse_css_color, value_to_string, EvalContext, Invocation, Rgba};

// Utility exports
pub use util::{format_number, leading_float};
