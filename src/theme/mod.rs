//! Themes and cascading defaults.
//!
//! A [`Theme`] is a named data set (a nested mapping of design values)
//! bound to a namespace, with an optional font mapping and an asynchronous
//! "ready" lifecycle gated on external dependencies such as image preloads.
//!
//! [`CascadeRegistry`] holds ordered lists of fallback data per namespace;
//! applying a cascade fills in fields a theme's data leaves unset, so a
//! family of themes can share defaults without repeating them.

mod cascade;
#[allow(clippy::module_inception)]
mod theme;

pub use cascade::CascadeRegistry;
pub use theme::{DependencySignal, Theme, ThemeSpec};
