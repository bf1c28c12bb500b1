//! Cascading default values for theme data.
//!
//! A cascade is an ordered list of fallback data objects registered under a
//! namespace. Applying the cascade to a theme's data mapping fills in the
//! fields the mapping leaves unset, never overwriting anything, so a
//! family of themes can inherit shared defaults declared once.
//!
//! The registry is a cloneable handle over shared state:
//! [`CascadeRegistry::process_wide`] returns the instance shared by the
//! whole process, while [`CascadeRegistry::new`] builds an isolated one for
//! tests or embedders that want their own.
//!
//! # Example
//!
//! ```rust
//! use serde_json::{json, Map};
//! use style_shifter::CascadeRegistry;
//!
//! let registry = CascadeRegistry::new();
//! registry.register("demo", json!({ "bg": "#fff", "fg": "#111" }), None);
//!
//! let mut data = Map::new();
//! data.insert("bg".into(), json!("#000"));
//! registry.apply("demo", &mut data);
//!
//! assert_eq!(data["bg"], json!("#000")); // already set, untouched
//! assert_eq!(data["fg"], json!("#111")); // filled from the cascade
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

static PROCESS_CASCADES: Lazy<CascadeRegistry> = Lazy::new(CascadeRegistry::new);

type CascadeLists = HashMap<String, Vec<Map<String, Value>>>;

/// Per-namespace ordered lists of fallback data objects.
#[derive(Debug, Clone, Default)]
pub struct CascadeRegistry {
    inner: Arc<Mutex<CascadeLists>>,
}

impl CascadeRegistry {
    /// Creates an isolated registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the registry shared by the whole process.
    pub fn process_wide() -> Self {
        PROCESS_CASCADES.clone()
    }

    /// Registers a fallback data object for a namespace.
    ///
    /// With `at_index: None` the object is appended; otherwise it is
    /// inserted at the given position (clamped to the list's end). Earlier
    /// entries are applied first and therefore win when several cascades
    /// supply the same field. Non-mapping values register as empty objects.
    pub fn register(&self, namespace: impl Into<String>, data: Value, at_index: Option<usize>) {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut lists = self.lock();
        let list = lists.entry(namespace.into()).or_default();
        match at_index {
            Some(index) => list.insert(index.min(list.len()), data),
            None => list.push(data),
        }
    }

    /// Fills unset fields of `data` from the namespace's cascades, in
    /// registration order.
    ///
    /// A field is only written when `data` does not contain it at all; null
    /// and undefined cascade values are never copied. The `name` field is
    /// special: when set from a cascade, a string value is prefixed with
    /// `<namespace>-` unless it already carries that prefix.
    pub fn apply(&self, namespace: &str, data: &mut Map<String, Value>) {
        let cascades = match self.lock().get(namespace) {
            Some(list) => list.clone(),
            None => return,
        };

        let prefix = format!("{}-", namespace);
        for cascade in cascades {
            for (field, value) in &cascade {
                if value.is_null() || data.contains_key(field) {
                    continue;
                }
                if field == "name" {
                    let named = match value.as_str() {
                        Some(name) if !name.starts_with(&prefix) => {
                            Value::String(format!("{}{}", prefix, name))
                        }
                        _ => value.clone(),
                    };
                    data.insert(field.clone(), named);
                } else {
                    data.insert(field.clone(), value.clone());
                }
            }
        }
    }

    /// Returns the namespace's registered cascades, in order.
    pub fn cascades(&self, namespace: &str) -> Option<Vec<Map<String, Value>>> {
        self.lock().get(namespace).cloned()
    }

    /// Removes one namespace's cascades, or every namespace's when `None`.
    pub fn clear(&self, namespace: Option<&str>) {
        let mut lists = self.lock();
        match namespace {
            Some(namespace) => {
                lists.remove(namespace);
            }
            None => lists.clear(),
        }
    }

    /// Builds `<namespace>-<name>` with every character outside
    /// `[A-Za-z0-9-_]` replaced by `-`, suitable as a CSS class token.
    ///
    /// # Example
    ///
    /// ```rust
    /// use style_shifter::CascadeRegistry;
    ///
    /// assert_eq!(
    ///     CascadeRegistry::sanitize_name("demo", "Dark Mode (v2)"),
    ///     "demo-Dark-Mode--v2-"
    /// );
    /// ```
    pub fn sanitize_name(namespace: &str, name: &str) -> String {
        format!("{}-{}", namespace, name)
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CascadeLists> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_apply_fills_only_unset_fields() {
        let registry = CascadeRegistry::new();
        registry.register("app", json!({ "bg": "#fff", "fg": "#111" }), None);

        let mut theme_data = data(&[("bg", json!("#000"))]);
        registry.apply("app", &mut theme_data);

        assert_eq!(theme_data["bg"], json!("#000"));
        assert_eq!(theme_data["fg"], json!("#111"));
    }

    #[test]
    fn test_earlier_cascades_win() {
        let registry = CascadeRegistry::new();
        registry.register("app", json!({ "fg": "first" }), None);
        registry.register("app", json!({ "fg": "second" }), None);

        let mut theme_data = Map::new();
        registry.apply("app", &mut theme_data);
        assert_eq!(theme_data["fg"], json!("first"));
    }

    #[test]
    fn test_insert_at_index_reorders_precedence() {
        let registry = CascadeRegistry::new();
        registry.register("app", json!({ "fg": "appended" }), None);
        registry.register("app", json!({ "fg": "inserted" }), Some(0));

        let mut theme_data = Map::new();
        registry.apply("app", &mut theme_data);
        assert_eq!(theme_data["fg"], json!("inserted"));
    }

    #[test]
    fn test_null_cascade_values_are_skipped() {
        let registry = CascadeRegistry::new();
        registry.register("app", json!({ "fg": null }), None);

        let mut theme_data = Map::new();
        registry.apply("app", &mut theme_data);
        assert!(!theme_data.contains_key("fg"));
    }

    #[test]
    fn test_name_gets_namespace_prefix() {
        let registry = CascadeRegistry::new();
        registry.register("app", json!({ "name": "dark" }), None);

        let mut theme_data = Map::new();
        registry.apply("app", &mut theme_data);
        assert_eq!(theme_data["name"], json!("app-dark"));
    }

    #[test]
    fn test_already_prefixed_name_is_kept() {
        let registry = CascadeRegistry::new();
        registry.register("app", json!({ "name": "app-dark" }), None);

        let mut theme_data = Map::new();
        registry.apply("app", &mut theme_data);
        assert_eq!(theme_data["name"], json!("app-dark"));
    }

    #[test]
    fn test_existing_name_is_never_overwritten() {
        let registry = CascadeRegistry::new();
        registry.register("app", json!({ "name": "dark" }), None);

        let mut theme_data = data(&[("name", json!("custom"))]);
        registry.apply("app", &mut theme_data);
        assert_eq!(theme_data["name"], json!("custom"));
    }

    #[test]
    fn test_apply_unknown_namespace_is_a_no_op() {
        let registry = CascadeRegistry::new();
        let mut theme_data = data(&[("bg", json!("#000"))]);
        registry.apply("nowhere", &mut theme_data);
        assert_eq!(theme_data.len(), 1);
    }

    #[test]
    fn test_clear_one_namespace() {
        let registry = CascadeRegistry::new();
        registry.register("a", json!({ "x": 1 }), None);
        registry.register("b", json!({ "y": 2 }), None);
        registry.clear(Some("a"));
        assert!(registry.cascades("a").is_none());
        assert!(registry.cascades("b").is_some());
    }

    #[test]
    fn test_clear_everything() {
        let registry = CascadeRegistry::new();
        registry.register("a", json!({ "x": 1 }), None);
        registry.register("b", json!({ "y": 2 }), None);
        registry.clear(None);
        assert!(registry.cascades("a").is_none());
        assert!(registry.cascades("b").is_none());
    }

    #[test]
    fn test_handles_share_state() {
        let registry = CascadeRegistry::new();
        let other = registry.clone();
        registry.register("app", json!({ "x": 1 }), None);
        assert!(other.cascades("app").is_some());
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(CascadeRegistry::sanitize_name("app", "dark"), "app-dark");
        assert_eq!(
            CascadeRegistry::sanitize_name("app", "solarized light"),
            "app-solarized-light"
        );
        assert_eq!(
            CascadeRegistry::sanitize_name("app", "high_contrast"),
            "app-high_contrast"
        );
        assert_eq!(CascadeRegistry::sanitize_name("app", "a/b.c"), "app-a-b-c");
    }
}
