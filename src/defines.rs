//! Variable stores for marker expressions.
//!
//! Expressions can stash and recall values through the `local(...)` and
//! `global(...)` marker functions, and reference them later as `%name%`
//! arguments. Two scopes exist:
//!
//! - [`Defines`]: private to one processor instance.
//! - [`GlobalDefines`]: shared; [`GlobalDefines::process_wide`] returns the
//!   handle every processor uses by default, and lives for the life of the
//!   process. Tests (or embedders wanting isolation) construct their own
//!   with [`GlobalDefines::new`] and inject it via
//!   [`CssProcessor::with_global_defines`](crate::CssProcessor::with_global_defines).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;
use serde_json::Value;

/// A processor-local variable store.
#[derive(Debug, Clone, Default)]
pub struct Defines {
    values: HashMap<String, Value>,
}

impl Defines {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Returns `true` when `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Binds `name` to `value`, replacing any previous binding.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Removes every binding.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

static PROCESS_DEFINES: Lazy<GlobalDefines> = Lazy::new(GlobalDefines::new);

/// A shared variable store.
///
/// Cloning the handle shares the underlying map; all processors holding a
/// clone observe each other's writes.
#[derive(Debug, Clone, Default)]
pub struct GlobalDefines {
    inner: Arc<Mutex<HashMap<String, Value>>>,
}

impl GlobalDefines {
    /// Creates an isolated store (not connected to the process-wide one).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the store shared by every processor in the
    /// process that did not have an isolated store injected.
    pub fn process_wide() -> Self {
        PROCESS_DEFINES.clone()
    }

    /// Returns the value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.lock().get(name).cloned()
    }

    /// Returns `true` when `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Binds `name` to `value`, replacing any previous binding.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.lock().insert(name.into(), value);
    }

    /// Removes every binding.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
