//! Theme struct: a named data set with fonts and a ready lifecycle.
//!
//! # Lifecycle
//!
//! A theme starts **pending**. External dependencies (image preloads, font
//! availability, anything the embedder cares to gate on) are registered with
//! [`Theme::register_dependency`]; each returned [`DependencySignal`] is
//! finished exactly once when the dependency settles (success and failure
//! alike). When the last pending dependency finishes, the theme becomes
//! **ready**, fires every queued [`Theme::on_complete`] callback once, and
//! stays ready forever.
//!
//! A theme with no dependencies does not become ready on its own:
//! [`Theme::settle`] performs the zero-dependency check. Callers that
//! register no dependencies call it once after construction;
//! [`Theme::preload_images`] does so itself when given no URLs.
//!
//! # Construction
//!
//! ```rust
//! use serde_json::json;
//! use style_shifter::Theme;
//!
//! let theme = Theme::new("demo", "dark", json!({
//!     "bg": "#000",
//!     "colors": { "primary": "#80cbc4" },
//! }))
//! .with_font("Inter", "https://fonts.example/inter.woff2");
//!
//! assert_eq!(theme.namespace(), "demo");
//! assert_eq!(theme.get_value("bg"), Some(&json!("#000")));
//! ```
//!
//! Themes also load from YAML (or JSON) documents; see [`Theme::from_yaml`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::document::{ClassList, ImagePreloader};
use crate::error::ThemeError;

type Callback = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct Completion {
    pending: usize,
    completed: bool,
    callbacks: Vec<Callback>,
}

/// A named collection of design values applied to rendering-tree nodes via
/// a class token and consumed by the processor when deriving overrides.
pub struct Theme {
    namespace: String,
    name: String,
    data: Map<String, Value>,
    fonts: Vec<(String, String)>,
    completion: Arc<Mutex<Completion>>,
}

impl Theme {
    /// Creates a pending theme from a namespace, a name, and a data value.
    ///
    /// Non-mapping `data` values are accepted and treated as an empty
    /// mapping; property paths simply resolve to nothing.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            namespace: namespace.into(),
            name: name.into(),
            data,
            fonts: Vec::new(),
            completion: Arc::new(Mutex::new(Completion::default())),
        }
    }

    /// Creates a theme from an already-built data mapping.
    pub fn from_data(
        namespace: impl Into<String>,
        name: impl Into<String>,
        data: Map<String, Value>,
    ) -> Self {
        Self::new(namespace, name, Value::Object(data))
    }

    /// Loads a theme definition from a YAML (or JSON) document.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Parse`] when the document is not a valid
    /// [`ThemeSpec`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use style_shifter::Theme;
    ///
    /// let theme = Theme::from_yaml(r##"
    /// namespace: demo
    /// name: dark
    /// data:
    ///   bg: "#000"
    ///   accent: "#80cbc4"
    /// fonts:
    ///   Inter: https://fonts.example/inter.woff2
    /// "##).unwrap();
    /// assert_eq!(theme.name(), "dark");
    /// ```
    pub fn from_yaml(document: &str) -> Result<Self, ThemeError> {
        let spec: ThemeSpec = serde_yaml::from_str(document)?;
        Ok(spec.into_theme())
    }

    /// Loads a theme definition from a file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Io`] when the file cannot be read and
    /// [`ThemeError::Parse`] when its content is not a valid theme document.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ThemeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Adds one font family and its source URL, returning `self` for
    /// chaining. Pairs are emitted as `@font-face` blocks in insertion
    /// order at synthesis time.
    pub fn with_font(mut self, family: impl Into<String>, url: impl Into<String>) -> Self {
        self.fonts.push((family.into(), url.into()));
        self
    }

    /// The namespace this theme belongs to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The theme's name, which is also the class token it applies to nodes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The theme's data mapping.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Alias of [`data`](Self::data), retained for external introspection of
    /// the mapping a theme was constructed from.
    pub fn source(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The font mapping, in insertion order.
    pub fn fonts(&self) -> &[(String, String)] {
        &self.fonts
    }

    /// Returns the top-level data value for `key`.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Sets the top-level data value for `key`.
    pub fn set_value(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Adds the theme's class token to a node, if not already present.
    pub fn apply_to(&self, node: &mut dyn ClassList) {
        if !node.contains_class(&self.name) {
            node.add_class(&self.name);
        }
    }

    /// Removes the theme's class token from a node.
    pub fn remove_from(&self, node: &mut dyn ClassList) {
        node.remove_class(&self.name);
    }

    /// Registers one pending dependency and returns its completion signal.
    pub fn register_dependency(&self) -> DependencySignal {
        {
            let mut state = lock(&self.completion);
            state.pending += 1;
        }
        DependencySignal {
            state: Arc::clone(&self.completion),
        }
    }

    /// Preloads a set of image URLs through `loader`, gating readiness on
    /// all of them.
    ///
    /// Every dependency is registered before the loader sees the first URL,
    /// so a loader that settles synchronously cannot mark the theme ready
    /// while later URLs are still unregistered. Empty URLs are ignored; with
    /// nothing to load, the theme settles immediately.
    pub fn preload_images<I, S>(&self, loader: &dyn ImagePreloader, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<String> = urls
            .into_iter()
            .filter(|u| !u.as_ref().is_empty())
            .map(|u| u.as_ref().to_string())
            .collect();

        let signals: Vec<DependencySignal> =
            urls.iter().map(|_| self.register_dependency()).collect();

        if signals.is_empty() {
            self.settle();
            return;
        }

        for (url, signal) in urls.iter().zip(signals) {
            loader.preload(url, signal);
        }
    }

    /// Performs the zero-dependency check: transitions the theme to ready
    /// when nothing is pending. Safe to call repeatedly; the transition
    /// fires at most once.
    pub fn settle(&self) {
        let callbacks = {
            let mut state = lock(&self.completion);
            if state.pending == 0 && !state.completed {
                state.completed = true;
                std::mem::take(&mut state.callbacks)
            } else {
                Vec::new()
            }
        };
        for callback in callbacks {
            callback();
        }
    }

    /// Runs `callback` when the theme becomes ready, immediately if it
    /// already is. Callbacks run in registration order and are consumed
    /// exactly once.
    pub fn on_complete(&self, callback: impl FnOnce() + Send + 'static) {
        let mut state = lock(&self.completion);
        if state.completed {
            drop(state);
            callback();
        } else {
            state.callbacks.push(Box::new(callback));
        }
    }

    /// Whether the theme has reached its terminal ready state.
    pub fn is_completed(&self) -> bool {
        lock(&self.completion).completed
    }

    /// The number of dependencies still pending.
    pub fn pending_dependencies(&self) -> usize {
        lock(&self.completion).pending
    }
}

impl fmt::Debug for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.completion);
        f.debug_struct("Theme")
            .field("namespace", &self.namespace)
            .field("name", &self.name)
            .field("fonts", &self.fonts.len())
            .field("pending", &state.pending)
            .field("completed", &state.completed)
            .finish()
    }
}

/// Completion signal for one registered dependency.
///
/// Finishing the signal, for success and failure alike, decrements the
/// theme's pending count; the last signal to finish fires the ready
/// transition and the queued callbacks.
pub struct DependencySignal {
    state: Arc<Mutex<Completion>>,
}

impl DependencySignal {
    /// Marks the dependency as settled.
    pub fn finish(self) {
        let callbacks = {
            let mut state = lock(&self.state);
            state.pending = state.pending.saturating_sub(1);
            if state.pending == 0 && !state.completed {
                state.completed = true;
                std::mem::take(&mut state.callbacks)
            } else {
                Vec::new()
            }
        };
        for callback in callbacks {
            callback();
        }
    }
}

impl fmt::Debug for DependencySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencySignal").finish()
    }
}

/// A deserializable theme definition, for YAML/JSON theme files.
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeSpec {
    /// Namespace the theme belongs to.
    pub namespace: String,
    /// Theme name / class token.
    pub name: String,
    /// The data mapping.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Font family names mapped to their source URLs.
    #[serde(default)]
    pub fonts: BTreeMap<String, String>,
}

impl ThemeSpec {
    /// Builds the runtime [`Theme`] this spec describes.
    pub fn into_theme(self) -> Theme {
        let mut theme = Theme::from_data(self.namespace, self.name, self.data);
        theme.fonts = self.fonts.into_iter().collect();
        theme
    }
}

fn lock(state: &Arc<Mutex<Completion>>) -> std::sync::MutexGuard<'_, Completion> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
