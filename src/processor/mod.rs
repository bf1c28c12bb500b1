//! The override processor: scanning, evaluation, accumulation, publishing.
//!
//! A [`CssProcessor`] is bound to one namespace, one [`StyleSource`], and
//! one [`StyleSink`]. Each [`add_theme`](CssProcessor::add_theme) call scans
//! every known stylesheet for `/*![ ... ]*/` markers, evaluates their
//! expressions against the theme, accumulates the resulting overrides, and
//! publishes the synthesized block `style-shifter-<namespace>`, replacing
//! its previous content wholesale.
//!
//! The override store persists and grows across `add_theme` calls, so one
//! published block carries every theme the processor has seen. Precedence
//! is deterministic: stylesheet discovery order, then source-text order
//! within a sheet, first writer wins per (scoped rule, property).
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use style_shifter::{CssProcessor, MemorySink, StaticSheets, Theme};
//!
//! let sheets = StaticSheets::new()
//!     .add("app.css", ".button { /*![demo.bg]*/ background: red; }");
//!
//! let mut processor = CssProcessor::new(
//!     "demo",
//!     Box::new(sheets),
//!     Box::new(MemorySink::new()),
//! );
//!
//! let theme = Theme::new("demo", "dark", json!({ "bg": "#000" }));
//! processor.add_theme(&theme);
//! ```

pub(crate) mod context;
mod eval;
pub(crate) mod scope;
mod store;

pub use store::Override;

use std::collections::HashSet;

use log::warn;

use crate::defines::{Defines, GlobalDefines};
use crate::document::{StyleSink, StyleSource};
use crate::functions::{EvalContext, FunctionRegistry, Invocation};
use crate::theme::Theme;

use context::rule_context;
use scope::{scope_selector, ScopeOverrides};
use store::OverrideStore;

/// Opening token of a marker comment.
const MARKER_OPEN: &str = "/*![";

/// A value-rewrite hook applied to each override as it is recorded.
///
/// Returning `Some` replaces the override's value; `None` leaves it alone.
pub type OverrideHook = Box<dyn Fn(&Theme, &Override) -> Option<String> + Send + Sync>;

/// Scans annotated stylesheets and derives theme-scoped override blocks.
pub struct CssProcessor {
    namespace: String,
    source: Box<dyn StyleSource>,
    sink: Box<dyn StyleSink>,
    store: OverrideStore,
    scanned: HashSet<String>,
    scope_overrides: ScopeOverrides,
    preprocessors: Vec<OverrideHook>,
    postprocessors: Vec<OverrideHook>,
    locals: Defines,
    globals: GlobalDefines,
    functions: FunctionRegistry,
}

impl CssProcessor {
    /// Creates a processor bound to `namespace`, reading stylesheets from
    /// `source` and publishing its override block to `sink`.
    ///
    /// The function registry starts with every built-in, and the global
    /// variable store is the process-wide one.
    pub fn new(
        namespace: impl Into<String>,
        source: Box<dyn StyleSource>,
        sink: Box<dyn StyleSink>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            source,
            sink,
            store: OverrideStore::default(),
            scanned: HashSet::new(),
            scope_overrides: ScopeOverrides::default(),
            preprocessors: Vec::new(),
            postprocessors: Vec::new(),
            locals: Defines::new(),
            globals: GlobalDefines::process_wide(),
            functions: FunctionRegistry::with_builtins(),
        }
    }

    /// Swaps in an isolated global variable store, returning `self` for
    /// chaining. Mainly for tests and embedders that must not share state
    /// with other processors in the process.
    pub fn with_global_defines(mut self, globals: GlobalDefines) -> Self {
        self.globals = globals;
        self
    }

    /// Appends a pre-transform hook, returning `self` for chaining. Hooks
    /// run in registration order, before the post-transform hooks.
    pub fn with_preprocessor<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Theme, &Override) -> Option<String> + Send + Sync + 'static,
    {
        self.preprocessors.push(Box::new(hook));
        self
    }

    /// Appends a post-transform hook, returning `self` for chaining.
    pub fn with_postprocessor<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Theme, &Override) -> Option<String> + Send + Sync + 'static,
    {
        self.postprocessors.push(Box::new(hook));
        self
    }

    /// Registers (or replaces) a marker function under `name`.
    pub fn register_function<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&mut EvalContext<'_>, &Invocation<'_>) -> Option<serde_json::Value>
            + Send
            + Sync
            + 'static,
    {
        self.functions.register(name, function);
    }

    /// The namespace this processor publishes under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The name of the style block this processor owns.
    pub fn block_id(&self) -> String {
        format!("style-shifter-{}", self.namespace)
    }

    /// Scans every known stylesheet for the theme and publishes the
    /// accumulated overrides.
    ///
    /// A theme name is scanned at most once per processor; repeat calls are
    /// no-ops. Fetch failures and empty sheets are skipped, and the block
    /// is only published when at least one override has accumulated,
    /// possibly from an earlier theme.
    pub fn add_theme(&mut self, theme: &Theme) {
        if self.scanned.contains(theme.name()) {
            return;
        }

        for origin in self.source.origins() {
            match self.source.fetch(&origin) {
                Ok(text) => {
                    if !text.is_empty() {
                        self.scan_sheet(&text, theme);
                    }
                }
                Err(err) => {
                    warn!("skipping stylesheet: {err}");
                }
            }
        }

        if !self.store.is_empty() {
            let block = self.block_id();
            let css = self.store.synthesize(theme);
            self.sink.publish(&block, &css);
        }

        self.scanned.insert(theme.name().to_string());
    }

    /// Scans one stylesheet's text for markers and records their overrides.
    fn scan_sheet(&mut self, source: &str, theme: &Theme) {
        let mut cursor = 0;
        while let Some(found) = source[cursor..].find(MARKER_OPEN) {
            let marker = cursor + found;
            let Some(close) = source[marker..].find(']') else {
                break;
            };
            let close = marker + close;
            let expression = &source[marker + MARKER_OPEN.len()..close];

            if let Some(value) = self.evaluate(expression, theme, source, marker) {
                self.record_override(expression, value, theme, source, marker);
            }

            cursor = close + 1;
        }
    }

    fn record_override(
        &mut self,
        expression: &str,
        value: String,
        theme: &Theme,
        source: &str,
        marker: usize,
    ) {
        let ctx = rule_context(source, marker);
        if ctx.property.is_empty() || ctx.rule_name.is_empty() {
            return;
        }

        let rule = match self.scope_overrides.lookup(theme.name(), &ctx.rule_name) {
            Some(custom) => custom.to_string(),
            None => scope_selector(&ctx.rule_name, theme.name()),
        };

        let mut entry = Override {
            rule,
            property: ctx.property,
            value,
            dedup_key: expression.rsplit('.').next().unwrap_or("").to_string(),
            important: ctx.important,
        };

        for hook in self.preprocessors.iter().chain(&self.postprocessors) {
            if let Some(rewritten) = hook(theme, &entry) {
                entry.value = rewritten;
            }
        }

        self.store.record(entry);
    }
}

impl std::fmt::Debug for CssProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CssProcessor")
            .field("namespace", &self.namespace)
            .field("scanned", &self.scanned)
            .field("functions", &self.functions)
            .finish()
    }
}
