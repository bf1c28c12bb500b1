//! Marker-expression functions.
//!
//! A marker expression can call functions by name: `opacify(demo.accent,
//! 0.5)`, `setRuleScope(.button)`, and so on. The [`FunctionRegistry`] maps
//! those names to implementations; it is seeded with the built-ins and
//! callers may register more, including replacements for built-ins, since
//! registration simply overwrites the name.
//!
//! # Contract
//!
//! A function receives the mutable evaluation state ([`EvalContext`]) and
//! the call's [`Invocation`]: the raw expression text, the active theme,
//! the full source text, the marker's byte offset, and the already-resolved
//! argument list. It returns `Some(value)` to produce a result or `None`
//! for "no result"; there is no error channel, and no function may panic on
//! malformed input; bad arguments degrade to `None`.
//!
//! ```rust
//! use style_shifter::{CssProcessor, MemorySink, StaticSheets};
//! use serde_json::Value;
//!
//! let mut processor = CssProcessor::new(
//!     "demo",
//!     Box::new(StaticSheets::new()),
//!     Box::new(MemorySink::new()),
//! );
//! processor.register_function("shout", |_ctx, inv| {
//!     inv.args.first().map(|arg| {
//!         Value::String(style_shifter::value_to_string(arg).to_uppercase())
//!     })
//! });
//! ```

mod color;
mod convert;
mod svg;

pub use color::{parse_css_color, Rgba};

use std::collections::HashMap;

use serde_json::Value;

use crate::defines::{Defines, GlobalDefines};
use crate::processor::context::extract_rule_name;
use crate::processor::scope::{ScopeMode, ScopeOverrides};
use crate::theme::Theme;

/// Mutable processor state exposed to functions.
pub struct EvalContext<'a> {
    /// The processor-local variable store (`local(...)`).
    pub locals: &'a mut Defines,
    /// The shared variable store (`global(...)`).
    pub globals: &'a GlobalDefines,
    /// Custom scope registrations (`setRuleScope(...)`).
    pub(crate) scopes: &'a mut ScopeOverrides,
}

/// One function call, with its arguments already resolved.
pub struct Invocation<'a> {
    /// The literal call text as written in the marker.
    pub expression: &'a str,
    /// The theme being added.
    pub theme: &'a Theme,
    /// The full stylesheet source text.
    pub source: &'a str,
    /// Byte offset of the marker within `source`.
    pub position: usize,
    /// Resolved arguments; unresolvable arguments arrive as their literal
    /// text, failed nested calls as `Value::Null`.
    pub args: &'a [Value],
}

/// A registered marker function.
pub type ApiFunction = Box<dyn Fn(&mut EvalContext<'_>, &Invocation<'_>) -> Option<Value> + Send + Sync>;

/// Name-to-function table, seeded with the built-ins.
pub(crate) struct FunctionRegistry {
    table: HashMap<String, ApiFunction>,
}

impl FunctionRegistry {
    /// Builds a registry containing every built-in.
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            table: HashMap::new(),
        };
        registry.register("url", convert::url);
        registry.register("toPx", convert::to_px);
        registry.register("toRem", convert::to_rem);
        registry.register("opacify", color::opacify);
        registry.register("tint", color::tint);
        registry.register("invert", color::invert);
        registry.register("printf", convert::printf);
        registry.register("mapSvgColors", svg::map_svg_colors);
        registry.register("local", local);
        registry.register("global", global);
        registry.register("setRuleScope", set_rule_scope);
        registry
    }

    /// Registers (or replaces) a function under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&mut EvalContext<'_>, &Invocation<'_>) -> Option<Value> + Send + Sync + 'static,
    {
        self.table.insert(name.into(), Box::new(function));
    }

    /// Looks up a function by name.
    pub fn get(&self, name: &str) -> Option<&ApiFunction> {
        self.table.get(name)
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.table.len())
            .finish()
    }
}

/// Renders a resolved value the way stylesheet text expects it.
///
/// Strings pass through verbatim, numbers and booleans use their plain
/// representations, and structured values render as compact JSON.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// `local(name)` reads the processor-local store (missing names read as the
/// empty string); `local(name, value)` writes it and produces no result.
/// The name `value` is reserved for the original-declaration reference and
/// cannot be written.
fn local(ctx: &mut EvalContext<'_>, inv: &Invocation<'_>) -> Option<Value> {
    match inv.args {
        [name] => {
            let name = value_to_string(name);
            Some(ctx.locals.get(&name).unwrap_or(Value::String(String::new())))
        }
        [name, value] => {
            let name = value_to_string(name);
            if name != "value" {
                ctx.locals.set(name, value.clone());
            }
            None
        }
        _ => None,
    }
}

/// `global(name)` / `global(name, value)`: as [`local`], against the store
/// shared across every processor instance.
fn global(ctx: &mut EvalContext<'_>, inv: &Invocation<'_>) -> Option<Value> {
    match inv.args {
        [name] => {
            let name = value_to_string(name);
            Some(ctx.globals.get(&name).unwrap_or(Value::String(String::new())))
        }
        [name, value] => {
            let name = value_to_string(name);
            if name != "value" {
                ctx.globals.set(name, value.clone());
            }
            None
        }
        _ => None,
    }
}

/// `setRuleScope(sel)` / `setRuleScope(sel, mode)` registers a custom
/// scoped selector for the marker's enclosing rule under the active theme.
///
/// Without a mode the theme class suffixes the matched sub-selector; mode
/// `before` places it as an ancestor, `after` as a descendant. Unknown
/// modes register nothing. Always produces no result.
fn set_rule_scope(ctx: &mut EvalContext<'_>, inv: &Invocation<'_>) -> Option<Value> {
    let rule_name = extract_rule_name(inv.source, inv.position, false);
    if rule_name.is_empty() {
        return None;
    }

    let mode = match inv.args {
        [_] => Some(ScopeMode::Suffix),
        [_, mode] => match value_to_string(mode).as_str() {
            "before" => Some(ScopeMode::Before),
            "after" => Some(ScopeMode::After),
            _ => None,
        },
        _ => None,
    };

    if let (Some(mode), Some(selector)) = (mode, inv.args.first()) {
        ctx.scopes
            .register(inv.theme.name(), &rule_name, &value_to_string(selector), mode);
    }

    None
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;
    use serde_json::json;

    /// Runs a built-in against empty stores and a bare theme.
    pub(crate) fn call_builtin(name: &str, args: &[Value]) -> Option<Value> {
        let registry = FunctionRegistry::with_builtins();
        let theme = Theme::new("demo", "dark", json!({}));
        let mut locals = Defines::new();
        let globals = GlobalDefines::new();
        let mut scopes = ScopeOverrides::default();
        let mut ctx = EvalContext {
            locals: &mut locals,
            globals: &globals,
            scopes: &mut scopes,
        };
        let function = registry.get(name).expect("builtin");
        function(
            &mut ctx,
            &Invocation {
                expression: name,
                theme: &theme,
                source: "",
                position: 0,
                args,
            },
        )
    }
}
