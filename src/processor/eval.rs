//! Bottom-up evaluation of parsed marker expressions.
//!
//! Every failure mode here (unknown namespace, absent path segment,
//! unknown function, a function declining to produce a value) degrades to
//! "no result" for the marker. Nothing propagates; the scan moves on.

use log::debug;
use serde_json::Value;

use crate::expr::{CallExpr, Expr};
use crate::functions::{value_to_string, EvalContext, FunctionRegistry, Invocation};
use crate::theme::Theme;

use super::context::original_value;
use super::CssProcessor;

impl CssProcessor {
    /// Evaluates one marker expression to its final override value.
    pub(super) fn evaluate(
        &mut self,
        expression: &str,
        theme: &Theme,
        source: &str,
        position: usize,
    ) -> Option<String> {
        match Expr::parse_marker(expression) {
            Expr::Call(call) => {
                let Self {
                    functions,
                    locals,
                    globals,
                    scope_overrides,
                    ..
                } = self;
                let mut ctx = EvalContext {
                    locals,
                    globals: &*globals,
                    scopes: scope_overrides,
                };
                match eval_call(functions, &mut ctx, &call, theme, source, position)? {
                    Value::Null => None,
                    value => Some(value_to_string(&value)),
                }
            }
            Expr::Path(path) => {
                let value = resolve_path(theme, &path.segments)?;
                Some(value_to_string(&value))
            }
            // The top-level parser only produces calls and paths.
            _ => None,
        }
    }
}

/// Invokes one call after resolving its arguments.
fn eval_call(
    functions: &FunctionRegistry,
    ctx: &mut EvalContext<'_>,
    call: &CallExpr,
    theme: &Theme,
    source: &str,
    position: usize,
) -> Option<Value> {
    let Some(function) = functions.get(&call.name) else {
        debug!("unknown marker function: {}", call.name);
        return None;
    };
    let args = resolve_args(functions, ctx, &call.args, theme, source, position);
    function(
        ctx,
        &Invocation {
            expression: &call.raw,
            theme,
            source,
            position,
            args: &args,
        },
    )
}

/// Resolves an argument list, arguments-first.
///
/// Nested calls to registered functions evaluate recursively (a declined
/// call becomes null); calls to unknown names, unresolvable variables, and
/// failed paths all stand as their literal text.
fn resolve_args(
    functions: &FunctionRegistry,
    ctx: &mut EvalContext<'_>,
    args: &[Expr],
    theme: &Theme,
    source: &str,
    position: usize,
) -> Vec<Value> {
    args.iter()
        .map(|arg| match arg {
            Expr::Call(inner) => {
                if functions.get(&inner.name).is_some() {
                    eval_call(functions, ctx, inner, theme, source, position)
                        .unwrap_or(Value::Null)
                } else {
                    Value::String(inner.raw.clone())
                }
            }
            Expr::Var(name) => {
                if let Some(value) = ctx.locals.get(name) {
                    value
                } else if let Some(value) = ctx.globals.get(name) {
                    value
                } else if name == "value" {
                    match original_value(source, position) {
                        Some(original) => Value::String(original),
                        None => Value::Null,
                    }
                } else {
                    Value::String(format!("%{}%", name))
                }
            }
            Expr::Path(path) => resolve_path(theme, &path.segments)
                .unwrap_or_else(|| Value::String(path.raw.clone())),
            Expr::Literal(text) => Value::String(text.clone()),
        })
        .collect()
}

/// Traverses a dotted path through the theme's data mapping.
///
/// The first segment must name the theme's namespace; the rest walk the
/// mapping depth-first. Absent segments and null leaves resolve to nothing.
/// A bare namespace path resolves to the whole mapping.
fn resolve_path(theme: &Theme, segments: &[String]) -> Option<Value> {
    let (first, rest) = segments.split_first()?;
    if first != theme.namespace() {
        return None;
    }

    let mut cursor: Option<&Value> = None;
    for segment in rest {
        cursor = Some(match cursor {
            None => theme.data().get(segment)?,
            Some(value) => value.get(segment)?,
        });
    }

    match cursor {
        Some(value) if value.is_null() => None,
        Some(value) => Some(value.clone()),
        None => Some(Value::Object(theme.data().clone())),
    }
}
