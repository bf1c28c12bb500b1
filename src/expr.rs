//! Marker-expression parsing.
//!
//! A marker comment `/*![ ... ]*/` carries one expression: either a dotted
//! property path (`demo.colors.primary`) or a function call
//! (`opacify(demo.accent, 0.5)`). Expressions are parsed once, at scan time,
//! into a small tagged tree; evaluation (in [`processor`](crate::processor))
//! walks the tree bottom-up, so malformed input surfaces here rather than
//! mid-evaluation.
//!
//! Argument text is split on top-level commas only: commas nested inside
//! `()`, `[]`, or `{}` groups stay inside their argument, so
//! `tint(rgba(0, 0, 0, 0.5), demo.accent)` has two arguments, not five.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::util::leading_float;

/// A single identifier fully wrapped in `%` on both sides: `%name%`.
static VAR_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^%([^%]+)%$").expect("var-ref pattern"));

/// One node of a parsed marker expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    /// A function call with pre-parsed arguments.
    Call(CallExpr),
    /// A dotted path; the first segment is checked against the theme
    /// namespace at evaluation time.
    Path(PathExpr),
    /// A `%name%` variable reference.
    Var(String),
    /// Verbatim text (including numeric literals).
    Literal(String),
}

/// A parsed function call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CallExpr {
    /// Function name: everything before the first `(`.
    pub name: String,
    /// The full call text, handed verbatim to the registered function.
    pub raw: String,
    /// Arguments in order, each parsed recursively.
    pub args: Vec<Expr>,
}

/// A parsed dotted path.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PathExpr {
    /// The original text, kept so a failed resolution can stand unchanged.
    pub raw: String,
    /// The `.`-separated segments.
    pub segments: Vec<String>,
}

impl Expr {
    /// Parses the full text of a marker expression.
    ///
    /// Top-level text is a call when it has call shape, otherwise a path,
    /// even a single-segment one, which evaluation will reject unless it
    /// names the theme namespace itself.
    pub fn parse_marker(text: &str) -> Expr {
        match parse_call(text) {
            Some(call) => Expr::Call(call),
            None => Expr::Path(PathExpr {
                raw: text.to_string(),
                segments: text.split('.').map(str::to_string).collect(),
            }),
        }
    }

    /// Classifies one raw argument.
    ///
    /// Arguments are stricter than the top level: a path needs at least two
    /// segments, anything with a numeric prefix stays literal, and `%name%`
    /// references are recognized.
    fn classify_arg(text: &str) -> Expr {
        if let Some(call) = parse_call(text) {
            return Expr::Call(call);
        }
        if leading_float(text).is_some() {
            return Expr::Literal(text.to_string());
        }
        if let Some(captures) = VAR_REF.captures(text) {
            return Expr::Var(captures[1].to_string());
        }
        let segments: Vec<&str> = text.split('.').collect();
        if segments.len() > 1 {
            return Expr::Path(PathExpr {
                raw: text.to_string(),
                segments: segments.into_iter().map(str::to_string).collect(),
            });
        }
        Expr::Literal(text.to_string())
    }
}

/// Parses call shape: a name, a `(`, and a matching final `)`.
///
/// Returns `None` when the text is not a call (no parentheses, or an
/// unterminated one), in which case the caller falls back to path/literal
/// classification.
fn parse_call(text: &str) -> Option<CallExpr> {
    let open = text.find('(')?;
    let close = text.rfind(')')?;
    if close < open {
        return None;
    }

    let name = text[..open].to_string();
    let args = split_args(&text[open + 1..close])
        .into_iter()
        .map(|arg| Expr::classify_arg(arg))
        .collect();

    Some(CallExpr {
        name,
        raw: text.to_string(),
        args,
    })
}

/// Splits argument text on top-level commas, honoring `()`/`[]`/`{}` depth.
///
/// Each piece is trimmed; a trailing empty piece is dropped (so `f()` has no
/// arguments), but interior empty pieces survive as empty strings, matching
/// the forgiving comma handling of stylesheet values.
fn split_args(text: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        args.push(tail);
    }

    args
}
