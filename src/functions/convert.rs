//! Unit conversion and string formatting built-ins.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::util::{format_number, leading_float};

use super::{value_to_string, EvalContext, Invocation};

/// `%N` substitution tokens in a `printf` template.
static PRINTF_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%([0-9]+)").expect("printf-token pattern"));

/// `url(path)`: wraps a path in a `url()` term.
pub(super) fn url(_ctx: &mut EvalContext<'_>, inv: &Invocation<'_>) -> Option<Value> {
    let path = first_arg(inv)?;
    Some(Value::String(format!("url({})", value_to_string(path))))
}

/// `toPx(value)`: suffixes a numeric value with `px`.
///
/// Values already carrying a `px` suffix (and at least 3 chars long) pass
/// through unchanged; non-numeric values produce no result.
pub(super) fn to_px(_ctx: &mut EvalContext<'_>, inv: &Invocation<'_>) -> Option<Value> {
    let raw = value_to_string(first_arg(inv)?);
    if raw.len() >= 3 && raw.ends_with("px") {
        return Some(Value::String(raw));
    }
    let number = leading_float(&raw)?;
    Some(Value::String(format!("{}px", format_number(number))))
}

/// `toRem(value, newBase = 16, oldBase = 16)`: converts px to rem, or
/// rebases an existing rem value to a new base font size.
///
/// A `rem`-suffixed input is first scaled back to pixels via `oldBase`.
/// Produces no result when the value is non-numeric or `newBase ≤ 0`.
pub(super) fn to_rem(_ctx: &mut EvalContext<'_>, inv: &Invocation<'_>) -> Option<Value> {
    let raw = value_to_string(first_arg(inv)?);
    let mut size = leading_float(&raw)?;
    let unit = unit_of(&raw);

    let new_base = match inv.args.get(1) {
        Some(arg) => leading_float(&value_to_string(arg))?,
        None => 16.0,
    };
    let old_base = match inv.args.get(2) {
        Some(arg) => leading_float(&value_to_string(arg))?,
        None => 16.0,
    };

    if new_base <= 0.0 {
        return None;
    }
    if unit == "rem" {
        size *= old_base;
    }
    let rem = size * ((new_base / 16.0) / 16.0);
    Some(Value::String(format!("{}rem", format_number(rem))))
}

/// `printf(template, ...)`: replaces `%N` tokens with the stringified Nth
/// argument (1-indexed; the template itself is argument 0). Tokens whose
/// index has no argument, or whose argument is null, stay verbatim.
pub(super) fn printf(_ctx: &mut EvalContext<'_>, inv: &Invocation<'_>) -> Option<Value> {
    let template = value_to_string(first_arg(inv)?);
    let replaced = PRINTF_TOKEN.replace_all(&template, |captures: &Captures<'_>| {
        let replacement = captures[1]
            .parse::<usize>()
            .ok()
            .and_then(|index| inv.args.get(index))
            .filter(|arg| !arg.is_null())
            .map(value_to_string);
        replacement.unwrap_or_else(|| captures[0].to_string())
    });
    Some(Value::String(replaced.into_owned()))
}

/// Returns the first argument unless it is absent or null.
pub(super) fn first_arg<'a>(inv: &'a Invocation<'_>) -> Option<&'a Value> {
    inv.args.first().filter(|arg| !arg.is_null())
}

/// Extracts the unit suffix of a dimension string: the text after its
/// numeric prefix, up to the first space (`"16px"` gives `"px"`).
fn unit_of(raw: &str) -> String {
    let mut value = raw.to_string();
    if value.starts_with('.') {
        value.insert(0, '0');
    }
    let Some(number) = leading_float(&value) else {
        return String::new();
    };
    let number_text = format_number(number);
    let tail = match value.rfind(&number_text) {
        Some(at) => &value[at + number_text.len()..],
        None => value.as_str(),
    };
    tail.split(' ').next().unwrap_or("").to_string()
}
