//! SVG recoloring built-in.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use log::warn;
use regex::{NoExpand, Regex};
use serde_json::Value;

use super::{value_to_string, EvalContext, Invocation};

/// `mapSvgColors(svg, "A|B|...", a, b, ...)`: recolors inline SVG text and
/// returns it as a base64 data URI for use inside `url()`.
///
/// The second argument is a pipe-delimited list of original colors; each is
/// replaced by the positionally matching remaining argument. Matching is
/// case-insensitive and tolerates a missing `#` on either side; bare
/// 6-digit hex replacements gain one. Produces no result (and logs) when
/// fewer than three arguments are given, the SVG or original list is null,
/// or the original and replacement counts differ.
pub(super) fn map_svg_colors(_ctx: &mut EvalContext<'_>, inv: &Invocation<'_>) -> Option<Value> {
    if inv.args.len() < 3 || inv.args[0].is_null() || inv.args[1].is_null() {
        warn!("mapSvgColors needs svg text, original colors, and at least one replacement");
        return None;
    }

    let svg = value_to_string(&inv.args[0]);
    let originals: Vec<String> = value_to_string(&inv.args[1])
        .split('|')
        .map(|color| color.trim().to_string())
        .collect();
    let replacements = &inv.args[2..];

    if originals.len() != replacements.len() {
        warn!(
            "mapSvgColors got {} original colors but {} replacements",
            originals.len(),
            replacements.len()
        );
        return None;
    }

    let mut recolored = svg;
    for (original, replacement) in originals.iter().zip(replacements) {
        let mut replacement = value_to_string(replacement);
        let bare = original.strip_prefix('#').unwrap_or(original);
        if !replacement.starts_with('#') && is_bare_hex(&replacement) {
            replacement.insert(0, '#');
        }

        let pattern = match Regex::new(&format!("(?i)#?{}", regex::escape(bare))) {
            Ok(pattern) => pattern,
            Err(err) => {
                warn!("mapSvgColors skipping color {original}: {err}");
                continue;
            }
        };
        recolored = pattern
            .replace_all(&recolored, NoExpand(&replacement))
            .into_owned();
    }

    let encoded = BASE64_STANDARD.encode(recolored.as_bytes());
    Some(Value::String(format!("data:image/svg+xml;base64,{}", encoded)))
}

fn is_bare_hex(text: &str) -> bool {
    text.len() == 6 && text.chars().all(|c| c.is_ascii_hexdigit())
}
