//! Color arithmetic built-ins and the shared color parser.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::util::{format_number, leading_float};

use super::convert::first_arg;
use super::{value_to_string, EvalContext, Invocation};

/// The channel triple of an `rgb()`/`rgba()` term, with an optional alpha.
static RGB_CHANNELS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"rgba?\((\d{1,3}),\s*(\d{1,3}),\s*(\d{1,3})(?:,\s*([\d.]+))?\)")
        .expect("rgb-channels pattern")
});

/// The channel triple alone, used by `opacify` on `rgb`-prefixed input.
static RGB_TRIPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((\d{1,3}),\s*(\d{1,3}),\s*(\d{1,3})").expect("rgb-triple pattern")
});

/// A color resolved to byte channels; alpha `255` is fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Parses a CSS color term (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, or
/// `rgb()`/`rgba()`) into channels.
///
/// Anything unrecognized falls back to opaque black, keeping the color
/// arithmetic total over arbitrary theme data.
///
/// # Example
///
/// ```rust
/// use style_shifter::{parse_css_color, Rgba};
///
/// assert_eq!(parse_css_color("#f80"), Rgba { r: 255, g: 136, b: 0, a: 255 });
/// assert_eq!(
///     parse_css_color("rgba(10, 20, 30, 0.5)"),
///     Rgba { r: 10, g: 20, b: 30, a: 128 }
/// );
/// ```
pub fn parse_css_color(color: &str) -> Rgba {
    const OPAQUE_BLACK: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    if let Some(hex) = color.strip_prefix('#') {
        return parse_hex(hex).unwrap_or(OPAQUE_BLACK);
    }
    if color.starts_with("rgb") {
        return parse_rgb_term(color).unwrap_or(OPAQUE_BLACK);
    }
    OPAQUE_BLACK
}

/// Parses hex digits (without `#`); 3- and 4-digit shorthands double each
/// digit, 8-digit input carries alpha.
fn parse_hex(hex: &str) -> Option<Rgba> {
    let expanded: String = if hex.len() == 3 || hex.len() == 4 {
        hex.chars().flat_map(|c| [c, c]).collect()
    } else {
        hex.to_string()
    };
    if expanded.len() != 6 && expanded.len() != 8 {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(expanded.get(range)?, 16).ok();
    Some(Rgba {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
        a: if expanded.len() == 8 {
            channel(6..8)?
        } else {
            255
        },
    })
}

fn parse_rgb_term(color: &str) -> Option<Rgba> {
    let captures = RGB_CHANNELS.captures(color)?;
    let channel = |index: usize| {
        captures[index]
            .parse::<u16>()
            .ok()
            .map(|n| n.min(255) as u8)
    };
    let alpha = match captures.get(4) {
        Some(fraction) => {
            let value: f64 = fraction.as_str().parse().ok()?;
            (value * 255.0).round().clamp(0.0, 255.0) as u8
        }
        None => 255,
    };
    Some(Rgba {
        r: channel(1)?,
        g: channel(2)?,
        b: channel(3)?,
        a: alpha,
    })
}

/// `opacify(color, amount)`: re-emits a color with the given opacity.
///
/// Hex colors gain a two-digit alpha suffix (any existing alpha digits are
/// dropped first); `rgb()`/`rgba()` colors re-emit as `rgba(r, g, b,
/// amount)`. The amount is clamped to `[0, 1]`.
pub(super) fn opacify(_ctx: &mut EvalContext<'_>, inv: &Invocation<'_>) -> Option<Value> {
    let color = value_to_string(first_arg(inv)?);
    let amount = leading_float(&value_to_string(inv.args.get(1)?))?.clamp(0.0, 1.0);

    if let Some(hex) = color.strip_prefix('#') {
        let rgb_digits = match hex.len() {
            4 => &hex[..3],
            8 => &hex[..6],
            _ => hex,
        };
        if rgb_digits.len() == 3 || rgb_digits.len() == 6 {
            let alpha = (amount * 255.0).round() as u8;
            return Some(Value::String(format!("#{}{:02x}", rgb_digits, alpha)));
        }
        return None;
    }

    if color.starts_with("rgb") {
        let captures = RGB_TRIPLE.captures(&color)?;
        return Some(Value::String(format!(
            "rgba({}, {}, {}, {})",
            &captures[1],
            &captures[2],
            &captures[3],
            format_number(amount)
        )));
    }

    None
}

/// `tint(base, tint, amount = 0.5)`: interpolates the base color toward
/// the tint color.
///
/// The amount (a fraction or a `%` percentage, clamped to `[0, 1]`) is
/// scaled by the tint color's own alpha, so a translucent tint pulls less;
/// the base color's alpha is preserved on the result.
pub(super) fn tint(_ctx: &mut EvalContext<'_>, inv: &Invocation<'_>) -> Option<Value> {
    let base_raw = first_arg(inv)?;
    let tint_raw = inv.args.get(1).filter(|arg| !arg.is_null())?;
    let base = parse_css_color(&value_to_string(base_raw));
    let tint = parse_css_color(&value_to_string(tint_raw));

    let amount_text = match inv.args.get(2) {
        Some(arg) if !arg.is_null() => value_to_string(arg),
        _ => "0.5".to_string(),
    };
    let mut amount = match amount_text.strip_suffix('%') {
        Some(percent) => leading_float(percent)? / 100.0,
        None => leading_float(&amount_text)?,
    };
    amount = amount.clamp(0.0, 1.0);

    let base_alpha = f64::from(base.a) / 255.0;
    let tint_alpha = f64::from(tint.a) / 255.0;
    amount *= tint_alpha;

    let mix = |from: u8, to: u8| {
        let shifted = f64::from(from) + (f64::from(to) - f64::from(from)) * amount;
        shifted.round().clamp(0.0, 255.0) as u8
    };

    Some(Value::String(format!(
        "rgba({}, {}, {}, {})",
        mix(base.r, tint.r),
        mix(base.g, tint.g),
        mix(base.b, tint.b),
        format_number(base_alpha)
    )))
}

/// `invert(color)`: the 255-complement of each RGB channel, alpha
/// preserved.
pub(super) fn invert(_ctx: &mut EvalContext<'_>, inv: &Invocation<'_>) -> Option<Value> {
    let color = parse_css_color(&value_to_string(first_arg(inv)?));
    Some(Value::String(format!(
        "rgba({}, {}, {}, {})",
        255 - color.r,
        255 - color.g,
        255 - color.b,
        format_number(f64::from(color.a) / 255.0)
    )))
}
