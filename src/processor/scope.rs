//! Theme scoping of raw rule names.
//!
//! Overrides must only apply while a theme's class token is present on an
//! ancestor node, so every raw rule name is rewritten before it keys the
//! override store: each selector in the list is prefixed with
//! `.<theme-name> `, and at-rule preludes are carried through unchanged.
//!
//! Stylesheets can opt out of the default rewrite per rule via the
//! `setRuleScope` marker function, which registers a custom scoped selector
//! for the exact (theme name, raw rule name) pair in [`ScopeOverrides`].

use std::collections::HashMap;

/// Caller-registered custom scoped selectors, keyed by theme name and raw
/// rule name.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScopeOverrides {
    by_theme: HashMap<String, HashMap<String, String>>,
}

/// Placement of the theme class token relative to the matched sub-selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeMode {
    /// `sel` becomes `sel.<theme-name>`: the token lands on the matched element.
    Suffix,
    /// `sel` becomes `.<theme-name> sel`: the token gates an ancestor.
    Before,
    /// `sel` becomes `sel .<theme-name>`: the token gates a descendant.
    After,
}

impl ScopeOverrides {
    /// Returns the custom scoped selector for (theme, raw rule), if one was
    /// registered.
    pub fn lookup(&self, theme_name: &str, rule_name: &str) -> Option<&str> {
        self.by_theme
            .get(theme_name)?
            .get(rule_name)
            .map(String::as_str)
    }

    /// Registers a custom scope for `rule_name` under `theme_name` by
    /// rewriting the first occurrence of `selector` within it according to
    /// `mode`. Every future marker resolving to the same raw rule name
    /// under that theme reuses the result.
    pub fn register(
        &mut self,
        theme_name: &str,
        rule_name: &str,
        selector: &str,
        mode: ScopeMode,
    ) {
        let replacement = match mode {
            ScopeMode::Suffix => format!("{}.{}", selector, theme_name),
            ScopeMode::Before => format!(".{} {}", theme_name, selector),
            ScopeMode::After => format!("{} .{}", selector, theme_name),
        };
        let scoped = rule_name.replacen(selector, &replacement, 1);
        self.by_theme
            .entry(theme_name.to_string())
            .or_default()
            .insert(rule_name.to_string(), scoped);
    }
}

/// Applies the default theme scoping to a canonical raw rule name.
///
/// Plain selector lists become `.<theme> <sel>, .<theme> <sel>, ...`. An
/// at-rule name keeps its prelude: the text up to the rule's own `{` is
/// reattached as `<prelude> { ` and only the inner selector list is scoped.
pub(crate) fn scope_selector(rule_name: &str, theme_name: &str) -> String {
    let (prelude, selectors) = if rule_name.starts_with('@') {
        match rule_name.find('{') {
            Some(brace) => (
                format!("{} {{ ", rule_name[..brace].trim_end()),
                &rule_name[brace + 1..],
            ),
            None => (format!("{} {{ ", rule_name.trim_end()), ""),
        }
    } else {
        (String::new(), rule_name)
    };

    // A plain space-split leaves stray empty/whitespace tokens behind;
    // drop them before scoping.
    let compact = selectors
        .split(' ')
        .filter(|token| !matches!(*token, "" | "\t" | "\n" | "\r"))
        .collect::<Vec<_>>()
        .join(" ");

    let scoped = compact
        .split(',')
        .map(|sel| format!(".{} {}", theme_name, sel.trim()))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{}{}", prelude, scoped)
}
