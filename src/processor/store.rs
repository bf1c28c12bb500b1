//! Override accumulation and synthesis.
//!
//! The store accumulates [`Override`] records for the life of a processor;
//! it is never cleared, and repeated `add_theme` calls keep appending, so
//! one synthesized block can carry the overrides of many themes at once.
//! Rules keep first-seen order; within a rule, the first override recorded
//! for a property wins and later ones are dropped silently at synthesis.

use crate::theme::Theme;

/// One accumulated override: a scoped rule, a property, and the value that
/// replaces the original declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    /// The theme-scoped rule selector (or at-rule prelude + selector).
    pub rule: String,
    /// The CSS property being overridden.
    pub property: String,
    /// The resolved replacement value.
    pub value: String,
    /// The final `.`-separated segment of the marker's expression, a trace
    /// of which theme field produced this override.
    pub dedup_key: String,
    /// Whether the original declaration carried `!important`.
    pub important: bool,
}

/// Insertion-ordered accumulation of overrides per scoped rule.
#[derive(Debug, Default)]
pub(crate) struct OverrideStore {
    rules: Vec<(String, Vec<Override>)>,
}

impl OverrideStore {
    /// Appends an override under its rule, keeping first-seen rule order.
    pub fn record(&mut self, entry: Override) {
        match self.rules.iter_mut().find(|(rule, _)| *rule == entry.rule) {
            Some((_, list)) => list.push(entry),
            None => self.rules.push((entry.rule.clone(), vec![entry])),
        }
    }

    /// Whether anything has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Synthesizes the full override stylesheet.
    ///
    /// Rules are emitted in first-seen order; within each rule, the first
    /// override per property wins. Rules whose name begins with `@media`
    /// get an extra closing brace to balance the prelude's opening one.
    /// After all rules, one `@font-face` block is emitted per font pair of
    /// `theme`, the theme being added when synthesis runs.
    pub fn synthesize(&self, theme: &Theme) -> String {
        let mut css = String::new();

        for (rule, overrides) in &self.rules {
            css.push_str(rule);
            css.push_str(" {");

            let mut emitted: Vec<&str> = Vec::new();
            for entry in overrides {
                if emitted.contains(&entry.property.as_str()) {
                    continue;
                }
                emitted.push(&entry.property);
                css.push(' ');
                css.push_str(&entry.property);
                css.push_str(": ");
                css.push_str(&entry.value);
                if entry.important {
                    css.push_str(" !important");
                }
                css.push(';');
            }

            if rule.starts_with("@media") {
                css.push_str(" }");
            }
            css.push_str(" }\n");
        }

        for (family, url) in theme.fonts() {
            css.push_str("@font-face { font-family: ");
            css.push_str(family);
            css.push_str("; src: url('");
            css.push_str(url);
            css.push_str("'); }\n");
        }

        css
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(rule: &str, property: &str, value: &str) -> Override {
        Override {
            rule: rule.into(),
            property: property.into(),
            value: value.into(),
            dedup_key: property.into(),
            important: false,
        }
    }

    fn bare_theme() -> Theme {
        Theme::new("demo", "dark", json!({}))
    }

    #[test]
    fn test_synthesize_single_rule() {
        let mut store = OverrideStore::default();
        store.record(entry(".dark .button", "background", "#000"));
        assert_eq!(
            store.synthesize(&bare_theme()),
            ".dark .button { background: #000; }\n"
        );
    }

    #[test]
    fn test_rules_keep_first_seen_order() {
        let mut store = OverrideStore::default();
        store.record(entry(".dark .b", "color", "red"));
        store.record(entry(".dark .a", "color", "blue"));
        store.record(entry(".dark .b", "margin", "0"));

        let css = store.synthesize(&bare_theme());
        let b_pos = css.find(".dark .b").unwrap();
        let a_pos = css.find(".dark .a").unwrap();
        assert!(b_pos < a_pos);
        assert!(css.contains(".dark .b { color: red; margin: 0; }"));
    }

    #[test]
    fn test_first_override_wins_per_property() {
        let mut store = OverrideStore::default();
        store.record(entry(".dark .btn", "color", "first"));
        store.record(entry(".dark .btn", "color", "second"));

        let css = store.synthesize(&bare_theme());
        assert!(css.contains("color: first;"));
        assert!(!css.contains("second"));
    }

    #[test]
    fn test_important_flag_is_emitted() {
        let mut store = OverrideStore::default();
        store.record(Override {
            important: true,
            ..entry(".dark .btn", "color", "red")
        });
        assert!(store
            .synthesize(&bare_theme())
            .contains("color: red !important;"));
    }

    #[test]
    fn test_media_rules_get_balancing_brace() {
        let mut store = OverrideStore::default();
        store.record(entry(
            "@media (max-width: 600px) { .dark .compact",
            "padding",
            "4px",
        ));
        assert_eq!(
            store.synthesize(&bare_theme()),
            "@media (max-width: 600px) { .dark .compact { padding: 4px; } }\n"
        );
    }

    #[test]
    fn test_font_faces_follow_rules() {
        let mut store = OverrideStore::default();
        store.record(entry(".dark .btn", "color", "red"));
        let theme = bare_theme().with_font("Inter", "https://fonts.example/inter.woff2");

        let css = store.synthesize(&theme);
        assert!(css.ends_with(
            "@font-face { font-family: Inter; src: url('https://fonts.example/inter.woff2'); }\n"
        ));
        assert!(css.find(".dark .btn").unwrap() < css.find("@font-face").unwrap());
    }

    #[test]
    fn test_empty_store() {
        let store = OverrideStore::default();
        assert!(store.is_empty());
        assert_eq!(store.synthesize(&bare_theme()), "");
    }
}
