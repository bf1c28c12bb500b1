//! End-to-end pipeline tests: annotated stylesheets in, published override
//! blocks out, through the in-memory host boundaries.

use std::sync::{Arc, Mutex};

use serde_json::json;
use style_shifter::{
    CascadeRegistry, ClassList, ClassSet, CssProcessor, GlobalDefines, MemorySink, StaticSheets,
    StyleSink, Theme,
};

/// A sink handle tests can read after the processor takes ownership.
#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<MemorySink>>);

impl StyleSink for SharedSink {
    fn publish(&mut self, block: &str, css: &str) {
        self.0.lock().unwrap().publish(block, css);
    }
}

impl SharedSink {
    fn get(&self, block: &str) -> Option<String> {
        self.0.lock().unwrap().get(block).map(str::to_string)
    }
}

fn processor_over(sheets: StaticSheets) -> (CssProcessor, SharedSink) {
    let sink = SharedSink::default();
    let processor = CssProcessor::new("demo", Box::new(sheets), Box::new(sink.clone()))
        .with_global_defines(GlobalDefines::new());
    (processor, sink)
}

#[test]
fn end_to_end_override_block() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".button { /*![demo.bg]*/ background: red; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    let theme = Theme::new("demo", "dark", json!({ "bg": "#000" }));
    processor.add_theme(&theme);

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains(".dark .button { background: #000; }"));
}

#[test]
fn first_scanned_stylesheet_wins() {
    let sheets = StaticSheets::new()
        .add("first.css", ".btn { /*![demo.fg]*/ color: red; }")
        .add("second.css", ".btn { /*![demo.bg]*/ color: blue; }");
    let (mut processor, sink) = processor_over(sheets);

    let theme = Theme::new("demo", "dark", json!({ "fg": "#111", "bg": "#999" }));
    processor.add_theme(&theme);

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains(".dark .btn { color: #111; }"));
    assert!(!css.contains("#999"));
}

#[test]
fn first_marker_in_source_order_wins() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".btn { /*![demo.fg]*/ color: red; /*![demo.bg]*/ color: blue; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    let theme = Theme::new("demo", "dark", json!({ "fg": "#111", "bg": "#999" }));
    processor.add_theme(&theme);

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains("color: #111;"));
    assert!(!css.contains("#999"));
}

#[test]
fn overrides_accumulate_across_themes() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".button { /*![demo.bg]*/ background: red; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    processor.add_theme(&Theme::new("demo", "dark", json!({ "bg": "#000" })));
    processor.add_theme(&Theme::new("demo", "light", json!({ "bg": "#fff" })));

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains(".dark .button { background: #000; }"));
    assert!(css.contains(".light .button { background: #fff; }"));
}

#[test]
fn important_declarations_keep_their_flag() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".alert { /*![demo.fg]*/ color: red !important; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    processor.add_theme(&Theme::new("demo", "dark", json!({ "fg": "#e33" })));

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains(".dark .alert { color: #e33 !important; }"));
}

#[test]
fn media_query_rules_stay_balanced() {
    let sheets = StaticSheets::new().add(
        "app.css",
        "@media (max-width: 600px) { .compact { /*![demo.pad]*/ padding: 16px; } }",
    );
    let (mut processor, sink) = processor_over(sheets);

    processor.add_theme(&Theme::new("demo", "dark", json!({ "pad": "4px" })));

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains(
        "@media (max-width: 600px) { .dark .compact { padding: 4px; } }"
    ));
}

#[test]
fn selector_lists_scope_every_selector() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".button, .link { /*![demo.fg]*/ color: red; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    processor.add_theme(&Theme::new("demo", "dark", json!({ "fg": "#ccc" })));

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains(".dark .button, .dark .link { color: #ccc; }"));
}

#[test]
fn set_rule_scope_suffix_mode() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".button { /*![setRuleScope(.button)]*/ color: red; /*![demo.fg]*/ color: blue; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    processor.add_theme(&Theme::new("demo", "dark", json!({ "fg": "#ccc" })));

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains(".button.dark { color: #ccc; }"));
    assert!(!css.contains(".dark .button"));
}

#[test]
fn set_rule_scope_before_mode() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".nav .item { /*![setRuleScope(.item, before)]*/ color: red; /*![demo.fg]*/ color: blue; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    processor.add_theme(&Theme::new("demo", "dark", json!({ "fg": "#ccc" })));

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains(".nav .dark .item { color: #ccc; }"));
}

#[test]
fn local_defines_flow_between_markers() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".a { /*![local(accent, #ff6b35)]*/ color: red; }\n\
         .b { /*![printf(%accent%)]*/ color: blue; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    processor.add_theme(&Theme::new("demo", "dark", json!({})));

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(!css.contains(".dark .a"));
    assert!(css.contains(".dark .b { color: #ff6b35; }"));
}

#[test]
fn global_defines_cross_processor_instances() {
    let globals = GlobalDefines::new();

    let seed = StaticSheets::new().add(
        "seed.css",
        ".a { /*![global(brand, #123456)]*/ color: red; }",
    );
    let mut seeder = CssProcessor::new("demo", Box::new(seed), Box::new(MemorySink::new()))
        .with_global_defines(globals.clone());
    seeder.add_theme(&Theme::new("demo", "dark", json!({})));

    let reader = StaticSheets::new().add(
        "read.css",
        ".b { /*![printf(%brand%)]*/ color: blue; }",
    );
    let sink = SharedSink::default();
    let mut reading = CssProcessor::new("demo", Box::new(reader), Box::new(sink.clone()))
        .with_global_defines(globals);
    reading.add_theme(&Theme::new("demo", "dark", json!({})));

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains(".dark .b { color: #123456; }"));
}

#[test]
fn original_value_reference() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".badge { /*![printf(%1 url(fallback.png), %value%)]*/ background: #fe0; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    processor.add_theme(&Theme::new("demo", "dark", json!({})));

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains(".dark .badge { background: #fe0 url(fallback.png); }"));
}

#[test]
fn fonts_emit_font_face_blocks() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".body { /*![demo.fg]*/ color: red; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    let theme = Theme::new("demo", "dark", json!({ "fg": "#ccc" }))
        .with_font("Inter", "https://fonts.example/inter.woff2");
    processor.add_theme(&theme);

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains(
        "@font-face { font-family: Inter; src: url('https://fonts.example/inter.woff2'); }"
    ));
}

#[test]
fn cascade_fills_theme_data_before_construction() {
    let registry = CascadeRegistry::new();
    registry.register(
        "demo",
        json!({ "bg": "#fafafa", "accent": "#80cbc4" }),
        None,
    );

    let mut data = match json!({ "bg": "#000" }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };
    registry.apply("demo", &mut data);

    let sheets = StaticSheets::new().add(
        "app.css",
        ".button { /*![demo.bg]*/ background: red; /*![demo.accent]*/ border-color: blue; }",
    );
    let (mut processor, sink) = processor_over(sheets);
    processor.add_theme(&Theme::from_data("demo", "dark", data));

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains("background: #000;"));
    assert!(css.contains("border-color: #80cbc4;"));
}

#[test]
fn theme_lifecycle_gates_application() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".button { /*![demo.bg]*/ background: red; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    let theme = Theme::new("demo", "dark", json!({ "bg": "#000" }));
    let applied = Arc::new(Mutex::new(ClassSet::new()));

    let signal = theme.register_dependency();
    let node = Arc::clone(&applied);
    theme.on_complete(move || {
        // In a host, this would run once image preloads settle.
        node.lock().unwrap().add_class("dark");
    });

    processor.add_theme(&theme);
    assert!(sink.get("style-shifter-demo").is_some());
    assert!(applied.lock().unwrap().classes().is_empty());

    signal.finish();
    assert_eq!(applied.lock().unwrap().classes(), ["dark"]);
}

#[test]
fn built_in_conversions_compose_in_markers() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".text { /*![toRem(demo.size)]*/ font-size: 14px; /*![opacify(demo.accent, 0.5)]*/ color: #123; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    processor.add_theme(&Theme::new(
        "demo",
        "dark",
        json!({ "size": "16px", "accent": "#ff0000" }),
    ));

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains("font-size: 1rem;"));
    assert!(css.contains("color: #ff000080;"));
}

#[test]
fn svg_markers_produce_data_uris() {
    let sheets = StaticSheets::new().add(
        "app.css",
        ".icon { /*![url(mapSvgColors(demo.icon, #FF0000, demo.accent))]*/ background-image: none; }",
    );
    let (mut processor, sink) = processor_over(sheets);

    processor.add_theme(&Theme::new(
        "demo",
        "dark",
        json!({
            "icon": "<svg><path fill=\"#FF0000\"/></svg>",
            "accent": "#80cbc4",
        }),
    ));

    let css = sink.get("style-shifter-demo").unwrap();
    assert!(css.contains("background-image: url(data:image/svg+xml;base64,"));
}
