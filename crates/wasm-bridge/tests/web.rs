// Browser tests for the wasm bridge
// Run with: wasm-pack test --headless --chrome crates/wasm-bridge
use std::rc::Rc;

use chart_interact_core::TimerBackend;
use chart_interact_wasm::instance_manager::InstanceManager;
use chart_interact_wasm::timers::WindowTimers;
use chart_interact_wasm::{
    build_tooltip_js, format_by_metadata_js, format_compact_js, nearest_by_euclidean_js,
    truncate_label_js, InteractionLayer,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlElement, MouseEvent};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn json(text: &str) -> JsValue {
    js_sys::JSON::parse(text).unwrap()
}

fn append_div(id: &str) -> HtmlElement {
    let doc = document();
    let div = doc
        .create_element("div")
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    div.set_id(id);
    div.style().set_property("width", "320px").unwrap();
    div.style().set_property("height", "200px").unwrap();
    doc.body().unwrap().append_child(&div).unwrap();
    div
}

fn metadata() -> JsValue {
    json(
        r#"[{"physical_name": "trips", "display_name": "Trips", "data_type": "integer"},
            {"physical_name": "fare", "display_name": "Fare", "data_type": "float"}]"#,
    )
}

#[wasm_bindgen_test]
fn test_formatting_exports() {
    assert_eq!(format_compact_js(1_500_000.0), "1.5M");
    assert_eq!(format_compact_js(2_300.0), "2.3K");

    let grouped = format_by_metadata_js(JsValue::from_f64(1234567.0), "trips", metadata()).unwrap();
    assert_eq!(grouped.as_string().as_deref(), Some("1,234,567"));

    let empty = format_by_metadata_js(JsValue::NULL, "trips", metadata()).unwrap();
    assert_eq!(empty.as_string().as_deref(), Some(""));

    let raw = format_by_metadata_js(JsValue::from_f64(5.0), "percentage", metadata()).unwrap();
    assert_eq!(raw.as_f64(), Some(5.0));

    assert_eq!(
        truncate_label_js(Some("a".repeat(30)), None).unwrap(),
        format!("{}...", "a".repeat(25))
    );
    assert_eq!(truncate_label_js(None, Some(3)), None);
}

#[wasm_bindgen_test]
fn test_tooltip_markup_export() {
    let content = json(
        r#"{"dimensions": [{"name": "zone", "value": "Midtown"}],
            "measures": [{"name": "fare", "value": 12.34, "field": "fare"}]}"#,
    );
    let html = build_tooltip_js(content, metadata()).unwrap();
    assert!(html.contains("Midtown"));
    assert!(html.contains("Fare:</td><td class=\"tooltip-value\">12.3"));
    assert!(html.contains("tooltip-divider"));
}

#[wasm_bindgen_test]
fn test_nearest_by_euclidean_export() {
    let points = json(r#"[{"x": 0, "y": 0, "id": "a"}, {"x": 10, "y": 0, "id": "b"}]"#);
    let found = nearest_by_euclidean_js(1.0, 0.0, points).unwrap();
    let id = js_sys::Reflect::get(&found, &"id".into()).unwrap();
    let distance = js_sys::Reflect::get(&found, &"distance".into()).unwrap();
    assert_eq!(id.as_string().as_deref(), Some("a"));
    assert_eq!(distance.as_f64(), Some(1.0));

    assert!(nearest_by_euclidean_js(1.0, 0.0, json("[]")).unwrap().is_null());
}

#[wasm_bindgen_test]
fn test_layer_creates_singleton_tooltip() {
    let layers_before = InstanceManager::layer_count();
    let layer = InteractionLayer::new(JsValue::UNDEFINED).unwrap();
    let second = InteractionLayer::new(JsValue::UNDEFINED).unwrap();
    assert_eq!(InstanceManager::layer_count(), layers_before + 2);
    assert_ne!(layer.id(), second.id());

    let tooltips = document().query_selector_all(".chart-tooltip").unwrap();
    assert_eq!(tooltips.length(), 1);
    assert!(document().get_element_by_id("chart-tooltip-singleton").is_some());

    drop(second);
    assert_eq!(InstanceManager::layer_count(), layers_before + 1);
}

#[wasm_bindgen_test]
fn test_invalid_config_is_rejected() {
    let config = json(r#"{"timing": {"resizeDebounceMs": 0}}"#);
    assert!(InteractionLayer::new(config).is_err());
}

#[wasm_bindgen_test]
fn test_validate_rendering_context() {
    let layer = InteractionLayer::new(JsValue::UNDEFINED).unwrap();
    let container = append_div("validate-target");
    container.set_inner_html("<svg></svg>");

    assert!(!layer.validate_rendering_context(Some(container.clone()), 0).unwrap());
    assert_eq!(container.inner_html(), "<p>No data available to display</p>");

    assert!(layer.validate_rendering_context(Some(container.clone()), 12).unwrap());
    assert_eq!(container.inner_html(), "");

    assert!(!layer.validate_rendering_context(None, 12).unwrap());
}

#[wasm_bindgen_test]
fn test_orphaned_tooltips_are_removed() {
    let layer = InteractionLayer::new(JsValue::UNDEFINED).unwrap();
    for id in ["stale-tooltip-1", "stale-tooltip-2"] {
        append_div(id).set_class_name("chart-tooltip");
    }

    assert_eq!(layer.cleanup_orphaned_tooltips().unwrap(), 2);
    assert_eq!(document().query_selector_all(".chart-tooltip").unwrap().length(), 1);
}

#[wasm_bindgen_test]
fn test_hover_highlights_and_restores() {
    let layer = InteractionLayer::new(JsValue::UNDEFINED).unwrap();
    let bar = append_div("hover-bar");
    bar.set_attribute("fill", "steelblue").unwrap();

    let elements = js_sys::Array::of1(&bar);
    let data = json(r#"[{"name": "North"}]"#).dyn_into::<js_sys::Array>().unwrap();
    let content = js_sys::Function::new_with_args("d, el, ev", "return '<b>' + d.name + '</b>';");

    let bindings_before = InstanceManager::binding_count();
    let binding = layer
        .attach_hover_tooltip(elements, data, content, None)
        .unwrap()
        .expect("non-empty selection");
    assert_eq!(InstanceManager::binding_count(), bindings_before + 1);

    bar.dispatch_event(&MouseEvent::new("mousemove").unwrap()).unwrap();
    assert_eq!(bar.get_attribute("fill").as_deref(), Some("rgb(63, 117, 162)"));
    let tooltip = document().get_element_by_id("chart-tooltip-singleton").unwrap();
    assert_eq!(tooltip.inner_html(), "<b>North</b>");

    bar.dispatch_event(&MouseEvent::new("mouseout").unwrap()).unwrap();
    assert_eq!(bar.get_attribute("fill").as_deref(), Some("steelblue"));

    assert!(layer.detach_hover_tooltip(&binding));
    assert!(!layer.detach_hover_tooltip(&binding));
    assert_eq!(InstanceManager::binding_count(), bindings_before);
}

#[wasm_bindgen_test]
fn test_empty_hover_selection() {
    let layer = InteractionLayer::new(JsValue::UNDEFINED).unwrap();
    let content = js_sys::Function::new_with_args("", "return '';");
    let binding = layer
        .attach_hover_tooltip(js_sys::Array::new(), js_sys::Array::new(), content, None)
        .unwrap();
    assert!(binding.is_none());
}

#[wasm_bindgen_test]
fn test_cleanup_runs_registered_callbacks() {
    let layer = InteractionLayer::new(JsValue::UNDEFINED).unwrap();
    let ok = js_sys::Function::new_no_args("");
    let failing = js_sys::Function::new_no_args("throw new Error('gone');");
    layer.register_cleanup(ok).unwrap();
    layer.register_cleanup(failing).unwrap();

    let report = layer.run_cleanup().unwrap();
    let invoked = js_sys::Reflect::get(&report, &"invoked".into()).unwrap();
    let failed = js_sys::Reflect::get(&report, &"failed".into()).unwrap();
    assert_eq!(invoked.as_f64(), Some(2.0));
    assert_eq!(failed.as_f64(), Some(1.0));
}

#[wasm_bindgen_test]
fn test_mount_and_teardown() {
    let layer = InteractionLayer::new(JsValue::UNDEFINED).unwrap();
    let container = append_div("mount-target");
    let redraw = js_sys::Function::new_no_args("");

    layer.mount_resize(Some(container), redraw).unwrap();
    layer.mount_resize(None, js_sys::Function::new_no_args("")).unwrap();
    layer
        .set_dimension_swap_handler(js_sys::Function::new_with_args("el", ""))
        .unwrap();

    let report = layer.teardown().unwrap();
    let invoked = js_sys::Reflect::get(&report, &"invoked".into()).unwrap();
    assert_eq!(invoked.as_f64(), Some(1.0));
    assert!(!layer.clear_dimension_swap_handler().unwrap());
}

#[wasm_bindgen_test]
fn test_hover_data_stays_aligned_past_non_elements() {
    let layer = InteractionLayer::new(JsValue::UNDEFINED).unwrap();
    let first = append_div("aligned-bar-0");
    let third = append_div("aligned-bar-2");

    let elements = js_sys::Array::of3(&first, &JsValue::from_str("not a mark"), &third);
    let data = json(r#"[{"name": "Bronx"}, {"name": "Brooklyn"}, {"name": "Queens"}]"#)
        .dyn_into::<js_sys::Array>()
        .unwrap();
    let content = js_sys::Function::new_with_args("d", "return '<b>' + d.name + '</b>';");
    let highlight = js_sys::Function::new_with_args(
        "el, d",
        "if (d) { el.setAttribute('data-hovered', d.name); } else { el.removeAttribute('data-hovered'); }",
    );

    layer
        .attach_hover_tooltip(elements, data, content, Some(highlight))
        .unwrap()
        .expect("two marks");

    third.dispatch_event(&MouseEvent::new("mousemove").unwrap()).unwrap();
    let tooltip = document().get_element_by_id("chart-tooltip-singleton").unwrap();
    assert_eq!(tooltip.inner_html(), "<b>Queens</b>");
    assert_eq!(third.get_attribute("data-hovered").as_deref(), Some("Queens"));

    first.dispatch_event(&MouseEvent::new("mousemove").unwrap()).unwrap();
    assert_eq!(tooltip.inner_html(), "<b>Bronx</b>");
    assert_eq!(third.get_attribute("data-hovered"), None);

    layer.teardown().unwrap();
}

#[wasm_bindgen_test]
fn test_element_ids_unique_across_bindings() {
    let layer = InteractionLayer::new(JsValue::UNDEFINED).unwrap();
    let content = js_sys::Function::new_with_args("d", "return d.name;");
    let last_highlighted = |bar: &HtmlElement| {
        bar.dispatch_event(&MouseEvent::new("mousemove").unwrap()).unwrap();
        let state = layer.tooltip_state().unwrap();
        js_sys::Reflect::get(&state, &"lastHighlighted".into())
            .unwrap()
            .as_f64()
            .unwrap()
    };

    let mut seen = Vec::new();
    for id in ["first-chart-bar", "second-chart-bar"] {
        let bar = append_div(id);
        bar.set_attribute("fill", "steelblue").unwrap();
        let data = json(r#"[{"name": "Manhattan"}]"#).dyn_into::<js_sys::Array>().unwrap();
        layer
            .attach_hover_tooltip(js_sys::Array::of1(&bar), data, content.clone(), None)
            .unwrap()
            .expect("one mark");
        seen.push(last_highlighted(&bar));
    }
    assert_ne!(seen[0], seen[1]);

    layer.teardown().unwrap();
}

#[wasm_bindgen_test]
fn test_layer_truncates_to_configured_length() {
    let layer = InteractionLayer::new(json(r#"{"format": {"labelMaxLength": 6}}"#)).unwrap();
    assert_eq!(
        layer.truncate_label(Some("Brooklyn".to_string())).unwrap().as_deref(),
        Some("Brookl...")
    );
    assert_eq!(layer.truncate_label(Some("Bronx".to_string())).unwrap().as_deref(), Some("Bronx"));
    assert_eq!(layer.truncate_label(None).unwrap(), None);
}

#[wasm_bindgen_test]
fn test_cancelled_timeouts_release_their_action() {
    let timers = WindowTimers::new(web_sys::window().unwrap());
    let redraw = Rc::new(());

    let mut ids = Vec::new();
    for _ in 0..3 {
        let held = Rc::clone(&redraw);
        ids.push(timers.set_timeout(60_000, Box::new(move || drop(held))).unwrap());
    }
    assert_eq!(timers.scheduled_count(), 3);
    assert_eq!(Rc::strong_count(&redraw), 4);

    for id in ids {
        timers.clear_timeout(id);
    }
    assert_eq!(timers.scheduled_count(), 0);
    assert_eq!(Rc::strong_count(&redraw), 1);
}
