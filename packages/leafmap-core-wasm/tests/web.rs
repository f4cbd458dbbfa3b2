//! Browser tests for the JS-facing surface. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use js_sys::Reflect;
use leafmap_core_wasm::{
    get_icon_assets, get_search_cache_stats, test_initialization, MapComponent,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn js_object(json: &str) -> JsValue {
    js_sys::JSON::parse(json).unwrap()
}

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn start_is_idempotent() {
    assert_eq!(
        test_initialization(),
        "Initialization test passed - no panics occurred"
    );
}

#[wasm_bindgen_test]
fn draw_events_drive_the_marker_sequence() {
    let mut map = MapComponent::new(None).unwrap();
    assert!(map
        .on_created(js_object(
            r#"{"layerType":"marker","latLng":{"lat":51.5,"lng":-0.1}}"#
        ))
        .unwrap());
    assert!(map
        .on_created(js_object(
            r#"{"layerType":"marker","latLng":{"lat":51.52,"lng":-0.08}}"#
        ))
        .unwrap());
    assert!(!map.on_created(js_object(r#"{"layerType":"polygon"}"#)).unwrap());
    assert_eq!(map.marker_count(), 2);

    let removed = map
        .on_deleted(js_object(
            r#"{"layers":[{"layerType":"marker","latLng":{"lat":51.5,"lng":-0.1}}]}"#,
        ))
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(map.marker_count(), 1);
}

#[wasm_bindgen_test]
fn render_reflects_toggle_state() {
    let mut map = MapComponent::new(None).unwrap();
    assert!(map.geojson_visible());

    let scene = map.render().unwrap();
    let overlay = get(&scene, "overlay");
    assert!(overlay.is_object());
    let data_type = get(&get(&overlay, "data"), "type");
    assert_eq!(data_type.as_string().as_deref(), Some("FeatureCollection"));

    assert!(!map.toggle_geojson());
    assert!(get(&map.render().unwrap(), "overlay").is_null());
    assert!(map.toggle_geojson());
}

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    assert!(MapComponent::new(Some(r#"{"zoom": 99}"#.to_string())).is_err());
    assert!(MapComponent::new(Some("not json".to_string())).is_err());
}

#[wasm_bindgen_test]
fn tile_urls_use_configured_template() {
    let map = MapComponent::new(None).unwrap();
    assert_eq!(
        map.tile_url(0, 0, 0).unwrap(),
        "https://mt0.google.com/vt/lyrs=m&x=0&y=0&z=0"
    );
    assert!(map.tile_url(0, 0, 30).is_err());
}

#[wasm_bindgen_test]
fn icon_assets_are_exposed() {
    let _map = MapComponent::new(None).unwrap();
    let assets = get_icon_assets().unwrap();
    let icon_url = get(&assets, "icon_url").as_string().unwrap();
    assert!(icon_url.ends_with("marker-icon.png"));
}

#[wasm_bindgen_test]
fn cache_stats_are_reported() {
    let stats = get_search_cache_stats().unwrap();
    assert!(get(&stats, "max_search_entries").as_f64().unwrap() > 0.0);
}
