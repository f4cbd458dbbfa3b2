use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value, Serializer};
use wasm_bindgen::prelude::*;

// Create a console module for logging
pub mod console;
// Map configuration and its defaults
pub mod config;
// One-time marker icon configuration
pub mod icon_assets;
// Base tile layer
pub mod tile_layer;
// Marker positions and popups
pub mod markers;
// Static GeoJSON overlay
pub mod overlay;
// Draw toolbar options and events
pub mod draw;
// Geocoding search
pub mod search;
// Import our module state management
mod module_state;
// Import our models
pub mod models;
mod cache_keys;
// Import cancellation handling
mod cancellation;
// The map component itself
pub mod view;

use crate::config::MapConfig;
use crate::draw::{DrawCreatedEvent, DrawDeletedEvent};
use crate::icon_assets::IconAssets;
use crate::module_state::ModuleState;
use crate::search::SearchResult;
use crate::tile_layer::{tiles_for_bounds, TileCoord};
use crate::view::MapView;

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

#[wasm_bindgen]
extern "C" {
    // JavaScript function to fetch data from URL, resolving to a Uint8Array
    #[wasm_bindgen(js_namespace = wasmJsHelpers, catch)]
    pub fn fetch(url: &str) -> Result<js_sys::Promise, JsValue>;
}

// Use the macro from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => (crate::console::log(&format!($($t)*)))
}

#[macro_export]
macro_rules! console_warn {
    ($($t:tt)*) => (crate::console::warn(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        // Set the panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("WASM module initialized successfully");
    });
}

// Plain JS objects rather than ES Maps for nested JSON (GeoJSON properties)
fn to_js_object<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    Ok(value.serialize(&Serializer::json_compatible())?)
}

/// Configure the default marker icon. Only the first call has any effect.
#[wasm_bindgen]
pub fn configure_icons(assets: JsValue) -> Result<bool, JsValue> {
    let assets: IconAssets = from_value(assets)?;
    icon_assets::configure_icon_assets(assets).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen]
pub fn get_icon_assets() -> Result<JsValue, JsValue> {
    Ok(to_value(&icon_assets::icon_assets())?)
}

// Function to get geocoder cache statistics
#[wasm_bindgen]
pub fn get_search_cache_stats() -> Result<JsValue, JsValue> {
    let stats = ModuleState::with(|state| state.get_stats());
    Ok(to_value(&stats)?)
}

// Function to clear all caches
#[wasm_bindgen]
pub fn clear_search_cache() -> bool {
    ModuleState::with_mut(|state| state.clear_all_caches());
    true
}

#[wasm_bindgen]
pub fn set_search_cache_limit(max_entries: usize) -> bool {
    ModuleState::with_mut(|state| state.set_max_search_results(max_entries));
    true
}

// Abort the running search of a search box, if any
#[wasm_bindgen]
pub fn cancel_search(control_id: &str) -> bool {
    cancellation::cancel_scope(control_id)
}

pub use search::search_location;

/// The interactive map component.
///
/// The page forwards draw toolbar events and button clicks here and
/// re-renders from `render()` afterwards.
#[wasm_bindgen]
pub struct MapComponent {
    view: MapView,
}

#[wasm_bindgen]
impl MapComponent {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<MapComponent, JsValue> {
        start();
        // Icons are fixed from the first map on; the page configures them before that
        icon_assets::ensure_icon_assets();
        let config = match config_json {
            Some(json) => MapConfig::from_json(&json).map_err(|e| JsValue::from_str(&e))?,
            None => MapConfig::default(),
        };
        Ok(MapComponent {
            view: MapView::new(config),
        })
    }

    // Draw toolbar "created" handler
    pub fn on_created(&mut self, event: JsValue) -> Result<bool, JsValue> {
        let event: DrawCreatedEvent = from_value(event)?;
        self.view
            .handle_created(&event)
            .map_err(|e| JsValue::from_str(&e))
    }

    // Draw toolbar "deleted" handler
    pub fn on_deleted(&mut self, event: JsValue) -> Result<usize, JsValue> {
        let event: DrawDeletedEvent = from_value(event)?;
        Ok(self.view.handle_deleted(&event))
    }

    // Toggle button handler
    pub fn toggle_geojson(&mut self) -> bool {
        self.view.toggle_overlay()
    }

    #[wasm_bindgen(getter)]
    pub fn geojson_visible(&self) -> bool {
        self.view.is_overlay_visible()
    }

    pub fn markers(&self) -> Result<JsValue, JsValue> {
        Ok(to_value(self.view.markers())?)
    }

    #[wasm_bindgen(getter)]
    pub fn marker_count(&self) -> usize {
        self.view.marker_count()
    }

    pub fn apply_search_result(&mut self, result: JsValue) -> Result<(), JsValue> {
        let result: SearchResult = from_value(result)?;
        self.view
            .apply_search_result(result)
            .map_err(|e| JsValue::from_str(&e))
    }

    pub fn clear_search_result(&mut self) -> bool {
        self.view.clear_search_result()
    }

    pub fn tile_url(&self, x: u32, y: u32, z: u32) -> Result<String, JsValue> {
        self.view
            .tile_url(TileCoord { x, y, z })
            .map_err(|e| JsValue::from_str(&e))
    }

    // URLs of every tile covering a bbox, e.g. for prefetching
    pub fn tile_urls_for_bounds(
        &self,
        min_lng: f64,
        min_lat: f64,
        max_lng: f64,
        max_lat: f64,
        zoom: u32,
    ) -> Result<Vec<String>, JsValue> {
        tiles_for_bounds(min_lng, min_lat, max_lng, max_lat, zoom)
            .map_err(|e| JsValue::from_str(&e))?
            .into_iter()
            .map(|tile| self.view.tile_url(tile))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| JsValue::from_str(&e))
    }

    pub fn config(&self) -> Result<JsValue, JsValue> {
        to_js_object(self.view.config())
    }

    pub fn render(&self) -> Result<JsValue, JsValue> {
        let scene = self.view.render().map_err(|e| JsValue::from_str(&e))?;
        to_js_object(&scene)
    }
}

// Test function to verify initialization is idempotent
#[wasm_bindgen]
pub fn test_initialization() -> String {
    start();
    start();
    start();
    "Initialization test passed - no panics occurred".to_string()
}
