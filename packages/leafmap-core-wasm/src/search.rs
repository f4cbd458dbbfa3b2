use js_sys::Uint8Array;
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::to_value;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::cache_keys::make_search_key;
use crate::cancellation::{begin_operation, finish_operation, CancellationToken};
use crate::markers::LatLng;
use crate::models::SearchResponse;
use crate::module_state::ModuleState;
use crate::overlay::LatLngBounds;
use crate::{console_log, fetch};

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

// Search box and geocoder configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub show_marker: bool,
    pub retain_zoom_level: bool,
    pub animate_zoom: bool,
    pub auto_close: bool,
    pub search_label: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            endpoint: NOMINATIM_SEARCH_URL.to_string(),
            show_marker: true,
            retain_zoom_level: false,
            animate_zoom: true,
            auto_close: true,
            search_label: "Enter address".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("Search endpoint must not be empty".to_string());
        }
        Url::parse(&self.endpoint).map_err(|e| format!("Invalid search endpoint: {}", e))?;
        Ok(())
    }

    /// How the map view should react to a chosen result.
    pub fn view_change(&self, result: &SearchResult, current_zoom: u32) -> ViewChange {
        let center = result.position();
        match result.bounds {
            Some(bounds) if !self.retain_zoom_level => ViewChange::FitBounds {
                bounds,
                animate: self.animate_zoom,
            },
            _ => ViewChange::SetView {
                center,
                zoom: current_zoom,
                animate: self.animate_zoom,
            },
        }
    }
}

// One geocoder hit, x = longitude and y = latitude
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub bounds: Option<LatLngBounds>,
}

impl SearchResult {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.y, self.x)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewChange {
    FitBounds { bounds: LatLngBounds, animate: bool },
    SetView { center: LatLng, zoom: u32, animate: bool },
}

// Raw Nominatim record; coordinates arrive as strings
#[derive(Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    boundingbox: Option<Vec<String>>,
}

impl NominatimPlace {
    fn into_result(self) -> Option<SearchResult> {
        let x = self.lon.trim().parse::<f64>().ok()?;
        let y = self.lat.trim().parse::<f64>().ok()?;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(SearchResult {
            x,
            y,
            label: self.display_name,
            bounds: self.boundingbox.as_deref().and_then(parse_bounding_box),
        })
    }
}

// Nominatim order is [south, north, west, east]
fn parse_bounding_box(raw: &[String]) -> Option<LatLngBounds> {
    if raw.len() != 4 {
        return None;
    }
    let mut values = [0.0; 4];
    for (slot, text) in values.iter_mut().zip(raw) {
        *slot = text.trim().parse::<f64>().ok()?;
    }
    let [south, north, west, east] = values;
    Some([[south, west], [north, east]])
}

/// Geocoder backed by the OpenStreetMap Nominatim search API.
#[derive(Clone, Debug, PartialEq)]
pub struct OpenStreetMapProvider {
    endpoint: String,
}

impl Default for OpenStreetMapProvider {
    fn default() -> Self {
        OpenStreetMapProvider::new(NOMINATIM_SEARCH_URL)
    }
}

impl OpenStreetMapProvider {
    pub fn new(endpoint: &str) -> Self {
        OpenStreetMapProvider {
            endpoint: endpoint.to_string(),
        }
    }

    pub fn search_url(&self, query: &str) -> Result<String, String> {
        let query = query.trim();
        if query.is_empty() {
            return Err("Search query must not be empty".to_string());
        }
        let url = Url::parse_with_params(&self.endpoint, &[("format", "json"), ("q", query)])
            .map_err(|e| format!("Invalid search endpoint {}: {}", self.endpoint, e))?;
        Ok(url.into())
    }

    pub fn parse_results(&self, body: &[u8]) -> Result<Vec<SearchResult>, String> {
        let places: Vec<serde_json::Value> = serde_json::from_slice(body)
            .map_err(|e| format!("Unexpected geocoder response: {}", e))?;

        Ok(places
            .into_iter()
            .filter_map(|place| serde_json::from_value::<NominatimPlace>(place).ok())
            .filter_map(NominatimPlace::into_result)
            .collect())
    }
}

// Where the answer of a started search comes from
enum SearchStart {
    Cached(Vec<SearchResult>),
    Fetch(CancellationToken),
}

// Every search supersedes the previous one of its control, cached or not
fn begin_search(control_id: &str, cache_key: &str) -> Result<SearchStart, String> {
    let token = begin_operation(control_id)?;
    match ModuleState::with_mut(|state| state.get_search_results(cache_key)) {
        Some(results) => {
            finish_operation(&token);
            Ok(SearchStart::Cached(results))
        }
        None => Ok(SearchStart::Fetch(token)),
    }
}

// Called once the fetch settled, whatever its outcome
fn end_search(token: &CancellationToken) -> Result<(), String> {
    finish_operation(token);
    token.throw_if_cancelled()
}

fn store_search_results(
    provider: &OpenStreetMapProvider,
    cache_key: String,
    body: &[u8],
) -> Result<Vec<SearchResult>, String> {
    let results = provider.parse_results(body)?;
    ModuleState::with_mut(|state| state.add_search_results(cache_key, results.clone()));
    Ok(results)
}

/// Geocode `query` for the search box identified by `control_id`.
///
/// Answers come from the module cache when possible. A newer search on the
/// same control supersedes this one, which then fails as cancelled.
#[wasm_bindgen]
pub async fn search_location(
    control_id: String,
    query: String,
    endpoint: Option<String>,
) -> Result<JsValue, JsValue> {
    let provider = OpenStreetMapProvider::new(endpoint.as_deref().unwrap_or(NOMINATIM_SEARCH_URL));
    let url = provider
        .search_url(&query)
        .map_err(|e| JsValue::from_str(&e))?;
    let cache_key = make_search_key(&provider.endpoint, &query);

    let start = begin_search(&control_id, &cache_key).map_err(|e| JsValue::from_str(&e))?;
    let token = match start {
        SearchStart::Cached(results) => {
            console_log!("Search cache hit for '{}' ({} results)", query.trim(), results.len());
            return Ok(to_value(&SearchResponse {
                query,
                from_cache: true,
                results,
            })?);
        }
        SearchStart::Fetch(token) => token,
    };
    console_log!("Geocoding '{}' as {}", query.trim(), token.id);

    let fetched = match fetch(&url) {
        Ok(promise) => JsFuture::from(promise).await,
        Err(e) => Err(e),
    };
    end_search(&token).map_err(|e| JsValue::from_str(&e))?;

    let body = Uint8Array::new(&fetched?).to_vec();
    let results = store_search_results(&provider, cache_key, &body)
        .map_err(|e| JsValue::from_str(&e))?;
    console_log!("Geocoder returned {} results for '{}'", results.len(), query.trim());

    Ok(to_value(&SearchResponse {
        query,
        from_cache: false,
        results,
    })?)
}
