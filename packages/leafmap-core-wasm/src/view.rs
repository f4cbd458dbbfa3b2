use geojson::FeatureCollection;
use serde::Serialize;

use crate::config::{ContainerStyle, MapConfig};
use crate::console_log;
use crate::draw::{DrawControlOptions, DrawCreatedEvent, DrawDeletedEvent};
use crate::icon_assets::{icon_assets, IconAssets};
use crate::markers::{marker_popup_text, LatLng, MarkerStore, StaticMarker};
use crate::overlay::{LatLngBounds, OverlayLayer, PathStyle};
use crate::search::{SearchConfig, SearchResult, ViewChange};
use crate::tile_layer::{TileCoord, TileLayerConfig};

pub const TOGGLE_BUTTON_LABEL: &str = "Toggle GeoJSON Layer";
pub const STATIC_MARKER_KEY: &str = "static-marker";
pub const SEARCH_RESULT_KEY: &str = "search-result";

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ContainerScene {
    pub center: LatLng,
    pub zoom: u32,
    pub style: ContainerStyle,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MarkerScene {
    pub key: String,
    pub position: LatLng,
    pub popup: String,
    pub icon: IconAssets,
}

#[derive(Serialize, Clone, Debug)]
pub struct OverlayScene {
    pub data: FeatureCollection,
    pub style: PathStyle,
    pub bounds: Option<LatLngBounds>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SearchResultScene {
    pub label: String,
    pub marker: Option<MarkerScene>,
    pub view: ViewChange,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ButtonScene {
    pub label: String,
}

/// Everything the page has to draw for the current state.
#[derive(Serialize, Clone, Debug)]
pub struct MapScene {
    pub container: ContainerScene,
    pub tile_layer: TileLayerConfig,
    pub search_control: SearchConfig,
    pub static_marker: MarkerScene,
    pub overlay: Option<OverlayScene>,
    pub markers: Vec<MarkerScene>,
    pub draw_control: DrawControlOptions,
    pub search_result: Option<SearchResultScene>,
    pub toggle_button: ButtonScene,
}

/// State of one map component: drawn markers, overlay visibility and the
/// last chosen search result.
///
/// Every rendered user marker corresponds to exactly one entry of the marker
/// sequence, in draw order.
#[derive(Clone, Debug)]
pub struct MapView {
    config: MapConfig,
    static_marker: StaticMarker,
    markers: MarkerStore,
    overlay: OverlayLayer,
    search_result: Option<SearchResult>,
}

impl Default for MapView {
    fn default() -> Self {
        MapView::new(MapConfig::default())
    }
}

impl MapView {
    pub fn new(config: MapConfig) -> Self {
        MapView {
            static_marker: StaticMarker::at(config.center),
            config,
            markers: MarkerStore::new(),
            overlay: OverlayLayer::default(),
            search_result: None,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Handle the draw toolbar's "created" event.
    ///
    /// Returns `true` when a marker was appended.
    pub fn handle_created(&mut self, event: &DrawCreatedEvent) -> Result<bool, String> {
        if !self.config.draw.is_enabled(event.layer_type) {
            console_log!("Ignoring {:?} shape, it is disabled in the toolbar", event.layer_type);
            return Ok(false);
        }
        match event.marker_position()? {
            Some(position) => {
                self.markers.push(position);
                console_log!("Marker added at {}, {} markers", position, self.markers.len());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // Handle the draw toolbar's "deleted" event, returns removed marker count
    pub fn handle_deleted(&mut self, event: &DrawDeletedEvent) -> usize {
        let removed: usize = event
            .point_positions()
            .map(|position| self.markers.remove_matching(position))
            .sum();
        if removed > 0 {
            console_log!("Removed {} markers, {} remain", removed, self.markers.len());
        }
        removed
    }

    pub fn toggle_overlay(&mut self) -> bool {
        self.overlay.toggle()
    }

    pub fn is_overlay_visible(&self) -> bool {
        self.overlay.is_visible()
    }

    pub fn markers(&self) -> &[LatLng] {
        self.markers.positions()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn apply_search_result(&mut self, result: SearchResult) -> Result<(), String> {
        result.position().validated()?;
        self.search_result = Some(result);
        Ok(())
    }

    pub fn clear_search_result(&mut self) -> bool {
        self.search_result.take().is_some()
    }

    pub fn tile_url(&self, tile: TileCoord) -> Result<String, String> {
        self.config.tile_layer.tile_url(tile)
    }

    pub fn render(&self) -> Result<MapScene, String> {
        let icon = icon_assets();

        let overlay = if self.overlay.is_visible() {
            Some(OverlayScene {
                data: self.overlay.data().clone(),
                style: self.overlay.style().clone(),
                bounds: self.overlay.bounds()?,
            })
        } else {
            None
        };

        let markers = self
            .markers
            .positions()
            .iter()
            .enumerate()
            .map(|(idx, position)| MarkerScene {
                key: format!("marker-{}", idx),
                position: *position,
                popup: marker_popup_text(position),
                icon: icon.clone(),
            })
            .collect();

        let search = &self.config.search;
        let search_result = self.search_result.as_ref().map(|result| SearchResultScene {
            label: result.label.clone(),
            marker: search.show_marker.then(|| MarkerScene {
                key: SEARCH_RESULT_KEY.to_string(),
                position: result.position(),
                popup: result.label.clone(),
                icon: icon.clone(),
            }),
            view: search.view_change(result, self.config.zoom),
        });

        Ok(MapScene {
            container: ContainerScene {
                center: self.config.center,
                zoom: self.config.zoom,
                style: self.config.style.clone(),
            },
            tile_layer: self.config.tile_layer.clone(),
            search_control: search.clone(),
            static_marker: MarkerScene {
                key: STATIC_MARKER_KEY.to_string(),
                position: self.static_marker.position,
                popup: self.static_marker.popup.clone(),
                icon,
            },
            overlay,
            markers,
            draw_control: self.config.draw.clone(),
            search_result,
            toggle_button: ButtonScene {
                label: TOGGLE_BUTTON_LABEL.to_string(),
            },
        })
    }
}
