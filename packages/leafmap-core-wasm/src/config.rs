use serde::{Deserialize, Serialize};

use crate::draw::DrawControlOptions;
use crate::markers::LatLng;
use crate::search::SearchConfig;
use crate::tile_layer::TileLayerConfig;

// CSS size of the map container
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ContainerStyle {
    pub height: String,
    pub width: String,
}

impl Default for ContainerStyle {
    fn default() -> Self {
        ContainerStyle {
            height: "100vh".to_string(),
            width: "100%".to_string(),
        }
    }
}

/// Everything the map component needs to know before its first render.
///
/// Every field may be omitted from the JSON form; missing fields take the
/// defaults below.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub center: LatLng,
    pub zoom: u32,
    pub style: ContainerStyle,
    pub tile_layer: TileLayerConfig,
    pub search: SearchConfig,
    pub draw: DrawControlOptions,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            center: LatLng::new(51.505, -0.09),
            zoom: 13,
            style: ContainerStyle::default(),
            tile_layer: TileLayerConfig::default(),
            search: SearchConfig::default(),
            draw: DrawControlOptions::default(),
        }
    }
}

impl MapConfig {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: MapConfig =
            serde_json::from_str(json).map_err(|e| format!("Invalid map config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let center = self.center.validated()?;
        if !(-90.0..=90.0).contains(&center.lat) {
            return Err(format!("Center latitude {} outside [-90, 90]", center.lat));
        }
        if !(-180.0..=180.0).contains(&center.lng) {
            return Err(format!("Center longitude {} outside [-180, 180]", center.lng));
        }

        self.tile_layer.validate()?;
        if self.zoom < self.tile_layer.min_zoom || self.zoom > self.tile_layer.max_zoom {
            return Err(format!(
                "Zoom {} outside [{}, {}]",
                self.zoom, self.tile_layer.min_zoom, self.tile_layer.max_zoom
            ));
        }

        self.search.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_london_view() {
        let config = MapConfig::default();
        assert_eq!(config.center, LatLng::new(51.505, -0.09));
        assert_eq!(config.zoom, 13);
        assert_eq!(config.style.height, "100vh");
        assert_eq!(config.style.width, "100%");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(MapConfig::from_json("{}").unwrap(), MapConfig::default());
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let config = MapConfig::from_json(
            r#"{"zoom": 10, "tile_layer": {"attribution": "OSM"}, "search": {"show_marker": false}}"#,
        )
        .unwrap();
        assert_eq!(config.zoom, 10);
        assert_eq!(config.tile_layer.attribution, "OSM");
        assert_eq!(config.tile_layer.subdomains.len(), 4);
        assert!(!config.search.show_marker);
        assert!(config.search.auto_close);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(MapConfig::from_json(r#"{"center": {"lat": 91.0, "lng": 0.0}}"#).is_err());
        assert!(MapConfig::from_json(r#"{"center": {"lat": 0.0, "lng": -181.0}}"#).is_err());
        assert!(MapConfig::from_json(r#"{"zoom": 25}"#).is_err());
        assert!(
            MapConfig::from_json(r#"{"tile_layer": {"min_zoom": 5, "max_zoom": 3}, "zoom": 4}"#)
                .is_err()
        );
        assert!(MapConfig::from_json(r#"{"search": {"endpoint": ""}}"#).is_err());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = MapConfig::from_json("{zoom: 3").unwrap_err();
        assert!(err.starts_with("Invalid map config"));
    }
}
