use geo::BoundingRect;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};

// Ring of the built-in overlay in (lng, lat) order
const OVERLAY_RING: [[f64; 2]; 5] = [
    [-0.1, 51.505],
    [-0.1, 51.51],
    [-0.06, 51.51],
    [-0.06, 51.505],
    [-0.1, 51.505],
];

// Stroke/fill style handed to the GeoJSON layer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PathStyle {
    pub color: String,
    pub opacity: f64,
}

impl Default for PathStyle {
    fn default() -> Self {
        PathStyle {
            color: "red".to_string(),
            opacity: 0.5,
        }
    }
}

// [[south, west], [north, east]]
pub type LatLngBounds = [[f64; 2]; 2];

// The feature collection shown by the overlay
pub fn default_overlay_data() -> FeatureCollection {
    let ring: Vec<Vec<f64>> = OVERLAY_RING.iter().map(|c| c.to_vec()).collect();
    let feature = Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: None,
        properties: Some(JsonObject::new()),
        foreign_members: None,
    };
    FeatureCollection {
        bbox: None,
        features: vec![feature],
        foreign_members: None,
    }
}

/// Static polygon overlay with a visibility flag.
///
/// The data never changes after construction; only `visible` does.
#[derive(Clone, Debug)]
pub struct OverlayLayer {
    data: FeatureCollection,
    style: PathStyle,
    visible: bool,
}

impl Default for OverlayLayer {
    fn default() -> Self {
        OverlayLayer {
            data: default_overlay_data(),
            style: PathStyle::default(),
            visible: true,
        }
    }
}

impl OverlayLayer {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    // Flip visibility and report the new state
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn data(&self) -> &FeatureCollection {
        &self.data
    }

    pub fn style(&self) -> &PathStyle {
        &self.style
    }

    // Extent of every feature geometry
    pub fn bounds(&self) -> Result<Option<LatLngBounds>, String> {
        let collection: geo_types::GeometryCollection<f64> =
            geojson::quick_collection(&GeoJson::FeatureCollection(self.data.clone()))
                .map_err(|e| format!("Overlay geometry could not be converted: {}", e))?;
        Ok(collection.bounding_rect().map(|rect| {
            [
                [rect.min().y, rect.min().x],
                [rect.max().y, rect.max().x],
            ]
        }))
    }
}
