use serde::{Deserialize, Serialize};

use crate::markers::LatLng;

// Shape types the draw toolbar knows about
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Marker,
    Polygon,
    Polyline,
    Rectangle,
    Circle,
    #[serde(rename = "circlemarker")]
    CircleMarker,
}

// Corner of the map the toolbar is docked to
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

// Draw toolbar options
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DrawControlOptions {
    pub position: ControlPosition,
    pub marker: bool,
    pub polygon: bool,
    pub polyline: bool,
    pub rectangle: bool,
    pub circle: bool,
    pub circlemarker: bool,
}

impl Default for DrawControlOptions {
    fn default() -> Self {
        DrawControlOptions {
            position: ControlPosition::TopRight,
            marker: true,
            polygon: true,
            polyline: false,
            rectangle: false,
            circle: false,
            circlemarker: false,
        }
    }
}

impl DrawControlOptions {
    pub fn is_enabled(&self, kind: ShapeKind) -> bool {
        match kind {
            ShapeKind::Marker => self.marker,
            ShapeKind::Polygon => self.polygon,
            ShapeKind::Polyline => self.polyline,
            ShapeKind::Rectangle => self.rectangle,
            ShapeKind::Circle => self.circle,
            ShapeKind::CircleMarker => self.circlemarker,
        }
    }
}

// A shape on the drawing layer; point shapes carry their position
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrawnLayer {
    pub layer_type: ShapeKind,
    #[serde(default)]
    pub lat_lng: Option<LatLng>,
}

// Payload of the toolbar's "created" event
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrawCreatedEvent {
    pub layer_type: ShapeKind,
    #[serde(default)]
    pub lat_lng: Option<LatLng>,
}

impl DrawCreatedEvent {
    /// Position of a newly drawn marker, `None` for any other shape.
    pub fn marker_position(&self) -> Result<Option<LatLng>, String> {
        if self.layer_type != ShapeKind::Marker {
            return Ok(None);
        }
        match self.lat_lng {
            Some(position) => position.validated().map(Some),
            None => Err("Created marker event carries no latLng".to_string()),
        }
    }
}

// Payload of the toolbar's "deleted" event
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct DrawDeletedEvent {
    #[serde(default)]
    pub layers: Vec<DrawnLayer>,
}

impl DrawDeletedEvent {
    // Positions of deleted shapes that have one
    pub fn point_positions(&self) -> impl Iterator<Item = &LatLng> {
        self.layers.iter().filter_map(|layer| layer.lat_lng.as_ref())
    }
}
