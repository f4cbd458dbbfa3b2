use serde::{Deserialize, Serialize};

// Precision used by the mapping library when printing coordinates
const LATLNG_PRECISION: i32 = 6;

// Popup shown on the marker placed at the map center
pub const STATIC_MARKER_POPUP: &str = "You clicked the marker!";

// A geographic position in degrees
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }

    /// Reject coordinates the map could never place.
    pub fn validated(self) -> Result<Self, String> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(format!("Invalid LatLng object: ({}, {})", self.lat, self.lng));
        }
        Ok(self)
    }

    // Exact equality on both axes
    pub fn same_position(&self, other: &LatLng) -> bool {
        self.lat == other.lat && self.lng == other.lng
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LatLng({}, {})",
            format_num(self.lat, LATLNG_PRECISION),
            format_num(self.lng, LATLNG_PRECISION)
        )
    }
}

// Round to `precision` decimals the way the browser does (half rounds up)
fn format_num(num: f64, precision: i32) -> f64 {
    let pow = 10f64.powi(precision);
    let rounded = (num * pow + 0.5).floor() / pow;
    // Avoid printing "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

// Popup text for a user-drawn marker
pub fn marker_popup_text(position: &LatLng) -> String {
    format!("Marker at {}", position)
}

// The fixed marker every map shows
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct StaticMarker {
    pub position: LatLng,
    pub popup: String,
}

impl StaticMarker {
    pub fn at(position: LatLng) -> Self {
        StaticMarker {
            position,
            popup: STATIC_MARKER_POPUP.to_string(),
        }
    }
}

/// Ordered positions of the markers the user has drawn.
///
/// Insertion order is draw order; the rendered marker keys are derived from
/// the index in this sequence.
#[derive(Serialize, Clone, Debug, Default)]
pub struct MarkerStore {
    positions: Vec<LatLng>,
}

impl MarkerStore {
    pub fn new() -> Self {
        MarkerStore {
            positions: Vec::new(),
        }
    }

    pub fn push(&mut self, position: LatLng) {
        self.positions.push(position);
    }

    /// Remove every marker sitting exactly at `position`.
    ///
    /// Returns how many markers were removed.
    pub fn remove_matching(&mut self, position: &LatLng) -> usize {
        let before = self.positions.len();
        self.positions.retain(|marker| !marker.same_position(position));
        before - self.positions.len()
    }

    pub fn positions(&self) -> &[LatLng] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
