use serde::{Deserialize, Serialize};

// Web Mercator stops being defined past this latitude
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

pub const DEFAULT_TILE_SIZE: u32 = 256;

// Deepest zoom whose tile grid still fits u32 coordinates
pub const MAX_TILE_ZOOM: u32 = 30;

// Upper bound on tiles listed for one bounding box
pub const MAX_TILES_PER_BOUNDS: u64 = 4096;

// Address of a single map tile
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

// Base layer configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TileLayerConfig {
    pub url_template: String,
    pub subdomains: Vec<String>,
    pub attribution: String,
    pub min_zoom: u32,
    pub max_zoom: u32,
    pub tile_size: u32,
    pub detect_retina: bool,
}

impl Default for TileLayerConfig {
    fn default() -> Self {
        TileLayerConfig {
            url_template: "https://{s}.google.com/vt/lyrs=m&x={x}&y={y}&z={z}".to_string(),
            subdomains: vec![
                "mt0".to_string(),
                "mt1".to_string(),
                "mt2".to_string(),
                "mt3".to_string(),
            ],
            attribution:
                "&copy; <a href=\"https://www.google.com/maps\">Google Maps</a> contributors"
                    .to_string(),
            min_zoom: 0,
            max_zoom: 20,
            tile_size: DEFAULT_TILE_SIZE,
            detect_retina: false,
        }
    }
}

impl TileLayerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_zoom > self.max_zoom {
            return Err(format!(
                "min_zoom {} is greater than max_zoom {}",
                self.min_zoom, self.max_zoom
            ));
        }
        if self.url_template.contains("{s}") && self.subdomains.is_empty() {
            return Err("Tile URL template uses {s} but no subdomains are configured".to_string());
        }
        if self.max_zoom > MAX_TILE_ZOOM {
            return Err(format!(
                "max_zoom {} is deeper than the supported {}",
                self.max_zoom, MAX_TILE_ZOOM
            ));
        }
        if self.tile_size == 0 {
            return Err("tile_size must be positive".to_string());
        }
        Ok(())
    }

    // Subdomain rotation keeps neighbouring tiles on different hosts
    fn subdomain(&self, x: u32, y: u32) -> Option<&str> {
        if self.subdomains.is_empty() {
            return None;
        }
        let index = (x as u64 + y as u64) % self.subdomains.len() as u64;
        Some(self.subdomains[index as usize].as_str())
    }

    /// Expand the URL template for one tile.
    ///
    /// Supported placeholders are `{s}`, `{x}`, `{y}`, `{-y}` (TMS row order),
    /// `{z}` and `{r}`.
    pub fn tile_url(&self, tile: TileCoord) -> Result<String, String> {
        if tile.z < self.min_zoom || tile.z > self.max_zoom || tile.z > MAX_TILE_ZOOM {
            return Err(format!(
                "Zoom {} outside of [{}, {}]",
                tile.z, self.min_zoom, self.max_zoom
            ));
        }
        let limit = tile_count_per_axis(tile.z);
        if tile.x as u64 >= limit || tile.y as u64 >= limit {
            return Err(format!(
                "Tile {}/{}/{} is outside the zoom level grid",
                tile.z, tile.x, tile.y
            ));
        }

        let retina = if self.detect_retina { "@2x" } else { "" };
        let mut url = String::with_capacity(self.url_template.len() + 16);
        let mut rest = self.url_template.as_str();

        while let Some(open) = rest.find('{') {
            url.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = match after.find('}') {
                Some(close) => close,
                None => {
                    // Unterminated brace, copy verbatim
                    url.push_str(&rest[open..]);
                    rest = "";
                    break;
                }
            };
            let name = after[..close].trim();
            match name {
                "s" => match self.subdomain(tile.x, tile.y) {
                    Some(sub) => url.push_str(sub),
                    None => return Err("No value provided for variable {s}".to_string()),
                },
                "x" => url.push_str(&tile.x.to_string()),
                "y" => url.push_str(&tile.y.to_string()),
                "-y" => url.push_str(&(limit - 1 - tile.y as u64).to_string()),
                "z" => url.push_str(&tile.z.to_string()),
                "r" => url.push_str(retina),
                other => return Err(format!("No value provided for variable {{{}}}", other)),
            }
            rest = &after[close + 1..];
        }
        url.push_str(rest);

        Ok(url)
    }
}

fn tile_count_per_axis(zoom: u32) -> u64 {
    1u64 << zoom.min(MAX_TILE_ZOOM)
}

// Convert longitude to tile X coordinate
pub fn lng_to_tile_x(lng: f64, zoom: u32) -> u32 {
    let n = tile_count_per_axis(zoom) as f64;
    let x = ((lng + 180.0) / 360.0 * n).floor();
    x.clamp(0.0, n - 1.0) as u32
}

// Convert latitude to tile Y coordinate
pub fn lat_to_tile_y(lat: f64, zoom: u32) -> u32 {
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let n = tile_count_per_axis(zoom) as f64;
    let y = ((1.0 - ((lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI)) / 2.0
        * n)
        .floor();
    y.clamp(0.0, n - 1.0) as u32
}

// Tiles needed to cover a bounding box, row by row from the north
pub fn tiles_for_bounds(
    min_lng: f64,
    min_lat: f64,
    max_lng: f64,
    max_lat: f64,
    zoom: u32,
) -> Result<Vec<TileCoord>, String> {
    if zoom > MAX_TILE_ZOOM {
        return Err(format!(
            "Zoom {} is deeper than the supported {}",
            zoom, MAX_TILE_ZOOM
        ));
    }
    let min_x = lng_to_tile_x(min_lng.min(max_lng), zoom);
    let max_x = lng_to_tile_x(min_lng.max(max_lng), zoom);
    // y grows southwards
    let min_y = lat_to_tile_y(min_lat.max(max_lat), zoom);
    let max_y = lat_to_tile_y(min_lat.min(max_lat), zoom);

    let count = (max_x - min_x + 1) as u64 * (max_y - min_y + 1) as u64;
    if count > MAX_TILES_PER_BOUNDS {
        return Err(format!(
            "Bounds need {} tiles at zoom {}, limit is {}",
            count, zoom, MAX_TILES_PER_BOUNDS
        ));
    }

    let mut tiles = Vec::with_capacity(count as usize);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            tiles.push(TileCoord { x, y, z: zoom });
        }
    }
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_rotates_subdomains() {
        let layer = TileLayerConfig::default();
        let url = layer.tile_url(TileCoord { x: 4093, y: 2724, z: 13 }).unwrap();
        // (4093 + 2724) % 4 == 1
        assert_eq!(url, "https://mt1.google.com/vt/lyrs=m&x=4093&y=2724&z=13");

        let url = layer.tile_url(TileCoord { x: 4094, y: 2724, z: 13 }).unwrap();
        assert!(url.starts_with("https://mt2.google.com/"));
    }

    #[test]
    fn retina_placeholder_expands() {
        let mut layer = TileLayerConfig {
            url_template: "https://tiles.example.com/{z}/{x}/{y}{r}.png".to_string(),
            subdomains: Vec::new(),
            ..TileLayerConfig::default()
        };
        let tile = TileCoord { x: 1, y: 2, z: 3 };
        assert_eq!(layer.tile_url(tile).unwrap(), "https://tiles.example.com/3/1/2.png");
        layer.detect_retina = true;
        assert_eq!(layer.tile_url(tile).unwrap(), "https://tiles.example.com/3/1/2@2x.png");
    }

    #[test]
    fn inverted_y_counts_from_the_south() {
        let layer = TileLayerConfig {
            url_template: "https://t.example/{z}/{x}/{-y}.png".to_string(),
            subdomains: Vec::new(),
            ..TileLayerConfig::default()
        };
        assert_eq!(
            layer.tile_url(TileCoord { x: 1, y: 0, z: 2 }).unwrap(),
            "https://t.example/2/1/3.png"
        );
        // 2^13 - 1 - 2724
        assert_eq!(
            layer.tile_url(TileCoord { x: 4093, y: 2724, z: 13 }).unwrap(),
            "https://t.example/13/4093/5467.png"
        );
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let layer = TileLayerConfig {
            url_template: "https://{s}.example.com/{z}/{x}/{y}.png?key={apikey}".to_string(),
            ..TileLayerConfig::default()
        };
        let err = layer.tile_url(TileCoord { x: 0, y: 0, z: 0 }).unwrap_err();
        assert_eq!(err, "No value provided for variable {apikey}");
    }

    #[test]
    fn zoom_and_grid_are_checked() {
        let layer = TileLayerConfig::default();
        assert!(layer.tile_url(TileCoord { x: 0, y: 0, z: 21 }).is_err());
        assert!(layer.tile_url(TileCoord { x: 2, y: 0, z: 1 }).is_err());
    }

    #[test]
    fn subdomain_template_without_subdomains_is_invalid() {
        let layer = TileLayerConfig {
            subdomains: Vec::new(),
            ..TileLayerConfig::default()
        };
        assert!(layer.validate().is_err());
        assert!(TileLayerConfig::default().validate().is_ok());
    }

    #[test]
    fn london_center_tile() {
        assert_eq!(lng_to_tile_x(-0.09, 13), 4093);
        assert_eq!(lat_to_tile_y(51.505, 13), 2724);
    }

    #[test]
    fn polar_latitudes_are_clamped() {
        assert_eq!(lat_to_tile_y(90.0, 2), 0);
        assert_eq!(lat_to_tile_y(-90.0, 2), 3);
    }

    #[test]
    fn bounds_cover_overlay() {
        let tiles = tiles_for_bounds(-0.1, 51.505, -0.06, 51.51, 13).unwrap();
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[0], TileCoord { x: 4093, y: 2723, z: 13 });
        assert!(tiles.iter().all(|t| t.z == 13));
    }

    #[test]
    fn zoom_past_the_tile_grid_is_refused() {
        let err = tiles_for_bounds(-0.1, 51.505, -0.0999, 51.5051, 31).unwrap_err();
        assert_eq!(err, "Zoom 31 is deeper than the supported 30");
        assert!(tiles_for_bounds(-0.1, 51.505, -0.0999, 51.5051, 20).is_ok());

        let layer = TileLayerConfig {
            max_zoom: 31,
            ..TileLayerConfig::default()
        };
        assert!(layer.validate().is_err());
        assert!(layer.tile_url(TileCoord { x: 0, y: 0, z: 31 }).is_err());
    }

    #[test]
    fn whole_world_at_high_zoom_is_refused() {
        assert!(tiles_for_bounds(-180.0, -85.0, 180.0, 85.0, 18).is_err());
        assert_eq!(tiles_for_bounds(-180.0, -85.0, 180.0, 85.0, 1).unwrap().len(), 4);
    }
}
