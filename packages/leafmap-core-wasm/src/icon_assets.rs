use lazy_static::lazy_static;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::console_warn;

const CDN_BASE: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.3.1/images";

// URLs and geometry of the default marker icon
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct IconAssets {
    pub icon_url: String,
    pub icon_retina_url: String,
    pub shadow_url: String,
    pub icon_size: [u32; 2],
    pub icon_anchor: [u32; 2],
    pub popup_anchor: [i32; 2],
    pub shadow_size: [u32; 2],
}

impl Default for IconAssets {
    fn default() -> Self {
        IconAssets {
            icon_url: format!("{}/marker-icon.png", CDN_BASE),
            icon_retina_url: format!("{}/marker-icon.png", CDN_BASE),
            shadow_url: format!("{}/marker-shadow.png", CDN_BASE),
            icon_size: [25, 41],
            icon_anchor: [12, 41],
            popup_anchor: [1, -34],
            shadow_size: [41, 41],
        }
    }
}

impl IconAssets {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("icon_url", &self.icon_url),
            ("icon_retina_url", &self.icon_retina_url),
            ("shadow_url", &self.shadow_url),
        ] {
            url::Url::parse(value).map_err(|e| format!("Invalid {}: {}", name, e))?;
        }
        Ok(())
    }
}

/// Holds the icon configuration chosen at application start-up, before the
/// first map is created.
///
/// Only the first `configure` call takes effect so that every marker on the
/// page resolves the same assets.
#[derive(Debug, Default)]
pub struct IconRegistry {
    assets: Option<IconAssets>,
}

impl IconRegistry {
    pub fn configure(&mut self, assets: IconAssets) -> bool {
        if self.assets.is_some() {
            return false;
        }
        self.assets = Some(assets);
        true
    }

    pub fn is_configured(&self) -> bool {
        self.assets.is_some()
    }

    // Falls back to the defaults when start-up never configured anything
    pub fn current(&self) -> IconAssets {
        self.assets.clone().unwrap_or_default()
    }
}

lazy_static! {
    static ref ICON_REGISTRY: Mutex<IconRegistry> = Mutex::new(IconRegistry::default());
}

// One-time asset configuration; later calls are ignored
pub fn configure_icon_assets(assets: IconAssets) -> Result<bool, String> {
    assets.validate()?;
    let applied = ICON_REGISTRY.lock().configure(assets);
    if !applied {
        console_warn!("Icon assets already configured, ignoring new configuration");
    }
    Ok(applied)
}

// Install the defaults unless something was configured before the first map
pub fn ensure_icon_assets() {
    let mut registry = ICON_REGISTRY.lock();
    if !registry.is_configured() {
        registry.configure(IconAssets::default());
    }
}

pub fn icon_assets() -> IconAssets {
    ICON_REGISTRY.lock().current()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_cdn() {
        let assets = IconAssets::default();
        assert_eq!(
            assets.icon_url,
            "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.3.1/images/marker-icon.png"
        );
        assert_eq!(assets.icon_retina_url, assets.icon_url);
        assert_eq!(
            assets.shadow_url,
            "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.3.1/images/marker-shadow.png"
        );
        assert!(assets.validate().is_ok());
    }

    #[test]
    fn registry_only_accepts_first_configuration() {
        let mut registry = IconRegistry::default();
        assert!(!registry.is_configured());
        assert_eq!(registry.current(), IconAssets::default());

        let custom = IconAssets {
            icon_url: "https://example.com/pin.png".to_string(),
            ..IconAssets::default()
        };
        assert!(registry.configure(custom.clone()));
        assert!(!registry.configure(IconAssets::default()));
        assert_eq!(registry.current(), custom);
    }

    #[test]
    fn relative_urls_are_rejected() {
        let assets = IconAssets {
            shadow_url: "images/marker-shadow.png".to_string(),
            ..IconAssets::default()
        };
        assert!(assets.validate().unwrap_err().contains("shadow_url"));
    }
}
