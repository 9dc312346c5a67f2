use serde::{Deserialize, Serialize};

/// Base imagery layer under the route.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Basemap {
    #[default]
    Satellite,
    Light,
    Dark,
    Terrain,
}

/// Tile source and color grading for a [`Basemap`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ImageryConfig {
    pub label: &'static str,
    pub url_template: &'static str,
    pub maximum_level: u8,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
}

impl Basemap {
    pub const ALL: [Basemap; 4] = [
        Basemap::Satellite,
        Basemap::Light,
        Basemap::Dark,
        Basemap::Terrain,
    ];

    /// Unknown keys fall back to satellite imagery.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "light" => Basemap::Light,
            "dark" => Basemap::Dark,
            "terrain" => Basemap::Terrain,
            _ => Basemap::Satellite,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Basemap::Satellite => "satellite",
            Basemap::Light => "light",
            Basemap::Dark => "dark",
            Basemap::Terrain => "terrain",
        }
    }

    pub fn config(self) -> ImageryConfig {
        match self {
            Basemap::Satellite => ImageryConfig {
                label: "Satellite",
                url_template: "https://services.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
                maximum_level: 7,
                brightness: 1.02,
                contrast: 0.92,
                saturation: 0.68,
            },
            Basemap::Light => ImageryConfig {
                label: "Light",
                url_template: "https://services.arcgisonline.com/ArcGIS/rest/services/Canvas/World_Light_Gray_Base/MapServer/tile/{z}/{y}/{x}",
                maximum_level: 6,
                brightness: 1.03,
                contrast: 0.95,
                saturation: 0.15,
            },
            Basemap::Dark => ImageryConfig {
                label: "Dark",
                url_template: "https://services.arcgisonline.com/ArcGIS/rest/services/Canvas/World_Dark_Gray_Base/MapServer/tile/{z}/{y}/{x}",
                maximum_level: 6,
                brightness: 0.88,
                contrast: 1.05,
                saturation: 0.2,
            },
            Basemap::Terrain => ImageryConfig {
                label: "Terrain",
                url_template: "https://services.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer/tile/{z}/{y}/{x}",
                maximum_level: 7,
                brightness: 1.0,
                contrast: 0.98,
                saturation: 0.72,
            },
        }
    }
}

impl From<String> for Basemap {
    fn from(key: String) -> Self {
        Basemap::from_key(&key)
    }
}

impl From<Basemap> for String {
    fn from(basemap: Basemap) -> Self {
        basemap.key().to_string()
    }
}

impl std::fmt::Display for Basemap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::Basemap;

    #[test]
    fn keys_round_trip() {
        for basemap in Basemap::ALL {
            assert_eq!(Basemap::from_key(basemap.key()), basemap);
        }
    }

    #[test]
    fn unknown_key_is_satellite() {
        assert_eq!(Basemap::from_key("watercolor"), Basemap::Satellite);
        assert_eq!(Basemap::from_key(" DARK "), Basemap::Dark);
    }

    #[test]
    fn deserializes_from_plain_string() {
        let basemap: Basemap = serde_json::from_str("\"terrain\"").unwrap();
        assert_eq!(basemap, Basemap::Terrain);
        assert_eq!(serde_json::to_string(&Basemap::Light).unwrap(), "\"light\"");
    }

    #[test]
    fn tile_urls_are_templated() {
        for basemap in Basemap::ALL {
            let url = basemap.config().url_template;
            assert!(url.contains("{z}") && url.contains("{x}") && url.contains("{y}"));
        }
    }
}
