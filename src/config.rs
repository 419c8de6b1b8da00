use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub boundary: BoundaryConfig,
    pub map: MapConfig,
    pub heatmap: HeatmapConfig,
    pub markers: MarkerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub buildings: PathBuf,
    pub branches: PathBuf,
    pub competitors: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            buildings: PathBuf::from("data/houses.geojson"),
            branches: PathBuf::from("data/branches.csv"),
            competitors: PathBuf::from("data/competitors.csv"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoundaryConfig {
    pub endpoint: String,
    pub place_query: String,
    /// Accepted spellings of the city name in the lookup results.
    pub name_variants: Vec<String>,
    pub admin_levels: Vec<String>,
    pub fallback_bbox: FallbackBbox,
    pub layer_name: String,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org".to_string(),
            place_query: "Нижний Новгород, Россия".to_string(),
            name_variants: vec![
                "Нижний Новгород".to_string(),
                "Nizhny Novgorod".to_string(),
            ],
            admin_levels: vec!["6".to_string(), "8".to_string()],
            fallback_bbox: FallbackBbox::default(),
            layer_name: "City boundary".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FallbackBbox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Default for FallbackBbox {
    fn default() -> Self {
        Self {
            south: 56.20,
            west: 43.80,
            north: 56.40,
            east: 44.10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub boundary_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: 56.326,
            center_lon: 44.005,
            zoom: 11,
            boundary_zoom: 13,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HeatmapConfig {
    pub layer_name: String,
    pub min_opacity: f64,
    /// The heat scale maxes out at max_factor times the max observed weight.
    pub max_factor: f64,
    pub radius: u32,
    pub blur: u32,
    pub max_zoom: u32,
    pub gradient: BTreeMap<String, String>,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            layer_name: "Building density".to_string(),
            min_opacity: 0.3,
            max_factor: 0.4,
            radius: 8,
            blur: 10,
            max_zoom: 18,
            gradient: default_gradient(),
        }
    }
}

fn default_gradient() -> BTreeMap<String, String> {
    [
        ("0.1", "blue"),
        ("0.2", "blue"),
        ("0.3", "lime"),
        ("0.4", "lime"),
        ("0.5", "yellow"),
        ("0.6", "yellow"),
        ("0.7", "orange"),
        ("0.8", "orange"),
        ("0.9", "red"),
        ("1.0", "red"),
    ]
    .into_iter()
    .map(|(stop, color)| (stop.to_string(), color.to_string()))
    .collect()
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarkerConfig {
    pub branch_layer_name: String,
    pub competitor_layer_name: String,
    pub branch_badge_text: String,
    pub branch_badge_color: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            branch_layer_name: "Bank branches".to_string(),
            competitor_layer_name: "Competitor banks".to_string(),
            branch_badge_text: "А".to_string(),
            branch_badge_color: "#EF3124".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub map_html: PathBuf,
    pub boundary_html: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            map_html: PathBuf::from("index.html"),
            boundary_html: PathBuf::from("city_boundary.html"),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// A missing config file is fine; the built-in defaults apply.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}
