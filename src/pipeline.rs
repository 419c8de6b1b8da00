use crate::boundary;
use crate::config::AppConfig;
use crate::data;
use crate::render::{self, MapDocument, Overlay, TileLayer};
use crate::types::MarkerRecord;
use anyhow::{Context, Result};
use std::path::Path;

/// Runs the whole generation pipeline: buildings, boundary, map assembly,
/// HTML output.
pub async fn run(config: AppConfig) -> Result<()> {
    // 1. Load buildings
    let buildings = data::parse_buildings(&config.input.buildings)?;
    let max_weight = data::max_weight(&buildings);
    println!("📊 Buildings processed: {}", buildings.len());
    println!("📈 Maximum weight: {}", max_weight);

    // 2. Resolve the city boundary
    println!("\n🗺️ Resolving the city boundary...");
    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let city_boundary = boundary::resolve_city_boundary(&config.boundary, &client).await;

    // 3. Assemble the main map
    let mut map = MapDocument::new(
        "Building density",
        (config.map.center_lat, config.map.center_lon),
        config.map.zoom,
        TileLayer::OpenStreetMap,
    );

    if let Some(city_boundary) = &city_boundary {
        map.add_overlay(Overlay::Boundary {
            name: config.boundary.layer_name.clone(),
            geojson: render::boundary_geojson(city_boundary),
        });
        println!("✅ City boundary added to the map");
    }

    map.add_overlay(Overlay::Heat {
        name: config.heatmap.layer_name.clone(),
        points: buildings,
        max: f64::from(max_weight) * config.heatmap.max_factor,
        options: config.heatmap.clone(),
    });

    if let Some(markers) = load_marker_layer(&config.input.branches, "branches") {
        map.add_overlay(Overlay::BadgeMarkers {
            name: config.markers.branch_layer_name.clone(),
            markers,
            text: config.markers.branch_badge_text.clone(),
            color: config.markers.branch_badge_color.clone(),
        });
        println!("✅ Branches added to the map");
    }

    if let Some(markers) = load_marker_layer(&config.input.competitors, "competitors") {
        map.add_overlay(Overlay::PinMarkers {
            name: config.markers.competitor_layer_name.clone(),
            markers,
        });
        println!("✅ Competitors added to the map");
    }

    // 4. Write the main map
    map.save(&config.output.map_html)?;
    println!("✅ Density map saved as '{}'", config.output.map_html.display());

    // 5. Boundary-only map, only when a boundary was resolved
    if let Some(city_boundary) = &city_boundary {
        println!("\n🔍 Rendering the boundary-only map...");
        let center = city_boundary
            .centroid()
            .unwrap_or((config.map.center_lat, config.map.center_lon));
        let mut boundary_map = MapDocument::new(
            "City boundary",
            center,
            config.map.boundary_zoom,
            TileLayer::CartoPositron,
        );
        boundary_map.add_overlay(Overlay::Boundary {
            name: "boundary".to_string(),
            geojson: render::boundary_geojson(city_boundary),
        });
        boundary_map.save(&config.output.boundary_html)?;
        println!(
            "✅ Boundary map saved as '{}'",
            config.output.boundary_html.display()
        );
    }

    Ok(())
}

// A missing file and a malformed file both skip the layer, with distinct
// notices.
fn load_marker_layer(path: &Path, layer: &str) -> Option<Vec<MarkerRecord>> {
    if !path.exists() {
        println!("⚠️ File {} not found", path.display());
        return None;
    }
    match data::load_markers(path) {
        Ok(markers) => Some(markers),
        Err(e) => {
            println!("❌ Failed to load {}: {:#}", layer, e);
            None
        }
    }
}
