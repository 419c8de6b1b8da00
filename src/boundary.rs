use crate::config::BoundaryConfig;
use crate::types::{BoundaryArea, CityBoundary};
use anyhow::{Context, Result};
use geo::{LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use std::collections::HashMap;

/// One row of the geocoder's candidate table.
#[derive(Debug, Deserialize)]
pub struct PlaceCandidate {
    pub display_name: String,
    #[serde(default)]
    pub extratags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub geojson: Option<geojson::Geometry>,
}

impl PlaceCandidate {
    fn admin_level(&self) -> Option<&str> {
        self.extratags
            .as_ref()
            .and_then(|tags| tags.get("admin_level"))
            .map(String::as_str)
    }
}

/// Resolves the city limits from the geocoding service.
///
/// A lookup that errors out yields no boundary at all; a lookup that succeeds
/// but matches nothing yields the manual fallback rectangle.
pub async fn resolve_city_boundary(
    config: &BoundaryConfig,
    client: &reqwest::Client,
) -> Option<CityBoundary> {
    println!("🔍 Looking up boundary for: {}", config.place_query);

    match fetch_candidates(config, client).await {
        Ok(candidates) => {
            let areas = filter_candidates(config, candidates);
            if areas.is_empty() {
                println!("⚠️ No polygons matched, using the manual rectangle");
                Some(CityBoundary {
                    areas: vec![fallback_rectangle(config)],
                })
            } else {
                println!("✅ Polygons found: {}", areas.len());
                Some(CityBoundary { areas })
            }
        }
        Err(e) => {
            println!("❌ Boundary lookup failed: {:#}", e);
            tracing::warn!("boundary lookup failed: {:#}", e);
            None
        }
    }
}

async fn fetch_candidates(
    config: &BoundaryConfig,
    client: &reqwest::Client,
) -> Result<Vec<PlaceCandidate>> {
    let url = format!("{}/search", config.endpoint.trim_end_matches('/'));

    let response = client
        .get(&url)
        .query(&[
            ("q", config.place_query.as_str()),
            ("format", "jsonv2"),
            ("polygon_geojson", "1"),
            ("extratags", "1"),
            ("limit", "10"),
        ])
        .send()
        .await
        .context("Boundary lookup request failed")?
        .error_for_status()
        .context("Boundary lookup returned an error status")?;

    response
        .json()
        .await
        .context("Failed to decode boundary lookup response")
}

/// Keeps candidates whose name contains one of the configured variants, or
/// whose admin_level is in the configured set, and that carry an areal
/// geometry.
pub fn filter_candidates(
    config: &BoundaryConfig,
    candidates: Vec<PlaceCandidate>,
) -> Vec<BoundaryArea> {
    let mut areas = Vec::new();

    for candidate in candidates {
        let name_match = config
            .name_variants
            .iter()
            .any(|variant| candidate.display_name.contains(variant));
        let level_match = candidate
            .admin_level()
            .is_some_and(|level| config.admin_levels.iter().any(|l| l == level));
        if !(name_match || level_match) {
            continue;
        }

        let admin_level = candidate.admin_level().map(str::to_string);
        let Some(geometry) = candidate.geojson else {
            continue;
        };

        // geojson Value -> geo types, same conversion as for any input file
        let geometry: geo::Geometry<f64> = match geometry.value.try_into() {
            Ok(g) => g,
            Err(_) => continue,
        };
        let geometry = match geometry {
            geo::Geometry::MultiPolygon(mp) => mp,
            geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            _ => continue, // points and lines are not city limits
        };

        areas.push(BoundaryArea {
            name: candidate.display_name,
            admin_level,
            geometry,
        });
    }

    areas
}

/// The hand-drawn rectangle used when the lookup matches nothing.
pub fn fallback_rectangle(config: &BoundaryConfig) -> BoundaryArea {
    let bbox = &config.fallback_bbox;
    let ring = LineString::from(vec![
        (bbox.west, bbox.south),
        (bbox.east, bbox.south),
        (bbox.east, bbox.north),
        (bbox.west, bbox.north),
        (bbox.west, bbox.south),
    ]);

    let label = config
        .name_variants
        .first()
        .map(String::as_str)
        .unwrap_or(config.place_query.as_str());

    BoundaryArea {
        name: format!("{} (manual)", label),
        admin_level: None,
        geometry: MultiPolygon::new(vec![Polygon::new(ring, vec![])]),
    }
}
