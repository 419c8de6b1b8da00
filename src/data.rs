use crate::types::{BuildingPoint, MarkerRecord};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use geojson::GeoJson;
use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Loads the buildings FeatureCollection and flattens it to weighted points.
///
/// Features whose geometry is missing or not a Point are skipped. The
/// `building:levels` property defaults to 1 floor when absent or unparseable.
pub fn parse_buildings(path: &Path) -> Result<Vec<BuildingPoint>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open buildings GeoJSON: {:?}", path))?;
    let reader = BufReader::new(file);

    // Parse the GeoJSON. warning: this loads the whole file into memory.
    let geojson = GeoJson::from_reader(reader).context("Failed to parse buildings GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("Buildings GeoJSON must be a FeatureCollection")),
    };

    let mut buildings = Vec::new();

    for feature in collection.features {
        // GeoJSON stores [longitude, latitude]
        let (longitude, latitude) = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Point(coords)) if coords.len() >= 2 => (coords[0], coords[1]),
            _ => continue,
        };

        let floors = feature
            .properties
            .as_ref()
            .and_then(|props| props.get("building:levels"))
            .map(parse_levels)
            .unwrap_or(1);

        buildings.push(BuildingPoint {
            latitude,
            longitude,
            weight: floors * 10,
        });
    }

    Ok(buildings)
}

// OSM carries `building:levels` as a string tag, but numbers show up too.
fn parse_levels(value: &JsonValue) -> u32 {
    match value {
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f as u64))
            .map(|v| v as u32)
            .unwrap_or(1),
        JsonValue::String(s) => s.trim().parse().unwrap_or(1),
        _ => 1,
    }
}

pub fn max_weight(buildings: &[BuildingPoint]) -> u32 {
    buildings.iter().map(|b| b.weight).max().unwrap_or(0)
}

/// Reads a semicolon-delimited `name;lat;lon` CSV into marker records.
pub fn load_markers(path: &Path) -> Result<Vec<MarkerRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open marker CSV: {:?}", path))?;
    let mut rdr = ReaderBuilder::new().delimiter(b';').from_reader(file);

    let mut markers = Vec::new();
    for result in rdr.deserialize() {
        let record: MarkerRecord = result.context("Failed to parse marker CSV row")?;
        markers.push(record);
    }

    Ok(markers)
}
