use geo::algorithm::centroid::Centroid;
use geo::MultiPolygon;
use serde::Deserialize;

/// One building from the input GeoJSON, reordered to (latitude, longitude).
/// Weight is the floor count scaled by 10.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub weight: u32,
}

/// One row of a `name;lat;lon` marker CSV.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MarkerRecord {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone)]
pub struct BoundaryArea {
    pub name: String,
    pub admin_level: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

/// The resolved city limits: every administrative polygon that survived
/// filtering, or the single manual fallback rectangle.
#[derive(Debug, Clone)]
pub struct CityBoundary {
    pub areas: Vec<BoundaryArea>,
}

impl CityBoundary {
    /// Mean of the per-area centroids as (lat, lon), used to center the
    /// boundary-only map.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let mut lat_sum = 0.0;
        let mut lon_sum = 0.0;
        let mut count = 0usize;
        for area in &self.areas {
            if let Some(centroid) = area.geometry.centroid() {
                lat_sum += centroid.y();
                lon_sum += centroid.x();
                count += 1;
            }
        }
        if count == 0 {
            return None;
        }
        Some((lat_sum / count as f64, lon_sum / count as f64))
    }
}
