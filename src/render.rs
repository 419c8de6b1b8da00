//! Assembles Leaflet maps and serializes them to self-contained HTML.

use crate::config::HeatmapConfig;
use crate::types::{BuildingPoint, CityBoundary, MarkerRecord};
use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::json;
use std::fs;
use std::path::Path;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const LEAFLET_HEAT_JS: &str = "https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js";

#[derive(Debug, Clone, Copy)]
pub enum TileLayer {
    OpenStreetMap,
    CartoPositron,
}

impl TileLayer {
    fn url(&self) -> &'static str {
        match self {
            TileLayer::OpenStreetMap => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            TileLayer::CartoPositron => {
                "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png"
            }
        }
    }

    fn attribution(&self) -> &'static str {
        match self {
            TileLayer::OpenStreetMap => "&copy; OpenStreetMap contributors",
            TileLayer::CartoPositron => "&copy; OpenStreetMap contributors &copy; CARTO",
        }
    }
}

/// A named overlay listed in the layer control.
pub enum Overlay {
    Boundary {
        name: String,
        geojson: String,
    },
    Heat {
        name: String,
        points: Vec<BuildingPoint>,
        max: f64,
        options: HeatmapConfig,
    },
    BadgeMarkers {
        name: String,
        markers: Vec<MarkerRecord>,
        text: String,
        color: String,
    },
    PinMarkers {
        name: String,
        markers: Vec<MarkerRecord>,
    },
}

pub struct MapDocument {
    title: String,
    center: (f64, f64),
    zoom: u8,
    tiles: TileLayer,
    overlays: Vec<Overlay>,
}

impl MapDocument {
    pub fn new(title: &str, center: (f64, f64), zoom: u8, tiles: TileLayer) -> Self {
        Self {
            title: title.to_string(),
            center,
            zoom,
            tiles,
            overlays: Vec::new(),
        }
    }

    /// Overlays render in insertion order; the layer control lists them all.
    pub fn add_overlay(&mut self, overlay: Overlay) {
        self.overlays.push(overlay);
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_html())
            .with_context(|| format!("Failed to write map HTML: {:?}", path))
    }

    pub fn to_html(&self) -> String {
        let mut script = String::new();

        script.push_str(&format!(
            "var map = L.map('map').setView([{}, {}], {});\n",
            self.center.0, self.center.1, self.zoom
        ));
        script.push_str(&format!(
            "L.tileLayer({url}, {{maxZoom: 19, attribution: {attribution}}}).addTo(map);\n",
            url = js_string(self.tiles.url()),
            attribution = js_string(self.tiles.attribution())
        ));
        script.push_str("var overlays = {};\n");

        for (index, overlay) in self.overlays.iter().enumerate() {
            push_overlay_js(&mut script, index, overlay);
        }

        script.push_str("L.control.layers(null, overlays, {collapsed: false}).addTo(map);\n");

        let needs_heat = self
            .overlays
            .iter()
            .any(|overlay| matches!(overlay, Overlay::Heat { .. }));
        let heat_script = if needs_heat {
            format!("<script src=\"{}\"></script>\n", LEAFLET_HEAT_JS)
        } else {
            String::new()
        };

        format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head>\n\
             <meta charset=\"utf-8\"/>\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"/>\n\
             <title>{title}</title>\n\
             <link rel=\"stylesheet\" href=\"{leaflet_css}\"/>\n\
             <script src=\"{leaflet_js}\"></script>\n\
             {heat_script}\
             <style>html, body, #map {{ height: 100%; margin: 0; }}</style>\n\
             </head>\n\
             <body>\n\
             <div id=\"map\"></div>\n\
             <script>\n{script}</script>\n\
             </body>\n\
             </html>\n",
            title = html_escape(&self.title),
            leaflet_css = LEAFLET_CSS,
            leaflet_js = LEAFLET_JS,
            heat_script = heat_script,
            script = script,
        )
    }
}

fn push_overlay_js(script: &mut String, index: usize, overlay: &Overlay) {
    let var = format!("overlay{}", index);

    match overlay {
        Overlay::Boundary { name, geojson } => {
            script.push_str(&format!(
                "var {var} = L.geoJSON({geojson}, {{style: function() {{ return \
                 {{fillColor: 'lightblue', color: 'blue', weight: 2, fillOpacity: 0.1}}; \
                 }}}}).addTo(map);\n",
            ));
            script.push_str(&format!("overlays[{}] = {};\n", js_string(name), var));
        }
        Overlay::Heat {
            name,
            points,
            max,
            options,
        } => {
            let data: Vec<serde_json::Value> = points
                .iter()
                .map(|p| json!([p.latitude, p.longitude, p.weight]))
                .collect();
            let opts = json!({
                "minOpacity": options.min_opacity,
                "max": max,
                "radius": options.radius,
                "blur": options.blur,
                "maxZoom": options.max_zoom,
                "gradient": options.gradient,
            });
            script.push_str(&format!(
                "var {var} = L.heatLayer({data}, {opts}).addTo(map);\n",
                data = serde_json::Value::Array(data),
                opts = opts,
            ));
            script.push_str(&format!("overlays[{}] = {};\n", js_string(name), var));
        }
        Overlay::BadgeMarkers {
            name,
            markers,
            text,
            color,
        } => {
            let icon_html = format!(
                "<div style=\"font-size: 14px; font-weight: bold; color: white; \
                 background-color: {color}; border: 2px solid white; border-radius: 50%; \
                 width: 22px; height: 22px; text-align: center; line-height: 20px; \
                 box-shadow: 0 2px 4px rgba(0,0,0,0.3); font-family: Arial, sans-serif;\">\
                 {text}</div>",
            );
            script.push_str(&format!("var {} = L.layerGroup().addTo(map);\n", var));
            for marker in markers {
                script.push_str(&format!(
                    "L.marker([{lat}, {lon}], {{icon: L.divIcon({{html: {html}, \
                     className: '', iconSize: [22, 22], iconAnchor: [11, 11]}})}})\
                     .bindPopup({popup}).addTo({var});\n",
                    lat = marker.lat,
                    lon = marker.lon,
                    html = js_string(&icon_html),
                    popup = js_string(&marker.name),
                ));
            }
            script.push_str(&format!("overlays[{}] = {};\n", js_string(name), var));
        }
        Overlay::PinMarkers { name, markers } => {
            script.push_str(&format!("var {} = L.layerGroup().addTo(map);\n", var));
            for marker in markers {
                script.push_str(&format!(
                    "L.marker([{lat}, {lon}]).bindPopup({popup}).addTo({var});\n",
                    lat = marker.lat,
                    lon = marker.lon,
                    popup = js_string(&marker.name),
                ));
            }
            script.push_str(&format!("overlays[{}] = {};\n", js_string(name), var));
        }
    }
}

/// Serializes the boundary areas to a GeoJSON FeatureCollection string.
pub fn boundary_geojson(boundary: &CityBoundary) -> String {
    let features = boundary
        .areas
        .iter()
        .map(|area| {
            let mut properties = geojson::JsonObject::new();
            properties.insert("name".to_string(), json!(area.name));
            if let Some(level) = &area.admin_level {
                properties.insert("admin_level".to_string(), json!(level));
            }
            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&area.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    GeoJson::from(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
    .to_string()
}

// JSON string literals are valid JS string literals.
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
