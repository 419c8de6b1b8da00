use density_mapping::boundary::fallback_rectangle;
use density_mapping::config::{BoundaryConfig, HeatmapConfig};
use density_mapping::render::{boundary_geojson, MapDocument, Overlay, TileLayer};
use density_mapping::types::{BuildingPoint, CityBoundary, MarkerRecord};

fn fallback_boundary() -> CityBoundary {
    CityBoundary {
        areas: vec![fallback_rectangle(&BoundaryConfig::default())],
    }
}

#[test]
fn heat_layer_embeds_scaled_max_and_gradient() {
    let mut map = MapDocument::new(
        "Building density",
        (56.326, 44.005),
        11,
        TileLayer::OpenStreetMap,
    );
    map.add_overlay(Overlay::Heat {
        name: "Building density".to_string(),
        points: vec![
            BuildingPoint {
                latitude: 56.3,
                longitude: 44.0,
                weight: 50,
            },
            BuildingPoint {
                latitude: 56.31,
                longitude: 44.01,
                weight: 10,
            },
        ],
        max: 50.0 * 0.4,
        options: HeatmapConfig::default(),
    });

    let html = map.to_html();
    assert!(html.contains("leaflet-heat"));
    assert!(html.contains("L.heatLayer"));
    assert!(html.contains("[56.3,44.0,50]"));
    assert!(html.contains("\"max\":20.0"));
    assert!(html.contains("\"minOpacity\":0.3"));
    assert!(html.contains("\"0.3\":\"lime\""));
    assert!(html.contains("overlays[\"Building density\"]"));
    assert!(html.contains("L.control.layers(null, overlays, {collapsed: false})"));
}

#[test]
fn marker_layers_render_badges_and_pins() {
    let mut map = MapDocument::new("Markers", (56.326, 44.005), 11, TileLayer::OpenStreetMap);
    let branch = MarkerRecord {
        name: "Отделение «Центральное»".to_string(),
        lat: 56.3187,
        lon: 44.0021,
    };
    let competitor = MarkerRecord {
        name: "Some Other Bank".to_string(),
        lat: 56.29,
        lon: 43.99,
    };
    map.add_overlay(Overlay::BadgeMarkers {
        name: "Bank branches".to_string(),
        markers: vec![branch],
        text: "А".to_string(),
        color: "#EF3124".to_string(),
    });
    map.add_overlay(Overlay::PinMarkers {
        name: "Competitor banks".to_string(),
        markers: vec![competitor],
    });

    let html = map.to_html();
    assert!(html.contains("L.divIcon"));
    assert!(html.contains("#EF3124"));
    assert!(html.contains("Отделение «Центральное»"));
    assert!(html.contains("Some Other Bank"));
    assert!(html.contains("overlays[\"Bank branches\"]"));
    assert!(html.contains("overlays[\"Competitor banks\"]"));
}

#[test]
fn boundary_geojson_is_a_feature_collection_with_names() {
    let geojson = boundary_geojson(&fallback_boundary());
    assert!(geojson.contains("\"FeatureCollection\""));
    assert!(geojson.contains("\"MultiPolygon\""));
    assert!(geojson.contains("(manual)"));
}

#[test]
fn boundary_only_map_skips_the_heat_plugin() {
    let mut map = MapDocument::new("City boundary", (56.3, 43.95), 13, TileLayer::CartoPositron);
    map.add_overlay(Overlay::Boundary {
        name: "boundary".to_string(),
        geojson: boundary_geojson(&fallback_boundary()),
    });

    let html = map.to_html();
    assert!(!html.contains("leaflet-heat"));
    assert!(html.contains("basemaps.cartocdn.com"));
    assert!(html.contains("fillColor: 'lightblue'"));
    assert!(html.contains("overlays[\"boundary\"]"));
}
