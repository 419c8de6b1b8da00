use density_mapping::config::AppConfig;
use density_mapping::pipeline;
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn fixture_config(dir: &TempDir, endpoint: String) -> AppConfig {
    let mut config = AppConfig::default();
    config.input.buildings = dir.path().join("houses.geojson");
    config.input.branches = dir.path().join("branches.csv");
    config.input.competitors = dir.path().join("competitors.csv");
    config.boundary.endpoint = endpoint;
    config.output.map_html = dir.path().join("index.html");
    config.output.boundary_html = dir.path().join("city_boundary.html");
    config
}

fn write_buildings(dir: &TempDir) {
    let geojson = json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [44.0, 56.3]},
                "properties": {"building:levels": "5"},
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [44.02, 56.32]},
                "properties": {},
            },
        ],
    });
    std::fs::write(dir.path().join("houses.geojson"), geojson.to_string()).unwrap();
}

#[tokio::test]
async fn generates_both_maps_when_the_boundary_resolves() {
    let dir = TempDir::new().unwrap();
    write_buildings(&dir);
    std::fs::write(
        dir.path().join("branches.csv"),
        "name;lat;lon\nBranch One;56.3187;44.0021\n",
    )
    .unwrap();

    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).json_body(json!([{
            "display_name": "Нижний Новгород, Россия",
            "extratags": {"admin_level": "8"},
            "geojson": {
                "type": "Polygon",
                "coordinates": [[[43.8, 56.2], [44.1, 56.2], [44.1, 56.4], [43.8, 56.4], [43.8, 56.2]]],
            },
        }]));
    });

    let config = fixture_config(&dir, server.url(""));
    pipeline::run(config).await.unwrap();
    lookup.assert();

    let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(index.contains("overlays[\"City boundary\"]"));
    assert!(index.contains("overlays[\"Building density\"]"));
    assert!(index.contains("overlays[\"Bank branches\"]"));
    // competitors.csv is absent, so that layer is skipped
    assert!(!index.contains("Competitor banks"));
    // 0.4 x max weight 50
    assert!(index.contains("\"max\":20.0"));

    let boundary = std::fs::read_to_string(dir.path().join("city_boundary.html")).unwrap();
    assert!(boundary.contains("overlays[\"boundary\"]"));
}

#[tokio::test]
async fn lookup_failure_still_writes_the_main_map_only() {
    let dir = TempDir::new().unwrap();
    write_buildings(&dir);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(500);
    });

    let config = fixture_config(&dir, server.url(""));
    pipeline::run(config).await.unwrap();

    let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(!index.contains("City boundary"));
    assert!(index.contains("overlays[\"Building density\"]"));
    assert!(!dir.path().join("city_boundary.html").exists());
}

#[tokio::test]
async fn missing_buildings_file_is_fatal() {
    let dir = TempDir::new().unwrap();

    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).json_body(json!([]));
    });

    let config = fixture_config(&dir, server.url(""));
    assert!(pipeline::run(config).await.is_err());
    // the pipeline aborts before the boundary lookup
    lookup.assert_hits(0);
}
