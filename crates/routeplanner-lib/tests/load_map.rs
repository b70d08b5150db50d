mod common;

use std::fs;

use routeplanner_lib::{load_map, Error, RoadKind};
use tempfile::tempdir;

use common::fixture_map_path;

#[test]
fn fixture_map_loads() {
    let map = load_map(&fixture_map_path()).expect("fixture loads");

    assert_eq!(map.nodes.len(), 10);
    assert_eq!(map.ways.len(), 6, "building outline is not a road");
    assert!(map
        .ways
        .iter()
        .any(|way| way.kind == RoadKind::Footway && way.nodes == vec![2, 7]));
    assert!((map.metric_scale - 11.1319).abs() < 1e-3);

    for node in &map.nodes {
        assert!((0.0..=100.0 + 1e-6).contains(&node.position.x));
        assert!((0.0..=100.0 + 1e-6).contains(&node.position.y));
    }
}

#[test]
fn missing_file_surfaces_io_error() {
    let dir = tempdir().expect("create temp dir");
    let err = load_map(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn empty_file_is_invalid_map_data() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("empty.json");
    fs::write(&path, b"").expect("write file");

    let err = load_map(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidMapData { .. }));
    assert!(err.to_string().contains("empty"));
}

#[test]
fn non_json_file_is_invalid_map_data() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("map.osm");
    fs::write(&path, "<osm version=\"0.6\"></osm>").expect("write file");

    let err = load_map(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidMapData { .. }));
}
