//! Common test utilities and fixture helpers.

use std::path::PathBuf;

use routeplanner_lib::{MapData, NodeId, Position, RawNode, RawWay, RoadKind};

/// Path to the checked-in fixture map.
#[allow(dead_code)]
pub fn fixture_map_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/minimal_map.json")
}

/// Build map data directly in normalized coordinates.
///
/// Node ids are assigned from 1 in the order of `points`; every way is a
/// residential road.
#[allow(dead_code)]
pub fn map_from_points(points: &[(f64, f64)], ways: &[&[NodeId]]) -> MapData {
    MapData {
        nodes: points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| RawNode {
                id: i as NodeId + 1,
                position: Position::new(x, y),
            })
            .collect(),
        ways: ways
            .iter()
            .enumerate()
            .map(|(i, nodes)| RawWay {
                id: 1000 + i as i64,
                kind: RoadKind::Residential,
                nodes: nodes.to_vec(),
            })
            .collect(),
        metric_scale: 1.0,
    }
}
