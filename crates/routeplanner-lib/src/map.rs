//! Map data loading for OpenStreetMap JSON documents.
//!
//! The loader accepts the JSON flavour emitted by the Overpass API (`out json`):
//! a top-level `elements` array holding `node`, `way`, and `relation` entries and
//! an optional `bounds` object. Nodes are projected with spherical Web Mercator
//! and normalized so the shorter side of the bounding box spans `[0, 100]`,
//! matching the units users enter coordinates in.

use std::collections::HashMap;
use std::env;
use std::f64::consts::PI;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Environment variable consulted when no explicit map path is given.
pub const MAP_PATH_ENV: &str = "ROUTEPLANNER_MAP";

/// Map file looked up in the working directory as a last resort.
pub const DEFAULT_MAP_FILENAME: &str = "map.json";

/// Upper bound of the normalized coordinate range.
pub const COORDINATE_RANGE: f64 = 100.0;

const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Mercator diverges at the poles, so latitudes must stay strictly inside this.
const MAX_LATITUDE: f64 = 90.0;

const MAX_LONGITUDE: f64 = 180.0;

/// OpenStreetMap identifier of a node.
pub type NodeId = i64;

/// Planar coordinates in normalized map units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate the Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Map point as read from the source document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawNode {
    pub id: NodeId,
    pub position: Position,
}

/// Road classification derived from the `highway` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadKind {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    Footway,
    Unknown,
}

impl RoadKind {
    /// Classify a `highway` tag value.
    pub fn from_highway(value: &str) -> Self {
        match value {
            "motorway" | "motorway_link" => RoadKind::Motorway,
            "trunk" | "trunk_link" => RoadKind::Trunk,
            "primary" | "primary_link" => RoadKind::Primary,
            "secondary" | "secondary_link" => RoadKind::Secondary,
            "tertiary" | "tertiary_link" => RoadKind::Tertiary,
            "residential" | "living_street" | "unclassified" => RoadKind::Residential,
            "service" => RoadKind::Service,
            "footway" | "pedestrian" | "path" | "steps" | "cycleway" | "track" => {
                RoadKind::Footway
            }
            _ => RoadKind::Unknown,
        }
    }

    /// Whether vehicles are expected to stay off this road.
    pub fn is_footway(self) -> bool {
        matches!(self, RoadKind::Footway)
    }
}

impl fmt::Display for RoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RoadKind::Motorway => "motorway",
            RoadKind::Trunk => "trunk",
            RoadKind::Primary => "primary",
            RoadKind::Secondary => "secondary",
            RoadKind::Tertiary => "tertiary",
            RoadKind::Residential => "residential",
            RoadKind::Service => "service",
            RoadKind::Footway => "footway",
            RoadKind::Unknown => "unknown",
        };
        f.write_str(value)
    }
}

/// Ordered chain of node identifiers forming a road.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWay {
    pub id: i64,
    pub kind: RoadKind,
    pub nodes: Vec<NodeId>,
}

/// Parsed map: nodes, roads, and the scale back to meters.
#[derive(Debug, Clone, Default)]
pub struct MapData {
    pub nodes: Vec<RawNode>,
    pub ways: Vec<RawWay>,
    /// Meters per normalized coordinate unit.
    pub metric_scale: f64,
}

#[derive(Debug, Deserialize)]
struct OsmDocument {
    #[serde(default)]
    bounds: Option<Bounds>,
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Bounds {
    minlat: f64,
    minlon: f64,
    maxlat: f64,
    maxlon: f64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: NodeId,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<NodeId>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

/// Resolve the map file to load.
///
/// The resolution order is:
/// 1. Explicit `path` argument when provided.
/// 2. `ROUTEPLANNER_MAP` environment variable.
/// 3. `map.json` in the current working directory.
pub fn resolve_map_path(path: Option<&Path>) -> PathBuf {
    if let Some(explicit) = path {
        return explicit.to_path_buf();
    }

    if let Some(env_path) = env::var_os(MAP_PATH_ENV) {
        return PathBuf::from(env_path);
    }

    PathBuf::from(DEFAULT_MAP_FILENAME)
}

/// Read and parse a map file.
pub fn load_map(path: &Path) -> Result<MapData> {
    debug!(path = %path.display(), "reading map data");
    let bytes = fs::read(path)?;
    parse_map(&bytes)
}

/// Parse OpenStreetMap JSON bytes into normalized nodes and roads.
///
/// Ways without a `highway` tag are not roads and are skipped. References to
/// nodes missing from the document are dropped so that no way points at a
/// node the graph cannot resolve.
pub fn parse_map(bytes: &[u8]) -> Result<MapData> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::invalid_map("map data is empty"));
    }

    let document: OsmDocument = serde_json::from_slice(bytes)
        .map_err(|e| Error::invalid_map(format!("malformed OSM JSON: {}", e)))?;

    let mut geo_nodes: Vec<(NodeId, f64, f64)> = Vec::new();
    let mut seen: HashMap<NodeId, usize> = HashMap::new();
    let mut raw_ways = Vec::new();
    let mut skipped_ways = 0usize;

    for element in document.elements {
        match element {
            Element::Node { id, lat, lon } => {
                if !is_projectable(lat, lon) {
                    return Err(Error::invalid_map(format!(
                        "node {} has unusable coordinates (lat {}, lon {})",
                        id, lat, lon
                    )));
                }
                if seen.contains_key(&id) {
                    warn!(node = id, "duplicate node in map data, keeping first");
                    continue;
                }
                seen.insert(id, geo_nodes.len());
                geo_nodes.push((id, lat, lon));
            }
            Element::Way { id, nodes, tags } => match tags.get("highway") {
                Some(highway) => raw_ways.push(RawWay {
                    id,
                    kind: RoadKind::from_highway(highway),
                    nodes,
                }),
                None => skipped_ways += 1,
            },
            Element::Other => {}
        }
    }

    if geo_nodes.is_empty() {
        return Err(Error::invalid_map("map data contains no nodes"));
    }

    let bounds = document
        .bounds
        .unwrap_or_else(|| bounds_from_nodes(&geo_nodes));
    let projection = Projection::from_bounds(&bounds)?;

    let mut nodes = Vec::with_capacity(geo_nodes.len());
    for &(id, lat, lon) in &geo_nodes {
        let position = projection.normalize(lat, lon);
        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(Error::invalid_map(format!(
                "node {} does not project onto the map (lat {}, lon {})",
                id, lat, lon
            )));
        }
        nodes.push(RawNode { id, position });
    }

    let mut ways = Vec::with_capacity(raw_ways.len());
    for mut way in raw_ways {
        let before = way.nodes.len();
        way.nodes.retain(|node| seen.contains_key(node));
        let dropped = before - way.nodes.len();
        if dropped > 0 {
            warn!(
                way = way.id,
                dropped, "way references nodes missing from map data"
            );
        }
        ways.push(way);
    }

    info!(
        nodes = nodes.len(),
        roads = ways.len(),
        skipped_ways,
        metric_scale = projection.metric_scale(),
        "parsed map data"
    );

    Ok(MapData {
        nodes,
        ways,
        metric_scale: projection.metric_scale(),
    })
}

fn bounds_from_nodes(nodes: &[(NodeId, f64, f64)]) -> Bounds {
    let mut bounds = Bounds {
        minlat: f64::INFINITY,
        minlon: f64::INFINITY,
        maxlat: f64::NEG_INFINITY,
        maxlon: f64::NEG_INFINITY,
    };
    for &(_, lat, lon) in nodes {
        bounds.minlat = bounds.minlat.min(lat);
        bounds.maxlat = bounds.maxlat.max(lat);
        bounds.minlon = bounds.minlon.min(lon);
        bounds.maxlon = bounds.maxlon.max(lon);
    }
    bounds
}

fn is_projectable(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && lat.abs() < MAX_LATITUDE
        && lon.abs() <= MAX_LONGITUDE
}

fn lon_to_meters(lon: f64) -> f64 {
    lon.to_radians() * EARTH_RADIUS_M
}

fn lat_to_meters(lat: f64) -> f64 {
    (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS_M
}

/// Mercator projection anchored at the south-west corner of the bounds.
#[derive(Debug, Clone, Copy)]
struct Projection {
    min_x: f64,
    min_y: f64,
    extent: f64,
}

impl Projection {
    fn from_bounds(bounds: &Bounds) -> Result<Self> {
        let min_x = lon_to_meters(bounds.minlon);
        let min_y = lat_to_meters(bounds.minlat);
        let dx = lon_to_meters(bounds.maxlon) - min_x;
        let dy = lat_to_meters(bounds.maxlat) - min_y;
        let extent = dx.min(dy);

        if !extent.is_finite() || extent <= 0.0 {
            return Err(Error::invalid_map(format!(
                "map bounds have no usable extent ({:.3} m x {:.3} m)",
                dx, dy
            )));
        }

        Ok(Self {
            min_x,
            min_y,
            extent,
        })
    }

    fn normalize(&self, lat: f64, lon: f64) -> Position {
        Position {
            x: (lon_to_meters(lon) - self.min_x) / self.extent * COORDINATE_RANGE,
            y: (lat_to_meters(lat) - self.min_y) / self.extent * COORDINATE_RANGE,
        }
    }

    fn metric_scale(&self) -> f64 {
        self.extent / COORDINATE_RANGE
    }
}
