//! Route planner library entry points.
//!
//! This crate loads OpenStreetMap road data, builds an undirected road graph
//! with a nearest-node index, and runs A* searches over it. Higher-level
//! consumers (the CLI) should only depend on the functions exported here
//! instead of reimplementing behavior.

#![deny(warnings)]

pub mod error;
pub mod graph;
pub mod map;
pub mod output;
pub mod path;
pub mod routing;
pub mod spatial;

pub use error::{Error, Result};
pub use graph::{build_graph, build_graph_with, Graph, GraphBuildOptions, GraphNode, NodeIndex};
pub use map::{
    load_map, parse_map, resolve_map_path, MapData, NodeId, Position, RawNode, RawWay, RoadKind,
};
pub use output::{RouteEndpoint, RouteRenderMode, RouteStep, RouteSummary};
pub use path::{find_route, find_route_with_state, AStarSearch, Route, SearchState, SearchStatus};
pub use routing::{plan_route, resolve_endpoints, ResolvedEndpoints, RoutePlan, RouteRequest};
pub use spatial::SpatialIndex;
