//! Route planning between two coordinates.
//!
//! This module ties the pieces together: both endpoints of a
//! [`RouteRequest`] are snapped to their nearest graph nodes and the pair is
//! handed to the A* search in [`crate::path`].
//!
//! # Example
//!
//! ```ignore
//! use routeplanner_lib::{build_graph, load_map, plan_route, RouteRequest};
//!
//! let map = load_map("map.json".as_ref())?;
//! let graph = build_graph(&map);
//! let plan = plan_route(&graph, &RouteRequest::new((10.0, 10.0), (90.0, 90.0)))?;
//! println!("Distance: {} meters.", plan.distance_meters());
//! ```

use tracing::debug;

use crate::error::Result;
use crate::graph::{Graph, NodeIndex};
use crate::map::Position;
use crate::path::{find_route, Route};

/// Start and goal coordinates in normalized map units (`0..=100`).
///
/// Range checks belong to the caller; the planner uses the values as given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub start: Position,
    pub goal: Position,
}

impl RouteRequest {
    pub fn new(start: (f64, f64), goal: (f64, f64)) -> Self {
        Self {
            start: Position::new(start.0, start.1),
            goal: Position::new(goal.0, goal.1),
        }
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub start: NodeIndex,
    pub goal: NodeIndex,
    pub route: Route,
}

impl RoutePlan {
    /// Number of hops in the route.
    pub fn hop_count(&self) -> usize {
        self.route.hop_count()
    }

    /// Route length in normalized map units.
    pub fn distance(&self) -> f64 {
        self.route.distance()
    }

    /// Route length in meters.
    pub fn distance_meters(&self) -> f64 {
        self.route.distance_meters()
    }
}

/// Snapped endpoints of a request, useful for reporting before searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEndpoints {
    pub start: NodeIndex,
    pub goal: NodeIndex,
}

/// Snap both request coordinates to their nearest graph nodes.
///
/// Nearest-node matching ignores connectivity: an endpoint may snap to an
/// isolated node, in which case the search reports no route.
pub fn resolve_endpoints(graph: &Graph, request: &RouteRequest) -> Result<ResolvedEndpoints> {
    let start = graph.nearest_node(request.start)?;
    let goal = graph.nearest_node(request.goal)?;
    debug!(
        start,
        goal,
        start_x = request.start.x,
        start_y = request.start.y,
        goal_x = request.goal.x,
        goal_y = request.goal.y,
        "resolved route endpoints"
    );
    Ok(ResolvedEndpoints { start, goal })
}

/// Compute a route for the given request.
pub fn plan_route(graph: &Graph, request: &RouteRequest) -> Result<RoutePlan> {
    let ResolvedEndpoints { start, goal } = resolve_endpoints(graph, request)?;
    let route = find_route(graph, start, goal)?;

    Ok(RoutePlan { start, goal, route })
}
