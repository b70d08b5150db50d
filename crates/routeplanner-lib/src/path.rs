use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeIndex};
use crate::map::Position;

/// Lifecycle of a single A* run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Open set is non-empty and the goal has not been expanded yet.
    Running,
    /// Goal node was popped from the open set.
    Succeeded,
    /// Open set ran dry before the goal was reached.
    Failed,
}

/// Per-search bookkeeping, indexed by [`NodeIndex`].
///
/// Kept apart from the [`Graph`] so a graph can be searched repeatedly (or
/// concurrently, one state per caller) without stale scores leaking between
/// runs.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    visited: Vec<bool>,
    expanded: Vec<bool>,
    g_value: Vec<f64>,
    h_value: Vec<f64>,
    parent: Vec<Option<NodeIndex>>,
}

impl SearchState {
    pub fn new(len: usize) -> Self {
        let mut state = Self::default();
        state.reset(len);
        state
    }

    /// Clear all scores and resize the table to `len` nodes.
    pub fn reset(&mut self, len: usize) {
        self.visited.clear();
        self.visited.resize(len, false);
        self.expanded.clear();
        self.expanded.resize(len, false);
        self.g_value.clear();
        self.g_value.resize(len, f64::INFINITY);
        self.h_value.clear();
        self.h_value.resize(len, 0.0);
        self.parent.clear();
        self.parent.resize(len, None);
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    /// Whether the node has been discovered by the current search.
    pub fn is_visited(&self, node: NodeIndex) -> bool {
        self.visited.get(node).copied().unwrap_or(false)
    }

    /// Whether the node has been popped from the open set and expanded.
    pub fn is_expanded(&self, node: NodeIndex) -> bool {
        self.expanded.get(node).copied().unwrap_or(false)
    }

    /// Accumulated cost from the start, once the node has been discovered.
    pub fn g_value(&self, node: NodeIndex) -> Option<f64> {
        self.is_visited(node).then(|| self.g_value[node])
    }

    /// Heuristic estimate to the goal, once the node has been discovered.
    pub fn h_value(&self, node: NodeIndex) -> Option<f64> {
        self.is_visited(node).then(|| self.h_value[node])
    }

    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.parent.get(node).copied().flatten()
    }
}

/// Shortest path produced by a successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    nodes: Vec<NodeIndex>,
    distance: f64,
    metric_scale: f64,
}

impl Route {
    /// Node indices from start to goal, both inclusive.
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    pub fn start(&self) -> NodeIndex {
        self.nodes[0]
    }

    pub fn goal(&self) -> NodeIndex {
        self.nodes[self.nodes.len() - 1]
    }

    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Total length in normalized map units.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Total length in meters.
    pub fn distance_meters(&self) -> f64 {
        self.distance * self.metric_scale
    }
}

/// Steppable A* search over a [`Graph`].
///
/// Each call to [`AStarSearch::step`] expands at most one node, so a run
/// terminates after no more than `graph.len()` productive steps.
pub struct AStarSearch<'g, 's> {
    graph: &'g Graph,
    state: &'s mut SearchState,
    open: BinaryHeap<AStarEntry>,
    start: NodeIndex,
    goal: NodeIndex,
    status: SearchStatus,
    expanded: usize,
}

impl<'g, 's> AStarSearch<'g, 's> {
    /// Prepare a search from `start` to `goal`, resetting `state`.
    pub fn new(
        graph: &'g Graph,
        state: &'s mut SearchState,
        start: NodeIndex,
        goal: NodeIndex,
    ) -> Result<Self> {
        for index in [start, goal] {
            if !graph.contains(index) {
                return Err(Error::UnknownNode { index });
            }
        }

        state.reset(graph.len());
        let mut search = Self {
            graph,
            state,
            open: BinaryHeap::new(),
            start,
            goal,
            status: SearchStatus::Running,
            expanded: 0,
        };

        let heuristic = search.heuristic(start);
        search.state.visited[start] = true;
        search.state.g_value[start] = 0.0;
        search.state.h_value[start] = heuristic;
        search.open.push(AStarEntry::new(start, 0.0, heuristic));

        Ok(search)
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// Number of nodes expanded so far.
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Advance the search by one expansion.
    pub fn step(&mut self) -> SearchStatus {
        if self.status != SearchStatus::Running {
            return self.status;
        }

        let current = loop {
            let Some(entry) = self.open.pop() else {
                self.status = SearchStatus::Failed;
                return self.status;
            };
            // The first pop of a node carries its lowest cost; later ones are stale.
            if !self.state.expanded[entry.node] {
                break entry.node;
            }
        };

        self.state.expanded[current] = true;
        self.expanded += 1;

        if current == self.goal {
            self.status = SearchStatus::Succeeded;
            return self.status;
        }

        let current_g = self.state.g_value[current];
        let current_position = self.position(current);
        for &next in self.graph.neighbours(current) {
            if self.state.expanded[next] {
                continue;
            }

            let tentative_g = current_g + current_position.distance_to(&self.position(next));
            if self.state.visited[next] && tentative_g >= self.state.g_value[next] {
                continue;
            }

            if !self.state.visited[next] {
                let heuristic = self.heuristic(next);
                self.state.visited[next] = true;
                self.state.h_value[next] = heuristic;
            }
            self.state.g_value[next] = tentative_g;
            self.state.parent[next] = Some(current);
            self.open
                .push(AStarEntry::new(next, tentative_g, self.state.h_value[next]));
        }

        self.status
    }

    /// Drive the search to a terminal state and build the route.
    pub fn run(mut self) -> Result<Route> {
        while self.step() == SearchStatus::Running {}

        debug!(
            start = self.start,
            goal = self.goal,
            expanded = self.expanded,
            status = ?self.status,
            "a* search finished"
        );

        match self.status {
            SearchStatus::Succeeded => Ok(Route {
                nodes: reconstruct_path(self.state, self.start, self.goal),
                distance: self.state.g_value[self.goal],
                metric_scale: self.graph.metric_scale(),
            }),
            _ => Err(Error::NoPathFound {
                start: self.start,
                goal: self.goal,
            }),
        }
    }

    fn position(&self, node: NodeIndex) -> Position {
        self.graph.nodes()[node].position
    }

    fn heuristic(&self, node: NodeIndex) -> f64 {
        self.position(node).distance_to(&self.position(self.goal))
    }
}

/// Run A* search between two nodes using straight-line distance as heuristic.
pub fn find_route(graph: &Graph, start: NodeIndex, goal: NodeIndex) -> Result<Route> {
    let mut state = SearchState::new(graph.len());
    find_route_with_state(graph, &mut state, start, goal)
}

/// Run A* search reusing a caller-owned [`SearchState`].
///
/// The state is reset before the search starts; after it returns the table
/// holds the scores of this run.
pub fn find_route_with_state(
    graph: &Graph,
    state: &mut SearchState,
    start: NodeIndex,
    goal: NodeIndex,
) -> Result<Route> {
    AStarSearch::new(graph, state, start, goal)?.run()
}

fn reconstruct_path(state: &SearchState, start: NodeIndex, goal: NodeIndex) -> Vec<NodeIndex> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = state.parent(node);
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Open-set entry ordered so `BinaryHeap` pops the lowest `f = g + h` first,
/// then the lowest `h`, then the lowest node index.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    node: NodeIndex,
    heuristic: FloatOrd,
    estimate: FloatOrd,
}

impl AStarEntry {
    fn new(node: NodeIndex, cost: f64, heuristic: f64) -> Self {
        Self {
            node,
            heuristic: FloatOrd(heuristic),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.heuristic.cmp(&self.heuristic))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::map::{MapData, RawNode, RawWay, RoadKind};

    fn line_graph() -> Graph {
        let nodes = (0..4)
            .map(|i| RawNode {
                id: i,
                position: Position::new(i as f64, 0.0),
            })
            .collect();
        build_graph(&MapData {
            nodes,
            ways: vec![RawWay {
                id: 1,
                kind: RoadKind::Residential,
                nodes: vec![0, 1, 2, 3],
            }],
            metric_scale: 10.0,
        })
    }

    #[test]
    fn open_set_pops_lowest_estimate_then_heuristic_then_index() {
        let mut heap = BinaryHeap::new();
        heap.push(AStarEntry::new(3, 1.0, 1.0));
        heap.push(AStarEntry::new(1, 0.5, 1.5));
        heap.push(AStarEntry::new(0, 1.5, 0.5));
        heap.push(AStarEntry::new(2, 1.5, 0.5));
        heap.push(AStarEntry::new(9, 0.0, 3.0));

        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![0, 2, 3, 1, 9]);
    }

    #[test]
    fn stepping_walks_through_states() {
        let graph = line_graph();
        let mut state = SearchState::new(graph.len());
        let mut search = AStarSearch::new(&graph, &mut state, 0, 3).expect("valid nodes");

        assert_eq!(search.status(), SearchStatus::Running);
        let mut steps = 0;
        while search.step() == SearchStatus::Running {
            steps += 1;
        }
        assert_eq!(search.status(), SearchStatus::Succeeded);
        assert_eq!(steps, 3, "nodes 0..=2 expand before the goal");
        assert_eq!(search.expanded(), 4);
        assert_eq!(search.step(), SearchStatus::Succeeded, "terminal state is sticky");
    }

    #[test]
    fn state_records_scores_and_parents() {
        let graph = line_graph();
        let mut state = SearchState::new(0);
        let route = find_route_with_state(&graph, &mut state, 0, 3).expect("route");

        assert_eq!(state.len(), graph.len());
        assert_eq!(state.g_value(3), Some(3.0));
        assert_eq!(state.h_value(0), Some(3.0));
        assert_eq!(state.parent(3), Some(2));
        assert_eq!(state.parent(0), None);
        assert_eq!(route.distance(), 3.0);
        assert_eq!(route.distance_meters(), 30.0);
        assert_eq!(route.hop_count(), 3);
    }

    #[test]
    fn reused_state_is_reset_between_runs() {
        let graph = line_graph();
        let mut state = SearchState::new(graph.len());
        find_route_with_state(&graph, &mut state, 0, 3).expect("first route");
        let route = find_route_with_state(&graph, &mut state, 2, 1).expect("second route");

        assert_eq!(route.nodes(), &[2, 1]);
        assert!(!state.is_visited(0), "scores from the first run are cleared");
        assert_eq!(state.g_value(0), None);
    }

    #[test]
    fn unknown_nodes_are_rejected() {
        let graph = line_graph();
        let err = find_route(&graph, 0, 17).unwrap_err();
        assert!(matches!(err, Error::UnknownNode { index: 17 }));
    }
}
