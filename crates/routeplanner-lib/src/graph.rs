use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::map::{MapData, NodeId, Position};
use crate::spatial::SpatialIndex;

/// Stable index of a node inside a [`Graph`].
pub type NodeIndex = usize;

/// Searchable map point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub position: Position,
}

impl GraphNode {
    /// Straight-line distance to another node in normalized units.
    pub fn distance_to(&self, other: &GraphNode) -> f64 {
        self.position.distance_to(&other.position)
    }
}

/// Options applied when turning map roads into adjacency.
#[derive(Debug, Clone, Default)]
pub struct GraphBuildOptions {
    /// Link nodes along footways, paths, and steps (walking mode).
    pub include_footways: bool,
}

impl GraphBuildOptions {
    /// Options for pedestrian routing.
    pub fn walking() -> Self {
        Self {
            include_footways: true,
        }
    }
}

/// Undirected road graph used by the search engine.
///
/// Topology is fixed at construction; searches keep their bookkeeping in a
/// separate [`SearchState`](crate::SearchState) so one graph can serve any
/// number of searches.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Arc<Vec<GraphNode>>,
    adjacency: Arc<Vec<Vec<NodeIndex>>>,
    id_to_index: Arc<HashMap<NodeId, NodeIndex>>,
    spatial: Arc<SpatialIndex>,
    metric_scale: f64,
}

impl Graph {
    /// Number of nodes, including isolated ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `index` refers to a node of this graph.
    pub fn contains(&self, index: NodeIndex) -> bool {
        index < self.nodes.len()
    }

    /// All nodes in index order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> Option<&GraphNode> {
        self.nodes.get(index)
    }

    /// Lookup the graph index of a map node identifier.
    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_to_index.get(&id).copied()
    }

    /// Return the neighbours for a given node index.
    pub fn neighbours(&self, index: NodeIndex) -> &[NodeIndex] {
        self.adjacency
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Euclidean distance between two nodes, if both exist.
    pub fn distance(&self, a: NodeIndex, b: NodeIndex) -> Option<f64> {
        Some(self.node(a)?.distance_to(self.node(b)?))
    }

    /// Meters per normalized coordinate unit.
    pub fn metric_scale(&self) -> f64 {
        self.metric_scale
    }

    /// Find the node closest to `point`, regardless of its connectivity.
    pub fn nearest_node(&self, point: Position) -> Result<NodeIndex> {
        self.spatial
            .nearest(point)
            .map(|(index, _)| index)
            .ok_or(Error::EmptyGraph)
    }
}

/// Build the default (driving) road graph.
pub fn build_graph(map: &MapData) -> Graph {
    build_graph_with(map, &GraphBuildOptions::default())
}

/// Build a road graph from parsed map data.
///
/// Every map node becomes a graph node in document order. Consecutive nodes of
/// each road are linked in both directions; nodes on no road stay isolated.
pub fn build_graph_with(map: &MapData, options: &GraphBuildOptions) -> Graph {
    let mut nodes = Vec::with_capacity(map.nodes.len());
    let mut id_to_index = HashMap::with_capacity(map.nodes.len());
    for raw in &map.nodes {
        if id_to_index.contains_key(&raw.id) {
            continue;
        }
        id_to_index.insert(raw.id, nodes.len());
        nodes.push(GraphNode {
            id: raw.id,
            position: raw.position,
        });
    }

    let mut adjacency: Vec<Vec<NodeIndex>> = vec![Vec::new(); nodes.len()];
    let mut roads = 0usize;
    for way in &map.ways {
        if way.kind.is_footway() && !options.include_footways {
            continue;
        }
        roads += 1;

        for pair in way.nodes.windows(2) {
            let (Some(&a), Some(&b)) = (id_to_index.get(&pair[0]), id_to_index.get(&pair[1]))
            else {
                continue;
            };
            link(&mut adjacency, a, b);
        }
    }

    let positions: Vec<Position> = nodes.iter().map(|node| node.position).collect();
    let spatial = SpatialIndex::build(&positions);

    let graph = Graph {
        nodes: Arc::new(nodes),
        adjacency: Arc::new(adjacency),
        id_to_index: Arc::new(id_to_index),
        spatial: Arc::new(spatial),
        metric_scale: map.metric_scale,
    };

    info!(
        nodes = graph.len(),
        edges = graph.edge_count(),
        roads,
        include_footways = options.include_footways,
        "built road graph"
    );

    graph
}

fn link(adjacency: &mut [Vec<NodeIndex>], a: NodeIndex, b: NodeIndex) {
    if a == b || adjacency[a].contains(&b) {
        return;
    }
    adjacency[a].push(b);
    adjacency[b].push(a);
}
