use std::fmt::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeIndex};
use crate::map::NodeId;
use crate::routing::RoutePlan;

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    /// Endpoints, every step, and the distance line.
    PlainText,
    /// Only the distance line.
    DistanceOnly,
}

/// Endpoint within a planned route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteEndpoint {
    pub index: NodeIndex,
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

/// Step taken during traversal of a planned route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteStep {
    pub index: usize,
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    /// Meters travelled from the start up to and including this step.
    pub cumulative_meters: f64,
}

/// Structured representation of a planned route that higher-level consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub hops: usize,
    pub start: RouteEndpoint,
    pub goal: RouteEndpoint,
    pub distance: f64,
    pub distance_meters: f64,
    pub steps: Vec<RouteStep>,
}

impl RouteSummary {
    /// Convert a [`RoutePlan`] into a summary with resolved node coordinates.
    pub fn from_plan(graph: &Graph, plan: &RoutePlan) -> Result<Self> {
        let scale = graph.metric_scale();
        let mut steps = Vec::with_capacity(plan.route.nodes().len());
        let mut travelled = 0.0;
        let mut previous: Option<NodeIndex> = None;

        for (index, &node_index) in plan.route.nodes().iter().enumerate() {
            let node = graph
                .node(node_index)
                .ok_or(Error::UnknownNode { index: node_index })?;
            if let Some(prev) = previous {
                travelled += graph
                    .distance(prev, node_index)
                    .ok_or(Error::UnknownNode { index: prev })?;
            }
            previous = Some(node_index);

            steps.push(RouteStep {
                index,
                id: node.id,
                x: node.position.x,
                y: node.position.y,
                cumulative_meters: travelled * scale,
            });
        }

        Ok(Self {
            hops: plan.hop_count(),
            start: endpoint(graph, plan.start)?,
            goal: endpoint(graph, plan.goal)?,
            distance: plan.distance(),
            distance_meters: plan.distance_meters(),
            steps,
        })
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::DistanceOnly => self.distance_line(),
        }
    }

    /// Serialise the summary as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Route: node {} ({:.2}, {:.2}) -> node {} ({:.2}, {:.2}) ({} hops)",
            self.start.id,
            self.start.x,
            self.start.y,
            self.goal.id,
            self.goal.x,
            self.goal.y,
            self.hops
        );
        for step in &self.steps {
            let _ = writeln!(
                buffer,
                "{:>4}: {} ({:.2}, {:.2}) {:.1} m",
                step.index, step.id, step.x, step.y, step.cumulative_meters
            );
        }
        buffer.push_str(&self.distance_line());
        buffer
    }

    fn distance_line(&self) -> String {
        format!("Distance: {} meters.\n", self.distance_meters)
    }
}

fn endpoint(graph: &Graph, index: NodeIndex) -> Result<RouteEndpoint> {
    let node = graph.node(index).ok_or(Error::UnknownNode { index })?;
    Ok(RouteEndpoint {
        index,
        id: node.id,
        x: node.position.x,
        y: node.position.y,
    })
}
