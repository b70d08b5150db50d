use thiserror::Error;

use crate::graph::NodeIndex;

/// Convenient result alias for the route planner library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when the map data is empty, malformed, or unusable.
    #[error("invalid map data: {message}")]
    InvalidMapData { message: String },

    /// Raised when a nearest-node query runs against a graph without nodes.
    #[error("graph contains no nodes")]
    EmptyGraph,

    /// Raised when the start and goal nodes lie in disconnected components.
    #[error("no route found between node {start} and node {goal}")]
    NoPathFound { start: NodeIndex, goal: NodeIndex },

    /// Raised when a node index does not refer to a node of the graph.
    #[error("node index {index} is outside the graph")]
    UnknownNode { index: NodeIndex },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON serialisation errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_map(message: impl Into<String>) -> Self {
        Error::InvalidMapData {
            message: message.into(),
        }
    }
}
