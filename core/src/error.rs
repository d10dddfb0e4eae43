use thiserror::Error;

use crate::graph::VertexId;

/// Errors surfaced by graph mutation, configuration, and interrupted runs.
///
/// Range problems on algorithm entry points are *not* errors: those return
/// sentinel results (see `ShortestPathResult::out_of_range`).
#[derive(Debug, Error)]
pub enum Error {
    /// A graph was created or re-initialized with zero vertices.
    #[error("graph must have at least one vertex")]
    EmptyGraph,

    /// A mutation referenced a vertex outside `0..vertex_count`.
    #[error("vertex {vertex} out of range for graph with {vertex_count} vertices")]
    VertexOutOfRange {
        vertex: VertexId,
        vertex_count: usize,
    },

    /// The run was interrupted at a pause checkpoint.
    #[error("run interrupted at pause checkpoint")]
    Interrupted,

    /// Config values outside their allowed range.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    /// Config JSON could not be parsed.
    #[error("failed to parse engine config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
