//! Error types for the adjacency engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Edge type 0 is reserved as null")]
    InvalidEdgeType,

    #[error("Node id {id} has not been minted (next id: {next_id})")]
    InvalidNodeId { id: u32, next_id: u32 },

    #[error("{map} map cannot grow past capacity {max}")]
    CapacityOverflow { map: &'static str, max: u32 },

    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),

    #[error("Graph invariant violated: {0}")]
    Inconsistent(&'static str),

    #[error("Target capacity {target} is smaller than source capacity {source_capacity}")]
    CapacityTooSmall { target: u32, source_capacity: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    /// Get error code for wire protocol / observability.
    pub fn code(&self) -> &'static str {
        match self {
            GraphError::InvalidEdgeType => "INVALID_EDGE_TYPE",
            GraphError::InvalidNodeId { .. } => "INVALID_NODE_ID",
            GraphError::CapacityOverflow { .. } => "CAPACITY_OVERFLOW",
            GraphError::Corrupt(_) => "CORRUPT",
            GraphError::Inconsistent(_) => "INCONSISTENT",
            GraphError::CapacityTooSmall { .. } => "CAPACITY_TOO_SMALL",
            GraphError::Io(_) => "IO_ERROR",
        }
    }
}
