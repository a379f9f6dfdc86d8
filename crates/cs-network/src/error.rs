//! Network-subsystem error type.

use thiserror::Error;

use cs_core::CellId;

/// Errors produced by `cs-network`.
///
/// Bad map data is not an error: offending nodes and segments are skipped
/// and counted in the [`BuildReport`](crate::BuildReport).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("cell {0} not found in graph")]
    CellNotFound(CellId),

    #[error("graph too large: {count} {what} do not fit in 32-bit ids")]
    CapacityExceeded { what: &'static str, count: usize },

    #[error("invalid build configuration: {0}")]
    Config(String),

    #[error("route provider error: {0}")]
    Provider(String),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
