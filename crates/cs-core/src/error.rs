//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` where they
//! surface configuration or lookup failures from this crate.

use thiserror::Error;

use crate::{CellId, VehicleId};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cell {0} not found")]
    CellNotFound(CellId),

    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `cs-core`.
pub type CoreResult<T> = Result<T, CoreError>;
