use cs_core::{CellId, VehicleId};
use cs_network::NetworkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MobilityError {
    #[error("vehicle {0} is not on the road")]
    VehicleNotFound(VehicleId),

    #[error("vehicle {0} is already on the road")]
    DuplicateVehicle(VehicleId),

    #[error("cell {cell} is already occupied by {by}")]
    CellOccupied { cell: CellId, by: VehicleId },

    #[error("cell {0} does not exist")]
    CellNotFound(CellId),

    #[error("network lookup failed: {0}")]
    Network(#[from] NetworkError),
}

pub type MobilityResult<T> = Result<T, MobilityError>;
