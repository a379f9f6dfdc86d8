use cs_core::CoreError;
use cs_mobility::MobilityError;
use cs_network::NetworkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {0}")]
    Core(#[from] CoreError),

    #[error("vehicle ids exhausted after {0} spawns")]
    VehicleIdsExhausted(usize),

    #[error("mobility error: {0}")]
    Mobility(#[from] MobilityError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),
}

pub type SimResult<T> = Result<T, SimError>;
