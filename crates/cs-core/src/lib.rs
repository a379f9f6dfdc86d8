//! `cs-core` — foundational types for the cellsim traffic simulator.
//!
//! Every other `cs-*` crate depends on this one.  It has no `cs-*`
//! dependencies and only `rand` + `thiserror` (plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `CellId`, `VehicleId`, `LaneId`, `RawNodeId`, `WayId` |
//! | [`geo`]         | `GeoPoint`, haversine distance, interpolation         |
//! | [`direction`]   | `Direction` (top/bottom/left/right)                   |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`rng`]         | `VehicleRng` (per vehicle per tick), `SimRng`         |
//! | [`config`]      | `SimConfig`, `SpawnPolicy`, `VehicleProfile`          |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod direction;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{SimConfig, SpawnPolicy, VehicleProfile};
pub use direction::Direction;
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{CellId, LaneId, RawNodeId, VehicleId, WayId};
pub use rng::{SimRng, VehicleRng};
pub use time::{SimClock, Tick};
