//! `cs-mobility` — vehicles, occupancy, signals and the movement engine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`vehicle`]   | `Vehicle` — speed, route cursor, visit history              |
//! | [`occupancy`] | `OccupancyTable` — cell ↔ vehicle, ascending-id iteration    |
//! | [`signal`]    | `SignalTable` — traffic-light phase state machine            |
//! | [`state`]     | `CellState` view, `MoveContext`, `MoveParams`                |
//! | [`engine`]    | `plan_move`, `Move`                                          |
//! | [`error`]     | `MobilityError`, `MobilityResult<T>`                         |
//!
//! # Movement model (cellular automaton)
//!
//! Each tick a vehicle accelerates by `acceleration` up to the lowest of its
//! own maximum, the lane limit and the free gap ahead, then jumps that many
//! cells.  Moves are computed against a frozen snapshot of occupancy and
//! signal phases, so [`plan_move`] can run on many threads at once; the
//! orchestrator commits the results one vehicle at a time.

pub mod engine;
pub mod error;
pub mod occupancy;
pub mod signal;
pub mod state;
pub mod vehicle;


pub use engine::{Move, plan_move};
pub use error::{MobilityError, MobilityResult};
pub use occupancy::OccupancyTable;
pub use signal::{Light, SignalTable};
pub use state::{CellState, MoveContext, MoveParams};
pub use vehicle::{HISTORY_LEN, Vehicle};
