//! `cs-network` — cell graph, graph construction, spatial lookup and routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`raw`]      | `RawMap`, `RawNode`, `RawWay` (builder input)              |
//! | [`cell`]     | `Cell`, `CellKind`, `Connector`, `Adjacency`, `SignalPlan` |
//! | [`graph`]    | `CellGraph` (arena + lanes + R-tree), `Lane`               |
//! | [`builder`]  | `GraphBuilder`, `BuildConfig`, `BuildReport`, `build`      |
//! | [`junction`] | `JunctionGraph` (way endpoints, haversine-weighted)        |
//! | [`router`]   | `NavigationService` trait, `Route`, `RoadNavigator`        |
//! | [`external`] | `StepSource`, `StepNavigator` (external planner adapter)   |
//! | [`error`]    | `NetworkError`, `NetworkResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on input and config types. |

pub mod builder;
pub mod cell;
pub mod error;
pub mod external;
pub mod graph;
pub mod junction;
pub mod raw;
pub mod router;

#[cfg(test)]
mod tests;

pub use builder::{BuildConfig, BuildReport, GraphBuilder, build};
pub use cell::{Adjacency, Cell, CellKind, Connector, Phase, SignalPlan};
pub use error::{NetworkError, NetworkResult};
pub use external::{Step, StepNavigator, StepSource};
pub use graph::{CellGraph, Lane};
pub use junction::JunctionGraph;
pub use raw::{RawMap, RawNode, RawWay};
pub use router::{NavigationService, NodePath, RoadNavigator, Route};
