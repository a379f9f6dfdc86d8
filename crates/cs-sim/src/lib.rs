//! `cs-sim` — tick loop orchestrator for the cellsim traffic simulator.
//!
//! # Two-phase tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Compute — plan_move for every vehicle against the frozen state
//!               (parallel with the `parallel` feature).
//!   ② Commit  — apply moves in ascending VehicleId order; a cell already
//!               claimed this tick leaves the later vehicle in place.
//!   ③ Arrive  — remove vehicles that reached their destination.
//!   ④ Signals — SignalTable::update(tick + 1).
//!   ⑤ Events  — VehicleMoved / VehicleStalled / VehicleArrived,
//!               then StepCompleted.
//! ```
//!
//! Events go to the [`SimObserver`] passed to `run` and, after
//! [`Sim::subscribe`], to a `crossbeam-channel` receiver that can be
//! drained on another thread.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the compute phase on Rayon's thread pool.         |
//! | `serde`    | Forwards to `cs-core/serde` and `cs-network/serde`.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use cs_core::SimConfig;
//! use cs_network::{build, BuildConfig, RoadNavigator};
//! use cs_sim::{NoopObserver, SimBuilder};
//!
//! let (graph, _) = build(&map, BuildConfig::default())?;
//! let mut sim = SimBuilder::new(config, graph, RoadNavigator::new()).build()?;
//! sim.populate()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod events;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use events::{EventPublisher, SimEvent, StepStats};
pub use observer::{EventLog, NoopObserver, SimObserver};
pub use sim::Sim;
