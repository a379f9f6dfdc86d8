//! Top-level simulation configuration.
//!
//! Supplied as a plain value.  Applications that load it from a file enable
//! the `serde` feature; every field has a default, so partial files work.

use crate::{CellId, CoreError, CoreResult, Tick};

// ── SpawnPolicy ───────────────────────────────────────────────────────────────

/// How origin/destination cells are chosen when the fleet is populated.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpawnPolicy {
    /// Uniformly random free road cell as origin, uniformly random road cell
    /// as destination.  Draws come from the run's `SimRng`.
    #[default]
    RandomPairs,
    /// Explicit `(origin, destination)` pairs, spawned in order.  Pairs whose
    /// origin is occupied or not a road cell are skipped.
    Fixed(Vec<(CellId, CellId)>),
}

// ── VehicleProfile ────────────────────────────────────────────────────────────

/// Kinematic parameters given to every spawned vehicle, in cells per tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleProfile {
    pub max_speed:    u32,
    pub acceleration: u32,
}

impl Default for VehicleProfile {
    fn default() -> Self {
        Self { max_speed: 5, acceleration: 1 }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Total ticks to simulate.
    pub total_ticks: u64,

    /// Simulated seconds per tick.  Must match the value the graph was built
    /// with for speed limits to mean what they say.
    pub tick_duration_secs: f64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Number of vehicles spawned by `Sim::populate`.
    pub vehicle_count: usize,

    pub spawn: SpawnPolicy,

    pub vehicle: VehicleProfile,

    /// Ask the navigation service for a route at spawn time.
    pub use_routes: bool,

    /// Per-tick probability that an unrouted vehicle picks a random movable
    /// direction instead of the fastest one.
    pub lane_change_probability: f64,

    /// A waypoint counts as reached once the vehicle is this close (metres).
    pub waypoint_reach_m: f64,

    /// Consecutive ticks without progress toward the next waypoint before a
    /// routed vehicle is reported as stalled.
    pub stall_limit_ticks: u32,

    /// Remove vehicles from the road when they reach their destination.
    pub remove_on_arrival: bool,

    /// Capacity of the event channel.  `None` = unbounded.  When bounded and
    /// full, events are dropped (and counted) rather than blocking the tick.
    pub event_buffer: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_ticks:             100,
            tick_duration_secs:      1.0,
            seed:                    42,
            num_threads:             None,
            vehicle_count:           0,
            spawn:                   SpawnPolicy::RandomPairs,
            vehicle:                 VehicleProfile::default(),
            use_routes:              true,
            lane_change_probability: 0.1,
            waypoint_reach_m:        4.0,
            stall_limit_ticks:       20,
            remove_on_arrival:       true,
            event_buffer:            None,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.tick_duration_secs > 0.0) {
            return Err(CoreError::Config(format!(
                "tick_duration_secs must be positive, got {}",
                self.tick_duration_secs
            )));
        }
        if !(0.0..=1.0).contains(&self.lane_change_probability) {
            return Err(CoreError::Config(format!(
                "lane_change_probability must be within [0, 1], got {}",
                self.lane_change_probability
            )));
        }
        if self.vehicle.max_speed == 0 {
            return Err(CoreError::Config("vehicle max_speed must be at least 1".into()));
        }
        if self.event_buffer == Some(0) {
            return Err(CoreError::Config("event_buffer must be positive when set".into()));
        }
        Ok(())
    }
}
