//! Plain data row types written by output backends.

use cs_sim::StepStats;

/// One vehicle changing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRow {
    pub tick:       u64,
    pub vehicle_id: u32,
    pub from_cell:  u32,
    pub to_cell:    u32,
    /// Cells travelled this tick.
    pub speed:      u32,
}

/// Counters for one completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRow {
    pub tick:       u64,
    pub moved:      u64,
    pub stationary: u64,
    pub conflicts:  u64,
    pub stalled:    u64,
    pub arrived:    u64,
    pub vehicles:   u64,
    /// Wall time spent on the step.
    pub elapsed_us: u64,
}

impl StepRow {
    pub fn from_stats(stats: &StepStats, elapsed_us: u64) -> Self {
        Self {
            tick:       stats.tick.0,
            moved:      stats.moved as u64,
            stationary: stats.stationary as u64,
            conflicts:  stats.conflicts as u64,
            stalled:    stats.stalled as u64,
            arrived:    stats.arrived as u64,
            vehicles:   stats.vehicles as u64,
            elapsed_us,
        }
    }
}
