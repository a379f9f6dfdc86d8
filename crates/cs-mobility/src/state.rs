//! Run-time view of a cell and the read-only context of a tick.

use cs_core::{CellId, SimConfig, VehicleId};
use cs_network::{CellGraph, Connector, Phase};

use crate::{OccupancyTable, SignalTable};

/// What a cell looks like to a vehicle planning its move.
///
/// Derived on demand from the static cell, the occupancy table and the
/// signal table.  An occupied light reports `Occupied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState<'a> {
    Free,
    Occupied(VehicleId),
    Light(Phase),
    Connector(&'a Connector),
}

impl CellState<'_> {
    /// Occupied cells and red lights block the lookahead.
    #[inline]
    pub fn is_obstruction(&self) -> bool {
        matches!(self, CellState::Occupied(_) | CellState::Light(Phase::Red))
    }
}

/// Movement tunables taken from [`SimConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveParams {
    pub lane_change_probability: f64,
    pub waypoint_reach_m:        f64,
    pub stall_limit_ticks:       u32,
}

impl Default for MoveParams {
    fn default() -> Self {
        Self::from(&SimConfig::default())
    }
}

impl From<&SimConfig> for MoveParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            lane_change_probability: config.lane_change_probability,
            waypoint_reach_m:        config.waypoint_reach_m,
            stall_limit_ticks:       config.stall_limit_ticks,
        }
    }
}

/// Everything a move computation reads.  Shared immutably by all workers.
#[derive(Clone, Copy)]
pub struct MoveContext<'a> {
    pub graph:     &'a CellGraph,
    pub occupancy: &'a OccupancyTable,
    pub signals:   &'a SignalTable,
    pub params:    MoveParams,
}

impl<'a> MoveContext<'a> {
    pub fn new(
        graph: &'a CellGraph,
        occupancy: &'a OccupancyTable,
        signals: &'a SignalTable,
        params: MoveParams,
    ) -> Self {
        Self { graph, occupancy, signals, params }
    }

    /// State of `cell`, `None` if it does not exist.
    pub fn state(&self, cell: CellId) -> Option<CellState<'a>> {
        let c = self.graph.cell(cell)?;
        if let Some(v) = self.occupancy.occupant(cell) {
            return Some(CellState::Occupied(v));
        }
        if let Some(phase) = self.signals.phase(cell) {
            return Some(CellState::Light(phase));
        }
        if let Some(conn) = c.connector() {
            return Some(CellState::Connector(conn));
        }
        Some(CellState::Free)
    }
}
