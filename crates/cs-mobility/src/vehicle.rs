//! Per-vehicle state.

use std::collections::VecDeque;

use cs_core::{CellId, Direction, VehicleId, VehicleProfile};

/// Number of recently visited cells remembered to avoid oscillation.
pub const HISTORY_LEN: usize = 5;

/// A vehicle agent.
///
/// Speeds and acceleration are in cells per tick.  Where the vehicle stands
/// is owned by the [`OccupancyTable`](crate::OccupancyTable), not by the
/// vehicle itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id:            VehicleId,
    pub current_speed: u32,
    pub max_speed:     u32,
    pub acceleration:  u32,
    pub destination:   CellId,
    /// Travel direction.  Lane changes do not alter it.
    pub direction:     Direction,
    /// Consecutive ticks without getting closer to the next waypoint.
    pub stalled_ticks: u32,

    route:         Vec<CellId>,
    cursor:        usize,
    history:       VecDeque<CellId>,
    best_distance: Option<f64>,
    /// The current stall streak has already been reported.
    stall_reported: bool,
}

impl Vehicle {
    pub fn new(id: VehicleId, profile: VehicleProfile, destination: CellId) -> Self {
        Self {
            id,
            current_speed: 0,
            max_speed:     profile.max_speed,
            acceleration:  profile.acceleration,
            destination,
            direction:     Direction::Right,
            stalled_ticks: 0,
            route:         Vec::new(),
            cursor:        0,
            history:       VecDeque::with_capacity(HISTORY_LEN),
            best_distance: None,
            stall_reported: false,
        }
    }

    pub fn with_route(mut self, route: Vec<CellId>) -> Self {
        self.set_route(route);
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Replace the route and restart at its first waypoint.
    pub fn set_route(&mut self, route: Vec<CellId>) {
        self.route = route;
        self.cursor = 0;
        self.best_distance = None;
        self.stalled_ticks = 0;
        self.stall_reported = false;
    }

    #[inline]
    pub fn route(&self) -> &[CellId] {
        &self.route
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Waypoint currently steered toward, `None` once the route is used up.
    #[inline]
    pub fn next_waypoint(&self) -> Option<CellId> {
        self.route.get(self.cursor).copied()
    }

    /// `true` while there is a waypoint left to steer toward.
    #[inline]
    pub fn is_routed(&self) -> bool {
        self.cursor < self.route.len()
    }

    /// `true` when a route was assigned, exhausted or not.
    #[inline]
    pub fn has_route(&self) -> bool {
        !self.route.is_empty()
    }

    #[inline]
    pub fn best_distance(&self) -> Option<f64> {
        self.best_distance
    }

    #[inline]
    pub fn stall_reported(&self) -> bool {
        self.stall_reported
    }

    // ── History ───────────────────────────────────────────────────────────

    pub fn remember(&mut self, cell: CellId) {
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(cell);
    }

    #[inline]
    pub fn visited_recently(&self, cell: CellId) -> bool {
        self.history.contains(&cell)
    }

    pub fn history(&self) -> impl Iterator<Item = CellId> + '_ {
        self.history.iter().copied()
    }

    // ── Commit ────────────────────────────────────────────────────────────

    /// Take over the outcome of a committed move.
    pub fn apply(&mut self, mv: &crate::Move) {
        self.current_speed = mv.speed;
        self.cursor = mv.cursor;
        self.best_distance = mv.best_distance;
        self.stalled_ticks = mv.stalled_ticks;
        self.stall_reported = mv.stall_reported;
        if mv.to != mv.from {
            self.remember(mv.to);
        }
    }

    /// The planned move lost its target cell to an earlier vehicle.
    ///
    /// Returns `true` when this tick pushes a routed vehicle's unreported
    /// stall streak to `stall_limit` (0 disables reporting).
    pub fn hold(&mut self, stall_limit: u32) -> bool {
        self.current_speed = 0;
        if !self.is_routed() {
            return false;
        }
        self.stalled_ticks = self.stalled_ticks.saturating_add(1);
        let crossed = stall_limit > 0 && self.stalled_ticks >= stall_limit && !self.stall_reported;
        self.stall_reported |= crossed;
        crossed
    }
}
