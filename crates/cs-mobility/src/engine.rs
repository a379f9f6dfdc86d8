//! Per-vehicle move computation.
//!
//! # Algorithm
//!
//! For each of the three candidate directions (straight first, then the two
//! lane changes):
//!
//! 1. Walk up to `min(max_speed, current limit)` cells: the first step in the
//!    candidate direction, the rest in the travel direction.  Connector cells
//!    are crossed within the same step.  The walk stops before the first
//!    occupied cell or red light.
//! 2. `speed = min(current + acceleration, max_speed, limit of the first
//!    walked cell, cells walked)`.
//!
//! One candidate is then selected (see [`plan_move`]) and the vehicle lands
//! on its `speed`-th cell.  Nothing here mutates shared state; the result is
//! a [`Move`] that the orchestrator commits.

use cs_core::{CellId, Direction, GeoPoint, VehicleId, VehicleRng};
use cs_network::Connector;

use crate::{MobilityError, MobilityResult, MoveContext, Vehicle};

/// Upper bound on back-to-back connectors crossed in one step.
const MAX_CONNECTOR_HOPS: usize = 4;

/// Planned outcome of one vehicle's tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub vehicle:   VehicleId,
    pub from:      CellId,
    /// Landing cell; equals `from` when the vehicle stays.
    pub to:        CellId,
    pub speed:     u32,
    /// Chosen candidate direction.
    pub direction: Direction,
    /// Route cursor after landing.
    pub cursor:        usize,
    pub best_distance: Option<f64>,
    pub stalled_ticks: u32,
    /// The stall limit was reached this tick.
    pub stalled:   bool,
    /// The current stall streak has been reported, now or earlier.
    pub stall_reported: bool,
    /// The destination was reached this tick.
    pub arrived:   bool,
}

impl Move {
    #[inline]
    pub fn is_stationary(&self) -> bool {
        self.from == self.to
    }
}

struct Candidate {
    direction: Direction,
    cells:     Vec<CellId>,
    speed:     u32,
}

impl Candidate {
    #[inline]
    fn landing(&self) -> Option<CellId> {
        (self.speed as usize).checked_sub(1).and_then(|i| self.cells.get(i)).copied()
    }
}

/// Compute the move of `vehicle` for the current tick.
///
/// Selection among movable candidates:
/// * routed vehicles take the landing cell closest to their next waypoint,
///   ties going to the higher speed;
/// * unrouted vehicles take the fastest candidate, straight on ties, else a
///   uniform draw; with probability `lane_change_probability` they instead
///   draw uniformly among all movable candidates.
///
/// Candidates landing on a recently visited cell are ignored unless nothing
/// else can move.
///
/// # Errors
///
/// Only for inconsistent state: the vehicle is not on the road or stands on
/// a cell missing from the graph.
pub fn plan_move(ctx: &MoveContext<'_>, vehicle: &Vehicle, rng: &mut VehicleRng) -> MobilityResult<Move> {
    let from = ctx.occupancy.cell_of(vehicle.id).ok_or(MobilityError::VehicleNotFound(vehicle.id))?;
    let current = ctx.graph.cell(from).ok_or(MobilityError::CellNotFound(from))?;

    let waypoint = vehicle
        .next_waypoint()
        .and_then(|w| ctx.graph.cell(w))
        .map(|c| c.pos);
    let horizon = vehicle.max_speed.min(current.speed_limit);

    let candidates: Vec<Candidate> = vehicle
        .direction
        .candidates()
        .into_iter()
        .map(|direction| {
            let cells = lookahead(ctx, from, direction, vehicle.direction, horizon, waypoint);
            let limit = cells
                .first()
                .and_then(|&c| ctx.graph.cell(c))
                .map_or(0, |c| c.speed_limit);
            let speed = vehicle
                .current_speed
                .saturating_add(vehicle.acceleration)
                .min(vehicle.max_speed)
                .min(limit)
                .min(cells.len() as u32);
            Candidate { direction, cells, speed }
        })
        .collect();

    let (to, speed, direction) = match select(ctx, vehicle, &candidates, waypoint, rng) {
        Some(c) => (c.landing().unwrap_or(from), c.speed, c.direction),
        None => (from, 0, vehicle.direction),
    };

    Ok(settle(ctx, vehicle, from, to, speed, direction))
}

fn lookahead(
    ctx: &MoveContext<'_>,
    from: CellId,
    first: Direction,
    travel: Direction,
    horizon: u32,
    waypoint: Option<GeoPoint>,
) -> Vec<CellId> {
    let mut cells = Vec::with_capacity(horizon as usize);
    let mut at = from;
    for step in 0..horizon {
        let dir = if step == 0 { first } else { travel };
        let Some(mut next) = ctx.graph.neighbor(at, dir) else {
            break;
        };

        let mut hops = 0;
        while let Some(conn) = ctx.graph.connector(next) {
            hops += 1;
            if hops > MAX_CONNECTOR_HOPS {
                return cells;
            }
            next = steer(ctx, conn, waypoint);
        }

        match ctx.state(next) {
            Some(state) if !state.is_obstruction() && next != from => {}
            _ => break,
        }
        cells.push(next);
        at = next;
    }
    cells
}

/// Connector exit: the build-time pick, or for a routed vehicle the
/// candidate heading closest to its next waypoint.
///
/// Candidates all sit on the junction node, so each is judged by the cell
/// that follows it.
fn steer(ctx: &MoveContext<'_>, conn: &Connector, waypoint: Option<GeoPoint>) -> CellId {
    let Some(target) = waypoint else {
        return conn.resolved;
    };
    conn.candidates
        .iter()
        .filter_map(|&c| {
            let probe = ctx.graph.neighbor(c, conn.fan_out).unwrap_or(c);
            ctx.graph.cell(probe).map(|cell| (c, cell.pos.distance_m(target)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(conn.resolved, |(c, _)| c)
}

fn select<'c>(
    ctx: &MoveContext<'_>,
    vehicle: &Vehicle,
    candidates: &'c [Candidate],
    waypoint: Option<GeoPoint>,
    rng: &mut VehicleRng,
) -> Option<&'c Candidate> {
    let movable: Vec<&Candidate> = candidates.iter().filter(|c| c.speed > 0).collect();
    if movable.is_empty() {
        return None;
    }
    let fresh: Vec<&Candidate> = movable
        .iter()
        .copied()
        .filter(|c| c.landing().is_some_and(|l| !vehicle.visited_recently(l)))
        .collect();
    let pool = if fresh.is_empty() { movable } else { fresh };

    if let Some(target) = waypoint {
        let distance = |c: &Candidate| {
            c.landing()
                .and_then(|l| ctx.graph.cell(l))
                .map_or(f64::INFINITY, |cell| cell.pos.distance_m(target))
        };
        return pool
            .iter()
            .copied()
            .min_by(|a, b| distance(a).total_cmp(&distance(b)).then(b.speed.cmp(&a.speed)));
    }

    if rng.gen_bool(ctx.params.lane_change_probability) {
        return rng.choose(&pool).copied();
    }

    let top = pool.iter().map(|c| c.speed).max()?;
    let fastest: Vec<&Candidate> = pool.iter().copied().filter(|c| c.speed == top).collect();
    if let Some(straight) = fastest.iter().find(|c| c.direction == vehicle.direction) {
        return Some(*straight);
    }
    rng.choose(&fastest).copied()
}

/// Waypoint progress, stall and arrival bookkeeping for a landing cell.
fn settle(
    ctx: &MoveContext<'_>,
    vehicle: &Vehicle,
    from: CellId,
    to: CellId,
    speed: u32,
    direction: Direction,
) -> Move {
    let route = vehicle.route();
    let mut cursor = vehicle.cursor();
    let mut best_distance = vehicle.best_distance();
    let mut stalled_ticks = vehicle.stalled_ticks;
    let mut stall_reported = vehicle.stall_reported();
    let mut stalled = false;

    if let Some(landing) = ctx.graph.cell(to) {
        while let Some(&w) = route.get(cursor) {
            let reached = ctx
                .graph
                .cell(w)
                .is_none_or(|wp| landing.distance_m(wp) <= ctx.params.waypoint_reach_m);
            if !reached {
                break;
            }
            cursor += 1;
            best_distance = None;
            stalled_ticks = 0;
            stall_reported = false;
        }

        if let Some(wp) = route.get(cursor).and_then(|&w| ctx.graph.cell(w)) {
            let d = landing.distance_m(wp);
            if best_distance.is_none_or(|b| d < b) {
                best_distance = Some(d);
                stalled_ticks = 0;
                stall_reported = false;
            } else {
                stalled_ticks = stalled_ticks.saturating_add(1);
                let limit = ctx.params.stall_limit_ticks;
                // Ticks lost to commit conflicts count too, so the streak may
                // already be past the limit when it is first seen here.
                stalled = limit > 0 && stalled_ticks >= limit && !stall_reported;
                stall_reported |= stalled;
            }
        }
    }

    let exhausted_now = vehicle.is_routed() && cursor >= route.len();
    let arrived = to == vehicle.destination || exhausted_now;

    Move {
        vehicle: vehicle.id,
        from,
        to,
        speed,
        direction,
        cursor,
        best_distance,
        stalled_ticks,
        stalled,
        stall_reported,
        arrived,
    }
}
