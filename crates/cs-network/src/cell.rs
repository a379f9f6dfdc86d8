//! Road cells: the atomic unit of road space.
//!
//! A cell's static description (position, limit, adjacency, kind) is fixed
//! once the graph is built.  Which vehicle sits on a cell and which phase a
//! signal shows are run-time state kept in `cs-mobility`, outside this
//! struct, so toggling occupancy never touches adjacency data.

use std::hash::{Hash, Hasher};

use cs_core::{CellId, Direction, GeoPoint, RawNodeId, WayId};

// ── Signals ───────────────────────────────────────────────────────────────────

/// Traffic-light phase.  There is no amber phase.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    #[default]
    Green,
    Red,
}

impl Phase {
    #[inline]
    pub fn flipped(self) -> Phase {
        match self {
            Phase::Green => Phase::Red,
            Phase::Red   => Phase::Green,
        }
    }

    #[inline]
    pub fn is_red(self) -> bool {
        self == Phase::Red
    }
}

/// Operator configuration of one traffic light.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalPlan {
    pub initial:     Phase,
    pub green_ticks: u32,
    pub red_ticks:   u32,
}

impl SignalPlan {
    pub fn new(initial: Phase, green_ticks: u32, red_ticks: u32) -> Self {
        Self { initial, green_ticks, red_ticks }
    }

    /// Configured duration of `phase`.  Zero means the phase never ends.
    #[inline]
    pub fn duration(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Green => self.green_ticks,
            Phase::Red   => self.red_ticks,
        }
    }
}

impl Default for SignalPlan {
    fn default() -> Self {
        Self { initial: Phase::Green, green_ticks: 30, red_ticks: 30 }
    }
}

// ── Adjacency ─────────────────────────────────────────────────────────────────

/// Direction → neighbour map stored as a fixed four-slot array.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Adjacency([Option<CellId>; 4]);

impl Adjacency {
    #[inline]
    pub fn get(&self, dir: Direction) -> Option<CellId> {
        self.0[dir.index()]
    }

    #[inline]
    pub fn set(&mut self, dir: Direction, cell: CellId) {
        self.0[dir.index()] = Some(cell);
    }

    #[inline]
    pub fn has(&self, dir: Direction) -> bool {
        self.get(dir).is_some()
    }

    /// Present `(direction, neighbour)` pairs in `Direction::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, CellId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.get(d).map(|c| (d, c)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

// ── Connector ─────────────────────────────────────────────────────────────────

/// Intersection fan-out of a connector cell.
///
/// `candidates` are the open lane ends on the other side of the junction.
/// `resolved` is the candidate chosen when the graph was built and is what
/// `adjacency[fan_out]` points at; routed vehicles may steer to any other
/// candidate instead.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Connector {
    pub fan_out:    Direction,
    pub candidates: Vec<CellId>,
    pub resolved:   CellId,
}

// ── CellKind / Cell ───────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum CellKind {
    #[default]
    Road,
    TrafficLight { plan: SignalPlan },
    Connector(Connector),
}

/// One road cell.
///
/// Equality and hashing use only `id` and `pos`.
#[derive(Clone, Debug)]
pub struct Cell {
    pub id:          CellId,
    pub pos:         GeoPoint,
    /// Speed limit in cells per tick.
    pub speed_limit: u32,
    pub way:         WayId,
    /// Raw node this cell originates from: the node itself for endpoint
    /// cells, the segment start for interior cells.
    pub source:      RawNodeId,
    /// Raw node the cell's lane is heading to.  Routing starts here.
    pub heading:     RawNodeId,
    pub adjacency:   Adjacency,
    pub kind:        CellKind,
}

impl Cell {
    #[inline]
    pub fn neighbor(&self, dir: Direction) -> Option<CellId> {
        self.adjacency.get(dir)
    }

    #[inline]
    pub fn is_road(&self) -> bool {
        matches!(self.kind, CellKind::Road)
    }

    #[inline]
    pub fn is_connector(&self) -> bool {
        matches!(self.kind, CellKind::Connector(_))
    }

    #[inline]
    pub fn signal_plan(&self) -> Option<&SignalPlan> {
        match &self.kind {
            CellKind::TrafficLight { plan } => Some(plan),
            _ => None,
        }
    }

    #[inline]
    pub fn connector(&self) -> Option<&Connector> {
        match &self.kind {
            CellKind::Connector(c) => Some(c),
            _ => None,
        }
    }

    /// Great-circle distance to another cell in metres.
    #[inline]
    pub fn distance_m(&self, other: &Cell) -> f64 {
        self.pos.distance_m(other.pos)
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.pos == other.pos
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.pos.lat.to_bits().hash(state);
        self.pos.lon.to_bits().hash(state);
    }
}
