//! The built cell graph.
//!
//! # Data layout
//!
//! Cells live in a single arena indexed by `CellId`; adjacency is a four-slot
//! array per cell, so a neighbour lookup is two indexed loads.  Lanes keep
//! their ordered cell lists for inspection and spawn placement.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `[lat, lon]` to the nearest non-connector
//! cell.  Used to snap externally planned routes onto the graph.  Exact
//! coordinate matches are answered from a hash map first.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use cs_core::{CellId, Direction, GeoPoint, LaneId, RawNodeId, WayId};

use crate::cell::{Cell, Connector};
use crate::junction::JunctionGraph;
use crate::{NetworkError, NetworkResult};

// ── R-tree cell entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct CellEntry {
    point: [f64; 2], // [lat, lon]
    id:    CellId,
}

impl RTreeObject for CellEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for CellEntry {
    /// Squared Euclidean distance in lat/lon space.  Only used for ranking
    /// candidates a few metres apart.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Lane ──────────────────────────────────────────────────────────────────────

/// One lane of a way, in travel order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lane {
    pub id:       LaneId,
    pub way:      WayId,
    /// `true` for the opposite-direction lanes of a two-way way.
    pub reversed: bool,
    /// Position among the parallel lanes of the same direction (0 = bottom).
    pub index:    u8,
    pub cells:    Vec<CellId>,
}

// ── CellGraph ─────────────────────────────────────────────────────────────────

/// Immutable road graph shared by the simulation and the navigators.
///
/// Do not construct directly; use [`GraphBuilder`](crate::GraphBuilder) or
/// [`build`](crate::build).
pub struct CellGraph {
    cells:     Vec<Cell>,
    lanes:     Vec<Lane>,
    junctions: JunctionGraph,
    /// Raw node → non-connector endpoint cells at that node, ascending.
    anchors:   FxHashMap<RawNodeId, Vec<CellId>>,
    exact:     FxHashMap<(u64, u64), CellId>,
    spatial:   RTree<CellEntry>,
}

impl CellGraph {
    pub(crate) fn new(
        cells: Vec<Cell>,
        lanes: Vec<Lane>,
        junctions: JunctionGraph,
        anchors: FxHashMap<RawNodeId, Vec<CellId>>,
    ) -> Self {
        let mut exact = FxHashMap::default();
        let mut entries = Vec::with_capacity(cells.len());
        for cell in cells.iter().filter(|c| !c.is_connector()) {
            exact.entry(coord_key(cell.pos)).or_insert(cell.id);
            entries.push(CellEntry { point: cell.pos.to_array(), id: cell.id });
        }
        Self {
            cells,
            lanes,
            junctions,
            anchors,
            exact,
            spatial: RTree::bulk_load(entries),
        }
    }

    /// A graph with no cells.  Every route request against it is unreachable.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), JunctionGraph::new(), FxHashMap::default())
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // ── Cell access ───────────────────────────────────────────────────────

    #[inline]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index())
    }

    /// Like [`cell`](Self::cell) but reports a missing id as an error.
    pub fn try_cell(&self, id: CellId) -> NetworkResult<&Cell> {
        self.cell(id).ok_or(NetworkError::CellNotFound(id))
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterator over plain and signalised cells, skipping connectors.
    pub fn road_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().filter(|c| !c.is_connector())
    }

    #[inline]
    pub fn neighbor(&self, id: CellId, dir: Direction) -> Option<CellId> {
        self.cell(id).and_then(|c| c.neighbor(dir))
    }

    #[inline]
    pub fn connector(&self, id: CellId) -> Option<&Connector> {
        self.cell(id).and_then(Cell::connector)
    }

    /// Great-circle distance between two cells in metres.
    pub fn compute_distance(&self, a: CellId, b: CellId) -> NetworkResult<f64> {
        let ca = self.try_cell(a)?;
        let cb = self.try_cell(b)?;
        Ok(ca.distance_m(cb))
    }

    // ── Lanes ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    #[inline]
    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(id.index())
    }

    // ── Raw-node lookups ──────────────────────────────────────────────────

    #[inline]
    pub fn junctions(&self) -> &JunctionGraph {
        &self.junctions
    }

    /// Endpoint cells built at `raw`, in ascending id order.
    pub fn cells_at(&self, raw: RawNodeId) -> &[CellId] {
        self.anchors.get(&raw).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The cell standing in for `raw` in routes: its lowest endpoint cell.
    pub fn representative_cell(&self, raw: RawNodeId) -> Option<CellId> {
        self.cells_at(raw).first().copied()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Non-connector cell positioned exactly at `pos`, if any.
    pub fn cell_at(&self, pos: GeoPoint) -> Option<CellId> {
        self.exact.get(&coord_key(pos)).copied()
    }

    /// Nearest non-connector cell to `pos`.  `None` only for an empty graph.
    pub fn nearest_cell(&self, pos: GeoPoint) -> Option<CellId> {
        self.spatial.nearest_neighbor(&pos.to_array()).map(|e| e.id)
    }

    /// Up to `k` nearest non-connector cells, closest first.
    pub fn k_nearest_cells(&self, pos: GeoPoint, k: usize) -> Vec<CellId> {
        self.spatial
            .nearest_neighbor_iter(&pos.to_array())
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

impl std::fmt::Debug for CellGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellGraph")
            .field("cells", &self.cells.len())
            .field("lanes", &self.lanes.len())
            .field("junctions", &self.junctions.vertex_count())
            .finish()
    }
}

#[inline]
fn coord_key(pos: GeoPoint) -> (u64, u64) {
    (pos.lat.to_bits(), pos.lon.to_bits())
}
