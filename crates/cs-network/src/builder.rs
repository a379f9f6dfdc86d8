//! Raw map → cell graph construction.
//!
//! # Pipeline
//!
//! 1. Every way's node list is resolved against the known nodes.  Unknown
//!    references and zero-length hops are skipped and counted.
//! 2. Each consecutive node pair becomes a segment of `n + 1` cells spaced
//!    `cell_length_m` apart and linked `Right`/`Left`.  Segment endpoints are
//!    registered under their raw node id.
//! 3. Segments are merged left to right into lanes: the last cell of one
//!    segment absorbs the first cell of the next.
//! 4. Parallel lanes are linked `Top`/`Bottom`; two-way ways repeat steps
//!    2-4 over the reversed node list.
//! 5. [`connect`](GraphBuilder::connect) bridges open lane ends that share a
//!    raw node with connector cells.
//! 6. [`finish`](GraphBuilder::finish) compacts the staging arena into dense
//!    `CellId`s and builds the spatial index.
//!
//! The registry of endpoints lives on the builder and is dropped once the
//! graph is built.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use cs_core::{CellId, Direction, LaneId, RawNodeId, SimRng, WayId};

use crate::cell::{Adjacency, Cell, CellKind, Connector, SignalPlan};
use crate::graph::{CellGraph, Lane};
use crate::junction::JunctionGraph;
use crate::raw::{RawMap, RawNode, RawWay};
use crate::{NetworkError, NetworkResult};

/// Guards float noise in `kmh / 3.6 * secs / len` landing just below an
/// integer.
const SPEED_EPSILON: f64 = 1e-9;

// ── BuildConfig ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuildConfig {
    /// Length of one cell in metres.
    pub cell_length_m: f64,
    /// Simulated seconds per tick, used to convert km/h into cells/tick.
    pub tick_duration_secs: f64,
    /// Seed of the connector resolution RNG.
    pub seed: u64,
    /// Plan given to every signalised node without an override.
    pub signal: SignalPlan,
    pub signal_overrides: BTreeMap<RawNodeId, SignalPlan>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            cell_length_m:      2.0,
            tick_duration_secs: 1.0,
            seed:               42,
            signal:             SignalPlan::default(),
            signal_overrides:   BTreeMap::new(),
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> NetworkResult<()> {
        if !(self.cell_length_m > 0.0) {
            return Err(NetworkError::Config(format!(
                "cell_length_m must be positive, got {}",
                self.cell_length_m
            )));
        }
        if !(self.tick_duration_secs > 0.0) {
            return Err(NetworkError::Config(format!(
                "tick_duration_secs must be positive, got {}",
                self.tick_duration_secs
            )));
        }
        Ok(())
    }

    /// Convert a posted km/h limit into whole cells per tick, at least 1.
    pub fn speed_cells_per_tick(&self, kmh: f64) -> u32 {
        let cells = kmh / 3.6 * self.tick_duration_secs / self.cell_length_m;
        if !cells.is_finite() || cells < 1.0 {
            return 1;
        }
        ((cells + SPEED_EPSILON).floor() as u32).max(1)
    }

    fn plan_for(&self, node: RawNodeId) -> SignalPlan {
        self.signal_overrides.get(&node).copied().unwrap_or(self.signal)
    }
}

// ── BuildReport ───────────────────────────────────────────────────────────────

/// Counters describing one build, including everything that was skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildReport {
    pub ways_built:          usize,
    pub ways_skipped:        usize,
    pub missing_nodes:       usize,
    pub degenerate_segments: usize,
    pub merged_cells:        usize,
    pub connectors:          usize,
    pub cells:               usize,
    pub lanes:               usize,
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

/// Construct a [`CellGraph`] way by way, then call [`finish`](Self::finish).
///
/// # Example
///
/// ```
/// use cs_network::{BuildConfig, GraphBuilder, RawMap, RawWay};
/// use cs_core::WayId;
///
/// let mut map = RawMap::new();
/// let a = map.add_node(1, 0.0, 0.0);
/// let b = map.add_node(2, 0.0, 0.0001);
///
/// let mut builder = GraphBuilder::new(BuildConfig::default()).unwrap();
/// builder.add_nodes(map.nodes.iter().cloned());
/// builder.add_way(&RawWay::new(WayId(1), vec![a, b]).one_way(true)).unwrap();
/// let (graph, report) = builder.finish().unwrap();
/// assert_eq!(report.ways_built, 1);
/// assert_eq!(graph.lane_count(), 1);
/// ```
pub struct GraphBuilder {
    config:    BuildConfig,
    nodes:     FxHashMap<RawNodeId, RawNode>,
    /// Staging arena.  Merged-away cells leave a `None` hole.
    staging:   Vec<Option<Cell>>,
    lanes:     Vec<Lane>,
    /// Raw node → endpoint cells built at that node.
    registry:  FxHashMap<RawNodeId, Vec<CellId>>,
    junctions: JunctionGraph,
    report:    BuildReport,
    connected: bool,
}

impl GraphBuilder {
    pub fn new(config: BuildConfig) -> NetworkResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            nodes:     FxHashMap::default(),
            staging:   Vec::new(),
            lanes:     Vec::new(),
            registry:  FxHashMap::default(),
            junctions: JunctionGraph::new(),
            report:    BuildReport::default(),
            connected: false,
        })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Make nodes known to subsequent [`add_way`](Self::add_way) calls.
    /// A repeated id replaces the earlier node.
    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = RawNode>) {
        for node in nodes {
            self.nodes.insert(node.id, node);
        }
    }

    /// Build the lanes of one way.  Bad node data is skipped, not returned.
    pub fn add_way(&mut self, way: &RawWay) -> NetworkResult<()> {
        let usable = self.resolve(way);
        if usable.len() < 2 {
            log::warn!(
                "way {}: {} usable node(s), skipping",
                way.id,
                usable.len()
            );
            self.report.ways_skipped += 1;
            return Ok(());
        }

        for node in &usable {
            self.junctions.add_vertex(node.id, node.pos);
        }
        for pair in usable.windows(2) {
            self.junctions.add_segment(pair[0].id, pair[1].id);
        }

        let limit = self.config.speed_cells_per_tick(way.speed_limit_kmh);
        let lanes = way.lanes.max(1);

        self.build_direction(way.id, &usable, false, lanes, limit)?;
        if !way.one_way {
            let reversed: Vec<RawNode> = usable.iter().rev().cloned().collect();
            self.build_direction(way.id, &reversed, true, lanes, limit)?;
        }

        self.report.ways_built += 1;
        Ok(())
    }

    /// Bridge open lane ends that meet at the same raw node.
    ///
    /// For every registry bucket with more than one member, each cell without
    /// a `Right` neighbour gets a forward connector whose candidates are the
    /// bucket's cells without a `Left` neighbour (itself excluded), and vice
    /// versa.  An empty candidate pool leaves the end open.
    ///
    /// Idempotent: a second call does nothing.
    pub fn connect(&mut self) -> NetworkResult<()> {
        if self.connected {
            return Ok(());
        }
        self.connected = true;

        let mut rng = SimRng::new(self.config.seed);
        let mut keys: Vec<RawNodeId> = self
            .registry
            .iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(k, _)| *k)
            .collect();
        keys.sort_unstable();

        for key in keys {
            let members = self.registry.get(&key).cloned().unwrap_or_default();
            let right_open: Vec<CellId> = members
                .iter()
                .copied()
                .filter(|&c| self.staged(c).is_some_and(|cell| !cell.adjacency.has(Direction::Right)))
                .collect();
            let left_open: Vec<CellId> = members
                .iter()
                .copied()
                .filter(|&c| self.staged(c).is_some_and(|cell| !cell.adjacency.has(Direction::Left)))
                .collect();

            for &end in &right_open {
                let pool: Vec<CellId> = left_open.iter().copied().filter(|&c| c != end).collect();
                self.add_connector(key, end, Direction::Right, pool, &mut rng)?;
            }
            for &start in &left_open {
                let pool: Vec<CellId> = right_open.iter().copied().filter(|&c| c != start).collect();
                self.add_connector(key, start, Direction::Left, pool, &mut rng)?;
            }
        }
        Ok(())
    }

    /// Connect (if not done yet), compact, index, and return the graph.
    pub fn finish(mut self) -> NetworkResult<(CellGraph, BuildReport)> {
        self.connect()?;

        // staging index → final id
        let mut remap: Vec<Option<CellId>> = Vec::with_capacity(self.staging.len());
        let mut next = 0u32;
        for slot in &self.staging {
            if slot.is_some() {
                remap.push(Some(CellId(next)));
                next += 1;
            } else {
                remap.push(None);
            }
        }
        let map = |id: CellId| remap.get(id.index()).copied().flatten();

        let mut cells = Vec::with_capacity(next as usize);
        for mut cell in self.staging.into_iter().flatten() {
            let Some(id) = map(cell.id) else { continue };
            cell.id = id;
            let mut adjacency = Adjacency::default();
            for (dir, nb) in cell.adjacency.iter() {
                if let Some(nb) = map(nb) {
                    adjacency.set(dir, nb);
                }
            }
            cell.adjacency = adjacency;
            if let CellKind::Connector(conn) = &mut cell.kind {
                conn.candidates = conn.candidates.iter().filter_map(|&c| map(c)).collect();
                conn.resolved = map(conn.resolved).unwrap_or(CellId::INVALID);
            }
            cells.push(cell);
        }

        let mut lanes = self.lanes;
        for lane in &mut lanes {
            lane.cells = lane.cells.iter().filter_map(|&c| map(c)).collect();
        }

        let mut anchors: FxHashMap<RawNodeId, Vec<CellId>> = FxHashMap::default();
        for (raw, members) in self.registry {
            let mut ids: Vec<CellId> = members.into_iter().filter_map(map).collect();
            ids.sort_unstable();
            ids.dedup();
            if !ids.is_empty() {
                anchors.insert(raw, ids);
            }
        }

        let mut report = self.report;
        report.cells = cells.len();
        report.lanes = lanes.len();

        log::info!(
            "graph built: {} cells, {} lanes, {} connectors, {} junctions ({} ways built, {} skipped, {} missing node refs)",
            report.cells,
            report.lanes,
            report.connectors,
            self.junctions.vertex_count(),
            report.ways_built,
            report.ways_skipped,
            report.missing_nodes,
        );

        Ok((CellGraph::new(cells, lanes, self.junctions, anchors), report))
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Known nodes of `way` in order, without zero-length hops.
    fn resolve(&mut self, way: &RawWay) -> Vec<RawNode> {
        let mut usable: Vec<RawNode> = Vec::with_capacity(way.node_refs.len());
        for &id in &way.node_refs {
            let Some(node) = self.nodes.get(&id) else {
                log::warn!("way {}: node {} not found, skipping reference", way.id, id);
                self.report.missing_nodes += 1;
                continue;
            };
            if let Some(prev) = usable.last() {
                if prev.pos.distance_m(node.pos) == 0.0 {
                    log::warn!("way {}: zero-length segment at node {}, skipping", way.id, id);
                    self.report.degenerate_segments += 1;
                    continue;
                }
            }
            usable.push(node.clone());
        }
        usable
    }

    fn build_direction(
        &mut self,
        way: WayId,
        nodes: &[RawNode],
        reversed: bool,
        lanes: u8,
        limit: u32,
    ) -> NetworkResult<()> {
        let mut built: Vec<Vec<CellId>> = Vec::with_capacity(lanes as usize);
        for _ in 0..lanes {
            built.push(self.build_lane(way, nodes, limit)?);
        }

        for k in 1..built.len() {
            for (&lower, &upper) in built[k - 1].iter().zip(&built[k]) {
                self.link(lower, Direction::Top, upper);
                self.link(upper, Direction::Bottom, lower);
            }
        }

        for (index, cells) in built.into_iter().enumerate() {
            let id = LaneId::try_from(self.lanes.len()).map_err(|_| NetworkError::CapacityExceeded {
                what:  "lanes",
                count: self.lanes.len(),
            })?;
            self.lanes.push(Lane { id, way, reversed, index: index as u8, cells });
        }
        Ok(())
    }

    fn build_lane(&mut self, way: WayId, nodes: &[RawNode], limit: u32) -> NetworkResult<Vec<CellId>> {
        let mut lane: Vec<CellId> = Vec::new();
        for pair in nodes.windows(2) {
            let segment = self.build_segment(way, &pair[0], &pair[1], limit)?;
            match lane.last().copied() {
                None => lane = segment,
                Some(last) => {
                    self.merge(last, segment[0]);
                    lane.extend_from_slice(&segment[1..]);
                }
            }
        }
        Ok(lane)
    }

    /// Cells `0..=n` from `a` to `b`, linked along the lane.
    fn build_segment(&mut self, way: WayId, a: &RawNode, b: &RawNode, limit: u32) -> NetworkResult<Vec<CellId>> {
        let distance = a.pos.distance_m(b.pos);
        let n = ((distance / self.config.cell_length_m).ceil() as usize).max(1);

        let mut ids = Vec::with_capacity(n + 1);
        for i in 0..=n {
            let (node, endpoint) = match i {
                0 => (a, true),
                _ if i == n => (b, true),
                _ => (a, false),
            };
            let kind = if endpoint && node.traffic_light {
                CellKind::TrafficLight { plan: self.config.plan_for(node.id) }
            } else {
                CellKind::Road
            };
            let id = self.push(Cell {
                id:          CellId::INVALID,
                pos:         a.pos.lerp(b.pos, i as f64 / n as f64),
                speed_limit: limit,
                way,
                source:      node.id,
                heading:     b.id,
                adjacency:   Adjacency::default(),
                kind,
            })?;
            if endpoint {
                self.registry.entry(node.id).or_default().push(id);
            }
            ids.push(id);
        }

        for pair in ids.windows(2) {
            self.link(pair[0], Direction::Right, pair[1]);
            self.link(pair[1], Direction::Left, pair[0]);
        }
        Ok(ids)
    }

    /// `last` absorbs `next`: adjacency is copied over, back-references are
    /// repointed, and `next` is dropped from the arena and the registry.
    fn merge(&mut self, last: CellId, next: CellId) {
        let Some(absorbed) = self.staging.get_mut(next.index()).and_then(Option::take) else {
            return;
        };
        for (dir, nb) in absorbed.adjacency.iter() {
            self.link(last, dir, nb);
            if let Some(cell) = self.staged_mut(nb) {
                if cell.adjacency.get(dir.opposite()) == Some(next) {
                    cell.adjacency.set(dir.opposite(), last);
                }
            }
        }
        if let Some(bucket) = self.registry.get_mut(&absorbed.source) {
            bucket.retain(|&c| c != next);
        }
        self.report.merged_cells += 1;
    }

    fn add_connector(
        &mut self,
        node: RawNodeId,
        end: CellId,
        fan_out: Direction,
        candidates: Vec<CellId>,
        rng: &mut SimRng,
    ) -> NetworkResult<()> {
        let Some(&resolved) = rng.choose(&candidates) else {
            return Ok(());
        };
        let Some(anchor) = self.staged(end) else {
            return Ok(());
        };
        let (pos, speed_limit, way) = (anchor.pos, anchor.speed_limit, anchor.way);

        let mut adjacency = Adjacency::default();
        adjacency.set(fan_out.opposite(), end);
        adjacency.set(fan_out, resolved);

        let id = self.push(Cell {
            id: CellId::INVALID,
            pos,
            speed_limit,
            way,
            source: node,
            heading: node,
            adjacency,
            kind: CellKind::Connector(Connector { fan_out, candidates, resolved }),
        })?;
        self.link(end, fan_out, id);
        self.report.connectors += 1;
        Ok(())
    }

    fn push(&mut self, mut cell: Cell) -> NetworkResult<CellId> {
        let id = CellId::try_from(self.staging.len())
            .ok()
            .filter(|id| id.is_valid())
            .ok_or(NetworkError::CapacityExceeded { what: "cells", count: self.staging.len() })?;
        cell.id = id;
        self.staging.push(Some(cell));
        Ok(id)
    }

    #[inline]
    fn link(&mut self, from: CellId, dir: Direction, to: CellId) {
        if let Some(cell) = self.staged_mut(from) {
            cell.adjacency.set(dir, to);
        }
    }

    #[inline]
    fn staged(&self, id: CellId) -> Option<&Cell> {
        self.staging.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    fn staged_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.staging.get_mut(id.index()).and_then(Option::as_mut)
    }
}

/// Build a graph from a complete raw map in one call.
pub fn build(map: &RawMap, config: BuildConfig) -> NetworkResult<(CellGraph, BuildReport)> {
    let mut builder = GraphBuilder::new(config)?;
    builder.add_nodes(map.nodes.iter().cloned());
    for way in &map.ways {
        builder.add_way(way)?;
    }
    builder.finish()
}
