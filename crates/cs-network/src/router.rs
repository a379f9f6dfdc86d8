//! Route provider trait and the graph-internal Dijkstra navigator.
//!
//! # Pluggability
//!
//! `cs-sim` asks for routes through [`NavigationService`], so applications
//! can swap the built-in [`RoadNavigator`] for an external planner (see
//! [`StepNavigator`](crate::StepNavigator)) without touching the engine.
//!
//! # Cost units
//!
//! Edge weights are haversine metres.  Inside Dijkstra they are rounded to
//! whole millimetres (`u64`) so that ordering and tie-breaking are exact.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

use cs_core::{CellId, RawNodeId};

use crate::graph::CellGraph;
use crate::junction::JunctionGraph;

// ── Route ─────────────────────────────────────────────────────────────────────

/// Ordered waypoint cells from a source toward a destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Waypoints in travel order.  The destination is always last.
    pub cells: Vec<CellId>,
    /// Path length in metres; `None` when no path exists.
    pub distance_m: Option<f64>,
}

impl Route {
    /// The "no path" result: just the destination, no distance.
    pub fn unreachable(destination: CellId) -> Self {
        Self { cells: vec![destination], distance_m: None }
    }

    #[inline]
    pub fn is_reachable(&self) -> bool {
        self.distance_m.is_some()
    }

    #[inline]
    pub fn destination(&self) -> Option<CellId> {
        self.cells.last().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ── NavigationService ─────────────────────────────────────────────────────────

/// Pluggable route provider.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: the simulation may hold one behind
/// an `Arc` and query it from spawn code running beside the tick loop.
pub trait NavigationService: Send + Sync {
    /// Route from `source` to `destination`.
    ///
    /// Never fails: a missing path is [`Route::unreachable`].
    fn route(&self, graph: &CellGraph, source: CellId, destination: CellId) -> Route;
}

impl<T: NavigationService + ?Sized> NavigationService for Arc<T> {
    fn route(&self, graph: &CellGraph, source: CellId, destination: CellId) -> Route {
        (**self).route(graph, source, destination)
    }
}

// ── RoadNavigator ─────────────────────────────────────────────────────────────

/// Shortest-path tree from one source vertex.
#[derive(Debug)]
struct Tree {
    /// Cost in millimetres, `u64::MAX` when unreached.
    dist: Vec<u64>,
    /// Predecessor vertex, `u32::MAX` for the source and unreached vertices.
    prev: Vec<u32>,
}

/// Dijkstra over the junction graph with a per-source tree cache.
///
/// The first query from a raw node computes the full shortest-path tree from
/// it; later queries from the same node (to any destination) reuse it.
#[derive(Debug, Default)]
pub struct RoadNavigator {
    trees:        RwLock<FxHashMap<u32, Arc<Tree>>>,
    computations: AtomicUsize,
}

/// A raw-node level shortest path.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePath {
    pub nodes:      Vec<RawNodeId>,
    pub distance_m: f64,
}

impl RoadNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of source trees held in the cache.
    pub fn cached_sources(&self) -> usize {
        self.trees.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Number of trees computed so far (cache misses).
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    pub fn clear_cache(&self) {
        if let Ok(mut trees) = self.trees.write() {
            trees.clear();
        }
    }

    /// Shortest raw-node path between two junctions, `None` if either is
    /// unknown or they are disconnected.
    pub fn path(&self, junctions: &JunctionGraph, from: RawNodeId, to: RawNodeId) -> Option<NodePath> {
        let src = junctions.vertex_of(from)?;
        let dst = junctions.vertex_of(to)?;
        let tree = self.tree(junctions, src);

        let cost = tree.dist[dst as usize];
        if cost == u64::MAX {
            return None;
        }

        let mut vertices = vec![dst];
        let mut cur = dst;
        while cur != src {
            cur = tree.prev[cur as usize];
            if cur == u32::MAX {
                return None;
            }
            vertices.push(cur);
        }
        vertices.reverse();

        Some(NodePath {
            nodes:      vertices.into_iter().map(|v| junctions.id_of(v)).collect(),
            distance_m: cost as f64 / 1000.0,
        })
    }

    fn tree(&self, junctions: &JunctionGraph, src: u32) -> Arc<Tree> {
        if let Ok(trees) = self.trees.read() {
            if let Some(tree) = trees.get(&src) {
                return Arc::clone(tree);
            }
        }

        let tree = Arc::new(dijkstra(junctions, src));
        self.computations.fetch_add(1, Ordering::Relaxed);
        log::debug!("computed shortest-path tree from {}", junctions.id_of(src));

        match self.trees.write() {
            Ok(mut trees) => Arc::clone(trees.entry(src).or_insert(tree)),
            Err(_) => tree,
        }
    }
}

impl NavigationService for RoadNavigator {
    fn route(&self, graph: &CellGraph, source: CellId, destination: CellId) -> Route {
        let (Some(src), Some(dst)) = (graph.cell(source), graph.cell(destination)) else {
            return Route::unreachable(destination);
        };
        if src.heading == dst.source {
            return Route { cells: vec![destination], distance_m: Some(0.0) };
        }

        let Some(path) = self.path(graph.junctions(), src.heading, dst.source) else {
            log::debug!("no path from {} to {}", source, destination);
            return Route::unreachable(destination);
        };

        let mut cells: Vec<CellId> = path
            .nodes
            .iter()
            .filter_map(|&raw| graph.representative_cell(raw))
            .collect();
        cells.dedup();
        if cells.last() != Some(&destination) {
            cells.push(destination);
        }
        Route { cells, distance_m: Some(path.distance_m) }
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

#[inline]
fn cost_mm(length_m: f64) -> u64 {
    (length_m * 1000.0).round().max(0.0) as u64
}

fn dijkstra(junctions: &JunctionGraph, src: u32) -> Tree {
    let n = junctions.vertex_count();
    let mut dist = vec![u64::MAX; n];
    let mut prev = vec![u32::MAX; n];
    dist[src as usize] = 0;

    // Min-heap on (cost, vertex); the vertex index breaks ties in insertion
    // order.
    let mut heap: BinaryHeap<Reverse<(u64, u32)>> = BinaryHeap::new();
    heap.push(Reverse((0, src)));

    while let Some(Reverse((cost, v))) = heap.pop() {
        // Skip stale heap entries.
        if cost > dist[v as usize] {
            continue;
        }
        for &(w, length_m) in junctions.neighbors(v) {
            let next = cost.saturating_add(cost_mm(length_m));
            if next < dist[w as usize] {
                dist[w as usize] = next;
                prev[w as usize] = v;
                heap.push(Reverse((next, w)));
            }
        }
    }

    Tree { dist, prev }
}
