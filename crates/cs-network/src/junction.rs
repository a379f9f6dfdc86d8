//! Way-endpoint graph used for route planning.
//!
//! Vertices are the unique raw map nodes referenced by ways; an undirected
//! edge joins every pair of consecutive nodes of a way, weighted by their
//! great-circle distance.  Vertex indices are assigned in insertion order,
//! which is also the tie-break order of the router.

use rustc_hash::FxHashMap;

use cs_core::{GeoPoint, RawNodeId};

#[derive(Clone, Debug, Default)]
pub struct JunctionGraph {
    ids:   Vec<RawNodeId>,
    pos:   Vec<GeoPoint>,
    index: FxHashMap<RawNodeId, u32>,
    /// `adj[v]` = `(neighbour, length_m)` in insertion order.
    adj:   Vec<Vec<(u32, f64)>>,
    edge_count: usize,
}

impl JunctionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex, or return the existing index if `id` is known.
    pub fn add_vertex(&mut self, id: RawNodeId, pos: GeoPoint) -> u32 {
        if let Some(&v) = self.index.get(&id) {
            return v;
        }
        let v = self.ids.len() as u32;
        self.ids.push(id);
        self.pos.push(pos);
        self.adj.push(Vec::new());
        self.index.insert(id, v);
        v
    }

    /// Add an undirected edge.  Returns `false` if either end is unknown.
    pub fn add_edge(&mut self, a: RawNodeId, b: RawNodeId, length_m: f64) -> bool {
        let (Some(&va), Some(&vb)) = (self.index.get(&a), self.index.get(&b)) else {
            return false;
        };
        self.adj[va as usize].push((vb, length_m));
        self.adj[vb as usize].push((va, length_m));
        self.edge_count += 1;
        true
    }

    /// Add an edge weighted by the distance between the two vertices.
    pub fn add_segment(&mut self, a: RawNodeId, b: RawNodeId) -> bool {
        let (Some(pa), Some(pb)) = (self.position(a), self.position(b)) else {
            return false;
        };
        self.add_edge(a, b, pa.distance_m(pb))
    }

    pub fn vertex_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn vertex_of(&self, id: RawNodeId) -> Option<u32> {
        self.index.get(&id).copied()
    }

    /// `vertex` must come from this graph.
    #[inline]
    pub(crate) fn id_of(&self, vertex: u32) -> RawNodeId {
        self.ids[vertex as usize]
    }

    pub fn position(&self, id: RawNodeId) -> Option<GeoPoint> {
        self.vertex_of(id).map(|v| self.pos[v as usize])
    }

    /// `vertex` must come from this graph.
    #[inline]
    pub(crate) fn neighbors(&self, vertex: u32) -> &[(u32, f64)] {
        &self.adj[vertex as usize]
    }
}
