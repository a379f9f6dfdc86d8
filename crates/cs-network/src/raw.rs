//! Raw map input consumed by the graph builder.
//!
//! These records are produced by an ingestion stage outside this workspace
//! (file parsing and tag filtering of pedestrian/service ways happen there).
//! A way refers to its nodes by id; unknown ids are skipped at build time.

use cs_core::{GeoPoint, RawNodeId, WayId};

/// A map node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawNode {
    pub id:            RawNodeId,
    pub pos:           GeoPoint,
    #[cfg_attr(feature = "serde", serde(default))]
    pub traffic_light: bool,
}

/// A directed carriageway (or a two-way road) as an ordered node list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawWay {
    pub id:              WayId,
    pub node_refs:       Vec<RawNodeId>,
    /// Posted limit in km/h.
    pub speed_limit_kmh: f64,
    pub one_way:         bool,
    /// Lanes per travel direction.  Zero is treated as one.
    pub lanes:           u8,
}

impl RawWay {
    /// Two-way, single-lane way at 50 km/h.
    pub fn new(id: WayId, node_refs: Vec<RawNodeId>) -> Self {
        Self {
            id,
            node_refs,
            speed_limit_kmh: 50.0,
            one_way: false,
            lanes: 1,
        }
    }

    pub fn one_way(mut self, one_way: bool) -> Self {
        self.one_way = one_way;
        self
    }

    pub fn speed_limit_kmh(mut self, kmh: f64) -> Self {
        self.speed_limit_kmh = kmh;
        self
    }

    pub fn lanes(mut self, lanes: u8) -> Self {
        self.lanes = lanes;
        self
    }
}

/// The full input of one graph build.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMap {
    pub nodes: Vec<RawNode>,
    pub ways:  Vec<RawWay>,
}

impl RawMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id for use in way node lists.
    pub fn add_node(&mut self, id: i64, lat: f64, lon: f64) -> RawNodeId {
        let id = RawNodeId(id);
        self.nodes.push(RawNode { id, pos: GeoPoint::new(lat, lon), traffic_light: false });
        id
    }

    /// Add a node carrying a traffic signal.
    pub fn add_signal(&mut self, id: i64, lat: f64, lon: f64) -> RawNodeId {
        let id = RawNodeId(id);
        self.nodes.push(RawNode { id, pos: GeoPoint::new(lat, lon), traffic_light: true });
        id
    }

    pub fn add_way(&mut self, way: RawWay) {
        self.ways.push(way);
    }
}
