//! Synthetic downtown grid.
//!
//! `SIZE × SIZE` intersections roughly 110 m apart, joined by two-way
//! streets.  The centre intersection carries a traffic light.

use cs_core::{RawNodeId, WayId};
use cs_network::{RawMap, RawWay};

pub const SIZE: usize = 5;

/// Degrees between neighbouring intersections.
const SPACING: f64 = 0.001;

/// Build the grid.  Returns the raw map and the light's node.
pub fn build_grid() -> (RawMap, RawNodeId) {
    let mut map = RawMap::new();
    let centre = SIZE / 2;

    let nodes: Vec<Vec<RawNodeId>> = (0..SIZE)
        .map(|row| {
            (0..SIZE)
                .map(|col| {
                    let osm_id = (row * SIZE + col) as i64 + 1;
                    let (lat, lon) = (row as f64 * SPACING, col as f64 * SPACING);
                    if row == centre && col == centre {
                        map.add_signal(osm_id, lat, lon)
                    } else {
                        map.add_node(osm_id, lat, lon)
                    }
                })
                .collect()
        })
        .collect();

    let mut way = 0i64;
    for row in &nodes {
        way += 1;
        map.add_way(RawWay::new(WayId(way), row.clone()).speed_limit_kmh(40.0));
    }
    for col in 0..SIZE {
        way += 1;
        let column: Vec<RawNodeId> = nodes.iter().map(|row| row[col]).collect();
        // Avenues carry two lanes each way.
        map.add_way(RawWay::new(WayId(way), column).speed_limit_kmh(50.0).lanes(2));
    }

    (map, nodes[centre][centre])
}
