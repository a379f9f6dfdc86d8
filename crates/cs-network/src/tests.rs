//! Unit tests for cs-network.
//!
//! All tests use hand-built raw maps near the equator, where 0.0001° of
//! longitude is about 11.1 m, i.e. six 2 m cells per segment.

#[cfg(test)]
mod helpers {
    use cs_core::{RawNodeId, WayId};
    use crate::{BuildConfig, BuildReport, CellGraph, RawMap, RawWay, build};

    pub const STEP: f64 = 0.0001;

    /// One-way chain of `n` nodes along the equator.
    pub fn chain_map(n: usize) -> (RawMap, Vec<RawNodeId>) {
        let mut map = RawMap::new();
        let ids: Vec<RawNodeId> = (0..n)
            .map(|i| map.add_node(i as i64 + 1, 0.0, i as f64 * STEP))
            .collect();
        map.add_way(RawWay::new(WayId(1), ids.clone()).one_way(true));
        (map, ids)
    }

    pub fn build_default(map: &RawMap) -> (CellGraph, BuildReport) {
        build(map, BuildConfig::default()).unwrap()
    }
}

// ── Cell subdivision & lane merge ─────────────────────────────────────────────

#[cfg(test)]
mod subdivision {
    use cs_core::{CellId, Direction};
    use crate::{BuildConfig, CellKind};

    #[test]
    fn segment_cell_count() {
        let (map, _) = super::helpers::chain_map(2);
        let (graph, report) = super::helpers::build_default(&map);
        // ceil(11.12 / 2) = 6 intervals → 7 cells
        assert_eq!(graph.cell_count(), 7);
        assert_eq!(graph.lane_count(), 1);
        assert_eq!(report.ways_built, 1);
        assert_eq!(report.connectors, 0);
    }

    #[test]
    fn lane_is_linked_both_ways() {
        let (map, _) = super::helpers::chain_map(2);
        let (graph, _) = super::helpers::build_default(&map);
        let lane = &graph.lanes()[0];
        for pair in lane.cells.windows(2) {
            assert_eq!(graph.neighbor(pair[0], Direction::Right), Some(pair[1]));
            assert_eq!(graph.neighbor(pair[1], Direction::Left), Some(pair[0]));
        }
        let last = *lane.cells.last().unwrap();
        assert_eq!(graph.neighbor(last, Direction::Right), None, "one-way end is a dead end");
    }

    #[test]
    fn merge_drops_shared_endpoint() {
        let (map, _) = super::helpers::chain_map(3);
        let (graph, report) = super::helpers::build_default(&map);
        assert_eq!(report.merged_cells, 1);
        assert_eq!(graph.cell_count(), 13);

        let lane = &graph.lanes()[0];
        let mut ids = lane.cells.clone();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), lane.cells.len(), "lane holds duplicate ids");

        // Every cell but the last has a forward neighbour.
        for &c in &lane.cells[..lane.cells.len() - 1] {
            assert!(graph.neighbor(c, Direction::Right).is_some(), "{c} has no forward link");
        }
        // The merged cell is referenced back by its new successor.
        let merged = lane.cells[6];
        let after = lane.cells[7];
        assert_eq!(graph.neighbor(after, Direction::Left), Some(merged));
    }

    #[test]
    fn ids_are_dense() {
        let (map, _) = super::helpers::chain_map(4);
        let (graph, _) = super::helpers::build_default(&map);
        for (i, cell) in graph.cells().iter().enumerate() {
            assert_eq!(cell.id, CellId(i as u32));
        }
    }

    #[test]
    fn interior_cells_are_plain_road() {
        let (map, _) = super::helpers::chain_map(2);
        let (graph, _) = super::helpers::build_default(&map);
        assert!(graph.cells().iter().all(|c| c.kind == CellKind::Road));
    }

    #[test]
    fn speed_conversion() {
        let cfg = BuildConfig::default(); // 2 m cells, 1 s ticks
        assert_eq!(cfg.speed_cells_per_tick(36.0), 5);
        assert_eq!(cfg.speed_cells_per_tick(50.0), 6);
        assert_eq!(cfg.speed_cells_per_tick(7.2), 1);
        assert_eq!(cfg.speed_cells_per_tick(1.0), 1);
        assert_eq!(cfg.speed_cells_per_tick(0.0), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = BuildConfig { cell_length_m: 0.0, ..BuildConfig::default() };
        assert!(crate::GraphBuilder::new(cfg).is_err());
    }
}

// ── Bad input data ────────────────────────────────────────────────────────────

#[cfg(test)]
mod skipping {
    use cs_core::{RawNodeId, WayId};
    use crate::{RawMap, RawWay};

    #[test]
    fn missing_node_is_skipped() {
        let mut map = RawMap::new();
        let a = map.add_node(1, 0.0, 0.0);
        let b = map.add_node(2, 0.0, 0.0001);
        map.add_way(RawWay::new(WayId(1), vec![a, RawNodeId(99), b]).one_way(true));
        let (graph, report) = super::helpers::build_default(&map);
        assert_eq!(report.missing_nodes, 1);
        assert_eq!(report.ways_built, 1);
        assert_eq!(graph.cell_count(), 7);
    }

    #[test]
    fn way_without_two_nodes_is_skipped() {
        let mut map = RawMap::new();
        let a = map.add_node(1, 0.0, 0.0);
        map.add_way(RawWay::new(WayId(1), vec![a, RawNodeId(42)]));
        let (graph, report) = super::helpers::build_default(&map);
        assert_eq!(report.ways_skipped, 1);
        assert_eq!(report.ways_built, 0);
        assert!(graph.is_empty());
    }

    #[test]
    fn zero_length_segment_is_skipped() {
        let mut map = RawMap::new();
        let a = map.add_node(1, 0.0, 0.0);
        let dup = map.add_node(2, 0.0, 0.0);
        let b = map.add_node(3, 0.0, 0.0001);
        map.add_way(RawWay::new(WayId(1), vec![a, dup, b]).one_way(true));
        let (graph, report) = super::helpers::build_default(&map);
        assert_eq!(report.degenerate_segments, 1);
        assert_eq!(graph.cell_count(), 7);
    }
}

// ── Lanes, two-way expansion, signals ─────────────────────────────────────────

#[cfg(test)]
mod lanes {
    use std::collections::BTreeMap;

    use cs_core::{Direction, WayId};
    use crate::{BuildConfig, CellKind, Phase, RawMap, RawWay, SignalPlan, build};

    #[test]
    fn parallel_lanes_link_top_bottom() {
        let mut map = RawMap::new();
        let a = map.add_node(1, 0.0, 0.0);
        let b = map.add_node(2, 0.0, 0.0001);
        map.add_way(RawWay::new(WayId(1), vec![a, b]).one_way(true).lanes(2));
        let (graph, _) = super::helpers::build_default(&map);

        assert_eq!(graph.lane_count(), 2);
        let (l0, l1) = (&graph.lanes()[0], &graph.lanes()[1]);
        assert_eq!(l0.index, 0);
        assert_eq!(l1.index, 1);
        for (&lower, &upper) in l0.cells.iter().zip(&l1.cells) {
            assert_eq!(graph.neighbor(lower, Direction::Top), Some(upper));
            assert_eq!(graph.neighbor(upper, Direction::Bottom), Some(lower));
            assert_eq!(graph.neighbor(lower, Direction::Bottom), None);
        }
    }

    #[test]
    fn zero_lanes_means_one() {
        let mut map = RawMap::new();
        let a = map.add_node(1, 0.0, 0.0);
        let b = map.add_node(2, 0.0, 0.0001);
        map.add_way(RawWay::new(WayId(1), vec![a, b]).one_way(true).lanes(0));
        let (graph, _) = super::helpers::build_default(&map);
        assert_eq!(graph.lane_count(), 1);
    }

    #[test]
    fn two_way_builds_reversed_lane() {
        let mut map = RawMap::new();
        let a = map.add_node(1, 0.0, 0.0);
        let b = map.add_node(2, 0.0, 0.0001);
        map.add_way(RawWay::new(WayId(1), vec![a, b]));
        let (graph, _) = super::helpers::build_default(&map);

        let lanes = graph.lanes();
        assert_eq!(lanes.len(), 2);
        assert!(!lanes[0].reversed);
        assert!(lanes[1].reversed);

        let fwd_first = graph.cell(lanes[0].cells[0]).unwrap();
        let rev_last = graph.cell(*lanes[1].cells.last().unwrap()).unwrap();
        assert_eq!(fwd_first.pos, rev_last.pos);
        assert_eq!(fwd_first.source, a);
        assert_eq!(rev_last.source, a);
    }

    #[test]
    fn signal_nodes_become_lights() {
        let mut map = RawMap::new();
        let a = map.add_node(1, 0.0, 0.0);
        let b = map.add_signal(2, 0.0, 0.0001);
        map.add_way(RawWay::new(WayId(1), vec![a, b]).one_way(true));

        let plan = SignalPlan::new(Phase::Red, 5, 7);
        let mut overrides = BTreeMap::new();
        overrides.insert(b, plan);
        let cfg = BuildConfig { signal_overrides: overrides, ..BuildConfig::default() };
        let (graph, _) = build(&map, cfg).unwrap();

        let last = *graph.lanes()[0].cells.last().unwrap();
        assert_eq!(graph.cell(last).unwrap().kind, CellKind::TrafficLight { plan });
        let lights = graph.cells().iter().filter(|c| c.signal_plan().is_some()).count();
        assert_eq!(lights, 1);
    }
}

// ── Connector synthesis ───────────────────────────────────────────────────────

#[cfg(test)]
mod connectors {
    use cs_core::{Direction, WayId};
    use crate::{BuildConfig, RawMap, RawWay, build};

    /// Two one-way ways meeting head to tail at node 2.
    fn junction_map() -> RawMap {
        let mut map = RawMap::new();
        let a = map.add_node(1, 0.0, 0.0);
        let b = map.add_node(2, 0.0, 0.0001);
        let c = map.add_node(3, 0.0001, 0.0001);
        map.add_way(RawWay::new(WayId(1), vec![a, b]).one_way(true));
        map.add_way(RawWay::new(WayId(2), vec![b, c]).one_way(true));
        map
    }

    #[test]
    fn open_ends_are_bridged() {
        let (graph, report) = super::helpers::build_default(&junction_map());
        assert_eq!(report.connectors, 2);

        let first_lane = &graph.lanes()[0];
        let second_lane = &graph.lanes()[1];
        let end = *first_lane.cells.last().unwrap();
        let start = second_lane.cells[0];

        let forward = graph.neighbor(end, Direction::Right).unwrap();
        let conn = graph.connector(forward).unwrap();
        assert_eq!(conn.fan_out, Direction::Right);
        assert_eq!(conn.candidates, vec![start]);
        assert_eq!(conn.resolved, start);
        assert_eq!(graph.neighbor(forward, Direction::Right), Some(start));
        assert_eq!(graph.neighbor(forward, Direction::Left), Some(end));

        let backward = graph.neighbor(start, Direction::Left).unwrap();
        let conn = graph.connector(backward).unwrap();
        assert_eq!(conn.fan_out, Direction::Left);
        assert_eq!(conn.resolved, end);
    }

    #[test]
    fn two_way_dead_end_allows_u_turn() {
        let mut map = RawMap::new();
        let a = map.add_node(1, 0.0, 0.0);
        let b = map.add_node(2, 0.0, 0.0001);
        map.add_way(RawWay::new(WayId(1), vec![a, b]));
        let (graph, report) = super::helpers::build_default(&map);
        // Both ends of both lanes are bridged.
        assert_eq!(report.connectors, 4);

        let fwd_end = *graph.lanes()[0].cells.last().unwrap();
        let rev_start = graph.lanes()[1].cells[0];
        let conn = graph.neighbor(fwd_end, Direction::Right).unwrap();
        assert_eq!(graph.neighbor(conn, Direction::Right), Some(rev_start));
    }

    #[test]
    fn single_member_buckets_stay_open() {
        let (map, _) = super::helpers::chain_map(2);
        let (graph, report) = super::helpers::build_default(&map);
        assert_eq!(report.connectors, 0);
        assert!(graph.cells().iter().all(|c| !c.is_connector()));
    }

    #[test]
    fn same_seed_same_graph() {
        let mut map = RawMap::new();
        let centre = map.add_node(1, 0.0, 0.0);
        let spokes: Vec<_> = (0..4)
            .map(|i| {
                let (lat, lon) = [(0.0, 0.0001), (0.0001, 0.0), (0.0, -0.0001), (-0.0001, 0.0)][i];
                map.add_node(10 + i as i64, lat, lon)
            })
            .collect();
        for (i, &s) in spokes.iter().enumerate() {
            map.add_way(RawWay::new(WayId(i as i64 + 1), vec![centre, s]));
        }

        let cfg = BuildConfig { seed: 7, ..BuildConfig::default() };
        let (g1, r1) = build(&map, cfg.clone()).unwrap();
        let (g2, r2) = build(&map, cfg).unwrap();
        assert_eq!(r1, r2);
        assert_eq!(g1.cell_count(), g2.cell_count());
        for (a, b) in g1.cells().iter().zip(g2.cells()) {
            assert_eq!(a, b);
            assert_eq!(a.adjacency, b.adjacency);
            assert_eq!(a.kind, b.kind);
        }
    }

    #[test]
    fn resolved_is_always_a_candidate() {
        let mut map = RawMap::new();
        let centre = map.add_node(1, 0.0, 0.0);
        for i in 0..3 {
            let s = map.add_node(10 + i, 0.0001 * (i as f64 + 1.0), 0.0001);
            map.add_way(RawWay::new(WayId(i), vec![centre, s]));
        }
        let (graph, _) = super::helpers::build_default(&map);
        for cell in graph.cells() {
            if let Some(conn) = cell.connector() {
                assert!(conn.candidates.contains(&conn.resolved));
                assert_eq!(cell.neighbor(conn.fan_out), Some(conn.resolved));
            }
        }
    }
}

// ── Spatial lookup ────────────────────────────────────────────────────────────

#[cfg(test)]
mod spatial {
    use cs_core::GeoPoint;
    use crate::CellGraph;

    #[test]
    fn exact_and_nearest() {
        let (map, ids) = super::helpers::chain_map(2);
        let (graph, _) = super::helpers::build_default(&map);

        let at_b = graph.cell_at(GeoPoint::new(0.0, super::helpers::STEP)).unwrap();
        assert_eq!(graph.cell(at_b).unwrap().source, ids[1]);

        let near = graph.nearest_cell(GeoPoint::new(0.000001, 0.0)).unwrap();
        assert_eq!(graph.cell(near).unwrap().pos, GeoPoint::new(0.0, 0.0));
        assert!(graph.cell_at(GeoPoint::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn k_nearest_closest_first() {
        let (map, _) = super::helpers::chain_map(2);
        let (graph, _) = super::helpers::build_default(&map);
        let origin = GeoPoint::new(0.0, 0.0);

        let near = graph.k_nearest_cells(origin, 3);
        assert_eq!(near.len(), 3);
        assert_eq!(graph.cell(near[0]).unwrap().pos, origin);
        let d: Vec<f64> = near.iter().map(|&c| graph.cell(c).unwrap().pos.distance_m(origin)).collect();
        assert!(d.windows(2).all(|w| w[0] <= w[1]), "{d:?}");

        assert_eq!(graph.k_nearest_cells(origin, 100).len(), graph.cell_count());
        assert!(CellGraph::empty().k_nearest_cells(origin, 3).is_empty());
    }

    #[test]
    fn empty_graph_has_no_nearest() {
        let graph = CellGraph::empty();
        assert!(graph.nearest_cell(GeoPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn representative_is_lowest_anchor() {
        let (map, ids) = super::helpers::chain_map(3);
        let (graph, _) = super::helpers::build_default(&map);
        let cells = graph.cells_at(ids[1]);
        assert_eq!(cells.len(), 1);
        assert_eq!(graph.representative_cell(ids[1]), Some(cells[0]));
    }

    #[test]
    fn distance_is_symmetric() {
        let (map, _) = super::helpers::chain_map(2);
        let (graph, _) = super::helpers::build_default(&map);
        let a = graph.cells()[0].id;
        let b = graph.cells()[6].id;
        let ab = graph.compute_distance(a, b).unwrap();
        assert_eq!(ab, graph.compute_distance(b, a).unwrap());
        assert_eq!(graph.compute_distance(a, a).unwrap(), 0.0);
        assert!(graph.compute_distance(a, cs_core::CellId(999)).is_err());
    }
}

// ── Dijkstra & navigation ─────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use cs_core::{CellId, GeoPoint, RawNodeId, WayId};
    use crate::{JunctionGraph, NavigationService, RawMap, RawWay, RoadNavigator, Route};

    /// Five junctions; shortest 1 → 5 is 1-2-3-5 (300 m) against 1-4-5 (600 m).
    fn five_nodes() -> JunctionGraph {
        let mut g = JunctionGraph::new();
        for i in 1..=5 {
            g.add_vertex(RawNodeId(i), GeoPoint::new(0.0, i as f64 * 0.001));
        }
        g.add_edge(RawNodeId(1), RawNodeId(2), 100.0);
        g.add_edge(RawNodeId(2), RawNodeId(3), 100.0);
        g.add_edge(RawNodeId(3), RawNodeId(5), 100.0);
        g.add_edge(RawNodeId(1), RawNodeId(4), 500.0);
        g.add_edge(RawNodeId(4), RawNodeId(5), 100.0);
        g
    }

    #[test]
    fn known_shortest_path() {
        let g = five_nodes();
        let nav = RoadNavigator::new();
        let path = nav.path(&g, RawNodeId(1), RawNodeId(5)).unwrap();
        assert_eq!(path.nodes, vec![RawNodeId(1), RawNodeId(2), RawNodeId(3), RawNodeId(5)]);
        assert!((path.distance_m - 300.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_source_is_memoised() {
        let g = five_nodes();
        let nav = RoadNavigator::new();
        nav.path(&g, RawNodeId(1), RawNodeId(5)).unwrap();
        nav.path(&g, RawNodeId(1), RawNodeId(4)).unwrap();
        assert_eq!(nav.computations(), 1);
        assert_eq!(nav.cached_sources(), 1);

        nav.path(&g, RawNodeId(4), RawNodeId(2)).unwrap();
        assert_eq!(nav.computations(), 2);
        nav.clear_cache();
        assert_eq!(nav.cached_sources(), 0);
    }

    #[test]
    fn unknown_or_disconnected_is_none() {
        let mut g = five_nodes();
        g.add_vertex(RawNodeId(9), GeoPoint::new(1.0, 1.0));
        let nav = RoadNavigator::new();
        assert!(nav.path(&g, RawNodeId(1), RawNodeId(9)).is_none());
        assert!(nav.path(&g, RawNodeId(1), RawNodeId(77)).is_none());
    }

    #[test]
    fn segments_are_weighted_by_distance() {
        let mut g = JunctionGraph::new();
        let (a, b) = (GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.001));
        g.add_vertex(RawNodeId(1), a);
        g.add_vertex(RawNodeId(2), b);
        assert!(!g.add_segment(RawNodeId(1), RawNodeId(3)));
        assert!(g.add_segment(RawNodeId(1), RawNodeId(2)));
        assert_eq!(g.edge_count(), 1);

        let v = g.vertex_of(RawNodeId(1)).unwrap();
        assert_eq!(g.id_of(v), RawNodeId(1));
        let [(w, length)] = g.neighbors(v) else {
            panic!("expected one neighbour, got {:?}", g.neighbors(v));
        };
        assert_eq!(g.id_of(*w), RawNodeId(2));
        assert_eq!(*length, a.distance_m(b));

        let path = RoadNavigator::new().path(&g, RawNodeId(2), RawNodeId(1)).unwrap();
        assert_eq!(path.distance_m, a.distance_m(b));
    }

    #[test]
    fn junction_edges_from_ways() {
        let (map, ids) = super::helpers::chain_map(3);
        let (graph, _) = super::helpers::build_default(&map);
        let j = graph.junctions();
        assert_eq!(j.vertex_count(), 3);
        assert_eq!(j.edge_count(), 2);
        assert!(j.vertex_of(ids[2]).is_some());
    }

    #[test]
    fn route_over_cells_ends_at_destination() {
        let (map, ids) = super::helpers::chain_map(3);
        let (graph, _) = super::helpers::build_default(&map);
        let lane = &graph.lanes()[0];
        let source = lane.cells[0];
        let destination = *lane.cells.last().unwrap();

        let route = RoadNavigator::new().route(&graph, source, destination);
        assert!(route.is_reachable());
        assert_eq!(route.destination(), Some(destination));
        assert_eq!(route.cells[0], graph.representative_cell(ids[1]).unwrap());
        let expected = GeoPoint::new(0.0, 0.0001).distance_m(GeoPoint::new(0.0, 0.0002));
        assert!((route.distance_m.unwrap() - expected).abs() < 1e-3);
    }

    #[test]
    fn same_node_route_is_trivial() {
        let (map, _) = super::helpers::chain_map(2);
        let (graph, _) = super::helpers::build_default(&map);
        let lane = &graph.lanes()[0];
        let route = RoadNavigator::new().route(&graph, lane.cells[0], *lane.cells.last().unwrap());
        assert_eq!(route.cells, vec![*lane.cells.last().unwrap()]);
        assert_eq!(route.distance_m, Some(0.0));
    }

    #[test]
    fn disconnected_route_is_unreachable() {
        let mut map = RawMap::new();
        let a = map.add_node(1, 0.0, 0.0);
        let b = map.add_node(2, 0.0, 0.0001);
        let c = map.add_node(3, 1.0, 0.0);
        let d = map.add_node(4, 1.0, 0.0001);
        map.add_way(RawWay::new(WayId(1), vec![a, b]).one_way(true));
        map.add_way(RawWay::new(WayId(2), vec![c, d]).one_way(true));
        let (graph, _) = super::helpers::build_default(&map);

        let source = graph.lanes()[0].cells[0];
        let destination = *graph.lanes()[1].cells.last().unwrap();
        let route = RoadNavigator::new().route(&graph, source, destination);
        assert_eq!(route, Route::unreachable(destination));
        assert!(!route.is_reachable());
    }

    #[test]
    fn missing_cell_is_unreachable() {
        let (map, _) = super::helpers::chain_map(2);
        let (graph, _) = super::helpers::build_default(&map);
        let route = RoadNavigator::new().route(&graph, CellId(0), CellId(500));
        assert_eq!(route.cells, vec![CellId(500)]);
        assert_eq!(route.distance_m, None);
    }
}

// ── External planner adapter ──────────────────────────────────────────────────

#[cfg(test)]
mod external {
    use cs_core::GeoPoint;
    use crate::{NavigationService, NetworkError, NetworkResult, Step, StepNavigator};

    #[test]
    fn steps_snap_to_cells() {
        let (map, _) = super::helpers::chain_map(2);
        let (graph, _) = super::helpers::build_default(&map);
        let lane = graph.lanes()[0].cells.clone();
        let destination = *lane.last().unwrap();

        let nav = StepNavigator::new(|_from: GeoPoint, _to: GeoPoint| -> NetworkResult<Vec<Step>> {
            Ok(vec![
                Step { lon: 0.0, lat: 0.0, delta_secs: 0.0, distance_m: 0.0 },
                // Off-grid point, snapped to the nearest cell.
                Step { lon: 0.00005, lat: 0.000001, delta_secs: 1.0, distance_m: 5.5 },
                Step { lon: 0.0001, lat: 0.0, delta_secs: 1.0, distance_m: 5.6 },
            ])
        });
        let route = nav.route(&graph, lane[0], destination);
        assert!(route.is_reachable());
        assert_eq!(route.cells.first(), Some(&lane[0]));
        assert_eq!(route.destination(), Some(destination));
        assert_eq!(route.cells.len(), 3);
        assert!((route.distance_m.unwrap() - 11.1).abs() < 1e-9);
    }

    #[test]
    fn provider_error_is_unreachable() {
        let (map, _) = super::helpers::chain_map(2);
        let (graph, _) = super::helpers::build_default(&map);
        let nav = StepNavigator::new(|_: GeoPoint, _: GeoPoint| -> NetworkResult<Vec<Step>> {
            Err(NetworkError::Provider("timeout".into()))
        });
        let dest = graph.lanes()[0].cells[3];
        let route = nav.route(&graph, graph.lanes()[0].cells[0], dest);
        assert!(!route.is_reachable());
        assert_eq!(route.cells, vec![dest]);
    }
}
