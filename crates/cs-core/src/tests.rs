//! Unit tests for cs-core primitives.

#[cfg(test)]
mod ids {
    use crate::{CellId, RawNodeId, VehicleId};

    #[test]
    fn index_roundtrip() {
        let id = CellId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(CellId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinel_is_default() {
        assert_eq!(CellId::default(), CellId::INVALID);
        assert!(!VehicleId::INVALID.is_valid());
        assert!(VehicleId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(CellId(7).to_string(), "CellId(7)");
        assert_eq!(RawNodeId(-3).to_string(), "RawNodeId(-3)");
    }
}

#[cfg(test)]
mod geo {
    use crate::GeoPoint;

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(50.0491893, 19.9041208);
        assert_eq!(p.distance_m(p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(50.0491893, 19.9041208);
        let b = GeoPoint::new(50.0893397, 19.9743985);
        assert_eq!(a.distance_m(b), b.distance_m(a));
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111 km
        let a = GeoPoint::new(30.0, -88.0);
        let b = GeoPoint::new(31.0, -88.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.001, 0.002);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        let mid = a.lerp(b, 0.5);
        assert!((mid.lat - 0.0005).abs() < 1e-12);
        assert!((mid.lon - 0.001).abs() < 1e-12);
    }
}

#[cfg(test)]
mod direction {
    use crate::Direction;

    #[test]
    fn opposite_is_involution() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
        }
    }

    #[test]
    fn candidates_straight_first() {
        assert_eq!(
            Direction::Right.candidates(),
            [Direction::Right, Direction::Top, Direction::Bottom]
        );
        assert_eq!(
            Direction::Top.candidates(),
            [Direction::Top, Direction::Right, Direction::Left]
        );
    }

    #[test]
    fn slot_indices_are_distinct() {
        let mut seen = [false; 4];
        for d in Direction::ALL {
            assert!(!seen[d.index()]);
            seen[d.index()] = true;
        }
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
        assert_eq!(Tick(3).since(Tick(5)), 0);
    }

    #[test]
    fn clock_elapsed() {
        let mut clock = SimClock::new(0.5);
        assert_eq!(clock.elapsed_secs(), 0.0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.current_tick, Tick(2));
        assert_eq!(clock.elapsed_secs(), 1.0);
        assert_eq!(clock.ticks_for_secs(1.2), 3);
    }
}

#[cfg(test)]
mod rng {
    use crate::{SimRng, Tick, VehicleId, VehicleRng};

    #[test]
    fn same_vehicle_same_tick_is_reproducible() {
        let mut a = VehicleRng::for_tick(7, VehicleId(3), Tick(11));
        let mut b = VehicleRng::for_tick(7, VehicleId(3), Tick(11));
        for _ in 0..50 {
            assert_eq!(a.gen_range(0u32..1000), b.gen_range(0u32..1000));
        }
    }

    #[test]
    fn ticks_and_vehicles_diverge() {
        let draw = |v, t| VehicleRng::for_tick(1, VehicleId(v), Tick(t)).gen_range(0u64..u64::MAX);
        assert_ne!(draw(0, 0), draw(0, 1));
        assert_ne!(draw(0, 0), draw(1, 0));
        assert_ne!(draw(1, 2), draw(2, 1));
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = VehicleRng::for_tick(0, VehicleId(0), Tick(0));
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }

    #[test]
    fn sim_rng_choose_empty() {
        let mut rng = SimRng::new(5);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }
}

#[cfg(test)]
mod config {
    use crate::SimConfig;

    #[test]
    fn default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_probability() {
        let cfg = SimConfig { lane_change_probability: 1.5, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_tick_duration() {
        let cfg = SimConfig { tick_duration_secs: 0.0, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
