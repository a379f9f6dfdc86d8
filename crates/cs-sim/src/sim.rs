//! The `Sim` struct and its tick loop.

use std::time::Instant;

use crossbeam_channel::Receiver;

use cs_core::{CellId, SimClock, SimConfig, SimRng, SpawnPolicy, Tick, VehicleId, VehicleRng};
use cs_mobility::{
    MobilityResult, Move, MoveContext, MoveParams, OccupancyTable, SignalTable, Vehicle, plan_move,
};
use cs_network::{CellGraph, NavigationService};

use crate::{EventPublisher, SimError, SimEvent, SimObserver, SimResult, StepStats};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<N>` holds all simulation state and drives the two-phase tick:
///
/// 1. **Compute** (optionally parallel with the `parallel` feature): every
///    vehicle plans its move against the occupancy and signal phases left by
///    the previous tick.  Each vehicle draws from its own
///    `VehicleRng::for_tick`, so the outcome does not depend on scheduling.
/// 2. **Commit** (sequential, ascending `VehicleId`): moves are applied in
///    order.  A vehicle whose target cell was claimed earlier in the same
///    commit stays where it is with speed 0.  Arrived vehicles are removed
///    and the traffic lights advance.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<N: NavigationService> {
    pub config: SimConfig,
    pub clock:  SimClock,

    /// Road graph.  Read-only once the simulation exists.
    pub graph: CellGraph,

    /// Route provider queried at spawn time.
    pub navigator: N,

    pub(crate) occupancy: OccupancyTable,
    pub(crate) signals:   SignalTable,
    pub(crate) params:    MoveParams,

    /// Spawn placement draws.
    pub(crate) rng:          SimRng,
    pub(crate) next_vehicle: u32,

    pub(crate) publisher: Option<EventPublisher>,
    /// Events not yet handed to an observer.
    pub(crate) pending:   Vec<SimEvent>,
    pub(crate) started:   bool,

    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,
}

impl<N: NavigationService> Sim<N> {
    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    #[inline]
    pub fn occupancy(&self) -> &OccupancyTable {
        &self.occupancy
    }

    #[inline]
    pub fn signals(&self) -> &SignalTable {
        &self.signals
    }

    /// Vehicles currently on the road.
    #[inline]
    pub fn vehicle_count(&self) -> usize {
        self.occupancy.len()
    }

    /// Open a new event stream.  Replaces any earlier subscription.
    ///
    /// Capacity comes from `config.event_buffer`.
    pub fn subscribe(&mut self) -> Receiver<SimEvent> {
        let (publisher, rx) = EventPublisher::channel(self.config.event_buffer);
        self.publisher = Some(publisher);
        rx
    }

    /// Events dropped because the bounded event channel was full.
    pub fn dropped_events(&self) -> u64 {
        self.publisher.as_ref().map_or(0, EventPublisher::dropped)
    }

    // ── Population ────────────────────────────────────────────────────────

    /// Spawn `config.vehicle_count` vehicles according to `config.spawn`.
    ///
    /// Returns how many were actually placed: random spawning stops early
    /// when no free road cell is left, and fixed pairs with an unusable
    /// origin are skipped.
    pub fn populate(&mut self) -> SimResult<usize> {
        let mut placed = 0;
        match self.config.spawn.clone() {
            SpawnPolicy::RandomPairs => {
                let roads: Vec<CellId> = self.graph.cells().iter().filter(|c| c.is_road()).map(|c| c.id).collect();
                let mut origins: Vec<CellId> =
                    roads.iter().copied().filter(|&c| self.occupancy.is_free(c)).collect();

                let wanted = self.config.vehicle_count.min(origins.len());
                if wanted < self.config.vehicle_count {
                    log::warn!(
                        "only {} free road cells for {} vehicles",
                        origins.len(),
                        self.config.vehicle_count
                    );
                }
                for i in 0..wanted {
                    let j = self.rng.gen_range(i..origins.len());
                    origins.swap(i, j);
                    let origin = origins[i];
                    let destination = self.random_destination(&roads, origin);
                    self.spawn(origin, destination)?;
                    placed += 1;
                }
            }
            SpawnPolicy::Fixed(pairs) => {
                for (origin, destination) in pairs {
                    let usable = self.graph.cell(origin).is_some_and(|c| c.is_road())
                        && self.occupancy.is_free(origin);
                    if !usable {
                        log::warn!("spawn origin {} is not a free road cell, skipping", origin);
                        continue;
                    }
                    self.spawn(origin, destination)?;
                    placed += 1;
                }
            }
        }
        log::info!("populated {} vehicles", placed);
        Ok(placed)
    }

    /// Put one vehicle on `origin`, heading for `destination`.
    ///
    /// With `config.use_routes` the navigator is asked for a route first; an
    /// unreachable destination leaves the vehicle unrouted.
    pub fn spawn(&mut self, origin: CellId, destination: CellId) -> SimResult<VehicleId> {
        self.graph.try_cell(origin)?;

        let id = VehicleId(self.next_vehicle);
        if !id.is_valid() {
            return Err(SimError::VehicleIdsExhausted(self.next_vehicle as usize));
        }

        let mut vehicle = Vehicle::new(id, self.config.vehicle, destination);
        if self.config.use_routes {
            let route = self.navigator.route(&self.graph, origin, destination);
            if route.is_reachable() {
                vehicle.set_route(route.cells);
            } else {
                log::warn!("{}: no route from {} to {}, driving unrouted", id, origin, destination);
            }
        }
        let routed = vehicle.has_route();

        self.occupancy.occupy(origin, vehicle)?;
        self.next_vehicle += 1;
        self.emit(SimEvent::VehicleCreated {
            tick: self.now(),
            vehicle: id,
            cell: origin,
            destination,
            routed,
        });
        Ok(id)
    }

    /// Take a vehicle off the road.
    pub fn remove(&mut self, vehicle: VehicleId) -> Option<CellId> {
        self.occupancy.release(vehicle).map(|(cell, _)| cell)
    }

    // ── Public run API ────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.start(observer);
        let started = Instant::now();
        while self.now() < self.config.end_tick() {
            self.step(observer);
        }
        self.emit(SimEvent::Finished { tick: self.now(), vehicles: self.vehicle_count() });
        self.flush(observer);
        observer.on_sim_end(self.now());

        log::info!(
            "simulation finished at {} with {} vehicles on the road ({:.2?} wall time)",
            self.now(),
            self.vehicle_count(),
            started.elapsed()
        );
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        self.start(observer);
        for _ in 0..n {
            self.step(observer);
        }
        Ok(())
    }

    /// Process the current tick and advance the clock.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> StepStats {
        let now = self.now();
        observer.on_tick_start(now);
        self.flush(observer);
        let stats = self.process_tick(now);
        self.flush(observer);
        observer.on_tick_end(now, &stats);
        self.clock.advance();
        stats
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) -> StepStats {
        let started = Instant::now();

        // ── Phase 1: compute (produce) ────────────────────────────────────
        let outcomes = self.compute_moves(now);

        // ── Phase 2: commit (consume) ─────────────────────────────────────
        //
        // Outcomes are in ascending VehicleId order (BTreeMap iteration).
        let mut stats = StepStats { tick: now, ..StepStats::default() };
        let mut arrivals: Vec<(VehicleId, CellId)> = Vec::new();

        for (vehicle, outcome) in outcomes {
            let mv = match outcome {
                Ok(mv) => mv,
                Err(err) => {
                    log::error!("{}: move failed at {}: {}", vehicle, now, err);
                    if let Some(v) = self.occupancy.vehicle_mut(vehicle) {
                        v.current_speed = 0;
                    }
                    stats.failed += 1;
                    stats.stationary += 1;
                    continue;
                }
            };

            if let Err(err) = self.occupancy.relocate(mv.vehicle, mv.to) {
                log::debug!("{}: {} claimed earlier this tick ({})", vehicle, mv.to, err);
                let limit = self.params.stall_limit_ticks;
                let stall = self
                    .occupancy
                    .vehicle_mut(vehicle)
                    .and_then(|v| v.hold(limit).then_some(v.stalled_ticks));
                if let Some(stalled_ticks) = stall {
                    self.report_stall(&mut stats, now, vehicle, mv.from, stalled_ticks);
                }
                stats.conflicts += 1;
                stats.stationary += 1;
                continue;
            }
            if let Some(v) = self.occupancy.vehicle_mut(vehicle) {
                v.apply(&mv);
            }

            if mv.is_stationary() {
                stats.stationary += 1;
            } else {
                stats.moved += 1;
                self.emit(SimEvent::VehicleMoved {
                    tick: now,
                    vehicle,
                    from: mv.from,
                    to: mv.to,
                    speed: mv.speed,
                });
            }
            if mv.stalled {
                self.report_stall(&mut stats, now, vehicle, mv.to, mv.stalled_ticks);
            }
            if mv.arrived {
                stats.arrived += 1;
                arrivals.push((vehicle, mv.to));
            }
        }

        for (vehicle, cell) in arrivals {
            self.emit(SimEvent::VehicleArrived { tick: now, vehicle, cell });
            if self.config.remove_on_arrival {
                self.occupancy.release(vehicle);
            }
        }

        // ── Phase 3: signals ──────────────────────────────────────────────
        self.signals.update(now.0 + 1);

        stats.vehicles = self.occupancy.len();
        let elapsed = started.elapsed();
        log::debug!(
            "{}: {} moved, {} stationary, {} arrived, {} conflicts ({:.2?})",
            now,
            stats.moved,
            stats.stationary,
            stats.arrived,
            stats.conflicts,
            elapsed
        );
        self.emit(SimEvent::StepCompleted { step: now, elapsed, stats });
        stats
    }

    /// Plan every vehicle's move against the current state.
    ///
    /// With the `parallel` Cargo feature the plans are computed on Rayon's
    /// thread pool (or the pool sized by `config.num_threads`).
    fn compute_moves(&self, now: Tick) -> Vec<(VehicleId, MobilityResult<Move>)> {
        let ctx = MoveContext::new(&self.graph, &self.occupancy, &self.signals, self.params);
        let vehicles: Vec<&Vehicle> = self.occupancy.iter().map(|(_, v)| v).collect();
        let seed = self.config.seed;

        let plan = |v: &&Vehicle| {
            let mut rng = VehicleRng::for_tick(seed, v.id, now);
            (v.id, plan_move(&ctx, v, &mut rng))
        };

        #[cfg(not(feature = "parallel"))]
        {
            vehicles.iter().map(plan).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let run = || -> Vec<(VehicleId, MobilityResult<Move>)> { vehicles.par_iter().map(plan).collect() };
            match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        }
    }

    // ── Events ────────────────────────────────────────────────────────────

    fn start<O: SimObserver>(&mut self, observer: &mut O) {
        if !self.started {
            self.started = true;
            log::info!(
                "simulation starting at {} with {} vehicles, {} cells, {} lights",
                self.now(),
                self.vehicle_count(),
                self.graph.cell_count(),
                self.signals.len()
            );
            self.emit(SimEvent::Started { tick: self.now(), vehicles: self.vehicle_count() });
        }
        self.flush(observer);
    }

    fn report_stall(
        &mut self,
        stats: &mut StepStats,
        now: Tick,
        vehicle: VehicleId,
        cell: CellId,
        stalled_ticks: u32,
    ) {
        log::warn!("{} stalled at {} for {} ticks", vehicle, cell, stalled_ticks);
        stats.stalled += 1;
        self.emit(SimEvent::VehicleStalled { tick: now, vehicle, cell, stalled_ticks });
    }

    fn emit(&mut self, event: SimEvent) {
        if let Some(publisher) = &mut self.publisher {
            publisher.publish(event.clone());
        }
        self.pending.push(event);
    }

    fn flush<O: SimObserver>(&mut self, observer: &mut O) {
        for event in self.pending.drain(..) {
            observer.on_event(&event);
        }
    }

    fn random_destination(&mut self, roads: &[CellId], origin: CellId) -> CellId {
        let Some(&pick) = self.rng.choose(roads) else {
            return origin;
        };
        if pick != origin || roads.len() < 2 {
            return pick;
        }
        // Never send a vehicle to the cell it starts on.
        let i = roads.iter().position(|&c| c == pick).unwrap_or(0);
        roads[(i + 1) % roads.len()]
    }
}
