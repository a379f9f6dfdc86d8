//! grid — runnable demo for the cellsim traffic simulator.
//!
//! Builds a 5 × 5 downtown grid with one traffic light, fills it with
//! randomly routed vehicles and streams every event to CSV on a second
//! thread.
//!
//! ```text
//! RUST_LOG=info cargo run --release -p grid -- [config.json]
//! ```
//!
//! The optional JSON file holds a partial `SimConfig`; missing fields keep
//! their defaults.

mod network;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};

use cs_core::{SimConfig, Tick};
use cs_network::{BuildConfig, RoadNavigator, build};
use cs_output::{CsvWriter, record};
use cs_sim::{SimBuilder, SimObserver, StepStats};

use network::{SIZE, build_grid};

// ── Constants ─────────────────────────────────────────────────────────────────

const VEHICLE_COUNT:  usize = 150;
const TOTAL_TICKS:    u64   = 600; // 10 minutes at 1 s per tick
const PROGRESS_EVERY: u64   = 100;
const OUTPUT_DIR:     &str  = "output/grid";

// ── Progress printer ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Progress {
    arrived:   usize,
    conflicts: usize,
    stalled:   usize,
}

impl SimObserver for Progress {
    fn on_tick_end(&mut self, tick: Tick, stats: &StepStats) {
        self.arrived += stats.arrived;
        self.conflicts += stats.conflicts;
        self.stalled += stats.stalled;
        if (tick.0 + 1) % PROGRESS_EVERY == 0 {
            println!(
                "  {:>6}  on road {:>4}  moved {:>4}  arrived so far {:>4}",
                tick, stats.vehicles, stats.moved, self.arrived
            );
        }
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

fn load_config(path: Option<PathBuf>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig {
            total_ticks: TOTAL_TICKS,
            vehicle_count: VEHICLE_COUNT,
            ..SimConfig::default()
        });
    };
    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let config: SimConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let config = load_config(std::env::args().nth(1).map(PathBuf::from))?;
    println!("=== grid — cellsim traffic demo ===");
    println!(
        "Grid: {SIZE} × {SIZE}  |  Vehicles: {}  |  Ticks: {}  |  Seed: {}",
        config.vehicle_count, config.total_ticks, config.seed
    );
    println!();

    // 1. Road network.
    let (map, light) = build_grid();
    let build_config = BuildConfig {
        tick_duration_secs: config.tick_duration_secs,
        seed: config.seed,
        ..BuildConfig::default()
    };
    let t0 = Instant::now();
    let (graph, report) = build(&map, build_config)?;
    println!(
        "Cell graph: {} cells in {} lanes, {} connectors ({} ways, {} skipped) in {:.3} s",
        report.cells,
        report.lanes,
        report.connectors,
        report.ways_built,
        report.ways_skipped,
        t0.elapsed().as_secs_f64()
    );
    log::info!("traffic light at raw node {}", light);

    // 2. Sim with random origin/destination pairs.
    let mut sim = SimBuilder::new(config, graph, RoadNavigator::new()).build()?;
    let placed = sim.populate()?;
    println!("Placed {placed} vehicles, {} traffic lights", sim.signals().len());

    // 3. Event stream → CSV on its own thread.
    let dir = Path::new(OUTPUT_DIR);
    let writer = CsvWriter::new(dir)?;
    let events = sim.subscribe();
    let recorder = std::thread::spawn(move || record(events, writer));

    // 4. Run.
    let mut progress = Progress::default();
    let t0 = Instant::now();
    sim.run(&mut progress)?;
    let elapsed = t0.elapsed();

    recorder
        .join()
        .map_err(|_| anyhow!("recorder thread panicked"))?
        .context("writing CSV output")?;

    // 5. Summary.
    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  arrived             : {}", progress.arrived);
    println!("  still on the road   : {}", sim.vehicle_count());
    println!("  commit conflicts    : {}", progress.conflicts);
    println!("  stall reports       : {}", progress.stalled);
    println!("  routes computed     : {}", sim.navigator.computations());
    if sim.dropped_events() > 0 {
        println!("  events dropped      : {}", sim.dropped_events());
    }
    println!("  output              : {}", dir.display());

    Ok(())
}
