//! Simulation observer trait for progress reporting and data collection.

use cs_core::Tick;

use crate::{SimEvent, StepStats};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Observers run on the simulation
/// thread; use [`Sim::subscribe`][crate::Sim::subscribe] to consume events
/// elsewhere.
///
/// # Example
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, stats: &StepStats) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: {} moved, {} arrived", stats.moved, stats.arrived);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called for every event, in emission order.
    fn on_event(&mut self, _event: &SimEvent) {}

    /// Called after the tick has been committed.
    fn on_tick_end(&mut self, _tick: Tick, _stats: &StepStats) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Collects every event in memory.  Handy in tests.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<SimEvent>,
}

impl SimObserver for EventLog {
    fn on_event(&mut self, event: &SimEvent) {
        self.events.push(event.clone());
    }
}
