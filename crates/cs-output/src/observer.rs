//! `SimOutputObserver<W>`: event stream to `OutputWriter` rows.

use cs_core::Tick;
use cs_sim::{SimEvent, SimObserver};

use crate::row::{MoveRow, StepRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes vehicle moves and step summaries to any
/// [`OutputWriter`] backend.
///
/// Moves are buffered until the step's `StepCompleted` event and written as
/// one batch.  Errors from the writer are stored internally because
/// `SimObserver` methods have no return value; check them with
/// [`take_error`][Self::take_error] once the run is over.
///
/// The same type consumes a subscribed channel through
/// [`record`][crate::record].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    moves:      Vec<MoveRow>,
    steps:      u64,
    rows:       u64,
    closed:     bool,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, moves: Vec::new(), steps: 0, rows: 0, closed: false, last_error: None }
    }

    /// Feed one event.
    pub fn handle(&mut self, event: &SimEvent) {
        match event {
            SimEvent::VehicleMoved { tick, vehicle, from, to, speed } => {
                self.moves.push(MoveRow {
                    tick:       tick.0,
                    vehicle_id: vehicle.0,
                    from_cell:  from.0,
                    to_cell:    to.0,
                    speed:      *speed,
                });
            }
            SimEvent::StepCompleted { elapsed, stats, .. } => {
                let result = self.write_step(&StepRow::from_stats(stats, elapsed.as_micros() as u64));
                self.store_err(result);
            }
            SimEvent::Finished { .. } => self.finish(),
            _ => {}
        }
    }

    /// Flush buffered moves and close the writer.  Idempotent.
    pub fn finish(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let result = self.flush_moves();
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }

    /// Step rows written so far.
    pub fn steps_written(&self) -> u64 {
        self.steps
    }

    /// Move rows written so far.
    pub fn moves_written(&self) -> u64 {
        self.rows
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn write_step(&mut self, row: &StepRow) -> OutputResult<()> {
        self.flush_moves()?;
        self.writer.write_step(row)?;
        self.steps += 1;
        Ok(())
    }

    fn flush_moves(&mut self) -> OutputResult<()> {
        if self.moves.is_empty() {
            return Ok(());
        }
        let rows = std::mem::take(&mut self.moves);
        self.writer.write_moves(&rows)?;
        self.rows += rows.len() as u64;
        Ok(())
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_event(&mut self, event: &SimEvent) {
        self.handle(event);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        self.finish();
    }
}
