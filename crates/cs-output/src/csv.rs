//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `vehicle_moves.csv`
//! - `step_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{MoveRow, OutputResult, StepRow};

pub const MOVES_FILE: &str = "vehicle_moves.csv";
pub const STEPS_FILE: &str = "step_summaries.csv";

/// Writes simulation telemetry to two CSV files.
pub struct CsvWriter {
    moves:    Writer<File>,
    steps:    Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` (creating `dir` if needed) and write
    /// the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut moves = Writer::from_path(dir.join(MOVES_FILE))?;
        moves.write_record(["tick", "vehicle_id", "from_cell", "to_cell", "speed"])?;

        let mut steps = Writer::from_path(dir.join(STEPS_FILE))?;
        steps.write_record([
            "tick",
            "moved",
            "stationary",
            "conflicts",
            "stalled",
            "arrived",
            "vehicles",
            "elapsed_us",
        ])?;

        Ok(Self { moves, steps, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_moves(&mut self, rows: &[MoveRow]) -> OutputResult<()> {
        for row in rows {
            self.moves.write_record(&[
                row.tick.to_string(),
                row.vehicle_id.to_string(),
                row.from_cell.to_string(),
                row.to_cell.to_string(),
                row.speed.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_step(&mut self, row: &StepRow) -> OutputResult<()> {
        self.steps.write_record(&[
            row.tick.to_string(),
            row.moved.to_string(),
            row.stationary.to_string(),
            row.conflicts.to_string(),
            row.stalled.to_string(),
            row.arrived.to_string(),
            row.vehicles.to_string(),
            row.elapsed_us.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.moves.flush()?;
        self.steps.flush()?;
        Ok(())
    }
}
