//! The `OutputWriter` trait implemented by backend writers.

use crate::{MoveRow, OutputResult, StepRow};

/// Sink for telemetry rows.
///
/// Errors are surfaced per call; [`SimOutputObserver`][crate::SimOutputObserver]
/// keeps the first one for [`take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of vehicle moves.
    fn write_moves(&mut self, rows: &[MoveRow]) -> OutputResult<()>;

    /// Write one step summary row.
    fn write_step(&mut self, row: &StepRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
