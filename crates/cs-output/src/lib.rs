//! `cs-output` — CSV telemetry for the cellsim traffic simulator.
//!
//! | Backend | Files created                                  |
//! |---------|------------------------------------------------|
//! | CSV     | `vehicle_moves.csv`, `step_summaries.csv`      |
//!
//! Rows come from the simulation's event stream, either in-process through
//! [`SimOutputObserver`] (a `cs_sim::SimObserver`) or from a subscribed
//! channel on another thread through [`record`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use cs_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod recorder;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use recorder::record;
pub use row::{MoveRow, StepRow};
pub use writer::OutputWriter;
