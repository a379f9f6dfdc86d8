//! Draining a subscribed event channel into a writer.

use crossbeam_channel::Receiver;

use cs_sim::SimEvent;

use crate::{OutputResult, OutputWriter, SimOutputObserver};

/// Consume `events` until `Finished` arrives or the simulation hangs up,
/// writing rows through `writer`.
///
/// Meant to run on its own thread:
///
/// ```rust,ignore
/// let rx = sim.subscribe();
/// let handle = std::thread::spawn(move || cs_output::record(rx, CsvWriter::new(dir)?));
/// sim.run(&mut NoopObserver)?;
/// let writer = handle.join().expect("recorder panicked")?;
/// ```
///
/// Returns the writer once everything is flushed, or the first write error.
pub fn record<W: OutputWriter>(events: Receiver<SimEvent>, writer: W) -> OutputResult<W> {
    let mut observer = SimOutputObserver::new(writer);
    for event in events.iter() {
        let done = matches!(event, SimEvent::Finished { .. });
        observer.handle(&event);
        if done {
            break;
        }
    }
    observer.finish();
    log::debug!(
        "recorder wrote {} steps and {} moves",
        observer.steps_written(),
        observer.moves_written()
    );
    match observer.take_error() {
        Some(e) => Err(e),
        None => Ok(observer.into_writer()),
    }
}
