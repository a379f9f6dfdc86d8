//! Simulation events and the channel they are published on.
//!
//! The simulation never waits for a consumer.  An unbounded channel buffers
//! everything; a bounded one drops events once full and counts the drops.
//! A consumer that hangs up is ignored from then on.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};

use cs_core::{CellId, Tick, VehicleId};

/// Per-tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub tick:       Tick,
    /// Vehicles that changed cell.
    pub moved:      usize,
    /// Vehicles that stayed put, including those that lost a conflict.
    pub stationary: usize,
    /// Planned moves dropped because an earlier vehicle claimed the cell.
    pub conflicts:  usize,
    pub stalled:    usize,
    pub arrived:    usize,
    /// Vehicles whose move could not be computed.
    pub failed:     usize,
    /// Vehicles on the road after the tick.
    pub vehicles:   usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Started {
        tick:     Tick,
        vehicles: usize,
    },
    VehicleCreated {
        tick:        Tick,
        vehicle:     VehicleId,
        cell:        CellId,
        destination: CellId,
        routed:      bool,
    },
    VehicleMoved {
        tick:    Tick,
        vehicle: VehicleId,
        from:    CellId,
        to:      CellId,
        speed:   u32,
    },
    VehicleArrived {
        tick:    Tick,
        vehicle: VehicleId,
        cell:    CellId,
    },
    VehicleStalled {
        tick:          Tick,
        vehicle:       VehicleId,
        cell:          CellId,
        stalled_ticks: u32,
    },
    StepCompleted {
        step:    Tick,
        elapsed: Duration,
        stats:   StepStats,
    },
    Finished {
        tick:     Tick,
        vehicles: usize,
    },
}

impl SimEvent {
    pub fn tick(&self) -> Tick {
        match self {
            SimEvent::Started { tick, .. }
            | SimEvent::VehicleCreated { tick, .. }
            | SimEvent::VehicleMoved { tick, .. }
            | SimEvent::VehicleArrived { tick, .. }
            | SimEvent::VehicleStalled { tick, .. }
            | SimEvent::Finished { tick, .. } => *tick,
            SimEvent::StepCompleted { step, .. } => *step,
        }
    }
}

// ── EventPublisher ────────────────────────────────────────────────────────────

/// Sending half of the event channel.
#[derive(Debug)]
pub struct EventPublisher {
    tx:           Sender<SimEvent>,
    bounded:      bool,
    dropped:      u64,
    disconnected: bool,
}

impl EventPublisher {
    /// New channel; `capacity = None` for unbounded.
    pub fn channel(capacity: Option<usize>) -> (Self, Receiver<SimEvent>) {
        let (tx, rx) = match capacity {
            Some(n) => bounded(n),
            None => unbounded(),
        };
        let publisher = Self { tx, bounded: capacity.is_some(), dropped: 0, disconnected: false };
        (publisher, rx)
    }

    pub fn publish(&mut self, event: SimEvent) {
        if self.disconnected {
            return;
        }
        let result = if self.bounded {
            self.tx.try_send(event)
        } else {
            self.tx.send(event).map_err(|e| TrySendError::Disconnected(e.0))
        };
        match result {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.dropped += 1,
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("event consumer disconnected, no further events are published");
                self.disconnected = true;
            }
        }
    }

    /// Events lost to a full bounded channel.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}
