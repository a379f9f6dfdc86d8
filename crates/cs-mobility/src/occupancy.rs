//! Which vehicle stands on which cell.
//!
//! Two views of the same data are kept in step: a dense `CellId`-indexed
//! vector for O(1) obstruction checks in the lookahead, and a `BTreeMap`
//! keyed by `VehicleId` so that the commit phase visits vehicles in
//! ascending id order.

use std::collections::BTreeMap;

use cs_core::{CellId, VehicleId};

use crate::{MobilityError, MobilityResult, Vehicle};

#[derive(Debug, Clone)]
struct Slot {
    cell:    CellId,
    vehicle: Vehicle,
}

#[derive(Debug, Clone, Default)]
pub struct OccupancyTable {
    by_cell: Vec<Option<VehicleId>>,
    slots:   BTreeMap<VehicleId, Slot>,
}

impl OccupancyTable {
    /// An empty table for a graph of `cell_count` cells.
    pub fn new(cell_count: usize) -> Self {
        Self { by_cell: vec![None; cell_count], slots: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of occupied cells.  Always equals [`len`](Self::len).
    pub fn occupied_cells(&self) -> usize {
        self.by_cell.iter().filter(|c| c.is_some()).count()
    }

    #[inline]
    pub fn occupant(&self, cell: CellId) -> Option<VehicleId> {
        self.by_cell.get(cell.index()).copied().flatten()
    }

    /// `true` for an existing, empty cell.
    #[inline]
    pub fn is_free(&self, cell: CellId) -> bool {
        matches!(self.by_cell.get(cell.index()), Some(None))
    }

    #[inline]
    pub fn cell_of(&self, vehicle: VehicleId) -> Option<CellId> {
        self.slots.get(&vehicle).map(|s| s.cell)
    }

    #[inline]
    pub fn vehicle(&self, vehicle: VehicleId) -> Option<&Vehicle> {
        self.slots.get(&vehicle).map(|s| &s.vehicle)
    }

    #[inline]
    pub fn vehicle_mut(&mut self, vehicle: VehicleId) -> Option<&mut Vehicle> {
        self.slots.get_mut(&vehicle).map(|s| &mut s.vehicle)
    }

    /// `(cell, vehicle)` pairs in ascending vehicle id order.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Vehicle)> + '_ {
        self.slots.values().map(|s| (s.cell, &s.vehicle))
    }

    /// Put a new vehicle on a free cell.
    pub fn occupy(&mut self, cell: CellId, mut vehicle: Vehicle) -> MobilityResult<()> {
        let slot = self.by_cell.get(cell.index()).ok_or(MobilityError::CellNotFound(cell))?;
        if let Some(by) = *slot {
            return Err(MobilityError::CellOccupied { cell, by });
        }
        if self.slots.contains_key(&vehicle.id) {
            return Err(MobilityError::DuplicateVehicle(vehicle.id));
        }
        vehicle.remember(cell);
        self.by_cell[cell.index()] = Some(vehicle.id);
        self.slots.insert(vehicle.id, Slot { cell, vehicle });
        Ok(())
    }

    /// Take a vehicle off the road, freeing its cell.
    pub fn release(&mut self, vehicle: VehicleId) -> Option<(CellId, Vehicle)> {
        let slot = self.slots.remove(&vehicle)?;
        if let Some(entry) = self.by_cell.get_mut(slot.cell.index()) {
            *entry = None;
        }
        Some((slot.cell, slot.vehicle))
    }

    /// Move a vehicle to `to`, which must be free (or its current cell).
    pub fn relocate(&mut self, vehicle: VehicleId, to: CellId) -> MobilityResult<()> {
        let from = self.cell_of(vehicle).ok_or(MobilityError::VehicleNotFound(vehicle))?;
        if from == to {
            return Ok(());
        }
        match self.by_cell.get(to.index()) {
            None => return Err(MobilityError::CellNotFound(to)),
            Some(Some(by)) => return Err(MobilityError::CellOccupied { cell: to, by: *by }),
            Some(None) => {}
        }
        self.by_cell[from.index()] = None;
        self.by_cell[to.index()] = Some(vehicle);
        if let Some(slot) = self.slots.get_mut(&vehicle) {
            slot.cell = to;
        }
        Ok(())
    }
}
