//! Traffic-light phase state machine.
//!
//! Every light alternates `Green`/`Red`.  After tick `t` has been committed,
//! a light flips when the duration `d` of its current phase is non-zero and
//! divides `t`.  A zero duration pins the light in that phase.

use rustc_hash::FxHashMap;

use cs_core::CellId;
use cs_network::{CellGraph, Phase, SignalPlan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Light {
    pub cell:  CellId,
    pub plan:  SignalPlan,
    pub phase: Phase,
}

#[derive(Debug, Clone, Default)]
pub struct SignalTable {
    lights: Vec<Light>,
    index:  FxHashMap<CellId, usize>,
}

impl SignalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// One light per signalised cell of `graph`, in its initial phase.
    pub fn from_graph(graph: &CellGraph) -> Self {
        let mut table = Self::new();
        for cell in graph.cells() {
            if let Some(plan) = cell.signal_plan() {
                table.insert(cell.id, *plan);
            }
        }
        table
    }

    /// Add or replace the light on `cell`.
    pub fn insert(&mut self, cell: CellId, plan: SignalPlan) {
        let light = Light { cell, plan, phase: plan.initial };
        match self.index.get(&cell) {
            Some(&i) => self.lights[i] = light,
            None => {
                self.index.insert(cell, self.lights.len());
                self.lights.push(light);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    #[inline]
    pub fn phase(&self, cell: CellId) -> Option<Phase> {
        self.index.get(&cell).map(|&i| self.lights[i].phase)
    }

    #[inline]
    pub fn is_red(&self, cell: CellId) -> bool {
        self.phase(cell).is_some_and(Phase::is_red)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> + '_ {
        self.lights.iter()
    }

    /// Advance every light after `completed_ticks` ticks.  Returns how many
    /// lights flipped.
    pub fn update(&mut self, completed_ticks: u64) -> usize {
        let mut flipped = 0;
        for light in &mut self.lights {
            let d = u64::from(light.plan.duration(light.phase));
            if d > 0 && completed_ticks % d == 0 {
                light.phase = light.phase.flipped();
                flipped += 1;
            }
        }
        flipped
    }
}
