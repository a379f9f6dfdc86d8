//! Adapter for route planners that live outside the graph.
//!
//! An external planner answers with a list of geographic steps.  The
//! transport (HTTP or otherwise) is the [`StepSource`] implementor's concern;
//! this module only snaps the steps onto cells.

use cs_core::{CellId, GeoPoint};

use crate::graph::CellGraph;
use crate::router::{NavigationService, Route};
use crate::NetworkResult;

/// One step of an externally planned route.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    pub lon:        f64,
    pub lat:        f64,
    /// Planned travel time of this step in seconds.
    pub delta_secs: f64,
    /// Length of this step in metres.
    pub distance_m: f64,
}

impl Step {
    #[inline]
    pub fn pos(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Source of planned steps between two coordinates.
pub trait StepSource: Send + Sync {
    fn steps(&self, from: GeoPoint, to: GeoPoint) -> NetworkResult<Vec<Step>>;
}

impl<F> StepSource for F
where
    F: Fn(GeoPoint, GeoPoint) -> NetworkResult<Vec<Step>> + Send + Sync,
{
    fn steps(&self, from: GeoPoint, to: GeoPoint) -> NetworkResult<Vec<Step>> {
        self(from, to)
    }
}

/// [`NavigationService`] backed by a [`StepSource`].
///
/// Each step maps to the cell at exactly its coordinate, else to the nearest
/// cell.  Provider errors and empty answers give an unreachable route.
pub struct StepNavigator<S: StepSource> {
    source: S,
}

impl<S: StepSource> StepNavigator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: StepSource> NavigationService for StepNavigator<S> {
    fn route(&self, graph: &CellGraph, source: CellId, destination: CellId) -> Route {
        let (Some(src), Some(dst)) = (graph.cell(source), graph.cell(destination)) else {
            return Route::unreachable(destination);
        };

        let steps = match self.source.steps(src.pos, dst.pos) {
            Ok(steps) => steps,
            Err(err) => {
                log::warn!("route provider failed for {} -> {}: {}", source, destination, err);
                return Route::unreachable(destination);
            }
        };
        if steps.is_empty() {
            return Route::unreachable(destination);
        }

        let mut cells: Vec<CellId> = steps
            .iter()
            .filter_map(|step| graph.cell_at(step.pos()).or_else(|| graph.nearest_cell(step.pos())))
            .collect();
        cells.dedup();
        if cells.last() != Some(&destination) {
            cells.push(destination);
        }

        let distance_m = steps.iter().map(|s| s.distance_m).sum();
        Route { cells, distance_m: Some(distance_m) }
    }
}
