//! Fluent builder for constructing a [`Sim`].

use cs_core::{SimConfig, SimRng};
use cs_mobility::{MoveParams, OccupancyTable, SignalTable};
use cs_network::{CellGraph, NavigationService};

use crate::{Sim, SimResult};

/// Fluent builder for [`Sim<N>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks, seed, vehicle profile
/// - [`CellGraph`]: from [`cs_network::build`]
/// - `N: NavigationService`, e.g. [`cs_network::RoadNavigator`]
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                  |
/// |-----------------|------------------------------------------|
/// | `.signals(t)`   | `SignalTable::from_graph(&graph)`        |
///
/// # Example
///
/// ```rust,ignore
/// let (graph, _report) = cs_network::build(&map, BuildConfig::default())?;
/// let mut sim = SimBuilder::new(config, graph, RoadNavigator::new()).build()?;
/// sim.populate()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<N: NavigationService> {
    config:    SimConfig,
    graph:     CellGraph,
    navigator: N,
    signals:   Option<SignalTable>,
}

impl<N: NavigationService> SimBuilder<N> {
    pub fn new(config: SimConfig, graph: CellGraph, navigator: N) -> Self {
        Self { config, graph, navigator, signals: None }
    }

    /// Replace the traffic lights derived from the graph.
    pub fn signals(mut self, signals: SignalTable) -> Self {
        self.signals = Some(signals);
        self
    }

    /// Validate the configuration and return a ready-to-run [`Sim`] with an
    /// empty road.
    pub fn build(self) -> SimResult<Sim<N>> {
        self.config.validate()?;

        let signals = self.signals.unwrap_or_else(|| SignalTable::from_graph(&self.graph));
        let occupancy = OccupancyTable::new(self.graph.cell_count());

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| crate::SimError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };

        Ok(Sim {
            clock:        cs_core::SimClock::new(self.config.tick_duration_secs),
            params:       MoveParams::from(&self.config),
            rng:          SimRng::new(self.config.seed),
            config:       self.config,
            graph:        self.graph,
            navigator:    self.navigator,
            occupancy,
            signals,
            next_vehicle: 0,
            publisher:    None,
            pending:      Vec::new(),
            started:      false,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}
