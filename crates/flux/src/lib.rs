//! flux: 2D lattice Boltzmann fluid simulation.
//!
//! This is the umbrella crate that provides the `Simulator` and re-exports
//! the engine and monitoring crates.

pub use flux_guardian::{self, MassBaseline, MassMonitor, SimulationQuality};
pub use flux_lbm::{
    self, Direction, Grid, Lattice, LatticeConfig, LbmError, NeighborTable, Perturbation, Result,
    SiteState,
};

/// Default relative mass drift tolerated before a warning is logged.
pub const DEFAULT_MASS_TOLERANCE: f64 = 1e-10;

/// Main simulation driver: a lattice plus conservation tracking.
pub struct Simulator {
    lattice: Lattice,
    baseline: MassBaseline,
    mass_tolerance: f64,
    steps: u64,
}

impl Simulator {
    /// Wrap a lattice, taking its current totals as the baseline.
    pub fn new(lattice: Lattice) -> Self {
        let baseline = MassBaseline::new(&lattice);
        Self {
            lattice,
            baseline,
            mass_tolerance: DEFAULT_MASS_TOLERANCE,
            steps: 0,
        }
    }

    /// Build the lattice from a configuration.
    pub fn from_config(config: &LatticeConfig) -> Result<Self> {
        Ok(Self::new(Lattice::from_config(config)?))
    }

    pub fn with_mass_tolerance(mut self, tolerance: f64) -> Self {
        self.mass_tolerance = tolerance;
        self
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Mutable access for external boundary edits.
    ///
    /// Call [`Simulator::rebaseline`] afterwards if the edit changes total
    /// mass on purpose.
    pub fn lattice_mut(&mut self) -> &mut Lattice {
        &mut self.lattice
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    /// Reset the conservation baseline to the current state.
    pub fn rebaseline(&mut self) {
        self.baseline = MassBaseline::new(&self.lattice);
    }

    /// Conservation errors relative to the baseline.
    pub fn monitor(&self) -> MassMonitor {
        MassMonitor::check(&self.baseline, &self.lattice)
    }

    /// Grade mass drift against the configured tolerance.
    pub fn quality(&self) -> SimulationQuality {
        SimulationQuality::assess(self.monitor().mass_error, self.mass_tolerance)
    }

    /// Advance one stream + collide step and report mass drift.
    pub fn step(&mut self) -> MassMonitor {
        self.lattice.step();
        self.steps += 1;

        let monitor = self.monitor();
        if !(monitor.mass_error <= self.mass_tolerance) {
            log::warn!(
                "step {}: relative mass drift {:e} exceeds tolerance {:e}",
                self.steps,
                monitor.mass_error,
                self.mass_tolerance
            );
            let bad = flux_guardian::non_finite_sites(&self.lattice);
            if !bad.is_empty() {
                log::warn!(
                    "step {}: {} site(s) hold non-finite values, first at {}",
                    self.steps,
                    bad.len(),
                    bad[0]
                );
            }
        }
        monitor
    }

    /// Run `n` steps, returning the monitor after the last one.
    pub fn run(&mut self, n: usize) -> MassMonitor {
        for _ in 0..n {
            self.step();
        }
        let monitor = self.monitor();
        log::debug!(
            "ran {} steps (total {}), mass error {:e}",
            n,
            self.steps,
            monitor.mass_error
        );
        monitor
    }
}
