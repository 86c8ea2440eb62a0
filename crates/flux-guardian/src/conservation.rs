//! Conservation monitoring for lattice simulations.
//!
//! Tracks total mass and momentum against a baseline to detect numerical
//! drift, and locates non-finite populations before they spread.

use flux_lbm::Lattice;

/// Baseline conserved quantities to track drift.
#[derive(Debug, Clone)]
pub struct MassBaseline {
    pub baseline_mass: f64,
    pub baseline_momentum: [f64; 2],
}

impl MassBaseline {
    /// Record the current totals of `lattice`.
    pub fn new(lattice: &Lattice) -> Self {
        Self {
            baseline_mass: lattice.total_mass(),
            baseline_momentum: lattice.total_momentum(),
        }
    }
}

/// Conservation errors at the current step.
#[derive(Debug, Clone)]
pub struct MassMonitor {
    /// Relative mass error: |M - M₀| / |M₀|
    pub mass_error: f64,
    /// Momentum drift: p - p₀
    pub momentum_error: [f64; 2],
}

impl MassMonitor {
    /// Compare the lattice against its baseline.
    pub fn check(baseline: &MassBaseline, lattice: &Lattice) -> Self {
        let mass = lattice.total_mass();
        let momentum = lattice.total_momentum();

        // Relative mass error (avoid division by zero)
        let mass_error = if baseline.baseline_mass.abs() > 1e-12 {
            (mass - baseline.baseline_mass).abs() / baseline.baseline_mass.abs()
        } else {
            (mass - baseline.baseline_mass).abs()
        };

        Self {
            mass_error,
            momentum_error: [
                momentum[0] - baseline.baseline_momentum[0],
                momentum[1] - baseline.baseline_momentum[1],
            ],
        }
    }

    pub fn momentum_error_norm(&self) -> f64 {
        self.momentum_error[0].hypot(self.momentum_error[1])
    }

    /// True if mass or momentum drifted beyond tolerance.
    ///
    /// A NaN error counts as a violation.
    pub fn is_violated(&self, mass_tol: f64, momentum_tol: f64) -> bool {
        !(self.mass_error <= mass_tol && self.momentum_error_norm() <= momentum_tol)
    }

    /// Maximum relative error across both laws (normalized).
    pub fn max_relative_error(&self) -> f64 {
        let p = self.momentum_error_norm();
        let mom_rel = p / (1.0 + p);
        if self.mass_error.is_nan() || mom_rel.is_nan() {
            return f64::NAN;
        }
        self.mass_error.max(mom_rel)
    }
}

/// Indices of sites holding a NaN or infinite population.
pub fn non_finite_sites(lattice: &Lattice) -> Vec<usize> {
    (0..lattice.num_sites())
        .filter(|&site| lattice.distribution(site).iter().any(|v| !v.is_finite()))
        .collect()
}
