//! Simulation quality grading from conservation drift.

use crate::conservation::MassMonitor;

/// Quality levels based on conservation error relative to a tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationQuality {
    /// Error < 0.01 * tolerance
    Excellent,
    /// 0.01 * tolerance <= error < 0.1 * tolerance
    Good,
    /// 0.1 * tolerance <= error < tolerance
    Marginal,
    /// tolerance <= error < 10 * tolerance
    Poor,
    /// error >= 10 * tolerance, or the field is no longer finite
    Critical,
}

impl SimulationQuality {
    /// Assess quality based on error relative to tolerance.
    pub fn assess(error: f64, tolerance: f64) -> Self {
        let ratio = error / tolerance;

        if ratio.is_nan() {
            Self::Critical
        } else if ratio < 0.01 {
            Self::Excellent
        } else if ratio < 0.1 {
            Self::Good
        } else if ratio < 1.0 {
            Self::Marginal
        } else if ratio < 10.0 {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    /// Assess quality from a mass monitor.
    pub fn assess_from_monitor(monitor: &MassMonitor, tolerance: f64) -> Self {
        Self::assess(monitor.max_relative_error(), tolerance)
    }

    /// Excellent, Good, or Marginal.
    pub fn is_acceptable(&self) -> bool {
        matches!(self, Self::Excellent | Self::Good | Self::Marginal)
    }

    /// Poor or Critical.
    pub fn needs_intervention(&self) -> bool {
        matches!(self, Self::Poor | Self::Critical)
    }
}
