//! JSON lattice configuration and loader.

use crate::d2q9::{Direction, tau_from_viscosity};
use crate::error::{LbmError, Result};
use serde::{Deserialize, Serialize};

/// Everything needed to build and seed a [`Lattice`](crate::Lattice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeConfig {
    /// Grid width (sites along x).
    pub width: usize,
    /// Grid height (sites along y).
    pub height: usize,
    /// BGK relaxation time.
    #[serde(default = "default_tau")]
    pub tau: f64,
    /// Coordinates of inactive (bounce-back) sites.
    #[serde(default)]
    pub obstacles: Vec<[usize; 2]>,
    /// Optional single-value perturbation applied after the rest state.
    #[serde(default)]
    pub perturbation: Option<Perturbation>,
}

/// Scale one population at one site by `factor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    /// Site coordinate [x, y].
    pub site: [usize; 2],
    /// Direction number, 1..=9.
    pub direction: usize,
    /// Multiplier applied to the rest value.
    #[serde(default = "default_factor")]
    pub factor: f64,
}

fn default_tau() -> f64 {
    1.0
}

fn default_factor() -> f64 {
    1.1
}

impl LatticeConfig {
    /// All-active grid at rest, τ = 1.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tau: default_tau(),
            obstacles: Vec::new(),
            perturbation: None,
        }
    }

    /// Reference setup: rest state with direction 3 at (1, 1) raised by 10%.
    ///
    /// The coordinate wraps on grids narrower than two sites.
    pub fn reference(width: usize, height: usize) -> Self {
        let site = [1 % width.max(1), 1 % height.max(1)];
        Self {
            perturbation: Some(Perturbation {
                site,
                direction: 3,
                factor: default_factor(),
            }),
            ..Self::new(width, height)
        }
    }

    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    /// Set τ from kinematic viscosity (τ = 3ν + 0.5).
    pub fn with_viscosity(mut self, nu: f64) -> Self {
        self.tau = tau_from_viscosity(nu);
        self
    }

    pub fn with_obstacle(mut self, coord: [usize; 2]) -> Self {
        self.obstacles.push(coord);
        self
    }

    pub fn with_perturbation(mut self, perturbation: Perturbation) -> Self {
        self.perturbation = Some(perturbation);
        self
    }

    /// Check dimensions, τ, obstacle coordinates and perturbation.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LbmError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.tau.is_finite() && self.tau > 0.0) {
            return Err(LbmError::InvalidRelaxationTime(self.tau));
        }
        for &[x, y] in &self.obstacles {
            self.check_coord(x, y)?;
        }
        if let Some(p) = &self.perturbation {
            self.check_coord(p.site[0], p.site[1])?;
            Direction::new(p.direction)?;
            if !(p.factor.is_finite() && p.factor >= 0.0) {
                return Err(LbmError::InvalidParameter(format!(
                    "perturbation factor must be finite and non-negative, got {}",
                    p.factor
                )));
            }
        }
        Ok(())
    }

    fn check_coord(&self, x: usize, y: usize) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(LbmError::CoordinateOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LatticeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Load a lattice configuration from file.
pub fn load_config(path: &str) -> Result<LatticeConfig> {
    let json = std::fs::read_to_string(path)?;
    LatticeConfig::from_json(&json)
}

/// Save a lattice configuration to file.
pub fn save_config(path: &str, config: &LatticeConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Export a configuration to a JSON string.
pub fn export_config(config: &LatticeConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}
