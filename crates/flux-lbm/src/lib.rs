//! Lattice Boltzmann Method (LBM) on a periodic 2D grid.
//!
//! Implements the D2Q9 model with a single-relaxation-time (BGK) collision
//! operator and bounce-back at inactive sites. Each [`Lattice::step`] streams
//! every population to its neighbor, then relaxes each site toward local
//! equilibrium.
//!
//! # Example
//!
//! ```
//! use flux_lbm::{Lattice, LatticeConfig};
//!
//! // 16x8 channel with a small block in the middle
//! let config = LatticeConfig::reference(16, 8)
//!     .with_viscosity(0.1)
//!     .with_obstacle([8, 3])
//!     .with_obstacle([8, 4]);
//! let mut lattice = Lattice::from_config(&config).unwrap();
//!
//! let mass = lattice.total_mass();
//! for _ in 0..100 {
//!     lattice.step();
//! }
//! assert!((lattice.total_mass() - mass).abs() < 1e-10);
//!
//! let mut out = Vec::new();
//! lattice.write_density(&mut out).unwrap();
//! ```

pub mod config;
pub mod d2q9;
pub mod error;
pub mod lattice;
pub mod output;
pub mod topology;

pub use config::{LatticeConfig, Perturbation, export_config, load_config, save_config};
pub use d2q9::{Direction, Q, direction_to_steps, tau_from_viscosity, viscosity_from_tau};
pub use error::{LbmError, Result};
pub use lattice::{Lattice, SiteState};
pub use output::format_general;
pub use topology::{Grid, NeighborTable};
