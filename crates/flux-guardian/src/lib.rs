//! Conservation monitoring for lattice Boltzmann simulations.
//!
//! This crate provides:
//! - Mass and momentum drift tracking against a baseline
//! - Detection of non-finite populations
//! - Quality grading of a running simulation

pub mod conservation;
pub mod quality;

pub use conservation::{MassBaseline, MassMonitor, non_finite_sites};
pub use quality::SimulationQuality;
