//! # Core Module
//!
//! Stateless building blocks of a molecular-dynamics run.
//!
//! - **Units** ([`units`]) - Unit labels resolved into scale + dimension, conversions, constants
//! - **Models** ([`models`]) - Elements, bonded connectivity and the ensemble capability
//! - **Force Fields** ([`forcefield`]) - The force-field capability and a reference implementation
//! - **Integrators** ([`integrator`]) - The time-stepping capability and velocity Verlet
//! - **Utilities** ([`utils`]) - Distance and angle geometry

pub mod forcefield;
pub mod integrator;
pub mod models;
pub mod units;
pub mod utils;
