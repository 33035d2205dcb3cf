//! # Force Field Module
//!
//! The force-field capability consumed by the simulation driver.
//!
//! A [`ForceField`] turns positions into accelerations. Alongside each evaluation it keeps, as
//! read-only state, the potential-energy components, the interatomic distance matrix and one
//! bond angle per molecule for the positions it was last called with. The driver reads that
//! state back immediately after every call, so implementations only need to be correct for
//! strictly sequential call-then-read use.
//!
//! - [`term`] - The four potential-energy components of one evaluation
//! - [`ideal_gas`] - An interaction-free force field that still reports geometry

pub mod ideal_gas;
pub mod term;

use crate::core::units::{Unit, UnitError};
use nalgebra::{DMatrix, Point3, Vector3};
use term::EnergyComponents;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForceFieldError {
    #[error("Force field has not been initialized")]
    NotInitialized,
    #[error("Shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Unit error: {0}")]
    Unit(#[from] UnitError),
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}

/// Number of atoms and molecules the force field will be evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemShape {
    pub num_atoms: usize,
    pub num_molecules: usize,
}

pub trait ForceField {
    /// Prepares internal buffers; `periodic_box` is `None` for aperiodic runs.
    fn initialize(
        &mut self,
        shape: SystemShape,
        periodic_box: Option<Vector3<f64>>,
    ) -> Result<(), ForceFieldError>;

    /// Adapts internal units so outputs are expressed in the caller's length and time units.
    fn fit_units(&mut self, length: &Unit, time: &Unit) -> Result<(), ForceFieldError>;

    /// Returns one acceleration per atom and updates the read-only diagnostics below.
    fn evaluate(&mut self, positions: &[Point3<f64>]) -> Result<Vec<Vector3<f64>>, ForceFieldError>;

    fn energies(&self) -> EnergyComponents;

    /// `num_atoms × num_atoms` distances for the last evaluated positions.
    fn distances(&self) -> &DMatrix<f64>;

    /// One angle per molecule for the last evaluated positions.
    fn bond_angles(&self) -> &[f64];

    fn unit_energy(&self) -> &Unit;

    fn unit_angle(&self) -> &Unit;
}
