use super::term::EnergyComponents;
use super::{ForceField, ForceFieldError, SystemShape};
use crate::core::models::connectivity::Connectivity;
use crate::core::models::ensemble::{Ensemble, group_by_molecule};
use crate::core::units::{Dimension, Unit};
use crate::core::utils::geometry;
use nalgebra::{DMatrix, Point3, Vector3};
use tracing::debug;

/// A force field without interactions.
///
/// Every evaluation yields zero acceleration and zero energy, while distances and per-molecule
/// bond angles are computed from the actual positions (minimum-image in periodic mode).
#[derive(Debug, Clone)]
pub struct IdealGas {
    connectivity: Connectivity,
    molecules: Vec<Vec<usize>>,
    cell: Option<Vector3<f64>>,
    initialized: bool,
    unit_energy: Unit,
    unit_angle: Unit,
    distances: DMatrix<f64>,
    bond_angles: Vec<f64>,
}

impl IdealGas {
    pub fn new(connectivity: Connectivity, molecule_ids: &[i64]) -> Result<Self, ForceFieldError> {
        Ok(Self {
            connectivity,
            molecules: group_by_molecule(molecule_ids),
            cell: None,
            initialized: false,
            unit_energy: Unit::parse_as("kJ/mol", Dimension::ENERGY, "energy")?,
            unit_angle: Unit::radian(),
            distances: DMatrix::zeros(0, 0),
            bond_angles: Vec::new(),
        })
    }

    pub fn for_ensemble(ensemble: &dyn Ensemble) -> Result<Self, ForceFieldError> {
        Self::new(ensemble.connectivity().clone(), ensemble.molecule_ids())
    }

    /// Reports energies (all zero) in the given unit instead of kJ/mol.
    pub fn with_energy_unit(mut self, label: &str) -> Result<Self, ForceFieldError> {
        self.unit_energy = Unit::parse_as(label, Dimension::ENERGY, "energy")?;
        Ok(self)
    }
}

impl ForceField for IdealGas {
    fn initialize(
        &mut self,
        shape: SystemShape,
        periodic_box: Option<Vector3<f64>>,
    ) -> Result<(), ForceFieldError> {
        if shape.num_atoms != self.connectivity.num_atoms() {
            return Err(ForceFieldError::ShapeMismatch {
                what: "atoms",
                expected: self.connectivity.num_atoms(),
                found: shape.num_atoms,
            });
        }
        if shape.num_molecules != self.molecules.len() {
            return Err(ForceFieldError::ShapeMismatch {
                what: "molecules",
                expected: self.molecules.len(),
                found: shape.num_molecules,
            });
        }
        self.cell = periodic_box;
        self.distances = DMatrix::zeros(shape.num_atoms, shape.num_atoms);
        self.bond_angles = vec![0.0; shape.num_molecules];
        self.initialized = true;
        debug!(
            num_atoms = shape.num_atoms,
            periodic = periodic_box.is_some(),
            "Ideal-gas force field initialized."
        );
        Ok(())
    }

    fn fit_units(&mut self, length: &Unit, time: &Unit) -> Result<(), ForceFieldError> {
        // Zero forces are zero in every unit system; only validate what we are given.
        length.clone().expect_dimension(Dimension::LENGTH, "length")?;
        time.clone().expect_dimension(Dimension::TIME, "time")?;
        Ok(())
    }

    fn evaluate(
        &mut self,
        positions: &[Point3<f64>],
    ) -> Result<Vec<Vector3<f64>>, ForceFieldError> {
        if !self.initialized {
            return Err(ForceFieldError::NotInitialized);
        }
        if positions.len() != self.connectivity.num_atoms() {
            return Err(ForceFieldError::ShapeMismatch {
                what: "positions",
                expected: self.connectivity.num_atoms(),
                found: positions.len(),
            });
        }
        let cell = self.cell.as_ref();
        self.distances = geometry::pairwise_distances(positions, cell);
        self.bond_angles =
            geometry::molecule_bond_angles(positions, &self.molecules, &self.connectivity, cell);
        Ok(vec![Vector3::zeros(); positions.len()])
    }

    fn energies(&self) -> EnergyComponents {
        EnergyComponents::default()
    }

    fn distances(&self) -> &DMatrix<f64> {
        &self.distances
    }

    fn bond_angles(&self) -> &[f64] {
        &self.bond_angles
    }

    fn unit_energy(&self) -> &Unit {
        &self.unit_energy
    }

    fn unit_angle(&self) -> &Unit {
        &self.unit_angle
    }
}
