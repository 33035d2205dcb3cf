use super::progress::{Progress, ProgressReporter};
use crate::core::forcefield::term::EnergyComponents;
use crate::core::forcefield::{ForceField, ForceFieldError};
use nalgebra::{DMatrix, DVector, Point3, Vector3};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Force function invoked for slot {attempted} but buffers hold only {capacity} slots")]
    StepOverflow { capacity: usize, attempted: usize },
    #[error("Force-field evaluation failed at slot {slot}: {source}")]
    ForceField {
        slot: usize,
        #[source]
        source: ForceFieldError,
    },
    #[error("Force field reported {found} {what} at slot {slot}, expected {expected}")]
    ShapeMismatch {
        slot: usize,
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Only {written} of {capacity} diagnostic slots were written")]
    Incomplete { capacity: usize, written: usize },
}

/// Per-evaluation force-field diagnostics for one run, one slot per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticBuffers {
    pub(crate) coulomb: DVector<f64>,
    pub(crate) lennard_jones: DVector<f64>,
    pub(crate) bond_vibration: DVector<f64>,
    pub(crate) angle_vibration: DVector<f64>,
    /// `frames × molecules`
    pub(crate) bond_angles: DMatrix<f64>,
    /// One `atoms × atoms` matrix per frame.
    pub(crate) distances: Vec<DMatrix<f64>>,
}

impl DiagnosticBuffers {
    /// Zero-filled buffers with `step_count + 1` slots.
    pub fn allocate(step_count: usize, num_atoms: usize, num_molecules: usize) -> Self {
        let slots = step_count + 1;
        Self {
            coulomb: DVector::zeros(slots),
            lennard_jones: DVector::zeros(slots),
            bond_vibration: DVector::zeros(slots),
            angle_vibration: DVector::zeros(slots),
            bond_angles: DMatrix::zeros(slots, num_molecules),
            distances: vec![DMatrix::zeros(num_atoms, num_atoms); slots],
        }
    }

    pub fn capacity(&self) -> usize {
        self.coulomb.len()
    }

    pub fn num_atoms(&self) -> usize {
        self.distances.first().map_or(0, |d| d.nrows())
    }

    pub fn num_molecules(&self) -> usize {
        self.bond_angles.ncols()
    }

    pub fn coulomb(&self) -> &DVector<f64> {
        &self.coulomb
    }

    pub fn lennard_jones(&self) -> &DVector<f64> {
        &self.lennard_jones
    }

    pub fn bond_vibration(&self) -> &DVector<f64> {
        &self.bond_vibration
    }

    pub fn angle_vibration(&self) -> &DVector<f64> {
        &self.angle_vibration
    }

    pub fn bond_angles(&self) -> &DMatrix<f64> {
        &self.bond_angles
    }

    pub fn distances(&self) -> &[DMatrix<f64>] {
        &self.distances
    }

    pub fn energies_at(&self, slot: usize) -> Option<EnergyComponents> {
        (slot < self.capacity()).then(|| {
            EnergyComponents::new(
                self.coulomb[slot],
                self.lennard_jones[slot],
                self.bond_vibration[slot],
                self.angle_vibration[slot],
            )
        })
    }

    fn write(
        &mut self,
        slot: usize,
        energies: EnergyComponents,
        distances: &DMatrix<f64>,
        angles: &[f64],
    ) {
        self.coulomb[slot] = energies.coulomb;
        self.lennard_jones[slot] = energies.lennard_jones;
        self.bond_vibration[slot] = energies.bond_vibration;
        self.angle_vibration[slot] = energies.angle_vibration;
        for (col, &angle) in angles.iter().enumerate() {
            self.bond_angles[(slot, col)] = angle;
        }
        self.distances[slot].copy_from(distances);
    }
}

/// Wraps a force field so that each call made by the integrator fills exactly one diagnostic
/// slot, in call order.
///
/// The capture owns its cursor: slot `i` is written by the `i`-th successful call and by no
/// other. A call past the last slot is refused with [`CaptureError::StepOverflow`] and is
/// remembered, so [`StepCapture::finish`] still fails even if the integrator swallowed the error.
pub struct StepCapture<'a, F: ForceField> {
    forcefield: &'a mut F,
    buffers: DiagnosticBuffers,
    cursor: usize,
    overflow: Option<usize>,
    reporter: &'a ProgressReporter<'a>,
}

impl<'a, F: ForceField> StepCapture<'a, F> {
    pub fn new(
        forcefield: &'a mut F,
        buffers: DiagnosticBuffers,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            forcefield,
            buffers,
            cursor: 0,
            overflow: None,
            reporter,
        }
    }

    /// Number of slots written so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn overflowed(&self) -> bool {
        self.overflow.is_some()
    }

    /// The step function handed to the integrator; `_time` is ignored.
    pub fn capture(
        &mut self,
        positions: &[Point3<f64>],
        _time: f64,
    ) -> Result<Vec<Vector3<f64>>, CaptureError> {
        let slot = self.cursor;
        let capacity = self.buffers.capacity();
        if slot >= capacity {
            let attempted = self.overflow.map_or(slot, |previous| previous + 1);
            self.overflow = Some(attempted);
            return Err(CaptureError::StepOverflow {
                capacity,
                attempted,
            });
        }

        let acceleration = self
            .forcefield
            .evaluate(positions)
            .map_err(|source| CaptureError::ForceField { slot, source })?;

        // Read back immediately: the force field only holds diagnostics for its last call.
        let energies = self.forcefield.energies();
        let distances = self.forcefield.distances();
        let angles = self.forcefield.bond_angles();

        let num_atoms = self.buffers.num_atoms();
        let num_molecules = self.buffers.num_molecules();
        let checks = [
            ("accelerations", num_atoms, acceleration.len()),
            ("distance rows", num_atoms, distances.nrows()),
            ("distance columns", num_atoms, distances.ncols()),
            ("bond angles", num_molecules, angles.len()),
        ];
        if let Some(&(what, expected, found)) = checks.iter().find(|(_, e, f)| e != f) {
            return Err(CaptureError::ShapeMismatch {
                slot,
                what,
                expected,
                found,
            });
        }

        self.buffers.write(slot, energies, distances, angles);
        self.cursor += 1;
        trace!(slot, potential = energies.total(), "Captured force evaluation.");
        self.reporter.report(Progress::TaskIncrement);
        Ok(acceleration)
    }

    /// Releases the buffers once every slot has been written exactly once.
    pub fn finish(self) -> Result<DiagnosticBuffers, CaptureError> {
        let capacity = self.buffers.capacity();
        if let Some(attempted) = self.overflow {
            return Err(CaptureError::StepOverflow {
                capacity,
                attempted,
            });
        }
        if self.cursor != capacity {
            return Err(CaptureError::Incomplete {
                capacity,
                written: self.cursor,
            });
        }
        Ok(self.buffers)
    }
}
