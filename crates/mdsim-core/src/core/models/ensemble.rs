use super::connectivity::{Connectivity, ConnectivityError};
use super::elements;
use crate::core::units::{Dimension, Unit, UnitError};
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Ensemble contains no atoms")]
    Empty,
    #[error("Field '{field}' has {found} entries, expected {expected} (one per atom)")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Atom {atom} has atomic number {atomic_number}, which is not in the element table")]
    UnknownElement { atom: usize, atomic_number: u8 },
    #[error("Atom {atom} has a non-finite {field}")]
    NonFinite { field: &'static str, atom: usize },
    #[error("Box lengths must be finite and positive, got {0:?}")]
    InvalidBoxLengths([f64; 3]),
    #[error("Velocity unit '{velocity}' does not equal length/time ('{length}'/'{time}')")]
    InconsistentVelocityUnit {
        velocity: String,
        length: String,
        time: String,
    },
    #[error("Unit error: {0}")]
    Unit(#[from] UnitError),
    #[error("Connectivity error: {0}")]
    Connectivity(#[from] ConnectivityError),
}

/// Read-only view of the initial state and static metadata of one simulation run.
pub trait Ensemble {
    fn positions(&self) -> &[Point3<f64>];
    fn velocities(&self) -> &[Vector3<f64>];
    fn atomic_numbers(&self) -> &[u8];
    /// Arbitrary per-atom labels; atoms of the same molecule share a value.
    fn molecule_ids(&self) -> &[i64];
    fn connectivity(&self) -> &Connectivity;
    /// Present only when the ensemble describes a periodic cell.
    fn box_lengths(&self) -> Option<Vector3<f64>>;
    fn unit_length(&self) -> &Unit;
    fn unit_time(&self) -> &Unit;
    fn unit_velocity(&self) -> &Unit;

    fn num_atoms(&self) -> usize {
        self.positions().len()
    }

    fn num_molecules(&self) -> usize {
        group_by_molecule(self.molecule_ids()).len()
    }
}

/// Groups atom indices by molecule id, ordered by ascending id.
pub fn group_by_molecule(molecule_ids: &[i64]) -> Vec<Vec<usize>> {
    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (atom, &id) in molecule_ids.iter().enumerate() {
        groups.entry(id).or_default().push(atom);
    }
    groups.into_values().collect()
}

/// Checks that an ensemble is internally consistent and fully resolvable.
pub fn validate(ensemble: &dyn Ensemble) -> Result<(), EnsembleError> {
    let n = ensemble.num_atoms();
    if n == 0 {
        return Err(EnsembleError::Empty);
    }

    let check_len = |field: &'static str, found: usize| {
        if found == n {
            Ok(())
        } else {
            Err(EnsembleError::LengthMismatch {
                field,
                expected: n,
                found,
            })
        }
    };
    check_len("velocities", ensemble.velocities().len())?;
    check_len("atomic_numbers", ensemble.atomic_numbers().len())?;
    check_len("molecule_ids", ensemble.molecule_ids().len())?;
    check_len("connectivity", ensemble.connectivity().num_atoms())?;

    for (atom, &z) in ensemble.atomic_numbers().iter().enumerate() {
        if elements::lookup(z).is_none() {
            return Err(EnsembleError::UnknownElement {
                atom,
                atomic_number: z,
            });
        }
    }
    for (atom, p) in ensemble.positions().iter().enumerate() {
        if !p.coords.iter().all(|x| x.is_finite()) {
            return Err(EnsembleError::NonFinite {
                field: "position",
                atom,
            });
        }
    }
    for (atom, v) in ensemble.velocities().iter().enumerate() {
        if !v.iter().all(|x| x.is_finite()) {
            return Err(EnsembleError::NonFinite {
                field: "velocity",
                atom,
            });
        }
    }
    if let Some(lengths) = ensemble.box_lengths() {
        if !lengths.iter().all(|l| l.is_finite() && *l > 0.0) {
            return Err(EnsembleError::InvalidBoxLengths([
                lengths.x, lengths.y, lengths.z,
            ]));
        }
    }

    let length = ensemble.unit_length().clone().expect_dimension(Dimension::LENGTH, "length")?;
    let time = ensemble.unit_time().clone().expect_dimension(Dimension::TIME, "time")?;
    let velocity = ensemble
        .unit_velocity()
        .clone()
        .expect_dimension(Dimension::VELOCITY, "velocity")?;
    let factor = velocity.conversion_factor(&(&length / &time))?;
    if (factor - 1.0).abs() > 1e-9 {
        return Err(EnsembleError::InconsistentVelocityUnit {
            velocity: velocity.symbol().to_string(),
            length: length.symbol().to_string(),
            time: time.symbol().to_string(),
        });
    }
    Ok(())
}

/// An ensemble held entirely in memory.
#[derive(Debug, Clone)]
pub struct StaticEnsemble {
    positions: Vec<Point3<f64>>,
    velocities: Vec<Vector3<f64>>,
    atomic_numbers: Vec<u8>,
    molecule_ids: Vec<i64>,
    connectivity: Connectivity,
    box_lengths: Option<Vector3<f64>>,
    unit_length: Unit,
    unit_time: Unit,
    unit_velocity: Unit,
}

impl Ensemble for StaticEnsemble {
    fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }
    fn velocities(&self) -> &[Vector3<f64>] {
        &self.velocities
    }
    fn atomic_numbers(&self) -> &[u8] {
        &self.atomic_numbers
    }
    fn molecule_ids(&self) -> &[i64] {
        &self.molecule_ids
    }
    fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }
    fn box_lengths(&self) -> Option<Vector3<f64>> {
        self.box_lengths
    }
    fn unit_length(&self) -> &Unit {
        &self.unit_length
    }
    fn unit_time(&self) -> &Unit {
        &self.unit_time
    }
    fn unit_velocity(&self) -> &Unit {
        &self.unit_velocity
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitsSection {
    length: String,
    time: String,
    velocity: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct AtomRecord {
    atomic_number: u8,
    molecule_id: i64,
    position: [f64; 3],
    #[serde(default)]
    velocity: [f64; 3],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct EnsembleFile {
    units: UnitsSection,
    box_lengths: Option<[f64; 3]>,
    #[serde(default)]
    bonds: Vec<[usize; 2]>,
    atoms: Vec<AtomRecord>,
}

impl StaticEnsemble {
    pub fn builder() -> StaticEnsembleBuilder {
        StaticEnsembleBuilder::default()
    }

    /// Loads an ensemble from a TOML file with `[units]`, `[[atoms]]`, optional `bonds`
    /// (index pairs) and optional `box-lengths`.
    pub fn load(path: &Path) -> Result<Self, EnsembleError> {
        let content = std::fs::read_to_string(path).map_err(|e| EnsembleError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: EnsembleFile = toml::from_str(&content).map_err(|e| EnsembleError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut builder = Self::builder()
            .length_unit(&file.units.length)
            .time_unit(&file.units.time);
        if let Some(velocity) = &file.units.velocity {
            builder = builder.velocity_unit(velocity);
        }
        if let Some([x, y, z]) = file.box_lengths {
            builder = builder.box_lengths(Vector3::new(x, y, z));
        }
        for atom in &file.atoms {
            let [px, py, pz] = atom.position;
            let [vx, vy, vz] = atom.velocity;
            builder = builder.atom(
                atom.atomic_number,
                atom.molecule_id,
                Point3::new(px, py, pz),
                Vector3::new(vx, vy, vz),
            );
        }
        for [a, b] in &file.bonds {
            builder = builder.bond(*a, *b);
        }
        builder.build()
    }
}

#[derive(Default)]
pub struct StaticEnsembleBuilder {
    positions: Vec<Point3<f64>>,
    velocities: Vec<Vector3<f64>>,
    atomic_numbers: Vec<u8>,
    molecule_ids: Vec<i64>,
    bonds: Vec<(usize, usize)>,
    box_lengths: Option<Vector3<f64>>,
    length_unit: Option<String>,
    time_unit: Option<String>,
    velocity_unit: Option<String>,
}

impl StaticEnsembleBuilder {
    pub fn atom(
        mut self,
        atomic_number: u8,
        molecule_id: i64,
        position: Point3<f64>,
        velocity: Vector3<f64>,
    ) -> Self {
        self.atomic_numbers.push(atomic_number);
        self.molecule_ids.push(molecule_id);
        self.positions.push(position);
        self.velocities.push(velocity);
        self
    }
    pub fn bond(mut self, a: usize, b: usize) -> Self {
        self.bonds.push((a, b));
        self
    }
    pub fn box_lengths(mut self, lengths: Vector3<f64>) -> Self {
        self.box_lengths = Some(lengths);
        self
    }
    pub fn length_unit(mut self, label: &str) -> Self {
        self.length_unit = Some(label.to_string());
        self
    }
    pub fn time_unit(mut self, label: &str) -> Self {
        self.time_unit = Some(label.to_string());
        self
    }
    /// Defaults to length/time when not given.
    pub fn velocity_unit(mut self, label: &str) -> Self {
        self.velocity_unit = Some(label.to_string());
        self
    }

    pub fn build(self) -> Result<StaticEnsemble, EnsembleError> {
        let unit_length = Unit::parse_as(
            self.length_unit.as_deref().unwrap_or("Å"),
            Dimension::LENGTH,
            "length",
        )?;
        let unit_time = Unit::parse_as(
            self.time_unit.as_deref().unwrap_or("fs"),
            Dimension::TIME,
            "time",
        )?;
        let unit_velocity = match &self.velocity_unit {
            Some(label) => Unit::parse_as(label, Dimension::VELOCITY, "velocity")?,
            None => &unit_length / &unit_time,
        };
        let connectivity = Connectivity::from_pairs(self.positions.len(), self.bonds)?;

        let ensemble = StaticEnsemble {
            positions: self.positions,
            velocities: self.velocities,
            atomic_numbers: self.atomic_numbers,
            molecule_ids: self.molecule_ids,
            connectivity,
            box_lengths: self.box_lengths,
            unit_length,
            unit_time,
            unit_velocity,
        };
        validate(&ensemble)?;
        Ok(ensemble)
    }
}
