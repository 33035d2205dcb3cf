use super::capture::DiagnosticBuffers;
use crate::core::integrator::IntegrationSeries;
use crate::core::models::connectivity::Connectivity;
use crate::core::models::elements;
use crate::core::units::{Dimension, Unit, UnitError, boltzmann_constant};
use nalgebra::{DMatrix, DVector, Point3, Vector3};
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Trajectory field '{field}' has {found} entries, expected {expected}")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Atom {atom} has atomic number {atomic_number}, which has no tabulated mass")]
    UnknownElement { atom: usize, atomic_number: u8 },
    #[error("Unit error: {0}")]
    Unit(#[from] UnitError),
}

/// The units needed to interpret a trajectory's raw numbers, resolved and dimension-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryUnits {
    pub length: Unit,
    pub time: Unit,
    pub velocity: Unit,
    pub energy: Unit,
    pub angle: Unit,
}

impl TrajectoryUnits {
    pub fn new(
        length: Unit,
        time: Unit,
        velocity: Unit,
        energy: Unit,
        angle: Unit,
    ) -> Result<Self, UnitError> {
        Ok(Self {
            length: length.expect_dimension(Dimension::LENGTH, "length")?,
            time: time.expect_dimension(Dimension::TIME, "time")?,
            velocity: velocity.expect_dimension(Dimension::VELOCITY, "velocity")?,
            energy: energy.expect_dimension(Dimension::ENERGY, "energy")?,
            angle: angle.expect_dimension(Dimension::DIMENSIONLESS, "angle")?,
        })
    }

    pub fn from_labels(
        length: &str,
        time: &str,
        velocity: &str,
        energy: &str,
        angle: &str,
    ) -> Result<Self, UnitError> {
        Self::new(
            Unit::parse(length)?,
            Unit::parse(time)?,
            Unit::parse(velocity)?,
            Unit::parse(energy)?,
            Unit::parse(angle)?,
        )
    }
}

/// Everything a completed run hands over to become a [`Trajectory`].
#[derive(Debug, Clone)]
pub struct TrajectoryData {
    pub series: IntegrationSeries,
    pub atomic_numbers: Vec<u8>,
    pub molecule_ids: Vec<i64>,
    pub connectivity: Connectivity,
    pub diagnostics: DiagnosticBuffers,
    pub units: TrajectoryUnits,
}

/// Memoized derived quantities. Each slot is filled on first read and never again.
#[derive(Debug, Clone, Default)]
struct DerivedQuantityCache {
    unit_momentum: OnceLock<Unit>,
    speeds: OnceLock<DMatrix<f64>>,
    momenta: OnceLock<DMatrix<f64>>,
    kinetic_energy_per_atom: OnceLock<DMatrix<f64>>,
    kinetic_energy_total: OnceLock<DVector<f64>>,
    potential_energy_total: OnceLock<DVector<f64>>,
    total_energy: OnceLock<DVector<f64>>,
    temperature: OnceLock<DVector<f64>>,
    bond_lengths: OnceLock<DMatrix<f64>>,
}

/// Per-frame energy summary for export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyReport {
    pub frame: usize,
    pub time: f64,
    pub coulomb: f64,
    pub lennard_jones: f64,
    pub bond_vibration: f64,
    pub angle_vibration: f64,
    pub potential: f64,
    pub kinetic: f64,
    pub total: f64,
    pub temperature: f64,
}

/// The immutable record of one completed run, with lazily derived observables.
///
/// Frame-by-atom quantities are `frames × atoms` matrices; per-frame totals are vectors of
/// length `frames`. Derived quantities are computed on first access and the same cached value
/// is returned on every later access.
#[derive(Debug, Clone)]
pub struct Trajectory {
    positions: Vec<Vec<Point3<f64>>>,
    velocities: Vec<Vec<Vector3<f64>>>,
    timestamps: DVector<f64>,
    atomic_numbers: Vec<u8>,
    molecule_ids: Vec<i64>,
    connectivity: Connectivity,
    masses: DVector<f64>,
    diagnostics: DiagnosticBuffers,
    units: TrajectoryUnits,
    unit_mass: Unit,
    unit_temperature: Unit,
    /// Converts `mass_unit × velocity_unit²` into the energy unit.
    kinetic_energy_scale: f64,
    /// k_B in `energy_unit / K`.
    boltzmann: f64,
    cache: DerivedQuantityCache,
}

impl Trajectory {
    pub fn new(data: TrajectoryData) -> Result<Self, AnalysisError> {
        let TrajectoryData {
            series,
            atomic_numbers,
            molecule_ids,
            connectivity,
            diagnostics,
            units,
        } = data;

        let num_frames = series.timestamps.len();
        let num_atoms = atomic_numbers.len();
        let expect = |field: &'static str, expected: usize, found: usize| {
            if expected == found {
                Ok(())
            } else {
                Err(AnalysisError::ShapeMismatch {
                    field,
                    expected,
                    found,
                })
            }
        };
        expect("positions", num_frames, series.positions.len())?;
        expect("velocities", num_frames, series.velocities.len())?;
        expect("diagnostics", num_frames, diagnostics.capacity())?;
        expect("molecule_ids", num_atoms, molecule_ids.len())?;
        expect("connectivity", num_atoms, connectivity.num_atoms())?;
        for frame in &series.positions {
            expect("atoms per position frame", num_atoms, frame.len())?;
        }
        for frame in &series.velocities {
            expect("atoms per velocity frame", num_atoms, frame.len())?;
        }

        let masses = atomic_numbers
            .iter()
            .enumerate()
            .map(|(atom, &z)| {
                elements::mass_of(z).ok_or(AnalysisError::UnknownElement {
                    atom,
                    atomic_number: z,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let unit_mass = Unit::dalton();
        let unit_temperature = Unit::kelvin();
        let kinetic_energy_scale =
            (&unit_mass * &units.velocity.powi(2)).conversion_factor(&units.energy)?;
        let boltzmann = boltzmann_constant()
            .convert_to(&(&units.energy / &unit_temperature))?
            .value;

        Ok(Self {
            positions: series.positions,
            velocities: series.velocities,
            timestamps: DVector::from_vec(series.timestamps),
            atomic_numbers,
            molecule_ids,
            connectivity,
            masses: DVector::from_vec(masses),
            diagnostics,
            units,
            unit_mass,
            unit_temperature,
            kinetic_energy_scale,
            boltzmann,
            cache: DerivedQuantityCache::default(),
        })
    }

    pub fn num_frames(&self) -> usize {
        self.timestamps.len()
    }

    pub fn num_atoms(&self) -> usize {
        self.atomic_numbers.len()
    }

    pub fn num_molecules(&self) -> usize {
        self.diagnostics.num_molecules()
    }

    pub fn positions(&self) -> &[Vec<Point3<f64>>] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec<Vector3<f64>>] {
        &self.velocities
    }

    pub fn timestamps(&self) -> &DVector<f64> {
        &self.timestamps
    }

    pub fn atomic_numbers(&self) -> &[u8] {
        &self.atomic_numbers
    }

    pub fn molecule_ids(&self) -> &[i64] {
        &self.molecule_ids
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Per-atom masses in [`Trajectory::unit_mass`].
    pub fn masses(&self) -> &DVector<f64> {
        &self.masses
    }

    pub fn diagnostics(&self) -> &DiagnosticBuffers {
        &self.diagnostics
    }

    pub fn energy_coulomb(&self) -> &DVector<f64> {
        self.diagnostics.coulomb()
    }

    pub fn energy_lennard_jones(&self) -> &DVector<f64> {
        self.diagnostics.lennard_jones()
    }

    pub fn energy_bond_vibration(&self) -> &DVector<f64> {
        self.diagnostics.bond_vibration()
    }

    pub fn energy_angle_vibration(&self) -> &DVector<f64> {
        self.diagnostics.angle_vibration()
    }

    pub fn bond_angles(&self) -> &DMatrix<f64> {
        self.diagnostics.bond_angles()
    }

    pub fn distances(&self) -> &[DMatrix<f64>] {
        self.diagnostics.distances()
    }

    pub fn units(&self) -> &TrajectoryUnits {
        &self.units
    }

    pub fn unit_length(&self) -> &Unit {
        &self.units.length
    }

    pub fn unit_time(&self) -> &Unit {
        &self.units.time
    }

    pub fn unit_velocity(&self) -> &Unit {
        &self.units.velocity
    }

    pub fn unit_energy(&self) -> &Unit {
        &self.units.energy
    }

    pub fn unit_angle(&self) -> &Unit {
        &self.units.angle
    }

    pub fn unit_mass(&self) -> &Unit {
        &self.unit_mass
    }

    pub fn unit_temperature(&self) -> &Unit {
        &self.unit_temperature
    }

    pub fn unit_momentum(&self) -> &Unit {
        self.cache
            .unit_momentum
            .get_or_init(|| &self.unit_mass * &self.units.velocity)
    }

    /// `‖v‖` per frame and atom, in the velocity unit.
    pub fn speeds(&self) -> &DMatrix<f64> {
        self.cache.speeds.get_or_init(|| {
            DMatrix::from_fn(self.num_frames(), self.num_atoms(), |frame, atom| {
                self.velocities[frame][atom].norm()
            })
        })
    }

    /// `m·‖v‖` per frame and atom, in [`Trajectory::unit_momentum`].
    pub fn momenta(&self) -> &DMatrix<f64> {
        self.cache.momenta.get_or_init(|| {
            let mut momenta = self.speeds().clone();
            for (mut column, &mass) in momenta.column_iter_mut().zip(self.masses.iter()) {
                column *= mass;
            }
            momenta
        })
    }

    /// `½·p·‖v‖` per frame and atom, in the energy unit.
    pub fn kinetic_energy_per_atom(&self) -> &DMatrix<f64> {
        self.cache.kinetic_energy_per_atom.get_or_init(|| {
            self.momenta()
                .component_mul(self.speeds())
                .scale(0.5 * self.kinetic_energy_scale)
        })
    }

    pub fn kinetic_energy_total(&self) -> &DVector<f64> {
        self.cache
            .kinetic_energy_total
            .get_or_init(|| self.kinetic_energy_per_atom().column_sum())
    }

    pub fn potential_energy_total(&self) -> &DVector<f64> {
        self.cache.potential_energy_total.get_or_init(|| {
            self.diagnostics.coulomb()
                + self.diagnostics.lennard_jones()
                + self.diagnostics.bond_vibration()
                + self.diagnostics.angle_vibration()
        })
    }

    pub fn total_energy(&self) -> &DVector<f64> {
        self.cache
            .total_energy
            .get_or_init(|| self.kinetic_energy_total() + self.potential_energy_total())
    }

    /// Instantaneous kinetic temperature `⟨E_kin⟩_atoms / (3/2·k_B)`, in kelvin.
    pub fn temperature(&self) -> &DVector<f64> {
        self.cache.temperature.get_or_init(|| {
            if self.num_atoms() == 0 {
                return DVector::zeros(self.num_frames());
            }
            self.kinetic_energy_per_atom()
                .column_mean()
                .scale(1.0 / (1.5 * self.boltzmann))
        })
    }

    /// Distance between the two atoms of each bond, `frames × bonds`, in bond order of
    /// [`Connectivity::bonds`].
    pub fn bond_lengths(&self) -> &DMatrix<f64> {
        self.cache.bond_lengths.get_or_init(|| {
            let bonds = self.connectivity.bonds();
            DMatrix::from_fn(self.num_frames(), bonds.len(), |frame, bond| {
                let (a, b) = bonds[bond];
                (self.positions[frame][b] - self.positions[frame][a]).norm()
            })
        })
    }

    pub fn energy_report(&self) -> Vec<EnergyReport> {
        let potential = self.potential_energy_total();
        let kinetic = self.kinetic_energy_total();
        let total = self.total_energy();
        let temperature = self.temperature();
        (0..self.num_frames())
            .map(|frame| EnergyReport {
                frame,
                time: self.timestamps[frame],
                coulomb: self.diagnostics.coulomb()[frame],
                lennard_jones: self.diagnostics.lennard_jones()[frame],
                bond_vibration: self.diagnostics.bond_vibration()[frame],
                angle_vibration: self.diagnostics.angle_vibration()[frame],
                potential: potential[frame],
                kinetic: kinetic[frame],
                total: total[frame],
                temperature: temperature[frame],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md_units() -> TrajectoryUnits {
        TrajectoryUnits::from_labels("Å", "fs", "Å/fs", "kJ/mol", "rad").unwrap()
    }

    /// Two hydrogens and one oxygen moving along x with a per-frame velocity scale.
    fn build(velocity_scales: &[f64], units: TrajectoryUnits) -> Trajectory {
        let frames = velocity_scales.len();
        let base_positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let series = IntegrationSeries {
            positions: (0..frames)
                .map(|f| {
                    base_positions
                        .iter()
                        .map(|p| Point3::new(p.x * (f + 1) as f64, p.y * (f + 1) as f64, 0.0))
                        .collect()
                })
                .collect(),
            velocities: velocity_scales
                .iter()
                .map(|&s| {
                    vec![
                        Vector3::new(0.0, 0.0, 0.0),
                        Vector3::new(3.0 * s, 4.0 * s, 0.0),
                        Vector3::new(0.0, 0.0, s),
                    ]
                })
                .collect(),
            timestamps: (0..frames).map(|f| f as f64).collect(),
        };
        let mut diagnostics = DiagnosticBuffers::allocate(frames.saturating_sub(1), 3, 1);
        if frames == 0 {
            diagnostics = DiagnosticBuffers {
                coulomb: DVector::zeros(0),
                lennard_jones: DVector::zeros(0),
                bond_vibration: DVector::zeros(0),
                angle_vibration: DVector::zeros(0),
                bond_angles: DMatrix::zeros(0, 1),
                distances: Vec::new(),
            };
        }
        Trajectory::new(TrajectoryData {
            series,
            atomic_numbers: vec![8, 1, 1],
            molecule_ids: vec![0, 0, 0],
            connectivity: Connectivity::from_pairs(3, [(0, 1), (0, 2)]).unwrap(),
            diagnostics,
            units,
        })
        .unwrap()
    }

    #[test]
    fn speeds_are_euclidean_norms() {
        let traj = build(&[1.0, 2.0], md_units());
        let speeds = traj.speeds();
        assert_eq!(speeds.shape(), (2, 3));
        assert_eq!(speeds[(0, 1)], 5.0);
        assert_eq!(speeds[(1, 1)], 10.0);
        assert_eq!(speeds[(1, 2)], 2.0);
        assert_eq!(speeds[(0, 0)], 0.0);
    }

    #[test]
    fn momenta_scale_speeds_by_element_mass() {
        let traj = build(&[1.0], md_units());
        assert_eq!(traj.masses().as_slice(), &[15.999, 1.008, 1.008]);
        assert_eq!(traj.momenta()[(0, 1)], 1.008 * 5.0);
        assert_eq!(traj.unit_momentum().dimension(), Dimension::new(1, 1, -1, 0));
    }

    #[test]
    fn kinetic_energy_is_converted_into_the_energy_unit() {
        let traj = build(&[1.0], md_units());
        // ½·1.008 Da·(5 Å/fs)² = 12.6 Da·Å²/fs² = 1.26e5 kJ/mol
        let expected = 0.5 * 1.008 * 25.0 * 1.0e4;
        let ke = traj.kinetic_energy_per_atom()[(0, 1)];
        assert!((ke - expected).abs() / expected < 1e-8);

        let expected_total: f64 = traj.kinetic_energy_per_atom().row(0).iter().sum();
        assert!((traj.kinetic_energy_total()[0] - expected_total).abs() < 1e-9 * expected_total);
    }

    #[test]
    fn potential_and_total_energy_are_exact_sums() {
        let mut traj = build(&[1.0, 0.5, 0.0], md_units());
        traj.diagnostics.coulomb = DVector::from_vec(vec![1.0, -2.5, 0.125]);
        traj.diagnostics.lennard_jones = DVector::from_vec(vec![0.5, 0.25, 3.0]);
        traj.diagnostics.bond_vibration = DVector::from_vec(vec![0.1, 0.2, 0.3]);
        traj.diagnostics.angle_vibration = DVector::from_vec(vec![7.0, 8.0, 9.0]);

        let pe = traj.potential_energy_total();
        let ke = traj.kinetic_energy_total();
        let total = traj.total_energy();
        for i in 0..3 {
            let d = &traj.diagnostics;
            assert_eq!(
                pe[i],
                d.coulomb[i] + d.lennard_jones[i] + d.bond_vibration[i] + d.angle_vibration[i]
            );
            assert_eq!(total[i], ke[i] + pe[i]);
        }
    }

    #[test]
    fn temperature_uses_boltzmann_constant_in_energy_unit() {
        let kj = build(&[1.0], md_units());
        let kcal = build(
            &[1.0],
            TrajectoryUnits::from_labels("Å", "fs", "Å/fs", "kcal/mol", "rad").unwrap(),
        );
        let k_b = 8.314_462_618e-3; // kJ/(mol·K)
        let mean_ke: f64 = kj.kinetic_energy_per_atom().row(0).iter().sum::<f64>() / 3.0;
        let expected = mean_ke / (1.5 * k_b);
        assert!((kj.temperature()[0] - expected).abs() / expected < 1e-8);
        // Temperature does not depend on the energy unit chosen.
        assert!((kj.temperature()[0] - kcal.temperature()[0]).abs() / expected < 1e-8);
    }

    #[test]
    fn zero_velocity_gives_zero_temperature() {
        let traj = build(&[0.0, 0.0], md_units());
        assert!(traj.kinetic_energy_total().iter().all(|&e| e == 0.0));
        assert!(traj.temperature().iter().all(|&t| t == 0.0));
    }

    #[test]
    fn bond_lengths_follow_connectivity_order() {
        let traj = build(&[1.0, 1.0], md_units());
        let lengths = traj.bond_lengths();
        assert_eq!(lengths.shape(), (2, 2));
        assert_eq!(lengths[(0, 0)], 1.0);
        assert_eq!(lengths[(0, 1)], 2.0);
        assert_eq!(lengths[(1, 0)], 2.0);
        assert_eq!(lengths[(1, 1)], 4.0);
    }

    #[test]
    fn derived_quantities_are_computed_once_and_cached() {
        let traj = build(&[1.0, 2.0], md_units());
        let first = traj.temperature();
        let second = traj.temperature();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first, second);
        assert!(std::ptr::eq(traj.speeds(), traj.speeds()));
        assert!(std::ptr::eq(traj.total_energy(), traj.total_energy()));
        assert!(std::ptr::eq(traj.unit_momentum(), traj.unit_momentum()));
        assert!(std::ptr::eq(traj.bond_lengths(), traj.bond_lengths()));
    }

    #[test]
    fn empty_trajectory_yields_empty_results() {
        let traj = build(&[], md_units());
        assert_eq!(traj.num_frames(), 0);
        assert_eq!(traj.speeds().shape(), (0, 3));
        assert_eq!(traj.kinetic_energy_total().len(), 0);
        assert_eq!(traj.temperature().len(), 0);
        assert!(traj.energy_report().is_empty());
    }

    #[test]
    fn energy_report_has_one_row_per_frame() {
        let traj = build(&[1.0, 0.0], md_units());
        let report = traj.energy_report();
        assert_eq!(report.len(), 2);
        assert_eq!(report[1].frame, 1);
        assert_eq!(report[1].time, 1.0);
        assert_eq!(report[1].kinetic, 0.0);
        assert_eq!(report[0].total, traj.total_energy()[0]);
    }

    #[test]
    fn construction_rejects_misaligned_series_and_bad_units() {
        let series = IntegrationSeries {
            positions: vec![vec![Point3::origin()]; 2],
            velocities: vec![vec![Vector3::zeros()]; 2],
            timestamps: vec![0.0, 1.0],
        };
        let data = TrajectoryData {
            series,
            atomic_numbers: vec![1],
            molecule_ids: vec![0],
            connectivity: Connectivity::empty(1),
            diagnostics: DiagnosticBuffers::allocate(2, 1, 1),
            units: md_units(),
        };
        assert!(matches!(
            Trajectory::new(data),
            Err(AnalysisError::ShapeMismatch { field: "diagnostics", expected: 2, found: 3 })
        ));

        let units = TrajectoryUnits::from_labels("Å", "fs", "Å/fs", "Å", "rad");
        assert!(matches!(units, Err(UnitError::UnexpectedDimension { role: "energy", .. })));
    }
}
