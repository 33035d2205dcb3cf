use crate::core::forcefield::{ForceField, SystemShape};
use crate::core::integrator::{Integrator, VelocityVerlet};
use crate::core::models::ensemble::{self, Ensemble};
use crate::core::units::Dimension;
use crate::engine::capture::{CaptureError, DiagnosticBuffers, StepCapture};
use crate::engine::config::SimulationConfig;
use crate::engine::error::SimulationError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::trajectory::{Trajectory, TrajectoryData, TrajectoryUnits};
use tracing::{debug, info, instrument};

/// Drives one molecular-dynamics run.
///
/// The driver owns its force field for the lifetime of the run and may run at most once. After a
/// successful [`Simulation::run`] the trajectory is available through
/// [`Simulation::trajectory`]; before that, or after a failed run, it is not.
#[derive(Debug)]
pub struct Simulation<F, E, I = VelocityVerlet>
where
    F: ForceField,
    E: Ensemble,
    I: Integrator,
{
    forcefield: F,
    ensemble: E,
    integrator: I,
    attempted: bool,
    trajectory: Option<Trajectory>,
}

impl<F: ForceField, E: Ensemble> Simulation<F, E, VelocityVerlet> {
    pub fn new(forcefield: F, ensemble: E) -> Result<Self, SimulationError> {
        Self::with_integrator(forcefield, ensemble, VelocityVerlet)
    }
}

impl<F: ForceField, E: Ensemble, I: Integrator> Simulation<F, E, I> {
    /// Validates the collaborators eagerly; nothing is evaluated until [`Simulation::run`].
    pub fn with_integrator(
        forcefield: F,
        ensemble: E,
        integrator: I,
    ) -> Result<Self, SimulationError> {
        ensemble::validate(&ensemble).map_err(|e| SimulationError::InvalidCollaborator {
            collaborator: "ensemble",
            reason: e.to_string(),
        })?;

        let forcefield_contract = |reason: String| SimulationError::InvalidCollaborator {
            collaborator: "force field",
            reason,
        };
        if forcefield.unit_energy().dimension() != Dimension::ENERGY {
            return Err(forcefield_contract(format!(
                "energy unit '{}' does not measure energy",
                forcefield.unit_energy()
            )));
        }
        if !forcefield.unit_angle().dimension().is_dimensionless() {
            return Err(forcefield_contract(format!(
                "angle unit '{}' is not dimensionless",
                forcefield.unit_angle()
            )));
        }

        debug!(
            num_atoms = ensemble.num_atoms(),
            num_molecules = ensemble.num_molecules(),
            "Simulation collaborators validated."
        );
        Ok(Self {
            forcefield,
            ensemble,
            integrator,
            attempted: false,
            trajectory: None,
        })
    }

    pub fn ensemble(&self) -> &E {
        &self.ensemble
    }

    pub fn forcefield(&self) -> &F {
        &self.forcefield
    }

    pub fn integrator(&self) -> &I {
        &self.integrator
    }

    pub fn has_run(&self) -> bool {
        self.trajectory.is_some()
    }

    pub fn trajectory(&self) -> Result<&Trajectory, SimulationError> {
        self.trajectory.as_ref().ok_or(SimulationError::NotYetRun)
    }

    pub fn into_trajectory(self) -> Result<Trajectory, SimulationError> {
        self.trajectory.ok_or(SimulationError::NotYetRun)
    }

    /// Runs the integrator for `config.step_count` steps and stores the resulting trajectory.
    ///
    /// Once the force field has been touched the driver is spent: a second call, even after a
    /// failure, returns [`SimulationError::AlreadyRun`].
    #[instrument(skip_all, name = "simulation_workflow")]
    pub fn run(
        &mut self,
        config: &SimulationConfig,
        reporter: &ProgressReporter,
    ) -> Result<&Trajectory, SimulationError> {
        if self.attempted {
            return Err(SimulationError::AlreadyRun);
        }
        config.validate()?;
        let periodic_box = if config.periodic {
            Some(self.ensemble.box_lengths().ok_or_else(|| {
                SimulationError::InvalidCollaborator {
                    collaborator: "ensemble",
                    reason: "periodic run requested but no box lengths are defined".to_string(),
                }
            })?)
        } else {
            None
        };
        self.attempted = true;

        info!(
            step_count = config.step_count,
            step_size = config.step_size,
            periodic = config.periodic,
            "Starting simulation run."
        );

        // === Phase 1: Buffers and force-field preparation ===
        let shape = SystemShape {
            num_atoms: self.ensemble.num_atoms(),
            num_molecules: self.ensemble.num_molecules(),
        };
        let buffers = reporter.phase(
            "Preparation",
            || -> Result<DiagnosticBuffers, SimulationError> {
                let buffers = DiagnosticBuffers::allocate(
                    config.step_count,
                    shape.num_atoms,
                    shape.num_molecules,
                );
                self.forcefield
                    .initialize(shape, periodic_box)
                    .map_err(|e| SimulationError::run_failure("force-field initialization", e))?;
                self.forcefield
                    .fit_units(self.ensemble.unit_length(), self.ensemble.unit_time())
                    .map_err(|e| SimulationError::run_failure("unit fitting", e))?;
                debug!(
                    slots = buffers.capacity(),
                    length = %self.ensemble.unit_length(),
                    time = %self.ensemble.unit_time(),
                    "Force field initialized and fitted to ensemble units."
                );
                Ok(buffers)
            },
        )?;

        // === Phase 2: Integration through step capture ===
        let (series, diagnostics) = reporter.phase("Integration", || {
            reporter.report(Progress::TaskStart {
                total_steps: config.num_frames() as u64,
            });
            let mut capture = StepCapture::new(&mut self.forcefield, buffers, reporter);
            let outcome = self.integrator.integrate(
                |positions, time| capture.capture(positions, time),
                self.ensemble.positions(),
                self.ensemble.velocities(),
                config.step_size,
                config.step_count,
            );
            let written = capture.cursor();
            let result = match (outcome, capture.finish()) {
                (_, Err(CaptureError::StepOverflow { capacity, attempted })) => {
                    Err(SimulationError::StepOverflow {
                        capacity,
                        attempted,
                    })
                }
                (Err(e), _) => Err(SimulationError::run_failure("integration", e)),
                (Ok(_), Err(e)) => Err(SimulationError::run_failure("integration", e)),
                (Ok(series), Ok(diagnostics)) => Ok((series, diagnostics)),
            };
            reporter.report(Progress::TaskFinish);
            if let Ok((series, _)) = &result {
                reporter.report(Progress::Message(format!(
                    "Captured {written} force evaluations into {} frames.",
                    series.num_frames()
                )));
            }
            debug!(evaluations = written, "Integration loop finished.");
            result
        })?;

        // === Phase 3: Package the trajectory ===
        let trajectory = reporter.phase("Packaging", || -> Result<Trajectory, SimulationError> {
            let units = TrajectoryUnits::new(
                self.ensemble.unit_length().clone(),
                self.ensemble.unit_time().clone(),
                self.ensemble.unit_velocity().clone(),
                self.forcefield.unit_energy().clone(),
                self.forcefield.unit_angle().clone(),
            )
            .map_err(|e| SimulationError::run_failure("packaging", e))?;
            Trajectory::new(TrajectoryData {
                series,
                atomic_numbers: self.ensemble.atomic_numbers().to_vec(),
                molecule_ids: self.ensemble.molecule_ids().to_vec(),
                connectivity: self.ensemble.connectivity().clone(),
                diagnostics,
                units,
            })
            .map_err(|e| SimulationError::run_failure("packaging", e))
        })?;

        info!(
            frames = trajectory.num_frames(),
            atoms = trajectory.num_atoms(),
            "Simulation run complete."
        );
        Ok(&*self.trajectory.insert(trajectory))
    }
}
