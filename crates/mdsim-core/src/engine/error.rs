use thiserror::Error;

use super::config::ConfigError;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("{collaborator} does not satisfy its contract: {reason}")]
    InvalidCollaborator {
        collaborator: &'static str,
        reason: String,
    },

    #[error("Simulation has not been run yet")]
    NotYetRun,

    #[error("Simulation has already been run; create a new driver for another run")]
    AlreadyRun,

    #[error(
        "Integrator requested force evaluation {attempted} but only {capacity} were allocated"
    )]
    StepOverflow { capacity: usize, attempted: usize },

    #[error("Run failed during {phase}: {source}")]
    RunFailure {
        phase: &'static str,
        #[source]
        source: BoxedError,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl SimulationError {
    pub(crate) fn run_failure(phase: &'static str, source: impl Into<BoxedError>) -> Self {
        Self::RunFailure {
            phase,
            source: source.into(),
        }
    }
}
