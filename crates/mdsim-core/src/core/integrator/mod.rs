//! # Integrator Module
//!
//! The time-stepping capability consumed by the simulation driver. An [`Integrator`] owns the
//! numerics and the step count; it sees the force function only as an opaque callable that maps
//! `(positions, time)` to accelerations.

pub mod verlet;

use nalgebra::{Point3, Vector3};
use thiserror::Error;

pub use verlet::VelocityVerlet;

#[derive(Debug, Error)]
pub enum IntegrationError<E> {
    #[error("Step function failed at evaluation {evaluation}: {source}")]
    Step {
        evaluation: usize,
        #[source]
        source: E,
    },
    #[error("Step function returned {found} accelerations for {expected} atoms")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("Invalid integration input: {0}")]
    InvalidInput(String),
}

/// Full time series produced by one integration: `step_count + 1` frames each.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntegrationSeries {
    pub positions: Vec<Vec<Point3<f64>>>,
    pub velocities: Vec<Vec<Vector3<f64>>>,
    pub timestamps: Vec<f64>,
}

impl IntegrationSeries {
    pub fn num_frames(&self) -> usize {
        self.timestamps.len()
    }
}

pub trait Integrator {
    /// Advances `initial_positions`/`initial_velocities` by `step_count` steps of `step_size`.
    ///
    /// Implementations call `step_function` exactly `step_count + 1` times, once for the
    /// initial state and once per produced state, in order, and stop at its first error.
    fn integrate<F, E>(
        &self,
        step_function: F,
        initial_positions: &[Point3<f64>],
        initial_velocities: &[Vector3<f64>],
        step_size: f64,
        step_count: usize,
    ) -> Result<IntegrationSeries, IntegrationError<E>>
    where
        F: FnMut(&[Point3<f64>], f64) -> Result<Vec<Vector3<f64>>, E>;
}
