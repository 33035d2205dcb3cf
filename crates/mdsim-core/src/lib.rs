//! # mdsim Core Library
//!
//! A small molecular-dynamics driver: it runs a pluggable integrator over an atomic ensemble
//! with a pluggable force field, keeps per-step force-field diagnostics aligned with the
//! integrator's steps, and derives physical observables from the resulting trajectory with
//! explicit unit bookkeeping.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Stateless pieces: the unit system, element data,
//!   connectivity, and the `Ensemble`, `ForceField` and `Integrator` capability traits with
//!   reference implementations.
//!
//! - **[`engine`]: The Logic Core.** Step capture with pre-sized diagnostic buffers, run
//!   configuration, progress events and the `Trajectory` with its derived-quantity cache.
//!
//! - **[`workflows`]: The Public API.** The `Simulation` driver that validates collaborators,
//!   runs the integrator once and hands out the trajectory.

pub mod core;
pub mod engine;
pub mod workflows;
