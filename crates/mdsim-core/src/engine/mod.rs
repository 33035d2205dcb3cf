//! # Engine Module
//!
//! The stateful machinery behind one molecular-dynamics run.
//!
//! ## Overview
//!
//! The engine owns everything that has to stay consistent while the integrator advances the
//! system: the diagnostic buffers filled during the run, the cursor that keeps them aligned with
//! the integrator's steps, and the immutable trajectory handed out afterwards together with its
//! lazily derived observables.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Step count, step size and boundary mode for one run
//! - **Step Capture** ([`capture`]) - The force callback wrapper and its pre-sized buffers
//! - **Trajectory** ([`trajectory`]) - The run record and its memoized derived quantities
//! - **Progress Monitoring** ([`progress`]) - Phase and per-step progress events
//! - **Error Handling** ([`error`]) - Driver-level error kinds

pub mod capture;
pub mod config;
pub mod error;
pub mod progress;
pub mod trajectory;
