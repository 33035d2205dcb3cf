//! # Workflows Module
//!
//! Top-level entry points that tie the [`crate::core`] capabilities and the [`crate::engine`]
//! machinery into complete procedures.
//!
//! - **Simulation** ([`simulate`]) - Validates an ensemble and a force field, drives the
//!   integrator through step capture and packages the resulting trajectory.

pub mod simulate;
