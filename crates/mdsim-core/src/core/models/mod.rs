//! # Core Models Module
//!
//! Static description of the system being simulated.
//!
//! - [`elements`] - Element property table (symbol and standard atomic mass by atomic number)
//! - [`connectivity`] - The bonded relation, one entry per unordered atom pair
//! - [`ensemble`] - The [`ensemble::Ensemble`] capability consumed by the simulation driver,
//!   plus an in-memory implementation that can be built in code or loaded from TOML

pub mod connectivity;
pub mod elements;
pub mod ensemble;
