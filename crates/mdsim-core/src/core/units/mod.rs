//! # Units Module
//!
//! Physical-unit bookkeeping for trajectories and force-field fitting.
//!
//! Unit labels (`"Å"`, `"fs"`, `"kcal/mol"`, `"Å.fs^-1"`) are resolved once into a [`Unit`],
//! which carries its SI scale and [`Dimension`]. Units compose through `*`, `/` and
//! [`Unit::powi`], and values move between compatible units with [`Quantity::convert_to`].
//! Amounts of substance are treated as plain counts (`mol` = N_A), so molar energies resolve to
//! per-particle energies and mix freely with masses given in daltons.

pub mod constants;
pub mod dimension;
pub mod registry;
pub mod unit;

pub use constants::{BOLTZMANN_CONSTANT_SI, boltzmann_constant};
pub use dimension::Dimension;
pub use registry::AVOGADRO_CONSTANT;
pub use unit::{Quantity, Unit, UnitError};
