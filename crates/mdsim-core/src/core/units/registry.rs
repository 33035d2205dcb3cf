use super::dimension::Dimension;
use phf::{Map, phf_map};
use std::f64::consts::PI;

/// Avogadro constant (exact, SI 2019).
pub const AVOGADRO_CONSTANT: f64 = 6.022_140_76e23;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDefinition {
    /// Size of one of this unit expressed in SI base units.
    pub scale: f64,
    pub dimension: Dimension,
}

const fn def(scale: f64, dimension: Dimension) -> UnitDefinition {
    UnitDefinition { scale, dimension }
}

// `mol` is the pure count N_A, so molar quantities resolve to per-particle ones.
static UNIT_SYMBOLS: Map<&'static str, UnitDefinition> = phf_map! {
    "1" => def(1.0, Dimension::DIMENSIONLESS),
    "m" => def(1.0, Dimension::LENGTH),
    "cm" => def(1.0e-2, Dimension::LENGTH),
    "mm" => def(1.0e-3, Dimension::LENGTH),
    "um" => def(1.0e-6, Dimension::LENGTH),
    "nm" => def(1.0e-9, Dimension::LENGTH),
    "Å" => def(1.0e-10, Dimension::LENGTH),
    "A" => def(1.0e-10, Dimension::LENGTH),
    "angstrom" => def(1.0e-10, Dimension::LENGTH),
    "pm" => def(1.0e-12, Dimension::LENGTH),
    "bohr" => def(5.291_772_109_03e-11, Dimension::LENGTH),
    "s" => def(1.0, Dimension::TIME),
    "ms" => def(1.0e-3, Dimension::TIME),
    "us" => def(1.0e-6, Dimension::TIME),
    "ns" => def(1.0e-9, Dimension::TIME),
    "ps" => def(1.0e-12, Dimension::TIME),
    "fs" => def(1.0e-15, Dimension::TIME),
    "as" => def(1.0e-18, Dimension::TIME),
    "kg" => def(1.0, Dimension::MASS),
    "g" => def(1.0e-3, Dimension::MASS),
    "Da" => def(1.660_539_066_60e-27, Dimension::MASS),
    "u" => def(1.660_539_066_60e-27, Dimension::MASS),
    "amu" => def(1.660_539_066_60e-27, Dimension::MASS),
    "J" => def(1.0, Dimension::ENERGY),
    "kJ" => def(1.0e3, Dimension::ENERGY),
    "cal" => def(4.184, Dimension::ENERGY),
    "kcal" => def(4.184e3, Dimension::ENERGY),
    "eV" => def(1.602_176_634e-19, Dimension::ENERGY),
    "Ha" => def(4.359_744_722_207_1e-18, Dimension::ENERGY),
    "hartree" => def(4.359_744_722_207_1e-18, Dimension::ENERGY),
    "K" => def(1.0, Dimension::TEMPERATURE),
    "mol" => def(AVOGADRO_CONSTANT, Dimension::DIMENSIONLESS),
    "rad" => def(1.0, Dimension::DIMENSIONLESS),
    "deg" => def(PI / 180.0, Dimension::DIMENSIONLESS),
};

pub fn lookup(symbol: &str) -> Option<&'static UnitDefinition> {
    UNIT_SYMBOLS.get(symbol)
}

pub fn known_symbols() -> impl Iterator<Item = &'static str> {
    UNIT_SYMBOLS.keys().copied()
}
