use super::dimension::Dimension;
use super::registry;
use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitError {
    #[error("Empty unit label")]
    Empty,
    #[error("Unknown unit symbol '{0}'")]
    UnknownSymbol(String),
    #[error("Malformed unit term '{0}'")]
    MalformedTerm(String),
    #[error("Exponent out of range in unit '{0}'")]
    ExponentOverflow(String),
    #[error("Cannot convert '{from}' [{from_dim}] to '{to}' [{to_dim}]: incompatible dimensions")]
    Incompatible {
        from: String,
        to: String,
        from_dim: Dimension,
        to_dim: Dimension,
    },
    #[error("Unit '{label}' for {role} has dimension [{found}], expected [{expected}]")]
    UnexpectedDimension {
        label: String,
        role: &'static str,
        expected: Dimension,
        found: Dimension,
    },
}

/// A resolved physical unit: a display symbol, its size in SI base units and its dimension.
///
/// Labels are parsed once into a `Unit`; all later arithmetic and conversions work on the
/// resolved scale and dimension, never on the label text.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    symbol: String,
    scale: f64,
    dimension: Dimension,
}

impl Unit {
    pub fn new(symbol: impl Into<String>, scale: f64, dimension: Dimension) -> Self {
        Self {
            symbol: symbol.into(),
            scale,
            dimension,
        }
    }

    /// Parses a label such as `Å`, `kcal/mol`, `Å.fs^-1` or `Da*Å^2/fs^2`.
    ///
    /// Terms are joined by `.` or `*` (multiply) and `/` (divide the following term only);
    /// each term may carry an integer exponent written as `^n`.
    pub fn parse(label: &str) -> Result<Self, UnitError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(UnitError::Empty);
        }

        let mut scale = 1.0;
        let mut dimension = Dimension::DIMENSIONLESS;
        let mut invert_next = false;
        let mut term = String::new();

        let mut apply = |term: &str, invert: bool| -> Result<(), UnitError> {
            let (symbol, exponent) = split_exponent(term)?;
            let definition =
                registry::lookup(symbol).ok_or_else(|| UnitError::UnknownSymbol(symbol.into()))?;
            let overflow = || UnitError::ExponentOverflow(label.to_string());
            let exponent = if invert {
                exponent.checked_neg().ok_or_else(overflow)?
            } else {
                exponent
            };
            dimension = definition
                .dimension
                .checked_powi(exponent)
                .and_then(|term_dimension| dimension.checked_mul(term_dimension))
                .ok_or_else(overflow)?;
            scale *= definition.scale.powi(exponent as i32);
            Ok(())
        };

        for c in label.chars() {
            match c {
                '.' | '*' | '/' => {
                    if term.trim().is_empty() {
                        return Err(UnitError::MalformedTerm(label.to_string()));
                    }
                    apply(term.trim(), invert_next)?;
                    term.clear();
                    invert_next = c == '/';
                }
                _ => term.push(c),
            }
        }
        if term.trim().is_empty() {
            return Err(UnitError::MalformedTerm(label.to_string()));
        }
        apply(term.trim(), invert_next)?;
        if !scale.is_finite() || scale == 0.0 {
            return Err(UnitError::ExponentOverflow(label.to_string()));
        }

        Ok(Self {
            symbol: label.to_string(),
            scale,
            dimension,
        })
    }

    /// Parses a label and checks that it measures the expected kind of quantity.
    pub fn parse_as(
        label: &str,
        expected: Dimension,
        role: &'static str,
    ) -> Result<Self, UnitError> {
        Self::parse(label)?.expect_dimension(expected, role)
    }

    pub fn expect_dimension(
        self,
        expected: Dimension,
        role: &'static str,
    ) -> Result<Self, UnitError> {
        if self.dimension == expected {
            Ok(self)
        } else {
            Err(UnitError::UnexpectedDimension {
                label: self.symbol,
                role,
                expected,
                found: self.dimension,
            })
        }
    }

    pub fn kelvin() -> Self {
        Self::new("K", 1.0, Dimension::TEMPERATURE)
    }

    pub fn dalton() -> Self {
        Self::new("Da", 1.660_539_066_60e-27, Dimension::MASS)
    }

    pub fn radian() -> Self {
        Self::new("rad", 1.0, Dimension::DIMENSIONLESS)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn is_compatible_with(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// Factor `f` such that a value `x` in `self` equals `x * f` in `target`.
    pub fn conversion_factor(&self, target: &Unit) -> Result<f64, UnitError> {
        if !self.is_compatible_with(target) {
            return Err(UnitError::Incompatible {
                from: self.symbol.clone(),
                to: target.symbol.clone(),
                from_dim: self.dimension,
                to_dim: target.dimension,
            });
        }
        Ok(self.scale / target.scale)
    }

    pub fn powi(&self, exponent: i8) -> Self {
        let symbol = if exponent == 1 {
            self.symbol.clone()
        } else {
            format!("{}^{}", grouped(&self.symbol, true), exponent)
        };
        Self {
            symbol,
            scale: self.scale.powi(exponent as i32),
            dimension: self.dimension.powi(exponent),
        }
    }
}

fn split_exponent(term: &str) -> Result<(&str, i8), UnitError> {
    match term.split_once('^') {
        None => Ok((term, 1)),
        Some((symbol, exponent)) => {
            let exponent = exponent
                .trim()
                .parse::<i8>()
                .map_err(|_| UnitError::MalformedTerm(term.to_string()))?;
            let symbol = symbol.trim();
            if symbol.is_empty() {
                return Err(UnitError::MalformedTerm(term.to_string()));
            }
            Ok((symbol, exponent))
        }
    }
}

/// Wraps a compound symbol in parentheses when it is used as a single operand.
fn grouped(symbol: &str, wrap_powers: bool) -> String {
    let mut depth = 0usize;
    let needs_group = symbol.chars().any(|c| match c {
        '(' => {
            depth += 1;
            false
        }
        ')' => {
            depth = depth.saturating_sub(1);
            false
        }
        '.' | '*' | '/' => depth == 0,
        '^' => wrap_powers && depth == 0,
        _ => false,
    });
    if needs_group {
        format!("({symbol})")
    } else {
        symbol.to_string()
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl Mul for &Unit {
    type Output = Unit;

    fn mul(self, rhs: &Unit) -> Unit {
        Unit {
            symbol: format!("{}.{}", self.symbol, grouped(&rhs.symbol, false)),
            scale: self.scale * rhs.scale,
            dimension: self.dimension * rhs.dimension,
        }
    }
}

impl Div for &Unit {
    type Output = Unit;

    fn div(self, rhs: &Unit) -> Unit {
        Unit {
            symbol: format!("{}/{}", self.symbol, grouped(&rhs.symbol, false)),
            scale: self.scale / rhs.scale,
            dimension: self.dimension / rhs.dimension,
        }
    }
}

impl Mul for Unit {
    type Output = Unit;

    fn mul(self, rhs: Unit) -> Unit {
        &self * &rhs
    }
}

impl Div for Unit {
    type Output = Unit;

    fn div(self, rhs: Unit) -> Unit {
        &self / &rhs
    }
}

/// A numeric value attached to a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn convert_to(&self, target: &Unit) -> Result<Quantity, UnitError> {
        let factor = self.unit.conversion_factor(target)?;
        Ok(Quantity {
            value: self.value * factor,
            unit: target.clone(),
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, rel: f64) {
        assert!(
            ((a - b) / b).abs() < rel,
            "expected {b}, got {a} (relative tolerance {rel})"
        );
    }

    #[test]
    fn parse_simple_symbol() {
        let unit = Unit::parse("nm").unwrap();
        assert_eq!(unit.dimension(), Dimension::LENGTH);
        assert_eq!(unit.scale(), 1.0e-9);
        assert_eq!(unit.symbol(), "nm");
    }

    #[test]
    fn parse_compound_with_dot_and_negative_exponent() {
        let unit = Unit::parse("Å.fs^-1").unwrap();
        assert_eq!(unit.dimension(), Dimension::VELOCITY);
        assert_close(unit.scale(), 1.0e5, 1e-12);
    }

    #[test]
    fn parse_division_applies_to_following_term_only() {
        let unit = Unit::parse("kcal/mol/K").unwrap();
        assert_eq!(unit.dimension(), Dimension::ENERGY / Dimension::TEMPERATURE);

        let unit = Unit::parse("Da*Å^2/fs^2").unwrap();
        assert_eq!(unit.dimension(), Dimension::ENERGY);
    }

    #[test]
    fn parse_rejects_unknown_and_malformed_labels() {
        assert_eq!(Unit::parse("  "), Err(UnitError::Empty));
        assert!(matches!(Unit::parse("parsec"), Err(UnitError::UnknownSymbol(s)) if s == "parsec"));
        assert!(matches!(Unit::parse("nm/"), Err(UnitError::MalformedTerm(_))));
        assert!(matches!(Unit::parse("nm^x"), Err(UnitError::MalformedTerm(_))));
        assert!(matches!(Unit::parse("^2"), Err(UnitError::MalformedTerm(_))));
    }

    #[test]
    fn parse_rejects_exponents_outside_range() {
        assert_eq!(
            Unit::parse("m^100.m^100"),
            Err(UnitError::ExponentOverflow("m^100.m^100".to_string()))
        );
        assert!(matches!(Unit::parse("s/m^-128"), Err(UnitError::ExponentOverflow(_))));
        assert!(matches!(Unit::parse("fs^100"), Err(UnitError::ExponentOverflow(_))));
        assert!(matches!(Unit::parse("m^300"), Err(UnitError::MalformedTerm(_))));
        assert_eq!(Unit::parse("m^100/m^100").unwrap().dimension(), Dimension::DIMENSIONLESS);
    }

    #[test]
    fn parse_as_checks_dimension() {
        assert!(Unit::parse_as("ps", Dimension::TIME, "time").is_ok());
        let err = Unit::parse_as("ps", Dimension::LENGTH, "length").unwrap_err();
        assert!(matches!(err, UnitError::UnexpectedDimension { role: "length", .. }));
    }

    #[test]
    fn arithmetic_composes_scale_and_dimension() {
        let length = Unit::parse("Å").unwrap();
        let time = Unit::parse("fs").unwrap();
        let velocity = &length / &time;
        assert_eq!(velocity.dimension(), Dimension::VELOCITY);
        assert_eq!(velocity.symbol(), "Å/fs");

        let energy = &Unit::dalton() * &velocity.powi(2);
        assert_eq!(energy.dimension(), Dimension::ENERGY);
        assert_eq!(energy.symbol(), "Da.(Å/fs)^2");
    }

    #[test]
    fn dalton_angstrom_per_femtosecond_squared_is_ten_thousand_kj_per_mol() {
        let md_energy = Unit::parse("Da.Å^2.fs^-2").unwrap();
        let kj_mol = Unit::parse("kJ/mol").unwrap();
        assert_close(md_energy.conversion_factor(&kj_mol).unwrap(), 1.0e4, 1e-9);
    }

    #[test]
    fn conversion_between_incompatible_units_fails() {
        let result = Unit::parse("nm").unwrap().conversion_factor(&Unit::parse("fs").unwrap());
        assert!(matches!(result, Err(UnitError::Incompatible { .. })));
    }

    #[test]
    fn quantity_convert_to_rescales_value() {
        let q = Quantity::new(1.5, Unit::parse("nm").unwrap());
        let converted = q.convert_to(&Unit::parse("Å").unwrap()).unwrap();
        assert_close(converted.value, 15.0, 1e-12);
        assert_eq!(converted.unit.symbol(), "Å");
    }

    #[test]
    fn degrees_convert_to_radians() {
        let factor = Unit::parse("deg").unwrap().conversion_factor(&Unit::radian()).unwrap();
        assert_close(factor * 180.0, std::f64::consts::PI, 1e-12);
    }
}
