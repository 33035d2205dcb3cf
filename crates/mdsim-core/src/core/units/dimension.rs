use std::fmt;
use std::ops::{Div, Mul};

/// Physical dimension as integer exponents over the base quantities the simulation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    pub mass: i8,
    pub length: i8,
    pub time: i8,
    pub temperature: i8,
}

impl Dimension {
    pub const DIMENSIONLESS: Self = Self::new(0, 0, 0, 0);
    pub const MASS: Self = Self::new(1, 0, 0, 0);
    pub const LENGTH: Self = Self::new(0, 1, 0, 0);
    pub const TIME: Self = Self::new(0, 0, 1, 0);
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 1);
    pub const VELOCITY: Self = Self::new(0, 1, -1, 0);
    pub const ENERGY: Self = Self::new(1, 2, -2, 0);

    pub const fn new(mass: i8, length: i8, time: i8, temperature: i8) -> Self {
        Self {
            mass,
            length,
            time,
            temperature,
        }
    }

    /// Raises every exponent by `exponent`.
    ///
    /// Panics if an exponent leaves the `i8` range; use [`Dimension::checked_powi`] for
    /// dimensions built from user input.
    pub fn powi(self, exponent: i8) -> Self {
        Self {
            mass: self.mass * exponent,
            length: self.length * exponent,
            time: self.time * exponent,
            temperature: self.temperature * exponent,
        }
    }

    pub fn checked_powi(self, exponent: i8) -> Option<Self> {
        Some(Self {
            mass: self.mass.checked_mul(exponent)?,
            length: self.length.checked_mul(exponent)?,
            time: self.time.checked_mul(exponent)?,
            temperature: self.temperature.checked_mul(exponent)?,
        })
    }

    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        Some(Self {
            mass: self.mass.checked_add(rhs.mass)?,
            length: self.length.checked_add(rhs.length)?,
            time: self.time.checked_add(rhs.time)?,
            temperature: self.temperature.checked_add(rhs.temperature)?,
        })
    }

    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        Some(Self {
            mass: self.mass.checked_sub(rhs.mass)?,
            length: self.length.checked_sub(rhs.length)?,
            time: self.time.checked_sub(rhs.time)?,
            temperature: self.temperature.checked_sub(rhs.temperature)?,
        })
    }

    #[inline]
    pub fn is_dimensionless(&self) -> bool {
        *self == Self::DIMENSIONLESS
    }
}

impl Mul for Dimension {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            mass: self.mass + rhs.mass,
            length: self.length + rhs.length,
            time: self.time + rhs.time,
            temperature: self.temperature + rhs.temperature,
        }
    }
}

impl Div for Dimension {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self {
            mass: self.mass - rhs.mass,
            length: self.length - rhs.length,
            time: self.time - rhs.time,
            temperature: self.temperature - rhs.temperature,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }
        let parts: Vec<String> = [
            ("M", self.mass),
            ("L", self.length),
            ("T", self.time),
            ("Θ", self.temperature),
        ]
        .iter()
        .filter(|(_, exp)| *exp != 0)
        .map(|(sym, exp)| match exp {
            1 => sym.to_string(),
            _ => format!("{sym}^{exp}"),
        })
        .collect();
        write!(f, "{}", parts.join("."))
    }
}
