use super::dimension::Dimension;
use super::unit::{Quantity, Unit};

/// Boltzmann constant in J/K (exact, SI 2019).
pub const BOLTZMANN_CONSTANT_SI: f64 = 1.380_649e-23;

pub fn boltzmann_constant() -> Quantity {
    Quantity::new(
        BOLTZMANN_CONSTANT_SI,
        Unit::new("J/K", 1.0, Dimension::new(1, 2, -2, -1)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boltzmann_in(label: &str) -> f64 {
        let target = Unit::parse(label).unwrap();
        boltzmann_constant().convert_to(&target).unwrap().value
    }

    #[test]
    fn boltzmann_matches_tabulated_values() {
        assert!((boltzmann_in("eV/K") - 8.617_333_262e-5).abs() < 1e-13);
        assert!((boltzmann_in("kcal/mol/K") - 1.987_204_259e-3).abs() < 1e-11);
        assert!((boltzmann_in("kJ/mol/K") - 8.314_462_618e-3).abs() < 1e-11);
    }

    #[test]
    fn boltzmann_rejects_non_entropy_targets() {
        let target = Unit::parse("kcal/mol").unwrap();
        assert!(boltzmann_constant().convert_to(&target).is_err());
    }
}
