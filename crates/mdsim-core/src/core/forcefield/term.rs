use std::ops::{Add, AddAssign};

/// Potential-energy components reported by a force field for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyComponents {
    pub coulomb: f64,
    pub lennard_jones: f64,
    pub bond_vibration: f64,
    pub angle_vibration: f64,
}

impl EnergyComponents {
    pub fn new(
        coulomb: f64,
        lennard_jones: f64,
        bond_vibration: f64,
        angle_vibration: f64,
    ) -> Self {
        Self {
            coulomb,
            lennard_jones,
            bond_vibration,
            angle_vibration,
        }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.coulomb + self.lennard_jones + self.bond_vibration + self.angle_vibration
    }
}

impl Add for EnergyComponents {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            coulomb: self.coulomb + rhs.coulomb,
            lennard_jones: self.lennard_jones + rhs.lennard_jones,
            bond_vibration: self.bond_vibration + rhs.bond_vibration,
            angle_vibration: self.angle_vibration + rhs.angle_vibration,
        }
    }
}

impl AddAssign for EnergyComponents {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
