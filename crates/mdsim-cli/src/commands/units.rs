use crate::cli::{UnitsArgs, UnitsCommands};
use crate::error::Result;
use mdsim::core::units::{Dimension, Quantity, Unit, boltzmann_constant};
use tracing::debug;

pub fn run(args: UnitsArgs) -> Result<()> {
    match args.command {
        UnitsCommands::Convert { value, from, to } => {
            let converted = convert(value, &from, &to)?;
            println!("{} {} = {}", value, from, converted);
        }
        UnitsCommands::Boltzmann { energy_unit } => {
            let k_b = boltzmann_in(&energy_unit)?;
            println!("k_B = {}", k_b);
        }
    }
    Ok(())
}

pub fn convert(value: f64, from: &str, to: &str) -> Result<Quantity> {
    let from_unit = Unit::parse(from)?;
    let to_unit = Unit::parse(to)?;
    debug!(
        factor = from_unit.conversion_factor(&to_unit).ok(),
        dimension = %from_unit.dimension(),
        "Resolved unit conversion."
    );
    Ok(Quantity::new(value, from_unit).convert_to(&to_unit)?)
}

/// The Boltzmann constant expressed in `energy_unit / K`.
pub fn boltzmann_in(energy_unit: &str) -> Result<Quantity> {
    let energy = Unit::parse_as(energy_unit, Dimension::ENERGY, "energy")?;
    Ok(boltzmann_constant().convert_to(&(&energy / &Unit::kelvin()))?)
}
