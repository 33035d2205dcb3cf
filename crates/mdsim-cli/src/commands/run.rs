use crate::cli::RunArgs;
use crate::config::PartialRunConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use mdsim::core::forcefield::ideal_gas::IdealGas;
use mdsim::core::models::ensemble::{Ensemble, StaticEnsemble};
use mdsim::engine::progress::ProgressReporter;
use mdsim::engine::trajectory::Trajectory;
use mdsim::workflows::simulate::Simulation;
use std::fs::File;
use std::io::Write;
use tracing::info;

pub fn run(args: RunArgs, quiet: bool) -> Result<()> {
    let partial_config = PartialRunConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    info!("Loading ensemble from {:?}", &args.ensemble);
    let ensemble = StaticEnsemble::load(&args.ensemble)?;
    let forcefield = IdealGas::for_ensemble(&ensemble)?.with_energy_unit(&config.energy_unit)?;
    println!(
        "Simulating {} atom(s) in {} molecule(s) for {} step(s) of {} {}...",
        ensemble.num_atoms(),
        ensemble.num_molecules(),
        config.simulation.step_count,
        config.simulation.step_size,
        ensemble.unit_time()
    );

    let mut simulation = Simulation::new(forcefield, ensemble)?;
    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let trajectory = simulation.run(&config.simulation, &reporter)?;

    print_summary(trajectory);

    if let Some(path) = &config.output {
        info!("Writing energy report to {:?}", path);
        write_energy_report(trajectory, File::create(path)?)?;
        println!(
            "✓ Energy report ({} frame(s)) written to: {}",
            trajectory.num_frames(),
            path.display()
        );
    }
    Ok(())
}

fn print_summary(trajectory: &Trajectory) {
    let last = trajectory.num_frames().saturating_sub(1);
    let energy = trajectory.unit_energy();
    println!(
        "Run complete: {} frame(s), t = {} {}",
        trajectory.num_frames(),
        trajectory.timestamps()[last],
        trajectory.unit_time()
    );
    println!(
        "  Final kinetic energy:   {:.6} {}",
        trajectory.kinetic_energy_total()[last],
        energy
    );
    println!(
        "  Final potential energy: {:.6} {}",
        trajectory.potential_energy_total()[last],
        energy
    );
    println!(
        "  Final total energy:     {:.6} {}",
        trajectory.total_energy()[last],
        energy
    );
    println!(
        "  Final temperature:      {:.3} {}",
        trajectory.temperature()[last],
        trajectory.unit_temperature()
    );
}

/// Writes one CSV row per frame with the energy components, totals and temperature.
pub fn write_energy_report(trajectory: &Trajectory, writer: impl Write) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in trajectory.energy_report() {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
