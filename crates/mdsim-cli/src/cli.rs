use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Mdsim Developers",
    version,
    about = "mdsim - run molecular-dynamics trajectories and derive energies and temperatures.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output and progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Integrate an ensemble with the ideal-gas force field and report energies per frame.
    Run(RunArgs),
    /// Inspect the unit system: convert values and print physical constants.
    Units(UnitsArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the ensemble file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub ensemble: PathBuf,

    /// Path to the run configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Write the per-frame energy report as CSV, overriding `output.path`.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override `simulation.step-count` from the config file.
    #[arg(short = 'n', long, value_name = "INT")]
    pub steps: Option<usize>,

    /// Override `simulation.step-size` (in the ensemble's time unit).
    #[arg(long, value_name = "FLOAT")]
    pub dt: Option<f64>,

    /// Override the energy unit reported by the force field (e.g. 'kcal/mol').
    #[arg(long, value_name = "UNIT")]
    pub energy_unit: Option<String>,

    /// Override `simulation.periodic` from the config file.
    #[command(flatten)]
    pub boundary: BoundaryMode,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S simulation.step-count=500
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Mutually exclusive flags for the boundary condition.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct BoundaryMode {
    /// Use periodic boundaries with the ensemble's box lengths.
    #[arg(long)]
    pub periodic: bool,
    /// Run without periodic boundaries.
    #[arg(long)]
    pub aperiodic: bool,
}

impl BoundaryMode {
    pub fn as_override(self) -> Option<bool> {
        match (self.periodic, self.aperiodic) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Arguments for the `units` subcommand.
#[derive(Args, Debug)]
pub struct UnitsArgs {
    #[command(subcommand)]
    pub command: UnitsCommands,
}

#[derive(Subcommand, Debug)]
pub enum UnitsCommands {
    /// Convert a value between two compatible units, e.g. `convert 1 kcal/mol kJ/mol`.
    Convert {
        #[arg(allow_negative_numbers = true)]
        value: f64,
        from: String,
        to: String,
    },
    /// Print the Boltzmann constant in `<ENERGY_UNIT>/K`.
    Boltzmann {
        #[arg(value_name = "ENERGY_UNIT")]
        energy_unit: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_arguments_parse_with_overrides() {
        let cli = Cli::try_parse_from([
            "mdsim", "-vv", "run", "-e", "water.toml", "-c", "run.toml", "-n", "10", "--dt",
            "0.5", "--periodic", "-S", "output.path=out.csv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected the run command");
        };
        assert_eq!(args.ensemble, PathBuf::from("water.toml"));
        assert_eq!(args.steps, Some(10));
        assert_eq!(args.dt, Some(0.5));
        assert_eq!(args.boundary.as_override(), Some(true));
        assert_eq!(args.set_values, vec!["output.path=out.csv".to_string()]);
    }

    #[test]
    fn boundary_flags_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "mdsim", "run", "-e", "a.toml", "-c", "b.toml", "--periodic", "--aperiodic",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn units_convert_accepts_negative_values() {
        let cli = Cli::try_parse_from(["mdsim", "units", "convert", "-2.5", "nm", "Å"]).unwrap();
        let Commands::Units(UnitsArgs {
            command: UnitsCommands::Convert { value, from, to },
        }) = cli.command
        else {
            panic!("expected units convert");
        };
        assert_eq!(value, -2.5);
        assert_eq!(from, "nm");
        assert_eq!(to, "Å");
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["mdsim", "-q", "-v", "units", "boltzmann", "eV"]).is_err());
    }
}
