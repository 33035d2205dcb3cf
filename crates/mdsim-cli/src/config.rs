use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use mdsim::engine::config::{SimulationConfig, SimulationConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const DEFAULT_ENERGY_UNIT: &str = "kJ/mol";

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSimulationConfig {
    step_count: Option<usize>,
    step_size: Option<f64>,
    periodic: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialForcefieldConfig {
    energy_unit: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    path: Option<PathBuf>,
}

/// A run file as written on disk; every field may still be supplied on the command line.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    simulation: Option<PartialSimulationConfig>,
    forcefield: Option<PartialForcefieldConfig>,
    output: Option<PartialOutputConfig>,
}

/// Fully resolved settings for `mdsim run`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub simulation: SimulationConfig,
    pub energy_unit: String,
    pub output: Option<PathBuf>,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading run configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Applies `-S` values, then the dedicated flags, on top of the file contents.
    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<RunConfig> {
        self.apply_set_values(&args.set_values)?;

        let sim = self.simulation.take().unwrap_or_default();
        let ff = self.forcefield.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();

        let mut builder = SimulationConfigBuilder::new();
        if let Some(steps) = args.steps.or(sim.step_count) {
            builder = builder.step_count(steps);
        }
        if let Some(dt) = args.dt.or(sim.step_size) {
            builder = builder.step_size(dt);
        }
        if let Some(periodic) = args.boundary.as_override().or(sim.periodic) {
            builder = builder.periodic(periodic);
        }
        let simulation = builder.build().map_err(|e| {
            CliError::Config(format!(
                "{e}. Set it in the [simulation] table of the config file or via CLI argument."
            ))
        })?;

        Ok(RunConfig {
            simulation,
            energy_unit: args
                .energy_unit
                .clone()
                .or(ff.energy_unit)
                .unwrap_or_else(|| DEFAULT_ENERGY_UNIT.to_string()),
            output: args.output.clone().or(output.path),
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;

            match key {
                "simulation.step-count" => {
                    self.simulation
                        .get_or_insert_with(Default::default)
                        .step_count = Some(parse_value(key, value)?);
                }
                "simulation.step-size" => {
                    self.simulation
                        .get_or_insert_with(Default::default)
                        .step_size = Some(parse_value(key, value)?);
                }
                "simulation.periodic" => {
                    self.simulation
                        .get_or_insert_with(Default::default)
                        .periodic = Some(parse_value(key, value)?);
                }
                "forcefield.energy-unit" => {
                    self.forcefield
                        .get_or_insert_with(Default::default)
                        .energy_unit = Some(value.to_string());
                }
                "output.path" => {
                    self.output.get_or_insert_with(Default::default).path =
                        Some(PathBuf::from(value));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid value for {}: '{}' ({} expected)",
            key,
            value,
            std::any::type_name::<T>()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("run.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn run_args(config: &Path, extra: &[&str]) -> RunArgs {
        let mut argv = vec!["mdsim", "run", "-e", "ensemble.toml", "-c"];
        let config = config.to_str().unwrap();
        argv.push(config);
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(args) => args,
            Commands::Units(_) => unreachable!(),
        }
    }

    #[test]
    fn file_values_are_used_when_no_overrides_are_given() {
        let dir = tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
            [simulation]
            step-count = 100
            step-size = 0.5
            periodic = true

            [forcefield]
            energy-unit = "kcal/mol"

            [output]
            path = "energies.csv"
            "#,
        );
        let config = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&run_args(&path, &[]))
            .unwrap();
        assert_eq!(config.simulation.step_count, 100);
        assert_eq!(config.simulation.step_size, 0.5);
        assert!(config.simulation.periodic);
        assert_eq!(config.energy_unit, "kcal/mol");
        assert_eq!(config.output, Some(PathBuf::from("energies.csv")));
    }

    #[test]
    fn cli_flags_override_file_and_set_values() {
        let dir = tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
            [simulation]
            step-count = 100
            step-size = 0.5
            periodic = true
            "#,
        );
        let args = run_args(
            &path,
            &[
                "-n", "7", "--aperiodic", "-S", "simulation.step-count=50",
                "-S", "simulation.step-size=2.0", "-S", "output.path=set.csv",
            ],
        );
        let config = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();
        assert_eq!(config.simulation.step_count, 7);
        assert_eq!(config.simulation.step_size, 2.0);
        assert!(!config.simulation.periodic);
        assert_eq!(config.energy_unit, DEFAULT_ENERGY_UNIT);
        assert_eq!(config.output, Some(PathBuf::from("set.csv")));
    }

    #[test]
    fn missing_step_size_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = write_config(&dir, "[simulation]\nstep-count = 3\n");
        let result = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&run_args(&path, &[]));
        let Err(CliError::Config(message)) = result else {
            panic!("expected a configuration error");
        };
        assert!(message.contains("step_size"));
    }

    #[test]
    fn unknown_keys_are_rejected_in_file_and_set_values() {
        let dir = tempdir().unwrap();
        let path = write_config(&dir, "[simulation]\nsteps = 3\n");
        assert!(matches!(
            PartialRunConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));

        let path = write_config(&dir, "");
        for bad in ["simulation.thermostat=berendsen", "simulation.step-count"] {
            let result = PartialRunConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&run_args(&path, &["-S", bad]));
            assert!(matches!(result, Err(CliError::Config(_))));
        }
    }

    #[test]
    fn set_value_with_wrong_type_is_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config(&dir, "");
        let result = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&run_args(&path, &["-S", "simulation.periodic=maybe"]));
        let Err(CliError::Config(message)) = result else {
            panic!("expected a configuration error");
        };
        assert!(message.contains("simulation.periodic"));
    }
}
