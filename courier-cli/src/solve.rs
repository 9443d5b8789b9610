//! Solve command implementation for the courier CLI.

use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use courier_core::{Instance, SolveReport, SolveResponse, Solver};
use courier_solver_sat::{CardinalityStrategy, SatSolver, SatSolverConfig};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_BUILD_TIMEOUT, ARG_CARDINALITY_STRATEGY, ARG_IGNORE_DISTANCE_SYMMETRY,
    ARG_IGNORE_LOAD_SYMMETRY, ARG_INSTANCE, ARG_SOLVING_TIMEOUT, CliError, ENV_INSTANCE,
    fs, parse_instance,
};

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Solve a Multiple Courier Problem instance given in the .dat \
                 format and print the result as JSON. Each solver option may \
                 be set by flag, in a configuration file, or through a \
                 COURIER_CMDS_SOLVE_* environment variable.",
    about = "Solve a courier instance"
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct SolveArgs {
    /// Path to the `.dat` instance file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) instance_path: Option<Utf8PathBuf>,
    /// Skip ordering couriers that share a capacity.
    #[arg(long = ARG_IGNORE_LOAD_SYMMETRY, value_name = "bool")]
    #[serde(default)]
    pub(crate) ignore_max_load_symmetry_breaking: Option<bool>,
    /// Skip ordering routes against their reversal on symmetric matrices.
    #[arg(long = ARG_IGNORE_DISTANCE_SYMMETRY, value_name = "bool")]
    #[serde(default)]
    pub(crate) ignore_distance_symmetry_breaking: Option<bool>,
    /// Seconds allowed for building the formula.
    #[arg(long = ARG_BUILD_TIMEOUT, value_name = "secs")]
    #[serde(default)]
    pub(crate) constraint_building_timeout: Option<u64>,
    /// Seconds allowed for the optimisation loop.
    #[arg(long = ARG_SOLVING_TIMEOUT, value_name = "secs")]
    #[serde(default)]
    pub(crate) solving_timeout: Option<u64>,
    /// At-most-one encoding: pairwise, sequential, bitwise or commander.
    #[arg(long = ARG_CARDINALITY_STRATEGY, value_name = "strategy")]
    #[serde(default)]
    pub(crate) cardinality_strategy: Option<CardinalityStrategy>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SolveConfig {
    /// Path to the `.dat` instance file.
    pub(crate) instance_path: Utf8PathBuf,
    /// Solver options with unset values defaulted.
    pub(crate) solver: SatSolverConfig,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.instance_path, ARG_INSTANCE)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let instance_path = args.instance_path.ok_or(CliError::MissingArgument {
            field: ARG_INSTANCE,
            env: ENV_INSTANCE,
        })?;

        let defaults = SatSolverConfig::default();
        let solver = SatSolverConfig {
            ignore_max_load_symmetry_breaking: args
                .ignore_max_load_symmetry_breaking
                .unwrap_or(defaults.ignore_max_load_symmetry_breaking),
            ignore_distance_symmetry_breaking: args
                .ignore_distance_symmetry_breaking
                .unwrap_or(defaults.ignore_distance_symmetry_breaking),
            constraint_building_timeout: args
                .constraint_building_timeout
                .map_or(defaults.constraint_building_timeout, Duration::from_secs),
            solving_timeout: args
                .solving_timeout
                .map_or(defaults.solving_timeout, Duration::from_secs),
            cardinality_strategy: args
                .cardinality_strategy
                .unwrap_or(defaults.cardinality_strategy),
        };

        Ok(Self {
            instance_path,
            solver,
        })
    }
}

/// Builds a solver for the current solve invocation.
pub(super) trait SolverFactory {
    fn build(&self, config: &SatSolverConfig) -> Box<dyn Solver>;
}

pub(super) struct SatSolverFactory;

impl SolverFactory for SatSolverFactory {
    fn build(&self, config: &SatSolverConfig) -> Box<dyn Solver> {
        Box::new(SatSolver::with_config(config.clone()))
    }
}

pub(super) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_solve_with(args, &SatSolverFactory, &mut stdout)
}

pub(super) fn run_solve_with(
    args: SolveArgs,
    factory: &dyn SolverFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let response = execute_solve(args, factory)?;
    write_solve_report(writer, &SolveReport::from(&response))
}

fn execute_solve(args: SolveArgs, factory: &dyn SolverFactory) -> Result<SolveResponse, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let instance = load_instance(&config.instance_path)?;
    log::info!(
        "solving {} with {} couriers and {} items",
        config.instance_path,
        instance.couriers,
        instance.items
    );
    let solver = factory.build(&config.solver);
    solver
        .solve(&instance)
        .map_err(|source| CliError::Solve { source })
}

/// Loads a `.dat` instance from disk.
pub(super) fn load_instance(path: &Utf8Path) -> Result<Instance, CliError> {
    let text = fs::read_utf8_file(path).map_err(|source| CliError::ReadInstance {
        path: path.to_path_buf(),
        source,
    })?;
    parse_instance(&text).map_err(|source| CliError::ParseInstance {
        path: path.to_path_buf(),
        source,
    })
}

fn write_solve_report(writer: &mut dyn Write, report: &SolveReport) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerialiseSolveReport)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteSolveOutput)?;
    writer
        .write_all(b"\n")
        .map_err(CliError::WriteSolveOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
