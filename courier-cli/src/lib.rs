//! Command-line interface for the courier engine.
//!
//! `courier solve <instance.dat>` reads an instance, runs the SAT solver and
//! prints the result record as JSON on standard output.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod dat;
mod error;
mod fs;
mod solve;

pub use dat::{DatError, parse_instance};
pub use error::CliError;

use solve::SolveArgs;

const ARG_INSTANCE: &str = "instance";
const ARG_IGNORE_LOAD_SYMMETRY: &str = "ignore-max-load-symmetry-breaking";
const ARG_IGNORE_DISTANCE_SYMMETRY: &str = "ignore-distance-symmetry-breaking";
const ARG_BUILD_TIMEOUT: &str = "constraint-building-timeout";
const ARG_SOLVING_TIMEOUT: &str = "solving-timeout";
const ARG_CARDINALITY_STRATEGY: &str = "cardinality-strategy";
const ENV_INSTANCE: &str = "COURIER_CMDS_SOLVE_INSTANCE_PATH";

/// Run the courier CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] when arguments or configuration are invalid, the
/// instance cannot be read, or the solver fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Solve(args) => solve::run_solve(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "courier",
    about = "Exact solver for the Multiple Courier Problem",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve an instance and print the result as JSON.
    Solve(SolveArgs),
}

#[cfg(test)]
mod tests;
