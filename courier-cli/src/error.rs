//! Errors reported by the `courier` binary.
//!
//! Configuration errors are held in an `Arc` so `CliError` stays within the
//! `clippy::result_large_err` threshold.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use courier_core::SolveError;
use thiserror::Error;

use crate::DatError;

/// Everything that can stop a `courier` invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// Clap rejected the command line.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Merging flags, configuration files and environment failed.
    #[error("could not merge solver options: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// No layer supplied a required option.
    #[error("no {field} given; pass it on the command line or set {env}")]
    MissingArgument {
        /// Option name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// The instance path names nothing on disk.
    #[error("{field} {path:?} not found")]
    MissingSourceFile {
        /// Option name.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
    },
    /// The instance path names a directory or other non-file entry.
    #[error("{field} {path:?} is not a regular file")]
    SourcePathNotFile {
        /// Option name.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
    },
    /// Reading the metadata of the instance path failed.
    #[error("cannot stat {field} {path:?}: {source}")]
    InspectSourcePath {
        /// Option name.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// Reading the instance file failed.
    #[error("cannot read instance {path:?}: {source}")]
    ReadInstance {
        /// Instance path.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The instance file is not a valid `.dat` document.
    #[error("{path:?} is not a valid instance: {source}")]
    ParseInstance {
        /// Instance path.
        path: Utf8PathBuf,
        /// What was wrong with it.
        #[source]
        source: DatError,
    },
    /// The solver rejected the instance.
    #[error("cannot solve instance: {source}")]
    Solve {
        /// Solver error.
        source: SolveError,
    },
    /// The report could not be encoded as JSON.
    #[error("cannot encode report as JSON: {0}")]
    SerialiseSolveReport(#[source] serde_json::Error),
    /// Standard output rejected the report.
    #[error("cannot write report: {0}")]
    WriteSolveOutput(#[source] io::Error),
}
