//! CLI command implementations for Genetics.

pub(crate) mod evolve;
pub(crate) mod inspect;

mod output;

use clap::ValueEnum;
use genetics::{EvaluationError, GeneticsError, PersistenceError, SerializationError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// How a generation is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Strategy {
    /// Every player plays the arena alone.
    Simple,
    /// Every pair of players meets once.
    #[default]
    Tournament,
}

/// CLI error type.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Engine failure.
    #[error(transparent)]
    Genetics(#[from] GeneticsError),

    /// The configuration file could not be read.
    #[error("cannot read config {}: {source}", path.display())]
    ConfigIo {
        /// Configuration path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The configuration file is not a valid evolve configuration.
    #[error("invalid config {}: {source}", path.display())]
    ConfigJson {
        /// Configuration path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// Result could not be rendered as JSON.
    #[error("cannot render output: {0}")]
    Output(#[from] serde_json::Error),

    /// Progress bar template rejected.
    #[error("invalid progress template: {0}")]
    Progress(#[from] indicatif::style::TemplateError),

    /// Invalid combination of options.
    #[error("{0}")]
    Invalid(String),
}

impl From<EvaluationError> for CliError {
    fn from(e: EvaluationError) -> Self {
        Self::Genetics(e.into())
    }
}

impl From<SerializationError> for CliError {
    fn from(e: SerializationError) -> Self {
        Self::Genetics(e.into())
    }
}

impl From<PersistenceError> for CliError {
    fn from(e: PersistenceError) -> Self {
        Self::Genetics(e.into())
    }
}
