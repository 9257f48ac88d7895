//! Population files.
//!
//! A saved population is the pretty-printed JSON of a
//! [`SerializedPopulation`]. How many candidates are kept is the caller's
//! choice; the core never needs more than the best few to resume.

use crate::error::PersistenceError;
use crate::population::SerializedPopulation;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, instrument};

/// Write a population to `path`, keeping at most `cap` candidates.
///
/// Candidates are kept in population order, so pass a population sorted for
/// natural selection to keep the best ones.
///
/// # Errors
///
/// Returns [`PersistenceError`] if the file cannot be created or written.
#[instrument(
    level = "debug",
    skip_all,
    fields(path = %path.as_ref().display(), population_id = %population.id)
)]
pub fn save_population<P: Serialize>(
    path: impl AsRef<Path>,
    mut population: SerializedPopulation<P>,
    cap: Option<usize>,
) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    if let Some(cap) = cap {
        population.candidates.truncate(cap);
    }

    let io_error = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &population).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_error)?;

    debug!(candidates = population.candidates.len(), "saved population");
    Ok(())
}

/// Read a population written by [`save_population`].
///
/// # Errors
///
/// Returns [`PersistenceError`] if the file cannot be read or does not hold a
/// population with payloads of type `P`.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_population<P: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<SerializedPopulation<P>, PersistenceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let population: SerializedPopulation<P> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| PersistenceError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(
        population_id = %population.id,
        candidates = population.candidates.len(),
        "loaded population"
    );
    Ok(population)
}
