//! Error types for the evolution engine.

use crate::candidate::CandidateId;
use std::path::PathBuf;
use thiserror::Error;

/// A candidate test, or the aggregation of its results, failed.
///
/// Any evaluation failure aborts the whole generation: no partial
/// iteration result is ever produced.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The scenario reported a failure while running a test.
    #[error("candidate test failed: {0}")]
    TestFailed(String),
    /// A single-candidate test returned no rank entry.
    #[error("candidate test returned no ranks")]
    EmptyResult,
    /// A test ranked a candidate that is not part of the evaluated population.
    #[error("candidate test ranked unknown candidate {0}")]
    UnknownCandidate(CandidateId),
}

impl EvaluationError {
    /// Create a [`EvaluationError::TestFailed`] from any displayable reason.
    #[must_use]
    pub fn test_failed(reason: impl std::fmt::Display) -> Self {
        Self::TestFailed(reason.to_string())
    }
}

/// A serialized candidate could not be restored by the active candidate factory.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// The payload does not have the shape the factory expects.
    #[error("incompatible payload for candidate {candidate_id}: {reason}")]
    IncompatiblePayload {
        /// Identifier recorded in the serialized candidate.
        candidate_id: CandidateId,
        /// What did not match.
        reason: String,
    },
    /// Two serialized candidates share an identifier.
    #[error("duplicate candidate {0} in serialized population")]
    DuplicateCandidate(CandidateId),
}

/// Reading or writing a persisted population failed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file content is not a valid serialized population.
    #[error("invalid population data in {}: {source}", path.display())]
    Json {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// Top-level error for callers that drive a whole evolution run.
#[derive(Debug, Error)]
pub enum GeneticsError {
    /// A generation failed to evaluate.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    /// A persisted population could not be restored.
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    /// A population file could not be read or written.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
