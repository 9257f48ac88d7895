//! Candidate and candidate-factory contracts.
//!
//! A candidate is an opaque evolvable agent. The engine only ever looks at
//! its identity, its lineage and the operator that created it; everything
//! else (the decision policy, the resources it holds) belongs to the
//! embedding application.

use crate::error::SerializationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(Uuid);

impl CandidateId {
    /// Generate a fresh, time-ordered identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CandidateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The operator that produced a candidate.
///
/// Used as the tie-break key when two candidates earn the same fitness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateSource {
    /// Slightly altered copy of one parent.
    Mutation,
    /// Combination of two parents.
    CrossOver,
    /// Verbatim copy of one parent.
    Clone,
    /// Fresh random candidate with no parents.
    Random,
}

impl CandidateSource {
    /// Selection tie-break rank of this source.
    ///
    /// `Mutation(4) > CrossOver(3) > Clone(2) > Random(1)`.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Mutation => 4,
            Self::CrossOver => 3,
            Self::Clone => 2,
            Self::Random => 1,
        }
    }

    /// Parse a serialized source tag, returning `None` for unknown tags.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "mutation" => Some(Self::Mutation),
            "cross-over" => Some(Self::CrossOver),
            "clone" => Some(Self::Clone),
            "random" => Some(Self::Random),
            _ => None,
        }
    }

    /// Serialized tag of this source.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Mutation => "mutation",
            Self::CrossOver => "cross-over",
            Self::Clone => "clone",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Selection tie-break rank of an optional source. Unknown sources rank 0.
#[must_use]
pub fn candidate_source_rank(source: Option<CandidateSource>) -> u8 {
    source.map_or(0, CandidateSource::rank)
}

/// An evolvable agent under evaluation.
///
/// Candidates are shared between concurrently running tests (a candidate plays
/// `n - 1` matches at once in a round tournament), so `next_move` must be safe
/// to call from several threads and must not carry state from one match into
/// another.
pub trait Candidate: Send + Sync {
    /// What the scenario shows the candidate before each decision.
    type VisibleState;
    /// What the candidate answers with.
    type Move;

    /// Unique identifier.
    fn id(&self) -> CandidateId;

    /// Identifiers of the candidates this one was bred from.
    ///
    /// Empty for random candidates, one for clones and mutations, two for
    /// crossovers.
    fn parent_ids(&self) -> &[CandidateId];

    /// Operator that produced this candidate, `None` if unknown.
    fn source(&self) -> Option<CandidateSource>;

    /// Decide the next move for the given visible state.
    fn next_move(&self, visible: &Self::VisibleState) -> Self::Move;

    /// Release held resources. Called exactly once, when the candidate's
    /// generation is retired.
    fn dispose(&self);
}

/// Persisted form of a candidate.
///
/// The payload carries the implementation-specific state and is never
/// interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedCandidate<P> {
    /// Candidate identifier.
    pub id: CandidateId,
    /// Parent identifiers.
    pub parent_ids: Vec<CandidateId>,
    /// Creation operator; unknown tags deserialize as `None`.
    #[serde(default, with = "source_tag")]
    pub source: Option<CandidateSource>,
    /// Implementation-specific state.
    pub payload: P,
}

/// Produces, breeds and restores candidates.
///
/// Shared by every concurrently running breeding task, so all operations take
/// `&self`. Parents are only read: the same parent may contribute to several
/// children.
pub trait CandidateFactory: Send + Sync {
    /// Candidate type produced by this factory.
    type Candidate: Candidate;
    /// Implementation-specific persisted state.
    type Payload: Serialize + DeserializeOwned + Send + Sync;

    /// Create a fresh random candidate (no parents, source `Random`).
    fn create_random(&self) -> Self::Candidate;

    /// Copy a candidate verbatim under a new identity (source `Clone`).
    fn create_clone(&self, original: &Self::Candidate) -> Self::Candidate;

    /// Combine two candidates (source `CrossOver`, two parents).
    fn create_crossover(&self, first: &Self::Candidate, second: &Self::Candidate)
    -> Self::Candidate;

    /// Create an altered copy of a candidate (source `Mutation`).
    fn create_mutated(&self, original: &Self::Candidate) -> Self::Candidate;

    /// Capture a candidate's identity, lineage and state.
    fn serialize_candidate(&self, candidate: &Self::Candidate)
    -> SerializedCandidate<Self::Payload>;

    /// Restore a candidate, keeping its identity and lineage.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError`] if the payload is not compatible with
    /// this factory.
    fn deserialize_candidate(
        &self,
        data: SerializedCandidate<Self::Payload>,
    ) -> Result<Self::Candidate, SerializationError>;
}

/// Serde adapter mapping unknown source tags to `None` instead of failing.
mod source_tag {
    use super::CandidateSource;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub(super) fn serialize<S: Serializer>(
        source: &Option<CandidateSource>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match source {
            Some(source) => serializer.serialize_some(source.tag()),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<CandidateSource>, D::Error> {
        let tag: Option<String> = Option::deserialize(deserializer)?;
        Ok(tag.as_deref().and_then(CandidateSource::from_tag))
    }
}
