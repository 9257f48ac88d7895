//! Populations and the population-factory contract.

use crate::candidate::{Candidate, CandidateId, SerializedCandidate};
use crate::error::SerializationError;
use crate::iteration::PopulationIterationResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier of a population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PopulationId(Uuid);

impl PopulationId {
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
}

impl Default for PopulationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PopulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One generation's cohort of candidates.
///
/// Candidates are shared through `Arc` so a population can be handed to
/// concurrent tests, kept in history and bred from without copying candidate
/// state. Candidate identifiers are unique within a population.
#[derive(Debug)]
pub struct Population<C> {
    /// Population identifier.
    pub id: PopulationId,
    /// Zero-based generation index.
    pub index: usize,
    /// Candidates in creation order, or rank order once sorted for display.
    pub candidates: Vec<Arc<C>>,
}

// Manual impl: cloning only bumps reference counts, so `C: Clone` is not needed.
impl<C> Clone for Population<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            index: self.index,
            candidates: self.candidates.clone(),
        }
    }
}

impl<C: Candidate> Population<C> {
    /// Create a population with a fresh identifier.
    #[must_use]
    pub fn new(index: usize, candidates: Vec<Arc<C>>) -> Self {
        Self {
            id: PopulationId::new(),
            index,
            candidates,
        }
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the population has no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Look up a candidate by identifier.
    #[must_use]
    pub fn candidate(&self, id: CandidateId) -> Option<&Arc<C>> {
        self.candidates.iter().find(|candidate| candidate.id() == id)
    }

    /// Identifiers of all candidates, in population order.
    #[must_use]
    pub fn candidate_ids(&self) -> Vec<CandidateId> {
        self.candidates.iter().map(|candidate| candidate.id()).collect()
    }

    /// The same population with its candidates in a different order.
    #[must_use]
    pub fn reordered(&self, candidates: Vec<Arc<C>>) -> Self {
        Self {
            id: self.id,
            index: self.index,
            candidates,
        }
    }
}

/// Persisted form of a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedPopulation<P> {
    /// Population identifier.
    pub id: PopulationId,
    /// Generation index.
    pub index: usize,
    /// Serialized candidates, in population order.
    pub candidates: Vec<SerializedCandidate<P>>,
}

/// Creates, breeds and restores populations.
pub trait PopulationFactory: Send + Sync {
    /// Candidate type of the populations produced.
    type Candidate: Candidate;
    /// Implementation-specific persisted candidate state.
    type Payload;

    /// Create generation 0.
    fn create_initial_population(&self) -> Population<Self::Candidate>;

    /// Breed the generation after `previous` from its evaluation result.
    ///
    /// Retires `previous`: its candidates are disposed once the new
    /// population is assembled, so this must be called at most once per
    /// population.
    fn create_next_population(
        &self,
        previous: &Population<Self::Candidate>,
        result: &PopulationIterationResult,
    ) -> Population<Self::Candidate>;

    /// Capture a population for persistence.
    fn serialize_population(
        &self,
        population: &Population<Self::Candidate>,
    ) -> SerializedPopulation<Self::Payload>;

    /// Restore a persisted population.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError`] if any candidate cannot be restored; no
    /// partial population is returned.
    fn deserialize_population(
        &self,
        data: SerializedPopulation<Self::Payload>,
    ) -> Result<Population<Self::Candidate>, SerializationError>;
}
