//! Natural-selection breeding.
//!
//! The next generation is assembled from the ranked previous one:
//!
//! ```text
//! ranked ──┬─ top mutation_count ──► mutate ───┐
//!          ├─ consecutive pairs ───► crossover ┤
//!          ├─ top clone_count ─────► clone ────┼─► next population
//!          └─ (none) ──────────────► random ───┤      (padded with random
//!                                              │       up to target size)
//!                                  previous ───┴─► dispose
//! ```
//!
//! Crossover yields one child per complete consecutive pair of ranked
//! candidates, independent of `crossover_count`. The configured crossover
//! count only contributes to the target size.

use crate::candidate::{Candidate, CandidateFactory};
use crate::error::SerializationError;
use crate::iteration::PopulationIterationResult;
use crate::population::{Population, PopulationFactory, SerializedPopulation};
use crate::selection::sort_candidates_for_natural_selection;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Operator counts of every generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaturalSelectionConfig {
    /// Top-ranked candidates copied verbatim.
    #[serde(alias = "cloneCount")]
    pub clone_count: usize,
    /// Contributes to the target size only; crossover children are one per
    /// consecutive ranked pair.
    #[serde(alias = "crossoverCount")]
    pub crossover_count: usize,
    /// Top-ranked candidates mutated.
    #[serde(alias = "mutationCount")]
    pub mutation_count: usize,
    /// Fresh random candidates injected per generation.
    #[serde(alias = "randomCount")]
    pub random_count: usize,
}

impl Default for NaturalSelectionConfig {
    fn default() -> Self {
        Self {
            clone_count: 2,
            crossover_count: 2,
            mutation_count: 2,
            random_count: 2,
        }
    }
}

impl NaturalSelectionConfig {
    /// Create a configuration from the four operator counts.
    #[must_use]
    pub fn new(
        clone_count: usize,
        crossover_count: usize,
        mutation_count: usize,
        random_count: usize,
    ) -> Self {
        Self {
            clone_count,
            crossover_count,
            mutation_count,
            random_count,
        }
    }

    /// Population size every generation is padded to.
    #[must_use]
    pub fn target_size(&self) -> usize {
        self.clone_count + self.crossover_count + self.mutation_count + self.random_count
    }

    /// Candidates bred from a ranked generation of `previous_len`, before
    /// padding.
    ///
    /// Clone and mutation counts are capped by the number of ranked
    /// candidates.
    #[must_use]
    pub fn bred_size(&self, previous_len: usize) -> usize {
        self.clone_count.min(previous_len)
            + self.mutation_count.min(previous_len)
            + self.random_count
            + previous_len / 2
    }

    /// Whether a target-sized generation breeds exactly a target-sized one.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.bred_size(self.target_size()) == self.target_size()
    }
}

/// Population factory breeding each generation by natural selection.
#[derive(Debug)]
pub struct NaturalSelectionPopulationFactory<F> {
    candidate_factory: Arc<F>,
    config: NaturalSelectionConfig,
}

impl<F: CandidateFactory> NaturalSelectionPopulationFactory<F> {
    /// Create a factory with the given configuration.
    ///
    /// An unstable configuration is accepted: shortfalls are padded with
    /// random candidates and overshoot is kept.
    #[must_use]
    pub fn new(candidate_factory: Arc<F>, config: NaturalSelectionConfig) -> Self {
        if !config.is_stable() {
            warn!(
                target_size = config.target_size(),
                bred_size = config.bred_size(config.target_size()),
                "natural selection configuration does not reproduce its target size"
            );
        }
        Self {
            candidate_factory,
            config,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &NaturalSelectionConfig {
        &self.config
    }

    /// Shared candidate factory.
    #[must_use]
    pub fn candidate_factory(&self) -> &Arc<F> {
        &self.candidate_factory
    }

    fn create_random_candidates(&self, count: usize) -> Vec<Arc<F::Candidate>> {
        (0..count)
            .into_par_iter()
            .map(|_| Arc::new(self.candidate_factory.create_random()))
            .collect()
    }
}

impl<F: CandidateFactory> PopulationFactory for NaturalSelectionPopulationFactory<F> {
    type Candidate = F::Candidate;
    type Payload = F::Payload;

    #[instrument(level = "debug", skip_all, fields(size = self.config.target_size()))]
    fn create_initial_population(&self) -> Population<F::Candidate> {
        Population::new(0, self.create_random_candidates(self.config.target_size()))
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(previous_id = %previous.id, previous_index = previous.index)
    )]
    fn create_next_population(
        &self,
        previous: &Population<F::Candidate>,
        result: &PopulationIterationResult,
    ) -> Population<F::Candidate> {
        let ranked = sort_candidates_for_natural_selection(previous, result);
        let factory = self.candidate_factory.as_ref();

        let cloned: Vec<Arc<F::Candidate>> = ranked[..self.config.clone_count.min(ranked.len())]
            .par_iter()
            .map(|candidate| Arc::new(factory.create_clone(candidate)))
            .collect();

        let crossed: Vec<Arc<F::Candidate>> = ranked
            .par_chunks_exact(2)
            .map(|pair| Arc::new(factory.create_crossover(&pair[0], &pair[1])))
            .collect();

        let mutated: Vec<Arc<F::Candidate>> = ranked[..self.config.mutation_count.min(ranked.len())]
            .par_iter()
            .map(|candidate| Arc::new(factory.create_mutated(candidate)))
            .collect();

        let random = self.create_random_candidates(self.config.random_count);

        debug!(
            mutated = mutated.len(),
            crossed = crossed.len(),
            cloned = cloned.len(),
            random = random.len(),
            "bred next generation"
        );

        let bred = mutated.len() + crossed.len() + cloned.len() + random.len();
        let mut candidates = Vec::with_capacity(bred.max(self.config.target_size()));
        candidates.extend(mutated);
        candidates.extend(crossed);
        candidates.extend(cloned);
        candidates.extend(random);

        let target_size = self.config.target_size();
        if candidates.len() < target_size {
            let missing = target_size - candidates.len();
            warn!(missing, target_size, "padding generation with random candidates");
            candidates.extend(self.create_random_candidates(missing));
        }

        let next = Population::new(previous.index + 1, candidates);

        // Parents were only read while breeding; retire them now that the
        // next generation is complete.
        for candidate in &previous.candidates {
            candidate.dispose();
        }

        next
    }

    fn serialize_population(
        &self,
        population: &Population<F::Candidate>,
    ) -> SerializedPopulation<F::Payload> {
        SerializedPopulation {
            id: population.id,
            index: population.index,
            candidates: population
                .candidates
                .par_iter()
                .map(|candidate| self.candidate_factory.serialize_candidate(candidate))
                .collect(),
        }
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(population_id = %data.id, candidates = data.candidates.len())
    )]
    fn deserialize_population(
        &self,
        data: SerializedPopulation<F::Payload>,
    ) -> Result<Population<F::Candidate>, SerializationError> {
        let mut seen = HashSet::with_capacity(data.candidates.len());
        let duplicate = data.candidates.iter().find(|candidate| !seen.insert(candidate.id));
        if let Some(duplicate) = duplicate {
            return Err(SerializationError::DuplicateCandidate(duplicate.id));
        }

        let candidates = data
            .candidates
            .into_par_iter()
            .map(|candidate| {
                self.candidate_factory
                    .deserialize_candidate(candidate)
                    .map(Arc::new)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Population {
            id: data.id,
            index: data.index,
            candidates,
        })
    }
}
