//! Population iteration strategies.
//!
//! An iteration turns a population into scored results. Every test of a
//! generation is an independent unit of work: all of them are launched on the
//! rayon pool together and joined before aggregation (fan-out / fan-in).
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │  SimpleIteration  │ RoundTournamentIteration│
//! │  n tests, 1 each  │ n(n-1)/2 tests, 2 each  │
//! ├────────────────────────────────────────────┤
//! │        CandidateTestFactory (scenario)     │
//! └────────────────────────────────────────────┘
//! ```

mod round_tournament;
mod simple;

pub use round_tournament::{RoundTournamentIteration, RoundTournamentIterationFactory, round_pairs};
pub use simple::{SimpleIteration, SimpleIterationFactory};

use crate::candidate::{Candidate, CandidateId};
use crate::error::EvaluationError;
use crate::evaluation::CandidateTestResult;
use crate::population::Population;
use serde::{Deserialize, Serialize};

/// Aggregated fitness of one candidate over a whole iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFitness {
    /// Evaluated candidate.
    pub candidate_id: CandidateId,
    /// Sum of the scores it earned across every test it took part in.
    pub fitness: f64,
}

/// Outcome of evaluating a whole population.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationIterationResult {
    /// Raw test results, in launch order.
    pub candidate_test_results: Vec<CandidateTestResult>,
    /// Aggregated fitness per candidate.
    pub candidate_ranks: Vec<CandidateFitness>,
}

impl PopulationIterationResult {
    /// Fitness of a candidate, if it was ranked.
    #[must_use]
    pub fn fitness_of(&self, candidate_id: CandidateId) -> Option<f64> {
        self.candidate_ranks
            .iter()
            .find(|rank| rank.candidate_id == candidate_id)
            .map(|rank| rank.fitness)
    }

    /// Raw results of every test the candidate took part in.
    pub fn tests_involving(
        &self,
        candidate_id: CandidateId,
    ) -> impl Iterator<Item = &CandidateTestResult> {
        self.candidate_test_results
            .iter()
            .filter(move |result| result.involves(candidate_id))
    }

    /// Fitness values in rank order.
    #[must_use]
    pub fn fitness_values(&self) -> Vec<f64> {
        self.candidate_ranks.iter().map(|rank| rank.fitness).collect()
    }
}

/// An evaluation strategy for one generation.
///
/// Never mutates the population; candidates may be read concurrently.
pub trait PopulationIteration<C: Candidate> {
    /// Evaluate every candidate of the population.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] if any test fails. No partial result is
    /// produced; the same population can be evaluated again.
    fn run(&self, population: &Population<C>) -> Result<PopulationIterationResult, EvaluationError>;
}

/// Produces one iteration per generation.
pub trait PopulationIterationFactory<C: Candidate>: Send + Sync {
    /// Iteration type produced.
    type Iteration: PopulationIteration<C>;

    /// Create the iteration used to evaluate the next generation.
    fn create_population_iteration(&self) -> Self::Iteration;
}
