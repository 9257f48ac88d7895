//! All-pairs round-robin tournament.
//!
//! Every unordered pair of distinct candidates plays exactly one match.
//! With `n` candidates that is `n * (n - 1) / 2` matches, and every candidate
//! plays `n - 1` of them. Pairing order is stable (`(0, 1), (0, 2), ...`) so a
//! generation can be audited, but only the summed fitness matters.

use crate::candidate::Candidate;
use crate::error::EvaluationError;
use crate::evaluation::{CandidateTest, CandidateTestFactory, CandidateTestResult};
use crate::iteration::{
    CandidateFitness, PopulationIteration, PopulationIterationFactory, PopulationIterationResult,
};
use crate::population::Population;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Every unordered pair of distinct indices below `count`, in stable order.
#[must_use]
pub fn round_pairs(count: usize) -> Vec<(usize, usize)> {
    (0..count)
        .flat_map(|first| (first + 1..count).map(move |second| (first, second)))
        .collect()
}

/// Plays every pair of candidates against each other once.
///
/// A candidate's fitness is the sum of its scores over all of its matches.
/// Ranks are sorted by fitness, descending; ties keep population order.
#[derive(Debug)]
pub struct RoundTournamentIteration<T> {
    test_factory: Arc<T>,
}

impl<T> RoundTournamentIteration<T> {
    /// Create an iteration backed by the given test factory.
    #[must_use]
    pub fn new(test_factory: Arc<T>) -> Self {
        Self { test_factory }
    }
}

impl<C, T> PopulationIteration<C> for RoundTournamentIteration<T>
where
    C: Candidate,
    T: CandidateTestFactory<C>,
{
    #[instrument(
        level = "debug",
        skip_all,
        fields(population_id = %population.id, candidates = population.len())
    )]
    fn run(
        &self,
        population: &Population<C>,
    ) -> Result<PopulationIterationResult, EvaluationError> {
        let pairs = round_pairs(population.len());

        // One configuration per generation, shared by every match.
        let test_config = self.test_factory.create_test_config(population.id);

        debug!(matches = pairs.len(), "starting round tournament");

        let candidate_test_results: Vec<CandidateTestResult> = pairs
            .par_iter()
            .map(|&(first, second)| {
                let test = self.test_factory.create_test(&test_config);
                test.run(&[
                    Arc::clone(&population.candidates[first]),
                    Arc::clone(&population.candidates[second]),
                ])
            })
            .collect::<Result<_, _>>()?;

        let candidate_ranks = sum_fitness(population, &pairs, &candidate_test_results)?;

        Ok(PopulationIterationResult {
            candidate_test_results,
            candidate_ranks,
        })
    }
}

/// Sum every candidate's scores and sort by total, descending.
///
/// `results[i]` belongs to `pairs[i]`; a rank for anyone outside that pair
/// fails the generation.
fn sum_fitness<C: Candidate>(
    population: &Population<C>,
    pairs: &[(usize, usize)],
    results: &[CandidateTestResult],
) -> Result<Vec<CandidateFitness>, EvaluationError> {
    let mut ranks: Vec<CandidateFitness> = population
        .candidates
        .iter()
        .map(|candidate| CandidateFitness {
            candidate_id: candidate.id(),
            fitness: 0.0,
        })
        .collect();

    for (&(first, second), result) in pairs.iter().zip(results) {
        for rank in &result.candidate_ranks {
            let position = [first, second]
                .into_iter()
                .find(|&position| ranks[position].candidate_id == rank.candidate_id)
                .ok_or(EvaluationError::UnknownCandidate(rank.candidate_id))?;
            ranks[position].fitness += rank.score;
        }
    }

    ranks.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

    Ok(ranks)
}

/// Creates a [`RoundTournamentIteration`] for every generation.
#[derive(Debug)]
pub struct RoundTournamentIterationFactory<T> {
    test_factory: Arc<T>,
}

impl<T> RoundTournamentIterationFactory<T> {
    /// Create a factory sharing the given test factory.
    #[must_use]
    pub fn new(test_factory: Arc<T>) -> Self {
        Self { test_factory }
    }
}

impl<C, T> PopulationIterationFactory<C> for RoundTournamentIterationFactory<T>
where
    C: Candidate,
    T: CandidateTestFactory<C>,
{
    type Iteration = RoundTournamentIteration<T>;

    fn create_population_iteration(&self) -> Self::Iteration {
        RoundTournamentIteration::new(Arc::clone(&self.test_factory))
    }
}
