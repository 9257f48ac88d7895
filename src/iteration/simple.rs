//! Single-candidate evaluation: every candidate is tested on its own.

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

/// Runs one test per candidate, with that candidate as the sole participant.
///
/// Fitness is the candidate's own score. Ranks are reported in population
/// order.
#[derive(Debug)]
pub struct SimpleIteration<T> {
    test_factory: Arc<T>,
}

impl<T> SimpleIteration<T> {
    /// Create an iteration backed by the given test factory.
    #[must_use]
    pub fn new(test_factory: Arc<T>) -> Self {
        Self { test_factory }
    }
}

impl<C, T> PopulationIteration<C> for SimpleIteration<T>
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
        let test_config = self.test_factory.create_test_config(population.id);

        let candidate_test_results: Vec<CandidateTestResult> = population
            .candidates
            .par_iter()
            .map(|candidate| {
                let test = self.test_factory.create_test(&test_config);
                test.run(std::slice::from_ref(candidate))
            })
            .collect::<Result<_, _>>()?;

        debug!(tests = candidate_test_results.len(), "simple iteration finished");

        let candidate_ranks = population
            .candidates
            .iter()
            .zip(&candidate_test_results)
            .map(|(candidate, result)| {
                let rank = result.candidate_ranks.first().ok_or(EvaluationError::EmptyResult)?;
                if rank.candidate_id != candidate.id() {
                    return Err(EvaluationError::UnknownCandidate(rank.candidate_id));
                }
                Ok(CandidateFitness {
                    candidate_id: rank.candidate_id,
                    fitness: rank.score,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PopulationIterationResult {
            candidate_test_results,
            candidate_ranks,
        })
    }
}

/// Creates a [`SimpleIteration`] for every generation.
#[derive(Debug)]
pub struct SimpleIterationFactory<T> {
    test_factory: Arc<T>,
}

impl<T> SimpleIterationFactory<T> {
    /// Create a factory sharing the given test factory.
    #[must_use]
    pub fn new(test_factory: Arc<T>) -> Self {
        Self { test_factory }
    }
}

impl<C, T> PopulationIterationFactory<C> for SimpleIterationFactory<T>
where
    C: Candidate,
    T: CandidateTestFactory<C>,
{
    type Iteration = SimpleIteration<T>;

    fn create_population_iteration(&self) -> Self::Iteration {
        SimpleIteration::new(Arc::clone(&self.test_factory))
    }
}
