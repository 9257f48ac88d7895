//! Candidate test contracts.
//!
//! A test runs one or more candidates through a scenario and reports a score
//! for each participant. How the score is computed is entirely up to the
//! scenario.

use crate::candidate::{Candidate, CandidateId};
use crate::error::EvaluationError;
use crate::population::PopulationId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Score earned by one candidate in one test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRank {
    /// Participating candidate.
    pub candidate_id: CandidateId,
    /// Score earned in this test.
    pub score: f64,
}

/// Outcome of one test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTestResult {
    /// Per-participant scores, in no particular order.
    pub candidate_ranks: Vec<CandidateRank>,
    /// Optional scenario-specific record of the match (initial state, move
    /// log) for presentation layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replay: Option<serde_json::Value>,
}

impl CandidateTestResult {
    /// Result without a replay.
    #[must_use]
    pub fn new(candidate_ranks: Vec<CandidateRank>) -> Self {
        Self {
            candidate_ranks,
            replay: None,
        }
    }

    /// Score of a participant, if it took part.
    #[must_use]
    pub fn score_of(&self, candidate_id: CandidateId) -> Option<f64> {
        self.candidate_ranks
            .iter()
            .find(|rank| rank.candidate_id == candidate_id)
            .map(|rank| rank.score)
    }

    /// Whether the candidate took part in this test.
    #[must_use]
    pub fn involves(&self, candidate_id: CandidateId) -> bool {
        self.score_of(candidate_id).is_some()
    }
}

/// A single run of the scenario.
///
/// Tests are one-shot: a fresh instance is created for every run.
pub trait CandidateTest<C: Candidate> {
    /// Run the scenario with the given participants.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] if the scenario fails; the whole
    /// generation's evaluation is then aborted.
    fn run(self, candidates: &[Arc<C>]) -> Result<CandidateTestResult, EvaluationError>;
}

/// Creates tests and their generation-scoped configuration.
///
/// Shared by every concurrently running evaluation task.
pub trait CandidateTestFactory<C: Candidate>: Send + Sync {
    /// Parameters held constant across all tests of one generation
    /// (e.g. a map layout).
    type Config: Send + Sync;
    /// Test type produced.
    type Test: CandidateTest<C>;

    /// Create the configuration for one generation. Called once per generation.
    fn create_test_config(&self, population_id: PopulationId) -> Self::Config;

    /// Create one test instance using the generation's configuration.
    fn create_test(&self, config: &Self::Config) -> Self::Test;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_lookup() {
        let a = CandidateId::new();
        let b = CandidateId::new();
        let result = CandidateTestResult::new(vec![
            CandidateRank { candidate_id: a, score: 3.0 },
            CandidateRank { candidate_id: b, score: 5.0 },
        ]);

        assert_eq!(result.score_of(b), Some(5.0));
        assert!(result.involves(a));
        assert!(!result.involves(CandidateId::new()));
    }

    #[test]
    fn test_result_json_omits_missing_replay() {
        let result = CandidateTestResult::new(vec![CandidateRank {
            candidate_id: CandidateId::new(),
            score: 1.0,
        }]);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("replay").is_none());
        assert!(json["candidateRanks"].is_array());
    }
}
