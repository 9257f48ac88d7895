//! Natural-selection ordering.
//!
//! Candidates are ranked by fitness, descending. Ties are broken by the
//! operator that produced the candidate: `Mutation > CrossOver > Clone >
//! Random > unknown`, preferring already-adapted lineages over fresh stock.
//! Both keys live in one composite comparator applied with a single stable
//! sort.

// Statistics use intentional casts
#![allow(clippy::cast_precision_loss)]

use crate::candidate::{Candidate, CandidateId, CandidateSource, candidate_source_rank};
use crate::iteration::{CandidateFitness, PopulationIterationResult};
use crate::population::Population;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// The two selection keys of a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionKey {
    /// Aggregated fitness for the generation.
    pub fitness: f64,
    /// Creation operator, `None` if unknown.
    pub source: Option<CandidateSource>,
}

impl SelectionKey {
    /// Key of a candidate with the given fitness.
    #[must_use]
    pub fn of<C: Candidate>(candidate: &C, fitness: f64) -> Self {
        Self {
            fitness,
            source: candidate.source(),
        }
    }
}

/// Composite selection comparator: `Less` means `a` ranks before `b`.
///
/// Fitness is compared with [`f64::total_cmp`], so the order is total even in
/// the presence of NaN.
#[must_use]
pub fn compare_for_natural_selection(a: &SelectionKey, b: &SelectionKey) -> Ordering {
    b.fitness
        .total_cmp(&a.fitness)
        .then_with(|| candidate_source_rank(b.source).cmp(&candidate_source_rank(a.source)))
}

/// Order a population's ranked candidates for natural selection.
///
/// Only candidates present in both the population and the iteration result
/// are returned. Ranks that reference a candidate outside the population are
/// skipped.
#[must_use]
pub fn sort_candidates_for_natural_selection<C: Candidate>(
    population: &Population<C>,
    result: &PopulationIterationResult,
) -> Vec<Arc<C>> {
    let by_id: HashMap<CandidateId, &Arc<C>> = population
        .candidates
        .iter()
        .map(|candidate| (candidate.id(), candidate))
        .collect();

    let mut ranked: Vec<(SelectionKey, &Arc<C>)> = result
        .candidate_ranks
        .iter()
        .filter_map(|&CandidateFitness { candidate_id, fitness }| {
            let Some(&candidate) = by_id.get(&candidate_id) else {
                warn!(
                    %candidate_id,
                    population_id = %population.id,
                    "ranked candidate is not in population"
                );
                return None;
            };
            Some((SelectionKey::of(candidate.as_ref(), fitness), candidate))
        })
        .collect();

    ranked.sort_by(|(a, _), (b, _)| compare_for_natural_selection(a, b));

    ranked.into_iter().map(|(_, candidate)| Arc::clone(candidate)).collect()
}

/// Summary statistics of one generation's fitness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessStats {
    /// Number of ranked candidates.
    pub count: usize,
    /// Best fitness.
    pub best: f64,
    /// Mean fitness.
    pub mean: f64,
    /// Worst fitness.
    pub worst: f64,
    /// Standard deviation of fitness.
    pub std_dev: f64,
}

impl FitnessStats {
    /// Calculate statistics from fitness values.
    #[must_use]
    pub fn from_fitness(fitness: &[f64]) -> Self {
        if fitness.is_empty() {
            return Self {
                count: 0,
                best: 0.0,
                mean: 0.0,
                worst: 0.0,
                std_dev: 0.0,
            };
        }

        let count = fitness.len();
        let mean = fitness.iter().sum::<f64>() / count as f64;
        let best = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = fitness.iter().copied().fold(f64::INFINITY, f64::min);
        let variance = fitness.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / count as f64;

        Self {
            count,
            best,
            mean,
            worst,
            std_dev: variance.sqrt(),
        }
    }

    /// Calculate statistics from a generation's ranks.
    #[must_use]
    pub fn from_ranks(ranks: &[CandidateFitness]) -> Self {
        let fitness: Vec<f64> = ranks.iter().map(|rank| rank.fitness).collect();
        Self::from_fitness(&fitness)
    }
}
