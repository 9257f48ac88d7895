//! Output formatting utilities for CLI.

use crate::cli::Strategy;
use genetics::{
    Candidate, CandidateId, FitnessStats, GeneticsHistoryEntry, PopulationId,
    PopulationIterationResult, SerializedPopulation,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// Fitness summary of one generation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerationSummary {
    /// Generation index.
    pub(super) index: usize,
    /// Population identifier.
    pub(super) population_id: PopulationId,
    /// Fitness statistics.
    pub(super) stats: FitnessStats,
}

impl GenerationSummary {
    /// Summarize an evaluated generation.
    pub(super) fn from_entry<C>(entry: &GeneticsHistoryEntry<C>) -> Self {
        Self {
            index: entry.population.index,
            population_id: entry.population.id,
            stats: entry.stats(),
        }
    }
}

/// Identity and score of one candidate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CandidateSummary {
    /// Candidate identifier.
    pub(super) id: CandidateId,
    /// Fitness in the last evaluated generation.
    pub(super) fitness: f64,
    /// Creation operator tag.
    pub(super) source: Option<String>,
    /// Parent identifiers.
    pub(super) parent_ids: Vec<CandidateId>,
}

impl CandidateSummary {
    /// Summarize a candidate scored in `result`.
    pub(super) fn new<C: Candidate>(candidate: &C, result: &PopulationIterationResult) -> Self {
        Self {
            id: candidate.id(),
            fitness: result.fitness_of(candidate.id()).unwrap_or(f64::NAN),
            source: candidate.source().map(|source| source.tag().to_string()),
            parent_ids: candidate.parent_ids().to_vec(),
        }
    }
}

/// Result of an `evolve` run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EvolveSummary {
    /// Evaluation strategy used.
    pub(super) strategy: Strategy,
    /// Every evaluated generation, oldest first.
    pub(super) generations: Vec<GenerationSummary>,
    /// Best candidate of the last generation.
    pub(super) best: Option<CandidateSummary>,
    /// Where the last generation was saved.
    pub(super) saved: Option<PathBuf>,
}

/// Format an evolve summary as human-readable text.
pub(super) fn format_evolve_text(summary: &EvolveSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("Evolution ({:?})\n", summary.strategy));
    output.push_str("  Gen  Size       Best       Mean      Worst\n");
    for generation in &summary.generations {
        let stats = &generation.stats;
        output.push_str(&format!(
            "  {:>3}  {:>4}  {:>9.2}  {:>9.2}  {:>9.2}\n",
            generation.index, stats.count, stats.best, stats.mean, stats.worst
        ));
    }

    if let Some(best) = &summary.best {
        output.push_str(&format!(
            "\n  Best candidate: {} ({:.2}, {})\n",
            best.id,
            best.fitness,
            best.source.as_deref().unwrap_or("unknown")
        ));
    }
    if let Some(path) = &summary.saved {
        output.push_str(&format!("  Saved to: {}\n", path.display()));
    }

    output
}

/// Lineage of one saved candidate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LineageEntry {
    /// Position in the saved file, best first.
    pub(super) position: usize,
    /// Candidate identifier.
    pub(super) id: CandidateId,
    /// Creation operator tag.
    pub(super) source: Option<String>,
    /// Parent identifiers.
    pub(super) parent_ids: Vec<CandidateId>,
    /// Parents that are also in the file.
    pub(super) parents_present: usize,
}

/// Lineage report of a saved population.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LineageReport {
    /// Population identifier.
    pub(super) id: PopulationId,
    /// Generation index.
    pub(super) index: usize,
    /// Candidate count per creation operator.
    pub(super) sources: BTreeMap<String, usize>,
    /// Candidates in file order.
    pub(super) candidates: Vec<LineageEntry>,
}

impl LineageReport {
    /// Build the report; payloads are ignored.
    pub(super) fn new<P>(population: &SerializedPopulation<P>) -> Self {
        let ids: HashSet<CandidateId> =
            population.candidates.iter().map(|candidate| candidate.id).collect();
        let mut sources = BTreeMap::new();

        let candidates = population
            .candidates
            .iter()
            .enumerate()
            .map(|(position, candidate)| {
                let source = candidate.source.map(|source| source.tag().to_string());
                *sources
                    .entry(source.clone().unwrap_or_else(|| "unknown".to_string()))
                    .or_insert(0) += 1;
                LineageEntry {
                    position,
                    id: candidate.id,
                    source,
                    parent_ids: candidate.parent_ids.clone(),
                    parents_present: candidate
                        .parent_ids
                        .iter()
                        .filter(|id| ids.contains(id))
                        .count(),
                }
            })
            .collect();

        Self {
            id: population.id,
            index: population.index,
            sources,
            candidates,
        }
    }
}

/// Format a lineage report as human-readable text.
pub(super) fn format_lineage_text(report: &LineageReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Population {} (generation {})\n", report.id, report.index));
    for (source, count) in &report.sources {
        output.push_str(&format!("  {source}: {count}\n"));
    }
    output.push('\n');

    for entry in &report.candidates {
        output.push_str(&format!(
            "  #{:<3} {} [{}]",
            entry.position,
            entry.id,
            entry.source.as_deref().unwrap_or("unknown")
        ));
        if !entry.parent_ids.is_empty() {
            let parents: Vec<String> = entry.parent_ids.iter().map(ToString::to_string).collect();
            output.push_str(&format!(" <- {}", parents.join(", ")));
        }
        output.push('\n');
    }

    output
}
