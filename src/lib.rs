// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Genetics: an evolutionary engine for populations of competing candidates.
//!
//! Candidates are opaque agents supplied by the embedding application. Each
//! generation they are scored by a pluggable evaluation strategy, then bred
//! into the next generation by natural selection:
//! - Fan-out/fan-in evaluation on the rayon pool (one task per test)
//! - Single-candidate scoring or an all-pairs round-robin tournament
//! - Elitism, crossover, mutation, random injection and size self-healing
//! - Exactly-once disposal of retired candidates
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     GeneticsRunner                          │
//! │           (history, retry, seeded resume)                   │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │   PopulationIteration        │   PopulationFactory          │
//! │   Simple / RoundTournament   │   NaturalSelection           │
//! ├──────────────────────────────┼──────────────────────────────┤
//! │   CandidateTestFactory       │   CandidateFactory           │
//! │   (scenario, e.g. arena)     │   (agent, e.g. ArenaPlayer)  │
//! └──────────────────────────────┴──────────────────────────────┘
//! ```

pub mod arena;
pub mod candidate;
pub mod error;
pub mod evaluation;
pub mod iteration;
pub mod natural_selection;
pub mod persistence;
pub mod population;
pub mod runner;
pub mod selection;

#[cfg(test)]
mod test_support;

pub use candidate::{Candidate, CandidateFactory, CandidateId, CandidateSource, SerializedCandidate};
pub use error::{EvaluationError, GeneticsError, PersistenceError, SerializationError};
pub use evaluation::{CandidateRank, CandidateTest, CandidateTestFactory, CandidateTestResult};
pub use iteration::{
    CandidateFitness, PopulationIteration, PopulationIterationFactory, PopulationIterationResult,
    RoundTournamentIteration, RoundTournamentIterationFactory, SimpleIteration,
    SimpleIterationFactory,
};
pub use natural_selection::{NaturalSelectionConfig, NaturalSelectionPopulationFactory};
pub use population::{Population, PopulationFactory, PopulationId, SerializedPopulation};
pub use runner::{GeneticsHistoryEntry, GeneticsRunner, RunnerConfig, RunnerState};
pub use selection::{
    FitnessStats, compare_for_natural_selection, sort_candidates_for_natural_selection,
};
