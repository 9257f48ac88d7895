//! The generation loop.
//!
//! ```text
//!            set_initial_population
//!  Unseeded ─────────────────────────► Seeded
//!     │                                  │
//!     │ run_next_population              │ run_next_population
//!     ▼                                  ▼
//!  Running ◄──── run_next_population ────┘
//!     │  ▲
//!     └──┘  breed from last entry, evaluate, append
//! ```
//!
//! A generation is only appended to the history once its evaluation
//! succeeded. A population that failed evaluation is kept and re-evaluated
//! by the next call, so breeding (which retires the previous generation)
//! never runs twice for the same parents.

use crate::candidate::{Candidate, CandidateId};
use crate::error::EvaluationError;
use crate::iteration::{PopulationIteration, PopulationIterationFactory, PopulationIterationResult};
use crate::population::{Population, PopulationFactory};
use crate::selection::FitnessStats;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Runner tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Evaluation attempts per generation before a failure is surfaced.
    /// `1` means no retry; `0` is treated as `1`.
    #[serde(alias = "maxAttempts")]
    pub max_attempts: usize,
    /// Keep at most this many history entries, dropping the oldest.
    /// `None` keeps every generation.
    #[serde(alias = "historyLimit")]
    pub history_limit: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            history_limit: None,
        }
    }
}

/// Lifecycle state of a [`GeneticsRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// No history and no explicit initial population.
    Unseeded,
    /// An explicit initial population is waiting to be evaluated.
    Seeded,
    /// At least one generation has been evaluated.
    Running,
}

/// An evaluated generation.
#[derive(Debug)]
pub struct GeneticsHistoryEntry<C> {
    /// The population that was evaluated.
    pub population: Population<C>,
    /// Its evaluation result.
    pub result: PopulationIterationResult,
}

impl<C> GeneticsHistoryEntry<C> {
    /// Fitness statistics of this generation.
    #[must_use]
    pub fn stats(&self) -> FitnessStats {
        FitnessStats::from_ranks(&self.result.candidate_ranks)
    }
}

/// Drives evolution one generation at a time.
pub struct GeneticsRunner<P: PopulationFactory, I> {
    population_factory: P,
    iteration_factory: I,
    config: RunnerConfig,
    pending: Option<Population<P::Candidate>>,
    history: Vec<Arc<GeneticsHistoryEntry<P::Candidate>>>,
}

impl<P: PopulationFactory, I> fmt::Debug for GeneticsRunner<P, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneticsRunner")
            .field("config", &self.config)
            .field("pending", &self.pending.is_some())
            .field("generations", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl<P, I> GeneticsRunner<P, I>
where
    P: PopulationFactory,
    I: PopulationIterationFactory<P::Candidate>,
{
    /// Create a runner with the default configuration.
    #[must_use]
    pub fn new(population_factory: P, iteration_factory: I) -> Self {
        Self::with_config(population_factory, iteration_factory, RunnerConfig::default())
    }

    /// Create a runner with an explicit configuration.
    #[must_use]
    pub fn with_config(population_factory: P, iteration_factory: I, config: RunnerConfig) -> Self {
        Self {
            population_factory,
            iteration_factory,
            config,
            pending: None,
            history: Vec::new(),
        }
    }

    /// Population factory in use.
    #[must_use]
    pub fn population_factory(&self) -> &P {
        &self.population_factory
    }

    /// Runner configuration.
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RunnerState {
        if !self.history.is_empty() {
            RunnerState::Running
        } else if self.pending.is_some() {
            RunnerState::Seeded
        } else {
            RunnerState::Unseeded
        }
    }

    /// Evaluated generations, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Arc<GeneticsHistoryEntry<P::Candidate>>] {
        &self.history
    }

    /// Most recently evaluated generation.
    #[must_use]
    pub fn last_entry(&self) -> Option<&Arc<GeneticsHistoryEntry<P::Candidate>>> {
        self.history.last()
    }

    /// Index of the last evaluated generation plus one, or 0 before the first.
    #[must_use]
    pub fn generation_count(&self) -> usize {
        self.history.last().map_or(0, |entry| entry.population.index + 1)
    }

    /// Clear the history and evaluate `population` next.
    ///
    /// Used to resume from a restored population. Candidates of the cleared
    /// history are not disposed. A population still waiting for evaluation
    /// after a failed run is replaced, and its candidates that are not part
    /// of `population` are disposed.
    pub fn set_initial_population(&mut self, population: Population<P::Candidate>) {
        if let Some(replaced) = self.pending.take() {
            let kept: HashSet<CandidateId> = population.candidate_ids().into_iter().collect();
            let retired = replaced
                .candidates
                .iter()
                .filter(|candidate| !kept.contains(&candidate.id()));
            for candidate in retired {
                candidate.dispose();
            }
            debug!(population_id = %replaced.id, "replaced pending population");
        }
        self.history.clear();
        self.pending = Some(population);
    }

    /// Produce and evaluate the next generation.
    ///
    /// The first generation is the explicit initial population if one was
    /// set, otherwise a fresh one from the population factory. Later
    /// generations are bred from the last history entry.
    ///
    /// # Errors
    ///
    /// Returns the last [`EvaluationError`] once every attempt failed. The
    /// history is left untouched and the population is kept for the next
    /// call.
    #[instrument(level = "debug", skip_all, fields(generation = self.generation_count()))]
    pub fn run_next_population(
        &mut self,
    ) -> Result<Arc<GeneticsHistoryEntry<P::Candidate>>, EvaluationError> {
        let population = match (self.pending.take(), self.history.last()) {
            (Some(population), _) => population,
            (None, Some(last)) => self
                .population_factory
                .create_next_population(&last.population, &last.result),
            (None, None) => self.population_factory.create_initial_population(),
        };

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        let result = loop {
            let iteration = self.iteration_factory.create_population_iteration();
            match iteration.run(&population) {
                Ok(result) => break result,
                Err(error) => {
                    warn!(
                        population_id = %population.id,
                        attempt,
                        max_attempts,
                        %error,
                        "generation evaluation failed"
                    );
                    if attempt >= max_attempts {
                        self.pending = Some(population);
                        return Err(error);
                    }
                    attempt += 1;
                }
            }
        };

        let entry = Arc::new(GeneticsHistoryEntry { population, result });
        let stats = entry.stats();
        info!(
            generation = entry.population.index,
            population_id = %entry.population.id,
            candidates = entry.population.len(),
            best = stats.best,
            mean = stats.mean,
            worst = stats.worst,
            "generation evaluated"
        );

        self.history.push(Arc::clone(&entry));
        if let Some(limit) = self.config.history_limit {
            let limit = limit.max(1);
            if self.history.len() > limit {
                let excess = self.history.len() - limit;
                self.history.drain(..excess);
            }
        }

        Ok(entry)
    }

    /// Run `generations` generations, or until `on_generation` breaks when
    /// `generations` is 0, reporting every evaluated generation.
    ///
    /// Returns the number of generations evaluated.
    ///
    /// # Errors
    ///
    /// Stops at the first [`EvaluationError`]; generations evaluated before
    /// it stay in the history.
    pub fn run_generations<F>(
        &mut self,
        generations: usize,
        mut on_generation: F,
    ) -> Result<usize, EvaluationError>
    where
        F: FnMut(&GeneticsHistoryEntry<P::Candidate>) -> ControlFlow<()>,
    {
        let mut completed = 0;
        while generations == 0 || completed < generations {
            let entry = self.run_next_population()?;
            completed += 1;
            if on_generation(&entry).is_break() {
                break;
            }
        }
        Ok(completed)
    }
}
