//! CLI command for evolving arena players.

use crate::cli::output::{self, EvolveSummary, GenerationSummary};
use crate::cli::{CliError, OutputFormat, Strategy};
use genetics::arena::{
    ArenaConfig, ArenaFactory, ArenaPlayer, ArenaPlayerConfig, ArenaPlayerFactory, Network,
};
use genetics::persistence::{load_population, save_population};
use genetics::{
    GeneticsRunner, NaturalSelectionConfig, NaturalSelectionPopulationFactory, PopulationFactory,
    PopulationIterationFactory, RoundTournamentIterationFactory, RunnerConfig,
    SimpleIterationFactory, sort_candidates_for_natural_selection,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Everything `evolve` needs, loadable from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct EvolveConfig {
    /// Evaluation strategy.
    pub(crate) strategy: Strategy,
    /// Generations to evaluate.
    pub(crate) generations: usize,
    /// Breeding counts.
    pub(crate) selection: NaturalSelectionConfig,
    /// Retry and history settings.
    pub(crate) runner: RunnerConfig,
    /// Arena settings.
    pub(crate) arena: ArenaConfig,
    /// Network shape and mutation settings.
    pub(crate) player: ArenaPlayerConfig,
    /// Seed for arena layouts.
    pub(crate) seed: Option<u64>,
    /// Population file evaluated as the first generation.
    pub(crate) resume: Option<PathBuf>,
    /// Where the last generation is saved.
    pub(crate) save: Option<PathBuf>,
    /// Best candidates kept when saving; `None` keeps all.
    pub(crate) save_cap: Option<usize>,
}

impl Default for EvolveConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            generations: 10,
            // Breeds exactly 8 from 8, so the population size holds.
            selection: NaturalSelectionConfig::new(2, 4, 1, 1),
            runner: RunnerConfig::default(),
            arena: ArenaConfig::default(),
            player: ArenaPlayerConfig::default(),
            seed: None,
            resume: None,
            save: None,
            save_cap: Some(10),
        }
    }
}

impl EvolveConfig {
    /// Read a configuration file; missing fields take their defaults.
    pub(crate) fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CliError::ConfigJson {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Options of the `evolve` command. Flags override the config file.
#[derive(clap::Args, Debug)]
pub(crate) struct EvolveArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Evaluation strategy (default: tournament)
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Generations to evaluate (default: 10)
    #[arg(short, long)]
    generations: Option<usize>,

    /// Best candidates cloned into the next generation
    #[arg(long)]
    clone_count: Option<usize>,

    /// Crossover share of the next generation
    #[arg(long)]
    crossover_count: Option<usize>,

    /// Best candidates mutated into the next generation
    #[arg(long)]
    mutation_count: Option<usize>,

    /// Fresh random candidates per generation
    #[arg(long)]
    random_count: Option<usize>,

    /// Evaluation attempts per generation
    #[arg(long)]
    max_attempts: Option<usize>,

    /// Seed for arena layouts (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Population file to resume from
    #[arg(short, long)]
    resume: Option<PathBuf>,

    /// Save the last generation, best first
    #[arg(long)]
    save: Option<PathBuf>,

    /// Candidates kept when saving (default: 10)
    #[arg(long)]
    save_cap: Option<usize>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Show progress bar
    #[arg(short, long)]
    progress: bool,
}

impl EvolveArgs {
    /// Apply the flags that were given on top of `config`.
    fn apply(&self, config: &mut EvolveConfig) {
        let overrides = [
            (&mut config.selection.clone_count, self.clone_count),
            (&mut config.selection.crossover_count, self.crossover_count),
            (&mut config.selection.mutation_count, self.mutation_count),
            (&mut config.selection.random_count, self.random_count),
            (&mut config.runner.max_attempts, self.max_attempts),
            (&mut config.generations, self.generations),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }

        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.resume.is_some() {
            config.resume.clone_from(&self.resume);
        }
        if self.save.is_some() {
            config.save.clone_from(&self.save);
        }
        if self.save_cap.is_some() {
            config.save_cap = self.save_cap;
        }
    }

    /// Final configuration: defaults, then the config file, then flags.
    fn resolve(&self) -> Result<EvolveConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => EvolveConfig::load(path)?,
            None => EvolveConfig::default(),
        };
        self.apply(&mut config);

        if config.generations == 0 {
            return Err(CliError::Invalid("generations must be at least 1".to_string()));
        }
        if config.strategy == Strategy::Tournament && config.arena.max_players < 2 {
            return Err(CliError::Invalid(
                "tournament strategy needs an arena with at least 2 players".to_string(),
            ));
        }
        Ok(config)
    }
}

/// Execute the evolve command.
pub(crate) fn execute(args: &EvolveArgs) -> Result<(), CliError> {
    let config = args.resolve()?;
    info!(
        strategy = ?config.strategy,
        generations = config.generations,
        target_size = config.selection.target_size(),
        "starting evolution"
    );

    let progress = if args.progress {
        let pb = ProgressBar::new(u64::try_from(config.generations).unwrap_or(u64::MAX));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} generations {msg}",
                )?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let arena = Arc::new(match config.seed {
        Some(seed) => ArenaFactory::with_seed(config.arena, seed),
        None => ArenaFactory::new(config.arena),
    });
    let summary = match config.strategy {
        Strategy::Simple => {
            run_evolution(&config, SimpleIterationFactory::new(arena), progress.as_ref())?
        }
        Strategy::Tournament => run_evolution(
            &config,
            RoundTournamentIterationFactory::new(arena),
            progress.as_ref(),
        )?,
    };

    if let Some(pb) = &progress {
        pb.finish_with_message("done");
    }

    match args.format {
        OutputFormat::Text => print!("{}", output::format_evolve_text(&summary)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

/// Run the configured generations with the given evaluation strategy.
fn run_evolution<I>(
    config: &EvolveConfig,
    iteration_factory: I,
    progress: Option<&ProgressBar>,
) -> Result<EvolveSummary, CliError>
where
    I: PopulationIterationFactory<ArenaPlayer>,
{
    let players = Arc::new(ArenaPlayerFactory::new(&config.arena, config.player.clone()));
    let population_factory = NaturalSelectionPopulationFactory::new(players, config.selection);
    let mut runner =
        GeneticsRunner::with_config(population_factory, iteration_factory, config.runner);

    if let Some(path) = &config.resume {
        let data = load_population::<Network>(path)?;
        let population = runner.population_factory().deserialize_population(data)?;
        info!(
            path = %path.display(),
            index = population.index,
            candidates = population.len(),
            "resuming from saved population"
        );
        runner.set_initial_population(population);
    }

    let mut generations = Vec::with_capacity(config.generations);
    runner.run_generations(config.generations, |entry| {
        let summary = GenerationSummary::from_entry(entry);
        if let Some(pb) = progress {
            pb.set_message(format!("best {:.1}", summary.stats.best));
            pb.inc(1);
        }
        generations.push(summary);
        ControlFlow::Continue(())
    })?;

    let Some(last) = runner.last_entry() else {
        return Err(CliError::Invalid("no generation was evaluated".to_string()));
    };
    let ranked = sort_candidates_for_natural_selection(&last.population, &last.result);
    let best = ranked
        .first()
        .map(|candidate| output::CandidateSummary::new(candidate.as_ref(), &last.result));

    if let Some(path) = &config.save {
        let serialized = runner
            .population_factory()
            .serialize_population(&last.population.reordered(ranked));
        save_population(path, serialized, config.save_cap)?;
        info!(path = %path.display(), "saved last generation");
    }

    Ok(EvolveSummary {
        strategy: config.strategy,
        generations,
        best,
        saved: config.save.clone(),
    })
}
