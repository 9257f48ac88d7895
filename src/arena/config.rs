//! Arena settings and per-generation map layout.

use crate::arena::game::ArenaGame;
use crate::arena::{MoveKind, Position, VisibleState};
use crate::candidate::Candidate;
use crate::evaluation::CandidateTestFactory;
use crate::population::PopulationId;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Static arena settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArenaConfig {
    /// Grid width, border walls included.
    pub columns: usize,
    /// Grid height, border walls included.
    pub rows: usize,
    /// Food placed at the start of every match.
    pub initial_food_count: usize,
    /// How far a player sees in every direction.
    pub visibility_radius: usize,
    /// Maximum number of rounds; every alive player moves once per round.
    pub max_turns: usize,
    /// Energy every player starts with.
    pub initial_energy: u32,
    /// Energy gained by eating one food.
    pub food_energy: u32,
    /// Start positions drawn per generation; matches with more players fail.
    pub max_players: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            columns: 20,
            rows: 20,
            initial_food_count: 10,
            visibility_radius: 5,
            max_turns: 1000,
            initial_energy: 10,
            food_energy: 10,
            max_players: 2,
        }
    }
}

impl ArenaConfig {
    /// Whether a position is on the border wall or outside the grid.
    #[must_use]
    pub fn is_wall(&self, position: Position) -> bool {
        position.row == 0
            || position.column == 0
            || position.row + 1 >= self.rows
            || position.column + 1 >= self.columns
    }

    /// Every cell inside the border walls, row-major.
    #[must_use]
    pub fn interior(&self) -> Vec<Position> {
        (1..self.rows.saturating_sub(1))
            .flat_map(|row| {
                (1..self.columns.saturating_sub(1)).map(move |column| Position::new(row, column))
            })
            .collect()
    }
}

/// Layout shared by every match of one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaParameters {
    /// Population the layout was drawn for.
    pub population_id: PopulationId,
    /// Start position of each player slot.
    pub player_positions: Vec<Position>,
    /// Food positions.
    pub food_positions: Vec<Position>,
}

impl ArenaParameters {
    /// Draw distinct free interior positions for players, then food.
    ///
    /// On a grid too small for everything, players are placed first and the
    /// remaining food is dropped.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(
        config: &ArenaConfig,
        population_id: PopulationId,
        rng: &mut R,
    ) -> Self {
        let mut free = config.interior();
        free.shuffle(rng);

        let players = config.max_players.min(free.len());
        let food = config.initial_food_count.min(free.len() - players);
        let food_positions = free[players..players + food].to_vec();
        free.truncate(players);

        Self {
            population_id,
            player_positions: free,
            food_positions,
        }
    }
}

/// Creates arena matches, drawing one map per generation.
#[derive(Debug)]
pub struct ArenaFactory {
    config: ArenaConfig,
    rng: Mutex<StdRng>,
}

impl ArenaFactory {
    /// Create a factory seeded from system entropy.
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a factory with reproducible maps.
    #[must_use]
    pub fn with_seed(config: ArenaConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Arena settings.
    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }
}

impl<C> CandidateTestFactory<C> for ArenaFactory
where
    C: Candidate<VisibleState = VisibleState, Move = MoveKind>,
{
    type Config = Arc<ArenaParameters>;
    type Test = ArenaGame;

    fn create_test_config(&self, population_id: PopulationId) -> Arc<ArenaParameters> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let parameters = ArenaParameters::random(&self.config, population_id, &mut *rng);
        debug!(
            %population_id,
            players = parameters.player_positions.len(),
            food = parameters.food_positions.len(),
            "drew arena layout"
        );
        Arc::new(parameters)
    }

    fn create_test(&self, config: &Arc<ArenaParameters>) -> ArenaGame {
        ArenaGame::new(self.config, Arc::clone(config))
    }
}
