//! The arena match.

use crate::arena::config::{ArenaConfig, ArenaParameters};
use crate::arena::{Cell, Direction, MoveKind, Position, VisibleState};
use crate::candidate::{Candidate, CandidateId};
use crate::error::EvaluationError;
use crate::evaluation::{CandidateRank, CandidateTest, CandidateTestResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

/// One recorded decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaMove {
    /// Player that moved.
    pub candidate_id: CandidateId,
    /// What it chose.
    pub kind: MoveKind,
}

/// Everything needed to replay a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaReplay {
    /// Map layout the match started from.
    pub parameters: ArenaParameters,
    /// Participants, in start-slot order.
    pub players: Vec<CandidateId>,
    /// Rounds played.
    pub rounds: usize,
    /// Every decision, in order.
    pub moves: Vec<ArenaMove>,
}

#[derive(Debug, Clone)]
struct PlayerState {
    candidate_id: CandidateId,
    position: Position,
    direction: Direction,
    energy: u32,
    score: u32,
}

#[derive(Debug)]
struct ArenaState {
    config: ArenaConfig,
    cells: Vec<Cell>,
    players: Vec<PlayerState>,
}

impl ArenaState {
    fn new(config: ArenaConfig, parameters: &ArenaParameters, players: &[CandidateId]) -> Self {
        let cells = (0..config.rows)
            .flat_map(|row| (0..config.columns).map(move |column| Position::new(row, column)))
            .map(|position| if config.is_wall(position) { Cell::Wall } else { Cell::Empty })
            .collect();

        let mut state = Self {
            config,
            cells,
            players: players
                .iter()
                .zip(&parameters.player_positions)
                .map(|(&candidate_id, &position)| PlayerState {
                    candidate_id,
                    position,
                    direction: Direction::default(),
                    energy: config.initial_energy,
                    score: 0,
                })
                .collect(),
        };

        for &position in &parameters.food_positions {
            state.set(position, Cell::Food);
        }
        let starts: Vec<Position> = state.players.iter().map(|player| player.position).collect();
        for position in starts {
            state.set(position, Cell::Player);
        }
        state
    }

    fn cell(&self, position: Position) -> Cell {
        if position.row >= self.config.rows || position.column >= self.config.columns {
            return Cell::Wall;
        }
        self.cells[position.row * self.config.columns + position.column]
    }

    fn set(&mut self, position: Position, cell: Cell) {
        if position.row < self.config.rows && position.column < self.config.columns {
            self.cells[position.row * self.config.columns + position.column] = cell;
        }
    }

    fn alive(&self) -> Vec<usize> {
        (0..self.players.len())
            .filter(|&index| self.players[index].energy > 0)
            .collect()
    }

    #[allow(clippy::cast_possible_wrap)]
    fn visible_for(&self, index: usize) -> VisibleState {
        let player = &self.players[index];
        let radius = self.config.visibility_radius;
        let span = radius as isize;
        let mut cells = Vec::with_capacity(VisibleState::input_count(radius) - 4);

        for row_offset in -span..=span {
            for column_offset in -span..=span {
                let cell = if row_offset == 0 && column_offset == 0 {
                    Cell::Empty
                } else {
                    match (
                        player.position.row.checked_add_signed(row_offset),
                        player.position.column.checked_add_signed(column_offset),
                    ) {
                        (Some(row), Some(column)) => self.cell(Position::new(row, column)),
                        _ => Cell::Wall,
                    }
                };
                cells.push(cell);
            }
        }

        VisibleState {
            energy: player.energy,
            position: player.position,
            direction: player.direction,
            radius,
            cells,
        }
    }

    fn apply(&mut self, index: usize, kind: MoveKind) {
        match kind {
            MoveKind::TurnLeft => {
                self.players[index].direction = self.players[index].direction.turn_left();
            }
            MoveKind::TurnRight => {
                self.players[index].direction = self.players[index].direction.turn_right();
            }
            MoveKind::MoveForward => {
                let from = self.players[index].position;
                if let Some(to) = from.step(self.players[index].direction) {
                    let target = self.cell(to);
                    if target.is_walkable() {
                        let player = &mut self.players[index];
                        if target == Cell::Food {
                            player.energy = player.energy.saturating_add(self.config.food_energy);
                        }
                        player.position = to;
                        self.set(from, Cell::Empty);
                        self.set(to, Cell::Player);
                    }
                }
            }
        }

        let player = &mut self.players[index];
        player.energy = player.energy.saturating_sub(1);
        player.score += 1;
    }
}

/// One match on a generation's map.
#[derive(Debug)]
pub struct ArenaGame {
    config: ArenaConfig,
    parameters: Arc<ArenaParameters>,
}

impl ArenaGame {
    /// Create a match with the given settings and layout.
    #[must_use]
    pub fn new(config: ArenaConfig, parameters: Arc<ArenaParameters>) -> Self {
        Self { config, parameters }
    }
}

impl<C> CandidateTest<C> for ArenaGame
where
    C: Candidate<VisibleState = VisibleState, Move = MoveKind>,
{
    fn run(self, candidates: &[Arc<C>]) -> Result<CandidateTestResult, EvaluationError> {
        if candidates.len() > self.parameters.player_positions.len() {
            return Err(EvaluationError::test_failed(format!(
                "arena has {} start positions, {} players joined",
                self.parameters.player_positions.len(),
                candidates.len()
            )));
        }

        let players: Vec<CandidateId> = candidates.iter().map(|candidate| candidate.id()).collect();
        let mut state = ArenaState::new(self.config, &self.parameters, &players);
        let mut moves = Vec::new();
        let mut rounds = 0;

        while rounds < self.config.max_turns {
            let alive = state.alive();
            if alive.is_empty() {
                break;
            }
            for index in alive {
                let kind = candidates[index].next_move(&state.visible_for(index));
                moves.push(ArenaMove {
                    candidate_id: players[index],
                    kind,
                });
                state.apply(index, kind);
            }
            rounds += 1;
        }

        trace!(rounds, moves = moves.len(), "arena match finished");

        let candidate_ranks = state
            .players
            .iter()
            .map(|player| CandidateRank {
                candidate_id: player.candidate_id,
                score: f64::from(player.score),
            })
            .collect();

        let replay = ArenaReplay {
            parameters: ArenaParameters::clone(&self.parameters),
            players,
            rounds,
            moves,
        };
        let replay = serde_json::to_value(&replay).map_err(EvaluationError::test_failed)?;

        Ok(CandidateTestResult {
            candidate_ranks,
            replay: Some(replay),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::CandidateSource;
    use crate::population::PopulationId;

    /// Replays a fixed script of moves, then repeats the last one.
    #[derive(Debug)]
    struct ScriptedPlayer {
        id: CandidateId,
        script: Vec<MoveKind>,
        turn: std::sync::atomic::AtomicUsize,
    }

    impl ScriptedPlayer {
        fn new(script: Vec<MoveKind>) -> Self {
            Self {
                id: CandidateId::new(),
                script,
                turn: std::sync::atomic::AtomicUsize::new(0),
            }
        }
    }

    impl Candidate for ScriptedPlayer {
        type VisibleState = VisibleState;
        type Move = MoveKind;

        fn id(&self) -> CandidateId {
            self.id
        }

        fn parent_ids(&self) -> &[CandidateId] {
            &[]
        }

        fn source(&self) -> Option<CandidateSource> {
            None
        }

        fn next_move(&self, _visible: &VisibleState) -> MoveKind {
            let turn = self.turn.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.script
                .get(turn)
                .or(self.script.last())
                .copied()
                .unwrap_or_default()
        }

        fn dispose(&self) {}
    }

    fn small_config() -> ArenaConfig {
        ArenaConfig {
            columns: 7,
            rows: 7,
            initial_food_count: 1,
            visibility_radius: 1,
            max_turns: 100,
            initial_energy: 3,
            food_energy: 5,
            max_players: 2,
        }
    }

    fn parameters(players: Vec<Position>, food: Vec<Position>) -> Arc<ArenaParameters> {
        Arc::new(ArenaParameters {
            population_id: PopulationId::new(),
            player_positions: players,
            food_positions: food,
        })
    }

    #[test]
    fn test_score_counts_moves_until_energy_runs_out() {
        let game =
            ArenaGame::new(small_config(), parameters(vec![Position::new(1, 1)], Vec::new()));
        let player = Arc::new(ScriptedPlayer::new(vec![MoveKind::TurnLeft]));

        let result = game.run(&[Arc::clone(&player)]).unwrap();

        assert_eq!(result.score_of(player.id), Some(3.0));
    }

    #[test]
    fn test_food_refills_energy() {
        // Facing down from (1, 3): food directly below.
        let game = ArenaGame::new(
            small_config(),
            parameters(vec![Position::new(1, 3)], vec![Position::new(2, 3)]),
        );
        let player = Arc::new(ScriptedPlayer::new(vec![MoveKind::MoveForward, MoveKind::TurnLeft]));

        let result = game.run(&[Arc::clone(&player)]).unwrap();

        // 3 energy + 5 from food = 8 moves.
        assert_eq!(result.score_of(player.id), Some(8.0));
    }

    #[test]
    fn test_walls_block_movement() {
        // Start next to the bottom wall, facing down.
        let game =
            ArenaGame::new(small_config(), parameters(vec![Position::new(5, 3)], Vec::new()));
        let player = Arc::new(ScriptedPlayer::new(vec![MoveKind::MoveForward]));

        let result = game.run(&[Arc::clone(&player)]).unwrap();
        assert_eq!(result.score_of(player.id), Some(3.0));

        let replay: ArenaReplay = serde_json::from_value(result.replay.unwrap()).unwrap();
        assert_eq!(replay.moves.len(), 3);
        assert_eq!(replay.rounds, 3);
    }

    #[test]
    fn test_turn_limit() {
        let config = ArenaConfig {
            max_turns: 2,
            initial_energy: 50,
            ..small_config()
        };
        let game = ArenaGame::new(
            config,
            parameters(vec![Position::new(1, 1), Position::new(4, 4)], Vec::new()),
        );
        let first = Arc::new(ScriptedPlayer::new(vec![MoveKind::TurnRight]));
        let second = Arc::new(ScriptedPlayer::new(vec![MoveKind::TurnLeft]));

        let result = game.run(&[Arc::clone(&first), Arc::clone(&second)]).unwrap();

        assert_eq!(result.score_of(first.id), Some(2.0));
        assert_eq!(result.score_of(second.id), Some(2.0));
        let replay: ArenaReplay = serde_json::from_value(result.replay.unwrap()).unwrap();
        assert_eq!(replay.players, vec![first.id, second.id]);
        assert_eq!(replay.moves[0].candidate_id, first.id);
        assert_eq!(replay.moves[1].candidate_id, second.id);
    }

    #[test]
    fn test_too_many_players_fails() {
        let game =
            ArenaGame::new(small_config(), parameters(vec![Position::new(1, 1)], Vec::new()));
        let players = [
            Arc::new(ScriptedPlayer::new(Vec::new())),
            Arc::new(ScriptedPlayer::new(Vec::new())),
        ];

        let error = game.run(&players).unwrap_err();
        assert!(matches!(error, EvaluationError::TestFailed(_)));
    }

    #[test]
    fn test_visible_square() {
        let parameters = parameters(
            vec![Position::new(1, 1), Position::new(2, 2)],
            vec![Position::new(1, 2)],
        );
        let players = [CandidateId::new(), CandidateId::new()];
        let state = ArenaState::new(small_config(), &parameters, &players);

        let visible = state.visible_for(0);

        assert_eq!(visible.radius, 1);
        assert_eq!(
            visible.cells,
            vec![
                Cell::Wall, Cell::Wall, Cell::Wall,
                Cell::Wall, Cell::Empty, Cell::Food,
                Cell::Wall, Cell::Empty, Cell::Player,
            ]
        );
    }

    #[test]
    fn test_players_block_each_other() {
        // First player at (1, 3) faces down into the second at (2, 3).
        let game = ArenaGame::new(
            small_config(),
            parameters(vec![Position::new(1, 3), Position::new(2, 3)], Vec::new()),
        );
        let first = Arc::new(ScriptedPlayer::new(vec![MoveKind::MoveForward]));
        let second = Arc::new(ScriptedPlayer::new(vec![MoveKind::TurnLeft]));

        let result = game.run(&[Arc::clone(&first), Arc::clone(&second)]).unwrap();
        assert_eq!(result.score_of(first.id), Some(3.0));

        let parameters = parameters(vec![Position::new(1, 3), Position::new(2, 3)], Vec::new());
        let mut state = ArenaState::new(small_config(), &parameters, &[first.id, second.id]);
        state.apply(0, MoveKind::MoveForward);
        assert_eq!(state.players[0].position, Position::new(1, 3));
    }
}
