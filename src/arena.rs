//! Foraging arena: a reference scenario for the evolution engine.
//!
//! Players walk a walled grid, spending one energy per move and refilling it
//! by stepping onto food. Every move a player survives earns one point, so
//! fitness rewards finding food before running dry.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ ArenaFactory      one map per generation     │
//! │   └─ ArenaGame    turn loop, scores, replay  │
//! ├──────────────────────────────────────────────┤
//! │ ArenaPlayerFactory  breed dense networks     │
//! │   └─ ArenaPlayer    network -> MoveKind      │
//! └──────────────────────────────────────────────┘
//! ```

mod config;
mod game;
mod network;
mod player;

pub use config::{ArenaConfig, ArenaFactory, ArenaParameters};
pub use game::{ArenaGame, ArenaMove, ArenaReplay};
pub use network::{Layer, Network};
pub use player::{ArenaPlayer, ArenaPlayerConfig, ArenaPlayerFactory};

use serde::{Deserialize, Serialize};

/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Row, from the top.
    pub row: usize,
    /// Column, from the left.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// The neighbouring position in `direction`, if it is not off the top or
    /// left edge.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (row, column) = match direction {
            Direction::Up => (self.row.checked_sub(1)?, self.column),
            Direction::Right => (self.row, self.column + 1),
            Direction::Down => (self.row + 1, self.column),
            Direction::Left => (self.row, self.column.checked_sub(1)?),
        };
        Some(Self { row, column })
    }
}

/// Facing of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Towards higher columns.
    Right,
    /// Towards higher rows. Players start facing down.
    #[default]
    Down,
    /// Towards column 0.
    Left,
}

impl Direction {
    /// Direction after a quarter turn counter-clockwise.
    #[must_use]
    pub const fn turn_left(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Right => Self::Up,
            Self::Down => Self::Right,
            Self::Left => Self::Down,
        }
    }

    /// Direction after a quarter turn clockwise.
    #[must_use]
    pub const fn turn_right(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    /// Numeric encoding used as network input.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }
}

/// Content of a grid cell as seen by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cell {
    /// Nothing there.
    #[default]
    Empty,
    /// Border wall, or anything outside the grid.
    Wall,
    /// Another player.
    Player,
    /// Food that refills energy.
    Food,
}

impl Cell {
    /// Numeric encoding used as network input.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Wall => 1,
            Self::Player => 2,
            Self::Food => 3,
        }
    }

    /// Whether a player can move into this cell.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Empty | Self::Food)
    }
}

/// A player's decision for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveKind {
    /// Quarter turn counter-clockwise.
    #[default]
    TurnLeft,
    /// Quarter turn clockwise.
    TurnRight,
    /// One step in the facing direction.
    MoveForward,
}

/// What a player sees before deciding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleState {
    /// Remaining energy.
    pub energy: u32,
    /// Own position.
    pub position: Position,
    /// Own facing.
    pub direction: Direction,
    /// Visibility radius the cells were gathered with.
    pub radius: usize,
    /// The `(2 * radius + 1)²` square centred on the player, row-major.
    /// The player's own cell reads as [`Cell::Empty`].
    pub cells: Vec<Cell>,
}

impl VisibleState {
    /// Number of network inputs for a visibility radius.
    #[must_use]
    pub const fn input_count(radius: usize) -> usize {
        let side = 2 * radius + 1;
        4 + side * side
    }

    /// Flatten into network inputs: energy, row, column, direction, cells.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_inputs(&self) -> Vec<f64> {
        let mut inputs = Vec::with_capacity(4 + self.cells.len());
        inputs.push(f64::from(self.energy));
        inputs.push(self.position.row as f64);
        inputs.push(self.position.column as f64);
        inputs.push(f64::from(self.direction.code()));
        inputs.extend(self.cells.iter().map(|cell| f64::from(cell.code())));
        inputs
    }
}
