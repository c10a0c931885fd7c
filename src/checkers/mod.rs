//! Checkers on the 32 playable squares of an 8x8 board.
//!
//! Black starts on cells 0-11 and moves toward higher rows, white starts on
//! cells 20-31 and moves toward lower rows. Captures are mandatory and a
//! capture chain continues as long as another jump is available.

pub mod approx;
pub mod board;
pub mod game;
pub mod moves;
pub mod piece;

pub use approx::GeometricApproximator;
pub use board::{Board, Cell, Direction, NUM_CELLS};
pub use game::{Checkers, CheckersState};
pub use moves::{Jump, Move};
pub use piece::{Colour, Piece};
