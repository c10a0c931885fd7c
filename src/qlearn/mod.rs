//! Tabular Q-learning by self-play.
//!
//! This module provides a game-agnostic learner for two-player, turn-based,
//! perfect-information games. It keeps one value per (state, action) pair
//! and improves them by playing the game against itself.
//!
//! # Overview
//!
//! Each training episode:
//! 1. Plays one game, choosing moves epsilon-greedily from the table
//! 2. Records every decision in the history of the player that made it
//! 3. Backs up each history toward that player's final reward
//!
//! States never met in training can still be played: the trained policy
//! falls back to a random legal move or to a game-specific [`Approximator`]
//! that borrows values from similar stored states.
//!
//! # Usage
//!
//! 1. Implement the `Game` trait for your game
//! 2. Create a `QTrainer` with your game and configuration
//! 3. Call `train()` to run episodes
//! 4. Export the table with `export_model()` or query it with `select_move()`
//!
//! # Example
//!
//! ```ignore
//! use checkers_qlearn::checkers::{Checkers, GeometricApproximator};
//! use checkers_qlearn::qlearn::{evaluate, Fallback, QConfig, QTrainer};
//!
//! let mut trainer = QTrainer::new(Checkers::new(), QConfig::default());
//! trainer.train(10_000)?;
//!
//! let report = evaluate(
//!     trainer.game(),
//!     trainer.store(),
//!     100,
//!     Fallback::Approximate(&GeometricApproximator),
//!     42,
//! );
//! println!("{}", report);
//! ```
//!
//! # Update rule
//!
//! ```text
//! Q(s, a) <- Q(s, a) + lr * (reward + gamma * max_next - Q(s, a))
//! ```
//!
//! `reward` is `+1` for the winner's decisions and `-1` for the loser's;
//! undecided games are not backed up.

pub mod approximate;
pub mod config;
pub mod evaluate;
pub mod game;
pub mod model;
pub mod storage;
pub mod trainer;

// Re-export main types for convenient access
pub use approximate::{approximate, score_moves, Approximator, MoveScore};
pub use config::{BackupOrder, ConfigError, ModelParams, QConfig, TrainStats};
pub use evaluate::{evaluate, play_vs_random, EvalReport};
pub use game::{Action, Game, GameState};
pub use model::Model;
pub use storage::{JournalStore, MemoryStore, QEntry, QStore, StoreError};
pub use trainer::{select_move, Episode, Fallback, QTrainer};
