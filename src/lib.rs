//! # Checkers Q-Learning
//!
//! A checkers rules engine and a self-play tabular Q-learning trainer.
//!
//! ## Features
//!
//! - **Rules Engine**: 32-cell board graph with mandatory multi-jump captures
//!   and promotion
//! - **Generic Trainer**: Works with any game implementing the `Game` trait
//! - **Pluggable Tables**: In-memory table or a write-through journal file
//! - **Approximation**: Plays unseen positions using translated experience
//! - **Parallel Evaluation**: Batches of games against a random opponent
//!
//! ## Quick Start
//!
//! ```ignore
//! use checkers_qlearn::checkers::Checkers;
//! use checkers_qlearn::qlearn::{QConfig, QTrainer};
//!
//! let mut trainer = QTrainer::new(Checkers::new(), QConfig::default());
//! trainer.train(10_000)?;
//! trainer.export_model().save_json("model.json")?;
//! ```
//!
//! ## Modules
//!
//! - [`qlearn`]: Game-agnostic Q-learning trainer and table storage
//! - [`checkers`]: Board, move generation and the checkers approximator
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Q-Learning Trainer (Generic)                │
//! │  - Epsilon-greedy self-play   - Reward backup                   │
//! │  - Greedy lookup              - Miss fallback / approximation   │
//! └─────────────────────────────────────────────────────────────────┘
//!                   │                               │
//!                   │ implements Game trait         │ QStore trait
//!                   ▼                               ▼
//!            ┌─────────────┐            ┌───────────────────────┐
//!            │  Checkers   │            │ MemoryStore / Journal │
//!            └─────────────┘            └───────────────────────┘
//! ```

#![warn(missing_docs)]

/// Self-play tabular Q-learning.
///
/// This is the core module containing the generic trainer.
pub mod qlearn;

/// Checkers rules engine.
///
/// Implements the `Game` trait so it can be trained on.
pub mod checkers;

// Re-export commonly used types at crate root for convenience
pub use qlearn::{Action, Game, GameState, QConfig, QTrainer, TrainStats};
