//! Game trait definition for the Q-learning trainer.
//!
//! Any two-player, perfect-information, turn-based game that implements the
//! `Game` trait can be trained by self-play. This keeps the learner free of
//! any knowledge of specific rules.

use std::fmt::Debug;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Trait for actions that can be taken in a game.
///
/// Actions are stored in the Q-table next to their values, so they must be
/// comparable, hashable and serializable.
pub trait Action: Clone + Eq + Hash + Debug + Send + Sync + Serialize + DeserializeOwned {
    /// Convert action to a string representation for display.
    fn to_string(&self) -> String;
}

/// Marker trait for game states.
pub trait GameState: Clone + Debug + Send + Sync {}

/// The main Game trait that defines the interface for any trainable game.
///
/// # Example
/// ```ignore
/// struct MyGame;
///
/// impl Game for MyGame {
///     type State = MyGameState;
///     type Action = MyAction;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Clone + Send + Sync {
    /// The type representing a complete game state.
    type State: GameState;

    /// The type representing an action a player can take.
    type Action: Action;

    /// Create the initial game state for a fresh episode.
    fn initial_state(&self) -> Self::State;

    /// Check if the given state is terminal (game over).
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Get the payoff for a player at a terminal state.
    ///
    /// # Arguments
    /// * `state` - A terminal game state
    /// * `player` - The player index (0 moves first)
    ///
    /// # Returns
    /// `1.0` for the winner, `-1.0` for the loser, `0.0` if undecided.
    fn get_payoff(&self, state: &Self::State, player: usize) -> f64;

    /// Get the index of the player who should act at the current state.
    ///
    /// # Returns
    /// - `Some(player_index)` if a player should act
    /// - `None` if the state is terminal
    fn current_player(&self, state: &Self::State) -> Option<usize>;

    /// Get the total number of players in the game.
    fn num_players(&self) -> usize {
        2
    }

    /// Get the list of legal actions at the current state.
    ///
    /// Returns an empty vector if the state is terminal.
    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply an action to a state and return the resulting new state.
    ///
    /// The action must be one returned by `available_actions` for `state`.
    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Canonical key of the full position, used to index the Q-table.
    ///
    /// Two states with identical positions and side to move must produce the
    /// same key; states that differ in any way must not.
    fn state_key(&self, state: &Self::State) -> String;

    /// Get a human-readable name for an action.
    fn action_name(&self, action: &Self::Action) -> String {
        action.to_string()
    }

    /// Get a human-readable description of a state.
    fn state_description(&self, state: &Self::State) -> String {
        format!("{:?}", state)
    }
}
