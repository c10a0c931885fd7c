//! Epsilon-greedy self-play Q-learning.
//!
//! Each episode plays one full game against itself. Every decision is
//! recorded as `(state_key, action)` in the history of the player who made
//! it. When the game ends, each player's history is backed up toward that
//! player's terminal reward (`+1` win, `-1` loss):
//!
//! ```text
//! value <- value + learning_rate * (reward + discount_factor * max_next - value)
//! ```
//!
//! where `max_next` is the best value of the state updated just before (see
//! [`BackupOrder`] for which state that is).
//!
//! The trainer is generic over any game implementing the `Game` trait and
//! any table backend implementing `QStore`.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::qlearn::approximate::{approximate, Approximator};
use crate::qlearn::config::{BackupOrder, QConfig, TrainStats};
use crate::qlearn::game::{Action, Game};
use crate::qlearn::model::Model;
use crate::qlearn::storage::{best_action, max_value, MemoryStore, QEntry, QStore, StoreError};

/// What to do when asked for a move in a state the table has never seen.
pub enum Fallback<'a, A: Action> {
    /// Pick uniformly among legal moves.
    Random,
    /// Let an approximator vote using similar stored states.
    Approximate(&'a dyn Approximator<A>),
}

impl<A: Action> Clone for Fallback<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: Action> Copy for Fallback<'_, A> {}

/// Record of one self-play game.
#[derive(Debug, Clone)]
pub struct Episode<A> {
    /// `(state_key, action)` per decision, one list per player, in play order.
    pub histories: Vec<Vec<(String, A)>>,
    /// Player that won, if the game was decided.
    pub winner: Option<usize>,
    /// Plies played.
    pub plies: u32,
}

/// Choose a move for `state` from a trained table.
///
/// Known states play their highest-valued legal move. Unknown states, and
/// stored entries with no legal move among them, defer to `fallback`. Returns `None` only if `state` has no legal move.
pub fn select_move<G, S, R>(
    game: &G,
    store: &S,
    state: &G::State,
    fallback: Fallback<'_, G::Action>,
    rng: &mut R,
) -> Option<G::Action>
where
    G: Game,
    S: QStore<G::Action> + ?Sized,
    R: Rng,
{
    let key = game.state_key(state);
    let actions = game.available_actions(state);

    if let Some(entries) = store.get(&key) {
        let legal: Vec<QEntry<G::Action>> = entries
            .into_iter()
            .filter(|e| actions.contains(&e.0))
            .collect();
        if let Some(action) = best_action(&legal) {
            return Some(action);
        }
    }

    match fallback {
        Fallback::Random => actions.choose(rng).cloned(),
        Fallback::Approximate(approximator) => approximate(store, &key, actions, approximator),
    }
}

/// Self-play Q-learning trainer.
///
/// # Example
/// ```ignore
/// use checkers_qlearn::checkers::Checkers;
/// use checkers_qlearn::qlearn::{QConfig, QTrainer};
///
/// let mut trainer = QTrainer::new(Checkers::new(), QConfig::default().with_seed(42));
/// let stats = trainer.train(1_000)?;
/// println!("{} states after {} episodes", stats.states, stats.episodes);
/// ```
pub struct QTrainer<G: Game, S: QStore<G::Action> = MemoryStore<<G as Game>::Action>> {
    /// The game being learned.
    game: G,

    /// Configuration for the trainer.
    config: QConfig,

    /// The Q-table.
    store: S,

    /// Episodes completed.
    episodes: u64,

    /// Statistics tracking.
    stats: TrainStats,

    /// Random number generator.
    rng: StdRng,
}

impl<G: Game> QTrainer<G> {
    /// Create a trainer with an empty in-memory table.
    pub fn new(game: G, config: QConfig) -> Self {
        Self::with_store(game, config, MemoryStore::new())
    }
}

impl<G: Game, S: QStore<G::Action>> QTrainer<G, S> {
    /// Create a trainer over an existing table backend.
    pub fn with_store(game: G, config: QConfig, store: S) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            game,
            config,
            store,
            episodes: 0,
            stats: TrainStats::new(),
            rng,
        }
    }

    /// Play one self-play episode and back up its result.
    pub fn run_episode(&mut self) -> Result<Episode<G::Action>, StoreError> {
        let num_players = self.game.num_players();
        let mut state = self.game.initial_state();
        let mut histories: Vec<Vec<(String, G::Action)>> = vec![Vec::new(); num_players];
        let mut plies = 0u32;

        while !self.game.is_terminal(&state) {
            let Some(player) = self.game.current_player(&state) else {
                break;
            };
            let key = self.game.state_key(&state);
            let actions = self.game.available_actions(&state);
            let Some(action) = self.training_move(&key, &actions)? else {
                break;
            };

            state = self.game.apply_action(&state, &action);
            histories[player].push((key, action));
            plies += 1;
        }

        let winner = (0..num_players).find(|&p| self.game.get_payoff(&state, p) > 0.0);
        if winner.is_some() {
            self.backup(&state, &histories)?;
        }

        self.episodes += 1;
        self.stats.record_episode(winner, plies);

        Ok(Episode {
            histories,
            winner,
            plies,
        })
    }

    /// Train for a number of episodes.
    ///
    /// # Returns
    /// Statistics from the training run.
    pub fn train(&mut self, episodes: u64) -> Result<&TrainStats, StoreError> {
        let start_time = Instant::now();

        for _ in 0..episodes {
            self.run_episode()?;
        }

        self.finish_stats(start_time);
        Ok(&self.stats)
    }

    /// Train with a callback for progress tracking and parameter schedules.
    ///
    /// # Arguments
    /// * `episodes` - Number of episodes to run
    /// * `callback_interval` - How often to call the callback
    /// * `callback` - Called every `callback_interval` episodes; may adjust
    ///   the configuration used by the following episodes
    pub fn train_with_callback<F>(
        &mut self,
        episodes: u64,
        callback_interval: u64,
        mut callback: F,
    ) -> Result<&TrainStats, StoreError>
    where
        F: FnMut(&mut QConfig, &TrainStats),
    {
        let start_time = Instant::now();
        let interval = callback_interval.max(1);

        for i in 0..episodes {
            self.run_episode()?;

            if (i + 1) % interval == 0 {
                self.finish_stats(start_time);
                callback(&mut self.config, &self.stats);
            }
        }

        self.finish_stats(start_time);
        Ok(&self.stats)
    }

    fn finish_stats(&mut self, start_time: Instant) {
        self.stats.states = self.store.len();
        self.stats.elapsed_seconds = start_time.elapsed().as_secs_f64();
        self.stats.update_rate();
    }

    /// Epsilon-greedy choice during training.
    ///
    /// A state seen for the first time gets a zero entry for every legal
    /// action and a random move. Afterwards the best known move is played
    /// unless the exploration roll comes up.
    fn training_move(
        &mut self,
        key: &str,
        actions: &[G::Action],
    ) -> Result<Option<G::Action>, StoreError> {
        if actions.is_empty() {
            return Ok(None);
        }

        match self.store.get(key) {
            None => {
                let entries = actions.iter().cloned().map(QEntry::zero).collect();
                self.store.set(key, entries)?;
                Ok(actions.choose(&mut self.rng).cloned())
            }
            Some(entries) => {
                if self.rng.gen::<f64>() > self.config.epsilon {
                    if let Some(best) = best_action(&entries) {
                        return Ok(Some(best));
                    }
                }
                Ok(actions.choose(&mut self.rng).cloned())
            }
        }
    }

    /// Back up a finished episode into the table.
    ///
    /// # Arguments
    /// * `terminal` - The final state, used for each player's reward
    /// * `histories` - `(state_key, action)` per player, in play order
    pub fn backup(
        &self,
        terminal: &G::State,
        histories: &[Vec<(String, G::Action)>],
    ) -> Result<(), StoreError> {
        let gamma = self.config.discount_factor;

        match self.config.backup_order {
            BackupOrder::Reverse => {
                for (player, history) in histories.iter().enumerate() {
                    let reward = self.game.get_payoff(terminal, player);
                    let mut max_next = 0.0;
                    for (key, action) in history.iter().rev() {
                        if let Some(best) = self.update_value(key, action, reward + gamma * max_next)? {
                            max_next = best;
                        }
                    }
                }
            }
            BackupOrder::Chronological => {
                let mut max_next: f64 = 0.0;
                for (player, history) in histories.iter().enumerate() {
                    let reward = self.game.get_payoff(terminal, player);
                    for (key, action) in history {
                        if let Some(best) = self.update_value(key, action, reward + gamma * max_next)? {
                            max_next = best.max(0.0);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Move one entry toward `target`; returns the state's new best value.
    fn update_value(
        &self,
        key: &str,
        action: &G::Action,
        target: f64,
    ) -> Result<Option<f64>, StoreError> {
        let Some(mut entries) = self.store.get(key) else {
            return Ok(None);
        };

        let index = match entries.iter().position(|e| e.0 == *action) {
            Some(i) => i,
            None => {
                entries.push(QEntry::zero(action.clone()));
                entries.len() - 1
            }
        };

        let entry = &mut entries[index];
        entry.1 += self.config.learning_rate * (target - entry.1);

        let best = max_value(&entries);
        self.store.set(key, entries)?;
        Ok(best)
    }

    /// Best known move for `state`, deferring to `fallback` for unseen states.
    pub fn select_move(
        &mut self,
        state: &G::State,
        fallback: Fallback<'_, G::Action>,
    ) -> Option<G::Action> {
        select_move(&self.game, &self.store, state, fallback, &mut self.rng)
    }

    /// Highest-valued stored action for a state key.
    pub fn best_move(&self, key: &str) -> Option<G::Action> {
        self.store.get(key).and_then(|entries| best_action(&entries))
    }

    /// Stored value of one action in one state.
    pub fn value(&self, key: &str, action: &G::Action) -> Option<f64> {
        self.store
            .get(key)?
            .iter()
            .find(|e| e.0 == *action)
            .map(|e| e.1)
    }

    /// Get the number of episodes completed.
    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    /// Get the number of states in the table.
    pub fn num_states(&self) -> usize {
        self.store.len()
    }

    /// Get current statistics.
    pub fn stats(&self) -> &TrainStats {
        &self.stats
    }

    /// Get reference to the table.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get reference to the game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &QConfig {
        &self.config
    }

    /// Get mutable access to the configuration (for annealing schedules).
    pub fn config_mut(&mut self) -> &mut QConfig {
        &mut self.config
    }

    /// Snapshot the tunables and table.
    pub fn export_model(&self) -> Model<G::Action> {
        Model::from_store(self.config.params(), &self.store)
    }

    /// Adopt a model's tunables and copy its table into the store.
    pub fn import_model(&mut self, model: &Model<G::Action>) -> Result<(), StoreError> {
        self.config = self.config.clone().with_params(model.params);
        model.load_into(&self.store)
    }

    /// Reset the trainer to an empty table.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.store.clear()?;
        self.episodes = 0;
        self.stats = TrainStats::new();
        Ok(())
    }
}
