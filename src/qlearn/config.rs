//! Configuration options for the Q-learning trainer.
//!
//! `QConfig` holds the three learning tunables plus the knobs that control
//! how an episode is backed up and how randomness is seeded. Only the three
//! tunables travel with a saved model, as [`ModelParams`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Order in which an episode's visited (state, move) pairs are updated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupOrder {
    /// Latest move first, each player's history on its own. The target of a
    /// move uses the best value of the state that followed it.
    #[default]
    Reverse,
    /// Earliest move first, carrying the running best value from one update
    /// into the next across both players' histories (floored at zero).
    /// Reproduces tables learned with the forward backup.
    Chronological,
}

/// Configuration for the Q-learning trainer.
///
/// # Example
/// ```
/// use checkers_qlearn::qlearn::QConfig;
///
/// let config = QConfig::default();
/// assert_eq!(config.epsilon, 0.5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QConfig {
    /// Step size of each value update, in [0, 1].
    pub learning_rate: f64,

    /// Weight of the following state's best value in an update target, in [0, 1].
    ///
    /// Training harnesses typically anneal this upward across a run.
    pub discount_factor: f64,

    /// Probability of exploring with a uniformly random move, in [0, 1].
    pub epsilon: f64,

    /// How terminal rewards are propagated through an episode.
    #[serde(default)]
    pub backup_order: BackupOrder,

    /// Random seed for reproducibility.
    ///
    /// If `None`, the trainer seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for QConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.5,
            epsilon: 0.5,
            backup_order: BackupOrder::Reverse,
            seed: None,
        }
    }
}

impl QConfig {
    /// Create a new QConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Low discount, high exploration: the starting point of an annealed run.
    pub fn annealing_start() -> Self {
        Self {
            discount_factor: 0.1,
            epsilon: 0.5,
            ..Default::default()
        }
    }

    /// Pure exploitation, for playing out a trained table.
    pub fn greedy() -> Self {
        Self {
            epsilon: 0.0,
            ..Default::default()
        }
    }

    /// Builder method: set learning rate.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Builder method: set discount factor.
    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    /// Builder method: set exploration probability.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.clamp(0.0, 1.0);
        self
    }

    /// Builder method: set backup order.
    pub fn with_backup_order(mut self, order: BackupOrder) -> Self {
        self.backup_order = order;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: take the three tunables from saved model parameters.
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.learning_rate = params.learning_rate;
        self.discount_factor = params.discount_factor;
        self.epsilon = params.epsilon;
        self
    }

    /// The tunables persisted alongside a Q-table.
    pub fn params(&self) -> ModelParams {
        ModelParams {
            learning_rate: self.learning_rate,
            discount_factor: self.discount_factor,
            epsilon: self.epsilon,
        }
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params().validate()
    }
}

/// The three learning tunables, as stored in a model file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Step size of each value update.
    pub learning_rate: f64,
    /// Weight of the following state's best value.
    pub discount_factor: f64,
    /// Exploration probability.
    pub epsilon: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        QConfig::default().params()
    }
}

impl ModelParams {
    /// Check every tunable lies in [0, 1].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(ConfigError::InvalidDiscount(self.discount_factor));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::InvalidEpsilon(self.epsilon));
        }
        Ok(())
    }
}

/// Errors that can occur when validating trainer configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Learning rate is out of range [0, 1].
    InvalidLearningRate(f64),
    /// Discount factor is out of range [0, 1].
    InvalidDiscount(f64),
    /// Exploration probability is out of range [0, 1].
    InvalidEpsilon(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidLearningRate(val) => {
                write!(f, "Learning rate {} is out of range [0, 1]", val)
            }
            ConfigError::InvalidDiscount(val) => {
                write!(f, "Discount factor {} is out of range [0, 1]", val)
            }
            ConfigError::InvalidEpsilon(val) => {
                write!(f, "Exploration probability {} is out of range [0, 1]", val)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Statistics tracked during training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainStats {
    /// Total number of episodes completed.
    pub episodes: u64,

    /// Number of distinct state keys in the table.
    pub states: usize,

    /// Plies played across all episodes.
    pub total_plies: u64,

    /// Episodes won by each player (index 0 moves first).
    pub wins: [u64; 2],

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Episodes per second.
    pub episodes_per_second: f64,
}

impl TrainStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished episode.
    pub fn record_episode(&mut self, winner: Option<usize>, plies: u32) {
        self.episodes += 1;
        self.total_plies += plies as u64;
        if let Some(w) = winner.filter(|&w| w < self.wins.len()) {
            self.wins[w] += 1;
        }
    }

    /// Mean episode length in plies.
    pub fn average_plies(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_plies as f64 / self.episodes as f64
        }
    }

    /// Update episodes per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.episodes_per_second = self.episodes as f64 / self.elapsed_seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ranges() {
        assert!(QConfig::default().validate().is_ok());
        assert!(matches!(
            QConfig::default().with_learning_rate(1.5).validate(),
            Err(ConfigError::InvalidLearningRate(_))
        ));
        assert!(matches!(
            QConfig::default().with_discount_factor(-0.1).validate(),
            Err(ConfigError::InvalidDiscount(_))
        ));
        // Builder clamps epsilon
        assert_eq!(QConfig::default().with_epsilon(3.0).epsilon, 1.0);
    }

    #[test]
    fn test_params_round_trip_through_config() {
        let params = ModelParams {
            learning_rate: 0.2,
            discount_factor: 0.9,
            epsilon: 0.05,
        };
        let config = QConfig::default().with_seed(7).with_params(params);
        assert_eq!(config.params(), params);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_stats_recording() {
        let mut stats = TrainStats::new();
        stats.record_episode(Some(0), 40);
        stats.record_episode(Some(1), 60);
        stats.record_episode(None, 10);
        assert_eq!(stats.episodes, 3);
        assert_eq!(stats.wins, [1, 1]);
        assert!((stats.average_plies() - 110.0 / 3.0).abs() < 1e-9);
    }
}
