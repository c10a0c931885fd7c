//! Batch evaluation of a trained table against a uniform-random opponent.

use std::fmt;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::qlearn::game::Game;
use crate::qlearn::storage::QStore;
use crate::qlearn::trainer::{select_move, Fallback};

/// Win count and per-game timing for a batch of evaluation games.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    /// Games played.
    pub games: usize,
    /// Games won by the policy.
    pub wins: usize,
    /// Mean wall-clock seconds per game.
    pub mean_seconds: f64,
    /// Sample standard deviation of seconds per game (0 with fewer than two games).
    pub stdev_seconds: f64,
}

impl EvalReport {
    /// Summarize `(won, seconds)` results.
    pub fn from_results(results: &[(bool, f64)]) -> Self {
        let games = results.len();
        let wins = results.iter().filter(|(won, _)| *won).count();

        let mean_seconds = if games > 0 {
            results.iter().map(|(_, t)| t).sum::<f64>() / games as f64
        } else {
            0.0
        };

        let stdev_seconds = if games > 1 {
            let var = results
                .iter()
                .map(|(_, t)| (t - mean_seconds).powi(2))
                .sum::<f64>()
                / (games - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        Self {
            games,
            wins,
            mean_seconds,
            stdev_seconds,
        }
    }

    /// Fraction of games won.
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Won {}/{} games, average time of {:.6}s with stdev {:.6}s",
            self.wins, self.games, self.mean_seconds, self.stdev_seconds
        )
    }
}

/// Play one game: the policy sits at `policy_player`, every other seat
/// moves uniformly at random.
///
/// Returns whether the policy won and the wall-clock seconds taken.
pub fn play_vs_random<G, S, R>(
    game: &G,
    store: &S,
    policy_player: usize,
    fallback: Fallback<'_, G::Action>,
    rng: &mut R,
) -> (bool, f64)
where
    G: Game,
    S: QStore<G::Action> + ?Sized,
    R: Rng,
{
    let start = Instant::now();
    let mut state = game.initial_state();

    while !game.is_terminal(&state) {
        let Some(player) = game.current_player(&state) else {
            break;
        };

        let action = if player == policy_player {
            select_move(game, store, &state, fallback, rng)
        } else {
            game.available_actions(&state).choose(rng).cloned()
        };
        let Some(action) = action else {
            break;
        };

        state = game.apply_action(&state, &action);
    }

    let won = game.get_payoff(&state, policy_player) > 0.0;
    (won, start.elapsed().as_secs_f64())
}

/// Play `games` evaluation games in parallel.
///
/// The policy moves first in the first half of the games and second in the
/// rest. Game `i` draws its randomness from `seed + i`, so a report is
/// reproducible for a fixed table and seed.
pub fn evaluate<G, S>(
    game: &G,
    store: &S,
    games: usize,
    fallback: Fallback<'_, G::Action>,
    seed: u64,
) -> EvalReport
where
    G: Game,
    S: QStore<G::Action> + ?Sized,
{
    let results: Vec<(bool, f64)> = (0..games)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            let policy_player = if i * 2 > games { 1 } else { 0 };
            play_vs_random(game, store, policy_player, fallback, &mut rng)
        })
        .collect();

    EvalReport::from_results(&results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::{Checkers, GeometricApproximator};
    use crate::qlearn::config::QConfig;
    use crate::qlearn::storage::{MemoryStore, QEntry};
    use crate::qlearn::trainer::tests::{Countdown, Take};
    use crate::qlearn::trainer::QTrainer;

    #[test]
    fn test_report_statistics() {
        let report = EvalReport::from_results(&[(true, 1.0), (false, 2.0), (true, 3.0)]);
        assert_eq!(report.games, 3);
        assert_eq!(report.wins, 2);
        assert!((report.mean_seconds - 2.0).abs() < 1e-12);
        assert!((report.stdev_seconds - 1.0).abs() < 1e-12);
        assert!((report.win_rate() - 2.0 / 3.0).abs() < 1e-12);
        assert!(report.to_string().starts_with("Won 2/3 games"));
    }

    #[test]
    fn test_report_degenerate() {
        let empty = EvalReport::from_results(&[]);
        assert_eq!(empty.win_rate(), 0.0);
        assert_eq!(empty.stdev_seconds, 0.0);

        let single = EvalReport::from_results(&[(false, 0.5)]);
        assert_eq!(single.stdev_seconds, 0.0);
        assert_eq!(single.mean_seconds, 0.5);
    }

    #[test]
    fn test_perfect_policy_wins_first_seat() {
        // Winning lines for the first mover from a pile of 4.
        let store: MemoryStore<Take> = MemoryStore::new();
        store.set("4:0", vec![QEntry(Take(1), 1.0), QEntry(Take(2), -1.0)]).unwrap();
        store.set("2:0", vec![QEntry(Take(1), -1.0), QEntry(Take(2), 1.0)]).unwrap();
        store.set("1:0", vec![QEntry(Take(1), 1.0)]).unwrap();

        let game = Countdown { start: 4 };
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (won, secs) = play_vs_random(&game, &store, 0, Fallback::Random, &mut rng);
            assert!(won, "seed {}", seed);
            assert!(secs >= 0.0);
        }
    }

    #[test]
    fn test_policy_moves_first_in_first_half() {
        // From a pile of one, whoever moves first wins.
        let game = Countdown { start: 1 };
        let store: MemoryStore<Take> = MemoryStore::new();

        // Games 0..=2 of 4 put the policy first.
        assert_eq!(evaluate(&game, &store, 4, Fallback::Random, 0).wins, 3);
        // Games 0..=2 of 5 as well; 3 and 4 put it second.
        assert_eq!(evaluate(&game, &store, 5, Fallback::Random, 0).wins, 3);
        assert_eq!(evaluate(&game, &store, 1, Fallback::Random, 0).wins, 1);
        assert_eq!(evaluate(&game, &store, 2, Fallback::Random, 0).wins, 2);
    }

    #[test]
    fn test_evaluate_is_reproducible() {
        let mut trainer = QTrainer::new(Checkers::new(), QConfig::default().with_seed(21));
        trainer.train(20).unwrap();
        let approximator = GeometricApproximator;

        let a = evaluate(
            trainer.game(),
            trainer.store(),
            6,
            Fallback::Approximate(&approximator),
            99,
        );
        let b = evaluate(
            trainer.game(),
            trainer.store(),
            6,
            Fallback::Approximate(&approximator),
            99,
        );
        assert_eq!(a.games, 6);
        assert_eq!(a.wins, b.wins);
    }

    #[test]
    fn test_random_fallback_games_finish() {
        let trainer = QTrainer::new(Checkers::new(), QConfig::default().with_seed(4));
        let report = evaluate(trainer.game(), trainer.store(), 8, Fallback::Random, 1);
        assert_eq!(report.games, 8);
        assert!(report.wins <= 8);
    }
}
