//! Value estimates for states missing from the Q-table.
//!
//! When the policy meets a state it has never trained on, an
//! [`Approximator`] compares the new state against every stored state and
//! lets similar ones vote on the candidate moves. Each vote adds
//! `similarity * stored_value` to a move's numerator and `similarity` to its
//! denominator; moves are ranked by the ratio.

use crate::qlearn::game::Action;
use crate::qlearn::storage::{QEntry, QStore};

/// Accumulated votes for one candidate move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveScore<A> {
    /// The candidate.
    pub action: A,
    /// Sum of `similarity * value` over matching stored entries.
    pub numerator: f64,
    /// Sum of `similarity` over matching stored entries.
    pub denominator: f64,
}

impl<A> MoveScore<A> {
    /// A candidate with no votes yet.
    pub fn new(action: A) -> Self {
        Self {
            action,
            numerator: 0.0,
            denominator: 0.0,
        }
    }

    /// Add one weighted vote.
    pub fn add(&mut self, similarity: f64, value: f64) {
        self.numerator += similarity * value;
        self.denominator += similarity;
    }

    /// Weighted mean value, or 0 with no votes.
    pub fn estimate(&self) -> f64 {
        if self.denominator > 0.0 {
            self.numerator / self.denominator
        } else {
            0.0
        }
    }
}

/// Game-specific similarity heuristic.
pub trait Approximator<A: Action>: Send + Sync {
    /// Let one stored state vote on the candidates for the unseen state `key`.
    ///
    /// # Arguments
    /// * `seen_key` - Key of a state present in the table
    /// * `seen` - Its stored entries
    /// * `key` - Key of the state a move is needed for
    /// * `scores` - One accumulator per legal move of `key`
    fn accumulate(&self, seen_key: &str, seen: &[QEntry<A>], key: &str, scores: &mut [MoveScore<A>]);
}

/// Score every legal move of `key` against the whole table.
///
/// Returned in legal-move order; call [`approximate`] for just the winner.
pub fn score_moves<A, S>(
    store: &S,
    key: &str,
    moves: Vec<A>,
    approximator: &dyn Approximator<A>,
) -> Vec<MoveScore<A>>
where
    A: Action,
    S: QStore<A> + ?Sized,
{
    let mut scores: Vec<MoveScore<A>> = moves.into_iter().map(MoveScore::new).collect();
    store.for_each(&mut |seen_key: &str, entries: &[QEntry<A>]| {
        approximator.accumulate(seen_key, entries, key, &mut scores);
    });
    scores
}

/// Highest-estimate legal move for an unseen state; earliest wins ties.
///
/// Returns `None` only when `moves` is empty.
pub fn approximate<A, S>(
    store: &S,
    key: &str,
    moves: Vec<A>,
    approximator: &dyn Approximator<A>,
) -> Option<A>
where
    A: Action,
    S: QStore<A> + ?Sized,
{
    let scores = score_moves(store, key, moves, approximator);

    let mut best: Option<&MoveScore<A>> = None;
    for score in &scores {
        if best.map_or(true, |b| score.estimate() > b.estimate()) {
            best = Some(score);
        }
    }
    best.map(|s| s.action.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::moves::Move;
    use crate::qlearn::storage::MemoryStore;

    /// Votes with full weight whenever the stored move equals a candidate.
    struct SameMove;

    impl Approximator<Move> for SameMove {
        fn accumulate(&self, _: &str, seen: &[QEntry<Move>], _: &str, scores: &mut [MoveScore<Move>]) {
            for entry in seen {
                for score in scores.iter_mut() {
                    if score.action == entry.0 {
                        score.add(1.0, entry.1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_estimate_without_votes_is_zero() {
        let mut score = MoveScore::new(Move::Step { from: 0, to: 4 });
        assert_eq!(score.estimate(), 0.0);
        score.add(0.5, 1.0);
        score.add(0.5, -0.5);
        assert!((score.estimate() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_approximate_ranks_by_weighted_mean() {
        let a = Move::Step { from: 8, to: 12 };
        let b = Move::Step { from: 8, to: 13 };
        let c = Move::Step { from: 9, to: 13 };

        let store: MemoryStore<Move> = MemoryStore::new();
        store.set("s1", vec![QEntry(a.clone(), -0.4), QEntry(b.clone(), 0.3)]).unwrap();
        store.set("s2", vec![QEntry(b.clone(), 0.1)]).unwrap();

        let picked = approximate(&store, "unseen", vec![a.clone(), c.clone(), b.clone()], &SameMove);
        assert_eq!(picked, Some(b));

        // Unvoted moves score 0, so c beats a
        let scores = score_moves(&store, "unseen", vec![a.clone(), c.clone()], &SameMove);
        assert_eq!(scores[1].estimate(), 0.0);
        assert_eq!(approximate(&store, "unseen", vec![a, c.clone()], &SameMove), Some(c));
    }
}
