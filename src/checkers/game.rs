//! Game state and turn handling for checkers.
//!
//! `CheckersState` owns a [`Board`] and tracks whose turn it is. Legal moves
//! follow the mandatory-capture rule: if any capture chain exists for the
//! side to move, only capture chains are playable. A side with no legal move
//! loses; there is no draw.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::qlearn::game::{Action, Game, GameState};

use super::board::Board;
use super::moves::Move;
use super::piece::{Colour, Piece};

impl Action for Move {
    fn to_string(&self) -> String {
        format!("{}", self)
    }
}

/// A position plus turn bookkeeping for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckersState {
    /// Pieces on the board.
    pub board: Board,
    /// Side to move.
    pub turn: Colour,
    /// Side that moved first.
    pub initial_turn: Colour,
    /// Plies played so far.
    pub moves_played: u32,
    /// Set once the side to move has no legal move.
    pub over: bool,
    /// Side that made the last move of a finished game.
    pub winner: Option<Colour>,
}

impl GameState for CheckersState {}

impl Default for CheckersState {
    fn default() -> Self {
        Self::new(Colour::Black)
    }
}

impl CheckersState {
    /// Standard opening with `turn` to move.
    pub fn new(turn: Colour) -> Self {
        Self::with_board(Board::new(), turn)
    }

    /// Arbitrary position with `turn` to move.
    ///
    /// The game is marked over immediately if `turn` has nothing to play.
    pub fn with_board(board: Board, turn: Colour) -> Self {
        let mut state = Self {
            board,
            turn,
            initial_turn: turn,
            moves_played: 0,
            over: false,
            winner: None,
        };
        if state.playable_moves().is_empty() {
            state.over = true;
            state.winner = Some(turn.opponent());
        }
        state
    }

    /// Every legal move for the side to move.
    ///
    /// Capture chains from all of that side's pieces if there are any,
    /// otherwise simple steps. Empty means the side to move has lost.
    pub fn playable_moves(&self) -> Vec<Move> {
        let mut jumps = Vec::new();
        let mut steps = Vec::new();

        for cell in self.board.cells() {
            match cell.piece {
                Some(Piece { colour, .. }) if colour == self.turn => {
                    jumps.extend(self.board.valid_jumps(cell.index));
                    if jumps.is_empty() {
                        steps.extend(self.board.valid_moves(cell.index));
                    }
                }
                _ => {}
            }
        }

        if jumps.is_empty() {
            steps
        } else {
            jumps
        }
    }

    /// Play `mv` for the side to move and hand the turn over.
    ///
    /// `mv` must come from [`CheckersState::playable_moves`]; other moves
    /// leave the position undefined.
    pub fn do_move(&mut self, mv: &Move) {
        debug_assert!(!self.over, "move played after the game ended");
        debug_assert_eq!(
            self.board.get(mv.origin()).map(|p| p.colour),
            Some(self.turn),
            "moving a piece that does not belong to the side to move"
        );

        self.board.apply(mv);
        self.turn = self.turn.opponent();
        self.moves_played += 1;

        if self.playable_moves().is_empty() {
            self.over = true;
            self.winner = Some(self.turn.opponent());
        }
    }

    /// `Some(true)` if the side that moved first won, `Some(false)` if it
    /// lost, `None` while the game is in progress.
    pub fn outcome(&self) -> Option<bool> {
        self.winner.map(|w| w == self.initial_turn)
    }

    /// State key: side-to-move abbreviation followed by one character per cell.
    pub fn key(&self) -> String {
        let mut key = String::with_capacity(33);
        key.push(self.turn.abbrev());
        key.push_str(&self.board.encode());
        key
    }

    /// A uniformly random legal move, or `None` if the game is over.
    pub fn random_move<R: Rng>(&self, rng: &mut R) -> Option<Move> {
        self.playable_moves().choose(rng).cloned()
    }

    /// Play a uniformly random legal move. Returns it, or `None` if the game is over.
    pub fn do_random_move<R: Rng>(&mut self, rng: &mut R) -> Option<Move> {
        let mv = self.random_move(rng)?;
        self.do_move(&mv);
        Some(mv)
    }
}

impl fmt::Display for CheckersState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)?;
        match self.winner {
            Some(w) => write!(f, "Game over after {} moves, {} wins", self.moves_played, w),
            None => write!(f, "Move {}, {} to play", self.moves_played + 1, self.turn),
        }
    }
}

/// Checkers as a trainable [`Game`]. Player 0 is the side that moves first.
#[derive(Debug, Clone)]
pub struct Checkers {
    first: Colour,
}

impl Default for Checkers {
    fn default() -> Self {
        Self::new()
    }
}

impl Checkers {
    /// Standard checkers, black moving first.
    pub fn new() -> Self {
        Self {
            first: Colour::Black,
        }
    }

    /// Standard checkers with `first` to move.
    pub fn starting_with(first: Colour) -> Self {
        Self { first }
    }

    /// Player index of a colour.
    pub fn player_of(&self, colour: Colour) -> usize {
        if colour == self.first {
            0
        } else {
            1
        }
    }
}

impl Game for Checkers {
    type State = CheckersState;
    type Action = Move;

    fn initial_state(&self) -> Self::State {
        CheckersState::new(self.first)
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.over
    }

    fn get_payoff(&self, state: &Self::State, player: usize) -> f64 {
        match state.outcome() {
            Some(first_won) => {
                if first_won == (player == 0) {
                    1.0
                } else {
                    -1.0
                }
            }
            None => 0.0,
        }
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        if state.over {
            return None;
        }
        Some(if state.turn == state.initial_turn { 0 } else { 1 })
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if state.over {
            return vec![];
        }
        state.playable_moves()
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let mut next = state.clone();
        next.do_move(action);
        next
    }

    fn state_key(&self, state: &Self::State) -> String {
        state.key()
    }

    fn state_description(&self, state: &Self::State) -> String {
        format!("{}", state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::moves::Jump;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state_with(turn: Colour, pieces: &[(u8, Piece)]) -> CheckersState {
        let mut board = Board::empty();
        for &(i, p) in pieces {
            board.set(i, Some(p));
        }
        CheckersState::with_board(board, turn)
    }

    #[test]
    fn test_opening_moves() {
        let state = CheckersState::new(Colour::Black);
        let moves = state.playable_moves();

        // Front rank 8..12: three pieces with two diagonals, 11 on the edge with one
        assert_eq!(moves.len(), 7);
        assert!(moves.iter().all(|m| !m.is_capture()));
        assert!(moves.iter().all(|m| (8..12).contains(&m.origin())));
        assert!(moves.contains(&Move::Step { from: 11, to: 15 }));

        let white = CheckersState::new(Colour::White);
        assert_eq!(white.playable_moves().len(), 7);
    }

    #[test]
    fn test_mandatory_capture() {
        let state = state_with(
            Colour::Black,
            &[
                (9, Piece::man(Colour::Black)),
                (2, Piece::man(Colour::Black)),
                (13, Piece::man(Colour::White)),
                (30, Piece::man(Colour::White)),
            ],
        );
        let moves = state.playable_moves();
        assert_eq!(
            moves,
            vec![Move::Capture {
                from: 9,
                jumps: vec![Jump::new(13, 16)],
            }]
        );
    }

    #[test]
    fn test_do_move_flips_turn_and_ends_game() {
        // White's only piece is captured: black wins.
        let mut state = state_with(
            Colour::Black,
            &[
                (9, Piece::man(Colour::Black)),
                (13, Piece::man(Colour::White)),
            ],
        );
        assert!(!state.over);
        let mv = state.playable_moves()[0].clone();
        state.do_move(&mv);

        assert_eq!(state.moves_played, 1);
        assert_eq!(state.turn, Colour::White);
        assert!(state.over);
        assert_eq!(state.winner, Some(Colour::Black));
        assert_eq!(state.outcome(), Some(true));
        assert!(state.playable_moves().is_empty());
    }

    #[test]
    fn test_blocked_side_loses() {
        // White man on 4 cannot move down-left off the board; 0 is occupied.
        let state = state_with(
            Colour::White,
            &[
                (4, Piece::man(Colour::White)),
                (0, Piece::man(Colour::Black)),
                (8, Piece::man(Colour::Black)),
            ],
        );
        assert!(state.over);
        assert_eq!(state.winner, Some(Colour::Black));
        assert_eq!(state.outcome(), Some(false));
    }

    #[test]
    fn test_double_jump_removes_two_pieces() {
        let mut state = state_with(
            Colour::Black,
            &[
                (1, Piece::man(Colour::Black)),
                (6, Piece::man(Colour::White)),
                (14, Piece::man(Colour::White)),
                (31, Piece::man(Colour::White)),
            ],
        );
        let moves = state.playable_moves();
        assert_eq!(moves.len(), 1);
        let chain = moves[0].clone();
        assert_eq!(chain.captured().len(), 2);

        let before = state.board.count(Colour::White);
        state.do_move(&chain);
        assert_eq!(state.board.count(Colour::White), before - 2);
        assert_eq!(state.board.get(chain.destination()).map(|p| p.colour), Some(Colour::Black));
        assert_eq!(chain.destination(), 17);
    }

    #[test]
    fn test_promotion_persists() {
        let mut state = state_with(
            Colour::White,
            &[
                (5, Piece::man(Colour::White)),
                (20, Piece::man(Colour::Black)),
            ],
        );
        state.do_move(&Move::Step { from: 5, to: 1 });
        assert_eq!(state.board.get(1), Some(Piece::king(Colour::White)));

        state.do_move(&Move::Step { from: 20, to: 24 });
        assert_eq!(state.board.get(1), Some(Piece::king(Colour::White)));
        // A king may now step back up the board
        assert!(state
            .playable_moves()
            .iter()
            .any(|m| *m == Move::Step { from: 1, to: 5 }));
    }

    #[test]
    fn test_state_keys() {
        let a = CheckersState::new(Colour::Black);
        let b = CheckersState::new(Colour::Black);
        let c = CheckersState::new(Colour::White);
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key(), "bbbbbbbbbbbbbxxxxxxxxwwwwwwwwwwww");
        assert_ne!(a.key(), c.key());

        let mut d = a.clone();
        d.do_move(&Move::Step { from: 8, to: 12 });
        assert_ne!(a.board.encode(), d.board.encode());
        assert_eq!(d.key().len(), 33);
    }

    #[test]
    fn test_single_cell_changes_key() {
        let man = state_with(
            Colour::Black,
            &[(9, Piece::man(Colour::Black)), (30, Piece::man(Colour::White))],
        );
        let king = state_with(
            Colour::Black,
            &[(9, Piece::king(Colour::Black)), (30, Piece::man(Colour::White))],
        );
        let white = state_with(
            Colour::Black,
            &[(9, Piece::man(Colour::Black)), (30, Piece::king(Colour::White))],
        );
        assert_ne!(man.key(), king.key());
        assert_ne!(man.key(), white.key());
        assert_eq!(man.key().as_bytes()[10], b'b');
        assert_eq!(king.key().as_bytes()[10], b'B');
        assert_eq!(white.key().as_bytes()[31], b'W');
    }

    #[test]
    fn test_random_play_terminates() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = CheckersState::new(Colour::Black);
            let mut pieces = state.board.piece_count();
            assert_eq!(pieces, 24);

            while !state.over {
                assert!(state.moves_played < 1000, "seed {} did not terminate", seed);
                state.do_random_move(&mut rng);
                let now = state.board.piece_count();
                assert!(now <= pieces);
                pieces = now;
            }

            assert!(state.winner.is_some());
            assert!(state.random_move(&mut rng).is_none());
        }
    }

    #[test]
    fn test_game_trait_payoffs() {
        let game = Checkers::new();
        let state = game.initial_state();
        assert_eq!(game.current_player(&state), Some(0));
        assert_eq!(game.get_payoff(&state, 0), 0.0);

        let next = game.apply_action(&state, &game.available_actions(&state)[0]);
        assert_eq!(game.current_player(&next), Some(1));
        assert_eq!(next.moves_played, 1);
        assert_eq!(state.moves_played, 0);

        let won = state_with(
            Colour::Black,
            &[
                (9, Piece::man(Colour::Black)),
                (13, Piece::man(Colour::White)),
            ],
        );
        let done = game.apply_action(&won, &won.playable_moves()[0]);
        assert!(game.is_terminal(&done));
        assert_eq!(game.get_payoff(&done, 0), 1.0);
        assert_eq!(game.get_payoff(&done, 1), -1.0);
        assert_eq!(game.current_player(&done), None);
    }

    #[test]
    fn test_seats_follow_first_mover() {
        let game = Checkers::new();
        assert_eq!(game.player_of(Colour::Black), 0);
        assert_eq!(game.player_of(Colour::White), 1);
        assert_eq!(game.action_name(&Move::Step { from: 8, to: 12 }), "8-12");

        let game = Checkers::starting_with(Colour::White);
        assert_eq!(game.player_of(Colour::White), 0);
        let state = game.initial_state();
        assert_eq!(state.turn, Colour::White);
        assert_eq!(game.current_player(&state), Some(0));
        assert!(game.state_key(&state).starts_with('w'));
    }
}
