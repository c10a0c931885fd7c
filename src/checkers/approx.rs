//! Borrowing learned values across translations of the board.
//!
//! A move recorded in a seen state votes for a candidate move in the new
//! state when shifting the recorded move by the offset between the two
//! origins reproduces the candidate exactly. The vote is weighted by how
//! much of the seen board, shifted the same way, agrees with the new one.

use crate::checkers::board::{cell_at, cell_coords, NUM_CELLS};
use crate::checkers::moves::Move;
use crate::checkers::piece::Colour;
use crate::qlearn::approximate::{Approximator, MoveScore};
use crate::qlearn::storage::QEntry;

/// Grid translation in rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    /// Rows toward white's side.
    pub rows: i8,
    /// Columns to the right.
    pub cols: i8,
}

impl Offset {
    /// Translation carrying cell `from` onto cell `to`.
    pub fn between(from: u8, to: u8) -> Self {
        let (fr, fc) = cell_coords(from);
        let (tr, tc) = cell_coords(to);
        Self {
            rows: tr - fr,
            cols: tc - fc,
        }
    }
}

/// Shift a cell; `None` if it leaves the playable squares.
pub fn translate_cell(index: u8, offset: Offset) -> Option<u8> {
    let (row, col) = cell_coords(index);
    cell_at(row + offset.rows, col + offset.cols)
}

/// Shift every cell of a move; `None` if any of them leaves the board.
pub fn translate_move(mv: &Move, offset: Offset) -> Option<Move> {
    mv.try_map_cells(|cell| translate_cell(cell, offset))
}

/// Split a state key into side to move and the 32 cell characters.
pub fn parse_key(key: &str) -> Option<(Colour, &[u8])> {
    let bytes = key.as_bytes();
    if bytes.len() != NUM_CELLS + 1 {
        return None;
    }
    let turn = Colour::from_abbrev(bytes[0] as char)?;
    Some((turn, &bytes[1..]))
}

/// Fraction of the current board that agrees with the seen board shifted by
/// `offset`. Cells whose source square falls off the board count as agreeing.
pub fn similarity(seen: &[u8], current: &[u8], offset: Offset) -> f64 {
    let matching = (0..NUM_CELLS as u8)
        .filter(|&i| {
            let (row, col) = cell_coords(i);
            match cell_at(row - offset.rows, col - offset.cols) {
                Some(source) => seen[source as usize] == current[i as usize],
                None => true,
            }
        })
        .count();
    matching as f64 / NUM_CELLS as f64
}

/// Translation-based approximator for checkers positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometricApproximator;

impl Approximator<Move> for GeometricApproximator {
    fn accumulate(
        &self,
        seen_key: &str,
        seen: &[QEntry<Move>],
        key: &str,
        scores: &mut [MoveScore<Move>],
    ) {
        let (Some((seen_turn, seen_cells)), Some((turn, cells))) =
            (parse_key(seen_key), parse_key(key))
        else {
            return;
        };
        if seen_turn != turn {
            return;
        }

        for entry in seen {
            for score in scores.iter_mut() {
                let offset = Offset::between(entry.0.origin(), score.action.origin());
                if translate_move(&entry.0, offset).as_ref() == Some(&score.action) {
                    score.add(similarity(seen_cells, cells, offset), entry.1);
                }
            }
        }
    }
}
