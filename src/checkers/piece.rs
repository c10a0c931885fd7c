//! Piece colours and pieces.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side colour. Black starts on cells 0..12 and advances toward higher
/// indices; white starts on cells 20..32 and advances toward lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colour {
    /// Moves up the board (increasing cell index).
    Black,
    /// Moves down the board (decreasing cell index).
    White,
}

impl Colour {
    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Colour::Black => Colour::White,
            Colour::White => Colour::Black,
        }
    }

    /// Single-character abbreviation used as the first character of a state key.
    pub fn abbrev(self) -> char {
        match self {
            Colour::Black => 'b',
            Colour::White => 'w',
        }
    }

    /// Inverse of [`Colour::abbrev`].
    pub fn from_abbrev(c: char) -> Option<Self> {
        match c {
            'b' => Some(Colour::Black),
            'w' => Some(Colour::White),
            _ => None,
        }
    }

    /// Whether `index` lies in this side's promotion rank.
    pub fn is_promotion_cell(self, index: u8) -> bool {
        match self {
            Colour::White => index < 4,
            Colour::Black => index > 27,
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colour::Black => write!(f, "black"),
            Colour::White => write!(f, "white"),
        }
    }
}

/// A man or king of one colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    /// Owning side.
    pub colour: Colour,
    /// Set once on promotion, never cleared.
    pub is_king: bool,
}

impl Piece {
    /// A fresh (non-king) man.
    pub fn man(colour: Colour) -> Self {
        Self {
            colour,
            is_king: false,
        }
    }

    /// A king.
    pub fn king(colour: Colour) -> Self {
        Self {
            colour,
            is_king: true,
        }
    }

    /// Character used in state keys and board rendering.
    pub fn symbol(&self) -> char {
        match (self.colour, self.is_king) {
            (Colour::Black, false) => 'b',
            (Colour::Black, true) => 'B',
            (Colour::White, false) => 'w',
            (Colour::White, true) => 'W',
        }
    }

    /// Inverse of [`Piece::symbol`].
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            'b' => Some(Piece::man(Colour::Black)),
            'B' => Some(Piece::king(Colour::Black)),
            'w' => Some(Piece::man(Colour::White)),
            'W' => Some(Piece::king(Colour::White)),
            _ => None,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_ranks() {
        assert!(Colour::White.is_promotion_cell(0));
        assert!(Colour::White.is_promotion_cell(3));
        assert!(!Colour::White.is_promotion_cell(4));
        assert!(Colour::Black.is_promotion_cell(28));
        assert!(Colour::Black.is_promotion_cell(31));
        assert!(!Colour::Black.is_promotion_cell(27));
    }

    #[test]
    fn test_symbols() {
        for c in ['b', 'B', 'w', 'W'] {
            assert_eq!(Piece::from_symbol(c).map(|p| p.symbol()), Some(c));
        }
        assert_eq!(Piece::from_symbol('x'), None);
        assert_eq!(Colour::Black.opponent(), Colour::White);
    }
}
