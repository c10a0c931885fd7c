//! Move representation.
//!
//! A move is either a single diagonal step or a chain of one or more jumps
//! made by the same piece in one turn. Persisted models store a move as
//! `[origin, target]`, where `target` is the destination cell for a step or
//! a list of `[captured, landing]` pairs for a capture chain.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::NUM_CELLS;

/// One hop of a capture chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u8, u8)", into = "(u8, u8)")]
pub struct Jump {
    /// Cell of the opposing piece removed by this hop.
    pub captured: u8,
    /// Empty cell the moving piece lands on.
    pub landing: u8,
}

impl Jump {
    /// Create a jump over `captured` onto `landing`.
    pub fn new(captured: u8, landing: u8) -> Self {
        Self { captured, landing }
    }
}

impl From<(u8, u8)> for Jump {
    fn from((captured, landing): (u8, u8)) -> Self {
        Self { captured, landing }
    }
}

impl From<Jump> for (u8, u8) {
    fn from(jump: Jump) -> Self {
        (jump.captured, jump.landing)
    }
}

/// A legal action for the side to move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoveRepr", into = "MoveRepr")]
pub enum Move {
    /// Single diagonal advance to an empty neighbor.
    Step {
        /// Origin cell.
        from: u8,
        /// Destination cell.
        to: u8,
    },
    /// One or more sequential jumps by the piece on `from`.
    Capture {
        /// Origin cell.
        from: u8,
        /// Hops in play order; never empty.
        jumps: Vec<Jump>,
    },
}

impl Move {
    /// Cell the moving piece starts on.
    pub fn origin(&self) -> u8 {
        match self {
            Move::Step { from, .. } | Move::Capture { from, .. } => *from,
        }
    }

    /// Cell the moving piece finishes on.
    pub fn destination(&self) -> u8 {
        match self {
            Move::Step { to, .. } => *to,
            Move::Capture { from, jumps } => jumps.last().map_or(*from, |j| j.landing),
        }
    }

    /// Whether this move captures anything.
    pub fn is_capture(&self) -> bool {
        matches!(self, Move::Capture { .. })
    }

    /// Cells whose pieces this move removes, in capture order.
    pub fn captured(&self) -> Vec<u8> {
        match self {
            Move::Step { .. } => Vec::new(),
            Move::Capture { jumps, .. } => jumps.iter().map(|j| j.captured).collect(),
        }
    }

    /// Rewrite every cell index through `f`, failing if any cell has no image.
    pub fn try_map_cells<F>(&self, mut f: F) -> Option<Move>
    where
        F: FnMut(u8) -> Option<u8>,
    {
        match self {
            Move::Step { from, to } => Some(Move::Step {
                from: f(*from)?,
                to: f(*to)?,
            }),
            Move::Capture { from, jumps } => {
                let from = f(*from)?;
                let jumps = jumps
                    .iter()
                    .map(|j| Some(Jump::new(f(j.captured)?, f(j.landing)?)))
                    .collect::<Option<Vec<_>>>()?;
                Some(Move::Capture { from, jumps })
            }
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Step { from, to } => write!(f, "{}-{}", from, to),
            Move::Capture { from, jumps } => {
                write!(f, "{}", from)?;
                for jump in jumps {
                    write!(f, "x{}", jump.landing)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Target {
    Step(u8),
    Chain(Vec<Jump>),
}

#[derive(Serialize, Deserialize)]
struct MoveRepr(u8, Target);

impl TryFrom<MoveRepr> for Move {
    type Error = String;

    fn try_from(MoveRepr(from, target): MoveRepr) -> Result<Self, Self::Error> {
        let mv = match target {
            Target::Step(to) => Move::Step { from, to },
            Target::Chain(jumps) if jumps.is_empty() => {
                return Err(format!("capture from {} has no jumps", from));
            }
            Target::Chain(jumps) => Move::Capture { from, jumps },
        };
        match mv.try_map_cells(|cell| Some(cell).filter(|&c| (c as usize) < NUM_CELLS)) {
            Some(_) => Ok(mv),
            None => Err(format!("move {} leaves the board", mv)),
        }
    }
}

impl From<Move> for MoveRepr {
    fn from(mv: Move) -> Self {
        match mv {
            Move::Step { from, to } => MoveRepr(from, Target::Step(to)),
            Move::Capture { from, jumps } => MoveRepr(from, Target::Chain(jumps)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_format() {
        let step = Move::Step { from: 8, to: 13 };
        assert_eq!(serde_json::to_string(&step).unwrap(), "[8,13]");

        let chain = Move::Capture {
            from: 9,
            jumps: vec![Jump::new(13, 18), Jump::new(22, 25)],
        };
        assert_eq!(
            serde_json::to_string(&chain).unwrap(),
            "[9,[[13,18],[22,25]]]"
        );

        let parsed: Move = serde_json::from_str("[9,[[13,18],[22,25]]]").unwrap();
        assert_eq!(parsed, chain);
        let parsed: Move = serde_json::from_str("[8, 13]").unwrap();
        assert_eq!(parsed, step);
    }

    #[test]
    fn test_origin_and_destination() {
        let chain = Move::Capture {
            from: 9,
            jumps: vec![Jump::new(13, 18), Jump::new(22, 25)],
        };
        assert_eq!(chain.origin(), 9);
        assert_eq!(chain.destination(), 25);
        assert_eq!(chain.captured(), vec![13, 22]);
        assert_eq!(chain.to_string(), "9x18x25");
        assert_eq!(Move::Step { from: 8, to: 12 }.to_string(), "8-12");
    }

    #[test]
    fn test_rejects_malformed_descriptors() {
        assert!(serde_json::from_str::<Move>("[8, 40]").is_err());
        assert!(serde_json::from_str::<Move>("[32, 28]").is_err());
        assert!(serde_json::from_str::<Move>("[9, []]").is_err());
        assert!(serde_json::from_str::<Move>("[9, [[13, 18], [22, 35]]]").is_err());
        assert!(serde_json::from_str::<Move>("[31, 27]").is_ok());
    }
}
