//! The 32-cell diagonal board.
//!
//! Cells are stored in a flat arena indexed `0..32`. Cell `i` sits on row
//! `i / 4` of the physical 8x8 board; even rows use the odd columns and odd
//! rows the even columns, so `(row + col)` is always odd. Each cell records
//! the indices of its up-to-four diagonal neighbors, wired once at
//! construction from that arithmetic and never changed afterwards.
//!
//! ```text
//! row 7  |  |28|  |29|  |30|  |31|
//! row 6  |24|  |25|  |26|  |27|  |
//!  ...
//! row 1  |  | 4|  | 5|  | 6|  | 7|
//! row 0  | 0|  | 1|  | 2|  | 3|  |      (black home rank)
//! ```

use std::fmt;

use super::moves::{Jump, Move};
use super::piece::{Colour, Piece};

/// Number of playable cells.
pub const NUM_CELLS: usize = 32;

/// Rows (and columns) of the physical board.
pub const BOARD_SIZE: i8 = 8;

/// Pieces per side at the start of a game.
pub const PIECES_PER_SIDE: usize = 12;

/// Diagonal direction. "Up" is toward higher cell indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// One row up, one column left.
    UpLeft,
    /// One row up, one column right.
    UpRight,
    /// One row down, one column left.
    DownLeft,
    /// One row down, one column right.
    DownRight,
}

impl Direction {
    /// All four diagonals.
    pub const ALL: [Direction; 4] = [
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    const UP: [Direction; 2] = [Direction::UpLeft, Direction::UpRight];
    const DOWN: [Direction; 2] = [Direction::DownLeft, Direction::DownRight];

    /// Slot of this direction in a cell's neighbor table.
    fn slot(self) -> usize {
        match self {
            Direction::UpLeft => 0,
            Direction::UpRight => 1,
            Direction::DownLeft => 2,
            Direction::DownRight => 3,
        }
    }

    /// `(row, col)` delta of one step in this direction.
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::UpLeft => (1, -1),
            Direction::UpRight => (1, 1),
            Direction::DownLeft => (-1, -1),
            Direction::DownRight => (-1, 1),
        }
    }

    /// The direction pointing back the way this one came.
    pub fn reverse(self) -> Self {
        match self {
            Direction::UpLeft => Direction::DownRight,
            Direction::UpRight => Direction::DownLeft,
            Direction::DownLeft => Direction::UpRight,
            Direction::DownRight => Direction::UpLeft,
        }
    }

    /// Directions a piece may move or jump in.
    pub fn for_piece(colour: Colour, is_king: bool) -> &'static [Direction] {
        if is_king {
            &Direction::ALL
        } else {
            match colour {
                Colour::Black => &Direction::UP,
                Colour::White => &Direction::DOWN,
            }
        }
    }
}

/// `(row, col)` of a cell on the physical 8x8 board.
pub fn cell_coords(index: u8) -> (i8, i8) {
    let row = (index / 4) as i8;
    let col = 2 * (index % 4) as i8 + if row % 2 == 0 { 1 } else { 0 };
    (row, col)
}

/// Cell index at `(row, col)`, or `None` if off the board or on a light square.
pub fn cell_at(row: i8, col: i8) -> Option<u8> {
    if !(0..BOARD_SIZE).contains(&row) || !(0..BOARD_SIZE).contains(&col) {
        return None;
    }
    if (row + col) % 2 == 0 {
        return None;
    }
    Some((row * 4 + col / 2) as u8)
}

/// One playable square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Position in the board arena.
    pub index: u8,
    /// Occupant, if any.
    pub piece: Option<Piece>,
    neighbors: [Option<u8>; 4],
}

impl Cell {
    fn wired(index: u8) -> Self {
        let (row, col) = cell_coords(index);
        let mut neighbors = [None; 4];
        for dir in Direction::ALL {
            let (dr, dc) = dir.delta();
            neighbors[dir.slot()] = cell_at(row + dr, col + dc);
        }
        Self {
            index,
            piece: None,
            neighbors,
        }
    }

    /// Index of the adjacent cell in `dir`, if there is one.
    pub fn neighbor(&self, dir: Direction) -> Option<u8> {
        self.neighbors[dir.slot()]
    }
}

/// The board: 32 cells and whatever pieces stand on them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Cell; NUM_CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard opening position: black on 0..12, white on 20..32.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for i in 0..PIECES_PER_SIDE as u8 {
            board.set(i, Some(Piece::man(Colour::Black)));
            board.set(NUM_CELLS as u8 - 1 - i, Some(Piece::man(Colour::White)));
        }
        board
    }

    /// A board with no pieces.
    pub fn empty() -> Self {
        let mut cells = [Cell::wired(0); NUM_CELLS];
        for (i, cell) in cells.iter_mut().enumerate() {
            *cell = Cell::wired(i as u8);
        }
        Self { cells }
    }

    /// The cell at `index`.
    pub fn cell(&self, index: u8) -> &Cell {
        &self.cells[index as usize]
    }

    /// All cells in index order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Piece standing on `index`.
    pub fn get(&self, index: u8) -> Option<Piece> {
        self.cells[index as usize].piece
    }

    /// Replace the occupant of `index`.
    pub fn set(&mut self, index: u8, piece: Option<Piece>) {
        self.cells[index as usize].piece = piece;
    }

    /// Number of pieces on the board.
    pub fn piece_count(&self) -> usize {
        self.cells.iter().filter(|c| c.piece.is_some()).count()
    }

    /// Number of pieces of one colour on the board.
    pub fn count(&self, colour: Colour) -> usize {
        self.cells
            .iter()
            .filter(|c| c.piece.map_or(false, |p| p.colour == colour))
            .count()
    }

    /// Empty neighbors a piece of this kind could step to from `index`.
    pub fn possible_moves(&self, index: u8, colour: Colour, is_king: bool) -> Vec<u8> {
        let cell = self.cell(index);
        Direction::for_piece(colour, is_king)
            .iter()
            .filter_map(|&dir| cell.neighbor(dir))
            .filter(|&n| self.get(n).is_none())
            .collect()
    }

    /// Single jumps a piece of this kind could make from `index`.
    ///
    /// A jump needs an opposing piece on the adjacent cell and an empty cell
    /// directly beyond it. Cells listed in `exclude` are off limits both as
    /// the captured cell and as the landing cell.
    pub fn possible_jumps(
        &self,
        index: u8,
        colour: Colour,
        is_king: bool,
        exclude: &[u8],
    ) -> Vec<Jump> {
        let cell = self.cell(index);
        let mut jumps = Vec::new();

        for &dir in Direction::for_piece(colour, is_king) {
            let Some(over) = cell.neighbor(dir) else {
                continue;
            };
            match self.get(over) {
                Some(p) if p.colour != colour => {}
                _ => continue,
            }
            if exclude.contains(&over) {
                continue;
            }
            let Some(landing) = self.cell(over).neighbor(dir) else {
                continue;
            };
            if self.get(landing).is_none() && !exclude.contains(&landing) {
                jumps.push(Jump::new(over, landing));
            }
        }

        jumps
    }

    /// Simple steps available to the piece on `index`.
    pub fn valid_moves(&self, index: u8) -> Vec<Move> {
        let Some(piece) = self.get(index) else {
            return Vec::new();
        };
        self.possible_moves(index, piece.colour, piece.is_king)
            .into_iter()
            .map(|to| Move::Step { from: index, to })
            .collect()
    }

    /// Every maximal capture chain available to the piece on `index`.
    ///
    /// Chains are grown breadth-first: each round, every chain that can jump
    /// again from its last landing cell is replaced by one longer chain per
    /// continuation. A chain never lands on a cell it already occupied
    /// (including its origin) and never jumps a piece it already captured.
    /// Enumeration stops once a round extends no chain.
    pub fn valid_jumps(&self, index: u8) -> Vec<Move> {
        let Some(piece) = self.get(index) else {
            return Vec::new();
        };

        let mut chains: Vec<Vec<Jump>> = self
            .possible_jumps(index, piece.colour, piece.is_king, &[index])
            .into_iter()
            .map(|j| vec![j])
            .collect();

        loop {
            let mut grew = false;
            let mut next = Vec::with_capacity(chains.len());

            for chain in chains {
                let exclude = consumed_cells(index, &chain);
                let at = chain.last().map_or(index, |j| j.landing);
                let extensions = self.possible_jumps(at, piece.colour, piece.is_king, &exclude);

                if extensions.is_empty() {
                    next.push(chain);
                } else {
                    grew = true;
                    for ext in extensions {
                        let mut longer = chain.clone();
                        longer.push(ext);
                        next.push(longer);
                    }
                }
            }

            chains = next;
            if !grew {
                break;
            }
        }

        chains
            .into_iter()
            .map(|jumps| Move::Capture { from: index, jumps })
            .collect()
    }

    /// Apply a move and promote the mover if it finishes on its promotion rank.
    ///
    /// The move must be legal for this position; nothing is re-validated here.
    /// Returns the cell the moving piece ends on.
    pub fn apply(&mut self, mv: &Move) -> u8 {
        let origin = mv.origin();
        let piece = self.get(origin);
        debug_assert!(piece.is_some(), "no piece on origin cell {}", origin);

        let last = match mv {
            Move::Step { from, to } => {
                self.set(*from, None);
                self.set(*to, piece);
                *to
            }
            Move::Capture { from, jumps } => {
                let mut current = *from;
                for jump in jumps {
                    debug_assert!(self.get(jump.captured).is_some());
                    self.set(jump.captured, None);
                    self.set(current, None);
                    self.set(jump.landing, piece);
                    current = jump.landing;
                }
                current
            }
        };

        if let Some(mut p) = self.get(last) {
            if p.colour.is_promotion_cell(last) {
                p.is_king = true;
                self.set(last, Some(p));
            }
        }

        last
    }

    /// 32-character encoding of the occupants, one per cell in index order.
    pub fn encode(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.piece.map_or('x', |p| p.symbol()))
            .collect()
    }
}

/// Cells a chain has used up: its origin, every landing cell and every captured cell.
fn consumed_cells(origin: u8, chain: &[Jump]) -> Vec<u8> {
    let mut cells = Vec::with_capacity(1 + chain.len() * 2);
    cells.push(origin);
    for jump in chain {
        cells.push(jump.captured);
        cells.push(jump.landing);
    }
    cells
}

impl fmt::Display for Board {
    /// Top row first; empty playable squares show their cell index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..BOARD_SIZE).rev() {
            write!(f, "|")?;
            for col in 0..BOARD_SIZE {
                match cell_at(row, col) {
                    Some(index) => match self.get(index) {
                        Some(p) => write!(f, " {}|", p)?,
                        None => write!(f, "{:>2}|", index)?,
                    },
                    None => write!(f, "  |")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
