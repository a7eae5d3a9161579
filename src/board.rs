use once_cell::sync::Lazy;
use std::fmt;

/// Number of cells in the bounding 12x16 grid. Only 160 of them are
/// addressable; the rest lie outside the cross (see `is_on_board`).
pub const GRID_CELLS: usize = 12 * 16;

pub const FILE_COUNT: i8 = 12;
pub const RANK_COUNT: i8 = 16;

/// The eight king-like unit directions: four orthogonal, four diagonal.
pub const DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// White's castle: F1 and G1.
pub const WHITE_CASTLE: [Square; 2] = [Square::new(5, 1), Square::new(6, 1)];
/// Black's castle: F16 and G16.
pub const BLACK_CASTLE: [Square; 2] = [Square::new(5, 16), Square::new(6, 16)];

/// Inclusive file span (0-based, A = 0) for each rank of the cross.
#[inline]
fn file_span(rank: i8) -> Option<(i8, i8)> {
    match rank {
        1 | 16 => Some((5, 6)),
        2 | 15 => Some((2, 9)),
        3 | 14 => Some((1, 10)),
        4..=13 => Some((0, 11)),
        _ => None,
    }
}

/// Check whether a (file, rank) pair addresses one of the 160 squares.
#[inline]
pub fn is_on_board(file: i8, rank: i8) -> bool {
    match file_span(rank) {
        Some((lo, hi)) => file >= lo && file <= hi,
        None => false,
    }
}

/// All 160 addressable squares, rank 1 first, files ascending within a rank.
pub static ALL_SQUARES: Lazy<Vec<Square>> = Lazy::new(|| {
    let mut squares = Vec::with_capacity(160);
    for rank in 1..=RANK_COUNT {
        if let Some((lo, hi)) = file_span(rank) {
            for file in lo..=hi {
                squares.push(Square::new(file, rank));
            }
        }
    }
    squares
});

/// A board cell. `file` is 0-based (A = 0 .. L = 11), `rank` runs 1..=16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub file: i8,
    pub rank: i8,
}

impl Square {
    pub const fn new(file: i8, rank: i8) -> Self {
        Square { file, rank }
    }

    /// Parse algebraic notation like "E6" or "c11". Returns None for
    /// anything that does not name an addressable square.
    pub fn from_notation(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file_ch = chars.next()?.to_ascii_uppercase();
        if !('A'..='L').contains(&file_ch) {
            return None;
        }
        let file = (file_ch as u8 - b'A') as i8;
        let rank: i8 = chars.as_str().parse().ok()?;
        if is_on_board(file, rank) {
            Some(Square::new(file, rank))
        } else {
            None
        }
    }

    #[inline]
    pub fn is_on_board(&self) -> bool {
        is_on_board(self.file, self.rank)
    }

    /// Index into a GRID_CELLS-sized array.
    #[inline]
    pub fn index(&self) -> usize {
        (self.rank as usize - 1) * FILE_COUNT as usize + self.file as usize
    }

    /// Shift by a (file, rank) delta; None when the target leaves the cross.
    #[inline]
    pub fn offset(&self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file + df;
        let rank = self.rank + dr;
        if is_on_board(file, rank) {
            Some(Square::new(file, rank))
        } else {
            None
        }
    }

    /// Unit direction from `self` towards `to`, each component in {-1, 0, 1}.
    /// None when the squares coincide.
    #[inline]
    pub fn direction(&self, to: Square) -> Option<(i8, i8)> {
        if *self == to {
            return None;
        }
        Some(((to.file - self.file).signum(), (to.rank - self.rank).signum()))
    }

    #[inline]
    pub fn chebyshev_distance(&self, other: Square) -> i8 {
        (self.file - other.file).abs().max((self.rank - other.rank).abs())
    }

    #[inline]
    pub fn manhattan_distance(&self, other: Square) -> i8 {
        (self.file - other.file).abs() + (self.rank - other.rank).abs()
    }

    /// King-step adjacency.
    #[inline]
    pub fn is_one_step(&self, to: Square) -> bool {
        *self != to && self.chebyshev_distance(to) == 1
    }

    /// Two squares along a single unit direction (the leap geometry shared
    /// by canters and jumps).
    #[inline]
    pub fn is_two_step(&self, to: Square) -> bool {
        let df = (to.file - self.file).abs();
        let dr = (to.rank - self.rank).abs();
        df.max(dr) == 2 && df % 2 == 0 && dr % 2 == 0
    }

    /// The square leapt over by a two-step move. Only meaningful when
    /// `is_two_step(to)` holds.
    #[inline]
    pub fn midpoint(&self, to: Square) -> Square {
        Square::new((self.file + to.file) / 2, (self.rank + to.rank) / 2)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.file as u8) as char, self.rank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "white" | "White" | "w" => Some(PlayerColor::White),
            "black" | "Black" | "b" => Some(PlayerColor::Black),
            _ => None,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            PlayerColor::White => "white",
            PlayerColor::Black => "black",
        }
    }

    #[inline]
    pub fn opponent(&self) -> PlayerColor {
        match self {
            PlayerColor::White => PlayerColor::Black,
            PlayerColor::Black => PlayerColor::White,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        match self {
            PlayerColor::White => 0,
            PlayerColor::Black => 1,
        }
    }

    /// Rank direction this side advances in.
    #[inline]
    pub fn forward(&self) -> i8 {
        match self {
            PlayerColor::White => 1,
            PlayerColor::Black => -1,
        }
    }

    /// The two squares of the castle this side is attacking.
    #[inline]
    pub fn enemy_castle(&self) -> [Square; 2] {
        match self {
            PlayerColor::White => BLACK_CASTLE,
            PlayerColor::Black => WHITE_CASTLE,
        }
    }

    /// The two squares of this side's own castle.
    #[inline]
    pub fn own_castle(&self) -> [Square; 2] {
        match self {
            PlayerColor::White => WHITE_CASTLE,
            PlayerColor::Black => BLACK_CASTLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Man,
    Knight,
}

impl PieceKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "man" | "Man" => Some(PieceKind::Man),
            "knight" | "Knight" => Some(PieceKind::Knight),
            _ => None,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            PieceKind::Man => "man",
            PieceKind::Knight => "knight",
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        match self {
            PieceKind::Man => 0,
            PieceKind::Knight => 1,
        }
    }
}

/// Men and Knights move identically; the Knight's only extra right is the
/// charge (canters followed by jumps in one turn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PlayerColor,
}

impl Piece {
    pub fn new(kind: PieceKind, color: PlayerColor) -> Self {
        Piece { kind, color }
    }

    #[inline]
    pub fn is_knight(&self) -> bool {
        self.kind == PieceKind::Knight
    }
}

/// Piece placement over the cross. Backed by a flat array over the bounding
/// grid; off-cross cells stay permanently empty.
#[derive(Clone, Debug)]
pub struct Board {
    cells: [Option<Piece>; GRID_CELLS],
}

impl Board {
    pub fn new() -> Self {
        Board {
            cells: [None; GRID_CELLS],
        }
    }

    #[inline]
    pub fn get_piece(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()]
    }

    #[inline]
    pub fn set_piece(&mut self, sq: Square, piece: Piece) {
        self.cells[sq.index()] = Some(piece);
    }

    #[inline]
    pub fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()].take()
    }

    #[inline]
    pub fn is_empty_square(&self, sq: Square) -> bool {
        self.cells[sq.index()].is_none()
    }

    /// Iterate occupied squares in board order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        ALL_SQUARES
            .iter()
            .filter_map(move |sq| self.get_piece(*sq).map(|p| (*sq, p)))
    }

    pub fn count_pieces(&self, color: PlayerColor) -> u32 {
        self.pieces().filter(|(_, p)| p.color == color).count() as u32
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}
