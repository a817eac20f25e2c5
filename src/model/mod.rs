use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumIter};
use thiserror::Error;

pub mod board;
pub mod movegen;
pub mod perft;
pub mod rules;
pub mod scan;

/// Width and height of the board; coordinates live in `0..SIZE`.
pub const SIZE: i8 = 8;

/// A rank/file pair.
///
/// Rank 0 is black's home rank and rank 7 is white's, matching the order
/// ranks appear in position text. Values outside `0..8` are representable
/// (arithmetic is total) and rejected wherever a square is actually read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub r: i8,
    pub c: i8,
}

impl Coord {
    #[inline]
    pub const fn new(r: i8, c: i8) -> Self {
        Self { r, c }
    }

    /// Offset by a number of ranks.
    #[inline]
    pub fn add_r(self, dr: i8) -> Self {
        Self::new(self.r + dr, self.c)
    }

    /// Offset by a number of files.
    #[inline]
    pub fn add_c(self, dc: i8) -> Self {
        Self::new(self.r, self.c + dc)
    }

    /// Offset by one step of a direction vector.
    #[inline]
    pub fn add(self, dir: Dir) -> Self {
        Self::new(self.r + dir.y, self.c + dir.x)
    }

    /// Whether this coordinate names a square of the 8x8 board.
    #[inline]
    pub fn in_bounds(self) -> bool {
        self.r >= 0 && self.r < SIZE && self.c >= 0 && self.c < SIZE
    }
}

/// A step vector, `x` along files and `y` along ranks.
///
/// [`Dir::between`] rounds the normalized offset to the nearest integer
/// step, so aligned pairs yield an exact unit direction while non-aligned
/// pairs collapse onto a neighboring axis. Every consumer that walks a
/// direction re-checks the path square by square, which keeps the collapse
/// harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dir {
    pub x: i8,
    pub y: i8,
}

impl Dir {
    #[inline]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Unit direction pointing from `start` toward `end`.
    ///
    /// Identical coordinates yield the zero vector, which compares unequal
    /// to every unit direction.
    pub fn between(start: Coord, end: Coord) -> Self {
        let x = (end.c - start.c) as f64;
        let y = (end.r - start.r) as f64;
        let magnitude = (x * x + y * y).sqrt();
        if magnitude == 0.0 {
            return Self::new(0, 0);
        }
        Self::new((x / magnitude).round() as i8, (y / magnitude).round() as i8)
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        self.x != 0 && self.y != 0
    }

    #[inline]
    pub fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Color of a player or chessman.
///
/// The discriminants index arrays of the form `[<white value>, <black value>]`.
#[allow(non_camel_case_types)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Color {
    WHITE = 0,
    BLACK = 1,
}

impl Color {
    /// Opposing color.
    #[inline]
    pub fn opp(self) -> Self {
        match self {
            Self::WHITE => Self::BLACK,
            Self::BLACK => Self::WHITE,
        }
    }

    /// Associated array index.
    #[inline]
    pub fn ix(self) -> usize {
        self as usize
    }

    /// Rank the color's pawns advance toward: 0 for white, 7 for black.
    #[inline]
    pub fn promotion_rank(self) -> i8 {
        match self {
            Self::WHITE => 0,
            Self::BLACK => SIZE - 1,
        }
    }

    /// The color's home rank, where its king and rooks start.
    #[inline]
    pub fn home_rank(self) -> i8 {
        match self {
            Self::WHITE => SIZE - 1,
            Self::BLACK => 0,
        }
    }

    /// Rank delta of a single pawn push.
    #[inline]
    pub fn forward(self) -> i8 {
        match self {
            Self::WHITE => -1,
            Self::BLACK => 1,
        }
    }
}

/// The piece types of chessmen.
///
/// There is deliberately no `NONE` variant: an empty square is
/// `Option<Man>::None`, so every `match` over a piece is forced to be
/// exhaustive over real pieces only.
#[allow(non_camel_case_types)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, EnumIter, Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum Piece {
    PAWN = 1,
    KNIGHT = 2,
    BISHOP = 3,
    ROOK = 4,
    QUEEN = 5,
    KING = 6,
}

/// A chessman: a piece of a color, occupying one square.
///
/// The name is of British-English origin and, though archaic, lets pawns
/// and pieces be distinguished without ambiguity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Man {
    pub color: Color,
    pub piece: Piece,
}

impl Man {
    #[inline]
    pub const fn new(color: Color, piece: Piece) -> Self {
        Self { color, piece }
    }
}

/// The two castling directions, named for the side of the board the rook
/// starts on.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs)]
#[repr(u8)]
pub enum Wing {
    /// Aka. the 'short' castling, rook on the h-file.
    KING_SIDE = 0,
    /// Aka. the 'long' castling, rook on the a-file.
    QUEEN_SIDE = 1,
}

impl Wing {
    /// Use as an array index.
    #[inline]
    pub fn ix(self) -> usize {
        self as usize
    }

    /// Starting file of the wing's rook.
    #[inline]
    pub fn rook_file(self) -> i8 {
        match self {
            Self::KING_SIDE => SIZE - 1,
            Self::QUEEN_SIDE => 0,
        }
    }

    /// File delta of one king step toward the wing's rook.
    #[inline]
    pub fn step(self) -> i8 {
        match self {
            Self::KING_SIDE => 1,
            Self::QUEEN_SIDE => -1,
        }
    }
}

/// Castling rights, one bit per (color, wing).
///
/// Bit index is `color.ix() << 1 | wing.ix()`. Rights only ever go away:
/// the board revokes them when a king or rook leaves (or is captured on)
/// its origin square, and nothing grants them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Rights(pub u8);

impl Rights {
    pub const START: Rights = Rights(0b1111);
    pub const NIL: Rights = Rights(0b0000);

    #[inline]
    fn bit(color: Color, wing: Wing) -> u8 {
        1 << (color.ix() << 1 | wing.ix())
    }

    #[inline]
    pub fn has(self, color: Color, wing: Wing) -> bool {
        self.0 & Self::bit(color, wing) != 0
    }

    /// Set one right; only used while decoding position text.
    #[inline]
    pub(crate) fn grant(&mut self, color: Color, wing: Wing) {
        self.0 |= Self::bit(color, wing);
    }

    #[inline]
    pub fn revoke(&mut self, color: Color, wing: Wing) {
        self.0 &= !Self::bit(color, wing);
    }

    #[inline]
    pub fn revoke_both(&mut self, color: Color) {
        self.0 &= !(Self::bit(color, Wing::KING_SIDE) | Self::bit(color, Wing::QUEEN_SIDE));
    }
}

/// Why a position text could not become a board.
///
/// These are construction failures: a board is never half-built from bad
/// text, the caller just gets the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("malformed position text: {0:?}")]
    Syntax(String),
    #[error("position has no {0:?} king")]
    MissingKing(Color),
    #[error("position has more than one {0:?} king")]
    DuplicateKing(Color),
}

/// Why a move was rejected.
///
/// A rejected move leaves every observable property of the board exactly
/// as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("no chessman on the source square")]
    VacantSquare,
    #[error("it is {0:?}'s turn to move")]
    OutOfTurn(Color),
    #[error("the destination square is not reachable")]
    Unreachable,
    #[error("the move would leave the king in check")]
    ExposesKing,
}

/// Failure of the text-based move entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("invalid location: {0:?}")]
    InvalidLocation(String),
    #[error(transparent)]
    Illegal(#[from] IllegalMove),
}

#[test]
fn color_opp_is_total_swap() {
    assert_eq!(Color::WHITE.opp(), Color::BLACK);
    assert_eq!(Color::BLACK.opp(), Color::WHITE);
    assert_eq!(Color::WHITE.opp().opp(), Color::WHITE);
}

#[test]
fn direction_between_rounds_like_a_compass() {
    let origin = Coord::new(4, 4);
    assert_eq!(Dir::between(origin, Coord::new(0, 4)), Dir::new(0, -1));
    assert_eq!(Dir::between(origin, Coord::new(7, 7)), Dir::new(1, 1));
    // A knight-shaped offset collapses onto the dominant axis.
    assert_eq!(Dir::between(origin, Coord::new(5, 6)), Dir::new(1, 0));
    // Degenerate pair yields the zero vector, unequal to any unit step.
    assert_eq!(Dir::between(origin, origin), Dir::new(0, 0));
}

#[test]
fn rights_never_come_back() {
    let mut rights = Rights::START;
    assert!(rights.has(Color::WHITE, Wing::KING_SIDE));
    rights.revoke(Color::WHITE, Wing::KING_SIDE);
    assert!(!rights.has(Color::WHITE, Wing::KING_SIDE));
    assert!(rights.has(Color::WHITE, Wing::QUEEN_SIDE));
    rights.revoke_both(Color::BLACK);
    assert_eq!(rights, Rights(0b0010));
}
