//! # Notation
//!
//! Text forms of the model types: algebraic squares ([`square`]) and the
//! FEN-style position format ([`fen`]), plus `Display` impls for the
//! small model types. Decoding is strict about shape and lenient about
//! trailing clock fields; encoding always emits all four fields.

use std::fmt;

use crate::model::{Color, Coord, Man, Piece, Rights, SIZE, Wing, board::Board};

pub mod fen;
pub mod square;

impl fmt::Display for Coord {
    /// Algebraic square name, file letter then rank digit.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.c as u8) as char, SIZE - self.r)
    }
}

impl fmt::Display for Color {
    /// `white`/`black`, or the one-letter form with `{:#}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, f.alternate()) {
            (Self::WHITE, false) => write!(f, "white"),
            (Self::BLACK, false) => write!(f, "black"),
            (Self::WHITE, true) => write!(f, "w"),
            (Self::BLACK, true) => write!(f, "b"),
        }
    }
}

impl Piece {
    /// Uppercase piece letter, pawns included.
    pub fn letter(self) -> char {
        match self {
            Self::PAWN => 'P',
            Self::KNIGHT => 'N',
            Self::BISHOP => 'B',
            Self::ROOK => 'R',
            Self::QUEEN => 'Q',
            Self::KING => 'K',
        }
    }
}

impl fmt::Display for Piece {
    /// Uppercase piece letter, lowercase with `{:#}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.letter().to_ascii_lowercase())
        } else {
            write!(f, "{}", self.letter())
        }
    }
}

impl fmt::Display for Man {
    /// Position-text letter: uppercase white, lowercase black.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Color::WHITE => write!(f, "{}", self.piece),
            Color::BLACK => write!(f, "{:#}", self.piece),
        }
    }
}

impl fmt::Display for Rights {
    /// Castling field: `KQkq` letters for the held rights, `-` for none.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Rights::NIL {
            return write!(f, "-");
        }
        for (color, wing, letter) in [
            (Color::WHITE, Wing::KING_SIDE, 'K'),
            (Color::WHITE, Wing::QUEEN_SIDE, 'Q'),
            (Color::BLACK, Wing::KING_SIDE, 'k'),
            (Color::BLACK, Wing::QUEEN_SIDE, 'q'),
        ] {
            if self.has(color, wing) {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    /// The position in FEN-style notation: placement, turn, castling,
    /// en passant.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..SIZE {
            let mut empties = 0;
            for c in 0..SIZE {
                match self.man_at(Coord::new(r, c)) {
                    None => empties += 1,
                    Some(man) => {
                        if empties > 0 {
                            write!(f, "{empties}")?;
                            empties = 0;
                        }
                        write!(f, "{man}")?;
                    }
                }
            }
            if empties > 0 {
                write!(f, "{empties}")?;
            }
            if r + 1 < SIZE {
                write!(f, "/")?;
            }
        }

        write!(f, " {:#} {}", self.turn(), self.rights())?;
        match self.en_passant() {
            Some(target) => write!(f, " {target}"),
            None => write!(f, " -"),
        }
    }
}

#[test]
fn display_forms() {
    assert_eq!(Coord::new(7, 0).to_string(), "a1");
    assert_eq!(Coord::new(0, 7).to_string(), "h8");
    assert_eq!(format!("{} {:#}", Color::WHITE, Color::BLACK), "white b");
    assert_eq!(Man::new(Color::WHITE, Piece::KNIGHT).to_string(), "N");
    assert_eq!(Man::new(Color::BLACK, Piece::QUEEN).to_string(), "q");
    assert_eq!(Rights::START.to_string(), "KQkq");
    assert_eq!(Rights::NIL.to_string(), "-");
}
