//! # Position notation
//!
//! A FEN-style description of a position, space-separated:
//!
//! - The chessboard, eight solidus-separated (`/`) ranks starting with
//!   the 8th rank. Occupied squares are piece letters, lowercase for
//!   black and uppercase for white; runs of empty squares are run-length
//!   encoded as digits 1 through 8.
//! - The side to move, `w` or `b`.
//! - The castling rights, up to four of `KQkq`, or `-`. This field may be
//!   omitted entirely, in which case all four rights are assumed (and
//!   then trimmed against the actual king and rook placement when the
//!   board is built).
//! - The en passant target square, or `-`. Also omissible; omitted means
//!   no target.
//! - Trailing halfmove-clock and turn-number fields are accepted for
//!   compatibility and ignored.
//!
//! The standard starting position reads:
//! ```text
//! rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -
//! ```
//!
//! Decoding stops at the textual level; structural requirements like
//! "exactly one king per color" are checked by the board constructor.

use chumsky::prelude::*;

use crate::model::{Color, Coord, FenError, Man, Piece, Rights, SIZE, Wing};
use crate::notation::square::square;

/// Decoded position text, not yet validated as a playable board.
#[derive(Debug, Clone)]
pub(crate) struct FenRecord {
    pub rows: Vec<Vec<Option<Man>>>,
    pub turn: Color,
    pub rights: Rights,
    pub en_passant: Option<Coord>,
}

pub(crate) fn decode(text: &str) -> Result<FenRecord, FenError> {
    record()
        .parse(text)
        .into_result()
        .map_err(|_| FenError::Syntax(text.to_string()))
}

fn record<'s>() -> impl Parser<'s, &'s str, FenRecord> {
    group((
        placement(),
        just(' ').ignore_then(turn()),
        just(' ').ignore_then(castling()).or_not(),
        just(' ').ignore_then(en_passant()).or_not(),
    ))
    .then_ignore(
        just(' ')
            .ignore_then(chumsky::text::int(10))
            .repeated()
            .at_most(2),
    )
    .then_ignore(end())
    .map(|(rows, turn, rights, en_passant)| FenRecord {
        rows,
        turn,
        rights: rights.unwrap_or(Rights::START),
        en_passant: en_passant.flatten(),
    })
}

fn placement<'s>() -> impl Parser<'s, &'s str, Vec<Vec<Option<Man>>>> {
    rank()
        .separated_by(just('/'))
        .at_least(SIZE as usize)
        .at_most(SIZE as usize)
        .collect()
}

/// One rank: piece letters and empty-run digits, eight squares total.
fn rank<'s>() -> impl Parser<'s, &'s str, Vec<Option<Man>>> {
    choice((
        man().map(|m| vec![Some(m)]),
        one_of('1'..='8').map(|d: char| vec![None; (d as u8 - b'0') as usize]),
    ))
    .repeated()
    .at_least(1)
    .collect::<Vec<_>>()
    .map(|runs| runs.concat())
    .filter(|squares: &Vec<Option<Man>>| squares.len() == SIZE as usize)
}

fn man<'s>() -> impl Parser<'s, &'s str, Man> {
    use Color::*;
    use Piece::*;
    choice((
        just('k').to(Man::new(BLACK, KING)),
        just('q').to(Man::new(BLACK, QUEEN)),
        just('r').to(Man::new(BLACK, ROOK)),
        just('b').to(Man::new(BLACK, BISHOP)),
        just('n').to(Man::new(BLACK, KNIGHT)),
        just('p').to(Man::new(BLACK, PAWN)),
        just('P').to(Man::new(WHITE, PAWN)),
        just('N').to(Man::new(WHITE, KNIGHT)),
        just('B').to(Man::new(WHITE, BISHOP)),
        just('R').to(Man::new(WHITE, ROOK)),
        just('Q').to(Man::new(WHITE, QUEEN)),
        just('K').to(Man::new(WHITE, KING)),
    ))
}

fn turn<'s>() -> impl Parser<'s, &'s str, Color> {
    choice((just('w').to(Color::WHITE), just('b').to(Color::BLACK)))
}

fn castling<'s>() -> impl Parser<'s, &'s str, Rights> {
    choice((
        just('-').to(Rights::NIL),
        one_of("KQkq")
            .repeated()
            .at_least(1)
            .at_most(4)
            .collect::<Vec<char>>()
            .map(|letters| {
                let mut rights = Rights::NIL;
                for letter in letters {
                    match letter {
                        'K' => rights.grant(Color::WHITE, Wing::KING_SIDE),
                        'Q' => rights.grant(Color::WHITE, Wing::QUEEN_SIDE),
                        'k' => rights.grant(Color::BLACK, Wing::KING_SIDE),
                        _ => rights.grant(Color::BLACK, Wing::QUEEN_SIDE),
                    }
                }
                rights
            }),
    ))
}

fn en_passant<'s>() -> impl Parser<'s, &'s str, Option<Coord>> {
    choice((just('-').to(None), square().map(Some)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    #[test]
    fn full_record_decodes() {
        let record = decode(&format!("{START_PLACEMENT} w KQkq -")).unwrap();
        assert_eq!(record.turn, Color::WHITE);
        assert_eq!(record.rights, Rights::START);
        assert_eq!(record.en_passant, None);
        assert_eq!(record.rows.len(), 8);
        assert_eq!(record.rows[0][3], Some(Man::new(Color::BLACK, Piece::QUEEN)));
        assert_eq!(record.rows[7][4], Some(Man::new(Color::WHITE, Piece::KING)));
        assert_eq!(record.rows[4][4], None);
    }

    #[test]
    fn optional_fields_may_be_omitted() {
        let bare = decode(&format!("{START_PLACEMENT} b")).unwrap();
        assert_eq!(bare.turn, Color::BLACK);
        assert_eq!(bare.rights, Rights::START);
        assert_eq!(bare.en_passant, None);

        let partial = decode(&format!("{START_PLACEMENT} w Kq")).unwrap();
        assert!(partial.rights.has(Color::WHITE, Wing::KING_SIDE));
        assert!(!partial.rights.has(Color::WHITE, Wing::QUEEN_SIDE));
        assert!(!partial.rights.has(Color::BLACK, Wing::KING_SIDE));
        assert!(partial.rights.has(Color::BLACK, Wing::QUEEN_SIDE));
    }

    #[test]
    fn en_passant_square_decodes() {
        let record = decode(&format!("{START_PLACEMENT} b KQkq e3")).unwrap();
        assert_eq!(record.en_passant, Some(Coord::new(5, 4)));
    }

    #[test]
    fn clock_fields_are_accepted_and_ignored() {
        assert!(decode(&format!("{START_PLACEMENT} w KQkq - 0 1")).is_ok());
        assert!(decode(&format!("{START_PLACEMENT} w KQkq e6 12 34")).is_ok());
    }

    #[test]
    fn malformed_records_are_syntax_errors() {
        for bad in [
            "",
            "not a position",
            // seven ranks
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w",
            // nine squares on a rank
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w",
            // short rank
            "rnbqkbnr/pppppppp/7/8/8/8/PPPPPPPP/RNBQKBNR w",
            // missing turn field
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            // unknown piece letter
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w",
            // trailing junk
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x",
        ] {
            assert!(matches!(decode(bad), Err(FenError::Syntax(_))), "{bad:?}");
        }
    }
}
