//! Algebraic square names, `a1` through `h8`.

use chumsky::prelude::*;

use crate::model::{Coord, MoveError, SIZE};

/// Parser for one square name. Rank digits count up from white's home
/// rank, so the rank maps to `SIZE - digit` internally.
pub(crate) fn square<'s>() -> impl Parser<'s, &'s str, Coord> {
    group((one_of('a'..='h'), one_of('1'..='8'))).map(|(file, rank): (char, char)| {
        Coord::new(SIZE - (rank as u8 - b'0') as i8, (file as u8 - b'a') as i8)
    })
}

/// Parse a full string as one square name.
pub fn parse_square(text: &str) -> Result<Coord, MoveError> {
    square()
        .then_ignore(end())
        .parse(text)
        .into_result()
        .map_err(|_| MoveError::InvalidLocation(text.to_string()))
}
