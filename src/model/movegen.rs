//! # Move generation
//!
//! Computes the set of squares one chessman can reach, as a plain value
//! ([`ReachSet`]) derived from the current position. The traversal is the
//! same ray/leap walk the danger scanner uses (`scan`); only the visitor
//! differs. King moves into attacked squares are filtered here against the
//! board's current attack map, so a reach set already excludes the obvious
//! self-check king steps. Moves that expose the king indirectly are left
//! in and caught by the board's post-move verification.

use crate::model::{
    Color, Coord, Dir, Piece, SIZE, Wing,
    board::Board,
    scan::{self, Probe},
};

/// Squares a single chessman can reach from its current square.
#[derive(Debug, Clone, Default)]
pub struct ReachSet {
    cells: [[bool; SIZE as usize]; SIZE as usize],
    any: bool,
}

impl ReachSet {
    pub fn empty() -> Self {
        Self::default()
    }

    fn mark(&mut self, at: Coord) {
        self.cells[at.r as usize][at.c as usize] = true;
        self.any = true;
    }

    /// Whether the square is in the set; false off board.
    #[inline]
    pub fn contains(&self, at: Coord) -> bool {
        at.in_bounds() && self.cells[at.r as usize][at.c as usize]
    }

    /// Whether the set is non-empty.
    #[inline]
    pub fn any(&self) -> bool {
        self.any
    }

    /// All marked squares, in rank-major order.
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| Coord::new(r, c)))
            .filter(|&at| self.contains(at))
    }
}

/// Reach set for the occupant of `from`; empty when the square is vacant
/// or off board.
pub fn reachable_from(board: &Board, from: Coord) -> ReachSet {
    let mut set = ReachSet::empty();
    let Some(man) = board.man_at(from) else {
        return set;
    };

    {
        let mut probe = ReachProbe { set: &mut set };
        scan::scan_man(board, man, from, &mut probe);
        if man.piece.is_pawn() {
            scan::pawn_push_scan(board, man.color, from, &mut probe);
        }
    }

    if man.piece.is_king() {
        for wing in [Wing::KING_SIDE, Wing::QUEEN_SIDE] {
            if can_castle(board, man.color, wing) {
                set.mark(from.add_c(2 * wing.step()));
            }
        }
    }

    set
}

/// Whether `color` may castle on `wing` right now: the right is intact,
/// the king is not in check, the squares the king crosses are empty and
/// unattacked, and on the queen side the extra rook-transit square is
/// also empty. The rook's own transit may be attacked.
pub(crate) fn can_castle(board: &Board, color: Color, wing: Wing) -> bool {
    if !board.rights().has(color, wing) || board.is_king_checked(color) {
        return false;
    }

    let king = board.king_coor(color);
    let step = wing.step();
    let one = king.add_c(step);
    let two = king.add_c(2 * step);

    let clear = board.is_empty(one)
        && board.is_empty(two)
        && match wing {
            Wing::KING_SIDE => true,
            Wing::QUEEN_SIDE => board.is_empty(king.add_c(3 * step)),
        };

    let enemy = color.opp();
    clear && !board.attacks().attacked_by(one, enemy) && !board.attacks().attacked_by(two, enemy)
}

struct ReachProbe<'s> {
    set: &'s mut ReachSet,
}

impl Probe for ReachProbe<'_> {
    fn visit(&mut self, board: &Board, color: Color, piece: Piece, at: Coord, dir: Option<Dir>) {
        if !at.in_bounds() {
            return;
        }

        // A pawn's diagonal only reaches an empty square en passant.
        if piece.is_pawn() && dir.is_some() && board.is_empty(at) && board.en_passant() != Some(at)
        {
            return;
        }

        // The king never steps into an attacked square.
        if piece.is_king() && board.attacks().attacked_by(at, color.opp()) {
            return;
        }

        if board.is_empty(at) {
            self.set.mark(at);
            return;
        }

        if board.color_at(at) != Some(color) {
            // A pawn's forward push cannot capture.
            if piece.is_pawn() && dir.is_none() {
                return;
            }
            self.set.mark(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;

    fn sq(text: &str) -> Coord {
        crate::notation::square::parse_square(text).unwrap()
    }

    #[test]
    fn opening_knight_and_pawn_reach() {
        let board = Board::startpos();

        let knight = reachable_from(&board, sq("b1"));
        assert!(knight.contains(sq("a3")));
        assert!(knight.contains(sq("c3")));
        assert!(!knight.contains(sq("d2")));
        assert_eq!(knight.iter().count(), 2);

        let pawn = reachable_from(&board, sq("e2"));
        assert!(pawn.contains(sq("e3")));
        assert!(pawn.contains(sq("e4")));
        assert_eq!(pawn.iter().count(), 2);

        // Blocked pieces and empty squares reach nothing.
        assert!(!reachable_from(&board, sq("a1")).any());
        assert!(!reachable_from(&board, sq("e4")).any());
    }

    #[test]
    fn pawn_diagonal_needs_a_capture() {
        let board = Board::from_fen("k7/8/8/3p4/4P3/8/8/K7 w - -").unwrap();
        let pawn = reachable_from(&board, sq("e4"));
        assert!(pawn.contains(sq("e5")));
        assert!(pawn.contains(sq("d5"))); // capture
        assert!(!pawn.contains(sq("f5"))); // empty diagonal
    }

    #[test]
    fn pawn_diagonal_reaches_en_passant_target() {
        let mut board = Board::from_fen("k7/8/8/8/3p4/8/4P3/K7 w - -").unwrap();
        board.move_square("e2", "e4").unwrap();
        assert_eq!(board.en_passant(), Some(sq("e3")));

        let pawn = reachable_from(&board, sq("d4"));
        assert!(pawn.contains(sq("e3")));
        assert!(pawn.contains(sq("d3")));
    }

    #[test]
    fn king_avoids_attacked_squares() {
        // Black rook on e8 sweeps the e-file; the white king on d1 may not
        // step onto it.
        let board = Board::from_fen("4r2k/8/8/8/8/8/8/3K4 w - -").unwrap();
        let king = reachable_from(&board, sq("d1"));
        assert!(king.contains(sq("c1")));
        assert!(king.contains(sq("c2")));
        assert!(king.contains(sq("d2")));
        assert!(!king.contains(sq("e1")));
        assert!(!king.contains(sq("e2")));
    }

    #[test]
    fn castling_destinations_appear_when_eligible() {
        let board =
            Board::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq").unwrap();
        assert!(can_castle(&board, Color::WHITE, Wing::KING_SIDE));
        assert!(can_castle(&board, Color::WHITE, Wing::QUEEN_SIDE));

        let king = reachable_from(&board, sq("e1"));
        assert!(king.contains(sq("g1")));
        assert!(king.contains(sq("c1")));
    }

    #[test]
    fn castling_blocked_by_attack_on_crossing_square() {
        // Black rook on f8 covers f1: no white king-side castling, but the
        // queen side is unaffected.
        let board = Board::from_fen("5r1k/8/8/8/8/8/8/R3K2R w KQ").unwrap();
        assert!(!can_castle(&board, Color::WHITE, Wing::KING_SIDE));
        assert!(can_castle(&board, Color::WHITE, Wing::QUEEN_SIDE));
    }

    #[test]
    fn castling_requires_the_right_and_no_check() {
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w - -").unwrap();
        assert!(!can_castle(&board, Color::WHITE, Wing::KING_SIDE));
        assert!(!can_castle(&board, Color::WHITE, Wing::QUEEN_SIDE));

        // In check: the rights are intact but castling is barred.
        let checked = Board::from_fen("4r2k/8/8/8/8/8/8/R3K2R w KQ").unwrap();
        assert!(!can_castle(&checked, Color::WHITE, Wing::KING_SIDE));
        assert!(!can_castle(&checked, Color::WHITE, Wing::QUEEN_SIDE));
    }

    #[test]
    fn queen_side_rook_transit_may_be_attacked() {
        // Black rook on b8 attacks b1 only; queen-side castling stays legal
        // because the king never crosses b1.
        let board = Board::from_fen("1r5k/8/8/8/8/8/8/R3K3 w Q").unwrap();
        assert!(can_castle(&board, Color::WHITE, Wing::QUEEN_SIDE));
    }
}
