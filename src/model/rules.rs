//! # End-of-game rules
//!
//! Checkmate, stalemate and draw judgements over a [`Board`]. These are
//! pure queries: where a rule needs to know whether a king can actually
//! step somewhere, it tries the move on a clone and inspects the result,
//! so the board handed in is never mutated.

use crate::model::{Color, Coord, Dir, Piece, SIZE, board::Board, movegen, scan};

/// Whether the side to move is checkmated.
///
/// The king must be in check with no escape square; a double check is then
/// final, a single check survives only if the checking line can neither be
/// blocked nor the checker captured.
pub fn is_checkmate(board: &Board) -> bool {
    let color = board.turn();
    if !board.is_king_checked(color) {
        return false;
    }
    if can_king_move(board, color) {
        return false;
    }
    if board.is_king_double_checked(color) {
        return true;
    }

    let Some(checker) = board.checker() else {
        return false;
    };
    if is_check_blockable(board, checker, color) {
        return false;
    }
    !board.can_cell_be_taken_by(checker, color)
}

/// Whether the side to move is stalemated: not in check, but without a
/// single legal move.
pub fn is_stalemate(board: &Board) -> bool {
    let color = board.turn();
    !board.is_king_checked(color) && !can_color_move(board, color)
}

/// Whether the position is drawn, by stalemate or insufficient material.
pub fn is_draw(board: &Board) -> bool {
    is_stalemate(board) || board.has_insufficient_material()
}

/// Whether `color`'s king has any legal step, tried move by move on
/// clones. Callers only ask about the side to move.
pub(crate) fn can_king_move(board: &Board, color: Color) -> bool {
    let king = board.king_coor(color);
    scan::KING_STEPS.iter().any(|&step| {
        let mut probe = board.clone();
        probe.move_cell(king, king.add(step)).is_ok()
    })
}

/// Whether `color` has any legal move at all: some chessman with a
/// non-empty reach set that its pin, if any, actually lets it use.
pub fn can_color_move(board: &Board, color: Color) -> bool {
    for r in 0..SIZE {
        for c in 0..SIZE {
            let at = Coord::new(r, c);
            if board.color_at(at) != Some(color) {
                continue;
            }
            if movegen::reachable_from(board, at).any() && can_pinned_man_move(board, at) {
                return true;
            }
        }
    }
    false
}

/// Whether a defender can interpose on the line from `checker` to its
/// king. Walks the checking ray; an occupied square before the king ends
/// the search, an empty square counts when the defender can put a piece
/// there.
fn is_check_blockable(board: &Board, checker: Coord, defender: Color) -> bool {
    let king = board.king_coor(defender);
    let dir = Dir::between(checker, king);
    if dir == Dir::new(0, 0) {
        return false;
    }

    let mut at = checker.add(dir);
    while at.in_bounds() && at != king {
        if board.man_at(at).is_some() {
            return false;
        }
        if board.can_cell_be_taken_by(at, defender) {
            return true;
        }
        at = at.add(dir);
    }
    false
}

/// Whether a pinned chessman retains a move along its pin line.
///
/// Unpinned men trivially qualify. A pinned knight never moves; sliders
/// and pawns move exactly when an adjacent square on the pin axis is
/// open and their movement pattern fits that axis.
fn can_pinned_man_move(board: &Board, at: Coord) -> bool {
    if !board.attacks().is_pinned(at) {
        return true;
    }
    let Some(man) = board.man_at(at) else {
        return true;
    };

    let king = board.king_coor(man.color);
    let dir = Dir::between(at, king);
    let axis_open =
        || board.is_empty(at.add(dir)) || board.is_empty(at.add(dir.neg()));

    match man.piece {
        Piece::KNIGHT => false,
        Piece::PAWN => !dir.is_diagonal() && board.is_empty(at.add_r(man.color.forward())),
        Piece::BISHOP => dir.is_diagonal() && axis_open(),
        Piece::ROOK => !dir.is_diagonal() && axis_open(),
        Piece::QUEEN => axis_open(),
        // Kings are never marked pinned.
        Piece::KING => false,
    }
}
