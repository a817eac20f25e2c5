//! # Perft
//!
//! Exhaustive legal-move counting, the standard cross-check for movement
//! and validation semantics. Every candidate from the reach sets is tried
//! on a clone through the same validated entry point ordinary callers
//! use, so the counts exercise the full pipeline including the post-move
//! king-safety verification.

use std::collections::BTreeMap;

use crate::model::{Coord, SIZE, board::Board, movegen};

/// Number of legal move sequences of length `depth` from the position.
pub fn perft(board: &Board, depth: usize) -> usize {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    for r in 0..SIZE {
        for c in 0..SIZE {
            let from = Coord::new(r, c);
            if board.color_at(from) != Some(board.turn()) {
                continue;
            }
            for to in board.reachable_from(from).iter() {
                let mut next = board.clone();
                if next.move_cell(from, to).is_ok() {
                    nodes += perft(&next, depth - 1);
                }
            }
        }
    }
    nodes
}

/// Per-root-move breakdown of [`perft`], keyed by coordinate pairs like
/// `"e2e4"`. Useful for diffing against another engine's counts.
pub fn perft_divide(board: &Board, depth: usize) -> BTreeMap<String, usize> {
    let mut divide = BTreeMap::new();
    if depth == 0 {
        return divide;
    }

    for r in 0..SIZE {
        for c in 0..SIZE {
            let from = Coord::new(r, c);
            if board.color_at(from) != Some(board.turn()) {
                continue;
            }
            for to in board.reachable_from(from).iter() {
                let mut next = board.clone();
                if next.move_cell(from, to).is_ok() {
                    divide.insert(format!("{from}{to}"), perft(&next, depth - 1));
                }
            }
        }
    }
    divide
}
