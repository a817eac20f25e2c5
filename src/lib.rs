//! # touchmove
//!
//! A chess legality engine. The [`model::board::Board`] aggregate owns a
//! position and enforces the full rule set: piece movement, check and
//! double-check, pins, castling eligibility, en passant, promotion, and
//! terminal states (checkmate, stalemate, draw).
//!
//! There is exactly one way to change a position,
//! [`model::board::Board::move_cell`], and it is transactional: a move
//! either commits in full (grid, rights, en-passant target, king cache,
//! rescanned attack map, turn) or is rejected with a typed reason and the
//! board left byte-for-byte as it was.
//!
//! Rendering, turn-flow orchestration, and persistence are collaborators:
//! they read squares, reachability sets, and position text through the
//! public accessors and call the single mutator.

/// Modeling the game of chess.
pub mod model;

/// Position exchange text and algebraic square names.
pub mod notation;

pub use model::{
    Color, Coord, Dir, FenError, IllegalMove, Man, MoveError, Piece, Rights, Wing, board::Board,
    movegen::ReachSet, rules, scan::AttackMap,
};
