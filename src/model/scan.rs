//! # Danger scanning
//!
//! A full-board rescan producing an [`AttackMap`]: for every square, how
//! many attacking lines each color projects onto it, whether a king or a
//! pawn specifically is among the attackers, and whether an occupant is
//! pinned to its own king. The map is a plain value recomputed from
//! occupancy: scanning never mutates the board, and a map is only
//! meaningful for the occupancy it was computed from.
//!
//! The per-piece traversal here is shared with move generation
//! (`movegen`), which walks the same rays and offsets but records
//! "reachable" instead of "attacks".

use crate::model::{Color, Coord, Dir, Man, Piece, SIZE, board::Board};

pub(crate) const ORTHOGONALS: [Dir; 4] = [
    Dir::new(0, 1),
    Dir::new(1, 0),
    Dir::new(0, -1),
    Dir::new(-1, 0),
];

pub(crate) const DIAGONALS: [Dir; 4] = [
    Dir::new(1, 1),
    Dir::new(1, -1),
    Dir::new(-1, 1),
    Dir::new(-1, -1),
];

pub(crate) const KNIGHT_JUMPS: [Dir; 8] = [
    Dir::new(-1, 2),
    Dir::new(1, 2),
    Dir::new(-1, -2),
    Dir::new(1, -2),
    Dir::new(2, 1),
    Dir::new(2, -1),
    Dir::new(-2, 1),
    Dir::new(-2, -1),
];

pub(crate) const KING_STEPS: [Dir; 8] = [
    Dir::new(-1, 1),
    Dir::new(0, 1),
    Dir::new(1, 1),
    Dir::new(-1, -1),
    Dir::new(0, -1),
    Dir::new(1, -1),
    Dir::new(-1, 0),
    Dir::new(1, 0),
];

/// Receiver for the shared per-piece traversal.
///
/// A visitor may be handed off-board coordinates (leap and pawn scans do
/// not pre-filter, matching ray walks that do) and must guard itself.
/// `dir` is the ray direction for sliders and pawn diagonals, `None` for
/// leapers and pawn pushes.
pub(crate) trait Probe {
    fn visit(&mut self, board: &Board, color: Color, piece: Piece, at: Coord, dir: Option<Dir>);
}

/// Project one chessman's movement pattern from `from` into the probe.
pub(crate) fn scan_man(board: &Board, man: Man, from: Coord, probe: &mut impl Probe) {
    match man.piece {
        Piece::PAWN => pawn_attack_scan(board, man.color, from, probe),
        Piece::KNIGHT => leap_scan(board, man.color, Piece::KNIGHT, from, &KNIGHT_JUMPS, probe),
        Piece::BISHOP => ray_scan(board, man.color, Piece::BISHOP, from, &DIAGONALS, probe),
        Piece::ROOK => ray_scan(board, man.color, Piece::ROOK, from, &ORTHOGONALS, probe),
        Piece::QUEEN => {
            ray_scan(board, man.color, Piece::QUEEN, from, &ORTHOGONALS, &mut *probe);
            ray_scan(board, man.color, Piece::QUEEN, from, &DIAGONALS, probe);
        }
        Piece::KING => leap_scan(board, man.color, Piece::KING, from, &KING_STEPS, probe),
    }
}

/// Walk each ray outward, stopping at (and including) the first occupied
/// square.
fn ray_scan(
    board: &Board,
    color: Color,
    piece: Piece,
    from: Coord,
    rays: &[Dir],
    probe: &mut impl Probe,
) {
    for &dir in rays {
        let mut at = from.add(dir);
        while at.in_bounds() {
            probe.visit(board, color, piece, at, Some(dir));
            if board.man_at(at).is_some() {
                break;
            }
            at = at.add(dir);
        }
    }
}

/// Visit a fixed offset set; no direction, leapers cannot pin.
fn leap_scan(
    board: &Board,
    color: Color,
    piece: Piece,
    from: Coord,
    jumps: &[Dir],
    probe: &mut impl Probe,
) {
    for &jump in jumps {
        probe.visit(board, color, piece, from.add(jump), None);
    }
}

/// The two diagonal-forward squares a pawn attacks. The forward-move
/// squares are never attacked; see `pawn_push_scan` for those.
fn pawn_attack_scan(board: &Board, color: Color, from: Coord, probe: &mut impl Probe) {
    for dx in [-1, 1] {
        let dir = Dir::new(dx, color.forward());
        probe.visit(board, color, Piece::PAWN, from.add(dir), Some(dir));
    }
}

/// Forward pawn moves: one square onto empty, or two from the starting
/// rank when both intervening squares are empty. Used by move generation
/// only, since pushes threaten nothing.
pub(crate) fn pawn_push_scan(board: &Board, color: Color, from: Coord, probe: &mut impl Probe) {
    let one = from.add_r(color.forward());
    if !one.in_bounds() || !board.is_empty(one) {
        return;
    }
    probe.visit(board, color, Piece::PAWN, one, None);

    let start_rank = color.home_rank() + color.forward();
    let two = from.add_r(2 * color.forward());
    if from.r == start_rank && two.in_bounds() && board.is_empty(two) {
        probe.visit(board, color, Piece::PAWN, two, None);
    }
}

/// Derived attack metadata for one square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttackCell {
    /// Attacking lines per color.
    pub checks: [u8; 2],
    /// Attacked specifically by that color's king.
    pub by_king: [bool; 2],
    /// Attacked specifically by one of that color's pawns.
    pub by_pawn: [bool; 2],
    /// The occupant is pinned to its own king.
    pub pinned: bool,
}

/// The result of one full danger scan.
///
/// Valid for exactly the occupancy it was scanned from; the board replaces
/// its map wholesale after every mutation, so stale metadata is never
/// readable.
#[derive(Debug, Clone)]
pub struct AttackMap {
    cells: [[AttackCell; SIZE as usize]; SIZE as usize],
    checker: Option<Coord>,
}

impl AttackMap {
    /// A map with no attacks recorded; only used as a placeholder while a
    /// board is being constructed.
    pub(crate) fn empty() -> Self {
        Self {
            cells: [[AttackCell::default(); SIZE as usize]; SIZE as usize],
            checker: None,
        }
    }

    /// Rescan the whole board.
    ///
    /// Idempotent and side-effect free: it reads occupancy and king
    /// locations, nothing else, and builds a fresh map.
    pub fn scan(board: &Board) -> Self {
        let mut map = Self::empty();

        for r in 0..SIZE {
            for c in 0..SIZE {
                let from = Coord::new(r, c);
                let Some(man) = board.man_at(from) else {
                    continue;
                };

                let enemy_king = board.king_coor(man.color.opp());
                let checked_before = map.attacked_by(enemy_king, man.color);

                scan_man(board, man, from, &mut DangerProbe { map: &mut map });

                if !checked_before && map.attacked_by(enemy_king, man.color) {
                    map.checker = Some(from);
                }
            }
        }

        map
    }

    /// Whether `color` projects at least one attacking line onto the square.
    #[inline]
    pub fn attacked_by(&self, at: Coord, color: Color) -> bool {
        self.attackers(at, color) > 0
    }

    /// Number of `color`'s attacking lines onto the square; 0 off board.
    #[inline]
    pub fn attackers(&self, at: Coord, color: Color) -> u8 {
        if !at.in_bounds() {
            return 0;
        }
        self.cells[at.r as usize][at.c as usize].checks[color.ix()]
    }

    /// Whether `color`'s king is among the square's attackers.
    #[inline]
    pub fn attacked_by_king(&self, at: Coord, color: Color) -> bool {
        at.in_bounds() && self.cells[at.r as usize][at.c as usize].by_king[color.ix()]
    }

    /// Whether one of `color`'s pawns is among the square's attackers.
    #[inline]
    pub fn attacked_by_pawn(&self, at: Coord, color: Color) -> bool {
        at.in_bounds() && self.cells[at.r as usize][at.c as usize].by_pawn[color.ix()]
    }

    /// Whether the square's occupant is pinned to its own king.
    #[inline]
    pub fn is_pinned(&self, at: Coord) -> bool {
        at.in_bounds() && self.cells[at.r as usize][at.c as usize].pinned
    }

    /// Square of the piece first found to be giving check, if any.
    #[inline]
    pub fn checker(&self) -> Option<Coord> {
        self.checker
    }
}

struct DangerProbe<'m> {
    map: &'m mut AttackMap,
}

impl Probe for DangerProbe<'_> {
    fn visit(&mut self, board: &Board, color: Color, piece: Piece, at: Coord, dir: Option<Dir>) {
        if !at.in_bounds() {
            return;
        }

        {
            let cell = &mut self.map.cells[at.r as usize][at.c as usize];
            cell.checks[color.ix()] += 1;
            if piece.is_pawn() {
                cell.by_pawn[color.ix()] = true;
            }
            if piece.is_king() {
                cell.by_king[color.ix()] = true;
                return;
            }
        }

        // Pin detection: the scan stopped on an enemy occupant that sits on
        // this attacker's ray toward the enemy king with nothing between.
        if let Some(dir) = dir {
            if let Some(victim) = board.man_at(at) {
                if victim.color == color.opp() {
                    let king = board.king_coor(victim.color);
                    if Dir::between(at, king) == dir && path_between_empty(board, at, king) {
                        self.map.cells[at.r as usize][at.c as usize].pinned = true;
                    }
                }
            }
        }
    }
}

/// Whether every square strictly between `start` and `end` is empty,
/// walking the rounded direction from `start`; false when the walk never
/// lands exactly on `end`.
pub(crate) fn path_between_empty(board: &Board, start: Coord, end: Coord) -> bool {
    let dir = Dir::between(start, end);
    if dir == Dir::new(0, 0) {
        return false;
    }

    let mut at = start.add(dir);
    while at.in_bounds() {
        if at == end {
            return true;
        }
        if board.man_at(at).is_some() {
            return false;
        }
        at = at.add(dir);
    }

    false
}

#[test]
fn scan_counts_attackers_per_color() {
    use crate::model::board::Board;
    let board = Board::startpos();
    let map = board.attacks();

    // e3 is covered by the d2/f2 pawns and nothing of black's.
    let e3 = Coord::new(5, 4);
    assert_eq!(map.attackers(e3, Color::WHITE), 2);
    assert_eq!(map.attackers(e3, Color::BLACK), 0);
    assert!(map.attacked_by_pawn(e3, Color::WHITE));

    // f1 is defended by the king (among others).
    let f1 = Coord::new(7, 5);
    assert!(map.attacked_by_king(f1, Color::WHITE));

    // Nobody is in check or pinned at the start.
    assert_eq!(map.checker(), None);
    assert!(!board.is_king_checked(Color::WHITE));
    assert!(!board.is_king_checked(Color::BLACK));
}

#[test]
fn pawn_attacks_are_diagonal_only() {
    use crate::model::board::Board;
    // Lone white pawn on e4.
    let board = Board::from_fen("k7/8/8/8/4P3/8/8/K7 w - -").unwrap();
    let map = board.attacks();
    assert!(map.attacked_by(Coord::new(3, 3), Color::WHITE)); // d5
    assert!(map.attacked_by(Coord::new(3, 5), Color::WHITE)); // f5
    assert!(!map.attacked_by(Coord::new(3, 4), Color::WHITE)); // e5 push square
}

#[test]
fn slider_marks_pin_on_first_enemy_blocker() {
    use crate::model::board::Board;
    // Black queen a4, white rook a2, white king a1: the rook is pinned.
    let board = Board::from_fen("k7/8/8/8/q7/8/R7/K7 w - -").unwrap();
    let map = board.attacks();
    assert!(map.is_pinned(Coord::new(6, 0)));
    // The queen also attacks through to the rook but not past it.
    assert!(map.attacked_by(Coord::new(5, 0), Color::BLACK)); // a3
    assert!(!map.attacked_by(Coord::new(7, 0), Color::BLACK)); // a1 blocked
}

#[test]
fn checker_square_is_recorded() {
    use crate::model::board::Board;
    let board = Board::from_fen("3k4/3Q4/2K5/8/8/8/8/8 b - -").unwrap();
    assert!(board.is_king_checked(Color::BLACK));
    assert_eq!(board.checker(), Some(Coord::new(1, 3))); // the queen on d7
}
