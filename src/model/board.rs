//! # The board aggregate
//!
//! [`Board`] owns every piece of position state: the 8x8 occupancy grid,
//! the side to move, castling rights, the en passant target, a cached
//! king location per color, and the attack map of the current occupancy.
//! All writes go through [`Board::move_cell`], which validates, applies
//! provisionally, verifies the mover's king is safe, and either commits
//! or restores the pre-move state byte for byte.

use crate::model::{
    Color, Coord, Dir, FenError, IllegalMove, Man, MoveError, Piece, Rights, SIZE, Wing,
    movegen::{self, ReachSet},
    scan::AttackMap,
};
use crate::notation;

type Grid = [[Option<Man>; SIZE as usize]; SIZE as usize];

#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    turn: Color,
    rights: Rights,
    en_passant: Option<Coord>,
    kings: [Coord; 2],
    attacks: AttackMap,
}

impl Board {
    /// The standard starting position, white to move.
    pub fn startpos() -> Self {
        use Piece::*;
        let back = [ROOK, KNIGHT, BISHOP, QUEEN, KING, BISHOP, KNIGHT, ROOK];

        let mut grid: Grid = [[None; SIZE as usize]; SIZE as usize];
        for c in 0..SIZE as usize {
            grid[0][c] = Some(Man::new(Color::BLACK, back[c]));
            grid[1][c] = Some(Man::new(Color::BLACK, PAWN));
            grid[6][c] = Some(Man::new(Color::WHITE, PAWN));
            grid[7][c] = Some(Man::new(Color::WHITE, back[c]));
        }

        let mut board = Self {
            grid,
            turn: Color::WHITE,
            rights: Rights::START,
            en_passant: None,
            kings: [Coord::new(7, 4), Coord::new(0, 4)],
            attacks: AttackMap::empty(),
        };
        board.attacks = AttackMap::scan(&board);
        board
    }

    /// Build a board from FEN-style notation.
    ///
    /// The castling and en passant fields may be omitted; omitted castling
    /// defaults to all four rights, omitted en passant to none. Requested
    /// castling rights are silently dropped for any wing whose king or
    /// rook is no longer on its origin square. The position must contain
    /// exactly one king per color.
    pub fn from_fen(text: &str) -> Result<Self, FenError> {
        tracing::trace!(fen = text, "decoding position");
        let record = notation::fen::decode(text)?;

        let mut grid: Grid = [[None; SIZE as usize]; SIZE as usize];
        for (r, row) in record.rows.iter().enumerate() {
            for (c, man) in row.iter().enumerate() {
                grid[r][c] = *man;
            }
        }

        let kings = Self::locate_kings(&grid)?;
        let rights = Self::effective_rights(&grid, record.rights);

        let mut board = Self {
            grid,
            turn: record.turn,
            rights,
            en_passant: record.en_passant,
            kings,
            attacks: AttackMap::empty(),
        };
        board.attacks = AttackMap::scan(&board);
        Ok(board)
    }

    fn locate_kings(grid: &Grid) -> Result<[Coord; 2], FenError> {
        let mut kings = [None, None];
        for r in 0..SIZE {
            for c in 0..SIZE {
                if let Some(man) = grid[r as usize][c as usize] {
                    if man.piece.is_king() {
                        if kings[man.color.ix()].is_some() {
                            return Err(FenError::DuplicateKing(man.color));
                        }
                        kings[man.color.ix()] = Some(Coord::new(r, c));
                    }
                }
            }
        }
        match kings {
            [Some(white), Some(black)] => Ok([white, black]),
            [None, _] => Err(FenError::MissingKing(Color::WHITE)),
            [_, None] => Err(FenError::MissingKing(Color::BLACK)),
        }
    }

    /// Drop any requested right whose king or rook has left its origin
    /// square.
    fn effective_rights(grid: &Grid, requested: Rights) -> Rights {
        let mut rights = requested;
        for color in [Color::WHITE, Color::BLACK] {
            let home = color.home_rank() as usize;
            if grid[home][4] != Some(Man::new(color, Piece::KING)) {
                rights.revoke_both(color);
                continue;
            }
            for wing in [Wing::KING_SIDE, Wing::QUEEN_SIDE] {
                if grid[home][wing.rook_file() as usize] != Some(Man::new(color, Piece::ROOK)) {
                    rights.revoke(color, wing);
                }
            }
        }
        rights
    }

    /// The position in FEN-style notation, always all four fields.
    pub fn fen(&self) -> String {
        self.to_string()
    }

    /// Occupant of the square; `None` when empty or off board.
    #[inline]
    pub fn man_at(&self, at: Coord) -> Option<Man> {
        if !at.in_bounds() {
            return None;
        }
        self.grid[at.r as usize][at.c as usize]
    }

    /// Color of the occupant, if any.
    #[inline]
    pub fn color_at(&self, at: Coord) -> Option<Color> {
        self.man_at(at).map(|man| man.color)
    }

    /// Whether the square is on the board and vacant.
    #[inline]
    pub fn is_empty(&self, at: Coord) -> bool {
        at.in_bounds() && self.grid[at.r as usize][at.c as usize].is_none()
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn rights(&self) -> Rights {
        self.rights
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Coord> {
        self.en_passant
    }

    /// Location of `color`'s king.
    #[inline]
    pub fn king_coor(&self, color: Color) -> Coord {
        self.kings[color.ix()]
    }

    /// Attack map of the current occupancy.
    #[inline]
    pub fn attacks(&self) -> &AttackMap {
        &self.attacks
    }

    /// Whether `color`'s king is attacked.
    pub fn is_king_checked(&self, color: Color) -> bool {
        self.attacks.attacked_by(self.king_coor(color), color.opp())
    }

    /// Whether `color`'s king is attacked along two or more lines.
    pub fn is_king_double_checked(&self, color: Color) -> bool {
        self.attacks.attackers(self.king_coor(color), color.opp()) > 1
    }

    /// Square of the piece giving check, if any.
    pub fn checker(&self) -> Option<Coord> {
        self.attacks.checker()
    }

    /// Reach set for the occupant of `from`.
    pub fn reachable_from(&self, from: Coord) -> ReachSet {
        movegen::reachable_from(self, from)
    }

    /// Whether `color` could capture the occupant of (or land a piece on)
    /// the square, judged from the attack map alone. Any of four cases
    /// suffices: three or more attacking lines; exactly two that are not
    /// just a pawn eyeing an empty square; the king when the square is
    /// undefended; or any non-king attacker at all.
    pub fn can_cell_be_taken_by(&self, at: Coord, color: Color) -> bool {
        let attackers = self.attacks.attackers(at, color);
        let by_king = self.attacks.attacked_by_king(at, color);
        let by_pawn = self.attacks.attacked_by_pawn(at, color);

        attackers > 2
            || (attackers == 2 && !(by_pawn && self.is_empty(at)))
            || (by_king && !self.attacks.attacked_by(at, color.opp()))
            || (!by_king && attackers > 0)
    }

    /// Validate and perform a move, or leave the board untouched.
    ///
    /// Order of operations: turn and reachability checks; provisional
    /// apply (en passant capture, relocation, rights revocation, castling
    /// rook shift, auto-queen promotion, new en passant target); full
    /// danger rescan; rollback with [`IllegalMove::ExposesKing`] if the
    /// mover's own king ended up attacked; otherwise the turn flips and
    /// the move is committed.
    pub fn move_cell(&mut self, from: Coord, to: Coord) -> Result<(), IllegalMove> {
        let man = self.man_at(from).ok_or(IllegalMove::VacantSquare)?;
        if man.color != self.turn {
            return Err(IllegalMove::OutOfTurn(self.turn));
        }
        if !movegen::reachable_from(self, from).contains(to) {
            return Err(IllegalMove::Unreachable);
        }

        let snapshot = self.clone();

        let target = self.double_push_target(man, from, to);
        self.capture_en_passant_pawn(man, from, to);
        self.relocate(man, from, to);
        self.castle_rook(man, from, to);
        self.promote(to);
        self.en_passant = target;

        self.attacks = AttackMap::scan(self);
        if self.is_king_checked(man.color) {
            *self = snapshot;
            tracing::debug!(?from, ?to, "move exposes own king, rolled back");
            return Err(IllegalMove::ExposesKing);
        }

        self.turn = self.turn.opp();
        tracing::debug!(?from, ?to, piece = ?man.piece, "move committed");
        Ok(())
    }

    /// [`Board::move_cell`] with squares in algebraic notation, e.g.
    /// `board.move_square("e2", "e4")`.
    pub fn move_square(&mut self, from: &str, to: &str) -> Result<(), MoveError> {
        let from = notation::square::parse_square(from)?;
        let to = notation::square::parse_square(to)?;
        Ok(self.move_cell(from, to)?)
    }

    /// En passant target opened by this move: the square a pawn passed
    /// over on a two-rank push.
    fn double_push_target(&self, man: Man, from: Coord, to: Coord) -> Option<Coord> {
        if man.piece.is_pawn() && (to.r - from.r).abs() == 2 {
            Some(from.add(Dir::between(from, to)))
        } else {
            None
        }
    }

    /// A pawn arriving diagonally on an empty square captures en passant;
    /// the captured pawn sits one rank behind the destination.
    fn capture_en_passant_pawn(&mut self, man: Man, from: Coord, to: Coord) {
        if !man.piece.is_pawn() {
            return;
        }
        let dir = Dir::between(from, to);
        if dir.x != 0 && self.is_empty(to) {
            let dying = to.add_r(-dir.y);
            self.grid[dying.r as usize][dying.c as usize] = None;
        }
    }

    fn set_man(&mut self, at: Coord, man: Man) {
        self.grid[at.r as usize][at.c as usize] = Some(man);
        if man.piece.is_king() {
            self.kings[man.color.ix()] = at;
        }
    }

    fn relocate(&mut self, man: Man, from: Coord, to: Coord) {
        if self.grid[to.r as usize][to.c as usize].is_some() {
            self.revoke_rights_at(to);
        }
        self.set_man(to, man);
        self.grid[from.r as usize][from.c as usize] = None;
        self.revoke_rights_at(from);
    }

    /// Castling rights lost when the square is vacated or captured on.
    fn revoke_rights_at(&mut self, at: Coord) {
        for color in [Color::WHITE, Color::BLACK] {
            let home = color.home_rank();
            if at == Coord::new(home, 4) {
                self.rights.revoke_both(color);
            } else if at == Coord::new(home, Wing::QUEEN_SIDE.rook_file()) {
                self.rights.revoke(color, Wing::QUEEN_SIDE);
            } else if at == Coord::new(home, Wing::KING_SIDE.rook_file()) {
                self.rights.revoke(color, Wing::KING_SIDE);
            }
        }
    }

    /// When the king just moved two files, bring the rook across to the
    /// square the king passed over.
    fn castle_rook(&mut self, man: Man, from: Coord, to: Coord) {
        if !man.piece.is_king() || (to.c - from.c).abs() != 2 {
            return;
        }
        let wing = if to.c > from.c {
            Wing::KING_SIDE
        } else {
            Wing::QUEEN_SIDE
        };
        let corner = Coord::new(man.color.home_rank(), wing.rook_file());
        if let Some(rook) = self.man_at(corner) {
            self.set_man(to.add_c(-wing.step()), rook);
            self.grid[corner.r as usize][corner.c as usize] = None;
            self.revoke_rights_at(corner);
        }
    }

    /// A pawn on its farthest rank becomes a queen.
    fn promote(&mut self, at: Coord) {
        if let Some(man) = self.man_at(at) {
            if man.piece.is_pawn() && at.r == man.color.promotion_rank() {
                self.set_man(at, Man::new(man.color, Piece::QUEEN));
            }
        }
    }

    /// Whether neither side retains mating material. Material accounting
    /// is not implemented yet, so this is always false.
    pub fn has_insufficient_material(&self) -> bool {
        false
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -";

    fn sq(text: &str) -> Coord {
        crate::notation::square::parse_square(text).unwrap()
    }

    #[test]
    fn startpos_round_trips_through_fen() {
        let board = Board::startpos();
        assert_eq!(board.fen(), START);
        assert_eq!(Board::from_fen(START).unwrap().fen(), START);
    }

    #[test]
    fn omitted_fields_default_and_extra_clocks_are_ignored() {
        let plain = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w").unwrap();
        assert_eq!(plain.fen(), START);

        let clocked =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert_eq!(clocked.fen(), START);
    }

    #[test]
    fn requested_rights_drop_when_origin_squares_are_wrong() {
        // White king displaced to d1: both white rights vanish; black's
        // queen rook missing: only black king-side survives.
        let board = Board::from_fen("4k2r/8/8/8/8/8/8/2RK4 w KQkq -").unwrap();
        assert!(!board.rights().has(Color::WHITE, Wing::KING_SIDE));
        assert!(!board.rights().has(Color::WHITE, Wing::QUEEN_SIDE));
        assert!(board.rights().has(Color::BLACK, Wing::KING_SIDE));
        assert!(!board.rights().has(Color::BLACK, Wing::QUEEN_SIDE));
    }

    #[test]
    fn positions_need_exactly_one_king_per_color() {
        assert_eq!(
            Board::from_fen("8/8/8/8/8/8/8/K7 w - -").unwrap_err(),
            FenError::MissingKing(Color::BLACK)
        );
        assert_eq!(
            Board::from_fen("kk6/8/8/8/8/8/8/K7 w - -").unwrap_err(),
            FenError::DuplicateKing(Color::BLACK)
        );
    }

    #[test]
    fn moving_updates_turn_and_en_passant() {
        let mut board = Board::startpos();
        board.move_cell(sq("e2"), sq("e4")).unwrap();
        assert_eq!(board.turn(), Color::BLACK);
        assert_eq!(board.en_passant(), Some(sq("e3")));
        assert_eq!(
            board.fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3"
        );
    }

    #[test]
    fn rejected_moves_leave_no_trace() {
        let mut board = Board::startpos();

        assert_eq!(board.move_cell(sq("e4"), sq("e5")), Err(IllegalMove::VacantSquare));
        assert_eq!(
            board.move_cell(sq("e7"), sq("e5")),
            Err(IllegalMove::OutOfTurn(Color::WHITE))
        );
        assert_eq!(board.move_cell(sq("e2"), sq("e5")), Err(IllegalMove::Unreachable));
        assert_eq!(board.fen(), START);
    }

    #[test]
    fn pinned_piece_cannot_expose_the_king() {
        let mut board = Board::from_fen("k7/8/8/8/q7/8/R7/K7 w - -").unwrap();
        let before = board.fen();

        assert!(board.attacks().is_pinned(sq("a2")));
        assert_eq!(board.move_cell(sq("a2"), sq("b2")), Err(IllegalMove::ExposesKing));
        assert_eq!(board.fen(), before);

        // Moves along the pin line are fine.
        let mut along = board.clone();
        along.move_cell(sq("a2"), sq("a3")).unwrap();
        board.move_cell(sq("a2"), sq("a4")).unwrap();
        assert!(board.is_empty(sq("a2")));
    }

    #[test]
    fn castling_moves_the_rook_and_spends_the_rights() {
        let mut board =
            Board::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq -").unwrap();
        board.move_cell(sq("e1"), sq("g1")).unwrap();
        assert_eq!(board.fen(), "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R4RK1 b kq -");

        board.move_cell(sq("e8"), sq("c8")).unwrap();
        assert_eq!(board.fen(), "2kr3r/pppppppp/8/8/8/8/PPPPPPPP/R4RK1 w - -");
    }

    #[test]
    fn rook_and_king_moves_revoke_rights() {
        let mut board =
            Board::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq -").unwrap();
        board.move_square("a1", "b1").unwrap();
        assert!(!board.rights().has(Color::WHITE, Wing::QUEEN_SIDE));
        assert!(board.rights().has(Color::WHITE, Wing::KING_SIDE));

        board.move_square("e8", "d8").unwrap();
        assert!(!board.rights().has(Color::BLACK, Wing::KING_SIDE));
        assert!(!board.rights().has(Color::BLACK, Wing::QUEEN_SIDE));
        assert!(board.rights().has(Color::WHITE, Wing::KING_SIDE));
    }

    #[test]
    fn capturing_a_rook_revokes_the_right_for_that_corner() {
        // White rook takes the h8 rook.
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq -").unwrap();
        board.move_square("h1", "h8").unwrap();
        assert!(!board.rights().has(Color::BLACK, Wing::KING_SIDE));
        assert!(board.rights().has(Color::BLACK, Wing::QUEEN_SIDE));
    }

    #[test]
    fn en_passant_capture_removes_the_passed_pawn() {
        let mut board = Board::from_fen("k7/8/8/8/3p4/8/4P3/K7 w - -").unwrap();
        board.move_square("e2", "e4").unwrap();
        board.move_square("d4", "e3").unwrap();
        assert_eq!(board.fen(), "k7/8/8/8/8/4p3/8/K7 w - -");
    }

    #[test]
    fn en_passant_window_closes_after_one_move() {
        let mut board = Board::from_fen("k7/8/8/8/3p4/8/4P3/K7 w - -").unwrap();
        board.move_square("e2", "e4").unwrap();
        board.move_square("a8", "b8").unwrap();
        assert_eq!(board.en_passant(), None);
        board.move_square("a1", "b1").unwrap();
        assert_eq!(
            board.move_square("d4", "e3"),
            Err(MoveError::Illegal(IllegalMove::Unreachable))
        );
    }

    #[test]
    fn pawn_reaching_the_far_rank_becomes_a_queen() {
        let mut board = Board::from_fen("k7/4P3/8/8/8/8/8/K7 w - -").unwrap();
        board.move_square("e7", "e8").unwrap();
        assert_eq!(board.fen(), "k3Q3/8/8/8/8/8/8/K7 b - -");
    }

    #[test]
    fn bad_square_text_is_reported_with_the_input() {
        let mut board = Board::startpos();
        assert_eq!(
            board.move_square("e9", "e4"),
            Err(MoveError::InvalidLocation("e9".into()))
        );
        assert_eq!(
            board.move_square("e2", "x4"),
            Err(MoveError::InvalidLocation("x4".into()))
        );
    }

    #[test]
    fn taken_by_judgement_follows_the_attack_map() {
        let board = Board::startpos();
        // Pawn diagonals count as cover even onto an empty square.
        assert!(board.can_cell_be_taken_by(sq("e3"), Color::WHITE));
        assert!(board.can_cell_be_taken_by(sq("f3"), Color::WHITE));
        // Unattacked squares are not takeable.
        assert!(!board.can_cell_be_taken_by(sq("e5"), Color::WHITE));

        // A lone king attacker does not take a defended man.
        let guarded = Board::from_fen("kQ6/p7/8/8/8/6B1/4K3/8 b").unwrap();
        assert!(!guarded.can_cell_be_taken_by(sq("b8"), Color::BLACK));
    }
}
