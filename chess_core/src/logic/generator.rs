use crate::engine::move_list::MoveList;
use crate::engine::Move;
use crate::logic::board::{
    BitboardIterator, Board, CastleSide, Color, PieceType, Square, KING_START_COL,
};
use crate::logic::lookup::AttackTables;
use crate::logic::rules::{can_castle, is_in_check};

/// Board-level move enumeration. Legal lists are pseudo-legal lists filtered by
/// one scratch apply and one check test per candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub const fn new() -> Self {
        Self
    }

    /// Moves obeying piece geometry, ignoring whether the mover's king is left
    /// in check. With `tactical_only`, quiet moves other than promotions are skipped.
    pub fn pseudo_legal_moves(&self, board: &Board, color: Color, tactical_only: bool) -> MoveList {
        let mut moves = MoveList::new();
        let tables = AttackTables::get();
        let own = board.color_bb(color);
        let enemy = board.color_bb(color.opposite());
        let occupied = own | enemy;
        let targets = if tactical_only { enemy } else { !own };

        for sq in BitboardIterator::new(board.piece_bb(color, PieceType::Pawn)) {
            self.generate_pawn_moves(
                board,
                Square::from_index(sq),
                color,
                tactical_only,
                &mut moves,
            );
        }

        for sq in BitboardIterator::new(board.piece_bb(color, PieceType::Knight)) {
            let from = Square::from_index(sq);
            push_targets(from, tables.knight_attacks(from) & targets, &mut moves);
        }

        for sq in BitboardIterator::new(board.piece_bb(color, PieceType::Bishop)) {
            let from = Square::from_index(sq);
            push_targets(from, tables.bishop_attacks(from, occupied) & targets, &mut moves);
        }

        for sq in BitboardIterator::new(board.piece_bb(color, PieceType::Rook)) {
            let from = Square::from_index(sq);
            push_targets(from, tables.rook_attacks(from, occupied) & targets, &mut moves);
        }

        for sq in BitboardIterator::new(board.piece_bb(color, PieceType::Queen)) {
            let from = Square::from_index(sq);
            push_targets(from, tables.queen_attacks(from, occupied) & targets, &mut moves);
        }

        if let Some(king) = board.king_square(color) {
            push_targets(king, tables.king_attacks(king) & targets, &mut moves);

            if !tactical_only {
                for side in CastleSide::BOTH {
                    if can_castle(board, color, side) {
                        if let Some(to) = Square::new(color.home_row(), side.king_target_col()) {
                            moves.push(Move::new(king, to));
                        }
                    }
                }
            }
        }

        moves
    }

    fn generate_pawn_moves(
        &self,
        board: &Board,
        from: Square,
        color: Color,
        tactical_only: bool,
        moves: &mut MoveList,
    ) {
        let dir = color.forward();
        let enemy = board.color_bb(color.opposite());

        if let Some(one) = from.offset(dir, 0) {
            if board.is_empty_square(one) {
                if one.row() == color.promotion_row() {
                    push_promotions(from, one, moves);
                } else if !tactical_only {
                    moves.push(Move::new(from, one));
                    if from.row() == color.pawn_row() {
                        if let Some(two) = one.offset(dir, 0) {
                            if board.is_empty_square(two) {
                                moves.push(Move::new(from, two));
                            }
                        }
                    }
                }
            }
        }

        let attacks = AttackTables::get().pawn_attacks(color, from);
        for sq in BitboardIterator::new(attacks & enemy) {
            let to = Square::from_index(sq);
            if to.row() == color.promotion_row() {
                push_promotions(from, to, moves);
            } else {
                moves.push(Move::new(from, to));
            }
        }

        // En passant belongs to the side to move only
        if color == board.side_to_move {
            if let Some(ep) = board.en_passant {
                if attacks & ep.bit() != 0 && board.is_empty_square(ep) {
                    moves.push(Move::new(from, ep));
                }
            }
        }
    }

    pub fn legal_moves(&self, board: &Board, color: Color) -> MoveList {
        let mut moves = self.pseudo_legal_moves(board, color, false);
        moves.retain(|mv| !leaves_king_in_check(board, mv, color));
        moves
    }

    /// Legal captures and promotions, the quiescence move set.
    pub fn legal_tactical_moves(&self, board: &Board, color: Color) -> MoveList {
        let mut moves = self.pseudo_legal_moves(board, color, true);
        moves.retain(|mv| !leaves_king_in_check(board, mv, color));
        moves
    }

    /// Checks if `color` has at least one legal move.
    /// Returns `true` as soon as a valid move is found.
    pub fn has_legal_moves(&self, board: &Board, color: Color) -> bool {
        self.pseudo_legal_moves(board, color, false)
            .iter()
            .any(|mv| !leaves_king_in_check(board, mv, color))
    }

    /// Checks a compact move for the side to move, promotion piece included.
    pub fn is_legal(&self, board: &Board, mv: &Move) -> bool {
        let color = board.side_to_move;
        self.pseudo_legal_moves(board, color, false).contains(mv)
            && !leaves_king_in_check(board, mv, color)
    }

    pub fn capturing_moves(&self, board: &Board, color: Color) -> MoveList {
        let mut moves = self.legal_moves(board, color);
        moves.retain(|mv| board.is_capture(mv));
        moves
    }

    pub fn checking_moves(&self, board: &Board, color: Color) -> MoveList {
        let mut moves = self.legal_moves(board, color);
        moves.retain(|mv| is_in_check(&board.with_move(mv), color.opposite()));
        moves
    }

    /// Leaf count of the legal move tree, for verifying generation.
    pub fn perft(&self, board: &Board, depth: u8) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves(board, board.side_to_move);
        if depth == 1 {
            return moves.len() as u64;
        }
        moves
            .iter()
            .map(|mv| self.perft(&board.with_move(mv), depth - 1))
            .sum()
    }
}

fn leaves_king_in_check(board: &Board, mv: &Move, color: Color) -> bool {
    is_in_check(&board.with_move(mv), color)
}

fn push_targets(from: Square, targets: u64, moves: &mut MoveList) {
    for sq in BitboardIterator::new(targets) {
        moves.push(Move::new(from, Square::from_index(sq)));
    }
}

fn push_promotions(from: Square, to: Square, moves: &mut MoveList) {
    for pt in PieceType::PROMOTIONS {
        moves.push(Move::with_promotion(from, to, pt));
    }
}

/// True for a two-file king step from the starting square.
pub fn is_castling_move(board: &Board, mv: &Move) -> bool {
    board.is_castling(mv) && mv.from.col() == KING_START_COL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    #[test]
    fn test_initial_moves() {
        let b = Board::new();
        let generator = MoveGenerator::new();
        assert_eq!(generator.legal_moves(&b, Color::White).len(), 20);
        assert_eq!(generator.legal_moves(&b, Color::Black).len(), 20);
    }

    #[test]
    fn test_has_legal_moves() {
        let generator = MoveGenerator::new();
        assert!(generator.has_legal_moves(&Board::new(), Color::White));
        let mated = board("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert!(!generator.has_legal_moves(&mated, Color::Black));
        assert!(generator.legal_moves(&mated, Color::Black).is_empty());
    }

    #[test]
    fn test_no_generated_move_leaves_king_in_check() {
        let b = board("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let generator = MoveGenerator::new();
        for mv in &generator.legal_moves(&b, Color::White) {
            assert!(!is_in_check(&b.with_move(mv), Color::White), "{mv}");
        }
    }

    #[test]
    fn test_promotions_expand() {
        let b = board("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        let generator = MoveGenerator::new();
        let promos: Vec<Move> = generator
            .legal_moves(&b, Color::White)
            .into_iter()
            .filter(|m| m.promotion.is_some())
            .collect();
        assert_eq!(promos.len(), 4);
        // Quiet promotions count as tactical
        assert_eq!(generator.legal_tactical_moves(&b, Color::White).len(), 4);
    }

    #[test]
    fn test_castling_generated() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let generator = MoveGenerator::new();
        let moves = generator.legal_moves(&b, Color::White);
        let castles: Vec<&Move> = moves.iter().filter(|m| is_castling_move(&b, m)).collect();
        assert_eq!(castles.len(), 2);
    }

    #[test]
    fn test_en_passant_only_for_side_to_move() {
        let b = board("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let generator = MoveGenerator::new();
        let ep = Move::new(
            Square::from_algebraic("e5").unwrap(),
            Square::from_algebraic("d6").unwrap(),
        );
        assert!(generator.legal_moves(&b, Color::White).contains(&ep));
        assert!(generator.is_legal(&b, &ep));
        assert_eq!(generator.capturing_moves(&b, Color::White).len(), 1);
    }

    #[test]
    fn test_checking_moves() {
        let b = board("6k1/8/8/8/8/8/8/R5K1 w - - 0 1");
        let generator = MoveGenerator::new();
        let checks = generator.checking_moves(&b, Color::White);
        // Only the rook lift to the back rank gives check
        assert_eq!(checks.len(), 1);
        assert!(checks.iter().all(|m| m.from == Square::from_algebraic("a1").unwrap()));
        assert!(checks.contains(&Move::new(
            Square::from_algebraic("a1").unwrap(),
            Square::from_algebraic("a8").unwrap()
        )));
    }

    #[test]
    fn test_perft_start_shallow() {
        let generator = MoveGenerator::new();
        let b = Board::new();
        assert_eq!(generator.perft(&b, 1), 20);
        assert_eq!(generator.perft(&b, 2), 400);
    }
}
