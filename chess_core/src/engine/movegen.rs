use crate::engine::config::EngineConfig;
use crate::engine::move_list::MoveList;
use crate::engine::Move;
use crate::logic::board::{Board, PieceType, Square};
use crate::logic::generator::MoveGenerator;

/// Legal move generation with ordering scores for the search.
pub struct EngineMoveGen<'a> {
    config: &'a EngineConfig,
    generator: MoveGenerator,
}

impl<'a> EngineMoveGen<'a> {
    pub const fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            generator: MoveGenerator::new(),
        }
    }

    /// All legal moves for the side to move, best candidates first.
    pub fn generate_moves(&self, board: &Board, best_move: Option<Move>) -> MoveList {
        let moves = self.generator.legal_moves(board, board.side_to_move);
        self.order(board, moves, best_move)
    }

    /// Legal captures and promotions, best candidates first.
    pub fn generate_captures(&self, board: &Board) -> MoveList {
        let moves = self.generator.legal_tactical_moves(board, board.side_to_move);
        self.order(board, moves, None)
    }

    fn order(&self, board: &Board, mut moves: MoveList, best_move: Option<Move>) -> MoveList {
        for mv in moves.iter_mut() {
            mv.score = self.score_move(board, mv, best_move);
        }
        // Stable: ties keep generation order
        moves.sort_by(|a, b| b.score.cmp(&a.score));
        moves
    }

    pub fn score_move(&self, board: &Board, mv: &Move, best_move: Option<Move>) -> i32 {
        if best_move == Some(*mv) {
            return self.config.score_hash_move;
        }
        let Some(piece) = board.get_piece(mv.from) else {
            return 0;
        };

        let mut score = 0;

        // MVV-LVA
        if let Some(victim) = board.captured_piece(mv) {
            score += self.config.score_capture_base + self.config.piece_value(victim.piece_type)
                - self.config.piece_value(piece.piece_type);
        }

        if let Some(promotion) = mv.promotion {
            score += self.config.score_promotion + self.config.piece_value(promotion);
        }

        if board.is_castling(mv) {
            score += self.config.score_castling;
        }

        score += self.config.score_center * (7 - center_distance(mv.to));

        if matches!(piece.piece_type, PieceType::Knight | PieceType::Bishop)
            && mv.from.row() == piece.color.home_row()
        {
            score += self.config.score_development;
        }

        score
    }
}

/// Manhattan distance to the four centre squares, 1 for d4/e4/d5/e5 up to 7 in a corner.
fn center_distance(sq: Square) -> i32 {
    let row = i32::from(sq.row);
    let col = i32::from(sq.col);
    ((2 * row - 7).abs() + (2 * col - 7).abs()) / 2
}
