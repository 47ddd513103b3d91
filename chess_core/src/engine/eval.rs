use crate::engine::config::EngineConfig;
use crate::engine::Evaluator;
use crate::logic::board::{BitboardIterator, Bitboard, Board, Color, PieceType, Square};
use crate::logic::eval_constants::get_pst_value;
use crate::logic::lookup::AttackTables;
use std::sync::Arc;

const FILE_A: Bitboard = 0x0101_0101_0101_0101;
// d4, e4, d5, e5
const CENTER: Bitboard = (1 << 27) | (1 << 28) | (1 << 35) | (1 << 36);

pub struct SimpleEvaluator {
    config: Arc<EngineConfig>,
}

impl SimpleEvaluator {
    pub const fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    /// Non-pawn, non-king material of both sides.
    fn phase_material(&self, board: &Board) -> i32 {
        let mut total = 0;
        for color in [Color::White, Color::Black] {
            for pt in [
                PieceType::Knight,
                PieceType::Bishop,
                PieceType::Rook,
                PieceType::Queen,
            ] {
                #[allow(clippy::cast_possible_wrap)]
                let count = board.piece_bb(color, pt).count_ones() as i32;
                total += count * self.config.piece_value(pt);
            }
        }
        total
    }

    pub fn is_endgame(&self, board: &Board) -> bool {
        self.phase_material(board) < self.config.endgame_threshold
    }

    fn material_and_pst(&self, board: &Board, color: Color, endgame: bool) -> i32 {
        board
            .pieces(color)
            .map(|p| {
                self.config.piece_value(p.piece_type)
                    + get_pst_value(p.piece_type, color, p.square, endgame)
            })
            .sum()
    }

    fn king_safety(&self, board: &Board, color: Color, endgame: bool) -> i32 {
        let mut score = 0;
        if board.castling.any(color) {
            score += self.config.castling_rights_bonus;
        }

        let Some(king) = board.king_square(color) else {
            return score;
        };

        let around = AttackTables::get().king_attacks(king);
        #[allow(clippy::cast_possible_wrap)]
        let shield = (around & board.color_bb(color)).count_ones() as i32;
        #[allow(clippy::cast_possible_wrap)]
        let exposed = (around & !board.color_bb(color)).count_ones() as i32;
        score += shield * self.config.king_shield_bonus;
        score -= exposed * self.config.king_exposure_penalty;

        if endgame {
            // 3 on the four centre squares down to 0 on the rim
            let row = i32::from(king.row);
            let col = i32::from(king.col);
            let ring = (2 * row - 7).abs().max((2 * col - 7).abs()) / 2;
            score += (3 - ring) * self.config.king_centrality_bonus;
        }
        score
    }

    fn pawn_structure(&self, board: &Board, color: Color) -> i32 {
        let own = board.piece_bb(color, PieceType::Pawn);
        let enemy = board.piece_bb(color.opposite(), PieceType::Pawn);
        let mut score = 0;

        for file in 0..8 {
            let count = (own & (FILE_A << file)).count_ones();
            if count > 1 {
                #[allow(clippy::cast_possible_wrap)]
                let extra = (count - 1) as i32;
                score -= extra * self.config.doubled_pawn_penalty;
            }
        }

        for idx in BitboardIterator::new(own) {
            let sq = Square::from_index(idx);
            let neighbours = adjacent_files(sq.col());
            if own & neighbours == 0 {
                score -= self.config.isolated_pawn_penalty;
            }
            let span = (neighbours | (FILE_A << sq.col())) & rows_ahead(color, sq.row());
            if enemy & span == 0 {
                score += self.config.passed_pawn_bonus;
            }
        }

        score
    }

    fn center_control(&self, board: &Board, color: Color) -> i32 {
        #[allow(clippy::cast_possible_wrap)]
        let occupied = (board.color_bb(color) & CENTER).count_ones() as i32;
        occupied * self.config.center_bonus
    }

    fn side_score(&self, board: &Board, color: Color, endgame: bool) -> i32 {
        self.material_and_pst(board, color, endgame)
            + self.king_safety(board, color, endgame)
            + self.pawn_structure(board, color)
            + self.center_control(board, color)
    }
}

impl Evaluator for SimpleEvaluator {
    /// Centipawns from white's point of view.
    fn evaluate(&self, board: &Board) -> i32 {
        let endgame = self.is_endgame(board);
        self.side_score(board, Color::White, endgame)
            - self.side_score(board, Color::Black, endgame)
    }
}

fn adjacent_files(col: usize) -> Bitboard {
    let mut mask = 0;
    if col > 0 {
        mask |= FILE_A << (col - 1);
    }
    if col < 7 {
        mask |= FILE_A << (col + 1);
    }
    mask
}

/// Every square on rows strictly in front of `row` from `color`'s side.
fn rows_ahead(color: Color, row: usize) -> Bitboard {
    match color {
        // White advances towards row 0, the low bits
        Color::White => (1u64 << (row * 8)) - 1,
        Color::Black => {
            if row >= 7 {
                0
            } else {
                !((1u64 << ((row + 1) * 8)) - 1)
            }
        }
    }
}
