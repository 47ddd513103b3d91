use crate::engine::Move;
use crate::logic::board::{Board, CastleSide, Color, Piece, PieceType, Square, KING_START_COL};
use crate::logic::generator::MoveGenerator;
use crate::logic::lookup::AttackTables;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MoveError {
    #[error("square is off the board")]
    OutOfBounds,
    #[error("no piece on the origin square")]
    NoPieceAtSource,
    #[error("that piece belongs to the side not on move")]
    NotYourTurn,
    #[error("the piece cannot move that way")]
    InvalidMovePattern,
    #[error("the path is blocked")]
    BlockedPath,
    #[error("destination holds a friendly piece")]
    TargetOccupiedByFriendly,
    #[error("castling is not allowed")]
    CastlingNotAllowed,
    #[error("invalid promotion piece")]
    InvalidPromotion,
    #[error("move would leave the king in check")]
    SelfCheck,
    #[error("the game is over")]
    GameOver,
}

impl TryFrom<(usize, usize)> for Square {
    type Error = MoveError;

    fn try_from((row, col): (usize, usize)) -> Result<Self, Self::Error> {
        Self::new(row, col).ok_or(MoveError::OutOfBounds)
    }
}

/// Checks if a move is valid for the side to move, including self-check prevention.
pub fn is_valid_move(board: &Board, from: Square, to: Square) -> Result<(), MoveError> {
    // 1. Geometry, path blocking, castling conditions
    let piece = validate_piece_logic(board, from, to)?;

    // 2. Simulate the move and look at our own king
    let next_board = board.with_move(&Move::new(from, to));
    if is_in_check(&next_board, piece.color) {
        return Err(MoveError::SelfCheck);
    }

    Ok(())
}

pub fn is_legal_move(board: &Board, from: Square, to: Square) -> bool {
    is_valid_move(board, from, to).is_ok()
}

/// Checks if `sq` is attacked by any piece of color `by`.
/// The attacker's own king safety is not considered.
pub fn is_square_attacked(board: &Board, sq: Square, by: Color) -> bool {
    let tables = AttackTables::get();
    let occupied = board.all_occupied();

    // A pawn of `by` attacks `sq` from the squares an opposite pawn on `sq` would attack
    if tables.pawn_attacks(by.opposite(), sq) & board.piece_bb(by, PieceType::Pawn) != 0 {
        return true;
    }
    if tables.knight_attacks(sq) & board.piece_bb(by, PieceType::Knight) != 0 {
        return true;
    }
    if tables.king_attacks(sq) & board.piece_bb(by, PieceType::King) != 0 {
        return true;
    }

    let queens = board.piece_bb(by, PieceType::Queen);
    let diagonal = board.piece_bb(by, PieceType::Bishop) | queens;
    if diagonal != 0 && tables.bishop_attacks(sq, occupied) & diagonal != 0 {
        return true;
    }
    let orthogonal = board.piece_bb(by, PieceType::Rook) | queens;
    orthogonal != 0 && tables.rook_attacks(sq, occupied) & orthogonal != 0
}

/// Checks if the `color` is currently in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.king_square(color) {
        Some(king) => is_square_attacked(board, king, color.opposite()),
        None => true, // No king means invalid state (or captured), treat as check
    }
}

pub fn is_checkmate(board: &Board, color: Color) -> bool {
    is_in_check(board, color) && !MoveGenerator::new().has_legal_moves(board, color)
}

pub fn is_stalemate(board: &Board, color: Color) -> bool {
    !is_in_check(board, color) && !MoveGenerator::new().has_legal_moves(board, color)
}

/// A side with a pawn, rook or queen, or with two or more minor pieces.
pub fn has_mating_material(board: &Board, color: Color) -> bool {
    let heavy = board.piece_bb(color, PieceType::Pawn)
        | board.piece_bb(color, PieceType::Rook)
        | board.piece_bb(color, PieceType::Queen);
    let minors =
        board.piece_bb(color, PieceType::Knight) | board.piece_bb(color, PieceType::Bishop);
    heavy != 0 || minors.count_ones() > 1
}

/// Neither side can ever deliver mate.
pub fn has_insufficient_material(board: &Board) -> bool {
    !has_mating_material(board, Color::White) && !has_mating_material(board, Color::Black)
}

/// Castling pre-conditions for `color` on `side`, with the king simulated on
/// every square it crosses.
pub fn can_castle(board: &Board, color: Color, side: CastleSide) -> bool {
    if !board.castling.has(color, side) {
        return false;
    }
    let row = color.home_row();
    let (Some(king_sq), Some(rook_sq)) = (
        Square::new(row, KING_START_COL),
        Square::new(row, side.rook_col()),
    ) else {
        return false;
    };

    let king_ok = board
        .get_piece(king_sq)
        .is_some_and(|p| p.piece_type == PieceType::King && p.color == color && !p.has_moved);
    let rook_ok = board
        .get_piece(rook_sq)
        .is_some_and(|p| p.piece_type == PieceType::Rook && p.color == color && !p.has_moved);
    if !king_ok || !rook_ok {
        return false;
    }

    if AttackTables::get().between(king_sq, rook_sq) & board.all_occupied() != 0 {
        return false;
    }

    if is_in_check(board, color) {
        return false;
    }

    // Transit and landing squares
    let target_col = side.king_target_col();
    let cols: [usize; 2] = if target_col > KING_START_COL {
        [KING_START_COL + 1, target_col]
    } else {
        [KING_START_COL - 1, target_col]
    };
    for col in cols {
        let Some(transit) = Square::new(row, col) else {
            return false;
        };
        let mut sim = *board;
        if let Some(mut king) = sim.remove_piece(king_sq) {
            king.square = transit;
            sim.put_piece(king);
        }
        if is_in_check(&sim, color) {
            return false;
        }
    }

    true
}

/// Validates the geometry and specific rules for a piece move, IGNORING self-check.
fn validate_piece_logic(board: &Board, from: Square, to: Square) -> Result<Piece, MoveError> {
    if !from.is_on_board() || !to.is_on_board() {
        return Err(MoveError::OutOfBounds);
    }

    let piece = board.get_piece(from).ok_or(MoveError::NoPieceAtSource)?;

    if piece.color != board.side_to_move {
        return Err(MoveError::NotYourTurn);
    }

    if from == to {
        return Err(MoveError::InvalidMovePattern);
    }

    if let Some(target) = board.get_piece(to) {
        if target.color == piece.color {
            return Err(MoveError::TargetOccupiedByFriendly);
        }
    }

    let d_row = to.row.abs_diff(from.row);
    let d_col = to.col.abs_diff(from.col);

    match piece.piece_type {
        PieceType::Pawn => validate_pawn(board, piece.color, from, to, d_col),
        PieceType::Knight => validate_knight(from, to),
        PieceType::Bishop => validate_bishop(board, from, to, d_row, d_col),
        PieceType::Rook => validate_rook(board, from, to, d_row, d_col),
        PieceType::Queen => validate_queen(board, from, to, d_row, d_col),
        PieceType::King => validate_king(board, piece.color, from, to, d_row, d_col),
    }?;

    Ok(piece)
}

fn validate_pawn(
    board: &Board,
    color: Color,
    from: Square,
    to: Square,
    d_col: u8,
) -> Result<(), MoveError> {
    let step = i32::from(to.row) - i32::from(from.row);
    let dir = color.forward();

    if d_col == 0 {
        if step == dir {
            return if board.is_empty_square(to) {
                Ok(())
            } else {
                Err(MoveError::BlockedPath)
            };
        }
        if step == 2 * dir && from.row() == color.pawn_row() {
            let middle = from.offset(dir, 0).ok_or(MoveError::OutOfBounds)?;
            return if board.is_empty_square(middle) && board.is_empty_square(to) {
                Ok(())
            } else {
                Err(MoveError::BlockedPath)
            };
        }
        return Err(MoveError::InvalidMovePattern);
    }

    if d_col == 1 && step == dir {
        // Friendly targets were rejected earlier
        if board.get_piece(to).is_some() || board.en_passant == Some(to) {
            return Ok(());
        }
    }
    Err(MoveError::InvalidMovePattern)
}

fn validate_knight(from: Square, to: Square) -> Result<(), MoveError> {
    if AttackTables::get().knight_attacks(from) & to.bit() == 0 {
        return Err(MoveError::InvalidMovePattern);
    }
    Ok(())
}

fn validate_bishop(
    board: &Board,
    from: Square,
    to: Square,
    d_row: u8,
    d_col: u8,
) -> Result<(), MoveError> {
    if d_row != d_col {
        return Err(MoveError::InvalidMovePattern);
    }
    check_clear_path(board, from, to)
}

fn validate_rook(
    board: &Board,
    from: Square,
    to: Square,
    d_row: u8,
    d_col: u8,
) -> Result<(), MoveError> {
    if d_row != 0 && d_col != 0 {
        return Err(MoveError::InvalidMovePattern);
    }
    check_clear_path(board, from, to)
}

fn validate_queen(
    board: &Board,
    from: Square,
    to: Square,
    d_row: u8,
    d_col: u8,
) -> Result<(), MoveError> {
    if d_row != d_col && d_row != 0 && d_col != 0 {
        return Err(MoveError::InvalidMovePattern);
    }
    check_clear_path(board, from, to)
}

fn validate_king(
    board: &Board,
    color: Color,
    from: Square,
    to: Square,
    d_row: u8,
    d_col: u8,
) -> Result<(), MoveError> {
    if d_row <= 1 && d_col <= 1 {
        return Ok(());
    }
    if d_row == 0 && d_col == 2 && from.row() == color.home_row() && from.col() == KING_START_COL {
        let side = CastleSide::from_king_target(to.col()).ok_or(MoveError::InvalidMovePattern)?;
        if can_castle(board, color, side) {
            return Ok(());
        }
        return Err(MoveError::CastlingNotAllowed);
    }
    Err(MoveError::InvalidMovePattern)
}

fn check_clear_path(board: &Board, from: Square, to: Square) -> Result<(), MoveError> {
    if AttackTables::get().between(from, to) & board.all_occupied() != 0 {
        return Err(MoveError::BlockedPath);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    #[test]
    fn test_pawn_moves() {
        let b = Board::new();
        assert!(is_valid_move(&b, sq("e2"), sq("e4")).is_ok());
        assert!(is_valid_move(&b, sq("e2"), sq("e3")).is_ok());
        assert_eq!(
            is_valid_move(&b, sq("e2"), sq("e5")),
            Err(MoveError::InvalidMovePattern)
        );
        assert_eq!(
            is_valid_move(&b, sq("e2"), sq("d3")),
            Err(MoveError::InvalidMovePattern)
        );
        assert_eq!(
            is_valid_move(&b, sq("e7"), sq("e5")),
            Err(MoveError::NotYourTurn)
        );
        assert_eq!(
            is_valid_move(&b, sq("e4"), sq("e5")),
            Err(MoveError::NoPieceAtSource)
        );
    }

    #[test]
    fn test_pawn_blocked_double_push() {
        let b = board("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1");
        assert_eq!(
            is_valid_move(&b, sq("e2"), sq("e4")),
            Err(MoveError::BlockedPath)
        );
    }

    #[test]
    fn test_sliders_blocked() {
        let b = Board::new();
        assert_eq!(
            is_valid_move(&b, sq("a1"), sq("a3")),
            Err(MoveError::BlockedPath)
        );
        assert_eq!(
            is_valid_move(&b, sq("c1"), sq("e3")),
            Err(MoveError::BlockedPath)
        );
        assert_eq!(
            is_valid_move(&b, sq("d1"), sq("d2")),
            Err(MoveError::TargetOccupiedByFriendly)
        );
        assert!(is_valid_move(&b, sq("g1"), sq("f3")).is_ok());
        assert_eq!(
            is_valid_move(&b, sq("g1"), sq("g3")),
            Err(MoveError::InvalidMovePattern)
        );
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        // Knight on e2 pinned by the rook on e8
        let b = board("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert_eq!(
            is_valid_move(&b, sq("e2"), sq("c3")),
            Err(MoveError::SelfCheck)
        );
    }

    #[test]
    fn test_castling_conditions() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(is_valid_move(&b, sq("e1"), sq("g1")).is_ok());
        assert!(is_valid_move(&b, sq("e1"), sq("c1")).is_ok());

        // f1 attacked by the rook on f8
        let b = board("r4rk1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert_eq!(
            is_valid_move(&b, sq("e1"), sq("g1")),
            Err(MoveError::CastlingNotAllowed)
        );
        assert!(is_valid_move(&b, sq("e1"), sq("c1")).is_ok());

        // Rights already gone
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w Qkq - 0 1");
        assert_eq!(
            is_valid_move(&b, sq("e1"), sq("g1")),
            Err(MoveError::CastlingNotAllowed)
        );

        // In check
        let b = board("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1");
        assert!(!can_castle(&b, Color::White, CastleSide::KingSide));
    }

    #[test]
    fn test_queen_side_b_file_attack_does_not_block() {
        // Only the squares the king crosses matter; b1 may be attacked
        let b = board("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(can_castle(&b, Color::White, CastleSide::QueenSide));
    }

    #[test]
    fn test_en_passant_validation() {
        let b = board("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        assert!(is_valid_move(&b, sq("e5"), sq("d6")).is_ok());
        let b = board("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 2");
        assert_eq!(
            is_valid_move(&b, sq("e5"), sq("d6")),
            Err(MoveError::InvalidMovePattern)
        );
    }

    #[test]
    fn test_check_detection() {
        let b = board("4k3/8/8/8/8/8/8/4K2r w - - 0 1");
        assert!(is_in_check(&b, Color::White));
        assert!(!is_in_check(&b, Color::Black));

        let b = board("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1");
        assert!(is_in_check(&b, Color::White));

        let b = board("4k3/8/8/8/8/8/4p3/4K3 w - - 0 1");
        assert!(!is_in_check(&b, Color::White));
    }

    #[test]
    fn test_back_rank_mate() {
        let b = board("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert!(is_checkmate(&b, Color::Black));
        assert!(!is_stalemate(&b, Color::Black));
    }

    #[test]
    fn test_stalemate() {
        let b = board("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(is_stalemate(&b, Color::Black));
        assert!(!is_checkmate(&b, Color::Black));
    }

    #[test]
    fn test_insufficient_material() {
        assert!(has_insufficient_material(&board("4k3/8/8/8/8/8/8/4K3 w - - 0 1")));
        assert!(has_insufficient_material(&board("4k3/8/8/2b5/8/8/8/4KN2 w - - 0 1")));
        assert!(!has_insufficient_material(&board("4k3/8/8/8/8/8/8/3BKN2 w - - 0 1")));
        assert!(!has_insufficient_material(&board("4k3/8/8/8/8/8/P7/4K3 w - - 0 1")));
    }

    #[test]
    fn test_square_try_from() {
        assert_eq!(Square::try_from((6, 4)), Ok(sq("e2")));
        assert_eq!(Square::try_from((8, 0)), Err(MoveError::OutOfBounds));
    }

    #[test]
    fn test_off_board_squares_are_rejected() {
        let b = Board::new();
        let off = Square { row: 8, col: 0 };
        assert_eq!(is_valid_move(&b, sq("a2"), off), Err(MoveError::OutOfBounds));
        assert_eq!(is_valid_move(&b, off, sq("a3")), Err(MoveError::OutOfBounds));
        assert!(!is_legal_move(&b, sq("g1"), Square { row: 200, col: 200 }));
        assert!(!is_square_attacked(&b, off, Color::White));

        let parsed: Result<Square, _> = serde_json::from_str(r#"{"row":8,"col":0}"#);
        assert!(parsed.is_err());
        let parsed: Square = serde_json::from_str(r#"{"row":7,"col":0}"#).unwrap();
        assert_eq!(parsed, sq("a1"));
    }
}
