use crate::clock::epoch_ms;
use crate::engine::Move;
use crate::logic::board::{Board, Color, FenError, Piece, PieceType, Square};
use crate::logic::generator::{is_castling_move, MoveGenerator};
use crate::logic::notation::{export_move_list, san_with_moves};
use crate::logic::rules::{self, has_insufficient_material, has_mating_material, MoveError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Checkmate,
    Stalemate,
    Draw,
    Timeout,
    Resignation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub status: GameStatus,
    pub winner: Option<Color>,
    pub reason: String,
    pub final_position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    /// The mover as it stood before the move.
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promotion: Option<PieceType>,
    pub is_castling: bool,
    pub is_en_passant: bool,
    pub notation: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub player: String,
}

impl MoveRecord {
    fn describe(board: &Board, mv: &Move, legal: &[Move], player: &str) -> Option<Self> {
        let piece = board.get_piece(mv.from)?;
        Some(Self {
            from: mv.from,
            to: mv.to,
            piece,
            captured: board.captured_piece(mv),
            promotion: mv.promotion,
            is_castling: is_castling_move(board, mv),
            is_en_passant: board.is_en_passant(mv),
            notation: san_with_moves(board, mv, legal),
            timestamp: epoch_ms(),
            player: player.to_string(),
        })
    }

    pub const fn to_move(&self) -> Move {
        Move {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
            score: 0,
        }
    }
}

/// Immutable game snapshot. Every successful move produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Position {
    pub id: String,
    pub white_label: String,
    pub black_label: String,
    pub board: Board,
    pub history: Vec<MoveRecord>,
    pub status: GameStatus,
    pub in_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    pub is_draw: bool,
    pub is_game_over: bool,
    pub winner: Option<Color>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new_game("local", "white", "black")
    }
}

/// Standard setup, white to move.
pub fn create_initial_position(id: &str, white_label: &str, black_label: &str) -> Position {
    Position::new_game(id, white_label, black_label)
}

impl Position {
    #[must_use]
    pub fn new_game(id: &str, white_label: &str, black_label: &str) -> Self {
        Self::from_board(Board::new(), id, white_label, black_label)
    }

    /// Wraps an arbitrary board with freshly computed status flags.
    #[must_use]
    pub fn from_board(board: Board, id: &str, white_label: &str, black_label: &str) -> Self {
        let mut position = Self {
            id: id.to_string(),
            white_label: white_label.to_string(),
            black_label: black_label.to_string(),
            board,
            history: Vec::new(),
            status: GameStatus::Playing,
            in_check: false,
            is_checkmate: false,
            is_stalemate: false,
            is_draw: false,
            is_game_over: false,
            winner: None,
        };
        position.update_status();
        position
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_board(Board::from_fen(fen)?, "fen", "white", "black"))
    }

    pub fn fen(&self) -> String {
        self.board.to_fen_string()
    }

    pub const fn side_to_move(&self) -> Color {
        self.board.side_to_move
    }

    pub fn label(&self, color: Color) -> &str {
        match color {
            Color::White => &self.white_label,
            Color::Black => &self.black_label,
        }
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    pub fn validate_move(&self, from: Square, to: Square) -> Result<(), MoveError> {
        if self.is_game_over {
            return Err(MoveError::GameOver);
        }
        rules::is_valid_move(&self.board, from, to)
    }

    pub fn is_legal_move(&self, from: Square, to: Square) -> bool {
        self.validate_move(from, to).is_ok()
    }

    /// Validates and plays `from -> to`. A pawn reaching the last rank becomes a queen.
    pub fn apply_move(&self, from: Square, to: Square) -> Result<Self, MoveError> {
        self.play(Move::new(from, to))
    }

    pub fn apply_move_with_promotion(
        &self,
        from: Square,
        to: Square,
        promotion: PieceType,
    ) -> Result<Self, MoveError> {
        if !promotion.is_promotion_target() {
            return Err(MoveError::InvalidPromotion);
        }
        self.play(Move::with_promotion(from, to, promotion))
    }

    /// Plays a compact move, e.g. one returned by the search.
    pub fn apply(&self, mv: &Move) -> Result<Self, MoveError> {
        match mv.promotion {
            Some(pt) => self.apply_move_with_promotion(mv.from, mv.to, pt),
            None => self.apply_move(mv.from, mv.to),
        }
    }

    fn play(&self, mv: Move) -> Result<Self, MoveError> {
        self.validate_move(mv.from, mv.to)?;

        let piece = self
            .board
            .get_piece(mv.from)
            .ok_or(MoveError::NoPieceAtSource)?;
        let promotes =
            piece.piece_type == PieceType::Pawn && mv.to.row() == piece.color.promotion_row();
        let mv = match (promotes, mv.promotion) {
            (true, None) => Move::with_promotion(mv.from, mv.to, PieceType::Queen),
            (false, Some(_)) => return Err(MoveError::InvalidPromotion),
            _ => mv,
        };

        let legal = MoveGenerator::new().legal_moves(&self.board, piece.color);
        let record =
            MoveRecord::describe(&self.board, &mv, legal.as_slice(), self.label(piece.color))
                .ok_or(MoveError::NoPieceAtSource)?;

        let mut next = self.clone();
        next.board.apply_move(&mv);
        next.history.push(record);
        next.update_status();

        if next.is_game_over {
            log::info!(
                "game {} ended after {}: {:?}, winner {:?}",
                next.id,
                mv,
                next.status,
                next.winner
            );
        }
        Ok(next)
    }

    /// Recomputes the cached flags for the side now to move.
    fn update_status(&mut self) {
        let color = self.board.side_to_move;
        let in_check = rules::is_in_check(&self.board, color);
        let has_moves = MoveGenerator::new().has_legal_moves(&self.board, color);

        self.in_check = in_check;
        self.is_checkmate = in_check && !has_moves;
        self.is_stalemate = !in_check && !has_moves;
        self.is_draw = self.is_stalemate || has_insufficient_material(&self.board);
        self.is_game_over = self.is_checkmate || self.is_draw;
        self.winner = self.is_checkmate.then(|| color.opposite());
        self.status = if self.is_checkmate {
            GameStatus::Checkmate
        } else if self.is_stalemate {
            GameStatus::Stalemate
        } else if self.is_draw {
            GameStatus::Draw
        } else {
            GameStatus::Playing
        };
    }

    pub fn is_king_in_check(&self, color: Color) -> bool {
        rules::is_in_check(&self.board, color)
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        rules::is_checkmate(&self.board, color)
    }

    pub fn is_stalemate(&self, color: Color) -> bool {
        rules::is_stalemate(&self.board, color)
    }

    fn records(&self, color: Color, moves: &[Move], legal: &[Move]) -> Vec<MoveRecord> {
        let player = self.label(color);
        moves
            .iter()
            .filter_map(|mv| MoveRecord::describe(&self.board, mv, legal, player))
            .collect()
    }

    /// Every legal move for `color` (default: side to move) as full records.
    pub fn all_legal_moves(&self, color: Option<Color>) -> Vec<MoveRecord> {
        let color = color.unwrap_or(self.board.side_to_move);
        let legal = MoveGenerator::new().legal_moves(&self.board, color);
        self.records(color, legal.as_slice(), legal.as_slice())
    }

    pub fn capturing_moves(&self, color: Color) -> Vec<MoveRecord> {
        let generator = MoveGenerator::new();
        let legal = generator.legal_moves(&self.board, color);
        let captures = generator.capturing_moves(&self.board, color);
        self.records(color, captures.as_slice(), legal.as_slice())
    }

    pub fn checking_moves(&self, color: Color) -> Vec<MoveRecord> {
        let generator = MoveGenerator::new();
        let legal = generator.legal_moves(&self.board, color);
        let checks = generator.checking_moves(&self.board, color);
        self.records(color, checks.as_slice(), legal.as_slice())
    }

    /// The terminal result, if the board itself ended the game.
    pub fn result(&self) -> Option<GameResult> {
        if !self.is_game_over {
            return None;
        }
        let reason = match self.status {
            GameStatus::Checkmate => {
                let winner = self.winner.unwrap_or(self.board.side_to_move.opposite());
                format!("{} wins by checkmate", self.label(winner))
            }
            GameStatus::Stalemate => "draw by stalemate".to_string(),
            _ => "draw by insufficient material".to_string(),
        };
        Some(GameResult {
            status: self.status,
            winner: self.winner,
            reason,
            final_position: self.clone(),
        })
    }

    pub fn resign(&self, color: Color) -> GameResult {
        let winner = color.opposite();
        log::info!("game {}: {} resigned", self.id, self.label(color));
        let final_position = self.finished(GameStatus::Resignation, Some(winner));
        GameResult {
            status: GameStatus::Resignation,
            winner: Some(winner),
            reason: format!("{} resigned", self.label(color)),
            final_position,
        }
    }

    /// `color` ran out of time. The opponent wins unless it cannot mate at all.
    pub fn timeout(&self, color: Color) -> GameResult {
        let opponent = color.opposite();
        let winner = has_mating_material(&self.board, opponent).then_some(opponent);
        let reason = match winner {
            Some(_) => format!("{} lost on time", self.label(color)),
            None => format!(
                "{} lost on time, draw by insufficient material",
                self.label(color)
            ),
        };
        log::info!("game {}: {}", self.id, reason);
        let final_position = self.finished(GameStatus::Timeout, winner);
        GameResult {
            status: GameStatus::Timeout,
            winner,
            reason,
            final_position,
        }
    }

    fn finished(&self, status: GameStatus, winner: Option<Color>) -> Self {
        let mut position = self.clone();
        position.status = status;
        position.winner = winner;
        position.is_game_over = true;
        position.is_draw = winner.is_none();
        position
    }

    /// The history as `1. e4 e5 2. Nf3`.
    pub fn notation(&self) -> String {
        export_move_list(&self.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_initial_position() {
        let pos = create_initial_position("g1", "alice", "bob");
        assert_eq!(pos.side_to_move(), Color::White);
        assert!(pos.history.is_empty());
        assert_eq!(pos.status, GameStatus::Playing);
        assert_eq!(pos.all_legal_moves(None).len(), 20);
        assert!(pos.board.castling.white_king_side && pos.board.castling.black_queen_side);
    }

    #[test]
    fn test_apply_move_returns_new_position() {
        let pos = Position::new_game("g1", "alice", "bob");
        let next = pos.apply_move(sq("e2"), sq("e3")).unwrap();

        // Caller's position untouched
        assert!(pos.board.get_piece(sq("e2")).is_some());
        assert!(next.board.get_piece(sq("e2")).is_none());
        let pawn = next.board.get_piece(sq("e3")).unwrap();
        assert_eq!(pawn.piece_type, PieceType::Pawn);
        assert!(pawn.has_moved);
        assert_eq!(next.side_to_move(), Color::Black);

        let record = next.last_move().unwrap();
        assert_eq!(record.notation, "e3");
        assert_eq!(record.player, "alice");
        assert!(!record.piece.has_moved);
    }

    #[test]
    fn test_illegal_move_is_rejected() {
        let pos = Position::new_game("g1", "alice", "bob");
        assert_eq!(
            pos.apply_move(sq("e2"), sq("e5")),
            Err(MoveError::InvalidMovePattern)
        );
        assert!(!pos.is_legal_move(sq("e7"), sq("e5")));
    }

    #[test]
    fn test_off_board_destination_is_not_legal() {
        let pos = Position::new_game("g1", "alice", "bob");
        let off = Square { row: 8, col: 0 };
        assert!(!pos.is_legal_move(sq("a1"), off));
        assert!(!pos.is_legal_move(sq("b1"), Square { row: 5, col: 9 }));
        assert_eq!(pos.apply_move(sq("a2"), off), Err(MoveError::OutOfBounds));

        let wire = |to_row: u8| {
            serde_json::json!({
                "from": {"row": 6, "col": 0},
                "to": {"row": to_row, "col": 0},
                "promotion": null,
                "score": 0
            })
        };
        assert!(serde_json::from_value::<Move>(wire(8)).is_err());
        let ok = serde_json::from_value::<Move>(wire(5)).unwrap();
        assert!(pos.apply(&ok).is_ok());
    }

    #[test]
    fn test_castling_rights_lifecycle() {
        let pos = Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        // Unrelated move keeps every right
        let pos = pos.apply_move(sq("a2"), sq("a3")).unwrap();
        assert_eq!(pos.board.castling, crate::logic::board::CastlingRights::ALL);
        let pos = pos.apply_move(sq("a7"), sq("a6")).unwrap();

        // King step forfeits both white rights
        let pos = pos.apply_move(sq("e1"), sq("d1")).unwrap();
        assert!(!pos.board.castling.white_king_side);
        assert!(!pos.board.castling.white_queen_side);
        assert!(pos.board.castling.black_king_side);
    }

    #[test]
    fn test_castling_moves_rook() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let next = pos.apply_move(sq("e1"), sq("g1")).unwrap();
        assert_eq!(next.board.get_piece(sq("f1")).unwrap().piece_type, PieceType::Rook);
        assert!(next.board.get_piece(sq("h1")).is_none());
        let record = next.last_move().unwrap();
        assert!(record.is_castling);
        assert_eq!(record.notation, "O-O");
    }

    #[test]
    fn test_capturing_corner_rook_revokes_right() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let next = pos.apply_move(sq("h1"), sq("h8")).unwrap();
        assert!(!next.board.castling.black_king_side);
        assert!(!next.board.castling.white_king_side);
        assert!(next.board.castling.black_queen_side);
    }

    #[test]
    fn test_en_passant_capture() {
        let pos = Position::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
        let pos = pos.apply_move(sq("d7"), sq("d5")).unwrap();
        assert_eq!(pos.board.en_passant, Some(sq("d6")));

        let next = pos.apply_move(sq("e5"), sq("d6")).unwrap();
        assert!(next.board.get_piece(sq("d5")).is_none());
        let record = next.last_move().unwrap();
        assert!(record.is_en_passant);
        assert_eq!(record.captured.unwrap().square, sq("d5"));
        assert_eq!(record.notation, "exd6");
    }

    #[test]
    fn test_promotion() {
        let pos = Position::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let queen = pos.apply_move(sq("a7"), sq("a8")).unwrap();
        assert_eq!(queen.board.get_piece(sq("a8")).unwrap().piece_type, PieceType::Queen);
        assert_eq!(queen.last_move().unwrap().notation, "a8=Q");

        let knight = pos
            .apply_move_with_promotion(sq("a7"), sq("a8"), PieceType::Knight)
            .unwrap();
        assert_eq!(knight.board.get_piece(sq("a8")).unwrap().piece_type, PieceType::Knight);

        assert_eq!(
            pos.apply_move_with_promotion(sq("a7"), sq("a8"), PieceType::King),
            Err(MoveError::InvalidPromotion)
        );
        assert_eq!(
            pos.apply_move_with_promotion(sq("a1"), sq("a2"), PieceType::Queen),
            Err(MoveError::InvalidPromotion)
        );
    }

    #[test]
    fn test_checkmate_flags() {
        // White rook lift to the back rank
        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let mated = pos.apply_move(sq("a1"), sq("a8")).unwrap();
        assert!(mated.in_check);
        assert!(mated.is_checkmate);
        assert!(mated.is_game_over);
        assert_eq!(mated.winner, Some(Color::White));
        assert!(mated.is_checkmate(Color::Black));
        assert!(mated.is_king_in_check(Color::Black));
        assert!(!mated.is_king_in_check(Color::White));
        assert_eq!(mated.last_move().unwrap().to_move().to_string(), "a1a8");
        assert!(mated.all_legal_moves(None).is_empty());
        assert_eq!(
            mated.apply_move(sq("g8"), sq("h8")),
            Err(MoveError::GameOver)
        );

        let result = mated.result().unwrap();
        assert_eq!(result.status, GameStatus::Checkmate);
        assert_eq!(result.reason, "white wins by checkmate");
    }

    #[test]
    fn test_stalemate_flags() {
        let pos = Position::from_fen("7k/8/6K1/8/8/8/8/5Q2 w - - 0 1").unwrap();
        let stale = pos.apply_move(sq("f1"), sq("f7")).unwrap();
        assert!(stale.is_stalemate);
        assert!(!stale.is_checkmate);
        assert!(stale.is_draw);
        assert_eq!(stale.winner, None);
        assert!(stale.is_stalemate(Color::Black));
    }

    #[test]
    fn test_insufficient_material_draw() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1").unwrap();
        let next = pos.apply_move(sq("e1"), sq("d2")).unwrap();
        assert!(next.is_draw);
        assert_eq!(next.status, GameStatus::Draw);
    }

    #[test]
    fn test_resign_and_timeout() {
        let pos = Position::new_game("g1", "alice", "bob");
        let result = pos.resign(Color::White);
        assert_eq!(result.winner, Some(Color::Black));
        assert_eq!(result.status, GameStatus::Resignation);
        assert!(result.final_position.is_game_over);

        let result = pos.timeout(Color::Black);
        assert_eq!(result.winner, Some(Color::White));

        let bare = Position::from_fen("4k3/8/8/8/8/8/8/4KN2 w - - 0 1").unwrap();
        let result = bare.timeout(Color::Black);
        assert_eq!(result.winner, None);
        assert!(result.final_position.is_draw);
    }

    #[test]
    fn test_move_record_lists() {
        let pos = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let captures = pos.capturing_moves(Color::White);
        assert_eq!(captures.len(), 1);
        let capture = captures.first().unwrap();
        assert_eq!(capture.notation, "exd5");
        assert_eq!(capture.captured.unwrap().piece_type, PieceType::Pawn);

        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let checks = pos.checking_moves(Color::White);
        assert!(checks.iter().any(|r| r.notation == "Ra8"));
        assert!(checks.iter().all(|r| r.piece.piece_type == PieceType::Rook));
    }

    #[test]
    fn test_serde_round_trip_keeps_snapshot() {
        let pos = Position::new_game("g1", "alice", "bob")
            .apply_move(sq("e2"), sq("e4"))
            .unwrap();
        let json = serde_json::to_string(&pos).unwrap();
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pos);
    }
}
