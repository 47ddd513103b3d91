use crate::engine::Move;
use crate::logic::rules::MoveError;
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::fmt;
use thiserror::Error;

pub type Bitboard = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }

    /// Row delta of a single pawn step. White advances towards row 0 (rank 8).
    pub const fn forward(self) -> i32 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    pub const fn home_row(self) -> usize {
        match self {
            Self::White => 7,
            Self::Black => 0,
        }
    }

    pub const fn pawn_row(self) -> usize {
        match self {
            Self::White => 6,
            Self::Black => 1,
        }
    }

    pub const fn promotion_row(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceType {
    pub const ALL: [Self; 6] = [
        Self::Pawn,
        Self::Knight,
        Self::Bishop,
        Self::Rook,
        Self::Queen,
        Self::King,
    ];

    /// Promotion choices, strongest first.
    pub const PROMOTIONS: [Self; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Upper-case letter used by FEN and algebraic notation.
    pub const fn letter(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    pub const fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(Self::Pawn),
            'N' => Some(Self::Knight),
            'B' => Some(Self::Bishop),
            'R' => Some(Self::Rook),
            'Q' => Some(Self::Queen),
            'K' => Some(Self::King),
            _ => None,
        }
    }

    pub const fn is_promotion_target(self) -> bool {
        matches!(self, Self::Knight | Self::Bishop | Self::Rook | Self::Queen)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// Stable identity for UI correlation; survives moves and promotion.
    pub id: u8,
    pub piece_type: PieceType,
    pub color: Color,
    pub square: Square,
    pub has_moved: bool,
}

impl Piece {
    pub const fn fen_char(&self) -> char {
        let c = self.piece_type.letter();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }
}

/// Board coordinate. Row 0 is rank 8, column 0 is file a.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "SquareCoords")]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

/// Wire shape of a `Square`; only on-board coordinates convert.
#[derive(Deserialize)]
struct SquareCoords {
    row: u8,
    col: u8,
}

impl TryFrom<SquareCoords> for Square {
    type Error = MoveError;

    fn try_from(coords: SquareCoords) -> Result<Self, Self::Error> {
        Self::new(usize::from(coords.row), usize::from(coords.col)).ok_or(MoveError::OutOfBounds)
    }
}

impl Square {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(row: usize, col: usize) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_index(idx: usize) -> Self {
        let idx = idx & 63;
        Self {
            row: (idx / 8) as u8,
            col: (idx % 8) as u8,
        }
    }

    pub const fn index(self) -> usize {
        self.row as usize * 8 + self.col as usize
    }

    pub const fn row(self) -> usize {
        self.row as usize
    }

    pub const fn col(self) -> usize {
        self.col as usize
    }

    pub const fn is_on_board(self) -> bool {
        self.row < 8 && self.col < 8
    }

    /// Single-bit mask; empty for a square built off the board.
    pub const fn bit(self) -> Bitboard {
        if self.is_on_board() {
            1u64 << self.index()
        } else {
            0
        }
    }

    #[must_use]
    pub fn offset(self, d_row: i32, d_col: i32) -> Option<Self> {
        let row = i32::from(self.row) + d_row;
        let col = i32::from(self.col) + d_col;
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        Self::new(row, col)
    }

    pub const fn file_char(self) -> char {
        (b'a' + self.col) as char
    }

    /// Chess rank, 1..=8.
    pub const fn rank(self) -> u8 {
        8 - self.row
    }

    pub fn from_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        let col = file as usize - 'a' as usize;
        let row = 7 - (rank as usize - '1' as usize);
        Self::new(row, col)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    pub const BOTH: [Self; 2] = [Self::KingSide, Self::QueenSide];

    pub const fn rook_col(self) -> usize {
        match self {
            Self::KingSide => 7,
            Self::QueenSide => 0,
        }
    }

    pub const fn king_target_col(self) -> usize {
        match self {
            Self::KingSide => 6,
            Self::QueenSide => 2,
        }
    }

    pub const fn rook_target_col(self) -> usize {
        match self {
            Self::KingSide => 5,
            Self::QueenSide => 3,
        }
    }

    pub const fn from_king_target(col: usize) -> Option<Self> {
        match col {
            6 => Some(Self::KingSide),
            2 => Some(Self::QueenSide),
            _ => None,
        }
    }

    pub const fn notation(self) -> &'static str {
        match self {
            Self::KingSide => "O-O",
            Self::QueenSide => "O-O-O",
        }
    }
}

pub const KING_START_COL: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    pub const ALL: Self = Self {
        white_king_side: true,
        white_queen_side: true,
        black_king_side: true,
        black_queen_side: true,
    };

    pub const NONE: Self = Self {
        white_king_side: false,
        white_queen_side: false,
        black_king_side: false,
        black_queen_side: false,
    };

    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_king_side,
            (Color::White, CastleSide::QueenSide) => self.white_queen_side,
            (Color::Black, CastleSide::KingSide) => self.black_king_side,
            (Color::Black, CastleSide::QueenSide) => self.black_queen_side,
        }
    }

    pub const fn any(self, color: Color) -> bool {
        self.has(color, CastleSide::KingSide) || self.has(color, CastleSide::QueenSide)
    }

    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_king_side = false,
            (Color::White, CastleSide::QueenSide) => self.white_queen_side = false,
            (Color::Black, CastleSide::KingSide) => self.black_king_side = false,
            (Color::Black, CastleSide::QueenSide) => self.black_queen_side = false,
        }
    }

    pub fn revoke_all(&mut self, color: Color) {
        self.revoke(color, CastleSide::KingSide);
        self.revoke(color, CastleSide::QueenSide);
    }

    /// Four-bit encoding, used for hashing.
    pub const fn bits(self) -> usize {
        (self.white_king_side as usize)
            | (self.white_queen_side as usize) << 1
            | (self.black_king_side as usize) << 2
            | (self.black_queen_side as usize) << 3
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("FEN needs at least the placement and side-to-move fields")]
    MissingField,
    #[error("invalid piece placement: {0}")]
    InvalidPlacement(String),
    #[error("invalid side to move: {0}")]
    InvalidSide(String),
    #[error("invalid castling field: {0}")]
    InvalidCastling(String),
    #[error("invalid en passant square: {0}")]
    InvalidEnPassant(String),
    #[error("invalid move counter: {0}")]
    InvalidCounter(String),
}

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    // Index: color.index() * 6 + piece_type.index()
    pub bitboards: [Bitboard; 12],
    pub occupied: [Bitboard; 2],
    // Mailbox for O(1) lookup
    #[serde(with = "BigArray")]
    pub grid: [Option<Piece>; 64],

    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard starting position, white to move.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.castling = CastlingRights::ALL;
        board.setup_pieces(Color::White);
        board.setup_pieces(Color::Black);
        board
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            bitboards: [0; 12],
            occupied: [0; 2],
            grid: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    fn setup_pieces(&mut self, color: Color) {
        let back_rank = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        for (col, &pt) in back_rank.iter().enumerate() {
            if let Some(sq) = Square::new(color.home_row(), col) {
                self.add_piece(sq, pt, color);
            }
        }
        for col in 0..8 {
            if let Some(sq) = Square::new(color.pawn_row(), col) {
                self.add_piece(sq, PieceType::Pawn, color);
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    fn next_piece_id(&self) -> u8 {
        self.grid
            .iter()
            .flatten()
            .map(|p| p.id.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// Places a fresh, unmoved piece. Intended for building positions.
    pub fn add_piece(&mut self, sq: Square, piece_type: PieceType, color: Color) {
        let piece = Piece {
            id: self.next_piece_id(),
            piece_type,
            color,
            square: sq,
            has_moved: false,
        };
        self.put_piece(piece);
    }

    /// Writes `piece` at `piece.square`, replacing whatever stood there.
    pub fn put_piece(&mut self, piece: Piece) {
        let sq = piece.square;
        self.remove_piece(sq);
        let idx = piece.color.index() * 6 + piece.piece_type.index();
        if let Some(bb) = self.bitboards.get_mut(idx) {
            *bb |= sq.bit();
        }
        if let Some(bb) = self.occupied.get_mut(piece.color.index()) {
            *bb |= sq.bit();
        }
        if let Some(slot) = self.grid.get_mut(sq.index()) {
            *slot = Some(piece);
        }
    }

    pub fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.grid.get_mut(sq.index())?.take()?;
        let idx = piece.color.index() * 6 + piece.piece_type.index();
        if let Some(bb) = self.bitboards.get_mut(idx) {
            *bb &= !sq.bit();
        }
        if let Some(bb) = self.occupied.get_mut(piece.color.index()) {
            *bb &= !sq.bit();
        }
        Some(piece)
    }

    #[must_use]
    pub fn get_piece(&self, sq: Square) -> Option<Piece> {
        self.grid.get(sq.index()).copied().flatten()
    }

    pub fn piece_bb(&self, color: Color, piece_type: PieceType) -> Bitboard {
        self.bitboards
            .get(color.index() * 6 + piece_type.index())
            .copied()
            .unwrap_or(0)
    }

    pub fn color_bb(&self, color: Color) -> Bitboard {
        self.occupied.get(color.index()).copied().unwrap_or(0)
    }

    pub fn all_occupied(&self) -> Bitboard {
        self.color_bb(Color::White) | self.color_bb(Color::Black)
    }

    pub fn is_empty_square(&self, sq: Square) -> bool {
        self.all_occupied() & sq.bit() == 0
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        BitboardIterator::new(self.piece_bb(color, PieceType::King))
            .next()
            .map(Square::from_index)
    }

    pub fn pieces(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        BitboardIterator::new(self.color_bb(color))
            .filter_map(|sq| self.grid.get(sq).copied().flatten())
    }

    /// The piece `mv` would remove from the board, including en passant victims.
    pub fn captured_piece(&self, mv: &Move) -> Option<Piece> {
        if let Some(target) = self.get_piece(mv.to) {
            return Some(target);
        }
        if self.is_en_passant(mv) {
            return Square::new(mv.from.row(), mv.to.col()).and_then(|sq| self.get_piece(sq));
        }
        None
    }

    pub fn is_capture(&self, mv: &Move) -> bool {
        self.captured_piece(mv).is_some()
    }

    pub fn is_en_passant(&self, mv: &Move) -> bool {
        self.en_passant == Some(mv.to)
            && mv.from.col != mv.to.col
            && self.is_empty_square(mv.to)
            && self
                .get_piece(mv.from)
                .is_some_and(|p| p.piece_type == PieceType::Pawn)
    }

    pub fn is_castling(&self, mv: &Move) -> bool {
        self.get_piece(mv.from)
            .is_some_and(|p| p.piece_type == PieceType::King)
            && mv.from.col.abs_diff(mv.to.col) == 2
    }

    /// Returns the board after `mv`, leaving `self` untouched.
    #[must_use]
    pub fn with_move(&self, mv: &Move) -> Self {
        let mut next = *self;
        next.apply_move(mv);
        next
    }

    /// Executes `mv` without validating it. An empty origin leaves the board unchanged.
    pub fn apply_move(&mut self, mv: &Move) {
        let Some(mut piece) = self.get_piece(mv.from) else {
            return;
        };
        let color = piece.color;
        let moved_type = piece.piece_type;

        let en_passant_victim = if self.is_en_passant(mv) {
            Square::new(mv.from.row(), mv.to.col())
        } else {
            None
        };

        self.remove_piece(mv.from);
        let captured = match en_passant_victim {
            Some(victim_sq) => self.remove_piece(victim_sq),
            None => self.remove_piece(mv.to),
        };

        // Castling: relocate the rook
        if moved_type == PieceType::King && mv.from.col.abs_diff(mv.to.col) == 2 {
            if let Some(side) = CastleSide::from_king_target(mv.to.col()) {
                let rook_from = Square::new(mv.from.row(), side.rook_col());
                let rook_to = Square::new(mv.from.row(), side.rook_target_col());
                if let (Some(rook_from), Some(rook_to)) = (rook_from, rook_to) {
                    if let Some(mut rook) = self.remove_piece(rook_from) {
                        rook.square = rook_to;
                        rook.has_moved = true;
                        self.put_piece(rook);
                    }
                }
            }
        }

        // Castling rights are only ever lost
        if moved_type == PieceType::King {
            self.castling.revoke_all(color);
        }
        if moved_type == PieceType::Rook && mv.from.row() == color.home_row() {
            for side in CastleSide::BOTH {
                if mv.from.col() == side.rook_col() {
                    self.castling.revoke(color, side);
                }
            }
        }
        if let Some(cap) = captured {
            if cap.piece_type == PieceType::Rook && cap.square.row() == cap.color.home_row() {
                for side in CastleSide::BOTH {
                    if cap.square.col() == side.rook_col() {
                        self.castling.revoke(cap.color, side);
                    }
                }
            }
        }

        if moved_type == PieceType::Pawn && mv.to.row() == color.promotion_row() {
            piece.piece_type = mv
                .promotion
                .filter(|pt| pt.is_promotion_target())
                .unwrap_or(PieceType::Queen);
        }
        piece.square = mv.to;
        piece.has_moved = true;
        self.put_piece(piece);

        self.en_passant = if moved_type == PieceType::Pawn && mv.from.row.abs_diff(mv.to.row) == 2
        {
            Square::new((mv.from.row() + mv.to.row()) / 2, mv.from.col())
        } else {
            None
        };

        if moved_type == PieceType::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if color == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = color.opposite();
    }

    pub fn to_fen_string(&self) -> String {
        let mut fen = String::new();
        // 1. Piece placement, rank 8 first
        for row in 0..8 {
            let mut empty_count = 0;
            for col in 0..8 {
                match Square::new(row, col).and_then(|sq| self.get_piece(sq)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(piece.fen_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if row < 7 {
                fen.push('/');
            }
        }

        // 2. Turn
        fen.push(' ');
        fen.push(if self.side_to_move == Color::White { 'w' } else { 'b' });

        // 3. Castling
        fen.push(' ');
        let rights = [
            (self.castling.white_king_side, 'K'),
            (self.castling.white_queen_side, 'Q'),
            (self.castling.black_king_side, 'k'),
            (self.castling.black_queen_side, 'q'),
        ];
        let mut any = false;
        for (held, c) in rights {
            if held {
                fen.push(c);
                any = true;
            }
        }
        if !any {
            fen.push('-');
        }

        // 4. En passant, 5-6. counters
        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }
        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }

    /// Parses a FEN record. Counters may be omitted and default to `0 1`.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(FenError::MissingField)?;
        let side = fields.next().ok_or(FenError::MissingField)?;
        let castling = fields.next().unwrap_or("-");
        let en_passant = fields.next().unwrap_or("-");
        let halfmove = fields.next().unwrap_or("0");
        let fullmove = fields.next().unwrap_or("1");

        let mut board = Self::empty();

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPlacement(placement.to_string()));
        }
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0usize;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                    continue;
                }
                let piece_type = PieceType::from_letter(c)
                    .ok_or_else(|| FenError::InvalidPlacement(placement.to_string()))?;
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let sq = Square::new(row, col)
                    .ok_or_else(|| FenError::InvalidPlacement(placement.to_string()))?;
                board.add_piece(sq, piece_type, color);
                col += 1;
            }
            if col != 8 {
                return Err(FenError::InvalidPlacement(placement.to_string()));
            }
        }

        board.side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSide(other.to_string())),
        };

        if castling != "-" {
            for c in castling.chars() {
                match c {
                    'K' => board.castling.white_king_side = true,
                    'Q' => board.castling.white_queen_side = true,
                    'k' => board.castling.black_king_side = true,
                    'q' => board.castling.black_queen_side = true,
                    _ => return Err(FenError::InvalidCastling(castling.to_string())),
                }
            }
        }

        board.en_passant = if en_passant == "-" {
            None
        } else {
            Some(
                Square::from_algebraic(en_passant)
                    .ok_or_else(|| FenError::InvalidEnPassant(en_passant.to_string()))?,
            )
        };

        board.halfmove_clock = halfmove
            .parse()
            .map_err(|_| FenError::InvalidCounter(halfmove.to_string()))?;
        board.fullmove_number = fullmove
            .parse()
            .map_err(|_| FenError::InvalidCounter(fullmove.to_string()))?;

        board.sanitize_castling();
        board.derive_has_moved();
        Ok(board)
    }

    /// Drops castling rights that are not backed by an unmoved king and rook.
    fn sanitize_castling(&mut self) {
        for color in [Color::White, Color::Black] {
            let king_home = Square::new(color.home_row(), KING_START_COL);
            let king_ok = king_home
                .and_then(|sq| self.get_piece(sq))
                .is_some_and(|p| p.piece_type == PieceType::King && p.color == color);
            for side in CastleSide::BOTH {
                let rook_ok = Square::new(color.home_row(), side.rook_col())
                    .and_then(|sq| self.get_piece(sq))
                    .is_some_and(|p| p.piece_type == PieceType::Rook && p.color == color);
                if !king_ok || !rook_ok {
                    self.castling.revoke(color, side);
                }
            }
        }
    }

    fn derive_has_moved(&mut self) {
        let castling = self.castling;
        for slot in &mut self.grid {
            let Some(piece) = slot.as_mut() else {
                continue;
            };
            let color = piece.color;
            let sq = piece.square;
            piece.has_moved = match piece.piece_type {
                PieceType::Pawn => sq.row() != color.pawn_row(),
                PieceType::King => !castling.any(color),
                PieceType::Rook => !CastleSide::BOTH.iter().any(|&side| {
                    castling.has(color, side)
                        && sq.row() == color.home_row()
                        && sq.col() == side.rook_col()
                }),
                _ => false,
            };
        }
    }
}

pub struct BitboardIterator {
    bb: Bitboard,
}

impl BitboardIterator {
    pub const fn new(bb: Bitboard) -> Self {
        Self { bb }
    }
}

impl Iterator for BitboardIterator {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bb == 0 {
            None
        } else {
            let lsb = self.bb.trailing_zeros() as usize;
            self.bb &= self.bb - 1;
            Some(lsb)
        }
    }
}
