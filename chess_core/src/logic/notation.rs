//! Standard algebraic notation (SAN) for moves, and move-list export.

use crate::engine::Move;
use crate::logic::board::{Board, CastleSide, Color, PieceType};
use crate::logic::game::MoveRecord;
use crate::logic::generator::MoveGenerator;
use std::fmt::Write;

/// SAN for `mv` on `board`, without check or mate suffixes.
pub fn san(board: &Board, mv: &Move) -> String {
    let color = board
        .get_piece(mv.from)
        .map_or(board.side_to_move, |p| p.color);
    let legal = MoveGenerator::new().legal_moves(board, color);
    san_with_moves(board, mv, legal.as_slice())
}

/// SAN for `mv`, disambiguating against the precomputed `legal` moves.
pub fn san_with_moves(board: &Board, mv: &Move, legal: &[Move]) -> String {
    let Some(piece) = board.get_piece(mv.from) else {
        return mv.to_string();
    };

    if board.is_castling(mv) {
        if let Some(side) = CastleSide::from_king_target(mv.to.col()) {
            return side.notation().to_string();
        }
    }

    let capture = board.is_capture(mv);
    let mut out = String::with_capacity(8);

    if piece.piece_type == PieceType::Pawn {
        if capture {
            out.push(mv.from.file_char());
            out.push('x');
        }
        out.push_str(&mv.to.to_string());
        if mv.to.row() == piece.color.promotion_row() {
            out.push('=');
            out.push(mv.promotion.unwrap_or(PieceType::Queen).letter());
        }
        return out;
    }

    out.push(piece.piece_type.letter());

    let rivals: Vec<_> = legal
        .iter()
        .filter(|other| other.to == mv.to && other.from != mv.from)
        .filter(|other| {
            board
                .get_piece(other.from)
                .is_some_and(|p| p.piece_type == piece.piece_type && p.color == piece.color)
        })
        .map(|other| other.from)
        .collect();

    if !rivals.is_empty() {
        let shares_file = rivals.iter().any(|sq| sq.col == mv.from.col);
        let shares_rank = rivals.iter().any(|sq| sq.row == mv.from.row);
        if !shares_file {
            out.push(mv.from.file_char());
        } else if !shares_rank {
            let _ = write!(out, "{}", mv.from.rank());
        } else {
            out.push_str(&mv.from.to_string());
        }
    }

    if capture {
        out.push('x');
    }
    out.push_str(&mv.to.to_string());
    out
}

/// Resolves a SAN token against the side to move. Annotation suffixes are
/// ignored, `0-0` is read as `O-O`, and coordinate notation is accepted too.
pub fn san_to_move(board: &Board, token: &str) -> Option<Move> {
    let cleaned = token
        .trim()
        .trim_end_matches(['+', '#', '!', '?'])
        .replace('0', "O");
    if cleaned.is_empty() {
        return None;
    }

    let legal = MoveGenerator::new().legal_moves(board, board.side_to_move);
    let moves = legal.as_slice();

    if let Some(found) = moves
        .iter()
        .find(|mv| san_with_moves(board, mv, moves) == cleaned)
    {
        return Some(*found);
    }

    // Coordinate form, e.g. from a worker or a log
    let mv = Move::from_uci(token.trim())?;
    let mv = if mv.promotion.is_none() && board.get_piece(mv.from).is_some_and(|p| {
        p.piece_type == PieceType::Pawn && mv.to.row() == p.color.promotion_row()
    }) {
        Move::with_promotion(mv.from, mv.to, PieceType::Queen)
    } else {
        mv
    };
    moves.iter().find(|legal_mv| **legal_mv == mv).copied()
}

/// Formats a history as `1. e4 e5 2. Nf3`. A list starting with black's
/// move begins `1... `.
pub fn export_move_list(records: &[MoveRecord]) -> String {
    let mut out = String::new();
    let mut move_number = 1u32;

    for (i, record) in records.iter().enumerate() {
        match record.piece.color {
            Color::White => {
                if !out.is_empty() {
                    out.push(' ');
                }
                let _ = write!(out, "{move_number}. {}", record.notation);
            }
            Color::Black => {
                if i == 0 {
                    let _ = write!(out, "{move_number}... {}", record.notation);
                } else {
                    out.push(' ');
                    out.push_str(&record.notation);
                }
                move_number += 1;
            }
        }
    }

    out
}
