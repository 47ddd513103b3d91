use crate::engine::Move;
use crate::logic::board::{Board, PieceType, Square};
use crate::logic::eval_constants::get_piece_value;
use crate::logic::game::Position;
use crate::logic::generator::{is_castling_move, MoveGenerator};
use crate::logic::notation::san_to_move;
use crate::logic::rules::is_square_attacked;
use rand::seq::SliceRandom;
use rand::Rng;

pub const OPENING_PLY_LIMIT: usize = 20;
pub const DISPLACED_PIECE_LIMIT: usize = 10;

pub struct OpeningLine {
    pub name: &'static str,
    pub moves: &'static [&'static str],
}

#[rustfmt::skip]
pub const OPENINGS: &[OpeningLine] = &[
    OpeningLine { name: "Ruy Lopez", moves: &["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Ba4", "Nf6", "O-O", "Be7", "Re1", "b5", "Bb3", "d6", "c3", "O-O"] },
    OpeningLine { name: "Italian Game", moves: &["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "c3", "Nf6", "d3", "d6", "O-O", "O-O"] },
    OpeningLine { name: "Two Knights Defense", moves: &["e4", "e5", "Nf3", "Nc6", "Bc4", "Nf6", "d3", "Be7", "O-O", "O-O"] },
    OpeningLine { name: "Scotch Game", moves: &["e4", "e5", "Nf3", "Nc6", "d4", "exd4", "Nxd4", "Nf6", "Nxc6", "bxc6", "e5", "Qe7", "Qe2", "Nd5"] },
    OpeningLine { name: "Petrov Defense", moves: &["e4", "e5", "Nf3", "Nf6", "Nxe5", "d6", "Nf3", "Nxe4", "d4", "d5", "Bd3"] },
    OpeningLine { name: "Vienna Game", moves: &["e4", "e5", "Nc3", "Nf6", "f4", "d5", "fxe5", "Nxe4", "Nf3", "Be7"] },
    OpeningLine { name: "Sicilian Najdorf", moves: &["e4", "c5", "Nf3", "d6", "d4", "cxd4", "Nxd4", "Nf6", "Nc3", "a6", "Be2", "e5", "Nb3", "Be7", "O-O", "O-O"] },
    OpeningLine { name: "Sicilian Dragon", moves: &["e4", "c5", "Nf3", "d6", "d4", "cxd4", "Nxd4", "Nf6", "Nc3", "g6", "Be3", "Bg7", "f3", "O-O", "Qd2", "Nc6"] },
    OpeningLine { name: "Sicilian Alapin", moves: &["e4", "c5", "c3", "d5", "exd5", "Qxd5", "d4", "Nf6", "Nf3", "e6"] },
    OpeningLine { name: "French Defense", moves: &["e4", "e6", "d4", "d5", "Nc3", "Nf6", "Bg5", "Be7", "e5", "Nfd7", "Bxe7", "Qxe7"] },
    OpeningLine { name: "Caro-Kann Defense", moves: &["e4", "c6", "d4", "d5", "Nc3", "dxe4", "Nxe4", "Bf5", "Ng3", "Bg6", "h4", "h6", "Nf3", "Nd7"] },
    OpeningLine { name: "Scandinavian Defense", moves: &["e4", "d5", "exd5", "Qxd5", "Nc3", "Qa5", "d4", "Nf6", "Nf3", "c6"] },
    OpeningLine { name: "Pirc Defense", moves: &["e4", "d6", "d4", "Nf6", "Nc3", "g6", "Nf3", "Bg7", "Be2", "O-O", "O-O"] },
    OpeningLine { name: "Queen's Gambit Declined", moves: &["d4", "d5", "c4", "e6", "Nc3", "Nf6", "Bg5", "Be7", "e3", "O-O", "Nf3", "Nbd7"] },
    OpeningLine { name: "Queen's Gambit Accepted", moves: &["d4", "d5", "c4", "dxc4", "Nf3", "Nf6", "e3", "e6", "Bxc4", "c5", "O-O", "a6"] },
    OpeningLine { name: "Slav Defense", moves: &["d4", "d5", "c4", "c6", "Nf3", "Nf6", "Nc3", "dxc4", "a4", "Bf5", "e3", "e6", "Bxc4", "Bb4"] },
    OpeningLine { name: "King's Indian Defense", moves: &["d4", "Nf6", "c4", "g6", "Nc3", "Bg7", "e4", "d6", "Nf3", "O-O", "Be2", "e5", "O-O", "Nc6"] },
    OpeningLine { name: "Nimzo-Indian Defense", moves: &["d4", "Nf6", "c4", "e6", "Nc3", "Bb4", "Qc2", "O-O", "a3", "Bxc3", "Qxc3", "b6"] },
    OpeningLine { name: "London System", moves: &["d4", "d5", "Nf3", "Nf6", "Bf4", "e6", "e3", "c5", "c3", "Nc6", "Nbd2", "Bd6", "Bg3", "O-O", "Bd3"] },
    OpeningLine { name: "Dutch Defense", moves: &["d4", "f5", "g3", "Nf6", "Bg2", "e6", "Nf3", "Be7", "O-O", "O-O", "c4", "d6"] },
    OpeningLine { name: "English Opening", moves: &["c4", "e5", "Nc3", "Nf6", "Nf3", "Nc6", "g3", "d5", "cxd5", "Nxd5", "Bg2", "Nb6", "O-O", "Be7"] },
    OpeningLine { name: "Reti Opening", moves: &["Nf3", "d5", "c4", "e6", "g3", "Nf6", "Bg2", "Be7", "O-O", "O-O", "b3", "c5"] },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookMove {
    pub mv: Move,
    /// Name of a line the move belongs to; `None` for the general-principles fallback.
    pub opening: Option<&'static str>,
}

pub struct OpeningBook {
    variety: usize,
    generator: MoveGenerator,
}

impl Default for OpeningBook {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Fewer than 20 plies played and fewer than 10 starting squares vacated or
/// taken over by a different piece.
pub fn is_in_opening_phase(position: &Position) -> bool {
    position.history.len() < OPENING_PLY_LIMIT
        && displaced_start_squares(&position.board) < DISPLACED_PIECE_LIMIT
}

fn displaced_start_squares(board: &Board) -> usize {
    let start = Board::new();
    start
        .grid
        .iter()
        .flatten()
        .filter(|original| {
            board
                .get_piece(original.square)
                .map_or(true, |p| p.piece_type != original.piece_type || p.color != original.color)
        })
        .count()
}

fn strip_annotations(token: &str) -> &str {
    token.trim_end_matches(['+', '#', '!', '?'])
}

impl OpeningBook {
    pub fn new(variety: usize) -> Self {
        Self {
            variety: variety.max(1),
            generator: MoveGenerator::new(),
        }
    }

    /// A move from a named line when the game so far follows one, otherwise a
    /// move picked by general opening principles. `None` outside the opening.
    pub fn get_book_move<R: Rng + ?Sized>(
        &self,
        position: &Position,
        rng: &mut R,
    ) -> Option<BookMove> {
        if !is_in_opening_phase(position) || position.is_game_over {
            return None;
        }

        if let Some(book_move) = self.line_move(position, rng) {
            log::debug!(
                "book move {} from {}",
                book_move.mv,
                book_move.opening.unwrap_or("?")
            );
            return Some(book_move);
        }

        self.principled_move(position, rng)
    }

    /// Candidate next tokens of every line extending the history, with the
    /// number of lines sharing each and the first line name that offered it.
    fn candidates(played: &[&str]) -> Vec<(&'static str, usize, &'static str)> {
        let mut candidates: Vec<(&'static str, usize, &'static str)> = Vec::new();
        for line in OPENINGS {
            let Some(prefix) = line.moves.get(..played.len()) else {
                continue;
            };
            if prefix != played {
                continue;
            }
            let Some(&next) = line.moves.get(played.len()) else {
                continue;
            };
            match candidates.iter_mut().find(|(token, _, _)| *token == next) {
                Some(entry) => entry.1 += 1,
                None => candidates.push((next, 1, line.name)),
            }
        }
        // Stable: equal counts keep table order
        candidates.sort_by(|a, b| b.1.cmp(&a.1));
        candidates
    }

    fn line_move<R: Rng + ?Sized>(&self, position: &Position, rng: &mut R) -> Option<BookMove> {
        let played: Vec<&str> = position
            .history
            .iter()
            .map(|r| strip_annotations(&r.notation))
            .collect();

        if !follows_from_start(position, &played) {
            return None;
        }

        let candidates = Self::candidates(&played);
        let top = candidates.get(..candidates.len().min(self.variety))?;
        let &(token, _, name) = top.choose(rng)?;

        match san_to_move(&position.board, token) {
            Some(mv) => Some(BookMove {
                mv,
                opening: Some(name),
            }),
            None => {
                log::warn!("opening book token {token} is not playable here");
                None
            }
        }
    }

    fn principled_move<R: Rng + ?Sized>(
        &self,
        position: &Position,
        rng: &mut R,
    ) -> Option<BookMove> {
        let board = &position.board;
        let color = board.side_to_move;
        let moves = self.generator.legal_moves(board, color);

        let scored: Vec<(Move, i32)> = moves
            .iter()
            .map(|mv| (*mv, principle_score(position, mv)))
            .collect();
        let best = scored.iter().map(|(_, s)| *s).max()?;
        let top: Vec<Move> = scored
            .iter()
            .filter(|(_, s)| *s == best)
            .map(|(mv, _)| *mv)
            .collect();

        top.choose(rng).map(|&mv| BookMove { mv, opening: None })
    }
}

/// The history replays from the standard setup to the current board.
fn follows_from_start(position: &Position, played: &[&str]) -> bool {
    let mut board = Board::new();
    for token in played {
        match san_to_move(&board, token) {
            Some(mv) => board.apply_move(&mv),
            None => return false,
        }
    }
    board.bitboards == position.board.bitboards && board.side_to_move == position.board.side_to_move
}

fn principle_score(position: &Position, mv: &Move) -> i32 {
    let board = &position.board;
    let Some(piece) = board.get_piece(mv.from) else {
        return i32::MIN;
    };
    let color = piece.color;
    let mut score = 0;

    // Minor piece development
    if matches!(piece.piece_type, PieceType::Knight | PieceType::Bishop)
        && mv.from.row() == color.home_row()
    {
        score += 30;
    }

    // Centre occupation
    if is_center(mv.to) {
        score += if piece.piece_type == PieceType::Pawn { 25 } else { 15 };
    }

    if is_castling_move(board, mv) {
        score += 40;
    } else if piece.piece_type == PieceType::King {
        score -= 40;
    }

    // Same piece twice
    if position
        .history
        .iter()
        .any(|r| r.piece.id == piece.id && r.piece.color == color)
    {
        score -= 20;
    }

    if piece.piece_type == PieceType::Queen && position.history.len() < 10 {
        score -= 25;
    }

    let next = board.with_move(mv);
    let exposed = is_square_attacked(&next, mv.to, color.opposite());
    if exposed {
        score -= 30;
    }

    // Material: the victim, less the mover when it can be taken back
    if let Some(victim) = board.captured_piece(mv) {
        score += get_piece_value(victim.piece_type);
        if exposed {
            score -= get_piece_value(piece.piece_type);
        }
    }

    score
}

fn is_center(sq: Square) -> bool {
    (3..=4).contains(&sq.row()) && (3..=4).contains(&sq.col())
}

/// Every named line replays legally from the starting position.
pub fn validate_book() -> Result<(), String> {
    for line in OPENINGS {
        let mut board = Board::new();
        for token in line.moves {
            let mv = san_to_move(&board, token)
                .ok_or_else(|| format!("{}: {token} is not legal", line.name))?;
            board.apply_move(&mv);
        }
    }
    Ok(())
}
