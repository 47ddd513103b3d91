use crate::logic::board::{Board, PieceType, Square};
use crate::logic::game::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod eval;
pub mod move_list;
pub mod movegen;
pub mod search;
pub mod tt;
pub mod zobrist;

/// Compact move used by the generator, the search and the wire.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
    /// Ordering score; ignored by equality.
    pub score: i32,
}

impl Move {
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
            score: 0,
        }
    }

    pub const fn with_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
            score: 0,
        }
    }

    /// Parses coordinate notation such as `e2e4` or `e7e8q`.
    pub fn from_uci(s: &str) -> Option<Self> {
        let from = Square::from_algebraic(s.get(0..2)?)?;
        let to = Square::from_algebraic(s.get(2..4)?)?;
        let promotion = match s.get(4..) {
            None | Some("") => None,
            Some(p) => {
                let mut chars = p.chars();
                let pt = PieceType::from_letter(chars.next()?)?;
                if chars.next().is_some() || !pt.is_promotion_target() {
                    return None;
                }
                Some(pt)
            }
        };
        Some(Self {
            from,
            to,
            promotion,
            score: 0,
        })
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to && self.promotion == other.promotion
    }
}

impl Eq for Move {}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(pt) = self.promotion {
            write!(f, "{}", pt.letter().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchLimit {
    Depth(u8),
    Time(u64), // milliseconds
    DepthAndTime { depth: u8, time_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub best_move: Move,
    /// Centipawns, positive favors white.
    pub evaluation: i32,
    pub nodes: u64,
    pub depth: u8,
    pub time_ms: u64,
    pub book_hit: bool,
}

pub trait Evaluator {
    fn evaluate(&self, board: &Board) -> i32;
}

pub trait Searcher {
    fn search(&mut self, position: &Position, limit: SearchLimit) -> Option<SearchResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_equality_ignores_score() {
        let a = Move::from_uci("e2e4").unwrap();
        let mut b = a;
        b.score = 500;
        assert_eq!(a, b);
        assert_ne!(a, Move::from_uci("e7e8q").unwrap());
    }

    #[test]
    fn test_move_display() {
        assert_eq!(Move::from_uci("e7e8q").unwrap().to_string(), "e7e8q");
        assert_eq!(Move::from_uci("g1f3").unwrap().to_string(), "g1f3");
        assert!(Move::from_uci("e7e8k").is_none());
        assert!(Move::from_uci("z9").is_none());
    }
}
