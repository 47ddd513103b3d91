use crate::logic::board::{BitboardIterator, Board, Color};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_ZOBRIST_SEED: u64 = 0x5EED_C0DE_CAFE_F00D;

/// Random keys for incremental-free position hashing. Owned by the table that
/// uses them; two key sets built from the same seed hash identically.
#[derive(Debug, Clone)]
pub struct ZobristKeys {
    // [color * 6 + piece_type][square]
    pub piece_keys: [[u64; 64]; 12],
    pub side_key: u64,
    pub castling_keys: [u64; 4],
    pub en_passant_keys: [u64; 8],
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new(DEFAULT_ZOBRIST_SEED)
    }
}

impl ZobristKeys {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut piece_keys = [[0; 64]; 12];
        for table in &mut piece_keys {
            for key in table.iter_mut() {
                *key = rng.gen();
            }
        }
        let side_key = rng.gen();
        let mut castling_keys = [0; 4];
        for key in &mut castling_keys {
            *key = rng.gen();
        }
        let mut en_passant_keys = [0; 8];
        for key in &mut en_passant_keys {
            *key = rng.gen();
        }

        Self {
            piece_keys,
            side_key,
            castling_keys,
            en_passant_keys,
        }
    }

    /// Hash of placement, side to move, castling rights and en-passant file.
    pub fn hash(&self, board: &Board) -> u64 {
        let mut hash = 0;
        for (bb_idx, &bb) in board.bitboards.iter().enumerate() {
            let Some(table) = self.piece_keys.get(bb_idx) else {
                continue;
            };
            for sq in BitboardIterator::new(bb) {
                hash ^= table.get(sq).copied().unwrap_or(0);
            }
        }

        if board.side_to_move == Color::Black {
            hash ^= self.side_key;
        }

        let rights = board.castling.bits();
        for (bit, key) in self.castling_keys.iter().enumerate() {
            if rights & (1 << bit) != 0 {
                hash ^= key;
            }
        }

        if let Some(ep) = board.en_passant {
            hash ^= self.en_passant_keys.get(ep.col()).copied().unwrap_or(0);
        }

        hash
    }
}
