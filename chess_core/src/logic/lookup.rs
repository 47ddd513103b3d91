use crate::logic::board::{Bitboard, Color, Square};
use std::sync::OnceLock;

// (d_row, d_col). The first four increase the square index, the rest decrease it.
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (0, 1),
    (1, 1),
    (1, -1),
    (-1, 0),
    (0, -1),
    (-1, -1),
    (-1, 1),
];
const ORTHOGONAL: [usize; 4] = [0, 1, 4, 5];
const DIAGONAL: [usize; 4] = [2, 3, 6, 7];

const KNIGHT_DELTAS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

fn leaper_mask(sq: Square, deltas: &[(i32, i32)]) -> Bitboard {
    deltas
        .iter()
        .filter_map(|&(dr, dc)| sq.offset(dr, dc))
        .fold(0, |acc, t| acc | t.bit())
}

pub struct AttackTables {
    pub knight: [Bitboard; 64],
    pub king: [Bitboard; 64],
    // Squares a pawn of the given color attacks from each square
    pub pawn: [[Bitboard; 64]; 2],
    rays: [[Bitboard; 64]; 8],
}

impl AttackTables {
    fn new() -> Self {
        let mut knight = [0; 64];
        let mut king = [0; 64];
        let mut pawn = [[0; 64]; 2];
        let mut rays = [[0; 64]; 8];

        for (idx, slot) in knight.iter_mut().enumerate() {
            *slot = leaper_mask(Square::from_index(idx), &KNIGHT_DELTAS);
        }
        for (idx, slot) in king.iter_mut().enumerate() {
            *slot = leaper_mask(Square::from_index(idx), &DIRECTIONS);
        }
        for (color, table) in [Color::White, Color::Black].into_iter().zip(pawn.iter_mut()) {
            let deltas = [(color.forward(), -1), (color.forward(), 1)];
            for (idx, slot) in table.iter_mut().enumerate() {
                *slot = leaper_mask(Square::from_index(idx), &deltas);
            }
        }
        for (&(dr, dc), table) in DIRECTIONS.iter().zip(rays.iter_mut()) {
            for (idx, slot) in table.iter_mut().enumerate() {
                let mut cur = Square::from_index(idx).offset(dr, dc);
                while let Some(t) = cur {
                    *slot |= t.bit();
                    cur = t.offset(dr, dc);
                }
            }
        }

        Self {
            knight,
            king,
            pawn,
            rays,
        }
    }

    pub fn get() -> &'static Self {
        static INSTANCE: OnceLock<AttackTables> = OnceLock::new();
        INSTANCE.get_or_init(AttackTables::new)
    }

    fn ray(&self, dir: usize, sq: usize) -> Bitboard {
        self.rays
            .get(dir)
            .and_then(|table| table.get(sq))
            .copied()
            .unwrap_or(0)
    }

    fn ray_attacks(&self, dir: usize, idx: usize, occupied: Bitboard) -> Bitboard {
        let ray = self.ray(dir, idx);
        let blockers = ray & occupied;
        if blockers == 0 {
            return ray;
        }
        let first = if dir < 4 {
            blockers.trailing_zeros() as usize
        } else {
            63 - blockers.leading_zeros() as usize
        };
        // Keep the blocker itself, drop everything behind it
        ray ^ self.ray(dir, first)
    }

    pub fn rook_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        ORTHOGONAL
            .iter()
            .fold(0, |acc, &dir| acc | self.ray_attacks(dir, sq.index(), occupied))
    }

    pub fn bishop_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        DIAGONAL
            .iter()
            .fold(0, |acc, &dir| acc | self.ray_attacks(dir, sq.index(), occupied))
    }

    pub fn queen_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.rook_attacks(sq, occupied) | self.bishop_attacks(sq, occupied)
    }

    pub fn knight_attacks(&self, sq: Square) -> Bitboard {
        self.knight.get(sq.index()).copied().unwrap_or(0)
    }

    pub fn king_attacks(&self, sq: Square) -> Bitboard {
        self.king.get(sq.index()).copied().unwrap_or(0)
    }

    pub fn pawn_attacks(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn
            .get(color.index())
            .and_then(|table| table.get(sq.index()))
            .copied()
            .unwrap_or(0)
    }

    /// Squares strictly between two aligned squares, or 0 when they are not aligned.
    pub fn between(&self, from: Square, to: Square) -> Bitboard {
        for dir in 0..8 {
            let ray = self.ray(dir, from.index());
            if ray & to.bit() != 0 {
                return ray & !self.ray(dir, to.index()) & !to.bit();
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_leaper_tables() {
        let t = AttackTables::get();
        assert_eq!(t.knight_attacks(sq("a1")).count_ones(), 2);
        assert_eq!(t.knight_attacks(sq("d4")).count_ones(), 8);
        assert_eq!(t.king_attacks(sq("h8")).count_ones(), 3);
        assert_eq!(t.pawn_attacks(Color::White, sq("e4")), sq("d5").bit() | sq("f5").bit());
        assert_eq!(t.pawn_attacks(Color::Black, sq("a7")), sq("b6").bit());
    }

    #[test]
    fn test_sliders_stop_at_blockers() {
        let t = AttackTables::get();
        assert_eq!(t.rook_attacks(sq("a1"), 0).count_ones(), 14);
        let occ = sq("a4").bit() | sq("c1").bit();
        let attacks = t.rook_attacks(sq("a1"), occ);
        assert_ne!(attacks & sq("a4").bit(), 0);
        assert_eq!(attacks & sq("a5").bit(), 0);
        assert_ne!(attacks & sq("c1").bit(), 0);
        assert_eq!(attacks & sq("d1").bit(), 0);
        assert_eq!(attacks.count_ones(), 5);

        let attacks = t.bishop_attacks(sq("d4"), sq("f6").bit());
        assert_ne!(attacks & sq("f6").bit(), 0);
        assert_eq!(attacks & sq("g7").bit(), 0);
        assert_ne!(attacks & sq("a1").bit(), 0);
    }

    #[test]
    fn test_between() {
        let t = AttackTables::get();
        assert_eq!(t.between(sq("e1"), sq("h1")), sq("f1").bit() | sq("g1").bit());
        assert_eq!(t.between(sq("a1"), sq("b3")), 0);
        assert_eq!(t.between(sq("c3"), sq("a1")), sq("b2").bit());
    }

    #[test]
    fn test_off_board_square_reads_empty() {
        let t = AttackTables::get();
        let off = Square { row: 8, col: 3 };
        assert_eq!(off.bit(), 0);
        assert_eq!(t.knight_attacks(off), 0);
        assert_eq!(t.pawn_attacks(Color::Black, off), 0);
        assert_eq!(t.rook_attacks(off, 0), 0);
        assert_eq!(t.between(sq("a1"), off), 0);
    }
}
