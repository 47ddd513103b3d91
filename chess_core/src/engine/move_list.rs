use crate::engine::Move;
use crate::logic::board::Square;
use std::ops::Index;

// Legal chess positions top out at 218 moves; pseudo-legal promotions can add more.
const MAX_MOVES: usize = 256;

static NULL_MOVE: Move = Move::new(Square::from_index(0), Square::from_index(0));

pub struct MoveList {
    pub moves: [Move; MAX_MOVES],
    pub count: usize,
}

impl Default for MoveList {
    fn default() -> Self {
        Self {
            moves: [Move::default(); MAX_MOVES],
            count: 0,
        }
    }
}

impl MoveList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mv: Move) {
        if let Some(slot) = self.moves.get_mut(self.count) {
            *slot = mv;
            self.count += 1;
        } else {
            debug_assert!(false, "MoveList overflow! Max moves: {MAX_MOVES}");
        }
    }

    pub const fn len(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_slice(&self) -> &[Move] {
        self.moves.get(0..self.count).unwrap_or(&[])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Move> {
        self.moves
            .get_mut(0..self.count)
            .unwrap_or(&mut [])
            .iter_mut()
    }

    pub fn contains(&self, mv: &Move) -> bool {
        self.as_slice().contains(mv)
    }

    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Move, &Move) -> std::cmp::Ordering,
    {
        if let Some(slice) = self.moves.get_mut(0..self.count) {
            slice.sort_by(compare);
        }
    }

    /// Keeps the moves for which `f` holds. Order is preserved.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut kept = 0;
        for i in 0..self.count {
            let Some(&mv) = self.moves.get(i) else {
                break;
            };
            if f(&mv) {
                if let Some(slot) = self.moves.get_mut(kept) {
                    *slot = mv;
                }
                kept += 1;
            }
        }
        self.count = kept;
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    /// Out-of-range reads yield a null `a8a8` move rather than panicking.
    fn index(&self, index: usize) -> &Self::Output {
        self.as_slice().get(index).unwrap_or(&NULL_MOVE)
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::iter::Take<std::array::IntoIter<Move, MAX_MOVES>>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter().take(self.count)
    }
}
