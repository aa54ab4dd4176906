//! Which cells of the board the agent has been able to see.

use crate::model::board::{Board, CELLS, COLUMNS, ROWS};
use crate::model::player::Player;
use std::cmp::Ordering;
use std::fmt;

/// Bytes needed to hold one bit per cell.
pub const MASK_BYTES: usize = CELLS.div_ceil(8);

/// One bit per cell, bit index `row * COLUMNS + col`.
///
/// A cell is revealed once the column it sits in is full or once it, or any cell above
/// it, holds an agent disc. The whole board is revealed when the game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VisibilityMask(u64);

impl VisibilityMask {
    pub const HIDDEN: Self = Self(0);
    pub const REVEALED: Self = Self((1u64 << CELLS) - 1);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits & Self::REVEALED.0)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    const fn bit(row: usize, col: usize) -> u64 {
        1u64 << (row * COLUMNS + col)
    }

    pub const fn is_visible(self, row: usize, col: usize) -> bool {
        self.0 & Self::bit(row, col) != 0
    }

    pub fn set_visible(&mut self, row: usize, col: usize, visible: bool) {
        if visible {
            self.0 |= Self::bit(row, col);
        } else {
            self.0 &= !Self::bit(row, col);
        }
    }

    pub const fn is_fully_revealed(self) -> bool {
        self.0 == Self::REVEALED.0
    }

    pub const fn revealed_count(self) -> u32 {
        self.0.count_ones()
    }

    /// Little-endian byte view; the mask orders by this sequence.
    pub fn to_bytes(self) -> [u8; MASK_BYTES] {
        let mut bytes = [0u8; MASK_BYTES];
        bytes.copy_from_slice(&self.0.to_le_bytes()[..MASK_BYTES]);
        bytes
    }

    /// Derives the mask a player would see for `board` from scratch.
    pub fn observe(board: &Board) -> Self {
        if board.is_game_over() {
            return Self::REVEALED;
        }
        let mut mask = Self::HIDDEN;
        for col in 0..COLUMNS {
            mask.reveal_column(board, col);
        }
        mask
    }

    /// Updates a prior mask after a disc was dropped into `col` of `board`.
    pub fn after_move(self, board: &Board, col: usize) -> Self {
        if board.is_game_over() {
            return Self::REVEALED;
        }
        let mut mask = self;
        mask.reveal_column(board, col);
        mask
    }

    fn reveal_column(&mut self, board: &Board, col: usize) {
        let mut visible = board.is_column_full(col);
        for row in (0..ROWS).rev() {
            visible = visible || board.content(row, col) == Some(Player::Agent);
            self.set_visible(row, col, visible);
        }
    }
}

impl Ord for VisibilityMask {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl PartialOrd for VisibilityMask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VisibilityMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            for col in 0..COLUMNS {
                f.write_str(if self.is_visible(row, col) { "1" } else { "0" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_below_agent_discs_are_revealed() {
        let board = Board::from_rows(
            &[
                ".......",
                ".......",
                ".......",
                "...X...",
                "...O...",
                "..OO...",
            ],
            Player::Agent,
        )
        .unwrap();
        let mask = VisibilityMask::observe(&board);
        assert!(mask.is_visible(2, 3));
        assert!(mask.is_visible(1, 3));
        assert!(mask.is_visible(0, 3));
        assert!(!mask.is_visible(3, 3));
        assert!(!mask.is_visible(0, 2));
        assert_eq!(mask.revealed_count(), 3);
    }

    #[test]
    fn full_column_is_revealed() {
        let mut board = Board::new(Player::Opponent);
        for _ in 0..ROWS {
            board.put_piece(0).unwrap();
        }
        let mask = VisibilityMask::HIDDEN.after_move(&board, 0);
        assert!((0..ROWS).all(|row| mask.is_visible(row, 0)));
    }

    #[test]
    fn game_over_reveals_everything() {
        let mut board = Board::new(Player::Opponent);
        for col in [0, 6, 0, 6, 0, 6, 0] {
            board.put_piece(col).unwrap();
        }
        assert!(board.is_game_over());
        assert!(VisibilityMask::observe(&board).is_fully_revealed());
        assert!(VisibilityMask::HIDDEN.after_move(&board, 0).is_fully_revealed());
    }

    #[test]
    fn after_move_matches_fresh_observation() {
        let mut board = Board::new(Player::Agent);
        let mut mask = VisibilityMask::HIDDEN;
        for col in [3, 3, 2, 4, 3, 2, 5] {
            board.put_piece(col).unwrap();
            mask = mask.after_move(&board, col);
            assert_eq!(mask, VisibilityMask::observe(&board));
        }
    }

    #[test]
    fn ordering_uses_byte_sequence() {
        let low_byte = VisibilityMask::from_bits(0b10);
        let high_byte = VisibilityMask::from_bits(1 << 40);
        // The first differing byte decides, so the low cell wins over the high one.
        assert!(high_byte < low_byte);
        assert_eq!(low_byte.to_bytes()[0], 0b10);
    }
}
