use super::mask::VisibilityMask;
use crate::model::board::{Board, COLUMNS, ROWS};
use crate::model::player::Player;

/// Everything the agent perceives of a board: the revealed cells and their content.
///
/// Two boards with equal keys are indistinguishable to the agent and end up in the
/// same successor belief state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObservationKey {
    mask: VisibilityMask,
    agent_discs: u64,
    opponent_discs: u64,
}

impl ObservationKey {
    /// Key for `board` seen through `mask`.
    pub fn derive(board: &Board, mask: VisibilityMask) -> Self {
        let mut agent_discs = 0u64;
        let mut opponent_discs = 0u64;
        for row in 0..ROWS {
            for col in 0..COLUMNS {
                if !mask.is_visible(row, col) {
                    continue;
                }
                let bit = 1u64 << (row * COLUMNS + col);
                match board.content(row, col) {
                    Some(Player::Agent) => agent_discs |= bit,
                    Some(Player::Opponent) => opponent_discs |= bit,
                    None => {}
                }
            }
        }
        Self {
            mask,
            agent_discs,
            opponent_discs,
        }
    }

    /// Key for the true board, with the mask derived from scratch.
    pub fn observe(board: &Board) -> Self {
        Self::derive(board, VisibilityMask::observe(board))
    }

    pub fn mask(&self) -> VisibilityMask {
        self.mask
    }
}
