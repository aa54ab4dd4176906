use super::board::{Board, COLUMNS, ROWS};
use super::player::Player;
use serde::{Deserialize, Serialize};

/// Serializable view of a board, rows top first in the fixture notation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardSnapshot {
    pub rows: Vec<String>,
    pub to_move: Player,
    pub winner: Option<Player>,
    pub plies: usize,
}

impl BoardSnapshot {
    pub fn capture(board: &Board) -> Self {
        let rows = (0..ROWS)
            .rev()
            .map(|row| {
                (0..COLUMNS)
                    .map(|col| board.content(row, col).map(Player::glyph).unwrap_or('.'))
                    .collect()
            })
            .collect();
        Self {
            rows,
            to_move: board.to_move(),
            winner: board.winner(),
            plies: board.plies(),
        }
    }

    pub fn restore(&self) -> Result<Board, super::board::BoardError> {
        let rows: Vec<&str> = self.rows.iter().map(String::as_str).collect();
        Board::from_rows(&rows, self.to_move)
    }

    pub fn to_json(board: &Board) -> serde_json::Result<String> {
        serde_json::to_string(&Self::capture(board))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
