use super::player::Player;
use core::fmt;
use thiserror::Error;

pub const ROWS: usize = 6;
pub const COLUMNS: usize = 7;
pub const CELLS: usize = ROWS * COLUMNS;

/// Discs in a row needed to win.
pub const CONNECT: usize = 4;

/// Number of four-in-a-row lines passing through each cell, bottom row first.
pub const CELL_WEIGHTS: [[u8; COLUMNS]; ROWS] = [
    [3, 4, 5, 7, 5, 4, 3],
    [4, 6, 8, 10, 8, 6, 4],
    [5, 8, 11, 13, 11, 8, 5],
    [5, 8, 11, 13, 11, 8, 5],
    [4, 6, 8, 10, 8, 6, 4],
    [3, 4, 5, 7, 5, 4, 3],
];

/// Line directions as `(row delta, column delta)`: horizontal, vertical and both diagonals.
pub const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("column {0} is outside the board")]
    ColumnOutOfRange(usize),
    #[error("column {0} is full")]
    ColumnFull(usize),
    #[error("the game is already over")]
    GameOver,
    #[error("fixture row {row}: {message}")]
    Fixture { row: usize, message: String },
}

/// A single fully determined position.
///
/// Cells are stored bottom row first. The derived ordering compares the cell contents
/// row-major, then the side to move; `heights` and `winner` are functions of the cells
/// and never break a tie on their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Board {
    cells: [[Option<Player>; COLUMNS]; ROWS],
    to_move: Player,
    heights: [u8; COLUMNS],
    winner: Option<Player>,
}

impl Board {
    pub fn new(first_to_move: Player) -> Self {
        Self {
            cells: [[None; COLUMNS]; ROWS],
            to_move: first_to_move,
            heights: [0; COLUMNS],
            winner: None,
        }
    }

    /// Parses a fixture: one string per row, top row first, `X` for the agent,
    /// `O` for the opponent and `.` for an empty cell.
    pub fn from_rows(rows: &[&str], to_move: Player) -> Result<Self, BoardError> {
        if rows.len() != ROWS {
            return Err(BoardError::Fixture {
                row: rows.len(),
                message: format!("expected {ROWS} rows"),
            });
        }

        let mut board = Self::new(to_move);
        for (line_index, line) in rows.iter().enumerate() {
            let row = ROWS - 1 - line_index;
            let glyphs: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if glyphs.len() != COLUMNS {
                return Err(BoardError::Fixture {
                    row,
                    message: format!("expected {COLUMNS} cells, found {}", glyphs.len()),
                });
            }
            for (col, glyph) in glyphs.into_iter().enumerate() {
                board.cells[row][col] = match glyph {
                    '.' | '_' => None,
                    other => match Player::from_glyph(other) {
                        Some(player) => Some(player),
                        None => {
                            return Err(BoardError::Fixture {
                                row,
                                message: format!("unknown cell glyph '{other}'"),
                            });
                        }
                    },
                };
            }
        }

        for col in 0..COLUMNS {
            let height = (0..ROWS)
                .take_while(|&row| board.cells[row][col].is_some())
                .count();
            if (height..ROWS).any(|row| board.cells[row][col].is_some()) {
                return Err(BoardError::Fixture {
                    row: height,
                    message: format!("floating disc in column {col}"),
                });
            }
            board.heights[col] = height as u8;
        }
        board.winner = board.scan_winner();
        Ok(board)
    }

    pub fn content(&self, row: usize, col: usize) -> Option<Player> {
        self.cells[row][col]
    }

    /// Signed lookup that returns `None` outside the board.
    pub fn get(&self, row: isize, col: isize) -> Option<Option<Player>> {
        if Self::contains(row, col) {
            Some(self.cells[row as usize][col as usize])
        } else {
            None
        }
    }

    pub const fn contains(row: isize, col: isize) -> bool {
        row >= 0 && row < ROWS as isize && col >= 0 && col < COLUMNS as isize
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn plies(&self) -> usize {
        self.heights.iter().map(|h| *h as usize).sum()
    }

    pub fn height(&self, col: usize) -> usize {
        self.heights[col] as usize
    }

    /// Row a disc dropped in `col` would land in, if the column has room.
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        let height = self.height(col);
        (height < ROWS).then_some(height)
    }

    pub fn is_column_full(&self, col: usize) -> bool {
        self.height(col) >= ROWS
    }

    pub fn is_full(&self) -> bool {
        (0..COLUMNS).all(|col| self.is_column_full(col))
    }

    pub fn is_game_over(&self) -> bool {
        self.winner.is_some() || self.is_full()
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn legal_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..COLUMNS).filter(move |&col| !self.is_game_over() && !self.is_column_full(col))
    }

    /// Empty cell that a disc could occupy on the next move.
    pub fn is_playable(&self, row: isize, col: isize) -> bool {
        match self.get(row, col) {
            Some(None) => row == 0 || self.cells[row as usize - 1][col as usize].is_some(),
            _ => false,
        }
    }

    /// Counts consecutive `player` discs starting one step away from `(row, col)`
    /// in direction `(dr, dc)`.
    pub fn run_length(
        &self,
        row: isize,
        col: isize,
        dr: isize,
        dc: isize,
        player: Player,
    ) -> usize {
        let mut count = 0;
        let (mut r, mut c) = (row + dr, col + dc);
        while self.get(r, c) == Some(Some(player)) {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    pub fn put_piece(&mut self, col: usize) -> Result<(), BoardError> {
        if col >= COLUMNS {
            return Err(BoardError::ColumnOutOfRange(col));
        }
        if self.is_game_over() {
            return Err(BoardError::GameOver);
        }
        let Some(row) = self.landing_row(col) else {
            return Err(BoardError::ColumnFull(col));
        };

        let player = self.to_move;
        self.cells[row][col] = Some(player);
        self.heights[col] += 1;
        if self.completes_line(row, col, player) {
            self.winner = Some(player);
        }
        self.to_move = player.other();
        Ok(())
    }

    /// Full terminal scan over every row, column and both diagonal directions.
    pub fn scan_winner(&self) -> Option<Player> {
        for row in 0..ROWS as isize {
            for col in 0..COLUMNS as isize {
                let Some(Some(player)) = self.get(row, col) else {
                    continue;
                };
                for (dr, dc) in AXES {
                    if self.run_length(row, col, dr, dc, player) + 1 >= CONNECT {
                        return Some(player);
                    }
                }
            }
        }
        None
    }

    fn completes_line(&self, row: usize, col: usize, player: Player) -> bool {
        let (row, col) = (row as isize, col as isize);
        AXES.iter().any(|&(dr, dc)| {
            self.run_length(row, col, dr, dc, player)
                + self.run_length(row, col, -dr, -dc, player)
                + 1
                >= CONNECT
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            for col in 0..COLUMNS {
                let glyph = self.cells[row][col].map(Player::glyph).unwrap_or('.');
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        write!(f, "to move: {}", self.to_move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_all(board: &mut Board, columns: &[usize]) {
        for &col in columns {
            board.put_piece(col).unwrap();
        }
    }

    #[test]
    fn pieces_stack_from_the_bottom() {
        let mut board = Board::new(Player::Agent);
        drop_all(&mut board, &[3, 3]);
        assert_eq!(board.content(0, 3), Some(Player::Agent));
        assert_eq!(board.content(1, 3), Some(Player::Opponent));
        assert_eq!(board.height(3), 2);
        assert_eq!(board.plies(), 2);
        assert_eq!(board.to_move(), Player::Agent);
    }

    #[test]
    fn full_column_rejects_more_pieces() {
        let mut board = Board::new(Player::Agent);
        drop_all(&mut board, &[0; ROWS]);
        assert!(board.is_column_full(0));
        assert_eq!(board.put_piece(0), Err(BoardError::ColumnFull(0)));
        assert_eq!(board.put_piece(COLUMNS), Err(BoardError::ColumnOutOfRange(COLUMNS)));
        assert!(!board.legal_columns().any(|col| col == 0));
    }

    #[test]
    fn detects_horizontal_win() {
        let mut board = Board::new(Player::Agent);
        drop_all(&mut board, &[0, 0, 1, 1, 2, 2, 3]);
        assert_eq!(board.winner(), Some(Player::Agent));
        assert!(board.is_game_over());
        assert_eq!(board.put_piece(4), Err(BoardError::GameOver));
        assert_eq!(board.legal_columns().count(), 0);
    }

    #[test]
    fn detects_diagonal_win() {
        let board = Board::from_rows(
            &[
                ".......",
                ".......",
                "...O...",
                "..OX...",
                ".OXX...",
                "OXXX...",
            ],
            Player::Agent,
        )
        .unwrap();
        assert_eq!(board.scan_winner(), Some(Player::Opponent));
        assert_eq!(board.winner(), Some(Player::Opponent));
    }

    #[test]
    fn put_piece_detects_vertical_win_for_opponent() {
        let mut board = Board::new(Player::Agent);
        drop_all(&mut board, &[0, 6, 1, 6, 0, 6, 1, 6]);
        assert_eq!(board.winner(), Some(Player::Opponent));
    }

    #[test]
    fn fixture_rejects_floating_discs() {
        let err = Board::from_rows(
            &[
                ".......",
                ".......",
                ".......",
                ".......",
                "...X...",
                ".......",
            ],
            Player::Agent,
        )
        .unwrap_err();
        assert!(matches!(err, BoardError::Fixture { .. }));
    }

    #[test]
    fn playable_cells_need_support() {
        let board = Board::from_rows(
            &[
                ".......",
                ".......",
                ".......",
                ".......",
                ".......",
                "X......",
            ],
            Player::Opponent,
        )
        .unwrap();
        assert!(board.is_playable(1, 0));
        assert!(board.is_playable(0, 1));
        assert!(!board.is_playable(1, 1));
        assert!(!board.is_playable(0, 0));
        assert!(!board.is_playable(0, -1));
    }

    #[test]
    fn ordering_follows_content_then_turn() {
        let mut left = Board::new(Player::Agent);
        left.put_piece(0).unwrap();
        let mut right = Board::new(Player::Agent);
        right.put_piece(1).unwrap();
        assert_ne!(left.cmp(&right), core::cmp::Ordering::Equal);

        let a = Board::new(Player::Agent);
        let b = Board::new(Player::Opponent);
        assert!(b < a);
        assert_eq!(a.clone().cmp(&a), core::cmp::Ordering::Equal);
    }

    #[test]
    fn display_prints_top_row_first() {
        let mut board = Board::new(Player::Agent);
        board.put_piece(0).unwrap();
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[ROWS - 1], "X......");
        assert_eq!(lines[0], ".......");
    }
}
