//! Static evaluation of one fully known board.

use super::params::HeuristicParams;
use fogfour_core::model::board::{AXES, Board, COLUMNS, ROWS};
use fogfour_core::model::player::Player;

/// The eight neighbours of a cell as `(row delta, column delta)`.
const NEIGHBOURS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Rays that can feed a double threat. Straight up never holds discs above a playable cell.
const THREAT_RAYS: [(isize, isize); 7] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 1),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct NeighbourCounts {
    own: usize,
    theirs: usize,
    empty: usize,
}

fn neighbour_counts(board: &Board, row: isize, col: isize, perspective: Player) -> NeighbourCounts {
    let mut counts = NeighbourCounts::default();
    for (dr, dc) in NEIGHBOURS {
        match board.get(row + dr, col + dc) {
            None => {}
            Some(None) => counts.empty += 1,
            Some(Some(player)) if player == perspective => counts.own += 1,
            Some(Some(_)) => counts.theirs += 1,
        }
    }
    counts
}

fn playable_cells(board: &Board) -> impl Iterator<Item = (isize, isize)> + '_ {
    (0..ROWS as isize)
        .flat_map(|row| (0..COLUMNS as isize).map(move |col| (row, col)))
        .filter(|&(row, col)| board.is_playable(row, col))
}

/// `perspective` can complete four in a row with its next disc.
pub fn has_win_threat(board: &Board, perspective: Player) -> bool {
    playable_cells(board).any(|(row, col)| {
        AXES.iter().any(|&(dr, dc)| {
            board.run_length(row, col, dr, dc, perspective)
                + board.run_length(row, col, -dr, -dc, perspective)
                >= 3
        })
    })
}

/// Some playable cell extends two separate two-disc runs of `perspective`, each of which
/// still has a playable cell to complete it on the far side.
pub fn has_double_threat(board: &Board, perspective: Player) -> bool {
    playable_cells(board).any(|(row, col)| {
        let open_rays = THREAT_RAYS
            .iter()
            .filter(|&&(dr, dc)| {
                board.run_length(row, col, dr, dc, perspective) >= 2
                    && ((dr, dc) == (-1, 0) || board.is_playable(row - dr, col - dc))
            })
            .count();
        open_rays >= 2
    })
}

/// Positional score of `board`; positive values favour `perspective`.
///
/// Every disc counts its cell weight plus a bonus for friendly and empty neighbours,
/// added for `perspective` and subtracted for the other side. Empty cells lean toward
/// whoever has more discs around them.
pub fn position_value(board: &Board, perspective: Player, params: &HeuristicParams) -> f64 {
    let mut value = 0.0;
    if has_win_threat(board, perspective) {
        value += params.win_threat_bonus;
    }
    if has_double_threat(board, perspective) {
        value += params.double_threat_bonus;
    }

    let empty_weight = params.empty_neighbour_weight();
    for row in 0..ROWS {
        for col in 0..COLUMNS {
            let counts = neighbour_counts(board, row as isize, col as isize, perspective);
            let weight = params.cell_weights[row][col];
            match board.content(row, col) {
                None => value += counts.own as f64 - counts.theirs as f64,
                Some(player) if player == perspective => {
                    value += weight
                        + params.neighbour_weight * counts.own as f64
                        + empty_weight * counts.empty as f64;
                }
                Some(_) => {
                    value -= weight
                        + params.neighbour_weight * counts.theirs as f64
                        + empty_weight * counts.empty as f64;
                }
            }
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(rows: [&str; ROWS], to_move: Player) -> Board {
        Board::from_rows(&rows, to_move).unwrap()
    }

    #[test]
    fn empty_board_is_neutral() {
        let board = Board::new(Player::Agent);
        let params = HeuristicParams::default();
        assert_eq!(position_value(&board, Player::Agent, &params), 0.0);
        assert_eq!(position_value(&board, Player::Opponent, &params), 0.0);
    }

    #[test]
    fn single_centre_disc() {
        let mut board = Board::new(Player::Agent);
        board.put_piece(3).unwrap();
        let params = HeuristicParams::default();
        // Cell weight 7, five empty neighbours at 2 each, five empty cells leaning our way.
        assert_eq!(position_value(&board, Player::Agent, &params), 22.0);
        assert_eq!(position_value(&board, Player::Opponent, &params), -22.0);
    }

    #[test]
    fn horizontal_three_is_a_win_threat() {
        let board = fixture(
            [
                ".......",
                ".......",
                ".......",
                ".......",
                "OO.....",
                "XXX...O",
            ],
            Player::Agent,
        );
        assert!(has_win_threat(&board, Player::Agent));
        assert!(!has_win_threat(&board, Player::Opponent));
        assert!(!has_double_threat(&board, Player::Agent));

        let params = HeuristicParams::default();
        let without_bonus = HeuristicParams {
            win_threat_bonus: 0.0,
            ..HeuristicParams::default()
        };
        assert_eq!(position_value(&board, Player::Agent, &params), 38.0);
        assert_eq!(position_value(&board, Player::Agent, &without_bonus), -12.0);
    }

    #[test]
    fn covered_threat_cell_does_not_count() {
        // The agent's row-one three ends above an empty cell; the opponent's does not.
        let board = fixture(
            [
                ".......",
                ".......",
                ".......",
                ".......",
                "XXX....",
                "OOO.X..",
            ],
            Player::Opponent,
        );
        assert!(!board.is_playable(1, 3));
        assert!(!has_win_threat(&board, Player::Agent));
        assert!(has_win_threat(&board, Player::Opponent));
        assert_eq!(
            position_value(&board, Player::Agent, &HeuristicParams::default()),
            50.0
        );
    }

    #[test]
    fn open_row_pair_over_column_pair_is_a_double_threat() {
        // Cell (2, 3) sits on two agent discs and extends the pair to its left, whose
        // far end (2, 4) is playable.
        let board = fixture(
            [
                ".......",
                ".......",
                ".......",
                ".XX....",
                ".OOXO..",
                "XOOXO..",
            ],
            Player::Agent,
        );
        assert!(has_double_threat(&board, Player::Agent));
        assert!(!has_double_threat(&board, Player::Opponent));
        assert!(!has_win_threat(&board, Player::Agent));

        let params = HeuristicParams::default();
        let without_bonus = HeuristicParams {
            double_threat_bonus: 0.0,
            ..HeuristicParams::default()
        };
        assert_eq!(position_value(&board, Player::Agent, &params), 15.0);
        assert_eq!(position_value(&board, Player::Agent, &without_bonus), -10.0);
        assert_eq!(position_value(&board, Player::Opponent, &params), 10.0);
    }
}
