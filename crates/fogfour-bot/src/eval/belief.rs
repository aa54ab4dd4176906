use super::params::HeuristicParams;
use crate::search::memo::PositionMemo;
use fogfour_core::belief::BeliefState;
use fogfour_core::model::board::Board;
use fogfour_core::model::player::Player;

/// Members lighter than this contribute nothing.
pub const NEGLIGIBLE_WEIGHT: f64 = 1e-6;

/// Score of a finished game from `perspective`, before weighting.
///
/// A full board is scored by its four-in-a-row scan, with a draw counted as favourable.
/// A game that ended early was won by whoever just moved.
pub fn terminal_value(board: &Board, perspective: Player, params: &HeuristicParams) -> f64 {
    let favourable = if board.is_full() {
        board.scan_winner() != Some(perspective.other())
    } else {
        board.to_move() == perspective.other()
    };
    if favourable {
        params.terminal_value
    } else {
        -params.terminal_value
    }
}

/// Probability-weighted evaluation of every member of `belief`.
pub fn belief_value(
    belief: &BeliefState,
    perspective: Player,
    memo: &mut PositionMemo,
    params: &HeuristicParams,
) -> f64 {
    belief
        .worlds()
        .filter(|(_, weight)| *weight >= NEGLIGIBLE_WEIGHT)
        .map(|(board, weight)| {
            if board.is_game_over() {
                weight * terminal_value(board, perspective, params)
            } else {
                weight * memo.evaluate(board, perspective, params)
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fogfour_core::model::board::ROWS;
    use fogfour_core::model::world::World;

    const DRAWN: [&str; ROWS] = [
        "OXOOXXO",
        "XOXXOXX",
        "OXOOOXO",
        "XOXXXOX",
        "XOOOXOO",
        "XOOXXXO",
    ];

    fn single(board: Board, weight: f64) -> BeliefState {
        let mut belief = BeliefState::new(Default::default(), board.plies());
        belief.insert(World::new(board, weight));
        belief
    }

    #[test]
    fn full_board_draw_is_favourable() {
        let board = Board::from_rows(&DRAWN, Player::Agent).unwrap();
        assert!(board.is_full());
        assert_eq!(board.winner(), None);

        let mut memo = PositionMemo::new();
        let params = HeuristicParams::default();
        let value = belief_value(&single(board, 0.4), Player::Agent, &mut memo, &params);
        assert!((value - 40.0).abs() < 1e-9);
        assert!(memo.is_empty());
    }

    #[test]
    fn full_board_win_and_loss() {
        let mut won = DRAWN;
        won[0] = "XXXXXXO";
        let mut lost = DRAWN;
        lost[0] = "OOOOXXO";
        let params = HeuristicParams::default();
        let mut memo = PositionMemo::new();

        let won = Board::from_rows(&won, Player::Agent).unwrap();
        assert_eq!(won.winner(), Some(Player::Agent));
        let value = belief_value(&single(won, 0.5), Player::Agent, &mut memo, &params);
        assert!((value - 50.0).abs() < 1e-9);

        let lost = Board::from_rows(&lost, Player::Agent).unwrap();
        assert_eq!(lost.winner(), Some(Player::Opponent));
        let value = belief_value(&single(lost, 0.5), Player::Agent, &mut memo, &params);
        assert!((value + 50.0).abs() < 1e-9);
    }

    #[test]
    fn early_win_goes_to_the_side_that_just_moved() {
        let params = HeuristicParams::default();
        let mut memo = PositionMemo::new();

        let mut board = Board::new(Player::Agent);
        for col in [0, 1, 0, 1, 0, 1, 0] {
            board.put_piece(col).unwrap();
        }
        assert_eq!(board.to_move(), Player::Opponent);
        let value = belief_value(&single(board, 1.0), Player::Agent, &mut memo, &params);
        assert_eq!(value, 100.0);

        let mut board = Board::new(Player::Opponent);
        for col in [0, 1, 0, 1, 0, 1, 0] {
            board.put_piece(col).unwrap();
        }
        let value = belief_value(&single(board, 1.0), Player::Agent, &mut memo, &params);
        assert_eq!(value, -100.0);
    }

    #[test]
    fn negligible_members_are_skipped() {
        let mut board = Board::new(Player::Opponent);
        board.put_piece(3).unwrap();
        let params = HeuristicParams::default();
        let mut memo = PositionMemo::new();
        let value = belief_value(&single(board, 1e-7), Player::Agent, &mut memo, &params);
        assert_eq!(value, 0.0);
        assert!(memo.is_empty());
    }

    #[test]
    fn live_members_use_the_position_memo() {
        let mut board = Board::new(Player::Agent);
        board.put_piece(3).unwrap();
        let params = HeuristicParams::default();
        let mut memo = PositionMemo::new();
        let value = belief_value(&single(board.clone(), 0.5), Player::Agent, &mut memo, &params);
        assert!((value - 11.0).abs() < 1e-9);
        assert_eq!(memo.len(), 1);
        assert_eq!(memo.get(&board, Player::Agent), Some(22.0));
    }
}
