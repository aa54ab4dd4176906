use fogfour_core::belief::OpponentModel;
use fogfour_core::model::board::Board;
use fogfour_core::model::distribution::WeightedDistribution;
use rand::{SeedableRng, rngs::StdRng};

use crate::config::OpponentKind;

/// The agent's adversary. Unlike the agent it sees the whole board.
pub struct SimulatedOpponent {
    model: OpponentModel,
    rng: StdRng,
}

impl SimulatedOpponent {
    pub fn new(kind: OpponentKind, seed: u64) -> Self {
        Self {
            model: kind.model(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Samples a column from the model's distribution; `None` once no column is legal.
    pub fn choose_column(&mut self, board: &Board) -> Option<usize> {
        let distribution = self.model.move_distribution(board);
        let probabilities: Vec<f64> = distribution.iter().map(|(_, p)| *p).collect();
        let index = WeightedDistribution::new(&probabilities).sample(&mut self.rng)?;
        distribution.get(index).map(|(col, _)| *col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fogfour_core::model::player::Player;

    #[test]
    fn takes_an_immediate_win() {
        let board = Board::from_rows(
            &[
                ".......",
                ".......",
                ".......",
                "O......",
                "O......",
                "OXX.X..",
            ],
            Player::Opponent,
        )
        .unwrap();
        let mut opponent = SimulatedOpponent::new(OpponentKind::Model, 7);
        for _ in 0..16 {
            assert_eq!(opponent.choose_column(&board), Some(0));
        }
    }

    #[test]
    fn same_seed_replays_the_same_columns() {
        let board = Board::new(Player::Opponent);
        let mut left = SimulatedOpponent::new(OpponentKind::Uniform, 99);
        let mut right = SimulatedOpponent::new(OpponentKind::Uniform, 99);
        let a: Vec<_> = (0..32).map(|_| left.choose_column(&board)).collect();
        let b: Vec<_> = (0..32).map(|_| right.choose_column(&board)).collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|col| matches!(col, Some(c) if *c < 7)));
    }

    #[test]
    fn finished_board_has_no_move() {
        let board = Board::from_rows(
            &[
                ".......",
                ".......",
                "X......",
                "XO.....",
                "XO.....",
                "XO.....",
            ],
            Player::Opponent,
        )
        .unwrap();
        assert!(board.is_game_over());
        let mut opponent = SimulatedOpponent::new(OpponentKind::Model, 1);
        assert_eq!(opponent.choose_column(&board), None);
    }
}
