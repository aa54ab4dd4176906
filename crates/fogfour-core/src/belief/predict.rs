//! Probabilistic model of the opponent's reply and the belief update it induces.

use super::observation::ObservationKey;
use super::outcomes::Outcomes;
use super::state::{BeliefError, BeliefState};
use crate::model::board::{Board, CELL_WEIGHTS, COLUMNS, ROWS};
use crate::model::distribution::WeightedDistribution;
use crate::model::player::Player;
use crate::model::world::World;

/// How the opponent is assumed to pick a column on a fully known board.
#[derive(Debug, Clone, PartialEq)]
pub enum OpponentModel {
    /// Boundedly rational: always takes an immediate win, avoids columns that hand the
    /// agent a win on the next move whenever a safe column exists, and otherwise prefers
    /// columns whose landing cell has a high positional weight.
    Heuristic {
        cell_weights: [[f64; COLUMNS]; ROWS],
    },
    /// Every legal column is equally likely.
    Uniform,
}

impl Default for OpponentModel {
    fn default() -> Self {
        Self::heuristic()
    }
}

impl OpponentModel {
    pub fn heuristic() -> Self {
        let mut cell_weights = [[0.0; COLUMNS]; ROWS];
        for (row, weights) in CELL_WEIGHTS.iter().enumerate() {
            for (col, weight) in weights.iter().enumerate() {
                cell_weights[row][col] = f64::from(*weight);
            }
        }
        Self::Heuristic { cell_weights }
    }

    /// Desirability of dropping into `col`, before normalization.
    pub fn column_score(&self, board: &Board, col: usize) -> f64 {
        match self {
            Self::Heuristic { cell_weights } => board
                .landing_row(col)
                .map(|row| cell_weights[row][col])
                .unwrap_or(0.0),
            Self::Uniform => 1.0,
        }
    }

    /// Probability of each legal column being played on `board`.
    pub fn move_distribution(&self, board: &Board) -> Vec<(usize, f64)> {
        let legal: Vec<usize> = board.legal_columns().collect();
        if legal.is_empty() {
            return Vec::new();
        }
        if matches!(self, Self::Uniform) {
            return spread_evenly(legal);
        }

        let mut safe = Vec::new();
        let mut risky = Vec::new();
        let mut fewest_losses = usize::MAX;
        for &col in &legal {
            let mut next = board.clone();
            if next.put_piece(col).is_err() {
                continue;
            }
            if next.is_game_over() {
                return vec![(col, 1.0)];
            }
            let losses = losing_replies(&next);
            if losses == 0 {
                safe.push(col);
            } else if losses < fewest_losses {
                fewest_losses = losses;
                risky.clear();
                risky.push(col);
            } else if losses == fewest_losses {
                risky.push(col);
            }
        }

        if safe.is_empty() {
            return spread_evenly(risky);
        }

        let scores: Vec<f64> = safe
            .iter()
            .map(|&col| self.column_score(board, col))
            .collect();
        let distribution = WeightedDistribution::new(&scores);
        safe.into_iter()
            .enumerate()
            .map(|(index, col)| (col, distribution.probability(index)))
            .collect()
    }
}

/// Number of replies on `board` that end the game immediately.
fn losing_replies(board: &Board) -> usize {
    board
        .legal_columns()
        .filter(|&col| {
            let mut reply = board.clone();
            reply.put_piece(col).is_ok() && reply.is_game_over()
        })
        .count()
}

fn spread_evenly(columns: Vec<usize>) -> Vec<(usize, f64)> {
    let distribution = WeightedDistribution::uniform(columns.len());
    columns
        .into_iter()
        .enumerate()
        .map(|(index, col)| (col, distribution.probability(index)))
        .collect()
}

impl BeliefState {
    /// Expands every member board with the opponent's predicted replies under the
    /// default heuristic model.
    pub fn predict_opponent_moves(&self) -> Result<Outcomes, BeliefError> {
        self.predict_with(&OpponentModel::default())
    }

    /// Expands every member board with the replies `model` predicts, scaling each
    /// successor's weight by the reply probability, and buckets them by observation.
    pub fn predict_with(&self, model: &OpponentModel) -> Result<Outcomes, BeliefError> {
        self.ensure_turn(Player::Opponent)?;

        let mut outcomes = Outcomes::new();
        for (board, weight) in self.worlds() {
            for (col, probability) in model.move_distribution(board) {
                if probability <= 0.0 {
                    continue;
                }
                let mut next = board.clone();
                next.put_piece(col)?;
                let mask = self.mask().after_move(&next, col);
                let key = ObservationKey::derive(&next, mask);
                outcomes.insert(key, self.plies() + 1, World::new(next, weight * probability));
            }
        }
        Ok(outcomes)
    }
}
