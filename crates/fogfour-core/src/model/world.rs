use super::board::Board;
use std::cmp::Ordering;

/// A board together with the probability weight of it being the true position.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    board: Board,
    weight: f64,
}

impl World {
    pub fn new(board: Board, weight: f64) -> Self {
        Self { board, weight }
    }

    /// A position known with certainty.
    pub fn certain(board: Board) -> Self {
        Self::new(board, 1.0)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_parts(self) -> (Board, f64) {
        (self.board, self.weight)
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight.max(0.0);
    }

    pub fn add_weight(&mut self, delta: f64) {
        self.set_weight(self.weight + delta);
    }

    pub fn scale_weight(&mut self, factor: f64) {
        self.set_weight(self.weight * factor);
    }

    /// Board order first, weight as the tie-break.
    pub fn total_cmp(&self, other: &World) -> Ordering {
        self.board
            .cmp(&other.board)
            .then_with(|| self.weight.total_cmp(&other.weight))
    }
}
