//! Weighted sets of boards the agent cannot tell apart.

use super::mask::VisibilityMask;
use super::observation::ObservationKey;
use super::outcomes::Outcomes;
use crate::model::board::{Board, BoardError, COLUMNS};
use crate::model::player::Player;
use crate::model::world::World;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Tolerance on normalized weights when comparing two belief states.
pub const PROBABILITY_EPSILON: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeliefError {
    #[error("it is not the agent's turn to move")]
    NotAgentTurn,
    #[error("it is not the opponent's turn to move")]
    NotOpponentTurn,
    #[error("every world in the belief state has already finished")]
    GameOver,
    #[error("belief state holds no worlds")]
    Empty,
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Boards sharing one visibility mask and ply count, each with a probability weight.
///
/// Structurally identical boards are stored once; inserting a duplicate adds its weight
/// to the existing entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefState {
    worlds: BTreeMap<Board, f64>,
    mask: VisibilityMask,
    plies: usize,
}

impl BeliefState {
    pub fn new(mask: VisibilityMask, plies: usize) -> Self {
        Self {
            worlds: BTreeMap::new(),
            mask,
            plies,
        }
    }

    /// Start of a game: one empty board known with certainty.
    pub fn initial(first_to_move: Player) -> Self {
        Self::from_board(Board::new(first_to_move))
    }

    /// A single board known with certainty, masked the way the agent would see it.
    pub fn from_board(board: Board) -> Self {
        let mut belief = Self::new(VisibilityMask::observe(&board), board.plies());
        belief.insert(World::certain(board));
        belief
    }

    pub fn insert(&mut self, world: World) {
        let (board, weight) = world.into_parts();
        *self.worlds.entry(board).or_insert(0.0) += weight;
    }

    pub fn contains(&self, board: &Board) -> bool {
        self.worlds.contains_key(board)
    }

    pub fn weight_of(&self, board: &Board) -> Option<f64> {
        self.worlds.get(board).copied()
    }

    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }

    /// Member boards in board order with their weights.
    pub fn worlds(&self) -> impl Iterator<Item = (&Board, f64)> + '_ {
        self.worlds.iter().map(|(board, weight)| (board, *weight))
    }

    pub fn total_weight(&self) -> f64 {
        self.worlds.values().sum()
    }

    pub fn mask(&self) -> VisibilityMask {
        self.mask
    }

    pub fn plies(&self) -> usize {
        self.plies
    }

    /// Side to move. Every member board agrees since they share a ply count.
    pub fn turn(&self) -> Option<Player> {
        self.worlds.keys().next().map(Board::to_move)
    }

    pub fn is_game_over(&self) -> bool {
        self.worlds.keys().all(Board::is_game_over)
    }

    pub fn is_full(&self) -> bool {
        self.worlds.keys().next().is_some_and(Board::is_full)
    }

    /// Columns with room left. Column fullness is revealed, so members agree on it.
    pub fn legal_columns(&self) -> Vec<usize> {
        if self.is_game_over() {
            return Vec::new();
        }
        match self.worlds.keys().next() {
            Some(board) => (0..COLUMNS).filter(|&col| !board.is_column_full(col)).collect(),
            None => Vec::new(),
        }
    }

    /// Deep copy without the members lighter than `min_weight`.
    pub fn pruned(&self, min_weight: f64) -> BeliefState {
        Self {
            worlds: self
                .worlds
                .iter()
                .filter(|(_, weight)| **weight >= min_weight)
                .map(|(board, weight)| (board.clone(), *weight))
                .collect(),
            mask: self.mask,
            plies: self.plies,
        }
    }

    /// Rescales weights to sum to one. Does nothing when the total mass is zero.
    pub fn normalize(&mut self) {
        let total = self.total_weight();
        if total <= 0.0 {
            return;
        }
        for weight in self.worlds.values_mut() {
            *weight /= total;
        }
    }

    /// Drops an agent disc into `column` in every member board and buckets the
    /// results by what the agent would observe afterwards.
    pub fn apply_own_move(&self, column: usize) -> Result<Outcomes, BeliefError> {
        self.ensure_turn(Player::Agent)?;

        let mut outcomes = Outcomes::new();
        for (board, weight) in self.worlds() {
            let mut next = board.clone();
            next.put_piece(column)?;
            let mask = self.mask.after_move(&next, column);
            let key = ObservationKey::derive(&next, mask);
            outcomes.insert(key, self.plies + 1, World::new(next, weight));
        }
        Ok(outcomes)
    }

    pub(crate) fn ensure_turn(&self, expected: Player) -> Result<(), BeliefError> {
        if self.is_empty() {
            return Err(BeliefError::Empty);
        }
        if self.is_game_over() {
            return Err(BeliefError::GameOver);
        }
        match (self.turn(), expected) {
            (Some(turn), _) if turn == expected => Ok(()),
            (_, Player::Agent) => Err(BeliefError::NotAgentTurn),
            (_, Player::Opponent) => Err(BeliefError::NotOpponentTurn),
        }
    }

    /// Three-way comparison under [`CanonicalOrder`].
    pub fn canonical_cmp(&self, other: &BeliefState) -> Ordering {
        CanonicalOrder::compare(self, other)
    }
}

/// Ordering used to decide whether two belief states are the same for caching.
///
/// Compares ply count, visibility mask bytes, member count, member boards pairwise, and
/// finally each member's weight divided by its belief state's total weight. Normalized
/// weights within [`PROBABILITY_EPSILON`] of each other compare equal, so two states that
/// differ only in absolute probability mass are the same state.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalOrder;

impl CanonicalOrder {
    pub fn compare(left: &BeliefState, right: &BeliefState) -> Ordering {
        left.plies
            .cmp(&right.plies)
            .then_with(|| left.mask.cmp(&right.mask))
            .then_with(|| left.len().cmp(&right.len()))
            .then_with(|| left.worlds.keys().cmp(right.worlds.keys()))
            .then_with(|| Self::compare_distributions(left, right))
    }

    fn compare_distributions(left: &BeliefState, right: &BeliefState) -> Ordering {
        let left_total = left.total_weight();
        let right_total = right.total_weight();
        for (left_weight, right_weight) in left.worlds.values().zip(right.worlds.values()) {
            let a = normalized(*left_weight, left_total);
            let b = normalized(*right_weight, right_total);
            if (a - b).abs() > PROBABILITY_EPSILON {
                return a.total_cmp(&b);
            }
        }
        Ordering::Equal
    }
}

fn normalized(weight: f64, total: f64) -> f64 {
    if total > 0.0 { weight / total } else { 0.0 }
}

impl fmt::Display for BeliefState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "BeliefState: size = {} plies = {} mass = {:.4}",
            self.len(),
            self.plies,
            self.total_weight()
        )?;
        write!(f, "{}", self.mask)?;
        for (board, weight) in self.worlds() {
            writeln!(f, "weight {weight:.4}")?;
            writeln!(f, "{board}")?;
        }
        Ok(())
    }
}
