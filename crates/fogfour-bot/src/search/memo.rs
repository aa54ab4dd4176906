//! Memo tables shared by every search an engine runs.

use crate::eval::{HeuristicParams, position_value};
use fogfour_core::belief::{BeliefState, CanonicalOrder};
use fogfour_core::model::board::Board;
use fogfour_core::model::player::Player;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Position values keyed by board and evaluating side. Weights never enter the key.
#[derive(Debug, Default)]
pub struct PositionMemo {
    entries: HashMap<(Board, Player), f64>,
}

impl PositionMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, board: &Board, perspective: Player) -> Option<f64> {
        self.entries.get(&(board.clone(), perspective)).copied()
    }

    /// Cached [`position_value`], computing and storing it on a miss.
    pub fn evaluate(
        &mut self,
        board: &Board,
        perspective: Player,
        params: &HeuristicParams,
    ) -> f64 {
        let key = (board.clone(), perspective);
        if let Some(value) = self.entries.get(&key) {
            return *value;
        }
        let value = position_value(board, perspective, params);
        if value.is_finite() {
            self.entries.insert(key, value);
        }
        value
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A belief state ordered by [`CanonicalOrder`], so states that differ only in
/// absolute probability mass land on the same map entry.
#[derive(Debug, Clone)]
pub struct CanonicalBelief(BeliefState);

impl CanonicalBelief {
    pub fn new(belief: BeliefState) -> Self {
        Self(belief)
    }

    pub fn belief(&self) -> &BeliefState {
        &self.0
    }
}

impl PartialEq for CanonicalBelief {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CanonicalBelief {}

impl PartialOrd for CanonicalBelief {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalBelief {
    fn cmp(&self, other: &Self) -> Ordering {
        CanonicalOrder::compare(&self.0, &other.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct StoredValue {
    value: f64,
    total_weight: f64,
}

/// Aggregate belief values with rescale-on-lookup.
///
/// A hit for a query of total weight `W'` against an entry stored at weight `W` with
/// value `V` returns `V * W' / W`.
#[derive(Debug, Default)]
pub struct BeliefMemo {
    entries: BTreeMap<CanonicalBelief, StoredValue>,
}

impl BeliefMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &CanonicalBelief) -> Option<f64> {
        let stored = self.entries.get(key)?;
        if stored.total_weight <= 0.0 {
            return None;
        }
        let value = stored.value * key.belief().total_weight() / stored.total_weight;
        value.is_finite().then_some(value)
    }

    pub fn get(&self, belief: &BeliefState) -> Option<f64> {
        self.lookup(&CanonicalBelief::new(belief.clone()))
    }

    /// Stores `value` for `key`. NaN and infinite values are refused and `false` is returned.
    pub fn store(&mut self, key: CanonicalBelief, value: f64) -> bool {
        let total_weight = key.belief().total_weight();
        if !value.is_finite() || !total_weight.is_finite() || total_weight <= 0.0 {
            return false;
        }
        self.entries.insert(key, StoredValue { value, total_weight });
        true
    }

    pub fn insert(&mut self, belief: &BeliefState, value: f64) -> bool {
        self.store(CanonicalBelief::new(belief.clone()), value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
