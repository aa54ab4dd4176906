//! AND-OR search over belief states.
//!
//! The OR layer maximizes over the agent's columns. The AND layer sums over the
//! observation buckets a column can lead to, each bucket holding the worlds left after
//! the agent's drop and the opponent's predicted reply. Both layers score from the
//! agent's side; the opponent only enters through the prediction weights.

mod config;
pub mod memo;
mod stats;

pub use config::SearchConfig;
pub use memo::{BeliefMemo, CanonicalBelief, PositionMemo};
pub use stats::SearchStats;

use crate::eval::{HeuristicParams, belief_value};
use fogfour_core::belief::{BeliefError, BeliefState, OpponentModel};
use fogfour_core::model::board::COLUMNS;
use fogfour_core::model::player::Player;
use std::time::Instant;
use thiserror::Error;
use tracing::{Level, event};

/// Value left in columns that were not searched. Never selected over a searched column.
pub const UNEVALUATED: f64 = -100_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("no legal moves to choose from")]
    NoLegalMoves,
    #[error(transparent)]
    Belief(#[from] BeliefError),
}

/// Index of the largest value; ties go to the lowest index. NaN never wins over a number.
pub fn max_index(values: &[f64]) -> Result<usize, SearchError> {
    if values.is_empty() {
        return Err(SearchError::NoLegalMoves);
    }
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values.iter().copied().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((index, value)),
        }
    }
    Ok(best.map_or(0, |(index, _)| index))
}

/// Long-lived search state: both memo tables, the search counter used by the depth
/// schedule, and the statistics of the last decision.
#[derive(Debug)]
pub struct SearchEngine {
    config: SearchConfig,
    params: HeuristicParams,
    model: OpponentModel,
    positions: PositionMemo,
    beliefs: BeliefMemo,
    searches: u64,
    deadline: Option<Instant>,
    stats: SearchStats,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default(), HeuristicParams::default())
    }
}

impl SearchEngine {
    pub fn new(config: SearchConfig, params: HeuristicParams) -> Self {
        Self {
            config,
            params,
            model: OpponentModel::default(),
            positions: PositionMemo::new(),
            beliefs: BeliefMemo::new(),
            searches: 0,
            deadline: None,
            stats: SearchStats::default(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(SearchConfig::from_env(), HeuristicParams::from_env())
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn params(&self) -> &HeuristicParams {
        &self.params
    }

    pub fn model(&self) -> &OpponentModel {
        &self.model
    }

    /// Completed `find_next_move` calls.
    pub fn searches(&self) -> u64 {
        self.searches
    }

    pub fn last_stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Entry counts of the position memo and the belief memo.
    pub fn memo_sizes(&self) -> (usize, usize) {
        (self.positions.len(), self.beliefs.len())
    }

    pub fn clear_memos(&mut self) {
        self.positions.clear();
        self.beliefs.clear();
    }

    /// Picks the agent's column for `belief` at the depth the schedule gives.
    pub fn find_next_move(&mut self, belief: &BeliefState) -> Result<usize, SearchError> {
        let legal = belief.legal_columns();
        if legal.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }

        let max_depth = self.config.depth_for(self.searches);
        let started = Instant::now();
        self.stats = SearchStats {
            max_depth,
            ..SearchStats::default()
        };
        self.deadline = self.config.time_cap().map(|cap| started + cap);
        let result = self.or_search(belief, 0, max_depth);
        self.deadline = None;
        let values = result?;
        self.searches += 1;

        self.stats.elapsed = started.elapsed();
        self.stats.values = values.to_vec();
        // Only playable columns compete, so the sentinel of a full column is never picked.
        let playable: Vec<f64> = legal.iter().map(|&col| values[col]).collect();
        let column = legal[max_index(&playable)?];
        log_decision(belief, column, &self.stats);
        Ok(column)
    }

    /// Value of every column for the agent; unplayable, unsearched or non-finite columns
    /// hold [`UNEVALUATED`].
    pub fn or_search(
        &mut self,
        belief: &BeliefState,
        depth: usize,
        max_depth: usize,
    ) -> Result<[f64; COLUMNS], SearchError> {
        self.stats.or_nodes += 1;
        let mut values = [UNEVALUATED; COLUMNS];
        let mut searched_any = false;
        for col in belief.legal_columns() {
            if searched_any && self.deadline_passed() {
                break;
            }
            let successors = self.successors(belief, col)?;
            let value = self.and_search(&successors, depth + 1, max_depth)?;
            values[col] = if value.is_finite() { value } else { UNEVALUATED };
            searched_any = true;
        }
        Ok(values)
    }

    /// Sum of the values of `beliefs`, each taken from the memo, evaluated directly at the
    /// depth limit or at the end of the game, or maximized over a nested OR layer.
    pub fn and_search(
        &mut self,
        beliefs: &[BeliefState],
        depth: usize,
        max_depth: usize,
    ) -> Result<f64, SearchError> {
        let mut total = 0.0;
        for belief in beliefs {
            self.stats.and_nodes += 1;
            let key = CanonicalBelief::new(belief.clone());
            if let Some(value) = self.beliefs.lookup(&key) {
                self.stats.memo_hits += 1;
                total += value;
                continue;
            }
            self.stats.memo_misses += 1;

            let value = if depth >= max_depth || belief.is_game_over() || belief.is_full() {
                self.stats.leaf_evaluations += 1;
                belief_value(belief, Player::Agent, &mut self.positions, &self.params)
            } else {
                let values = self.or_search(belief, depth, max_depth)?;
                values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            };

            // A cut-short subtree is only a lower bound.
            if !self.stats.timed_out {
                self.beliefs.store(key, value);
            }
            total += value;
        }
        Ok(total)
    }

    /// Belief states reachable by dropping into `col`: the agent's move, then the
    /// predicted opponent reply for every bucket that is still live, with light members
    /// pruned and emptied buckets dropped. Finished buckets pass through unchanged.
    pub fn successors(
        &mut self,
        belief: &BeliefState,
        col: usize,
    ) -> Result<Vec<BeliefState>, SearchError> {
        let mut successors = Vec::new();
        for bucket in belief.apply_own_move(col)? {
            if bucket.is_game_over() {
                successors.push(bucket);
                continue;
            }
            for predicted in bucket.predict_with(&self.model)? {
                let pruned = predicted.pruned(self.config.prune_threshold);
                self.stats.pruned_members += (predicted.len() - pruned.len()) as u64;
                if !pruned.is_empty() {
                    successors.push(pruned);
                }
            }
        }
        Ok(successors)
    }

    fn deadline_passed(&mut self) -> bool {
        if self.stats.timed_out {
            return true;
        }
        let Some(deadline) = self.deadline else {
            return false;
        };
        if Instant::now() >= deadline {
            self.stats.timed_out = true;
        }
        self.stats.timed_out
    }
}

fn log_decision(belief: &BeliefState, column: usize, stats: &SearchStats) {
    if stats.timed_out {
        tracing::warn!(
            target: "fogfour_bot::search",
            plies = belief.plies(),
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "search stopped at the time cap"
        );
    }

    if !tracing::enabled!(Level::INFO) {
        return;
    }

    let values = stats
        .values
        .iter()
        .map(|value| {
            if *value <= UNEVALUATED {
                "-".to_string()
            } else {
                format!("{value:.2}")
            }
        })
        .collect::<Vec<_>>()
        .join(",");

    event!(
        target: "fogfour_bot::search",
        Level::INFO,
        plies = belief.plies(),
        worlds = belief.len(),
        max_depth = stats.max_depth,
        column,
        values = %values,
        or_nodes = stats.or_nodes,
        and_nodes = stats.and_nodes,
        memo_hit_rate = stats.memo_hit_rate(),
        pruned = stats.pruned_members,
        elapsed_us = stats.elapsed.as_micros() as u64,
    );
}
