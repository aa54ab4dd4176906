use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::arena::{GameOutcome, GameResult};
use fogfour_core::model::player::Player;

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Running totals over the games of one run.
pub struct AnalyticsCollector {
    run_id: String,
    overall: ResultTally,
    agent_first: ResultTally,
    opponent_first: ResultTally,
    total_latency_ms: f64,
    total_decisions: u64,
    max_latency_ms: f64,
    total_plies: usize,
    peak_worlds: usize,
}

impl AnalyticsCollector {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            overall: ResultTally::default(),
            agent_first: ResultTally::default(),
            opponent_first: ResultTally::default(),
            total_latency_ms: 0.0,
            total_decisions: 0,
            max_latency_ms: 0.0,
            total_plies: 0,
            peak_worlds: 0,
        }
    }

    pub fn record_game(&mut self, outcome: &GameOutcome) {
        let result = outcome.result();
        self.overall.record(result);
        match outcome.agent_first {
            Player::Agent => self.agent_first.record(result),
            Player::Opponent => self.opponent_first.record(result),
        }
        self.total_latency_ms += outcome.decisions.total_ms;
        self.total_decisions += u64::from(outcome.decisions.decisions);
        self.max_latency_ms = self.max_latency_ms.max(outcome.decisions.max_ms);
        self.total_plies += outcome.moves.len();
        self.peak_worlds = self.peak_worlds.max(outcome.peak_worlds);
    }

    pub fn finalize(self) -> AnalyticsSummary {
        let games = self.overall.games();
        let win_rate = self.overall.win_rate();
        let average_ms_per_decision = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };
        let average_plies = if games == 0 {
            0.0
        } else {
            self.total_plies as f64 / games as f64
        };

        AnalyticsSummary {
            run_id: self.run_id,
            games,
            wins: self.overall.wins,
            draws: self.overall.draws,
            losses: self.overall.losses,
            win_rate,
            ci95: win_rate_interval(self.overall.wins, games),
            agent_first: self.agent_first,
            opponent_first: self.opponent_first,
            average_ms_per_decision,
            max_ms_per_decision: self.max_latency_ms,
            average_plies,
            peak_worlds: self.peak_worlds,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultTally {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

impl ResultTally {
    fn record(&mut self, result: GameResult) {
        match result {
            GameResult::Win => self.wins += 1,
            GameResult::Draw => self.draws += 1,
            GameResult::Loss => self.losses += 1,
        }
    }

    pub fn games(&self) -> usize {
        self.wins + self.draws + self.losses
    }

    pub fn win_rate(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            0.0
        } else {
            self.wins as f64 / games as f64
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub run_id: String,
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub ci95: (f64, f64),
    pub agent_first: ResultTally,
    pub opponent_first: ResultTally,
    pub average_ms_per_decision: f64,
    pub max_ms_per_decision: f64,
    pub average_plies: f64,
    pub peak_worlds: usize,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str(&format!("# Self-play Summary: {}\n\n", self.run_id));
        rows.push_str("| Games | Wins | Draws | Losses | Win % | 95% CI | Avg ms/decision | Max ms/decision | Avg plies | Peak worlds |\n");
        rows.push_str("|-------|------|-------|--------|-------|--------|-----------------|-----------------|-----------|-------------|\n");
        rows.push_str(&format!(
            "| {games} | {wins} | {draws} | {losses} | {win:.1}% | [{ci_low:.1}%, {ci_high:.1}%] | {avg:.2} | {max:.2} | {plies:.1} | {worlds} |\n",
            games = self.games,
            wins = self.wins,
            draws = self.draws,
            losses = self.losses,
            win = self.win_rate * 100.0,
            ci_low = self.ci95.0 * 100.0,
            ci_high = self.ci95.1 * 100.0,
            avg = self.average_ms_per_decision,
            max = self.max_ms_per_decision,
            plies = self.average_plies,
            worlds = self.peak_worlds,
        ));

        rows.push_str("\n## By first mover\n\n");
        rows.push_str("| First | Games | Wins | Draws | Losses | Win % |\n");
        rows.push_str("|-------|-------|------|-------|--------|-------|\n");
        for (label, tally) in [("agent", &self.agent_first), ("opponent", &self.opponent_first)] {
            rows.push_str(&format!(
                "| {label} | {games} | {wins} | {draws} | {losses} | {win:.1}% |\n",
                games = tally.games(),
                wins = tally.wins,
                draws = tally.draws,
                losses = tally.losses,
                win = tally.win_rate() * 100.0,
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

/// Normal-approximation interval for a win proportion, clamped to `[0, 1]`.
fn win_rate_interval(wins: usize, games: usize) -> (f64, f64) {
    if games == 0 {
        return (0.0, 0.0);
    }
    let n = games as f64;
    let p = wins as f64 / n;
    let z = Normal::new(0.0, 1.0)
        .map(|normal| normal.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0))
        .unwrap_or(1.96);
    let margin = z * (p * (1.0 - p) / n).sqrt();
    ((p - margin).max(0.0), (p + margin).min(1.0))
}
