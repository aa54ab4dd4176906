mod opponent;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fogfour_bot::{Agent, AgentError, HeuristicParams, SearchConfig, SearchEngine};
use fogfour_core::model::board::{Board, BoardError};
use fogfour_core::model::player::Player;
use fogfour_core::model::snapshot::BoardSnapshot;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, ResolvedOutputs};

pub use opponent::SimulatedOpponent;

/// Plays the configured number of games between one agent and a simulated opponent.
pub struct ArenaRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    search: SearchConfig,
    params: HeuristicParams,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

impl ArenaRunner {
    /// Build a runner from a validated configuration. Search settings start from the
    /// `FOG_SEARCH_*`/`FOG_EVAL_*` environment and take the YAML overrides on top.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Self {
        let search = config.search.apply(SearchConfig::from_env());
        Self {
            logging_enabled: config.logging.enable_structured,
            search,
            params: HeuristicParams::from_env(),
            config,
            outputs,
        }
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    /// Execute every game, streaming one JSONL row per game to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut analytics = AnalyticsCollector::new(&self.config.run_id);
        let mut agent = Agent::new(SearchEngine::new(self.search, self.params.clone()));
        let mut rows_written = 0usize;

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            let search = agent.engine().config();
            let params = agent.engine().params();
            event!(
                target: "fogfour_bench::run",
                Level::INFO,
                run_id = %self.config.run_id,
                games = self.config.games.count,
                opponent = ?self.config.opponent.kind,
                shallow_depth = search.shallow_depth,
                deep_depth = search.deep_depth,
                deep_after = search.deep_after,
                alpha = params.alpha,
                neighbour_weight = params.neighbour_weight,
                win_threat_bonus = params.win_threat_bonus,
                double_threat_bonus = params.double_threat_bonus,
                terminal_value = params.terminal_value,
                "agent ready"
            );
        }

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();
            let first = self.config.games.agent_first.for_game(game_index);
            let mut opponent = SimulatedOpponent::new(self.config.opponent.kind, game_seed);

            let outcome = self.play_game(&mut agent, &mut opponent, game_index, first)?;
            analytics.record_game(&outcome);
            write_game_row(&mut writer, &self.config.run_id, game_seed, &outcome)?;
            rows_written += 1;
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        Ok(RunSummary {
            games_played: summary.games,
            rows_written,
            wins: summary.wins,
            draws: summary.draws,
            losses: summary.losses,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn play_game(
        &self,
        agent: &mut Agent,
        opponent: &mut SimulatedOpponent,
        game_index: usize,
        first: Player,
    ) -> Result<GameOutcome, RunnerError> {
        agent.reset(first);
        let mut board = Board::new(first);
        let mut moves = Vec::new();
        let mut metrics = DecisionMetrics::default();
        let mut peak_worlds = agent.belief().len();

        while !board.is_game_over() {
            let col = match board.to_move() {
                Player::Agent => {
                    let start = Instant::now();
                    let col = agent.choose_column()?;
                    let elapsed_ms = metrics.record(start.elapsed());
                    board.put_piece(col)?;
                    agent.observe_own_move(col, &board)?;

                    if self.logging_enabled && tracing::enabled!(Level::INFO) {
                        let stats = agent.engine().last_stats();
                        event!(
                            target: "fogfour_bench::decision",
                            Level::INFO,
                            run_id = %self.config.run_id,
                            game_index = game_index as u32,
                            ply = board.plies() as u32,
                            column = col as u32,
                            worlds = agent.belief().len() as u32,
                            or_nodes = stats.or_nodes,
                            and_nodes = stats.and_nodes,
                            elapsed_ms
                        );
                    }
                    col
                }
                Player::Opponent => {
                    let col = opponent.choose_column(&board).ok_or_else(|| {
                        RunnerError::game(format!(
                            "opponent has no legal column at ply {}",
                            board.plies()
                        ))
                    })?;
                    board.put_piece(col)?;
                    agent.observe_opponent_move(&board)?;
                    col
                }
            };
            moves.push(col);
            peak_worlds = peak_worlds.max(agent.belief().len());
        }

        let outcome = GameOutcome {
            game_index,
            agent_first: first,
            winner: board.winner(),
            moves,
            decisions: metrics.finalize(),
            peak_worlds,
            final_board: board,
        };

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "fogfour_bench::game",
                Level::INFO,
                run_id = %self.config.run_id,
                game_index = game_index as u32,
                agent_first = %first,
                result = outcome.result().as_str(),
                plies = outcome.moves.len() as u32,
                peak_worlds = outcome.peak_worlds as u32
            );
        }

        Ok(outcome)
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_row(
    writer: &mut BufWriter<File>,
    run_id: &str,
    game_seed: u64,
    outcome: &GameOutcome,
) -> Result<(), RunnerError> {
    let row = GameLogRow {
        run_id: run_id.to_string(),
        game_index: outcome.game_index,
        game_seed,
        agent_first: outcome.agent_first,
        winner: outcome.winner,
        result: outcome.result(),
        plies: outcome.moves.len(),
        moves: outcome.moves.clone(),
        decisions: outcome.decisions.decisions,
        avg_ms_per_decision: outcome.decisions.avg_ms_per_decision,
        max_ms_per_decision: outcome.decisions.max_ms,
        peak_worlds: outcome.peak_worlds,
        final_board: BoardSnapshot::capture(&outcome.final_board),
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Result of one game from the agent's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win,
    Draw,
    Loss,
}

impl GameResult {
    pub fn from_winner(winner: Option<Player>) -> Self {
        match winner {
            Some(Player::Agent) => GameResult::Win,
            Some(Player::Opponent) => GameResult::Loss,
            None => GameResult::Draw,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::Win => "win",
            GameResult::Draw => "draw",
            GameResult::Loss => "loss",
        }
    }
}

pub struct GameOutcome {
    pub game_index: usize,
    pub agent_first: Player,
    pub winner: Option<Player>,
    pub moves: Vec<usize>,
    pub decisions: DecisionSummary,
    pub peak_worlds: usize,
    pub final_board: Board,
}

impl GameOutcome {
    pub fn result(&self) -> GameResult {
        GameResult::from_winner(self.winner)
    }
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    max: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        self.total += duration;
        self.max = self.max.max(duration);
        self.decisions += 1;
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
            max_ms: self.max.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
    pub max_ms: f64,
}

#[derive(Serialize)]
struct GameLogRow {
    run_id: String,
    game_index: usize,
    game_seed: u64,
    agent_first: Player,
    winner: Option<Player>,
    result: GameResult,
    plies: usize,
    moves: Vec<usize>,
    decisions: u32,
    avg_ms_per_decision: f64,
    max_ms_per_decision: f64,
    peak_worlds: usize,
    final_board: BoardSnapshot,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("agent failed: {0}")]
    Agent(#[from] AgentError),
    #[error("illegal move: {0}")]
    Board(#[from] BoardError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_follow_the_winner() {
        assert_eq!(GameResult::from_winner(Some(Player::Agent)), GameResult::Win);
        assert_eq!(GameResult::from_winner(Some(Player::Opponent)), GameResult::Loss);
        assert_eq!(GameResult::from_winner(None), GameResult::Draw);
    }

    #[test]
    fn decision_metrics_track_average_and_max() {
        let mut metrics = DecisionMetrics::default();
        metrics.record(Duration::from_millis(2));
        metrics.record(Duration::from_millis(6));
        let summary = metrics.finalize();
        assert_eq!(summary.decisions, 2);
        assert!((summary.avg_ms_per_decision - 4.0).abs() < 1e-9);
        assert!((summary.max_ms - 6.0).abs() < 1e-9);
        assert!((summary.total_ms - 8.0).abs() < 1e-9);
    }

    #[test]
    fn empty_metrics_average_to_zero() {
        let summary = DecisionMetrics::default().finalize();
        assert_eq!(summary.decisions, 0);
        assert_eq!(summary.avg_ms_per_decision, 0.0);
    }
}
