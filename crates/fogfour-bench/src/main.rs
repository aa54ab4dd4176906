use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use fogfour_bench::arena::ArenaRunner;
use fogfour_bench::config::{BenchmarkConfig, ResolvedOutputs};
use fogfour_bench::logging::init_logging;
use fogfour_core::AppInfo;

/// Self-play harness for the hidden-information Connect Four agent.
#[derive(Debug, Parser)]
#[command(
    name = "fogfour-bench",
    author,
    version,
    about = "Deterministic self-play harness for the fogfour agent"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for opponent sampling.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.games.count;

    println!(
        "{} ({}) v{}",
        AppInfo::name(),
        AppInfo::codename(),
        AppInfo::version()
    );
    println!(
        "Loaded configuration '{run_id}' ({games} game{}, opponent {:?}, first mover {:?})",
        if games == 1 { "" } else { "s" },
        config.opponent.kind,
        config.games.agent_first,
    );

    if cli.validate_only {
        println!("Validation-only mode: no games played.");
        return Ok(());
    }

    let logging_config = config.logging.clone();
    let runner = ArenaRunner::new(config, outputs.clone());
    let search = runner.search_config();
    let logging_guard = init_logging(&logging_config, &outputs, &run_id, search)?;
    println!(
        "Search depth {}/{} (deep after {} searches), prune below {}, time cap {}",
        search.shallow_depth,
        search.deep_depth,
        search.deep_after,
        search.prune_threshold,
        match search.time_cap() {
            Some(cap) => format!("{} ms", cap.as_millis()),
            None => "none".to_string(),
        }
    );

    let summary = runner
        .run()
        .with_context(|| format!("running self-play for '{run_id}'"))?;
    println!(
        "Run complete for '{run_id}': {} games ({} wins, {} draws, {} losses) → {} rows at {}",
        summary.games_played,
        summary.wins,
        summary.draws,
        summary.losses,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
