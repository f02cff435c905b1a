//! Command line entry point for club-standings
//!
//! Replays a series match history through the in-memory stores and prints the
//! recalculated leaderboard.

use anyhow::Result;
use clap::Parser;
use club_standings::config::AppConfig;
use club_standings::service::{AppState, RecalculationOutcome, SeriesHistory};
use club_standings::types::{LeaderboardEntry, SeriesFormat};
use std::path::PathBuf;
use tracing::{error, info};

/// Club Standings - leaderboard recalculation for Elo and ladder series
#[derive(Parser)]
#[command(
    name = "club-standings",
    version,
    about = "Recalculate club series leaderboards from match history",
    long_about = "Club Standings rebuilds a series leaderboard from its complete match history. \
                 Open play series are ranked by Elo rating, ladder series by challenge position \
                 under the classic or aggressive rule."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Match history to replay
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a series match history (TOML format)"
    )]
    history: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Print the leaderboard as JSON
    #[arg(long, help = "Print the leaderboard as JSON instead of a table")]
    json: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without replaying")]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load configuration from file or environment, then apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    Ok(config)
}

fn display_config(config: &AppConfig) {
    info!("Club Standings {}", club_standings::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   Recalculation timeout: {:?}",
        config.recalculation_timeout()
    );
    info!(
        "   Discard superseded runs: {}",
        config.recalculation.discard_superseded
    );
    info!(
        "   Elo: initial {} / K {} / truncation {:?}",
        config.rating.elo.initial_rating, config.rating.elo.k_factor, config.rating.elo.truncation
    );
}

fn print_table(format: SeriesFormat, entries: &[LeaderboardEntry]) {
    let value_header = match format {
        SeriesFormat::OpenPlay => "Rating",
        SeriesFormat::Ladder => "Pos",
    };

    println!(
        "{:>4}  {:<20} {:>6} {:>4} {:>4} {:>4} {:>7} {:>7}",
        "Rank", "Player", value_header, "P", "W", "L", "Games", "Win %"
    );
    for entry in entries {
        println!(
            "{:>4}  {:<20} {:>6} {:>4} {:>4} {:>4} {:>3}-{:<3} {:>6.1}",
            entry.rank,
            entry.player_id,
            entry.rating,
            entry.matches_played,
            entry.matches_won,
            entry.matches_lost,
            entry.games_won,
            entry.games_lost,
            entry.win_rate()
        );
    }
}

async fn run(args: &Args, config: AppConfig) -> Result<()> {
    let Some(history_path) = &args.history else {
        anyhow::bail!("No match history given; pass --history FILE");
    };

    let history = SeriesHistory::from_file(history_path)?;
    info!(
        "Replaying {} matches of series {} ({})",
        history.matches.len(),
        history.series.id,
        history.series.config.format
    );

    let app = AppState::new(config)?;
    let report = app.replay(&history).await?;
    if report.outcome != RecalculationOutcome::Completed {
        anyhow::bail!("Final recalculation of {} did not complete", report.series_id);
    }

    let entries = app.leaderboard(&history.series.id).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print_table(history.series.config.format, &entries);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_config(&config);

    if args.dry_run {
        info!("Dry run completed - configuration is valid");
        return Ok(());
    }

    if let Err(e) = run(&args, config).await {
        error!("Replay failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
