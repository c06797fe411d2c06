// SwordFinder entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, stdout carries JSON output)
// 2. Parse the command line
// 3. Load config
// 4. Open database
// 5. Run the requested command and print its result

use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use swordfinder::app;
use swordfinder::config;
use swordfinder::db;
use swordfinder::enrich::NoNames;

#[derive(Debug, Parser)]
#[command(name = "swordfinder", version, about = "Find and score MLB sword swings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a Statcast CSV export into the database.
    Import {
        /// CSV to load; defaults to `data_paths.statcast`.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Top swords of a single day.
    Daily {
        /// Game date, YYYY-MM-DD.
        date: NaiveDate,
        /// Recompute even if the date was already processed.
        #[arg(long)]
        refresh: bool,
    },
    /// Score every candidate and store its universal sword score.
    Populate {
        /// Only this date.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Best swords across every stored date.
    Leaderboard {
        /// Number of swords; defaults to `leaderboard.all_time_limit`.
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("SwordFinder starting up");

    // 2. Parse the command line
    let cli = Cli::parse();

    // 3. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 4. Open database
    let db = db::Database::open(&config.database.path).context("failed to open database")?;
    info!("Database opened at {}", config.database.path);

    // 5. Run the command
    match cli.command {
        Command::Import { csv } => {
            let path = csv.unwrap_or_else(|| PathBuf::from(&config.data_paths.statcast));
            print_json(&app::import_csv(&db, &path)?)
        }
        Command::Daily { date, refresh } => {
            app::check_not_future(date, Local::now().date_naive())?;
            print_json(&app::find_sword_swings(&db, &config, &NoNames, date, refresh)?)
        }
        Command::Populate { date } => print_json(&app::populate(&db, date)?),
        Command::Leaderboard { limit } => {
            let limit = limit.unwrap_or(config.leaderboard.all_time_limit);
            print_json(&app::all_time_leaderboard(&db, &config, &NoNames, limit)?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Initialize tracing to log to a file, keeping stdout clean for JSON.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("swordfinder.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swordfinder=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
