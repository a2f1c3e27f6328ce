//! Terminal front-end: discovers, parses, and prints the log collection.
//!
//! Stands in for the desktop shell — all it does is subscribe to the
//! collection's signals and render summaries.

use clap::Parser;
use odessen_core::context::AppConfig;
use odessen_core::{Collection, CollectionSignal, LogFile, ParseState};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(version, about = "SWTOR combat log organizer")]
struct Cli {
    /// Log directory; defaults to the configured CombatLogs folder.
    #[arg(short, long)]
    dir: Option<String>,

    /// Re-parse every file, ignoring the cache.
    #[arg(short, long)]
    force: bool,
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> odessen_core::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let dir = match cli.dir {
        Some(dir) => dir,
        None => AppConfig::load()?.log_directory,
    };

    let mut collection = Collection::new(&dir);
    collection.add_signal_handler(Box::new(|signal: &CollectionSignal| match signal {
        CollectionSignal::AllLogsFound { count } => println!("Found {count} combat logs."),
        CollectionSignal::CacheLoaded { entries } => {
            println!("Log cache loaded ({entries} entries).")
        }
        CollectionSignal::LogParsed { log } => print_summary(log),
        CollectionSignal::AllLogsParsed => println!("All logs parsed."),
        CollectionSignal::CacheSaved => println!("Log cache saved."),
    }));

    collection.run(cli.force).await
}

fn print_summary(log: &LogFile) {
    if log.state == ParseState::Failed {
        println!("  {:<44} <unreadable>", log.filename);
        return;
    }

    let date = log
        .session_date
        .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    let character = log
        .character
        .as_ref()
        .map(|character| character.name.as_str())
        .unwrap_or("(no login)");
    let server = if log.server.is_empty() {
        log.server_id.as_str()
    } else {
        log.server.as_str()
    };

    println!(
        "  {:<44} {date:<16} {character} @ {server} [{}]  areas: {}  allies: {}  enemies: {}",
        log.filename,
        log.patch,
        log.areas.len(),
        log.players.len(),
        log.enemies.len(),
    );
}
