//! puppet-watch: announces new afisha entries of the puppet theater to Telegram.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};

use puppet_watch_lib::{config, preview, scheduler, scraping, AppConfig, RunOutcome, Watcher};

#[derive(Parser, Debug)]
#[command(name = "puppet-watch", version, about = "Puppet theater afisha watcher")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the afisha once and exit
    Once,
    /// Check the afisha repeatedly
    Watch {
        /// Seconds between checks (default: POLL_INTERVAL)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// Print the events currently listed, without notifying or saving
    Preview {
        /// Parse a saved HTML page instead of fetching
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn run_preview(verbose: bool, file: Option<PathBuf>) -> Result<()> {
    let debug_flag = config::env_flag("DEBUG").context("invalid configuration")?;
    init_logging(verbose || debug_flag);
    let url =
        std::env::var("AFISHA_URL").unwrap_or_else(|_| config::DEFAULT_AFISHA_URL.to_string());
    let events = preview(&url, file.as_deref())?;
    for event in &events {
        println!("{}\t{}\t{}", event.starts_at(), event.title, event.url);
    }
    println!("{} events", events.len());
    Ok(())
}

fn load_watcher(verbose: bool) -> Result<(AppConfig, Watcher)> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    init_logging(verbose || config.debug);
    if let Ok(summary) = serde_json::to_string(&config) {
        debug!("configuration: {summary}");
    }
    debug!("layouts in priority order: {}", scraping::list_layouts().join(", "));
    let watcher = Watcher::from_config(&config);
    Ok((config, watcher))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Preview { file } => run_preview(cli.verbose, file)?,
        Command::Once => {
            let (_, watcher) = load_watcher(cli.verbose)?;
            let outcome: RunOutcome = watcher.run_once()?;
            info!("done: {outcome:?}");
        }
        Command::Watch { interval } => {
            let (config, watcher) = load_watcher(cli.verbose)?;
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.poll_interval());
            scheduler::run_loop(&watcher, interval, None);
        }
    }

    Ok(())
}
