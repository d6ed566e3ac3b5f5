mod cli;
mod config;
mod events;
mod recent;
mod stat_table;
mod tracker;
mod worker;
mod writer;

use std::{
    io::{self, IsTerminal, Write},
    thread,
};

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{parse_args, CliCommand},
    config::{load_dotenv_fallback, StatWriterConfig},
    events::StatUpdate,
    tracker::TrackerClient,
    worker::{spawn_stat_worker, StatWorkerConfig},
    writer::StatFileWriter,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let platform = match parse_args(std::env::args().skip(1)) {
        CliCommand::Run(platform) => platform,
        CliCommand::Usage(message) => {
            println!("{message}");
            return Ok(());
        }
    };

    let (config, config_path) = StatWriterConfig::load_or_create()?;
    let settings = config
        .resolve(&load_dotenv_fallback())
        .with_context(|| format!("incomplete settings in {}", config_path.display()))?;

    let writer = StatFileWriter::new(&settings.output_folder)?;
    let client = TrackerClient::new(
        &settings.api_base_url,
        &settings.api_key,
        settings.request_timeout,
    )?;
    let (tx, rx) = crossbeam_channel::unbounded::<StatUpdate>();
    let title_thread = thread::spawn(move || show_updates(rx));

    let mut worker = spawn_stat_worker(
        StatWorkerConfig {
            platform,
            username: settings.username,
            poll_interval: settings.poll_interval,
            recent_match_days: settings.recent_match_days,
            retry_failed_fetches: settings.retry_failed_fetches,
        },
        client,
        writer,
        tx,
    );

    println!("Press the ENTER key to exit.");
    let enter_rx = spawn_enter_listener();
    let finished_early = tokio::select! {
        result = worker.wait() => Some(result),
        _ = enter_rx => None,
        _ = tokio::signal::ctrl_c() => None,
    };
    let result = match finished_early {
        Some(result) => result,
        None => {
            if worker.is_running() {
                println!("Exiting please wait...");
            }
            worker.stop().await
        }
    };

    if title_thread.join().is_err() {
        warn!("update display thread panicked");
    }
    result
}

// Runs outside the runtime; a pending stdin read must not block shutdown.
fn spawn_enter_listener() -> oneshot::Receiver<()> {
    let (tx, rx) = oneshot::channel();
    thread::spawn(move || {
        let mut line = String::new();
        if let Err(err) = io::stdin().read_line(&mut line) {
            warn!(?err, "failed reading stdin");
        }
        let _ = tx.send(());
    });
    rx
}

fn show_updates(rx: Receiver<StatUpdate>) {
    let is_terminal = io::stdout().is_terminal();
    for update in rx {
        let title = update.title();
        info!(
            files = update.files_written,
            recent_kills = update.recent.kills,
            recent_matches = update.recent.matches,
            recent_wins = update.recent.wins,
            "{title}"
        );
        if let Some(sequence) = update.title_sequence(is_terminal) {
            let mut stdout = io::stdout().lock();
            let _ = stdout.write_all(sequence.as_bytes());
            let _ = stdout.flush();
        }
    }
}
