use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use crossbeam_channel::Sender;
use tokio::{sync::watch, task::JoinHandle, time::sleep};
use tracing::{debug, error, info, warn};

use crate::{
    events::StatUpdate,
    recent::{recent_match_totals, RecentMatchTotals},
    stat_table::{
        lifetime_stat_file_name, mode_stat_file_name, stats_for_mode, tracked_modes,
        LIFETIME_STATS, RECENT_KILLS_FILE, RECENT_MATCHES_FILE, RECENT_WINS_FILE,
    },
    tracker::{Platform, PlayerProfile, ProfileSource},
    writer::StatFileWriter,
};

#[derive(Debug, Clone)]
pub struct StatWorkerConfig {
    pub platform: Platform,
    pub username: String,
    pub poll_interval: Duration,
    pub recent_match_days: u32,
    pub retry_failed_fetches: bool,
}

/// Controller side of a running poll loop.
pub struct StatWorkerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<Result<()>>,
}

impl StatWorkerHandle {
    /// Asks the loop to stop; the iteration in flight still finishes.
    pub fn request_stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Resolves when the loop exits on its own. Dropping the future early
    /// leaves the handle usable for `stop`.
    pub async fn wait(&mut self) -> Result<()> {
        (&mut self.task)
            .await
            .context("stat worker task panicked")?
    }

    pub async fn stop(self) -> Result<()> {
        self.request_stop();
        self.task.await.context("stat worker task panicked")?
    }
}

pub fn spawn_stat_worker<S>(
    config: StatWorkerConfig,
    source: S,
    writer: StatFileWriter,
    tx: Sender<StatUpdate>,
) -> StatWorkerHandle
where
    S: ProfileSource + Send + Sync + 'static,
{
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        let result = run_stat_loop(&config, &source, &writer, stop_rx, &tx).await;
        if let Err(err) = &result {
            error!(?err, username = %config.username, "stat worker stopped on error");
        }
        result
    });
    StatWorkerHandle { stop_tx, task }
}

async fn run_stat_loop<S: ProfileSource>(
    config: &StatWorkerConfig,
    source: &S,
    writer: &StatFileWriter,
    mut stop_rx: watch::Receiver<bool>,
    tx: &Sender<StatUpdate>,
) -> Result<()> {
    info!(
        platform = %config.platform,
        username = %config.username,
        folder = %writer.folder().display(),
        interval_secs = config.poll_interval.as_secs(),
        "starting stat worker"
    );

    loop {
        if *stop_rx.borrow() {
            break;
        }

        match source.fetch_profile(config.platform, &config.username).await {
            Ok(profile) => {
                debug!(handle = %profile.epic_user_handle, "fetched profile");
                let now = Utc::now();
                let pass = write_profile(writer, &profile, now, config.recent_match_days)?;
                let update = StatUpdate {
                    updated_at: now.with_timezone(&Local),
                    files_written: pass.count,
                    recent: pass.recent,
                };
                debug!(files = update.files_written, "stat files updated");
                if tx.send(update).is_err() {
                    debug!("update observer dropped");
                }
            }
            Err(err) if config.retry_failed_fetches => {
                warn!(?err, username = %config.username, "profile fetch failed; retrying next cycle");
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed fetching profile for {}", config.username)
                });
            }
        }

        if *stop_rx.borrow() {
            break;
        }
        tokio::select! {
            _ = sleep(config.poll_interval) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    info!("stat worker controller dropped");
                    break;
                }
            }
        }
    }

    info!(username = %config.username, "stat worker stopped");
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WritePass {
    pub count: usize,
    pub recent: RecentMatchTotals,
}

/// Writes every tracked stat of `profile`. The first failing write aborts the
/// rest of the pass.
pub fn write_profile(
    writer: &StatFileWriter,
    profile: &PlayerProfile,
    now: DateTime<Utc>,
    recent_match_days: u32,
) -> Result<WritePass> {
    let mut count = 0;

    for mode in tracked_modes() {
        for stat in stats_for_mode(mode) {
            let value = match profile.mode_stat(mode, stat) {
                Some(entry) => entry.value_text(),
                None => {
                    warn!(mode = %mode, stat = %stat, "stat missing from profile");
                    String::new()
                }
            };
            writer.write_stat(&mode_stat_file_name(mode, stat), &value)?;
            count += 1;
        }
    }

    for stat in LIFETIME_STATS {
        let value = profile
            .lifetime_stat(stat)
            .map(|entry| entry.value_text())
            .unwrap_or_default();
        writer.write_stat(&lifetime_stat_file_name(stat), &value)?;
        count += 1;
    }

    let recent = recent_match_totals(&profile.recent_matches, now, recent_match_days);
    writer.write_stat(RECENT_KILLS_FILE, &recent.kills.to_string())?;
    writer.write_stat(RECENT_MATCHES_FILE, &recent.matches.to_string())?;
    writer.write_stat(RECENT_WINS_FILE, &recent.wins.to_string())?;
    count += 3;

    Ok(WritePass { count, recent })
}
