use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::tracker::DEFAULT_API_BASE_URL;

const CONFIG_DIR_NAME: &str = "fortnite-stat2txt";
const API_KEY_VARS: &[&str] = &["TRN_API_KEY", "FORTNITE_API_KEY"];
const USER_NAME_VARS: &[&str] = &["EPIC_USER_NAME", "FORTNITE_USER_NAME"];
const OUTPUT_FOLDER_VARS: &[&str] = &["OUTPUT_FOLDER"];
const MAX_POLL_INTERVAL_SECS: u64 = 3_600;
const MAX_RECENT_MATCH_DAYS: u32 = 3_650;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatWriterConfig {
    pub api_key: Option<String>,
    pub epic_user_name: Option<String>,
    pub output_folder: String,
    pub api_base_url: String,
    pub poll_interval_secs: u64,
    pub recent_match_days: u32,
    pub request_timeout_secs: u64,
    pub retry_failed_fetches: bool,
}

impl Default for StatWriterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            epic_user_name: None,
            output_folder: "FortniteStats".to_owned(),
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            poll_interval_secs: 10,
            recent_match_days: 1,
            request_timeout_secs: 10,
            retry_failed_fetches: false,
        }
    }
}

/// Values the poll loop needs, after config, env and `.env` have been merged.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub api_key: String,
    pub username: String,
    pub output_folder: PathBuf,
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub recent_match_days: u32,
    pub request_timeout: Duration,
    pub retry_failed_fetches: bool,
}

impl StatWriterConfig {
    /// Loads the per-user config, writing a default one on first run.
    pub fn load_or_create() -> Result<(Self, PathBuf)> {
        let path = default_config_path()?;
        Ok((Self::load_or_create_at(&path)?, path))
    }

    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if path.is_file() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed reading {}", path.display()))?;
            return serde_json::from_str(&text)
                .with_context(|| format!("invalid json in {}", path.display()));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating {}", parent.display()))?;
        }
        let defaults = Self::default();
        let payload =
            serde_json::to_string_pretty(&defaults).context("failed serializing config")?;
        fs::write(path, payload).with_context(|| format!("failed writing {}", path.display()))?;
        info!(path = %path.display(), "wrote default config; fill in api_key and epic_user_name");
        Ok(defaults)
    }

    /// Merges config with the process environment and `.env` values.
    pub fn resolve(&self, dotenv: &HashMap<String, String>) -> Result<ResolvedSettings> {
        self.resolve_with(|key| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned()))
    }

    /// `lookup` answers for the fallback variables when a config field is empty.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<ResolvedSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fallback = |keys: &[&str]| {
            keys.iter()
                .copied()
                .find_map(|key| non_empty(lookup(key).as_deref()))
        };
        let Some(api_key) =
            non_empty(self.api_key.as_deref()).or_else(|| fallback(API_KEY_VARS))
        else {
            bail!(
                "missing api key: set api_key in the config file or {}",
                API_KEY_VARS.join("/")
            );
        };
        let Some(username) =
            non_empty(self.epic_user_name.as_deref()).or_else(|| fallback(USER_NAME_VARS))
        else {
            bail!(
                "missing player name: set epic_user_name in the config file or {}",
                USER_NAME_VARS.join("/")
            );
        };
        let Some(output_folder) =
            non_empty(Some(self.output_folder.as_str())).or_else(|| fallback(OUTPUT_FOLDER_VARS))
        else {
            bail!("output_folder is empty");
        };

        Ok(ResolvedSettings {
            api_key,
            username,
            output_folder: PathBuf::from(output_folder),
            api_base_url: non_empty(Some(self.api_base_url.as_str()))
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned()),
            poll_interval: Duration::from_secs(clamped(
                "poll_interval_secs",
                self.poll_interval_secs,
                1,
                MAX_POLL_INTERVAL_SECS,
            )),
            recent_match_days: clamped(
                "recent_match_days",
                self.recent_match_days,
                1,
                MAX_RECENT_MATCH_DAYS,
            ),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            retry_failed_fetches: self.retry_failed_fetches,
        })
    }
}

fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("no per-user config directory on this system")?;
    Ok(dir.join(CONFIG_DIR_NAME).join("config.json"))
}

fn clamped<T>(field: &str, configured: T, min: T, max: T) -> T
where
    T: Ord + Copy + std::fmt::Display,
{
    let used = configured.clamp(min, max);
    if used != configured {
        warn!(%field, %configured, %used, "config value out of range; clamped");
    }
    used
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Reads `.env` from the working directory, if there is one.
pub fn load_dotenv_fallback() -> HashMap<String, String> {
    let path = Path::new(".env");
    if !path.is_file() {
        return HashMap::new();
    }
    match parse_dotenv_file(path) {
        Ok(values) => {
            info!(entries = values.len(), "loaded .env fallback");
            values
        }
        Err(err) => {
            warn!(?err, "ignoring unreadable .env file");
            HashMap::new()
        }
    }
}

fn parse_dotenv_file(path: &Path) -> Result<HashMap<String, String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
    Ok(parse_dotenv(&text))
}

/// `KEY=value` lines; `#` comments, an `export ` prefix and surrounding
/// quotes are tolerated.
fn parse_dotenv(text: &str) -> HashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches('"').trim_matches('\'');
            Some((key.to_owned(), value.to_owned()))
        })
        .collect()
}
