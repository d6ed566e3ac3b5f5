use std::{collections::HashMap, fmt, future::Future, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_API_BASE_URL: &str = "https://api.fortnitetracker.com/v1";
const API_KEY_HEADER: &str = "TRN-Api-Key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Xbl,
    Psn,
    Pc,
}

impl Platform {
    pub fn api_token(self) -> &'static str {
        match self {
            Self::Xbl => "xbl",
            Self::Psn => "psn",
            Self::Pc => "pc",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_token())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerProfile {
    pub epic_user_handle: String,
    pub stats: HashMap<String, HashMap<String, StatEntry>>,
    #[serde(rename = "lifeTimeStats")]
    pub lifetime_stats: Vec<LifetimeStat>,
    pub recent_matches: Vec<RecentMatch>,
    pub error: Option<String>,
}

impl PlayerProfile {
    pub fn mode_stat(&self, mode: &str, stat: &str) -> Option<&StatEntry> {
        self.stats.get(mode)?.get(stat)
    }

    /// First entry whose key matches exactly.
    pub fn lifetime_stat(&self, key: &str) -> Option<&LifetimeStat> {
        self.lifetime_stats.iter().find(|entry| entry.key == key)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatEntry {
    pub value: Value,
}

impl StatEntry {
    pub fn value_text(&self) -> String {
        render_value(&self.value)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LifetimeStat {
    pub key: String,
    pub value: Value,
}

impl LifetimeStat {
    pub fn value_text(&self) -> String {
        render_value(&self.value)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecentMatch {
    pub date_collected: String,
    pub kills: u32,
    pub matches: u32,
    pub top1: u32,
}

/// Plain-text form of an API value: strings unquoted, null as empty.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub trait ProfileSource {
    fn fetch_profile(
        &self,
        platform: Platform,
        username: &str,
    ) -> impl Future<Output = Result<PlayerProfile>> + Send;
}

#[derive(Debug, Clone)]
pub struct TrackerClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TrackerClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed building tracker http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim().to_owned(),
            api_key: api_key.trim().to_owned(),
        })
    }
}

impl ProfileSource for TrackerClient {
    async fn fetch_profile(&self, platform: Platform, username: &str) -> Result<PlayerProfile> {
        let url = profile_url(&self.base_url, platform, username)?;
        debug!(%url, "fetching tracker profile");
        let response = self
            .client
            .get(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("tracker rejected profile request for {username}"))?;
        let profile = response
            .json::<PlayerProfile>()
            .await
            .with_context(|| format!("invalid profile json from {url}"))?;
        check_profile(profile)
    }
}

fn profile_url(base_url: &str, platform: Platform, username: &str) -> Result<Url> {
    let mut url =
        Url::parse(base_url).with_context(|| format!("invalid api base url: {base_url}"))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("api base url cannot carry a path: {base_url}"))?
        .pop_if_empty()
        .extend(["profile", platform.api_token(), username]);
    Ok(url)
}

fn check_profile(profile: PlayerProfile) -> Result<PlayerProfile> {
    if let Some(message) = profile
        .error
        .as_deref()
        .map(str::trim)
        .filter(|message| !message.is_empty())
    {
        bail!("tracker returned an error: {message}");
    }
    Ok(profile)
}
