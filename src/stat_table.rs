pub const PLAYLIST_SOLO: &str = "p2";
pub const PLAYLIST_DUO: &str = "p10";
pub const PLAYLIST_SQUAD: &str = "p9";

pub const STAT_TOP1: &str = "top1";
pub const STAT_TOP3: &str = "top3";
pub const STAT_TOP5: &str = "top5";
pub const STAT_TOP6: &str = "top6";
pub const STAT_TOP10: &str = "top10";
pub const STAT_TOP12: &str = "top12";
pub const STAT_TOP25: &str = "top25";

/// Per-playlist stats mirrored to disk, in write order.
pub const MODE_STATS: &[(&str, &[&str])] = &[
    (PLAYLIST_SOLO, &[STAT_TOP1, STAT_TOP10, STAT_TOP25]),
    (PLAYLIST_DUO, &[STAT_TOP1, STAT_TOP5, STAT_TOP12]),
    (PLAYLIST_SQUAD, &[STAT_TOP1, STAT_TOP3, STAT_TOP6]),
];

/// Keys looked up in the profile's `lifeTimeStats` list.
pub const LIFETIME_STATS: &[&str] = &["Matches Played", "Wins", "Win%", "Kills", "K/d"];

const FRIENDLY_NAMES: &[(&str, &str)] = &[
    (PLAYLIST_SOLO, "Solo"),
    (PLAYLIST_DUO, "Duo"),
    (PLAYLIST_SQUAD, "Squad"),
    (STAT_TOP1, "Top1"),
    (STAT_TOP3, "Top3"),
    (STAT_TOP5, "Top5"),
    (STAT_TOP6, "Top6"),
    (STAT_TOP10, "Top10"),
    (STAT_TOP12, "Top12"),
    (STAT_TOP25, "Top25"),
    ("avgTimePlayed", "AverageTimePlayed"),
    ("kd", "KillDeathRatio"),
    ("kills", "Kills"),
    ("kpg", "KillsPerMatch"),
    ("matches", "Matches"),
    ("score", "Score"),
    ("scorePerMatch", "ScorePerMatch"),
    ("trnRating", "TrnRating"),
    ("winRatio", "WinRatio"),
    ("Matches Played", "MatchesPlayed"),
    ("Wins", "Wins"),
    ("Win%", "WinPercent"),
    ("Kills", "Kills"),
    ("K/d", "KillDeathRatio"),
];

pub const RECENT_KILLS_FILE: &str = "RecentMatches_Kills";
pub const RECENT_MATCHES_FILE: &str = "RecentMatches_Matches";
pub const RECENT_WINS_FILE: &str = "RecentMatches_TotalWins";

pub fn tracked_modes() -> impl Iterator<Item = &'static str> {
    MODE_STATS.iter().map(|(mode, _)| *mode)
}

pub fn stats_for_mode(mode: &str) -> &'static [&'static str] {
    MODE_STATS
        .iter()
        .find(|(candidate, _)| *candidate == mode)
        .map(|(_, stats)| *stats)
        .unwrap_or(&[])
}

/// Display name for a playlist or stat id; unknown ids pass through unchanged.
pub fn friendly_name(id: &str) -> &str {
    FRIENDLY_NAMES
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, name)| *name)
        .unwrap_or(id)
}

pub fn mode_stat_file_name(mode: &str, stat: &str) -> String {
    format!("{}_{}", friendly_name(mode), friendly_name(stat))
}

pub fn lifetime_stat_file_name(stat: &str) -> String {
    format!("Lifetime_{}", friendly_name(stat))
}
