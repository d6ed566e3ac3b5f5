use chrono::{DateTime, Local};

use crate::recent::RecentMatchTotals;

/// Published once per completed poll iteration.
#[derive(Debug, Clone)]
pub struct StatUpdate {
    pub updated_at: DateTime<Local>,
    pub files_written: usize,
    pub recent: RecentMatchTotals,
}

impl StatUpdate {
    pub fn title(&self) -> String {
        format!(
            "Fortnite Stats Last Updated: {}",
            self.updated_at.format("%-I:%M:%S %p")
        )
    }

    /// OSC 0 window-title escape, or `None` when output is not a terminal.
    pub fn title_sequence(&self, is_terminal: bool) -> Option<String> {
        is_terminal.then(|| format!("\x1b]0;{}\x07", self.title()))
    }
}
