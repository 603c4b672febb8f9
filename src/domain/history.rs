// Match history log entries
use serde::{Deserialize, Serialize};

use super::player::Player;

/// Scoring-event tag carried by a history row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChipLabel {
    Xtreme,
    Burst,
    Over,
    Spin,
    Own,
    Penalty,
    Warning,
}

impl ChipLabel {
    /// Short chip code shown on the score card.
    pub fn code(&self) -> &'static str {
        match self {
            ChipLabel::Xtreme => "XTR",
            ChipLabel::Burst => "BST",
            ChipLabel::Over => "OVR",
            ChipLabel::Spin => "SPF",
            ChipLabel::Own => "OWF",
            ChipLabel::Penalty => "PEN",
            ChipLabel::Warning => "ERR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub player: Player,
    /// Acting player's score at the time of the entry.
    pub score1: i32,
    /// Opponent's score at the time of the entry.
    pub score2: i32,
    pub chip_label: ChipLabel,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_penalty: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_warning: bool,
    pub set_wins: usize,
}

impl HistoryEntry {
    pub fn new(player: Player, score1: i32, score2: i32, chip_label: ChipLabel, set_wins: usize) -> Self {
        Self {
            player,
            score1,
            score2,
            chip_label,
            is_penalty: matches!(chip_label, ChipLabel::Own | ChipLabel::Penalty),
            is_warning: chip_label == ChipLabel::Warning,
            set_wins,
        }
    }
}
