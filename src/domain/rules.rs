// Rules table - pure lookups from match options to derived values
use super::history::ChipLabel;
use super::match_config::{BestOf, Generation, MatchType};
use super::player::Player;

pub const DEFAULT_CUSTOM_POINTS: u32 = 10;
/// Largest custom target a score can reach.
pub const MAX_CUSTOM_POINTS: u32 = i32::MAX as u32;

/// Target score for a match type; `None` means the game never ends on points.
pub fn max_points(match_type: MatchType, custom_points: u32) -> Option<i32> {
    match match_type {
        MatchType::ThreePoints => Some(3),
        MatchType::FourPoints => Some(4),
        MatchType::FivePoints => Some(5),
        MatchType::SevenPoints => Some(7),
        MatchType::Custom => Some(i32::try_from(custom_points).unwrap_or(i32::MAX)),
        MatchType::NoLimit => None,
    }
}

pub fn primary_win_condition(generation: Generation) -> ChipLabel {
    match generation {
        Generation::X => ChipLabel::Xtreme,
        Generation::Burst => ChipLabel::Burst,
        Generation::MetalFightZeroG => ChipLabel::Over,
        Generation::PlasticsHms => ChipLabel::Spin,
    }
}

/// Win conditions a generation can score, in display order.
pub fn win_conditions(generation: Generation) -> &'static [ChipLabel] {
    match generation {
        Generation::X => &[ChipLabel::Xtreme, ChipLabel::Burst, ChipLabel::Over, ChipLabel::Spin],
        Generation::Burst => &[ChipLabel::Burst, ChipLabel::Over, ChipLabel::Spin],
        Generation::MetalFightZeroG | Generation::PlasticsHms => &[ChipLabel::Over, ChipLabel::Spin],
    }
}

/// Maps a score-card chip to the win condition logged in the match history.
///
/// Accepts the chip codes (`XTR`, `BST`, `OVR`, `SPF`) or the condition names.
/// A chip the generation cannot score falls back to its primary condition.
pub fn chip_for_history(chip: &str, generation: Generation) -> ChipLabel {
    let requested = match chip.trim().to_ascii_uppercase().as_str() {
        "XTR" | "XTREME" => Some(ChipLabel::Xtreme),
        "BST" | "BURST" => Some(ChipLabel::Burst),
        "OVR" | "OVER" => Some(ChipLabel::Over),
        "SPF" | "SPIN" => Some(ChipLabel::Spin),
        _ => None,
    };

    requested
        .filter(|label| win_conditions(generation).contains(label))
        .unwrap_or_else(|| primary_win_condition(generation))
}

pub fn generation_label(generation: Generation) -> &'static str {
    match generation {
        Generation::X => "X",
        Generation::Burst => "Burst",
        Generation::MetalFightZeroG => "Metal Fight/Zero-G",
        Generation::PlasticsHms => "Plastic & HMS",
    }
}

pub fn points_to_win_label(match_type: MatchType, custom_points: u32) -> String {
    match match_type {
        MatchType::Custom => format!("{} Pts.", custom_points),
        MatchType::ThreePoints => "3 Pts.".to_string(),
        MatchType::FourPoints => "4 Pts.".to_string(),
        MatchType::FivePoints => "5 Pts.".to_string(),
        MatchType::SevenPoints => "7 Pts.".to_string(),
        MatchType::NoLimit => "No Limit".to_string(),
    }
}

pub fn sets_label(best_of: Option<BestOf>) -> String {
    match best_of {
        Some(best_of) => format!("Best-of-{}", best_of.games()),
        None => "None".to_string(),
    }
}

/// Match types offered for a generation. X drops 3 points in favour of 7.
pub fn match_types_for(generation: Generation) -> &'static [MatchType] {
    match generation {
        Generation::X => &[
            MatchType::FourPoints,
            MatchType::FivePoints,
            MatchType::SevenPoints,
            MatchType::NoLimit,
            MatchType::Custom,
        ],
        _ => &[
            MatchType::ThreePoints,
            MatchType::FourPoints,
            MatchType::FivePoints,
            MatchType::NoLimit,
            MatchType::Custom,
        ],
    }
}

/// Star rows take room on the score card, so names get shorter with sets.
pub fn name_truncation_limit(best_of: Option<BestOf>) -> usize {
    if best_of.is_none() { 24 } else { 10 }
}

pub fn format_display_name(name: &str, limit: usize) -> String {
    if name.chars().count() <= limit {
        return name.to_string();
    }
    let keep = limit.saturating_sub(3);
    let truncated: String = name.chars().take(keep).collect();
    format!("{}...", truncated.trim_end())
}

pub fn player_display_name(player: Player, name: &str) -> String {
    if !name.is_empty() {
        return name.to_string();
    }
    match player {
        Player::P1 => "Player 1".to_string(),
        Player::P2 => "Player 2".to_string(),
    }
}
