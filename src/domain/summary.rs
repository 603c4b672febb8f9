// Results summary - per-condition win counts for the match winner
use serde::Serialize;

use super::history::{ChipLabel, HistoryEntry};
use super::match_config::Generation;
use super::player::Player;
use super::rules::win_conditions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryItem {
    pub id: &'static str,
    pub label: &'static str,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsSummary {
    pub winner: Option<Player>,
    pub items: Vec<SummaryItem>,
    pub opponent_own_finishes: usize,
    pub opponent_penalties: usize,
}

impl ResultsSummary {
    pub fn build(generation: Generation, history: &[HistoryEntry], winner: Option<Player>) -> Self {
        let items = win_conditions(generation)
            .iter()
            .map(|condition| SummaryItem {
                id: summary_id(*condition),
                label: condition.code(),
                value: winner.map_or(0, |winner| count(history, winner, *condition)),
            })
            .collect();

        // Opponent faults only show on X score cards
        let opponent = winner
            .filter(|_| generation == Generation::X)
            .map(|winner| winner.opponent());

        Self {
            winner,
            items,
            opponent_own_finishes: opponent.map_or(0, |p| count(history, p, ChipLabel::Own)),
            opponent_penalties: opponent.map_or(0, |p| count(history, p, ChipLabel::Penalty)),
        }
    }
}

fn count(history: &[HistoryEntry], player: Player, label: ChipLabel) -> usize {
    history
        .iter()
        .filter(|entry| entry.player == player && entry.chip_label == label)
        .count()
}

fn summary_id(label: ChipLabel) -> &'static str {
    match label {
        ChipLabel::Xtreme => "xtreme",
        ChipLabel::Burst => "burst",
        ChipLabel::Over => "over",
        ChipLabel::Spin => "spin",
        ChipLabel::Own => "own",
        ChipLabel::Penalty => "penalty",
        ChipLabel::Warning => "warning",
    }
}
