// Scoring engine - turns scoring events into score deltas and history rows
use serde::{Deserialize, Serialize};

use super::history::{ChipLabel, HistoryEntry};
use super::match_config::MatchConfig;
use super::player::{Player, PlayerScore};
use super::rules::chip_for_history;

/// Live scoring state of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub p1: PlayerScore,
    pub p2: PlayerScore,
    /// Newest entry first.
    pub match_history: Vec<HistoryEntry>,
    pub current_game_number: u32,
    /// Chip that pushed a player to the target; consumed by game conclusion.
    pub winning_chip: Option<ChipLabel>,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            p1: PlayerScore::default(),
            p2: PlayerScore::default(),
            match_history: Vec::new(),
            current_game_number: 1,
            winning_chip: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringOutcome {
    /// The action changed observable state and must be captured on the timeline.
    pub snapshot_due: bool,
    /// The awarded points reached the target.
    pub game_will_end: bool,
}

impl ScoreState {
    pub fn player(&self, player: Player) -> &PlayerScore {
        match player {
            Player::P1 => &self.p1,
            Player::P2 => &self.p2,
        }
    }

    pub fn player_mut(&mut self, player: Player) -> &mut PlayerScore {
        match player {
            Player::P1 => &mut self.p1,
            Player::P2 => &mut self.p2,
        }
    }

    /// Increase `player`'s score by `points`, scored with `chip`.
    ///
    /// Blocked once the player is at or past the target. A single increase may
    /// overshoot the target, and `points` is taken as given. The increase that
    /// ends the game logs no row of its own: its chip is kept as the winning
    /// chip for the game-conclusion entry.
    pub fn score_increase(
        &mut self,
        config: &MatchConfig,
        player: Player,
        points: i32,
        chip: &str,
    ) -> ScoringOutcome {
        let Some(game_will_end) = self.award(config, player, points) else {
            return ScoringOutcome::default();
        };

        self.p1.show_warning = false;
        self.p2.show_warning = false;

        if !chip.is_empty() {
            let label = chip_for_history(chip, config.generation());
            if game_will_end {
                self.winning_chip = Some(label);
            } else {
                self.log(config, player, label);
            }
        }

        ScoringOutcome {
            snapshot_due: true,
            game_will_end,
        }
    }

    /// `acting` finished themselves out; the opponent gets a point.
    pub fn own_finish(&mut self, config: &MatchConfig, acting: Player) -> ScoringOutcome {
        let Some(game_will_end) = self.award(config, acting.opponent(), 1) else {
            return ScoringOutcome::default();
        };

        self.log(config, acting, ChipLabel::Own);
        ScoringOutcome {
            snapshot_due: true,
            game_will_end,
        }
    }

    /// `acting` is penalised; the opponent gets a point and `acting`'s warning clears.
    pub fn penalty(&mut self, config: &MatchConfig, acting: Player) -> ScoringOutcome {
        let awarded = self.award(config, acting.opponent(), 1);
        if awarded.is_some() {
            self.log(config, acting, ChipLabel::Penalty);
        }

        // Cleared even when the target guard blocked the point
        self.player_mut(acting).show_warning = false;

        ScoringOutcome {
            snapshot_due: awarded.is_some(),
            game_will_end: awarded.unwrap_or(false),
        }
    }

    /// Flip `player`'s warning flag. Only issuing a warning is logged.
    pub fn warning_toggle(&mut self, config: &MatchConfig, player: Player) -> ScoringOutcome {
        let score = self.player_mut(player);
        score.show_warning = !score.show_warning;
        if score.show_warning {
            self.log(config, player, ChipLabel::Warning);
        }

        ScoringOutcome {
            snapshot_due: true,
            game_will_end: false,
        }
    }

    /// Won-set count recorded on history rows; always 0 outside best-of matches.
    pub fn set_wins_for_entry(&self, config: &MatchConfig, player: Player) -> usize {
        if config.best_of().is_some() {
            self.player(player).won_sets()
        } else {
            0
        }
    }

    /// Prepend a history row for `player`, scores oriented to them.
    pub fn log(&mut self, config: &MatchConfig, player: Player, label: ChipLabel) {
        let entry = HistoryEntry::new(
            player,
            self.player(player).score,
            self.player(player.opponent()).score,
            label,
            self.set_wins_for_entry(config, player),
        );
        self.match_history.insert(0, entry);
    }

    /// Returns `None` when the target guard blocks the award, otherwise whether
    /// the new score reaches the target.
    fn award(&mut self, config: &MatchConfig, player: Player, points: i32) -> Option<bool> {
        let target = config.max_points();
        let score = self.player_mut(player);

        match target {
            Some(target) if score.score >= target => None,
            Some(target) => {
                score.score = score.score.saturating_add(points);
                Some(score.score >= target)
            }
            None => {
                score.score = score.score.saturating_add(points);
                Some(false)
            }
        }
    }
}
