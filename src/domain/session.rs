// Scoring session - the single owner of config, live state and timeline
use super::evaluator;
use super::match_config::{BestOf, Generation, MatchConfig, MatchType, ParseOptionError};
use super::player::Player;
use super::scoring::{ScoreState, ScoringOutcome};
use super::summary::ResultsSummary;
use super::timeline::{PendingReset, Snapshot, Timeline};
use super::view::ScoreboardView;

/// Result of concluding a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConclusion {
    pub winner: Player,
    /// Epoch of the armed next-game transition, if the match continues.
    pub next_game: Option<u64>,
}

/// Every mutation goes through these methods; each one that changes
/// observable state leaves a snapshot on the timeline.
#[derive(Debug)]
pub struct Session {
    config: MatchConfig,
    state: ScoreState,
    timeline: Timeline,
    displayed_set_number: usize,
    pending_reset: PendingReset,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

impl Session {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            state: ScoreState::default(),
            timeline: Timeline::default(),
            displayed_set_number: 1,
            pending_reset: PendingReset::default(),
        }
    }

    pub fn from_parts(
        config: MatchConfig,
        state: ScoreState,
        timeline: Timeline,
        displayed_set_number: usize,
    ) -> Self {
        let mut session = Self {
            config,
            state,
            timeline,
            displayed_set_number: displayed_set_number.max(1),
            pending_reset: PendingReset::default(),
        };
        session.sync_next_game();
        session
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn displayed_set_number(&self) -> usize {
        self.displayed_set_number
    }

    pub fn next_game_pending(&self) -> bool {
        self.pending_reset.is_armed()
    }

    /// Epoch the next-game timer must fire with, if a transition is armed.
    pub fn pending_next_game(&self) -> Option<u64> {
        self.pending_reset.armed_epoch()
    }

    // Scoring events

    pub fn score_increase(&mut self, player: Player, points: i32, chip: &str) -> ScoringOutcome {
        let outcome = self.state.score_increase(&self.config, player, points, chip);
        self.commit(outcome)
    }

    pub fn own_finish(&mut self, acting: Player) -> ScoringOutcome {
        let outcome = self.state.own_finish(&self.config, acting);
        self.commit(outcome)
    }

    pub fn penalty(&mut self, acting: Player) -> ScoringOutcome {
        let outcome = self.state.penalty(&self.config, acting);
        self.commit(outcome)
    }

    pub fn warning_toggle(&mut self, player: Player) -> ScoringOutcome {
        let outcome = self.state.warning_toggle(&self.config, player);
        self.commit(outcome)
    }

    fn commit(&mut self, outcome: ScoringOutcome) -> ScoringOutcome {
        if outcome.snapshot_due {
            self.save_snapshot();
        }
        outcome
    }

    fn save_snapshot(&mut self) {
        self.timeline.save(Snapshot::capture(&self.state));
    }

    // Game flow

    /// Records the finished game: set wins, the winning-chip row, and a
    /// snapshot. Arms the next-game transition when the match goes on.
    pub fn conclude_game(&mut self) -> Option<GameConclusion> {
        let winner = evaluator::game_winner(&self.config, &self.state)?;

        if self.config.best_of().is_some() {
            self.state.player_mut(winner).set_wins.push(true);
            self.state.player_mut(winner.opponent()).set_wins.push(false);
        }

        if let Some(chip) = self.state.winning_chip.take() {
            self.state.log(&self.config, winner, chip);
        }

        self.save_snapshot();

        let match_continues =
            self.config.best_of().is_some() && !evaluator::match_over(&self.config, &self.state);
        let next_game = match_continues.then(|| self.pending_reset.arm());

        tracing::info!(
            %winner,
            game = self.state.current_game_number,
            match_over = self.match_over(),
            "game concluded"
        );

        Some(GameConclusion { winner, next_game })
    }

    /// Deferred transition into the next game. No-op if `epoch` was cancelled
    /// by an undo or reset, or superseded.
    pub fn start_next_game(&mut self, epoch: u64) -> bool {
        if !self.pending_reset.fire(epoch) {
            return false;
        }

        for player in [Player::P1, Player::P2] {
            let score = self.state.player_mut(player);
            score.score = 0;
            score.show_warning = false;
        }
        self.state.winning_chip = None;
        self.state.current_game_number += 1;
        self.displayed_set_number = evaluator::displayed_set_number(&self.config, &self.state);
        self.save_snapshot();

        tracing::info!(game = self.state.current_game_number, "next game started");
        true
    }

    // Timeline

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.timeline.undo(&mut self.pending_reset).cloned() else {
            return false;
        };
        self.restore(&snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.timeline.redo().cloned() else {
            return false;
        };
        self.restore(&snapshot);
        true
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        snapshot.restore_into(&mut self.state);
        if self.config.best_of().is_some() {
            self.displayed_set_number = evaluator::displayed_set_number(&self.config, &self.state);
        }
        self.sync_next_game();
    }

    /// A concluded game of an unfinished best-of match always has the next
    /// game armed; any other state has nothing pending.
    fn sync_next_game(&mut self) {
        if !self.awaiting_next_game() {
            self.pending_reset.cancel();
        } else if !self.pending_reset.is_armed() {
            let epoch = self.pending_reset.arm();
            tracing::info!(epoch, "next game re-armed for concluded game");
        }
    }

    fn awaiting_next_game(&self) -> bool {
        let concluded =
            self.state.p1.set_wins.len() >= self.state.current_game_number as usize;
        self.config.best_of().is_some()
            && concluded
            && self.game_ended()
            && !self.match_over()
    }

    /// Clears scores, history and timeline. `reset_config` also restores the
    /// rule defaults.
    pub fn reset(&mut self, reset_config: bool) {
        self.pending_reset.cancel();
        self.state = ScoreState::default();
        self.timeline.reset();
        self.displayed_set_number = 1;
        if reset_config {
            self.config.reset_rules();
        }
        tracing::info!(reset_config, "scoreboard reset");
    }

    // Configuration. A rules change mid-game starts the match over.

    pub fn set_generation(&mut self, generation: Generation) -> bool {
        let changed = self.config.set_generation(generation);
        self.after_rules_change(changed, "generation")
    }

    pub fn set_match_type(&mut self, match_type: MatchType) -> bool {
        let changed = self.config.set_match_type(match_type);
        self.after_rules_change(changed, "match type")
    }

    pub fn set_custom_points(&mut self, points: u32) -> Result<bool, ParseOptionError> {
        let changed = self.config.set_custom_points(points)?;
        Ok(self.after_rules_change(changed, "custom points"))
    }

    pub fn set_best_of(&mut self, best_of: Option<BestOf>) -> bool {
        let changed = self.config.set_best_of(best_of);
        self.after_rules_change(changed, "best-of")
    }

    pub fn set_own_finish_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.config.set_own_finish_enabled(enabled);
        self.after_rules_change(changed, "own finish")
    }

    pub fn set_player_name(&mut self, player: Player, name: String) {
        match player {
            Player::P1 => self.config.player1_name = name,
            Player::P2 => self.config.player2_name = name,
        }
    }

    fn after_rules_change(&mut self, changed: bool, setting: &str) -> bool {
        if changed && evaluator::game_has_started(&self.state) {
            tracing::info!(setting, "rules changed mid-game, resetting scores");
            self.reset(false);
        }
        changed
    }

    // Derived

    pub fn game_ended(&self) -> bool {
        evaluator::game_ended(&self.config, &self.state)
    }

    pub fn match_over(&self) -> bool {
        evaluator::match_over(&self.config, &self.state)
    }

    pub fn match_winner(&self) -> Option<Player> {
        evaluator::match_winner(&self.config, &self.state)
    }

    pub fn summary(&self) -> ResultsSummary {
        ResultsSummary::build(
            self.config.generation(),
            &self.state.match_history,
            self.match_winner(),
        )
    }

    pub fn view(&self) -> ScoreboardView {
        ScoreboardView::build(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::ChipLabel;

    fn best_of_three() -> Session {
        let mut config = MatchConfig::default();
        config.set_best_of(Some(BestOf::Three));
        Session::new(config)
    }

    /// Plays `player` to 4 points in two OVR hits and concludes the game.
    fn win_game(session: &mut Session, player: Player) -> GameConclusion {
        session.score_increase(player, 2, "OVR");
        let outcome = session.score_increase(player, 2, "OVR");
        assert!(outcome.game_will_end);
        session.conclude_game().expect("game should have a winner")
    }

    #[test]
    fn test_every_scoring_action_snapshots() {
        let mut session = Session::default();
        session.score_increase(Player::P1, 1, "SPF");
        session.own_finish(Player::P1);
        session.penalty(Player::P2);
        session.warning_toggle(Player::P2);
        session.warning_toggle(Player::P2);
        assert_eq!(session.timeline().snapshots().len(), 6);
        assert_eq!(session.timeline().current(), &Snapshot::capture(session.state()));
    }

    #[test]
    fn test_blocked_actions_do_not_snapshot() {
        let mut session = Session::default();
        session.score_increase(Player::P2, 4, "XTR");
        let len = session.timeline().snapshots().len();
        session.score_increase(Player::P2, 1, "XTR");
        session.own_finish(Player::P1);
        session.penalty(Player::P1);
        assert_eq!(session.timeline().snapshots().len(), len);
    }

    #[test]
    fn test_conclude_single_game() {
        let mut session = Session::default();
        session.score_increase(Player::P1, 3, "XTR");
        session.score_increase(Player::P1, 2, "OVR");
        let conclusion = session.conclude_game().unwrap();
        assert_eq!(conclusion.winner, Player::P1);
        assert_eq!(conclusion.next_game, None);
        assert!(session.state().p1.set_wins.is_empty());
        assert_eq!(session.state().match_history[0].chip_label, ChipLabel::Over);
        assert_eq!(session.state().match_history[0].score1, 5);
        assert_eq!(session.match_winner(), Some(Player::P1));
        assert_eq!(session.summary().items[2].value, 1);
    }

    #[test]
    fn test_conclude_without_winner() {
        let mut session = Session::default();
        session.score_increase(Player::P1, 1, "XTR");
        assert_eq!(session.conclude_game(), None);
    }

    #[test]
    fn test_best_of_three_flow() {
        let mut session = best_of_three();

        let first = win_game(&mut session, Player::P1);
        let epoch = first.next_game.expect("match should continue");
        assert_eq!(session.state().p1.set_wins, vec![true]);
        assert_eq!(session.state().p2.set_wins, vec![false]);
        assert_eq!(session.state().match_history[0].set_wins, 1);
        assert!(session.next_game_pending());

        assert!(session.start_next_game(epoch));
        assert_eq!(session.state().p1.score, 0);
        assert_eq!(session.state().current_game_number, 2);
        assert_eq!(session.displayed_set_number(), 2);

        let second = win_game(&mut session, Player::P1);
        assert_eq!(second.next_game, None);
        assert!(session.match_over());
        assert_eq!(session.match_winner(), Some(Player::P1));
        assert_eq!(session.state().p2.won_sets(), 0);
    }

    #[test]
    fn test_undo_cancels_next_game() {
        let mut session = best_of_three();
        let epoch = win_game(&mut session, Player::P2).next_game.unwrap();

        assert!(session.undo());
        assert!(!session.next_game_pending());
        assert!(!session.start_next_game(epoch));
        // Conclusion and winning hit are stepped over together
        assert_eq!(session.state().p2.score, 2);
        assert!(session.state().p2.set_wins.is_empty());
        assert_eq!(session.displayed_set_number(), 1);
    }

    #[test]
    fn test_undo_from_next_game_restores_winning_score() {
        let mut session = best_of_three();
        let epoch = win_game(&mut session, Player::P1).next_game.unwrap();
        session.start_next_game(epoch);

        assert!(session.undo());
        assert_eq!(session.state().p1.score, 4);
        assert!(session.state().p1.set_wins.is_empty());
    }

    #[test]
    fn test_redo_into_concluded_game_rearms_next_game() {
        let mut session = best_of_three();
        let epoch = win_game(&mut session, Player::P1).next_game.unwrap();

        assert!(session.undo());
        assert!(!session.next_game_pending());

        assert!(session.redo());
        assert_eq!(session.state().p1.score, 4);
        assert!(session.state().p1.set_wins.is_empty());
        assert!(!session.next_game_pending());

        assert!(session.redo());
        assert_eq!(session.state().p1.set_wins, vec![true]);
        assert!(session.timeline().redo_disabled());
        assert!(session.next_game_pending());
        assert!(!session.start_next_game(epoch));

        let rearmed = session.pending_next_game().unwrap();
        assert!(session.start_next_game(rearmed));
        assert_eq!(session.state().current_game_number, 2);
        assert_eq!(session.state().p1.score, 0);
    }

    #[test]
    fn test_loaded_concluded_game_is_armed() {
        let mut config = MatchConfig::default();
        config.set_best_of(Some(BestOf::Three));
        let mut state = ScoreState::default();
        state.p2.score = 4;
        state.p1.set_wins = vec![false];
        state.p2.set_wins = vec![true];

        let session = Session::from_parts(config.clone(), state.clone(), Timeline::default(), 1);
        assert!(session.next_game_pending());

        // Not yet concluded: the winning hit is on record but no set was added
        state.p1.set_wins.clear();
        state.p2.set_wins.clear();
        let session = Session::from_parts(config, state, Timeline::default(), 1);
        assert!(!session.next_game_pending());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut session = Session::default();
        session.score_increase(Player::P1, 1, "SPF");
        session.score_increase(Player::P2, 2, "BST");
        let before = Snapshot::capture(session.state());

        assert!(session.undo());
        assert_eq!(session.state().p2.score, 0);
        assert!(session.redo());
        assert_eq!(Snapshot::capture(session.state()), before);
        assert!(!session.redo());
    }

    #[test]
    fn test_warning_undo_steps_over_previous_action() {
        let mut session = Session::default();
        session.score_increase(Player::P1, 1, "SPF");
        session.warning_toggle(Player::P2);
        let warned = Snapshot::capture(session.state());

        // Same scores and set counts as its predecessor: stepped over with it
        assert!(session.undo());
        assert_eq!(session.timeline().index(), 0);
        assert_eq!(session.state().p1.score, 0);

        // One redo only brings back the skipped score, a second the warning
        assert!(session.redo());
        assert_eq!(session.state().p1.score, 1);
        assert!(!session.state().p2.show_warning);
        assert_ne!(Snapshot::capture(session.state()), warned);

        assert!(session.redo());
        assert_eq!(Snapshot::capture(session.state()), warned);
    }

    #[test]
    fn test_reset_keeps_config() {
        let mut session = best_of_three();
        session.set_generation(Generation::Burst);
        session.score_increase(Player::P1, 2, "BST");
        session.reset(false);

        assert_eq!(session.state(), &ScoreState::default());
        assert_eq!(session.timeline(), &Timeline::default());
        assert_eq!(session.config().generation(), Generation::Burst);
        assert_eq!(session.config().best_of(), Some(BestOf::Three));
    }

    #[test]
    fn test_reset_with_config_restores_defaults() {
        let mut session = best_of_three();
        session.set_match_type(MatchType::SevenPoints);
        session.set_own_finish_enabled(true);
        session.score_increase(Player::P1, 2, "XTR");
        session.reset(true);

        let config = session.config();
        assert_eq!(config.generation(), Generation::X);
        assert_eq!(config.match_type(), MatchType::FourPoints);
        assert_eq!(config.best_of(), None);
        assert!(!config.own_finish_enabled());
        assert!(session.state().match_history.is_empty());
    }

    #[test]
    fn test_rules_change_mid_game_resets_scores() {
        let mut session = Session::default();
        session.score_increase(Player::P1, 1, "XTR");
        session.set_player_name(Player::P1, "Bird".to_string());
        assert_eq!(session.state().p1.score, 1);

        assert!(session.set_match_type(MatchType::FivePoints));
        assert_eq!(session.state().p1.score, 0);
        assert_eq!(session.config().player1_name, "Bird");
    }

    #[test]
    fn test_rules_change_before_start_keeps_timeline() {
        let mut session = Session::default();
        assert!(session.set_best_of(Some(BestOf::Five)));
        assert!(!session.set_best_of(Some(BestOf::Five)));
        assert_eq!(session.timeline().snapshots().len(), 1);
    }
}
