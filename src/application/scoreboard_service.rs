// Scoreboard service - use cases for one live scoring session
use crate::application::snapshot_store::SnapshotStore;
use crate::domain::match_config::{BestOf, Generation, MatchType, ParseOptionError};
use crate::domain::player::Player;
use crate::domain::rules::MAX_CUSTOM_POINTS;
use crate::domain::scoring::ScoringOutcome;
use crate::domain::session::Session;
use crate::domain::summary::ResultsSummary;
use crate::domain::view::ScoreboardView;
use crate::infrastructure::state_record::{session_from_record, session_to_record};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::AbortHandle;

const UPDATE_CHANNEL_CAPACITY: usize = 32;

/// Partial settings change; absent fields stay as they are.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SettingsUpdate {
    pub generation: Option<String>,
    pub match_type: Option<String>,
    pub custom_points: Option<u32>,
    /// 3 or 5; 0 switches back to a single-game match
    pub best_of: Option<u8>,
    pub own_finish_enabled: Option<bool>,
    pub player1_name: Option<String>,
    pub player2_name: Option<String>,
}

#[derive(Clone)]
pub struct ScoreboardService {
    session: Arc<Mutex<Session>>,
    store: Arc<dyn SnapshotStore>,
    updates: broadcast::Sender<ScoreboardView>,
    next_game_delay: Duration,
    /// Running next-game timer and the epoch it fires with.
    next_game_timer: Arc<Mutex<Option<(u64, AbortHandle)>>>,
}

impl ScoreboardService {
    /// Restores the saved session, or starts fresh when there is none or the
    /// store cannot be read.
    pub async fn load(store: Arc<dyn SnapshotStore>, next_game_delay: Duration) -> Self {
        let session = match store.load().await {
            Ok(Some(record)) => {
                tracing::info!("restored saved scoreboard");
                session_from_record(&record)
            }
            Ok(None) => Session::default(),
            Err(e) => {
                tracing::error!(error = %e, "failed to load saved scoreboard, starting fresh");
                Session::default()
            }
        };

        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let service = Self {
            session: Arc::new(Mutex::new(session)),
            store,
            updates,
            next_game_delay,
            next_game_timer: Arc::new(Mutex::new(None)),
        };

        // A saved concluded game resumes its countdown
        {
            let session = service.session.lock().await;
            service.sync_next_game_timer(&session).await;
        }
        service
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScoreboardView> {
        self.updates.subscribe()
    }

    pub async fn view(&self) -> ScoreboardView {
        self.session.lock().await.view()
    }

    pub async fn summary(&self) -> ResultsSummary {
        self.session.lock().await.summary()
    }

    pub async fn score_increase(&self, player: Player, points: i32, chip: &str) -> ScoreboardView {
        tracing::debug!(%player, points, chip, "score increase");
        self.score(|session| session.score_increase(player, points, chip))
            .await
    }

    pub async fn own_finish(&self, player: Player) -> ScoreboardView {
        tracing::debug!(%player, "own finish");
        self.score(|session| session.own_finish(player)).await
    }

    pub async fn penalty(&self, player: Player) -> ScoreboardView {
        tracing::debug!(%player, "penalty");
        self.score(|session| session.penalty(player)).await
    }

    pub async fn warning_toggle(&self, player: Player) -> ScoreboardView {
        tracing::debug!(%player, "warning toggle");
        self.score(|session| session.warning_toggle(player)).await
    }

    pub async fn undo(&self) -> ScoreboardView {
        let mut session = self.session.lock().await;
        if !session.undo() {
            return session.view();
        }
        self.publish(&session).await
    }

    pub async fn redo(&self) -> ScoreboardView {
        let mut session = self.session.lock().await;
        if !session.redo() {
            return session.view();
        }
        self.publish(&session).await
    }

    pub async fn reset(&self, reset_config: bool) -> ScoreboardView {
        let mut session = self.session.lock().await;
        session.reset(reset_config);
        self.publish(&session).await
    }

    /// Applies a settings change. Every value is validated before anything is
    /// applied, so a bad request leaves the session untouched.
    pub async fn update_settings(
        &self,
        update: SettingsUpdate,
    ) -> Result<ScoreboardView, ParseOptionError> {
        let generation = update
            .generation
            .as_deref()
            .map(str::parse::<Generation>)
            .transpose()?;
        let match_type = update
            .match_type
            .as_deref()
            .map(str::parse::<MatchType>)
            .transpose()?;
        let best_of = match update.best_of {
            None => None,
            Some(0) => Some(None),
            Some(games) => Some(Some(BestOf::try_from(games)?)),
        };
        if let Some(points) = update.custom_points {
            if points == 0 || points > MAX_CUSTOM_POINTS {
                return Err(ParseOptionError::CustomPoints(points));
            }
        }

        let mut session = self.session.lock().await;
        if let Some(generation) = generation {
            session.set_generation(generation);
        }
        if let Some(match_type) = match_type {
            session.set_match_type(match_type);
        }
        if let Some(points) = update.custom_points {
            session.set_custom_points(points)?;
        }
        if let Some(best_of) = best_of {
            session.set_best_of(best_of);
        }
        if let Some(enabled) = update.own_finish_enabled {
            session.set_own_finish_enabled(enabled);
        }
        if let Some(name) = update.player1_name {
            session.set_player_name(Player::P1, name);
        }
        if let Some(name) = update.player2_name {
            session.set_player_name(Player::P2, name);
        }

        Ok(self.publish(&session).await)
    }

    /// Runs one scoring action. When the action ends a game that was still
    /// running, the game is concluded and the next one scheduled.
    async fn score<F>(&self, action: F) -> ScoreboardView
    where
        F: FnOnce(&mut Session) -> ScoringOutcome,
    {
        let mut session = self.session.lock().await;
        let was_ended = session.game_ended();
        let outcome = action(&mut *session);

        if !outcome.snapshot_due {
            return session.view();
        }

        if outcome.game_will_end && !was_ended {
            if let Some(conclusion) = session.conclude_game() {
                tracing::debug!(
                    winner = %conclusion.winner,
                    next_game = ?conclusion.next_game,
                    "scoring action ended the game"
                );
            }
        }

        self.publish(&session).await
    }

    /// Matches the running timer to the session's armed epoch: a new epoch
    /// gets a fresh timer, a cancelled one has its timer aborted.
    async fn sync_next_game_timer(&self, session: &Session) {
        let mut timer = self.next_game_timer.lock().await;
        let pending = session.pending_next_game();
        if let Some((epoch, _)) = timer.as_ref() {
            if pending == Some(*epoch) {
                return;
            }
        }
        if let Some((epoch, handle)) = timer.take() {
            handle.abort();
            tracing::debug!(epoch, "next game cancelled");
        }

        let Some(epoch) = pending else {
            return;
        };
        let service = self.clone();
        let delay = self.next_game_delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            service.start_next_game(epoch).await;
        });
        *timer = Some((epoch, task.abort_handle()));
        tracing::debug!(epoch, ?delay, "next game scheduled");
    }

    async fn start_next_game(&self, epoch: u64) {
        let mut session = self.session.lock().await;
        {
            // The firing task is the timer itself and must not abort itself
            let mut timer = self.next_game_timer.lock().await;
            if timer.as_ref().is_some_and(|(armed, _)| *armed == epoch) {
                timer.take();
            }
        }
        if session.start_next_game(epoch) {
            self.save_and_broadcast(&session).await;
        }
    }

    /// Brings the timer in line with the session, persists it and pushes the
    /// new view to subscribers.
    async fn publish(&self, session: &Session) -> ScoreboardView {
        self.sync_next_game_timer(session).await;
        self.save_and_broadcast(session).await
    }

    async fn save_and_broadcast(&self, session: &Session) -> ScoreboardView {
        let view = session.view();
        match session_to_record(session) {
            Ok(record) => {
                if let Err(e) = self.store.save(&record).await {
                    tracing::error!(error = %e, "failed to save scoreboard");
                }
            }
            Err(e) => tracing::error!(error = %e, "failed to encode scoreboard, not saved"),
        }
        // No subscribers is fine
        let _ = self.updates.send(view.clone());
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::ChipLabel;
    use crate::infrastructure::memory_store::MemoryStore;
    use serde_json::json;

    const DELAY: Duration = Duration::from_millis(1500);

    async fn service_with(store: Arc<MemoryStore>) -> ScoreboardService {
        ScoreboardService::load(store, DELAY).await
    }

    async fn best_of_three(store: Arc<MemoryStore>) -> ScoreboardService {
        let service = service_with(store).await;
        service
            .update_settings(SettingsUpdate {
                best_of: Some(3),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn test_actions_are_persisted() {
        let store = Arc::new(MemoryStore::default());
        let service = service_with(store.clone()).await;

        let view = service.score_increase(Player::P1, 2, "BST").await;
        assert_eq!(view.players[0].score, 2);

        let saved = store.load().await.unwrap().unwrap();
        assert_eq!(saved["player1_score"], 2);
        assert_eq!(saved["history_index"], 1);
    }

    #[tokio::test]
    async fn test_load_restores_saved_session() {
        let store = Arc::new(MemoryStore::with_record(json!({
            "generation": "burst",
            "player1_score": 2,
            "player2_score": 1,
        })));
        let service = service_with(store).await;
        let view = service.view().await;
        assert_eq!(view.settings.generation, Generation::Burst);
        assert_eq!(view.players[0].score, 2);
        assert_eq!(view.players[1].score, 1);
    }

    #[tokio::test]
    async fn test_subscribers_receive_views() {
        let service = service_with(Arc::new(MemoryStore::default())).await;
        let mut updates = service.subscribe();

        service.warning_toggle(Player::P2).await;
        let view = updates.recv().await.unwrap();
        assert!(view.players[1].show_warning);
        assert_eq!(view.match_history[0].chip_label, ChipLabel::Warning);
    }

    #[tokio::test]
    async fn test_blocked_action_is_not_published() {
        let service = service_with(Arc::new(MemoryStore::default())).await;
        service.score_increase(Player::P1, 4, "XTR").await;
        let mut updates = service.subscribe();

        service.score_increase(Player::P1, 1, "XTR").await;
        assert!(updates.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_single_game_conclusion() {
        let service = service_with(Arc::new(MemoryStore::default())).await;
        service.score_increase(Player::P2, 3, "SPF").await;
        let view = service.score_increase(Player::P2, 1, "XTR").await;

        assert!(view.game_ended);
        assert_eq!(view.match_winner, Some(Player::P2));
        assert!(!view.next_game_pending);
        assert_eq!(view.match_history[0].chip_label, ChipLabel::Xtreme);

        let summary = service.summary().await;
        assert_eq!(summary.winner, Some(Player::P2));
        assert_eq!(summary.items[0].value, 1);
        assert_eq!(summary.items[3].value, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_game_starts_after_delay() {
        let service = best_of_three(Arc::new(MemoryStore::default())).await;
        service.score_increase(Player::P1, 2, "OVR").await;
        let view = service.score_increase(Player::P1, 2, "OVR").await;
        assert!(view.next_game_pending);
        assert_eq!(view.players[0].set_wins, vec![true]);
        assert_eq!(view.players[0].score, 4);

        tokio::time::sleep(DELAY + Duration::from_millis(10)).await;

        let view = service.view().await;
        assert!(!view.next_game_pending);
        assert_eq!(view.players[0].score, 0);
        assert_eq!(view.current_game_number, 2);
        assert_eq!(view.displayed_set_number, 2);
        assert_eq!(view.players[0].filled_stars, vec![true, false, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_redo_into_concluded_game_resumes_countdown() {
        let service = best_of_three(Arc::new(MemoryStore::default())).await;
        service.score_increase(Player::P1, 2, "OVR").await;
        service.score_increase(Player::P1, 2, "OVR").await;

        let view = service.undo().await;
        assert!(!view.next_game_pending);
        service.redo().await;
        let view = service.redo().await;
        assert!(view.redo_disabled);
        assert!(view.next_game_pending);
        assert_eq!(view.players[0].set_wins, vec![true]);

        tokio::time::sleep(DELAY + Duration::from_millis(10)).await;

        let view = service.view().await;
        assert!(!view.next_game_pending);
        assert_eq!(view.current_game_number, 2);
        assert_eq!(view.players[0].score, 0);
        assert_eq!(view.players[0].set_wins, vec![true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_resumes_concluded_game() {
        let store = Arc::new(MemoryStore::with_record(json!({
            "best_of": 3,
            "player1_score": 1,
            "player2_score": 4,
            "p1_set_wins": [false],
            "p2_set_wins": [true],
            "current_game_number": 1,
        })));
        let service = service_with(store.clone()).await;
        assert!(service.view().await.next_game_pending);

        tokio::time::sleep(DELAY + Duration::from_millis(10)).await;

        let view = service.view().await;
        assert_eq!(view.current_game_number, 2);
        assert_eq!(view.players[1].score, 0);
        assert_eq!(view.displayed_set_number, 2);

        let saved = store.load().await.unwrap().unwrap();
        assert_eq!(saved["current_game_number"], 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undo_cancels_scheduled_next_game() {
        let service = best_of_three(Arc::new(MemoryStore::default())).await;
        service.score_increase(Player::P2, 2, "OVR").await;
        service.score_increase(Player::P2, 2, "OVR").await;

        let view = service.undo().await;
        assert!(!view.next_game_pending);
        assert_eq!(view.players[1].score, 2);

        tokio::time::sleep(DELAY * 2).await;

        let view = service.view().await;
        assert_eq!(view.players[1].score, 2);
        assert_eq!(view.current_game_number, 1);
        assert!(view.players[1].set_wins.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_match_over_schedules_nothing() {
        let service = best_of_three(Arc::new(MemoryStore::default())).await;
        for _ in 0..2 {
            service.score_increase(Player::P1, 4, "XTR").await;
            tokio::time::sleep(DELAY + Duration::from_millis(10)).await;
        }

        let view = service.view().await;
        assert!(view.match_over);
        assert_eq!(view.match_winner, Some(Player::P1));
        assert!(!view.next_game_pending);
        assert_eq!(view.players[0].score, 4);
        assert_eq!(view.displayed_set_number, 2);
    }

    #[tokio::test]
    async fn test_scoring_after_game_end_does_not_conclude_twice() {
        let service = best_of_three(Arc::new(MemoryStore::default())).await;
        service.score_increase(Player::P1, 4, "XTR").await;
        let view = service.score_increase(Player::P2, 4, "XTR").await;

        assert_eq!(view.players[0].set_wins, vec![true]);
        assert_eq!(view.players[1].set_wins, vec![false]);
    }

    #[tokio::test]
    async fn test_invalid_settings_leave_session_untouched() {
        let service = service_with(Arc::new(MemoryStore::default())).await;
        service.score_increase(Player::P1, 1, "XTR").await;

        let result = service
            .update_settings(SettingsUpdate {
                match_type: Some("5pts".to_string()),
                best_of: Some(4),
                ..SettingsUpdate::default()
            })
            .await;
        assert_eq!(result.unwrap_err(), ParseOptionError::BestOf(4));

        let view = service.view().await;
        assert_eq!(view.settings.match_type, MatchType::FourPoints);
        assert_eq!(view.players[0].score, 1);

        let result = service
            .update_settings(SettingsUpdate {
                match_type: Some("custom".to_string()),
                custom_points: Some(3_000_000_000),
                ..SettingsUpdate::default()
            })
            .await;
        assert_eq!(result.unwrap_err(), ParseOptionError::CustomPoints(3_000_000_000));

        let view = service.view().await;
        assert_eq!(view.settings.max_points, Some(4));
        assert!(!view.game_ended);
    }

    #[tokio::test]
    async fn test_rules_change_resets_started_game() {
        let service = service_with(Arc::new(MemoryStore::default())).await;
        service.score_increase(Player::P1, 1, "XTR").await;

        let view = service
            .update_settings(SettingsUpdate {
                generation: Some("burst".to_string()),
                player1_name: Some("Valt".to_string()),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();
        assert_eq!(view.players[0].score, 0);
        assert_eq!(view.players[0].name, "Valt");
        assert!(view.undo_disabled);
    }

    #[tokio::test]
    async fn test_reset_with_config() {
        let service = best_of_three(Arc::new(MemoryStore::default())).await;
        service.score_increase(Player::P1, 1, "XTR").await;

        let view = service.reset(false).await;
        assert_eq!(view.settings.best_of, Some(3));
        assert!(!view.game_has_started);

        let view = service.reset(true).await;
        assert_eq!(view.settings.best_of, None);
        assert_eq!(view.settings.match_type, MatchType::FourPoints);
    }
}
