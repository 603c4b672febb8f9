// Scoreboard read model handed to display clients
use serde::Serialize;

use super::evaluator;
use super::history::HistoryEntry;
use super::match_config::{Generation, MatchType};
use super::player::Player;
use super::rules;
use super::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsView {
    pub generation: Generation,
    pub generation_label: &'static str,
    pub match_type: MatchType,
    pub points_to_win_label: String,
    pub match_types: Vec<MatchType>,
    pub custom_points: u32,
    pub max_points: Option<i32>,
    pub best_of: Option<u8>,
    pub sets_label: String,
    pub own_finish_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub player: Player,
    pub name: String,
    pub display_name: String,
    pub score: i32,
    pub show_warning: bool,
    pub set_wins: Vec<bool>,
    pub filled_stars: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreboardView {
    pub settings: SettingsView,
    pub players: Vec<PlayerView>,
    pub match_history: Vec<HistoryEntry>,
    pub current_game_number: u32,
    pub displayed_set_number: usize,
    pub current_set_number: Option<usize>,
    pub sets_needed: Option<usize>,
    pub game_has_started: bool,
    pub game_ended: bool,
    pub match_over: bool,
    pub match_winner: Option<Player>,
    pub next_game_pending: bool,
    pub undo_disabled: bool,
    pub redo_disabled: bool,
}

impl ScoreboardView {
    pub fn build(session: &Session) -> Self {
        let config = session.config();
        let state = session.state();
        let limit = rules::name_truncation_limit(config.best_of());

        let players = [Player::P1, Player::P2]
            .into_iter()
            .map(|player| {
                let name = match player {
                    Player::P1 => &config.player1_name,
                    Player::P2 => &config.player2_name,
                };
                let full_name = rules::player_display_name(player, name);
                let score = state.player(player);
                PlayerView {
                    player,
                    display_name: rules::format_display_name(&full_name, limit),
                    name: full_name,
                    score: score.score,
                    show_warning: score.show_warning,
                    set_wins: score.set_wins.clone(),
                    filled_stars: evaluator::filled_stars(config, state, player),
                }
            })
            .collect();

        Self {
            settings: SettingsView {
                generation: config.generation(),
                generation_label: rules::generation_label(config.generation()),
                match_type: config.match_type(),
                points_to_win_label: rules::points_to_win_label(
                    config.match_type(),
                    config.custom_points(),
                ),
                match_types: rules::match_types_for(config.generation()).to_vec(),
                custom_points: config.custom_points(),
                max_points: config.max_points(),
                best_of: config.best_of().map(u8::from),
                sets_label: rules::sets_label(config.best_of()),
                own_finish_enabled: config.own_finish_enabled(),
            },
            players,
            match_history: state.match_history.clone(),
            current_game_number: state.current_game_number,
            displayed_set_number: session.displayed_set_number(),
            current_set_number: evaluator::current_set_number(config, state),
            sets_needed: evaluator::sets_needed(config),
            game_has_started: evaluator::game_has_started(state),
            game_ended: session.game_ended(),
            match_over: session.match_over(),
            match_winner: session.match_winner(),
            next_game_pending: session.next_game_pending(),
            undo_disabled: session.timeline().undo_disabled(),
            redo_disabled: session.timeline().redo_disabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::match_config::{BestOf, MatchConfig};

    #[test]
    fn test_view_of_fresh_session() {
        let view = Session::default().view();
        assert_eq!(view.settings.generation_label, "X");
        assert_eq!(view.settings.points_to_win_label, "4 Pts.");
        assert_eq!(view.settings.max_points, Some(4));
        assert_eq!(view.players[0].display_name, "Player 1");
        assert!(view.players[1].filled_stars.is_empty());
        assert!(view.undo_disabled && view.redo_disabled);
        assert!(!view.game_has_started);
        assert_eq!(view.match_winner, None);
    }

    #[test]
    fn test_view_truncates_names_in_best_of() {
        let mut config = MatchConfig::default();
        config.set_best_of(Some(BestOf::Five));
        config.player2_name = "Bell Daikokuten".to_string();
        let mut session = Session::new(config);
        session.score_increase(Player::P2, 1, "BST");

        let view = session.view();
        assert_eq!(view.players[1].name, "Bell Daikokuten");
        assert_eq!(view.players[1].display_name, "Bell Da...");
        assert_eq!(view.players[1].filled_stars, vec![false; 5]);
        assert_eq!(view.settings.best_of, Some(5));
        assert_eq!(view.current_set_number, Some(1));
        assert_eq!(view.sets_needed, Some(3));
        assert!(!view.undo_disabled);
    }
}
