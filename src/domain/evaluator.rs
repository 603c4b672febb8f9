// Set/match evaluator - derived values, recomputed on every call
use super::match_config::MatchConfig;
use super::player::Player;
use super::scoring::ScoreState;

pub fn sets_needed(config: &MatchConfig) -> Option<usize> {
    config.best_of().map(|best_of| best_of.sets_needed())
}

pub fn game_ended(config: &MatchConfig, state: &ScoreState) -> bool {
    match config.max_points() {
        Some(target) => state.p1.score >= target || state.p2.score >= target,
        None => false,
    }
}

/// Only best-of matches can be "over"; single games rely on [`game_ended`].
pub fn match_over(config: &MatchConfig, state: &ScoreState) -> bool {
    match sets_needed(config) {
        Some(needed) => state.p1.won_sets() >= needed || state.p2.won_sets() >= needed,
        None => false,
    }
}

/// Player at or over the target of a finished game, p1 checked first.
pub fn game_winner(config: &MatchConfig, state: &ScoreState) -> Option<Player> {
    let target = config.max_points()?;
    if state.p1.score >= target {
        Some(Player::P1)
    } else if state.p2.score >= target {
        Some(Player::P2)
    } else {
        None
    }
}

pub fn match_winner(config: &MatchConfig, state: &ScoreState) -> Option<Player> {
    match sets_needed(config) {
        Some(needed) => {
            if state.p1.won_sets() >= needed {
                Some(Player::P1)
            } else if state.p2.won_sets() >= needed {
                Some(Player::P2)
            } else {
                None
            }
        }
        None => game_winner(config, state),
    }
}

pub fn filled_stars(config: &MatchConfig, state: &ScoreState, player: Player) -> Vec<bool> {
    match config.best_of() {
        Some(best_of) => state.player(player).filled_stars(best_of.games()),
        None => Vec::new(),
    }
}

pub fn current_set_number(config: &MatchConfig, state: &ScoreState) -> Option<usize> {
    config.best_of()?;
    Some(displayed_set_number(config, state))
}

/// Set number shown on the scoreboard: completed sets once the match is over,
/// otherwise the set being played.
pub fn displayed_set_number(config: &MatchConfig, state: &ScoreState) -> usize {
    let completed = state.p1.set_wins.len();
    if match_over(config, state) {
        completed
    } else {
        completed + 1
    }
}

pub fn game_has_started(state: &ScoreState) -> bool {
    state.p1.score > 0
        || state.p2.score > 0
        || !state.match_history.is_empty()
        || !state.p1.set_wins.is_empty()
        || !state.p2.set_wins.is_empty()
}
