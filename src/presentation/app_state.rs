// Application state for HTTP handlers
use crate::application::scoreboard_service::ScoreboardService;

#[derive(Clone)]
pub struct AppState {
    pub scoreboard_service: ScoreboardService,
}
