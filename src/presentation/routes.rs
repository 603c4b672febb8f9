// Router - maps HTTP paths onto handlers
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_scoreboard, get_summary, health_check, own_finish, penalty, redo, reset, score_increase,
    stream_scoreboard, undo, update_settings, warning_toggle,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/scoreboard", get(get_scoreboard))
        .route("/scoreboard/stream", get(stream_scoreboard))
        .route("/scoreboard/summary", get(get_summary))
        .route("/settings", put(update_settings))
        .route("/players/:player/score", post(score_increase))
        .route("/players/:player/own-finish", post(own_finish))
        .route("/players/:player/penalty", post(penalty))
        .route("/players/:player/warning", post(warning_toggle))
        .route("/undo", post(undo))
        .route("/redo", post(redo))
        .route("/reset", post(reset))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
