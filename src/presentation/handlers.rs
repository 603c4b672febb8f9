// HTTP request handlers
use crate::application::scoreboard_service::SettingsUpdate;
use crate::domain::player::Player;
use crate::domain::summary::ResultsSummary;
use crate::domain::view::ScoreboardView;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::Stream;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub points: i32,
    /// Chip code or name; empty scores without a history row
    #[serde(default)]
    pub chip: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetQuery {
    #[serde(default)]
    pub reset_config: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_scoreboard(State(state): State<Arc<AppState>>) -> Json<ScoreboardView> {
    Json(state.scoreboard_service.view().await)
}

pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<ResultsSummary> {
    Json(state.scoreboard_service.summary().await)
}

/// Live scoreboard feed: the current view first, then one event per change.
pub async fn stream_scoreboard(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let service = state.scoreboard_service.clone();
    let mut updates = service.subscribe();
    let initial = service.view().await;

    let stream = async_stream::stream! {
        yield Event::default().event("scoreboard").json_data(&initial);
        loop {
            match updates.recv().await {
                Ok(view) => yield Event::default().event("scoreboard").json_data(&view),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "scoreboard subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn score_increase(
    Path(player): Path<Player>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScoreRequest>,
) -> Json<ScoreboardView> {
    Json(
        state
            .scoreboard_service
            .score_increase(player, request.points, &request.chip)
            .await,
    )
}

pub async fn own_finish(
    Path(player): Path<Player>,
    State(state): State<Arc<AppState>>,
) -> Json<ScoreboardView> {
    Json(state.scoreboard_service.own_finish(player).await)
}

pub async fn penalty(
    Path(player): Path<Player>,
    State(state): State<Arc<AppState>>,
) -> Json<ScoreboardView> {
    Json(state.scoreboard_service.penalty(player).await)
}

pub async fn warning_toggle(
    Path(player): Path<Player>,
    State(state): State<Arc<AppState>>,
) -> Json<ScoreboardView> {
    Json(state.scoreboard_service.warning_toggle(player).await)
}

pub async fn undo(State(state): State<Arc<AppState>>) -> Json<ScoreboardView> {
    Json(state.scoreboard_service.undo().await)
}

pub async fn redo(State(state): State<Arc<AppState>>) -> Json<ScoreboardView> {
    Json(state.scoreboard_service.redo().await)
}

pub async fn reset(
    Query(query): Query<ResetQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<ScoreboardView> {
    Json(state.scoreboard_service.reset(query.reset_config).await)
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Response {
    match state.scoreboard_service.update_settings(update).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "rejected settings update");
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}
