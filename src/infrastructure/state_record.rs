// Mapper between the scoring session and its persisted JSON record
use crate::domain::history::{ChipLabel, HistoryEntry};
use crate::domain::match_config::{BestOf, Generation, MatchConfig, MatchType};
use crate::domain::player::PlayerScore;
use crate::domain::rules::{DEFAULT_CUSTOM_POINTS, MAX_CUSTOM_POINTS};
use crate::domain::scoring::ScoreState;
use crate::domain::session::Session;
use crate::domain::timeline::{Snapshot, Timeline};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Fixed identifier the record is stored under.
pub const APP_KEY: &str = "beyblade-scoreboard";

#[derive(Debug, Serialize)]
struct StoredRecord<'a> {
    key: &'static str,
    saved_at: String,
    generation: Generation,
    match_type: MatchType,
    custom_points: u32,
    best_of: Option<BestOf>,
    own_finish_enabled: bool,
    player1_name: &'a str,
    player2_name: &'a str,
    player1_score: i32,
    player2_score: i32,
    p1_set_wins: &'a [bool],
    p2_set_wins: &'a [bool],
    p1_show_warning: bool,
    p2_show_warning: bool,
    match_history: &'a [HistoryEntry],
    current_game_number: u32,
    displayed_set_number: usize,
    winning_chip: Option<ChipLabel>,
    history: &'a [Snapshot],
    history_index: usize,
}

pub fn session_to_record(session: &Session) -> serde_json::Result<Value> {
    let config = session.config();
    let state = session.state();
    let record = StoredRecord {
        key: APP_KEY,
        saved_at: chrono::Utc::now().to_rfc3339(),
        generation: config.generation(),
        match_type: config.match_type(),
        custom_points: config.custom_points(),
        best_of: config.best_of(),
        own_finish_enabled: config.own_finish_enabled(),
        player1_name: &config.player1_name,
        player2_name: &config.player2_name,
        player1_score: state.p1.score,
        player2_score: state.p2.score,
        p1_set_wins: &state.p1.set_wins,
        p2_set_wins: &state.p2.set_wins,
        p1_show_warning: state.p1.show_warning,
        p2_show_warning: state.p2.show_warning,
        match_history: &state.match_history,
        current_game_number: state.current_game_number,
        displayed_set_number: session.displayed_set_number(),
        winning_chip: state.winning_chip,
        history: session.timeline().snapshots(),
        history_index: session.timeline().index(),
    };

    serde_json::to_value(record)
}

/// Rebuilds a session from a stored record. Each field that is missing or
/// malformed falls back to its default on its own.
pub fn session_from_record(record: &Value) -> Session {
    let mut config = MatchConfig::from_parts(
        field(record, "generation").unwrap_or_default(),
        field(record, "match_type").unwrap_or_default(),
        field::<u32>(record, "custom_points")
            .filter(|points| (1..=MAX_CUSTOM_POINTS).contains(points))
            .unwrap_or(DEFAULT_CUSTOM_POINTS),
        field(record, "best_of").unwrap_or(None),
        field(record, "own_finish_enabled").unwrap_or(false),
    );
    config.player1_name = field(record, "player1_name").unwrap_or_default();
    config.player2_name = field(record, "player2_name").unwrap_or_default();

    let state = ScoreState {
        p1: PlayerScore {
            score: field(record, "player1_score").unwrap_or(0),
            show_warning: field(record, "p1_show_warning").unwrap_or(false),
            set_wins: field(record, "p1_set_wins").unwrap_or_default(),
        },
        p2: PlayerScore {
            score: field(record, "player2_score").unwrap_or(0),
            show_warning: field(record, "p2_show_warning").unwrap_or(false),
            set_wins: field(record, "p2_set_wins").unwrap_or_default(),
        },
        match_history: history_entries(record),
        current_game_number: field::<u32>(record, "current_game_number")
            .filter(|game| *game > 0)
            .unwrap_or(1),
        winning_chip: field(record, "winning_chip").unwrap_or(None),
    };

    let timeline = Timeline::from_parts(
        field(record, "history").unwrap_or_default(),
        field(record, "history_index").unwrap_or(usize::MAX),
    );

    Session::from_parts(
        config,
        state,
        timeline,
        field(record, "displayed_set_number").unwrap_or(1),
    )
}

fn field<T: DeserializeOwned>(record: &Value, name: &str) -> Option<T> {
    let value = record.get(name)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(field = name, error = %e, "ignoring malformed stored field");
            None
        }
    }
}

/// Keeps the readable rows of a stored history log and drops the rest.
fn history_entries(record: &Value) -> Vec<HistoryEntry> {
    let Some(rows) = record.get("match_history").and_then(Value::as_array) else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| serde_json::from_value(row.clone()).ok())
        .collect()
}
