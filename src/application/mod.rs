// Application layer - use cases over the scoring session
pub mod scoreboard_service;
pub mod snapshot_store;
