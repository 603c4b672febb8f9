// Domain layer - scoring rules, engine, timeline and read models
pub mod evaluator;
pub mod history;
pub mod match_config;
pub mod player;
pub mod rules;
pub mod scoring;
pub mod session;
pub mod summary;
pub mod timeline;
pub mod view;
