use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub game: GameSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageSettings {
    /// Directory for the saved scoreboard; state stays in memory when unset
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GameSettings {
    /// Pause between a concluded game and the automatic start of the next one
    #[serde(default = "default_next_game_delay_ms")]
    pub next_game_delay_ms: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            next_game_delay_ms: default_next_game_delay_ms(),
        }
    }
}

impl GameSettings {
    pub fn next_game_delay(&self) -> Duration {
        Duration::from_millis(self.next_game_delay_ms)
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_next_game_delay_ms() -> u64 {
    2000
}

/// Loads `config/scoreboard.*` when present, overridden by `SCOREBOARD__*`
/// environment variables (e.g. `SCOREBOARD__GAME__NEXT_GAME_DELAY_MS`).
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/scoreboard").required(false))
        .add_source(
            config::Environment::with_prefix("SCOREBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
