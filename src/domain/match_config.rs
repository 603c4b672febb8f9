// Match configuration domain model
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::rules::{DEFAULT_CUSTOM_POINTS, MAX_CUSTOM_POINTS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseOptionError {
    #[error("unknown generation: {0}")]
    Generation(String),
    #[error("unknown match type: {0}")]
    MatchType(String),
    #[error("best-of must be 3 or 5, got {0}")]
    BestOf(u8),
    #[error("custom points must be between 1 and {max}, got {0}", max = MAX_CUSTOM_POINTS)]
    CustomPoints(u32),
}

/// Ruleset family; decides which win conditions are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Generation {
    #[default]
    #[serde(rename = "x")]
    X,
    #[serde(rename = "burst")]
    Burst,
    #[serde(rename = "mfb-zero-g")]
    MetalFightZeroG,
    #[serde(rename = "plastics-hms")]
    PlasticsHms,
}

impl Generation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Generation::X => "x",
            Generation::Burst => "burst",
            Generation::MetalFightZeroG => "mfb-zero-g",
            Generation::PlasticsHms => "plastics-hms",
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Generation {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Generation::X),
            "burst" => Ok(Generation::Burst),
            "mfb-zero-g" => Ok(Generation::MetalFightZeroG),
            "plastics-hms" => Ok(Generation::PlasticsHms),
            other => Err(ParseOptionError::Generation(other.to_string())),
        }
    }
}

/// Points-to-win mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchType {
    #[serde(rename = "3pts")]
    ThreePoints,
    #[default]
    #[serde(rename = "4pts")]
    FourPoints,
    #[serde(rename = "5pts")]
    FivePoints,
    #[serde(rename = "7pts")]
    SevenPoints,
    #[serde(rename = "custom")]
    Custom,
    #[serde(rename = "nolimit")]
    NoLimit,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::ThreePoints => "3pts",
            MatchType::FourPoints => "4pts",
            MatchType::FivePoints => "5pts",
            MatchType::SevenPoints => "7pts",
            MatchType::Custom => "custom",
            MatchType::NoLimit => "nolimit",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3pts" => Ok(MatchType::ThreePoints),
            "4pts" => Ok(MatchType::FourPoints),
            "5pts" => Ok(MatchType::FivePoints),
            "7pts" => Ok(MatchType::SevenPoints),
            "custom" => Ok(MatchType::Custom),
            "nolimit" => Ok(MatchType::NoLimit),
            other => Err(ParseOptionError::MatchType(other.to_string())),
        }
    }
}

/// Number of games in a set-based match. `None` at the config level means a
/// single-game match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BestOf {
    Three,
    Five,
}

impl BestOf {
    pub fn games(&self) -> usize {
        match self {
            BestOf::Three => 3,
            BestOf::Five => 5,
        }
    }

    pub fn sets_needed(&self) -> usize {
        self.games() / 2 + 1
    }
}

impl TryFrom<u8> for BestOf {
    type Error = ParseOptionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(BestOf::Three),
            5 => Ok(BestOf::Five),
            other => Err(ParseOptionError::BestOf(other)),
        }
    }
}

impl From<BestOf> for u8 {
    fn from(value: BestOf) -> Self {
        value.games() as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    generation: Generation,
    match_type: MatchType,
    custom_points: u32,
    best_of: Option<BestOf>,
    own_finish_enabled: bool,
    pub player1_name: String,
    pub player2_name: String,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            generation: Generation::default(),
            match_type: MatchType::default(),
            custom_points: DEFAULT_CUSTOM_POINTS,
            best_of: None,
            own_finish_enabled: false,
            player1_name: String::new(),
            player2_name: String::new(),
        }
    }
}

impl MatchConfig {
    /// Builds a config from raw parts, re-establishing the own-finish invariant.
    pub fn from_parts(
        generation: Generation,
        match_type: MatchType,
        custom_points: u32,
        best_of: Option<BestOf>,
        own_finish_enabled: bool,
    ) -> Self {
        let mut config = Self {
            generation,
            match_type,
            custom_points: custom_points.clamp(1, MAX_CUSTOM_POINTS),
            best_of,
            own_finish_enabled,
            ..Self::default()
        };
        config.enforce_own_finish();
        config
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn custom_points(&self) -> u32 {
        self.custom_points
    }

    pub fn best_of(&self) -> Option<BestOf> {
        self.best_of
    }

    pub fn own_finish_enabled(&self) -> bool {
        self.own_finish_enabled
    }

    /// Target score for the current match type, `None` when there is no limit.
    pub fn max_points(&self) -> Option<i32> {
        super::rules::max_points(self.match_type, self.custom_points)
    }

    // Each setter returns true when the scoring rules actually changed.

    pub fn set_generation(&mut self, generation: Generation) -> bool {
        if self.generation == generation {
            return false;
        }
        self.generation = generation;
        self.enforce_own_finish();
        true
    }

    pub fn set_match_type(&mut self, match_type: MatchType) -> bool {
        if self.match_type == match_type {
            return false;
        }
        self.match_type = match_type;
        true
    }

    pub fn set_custom_points(&mut self, points: u32) -> Result<bool, ParseOptionError> {
        if points == 0 || points > MAX_CUSTOM_POINTS {
            return Err(ParseOptionError::CustomPoints(points));
        }
        if self.custom_points == points {
            return Ok(false);
        }
        self.custom_points = points;
        // Only a rules change when the custom target is the active one
        Ok(self.match_type == MatchType::Custom)
    }

    pub fn set_best_of(&mut self, best_of: Option<BestOf>) -> bool {
        if self.best_of == best_of {
            return false;
        }
        self.best_of = best_of;
        true
    }

    pub fn set_own_finish_enabled(&mut self, enabled: bool) -> bool {
        let before = self.own_finish_enabled;
        self.own_finish_enabled = enabled;
        self.enforce_own_finish();
        before != self.own_finish_enabled
    }

    /// Restores rule defaults while keeping player names.
    pub fn reset_rules(&mut self) {
        let names = (
            std::mem::take(&mut self.player1_name),
            std::mem::take(&mut self.player2_name),
        );
        *self = Self::default();
        self.player1_name = names.0;
        self.player2_name = names.1;
    }

    fn enforce_own_finish(&mut self) {
        if self.generation != Generation::X {
            self.own_finish_enabled = false;
        }
    }
}
