// Player identity and per-player scoring state
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    P1,
    P2,
}

impl Player {
    pub fn opponent(&self) -> Player {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::P1 => "p1",
            Player::P2 => "p2",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub score: i32,
    pub show_warning: bool,
    /// One entry per completed game of a best-of match, true if this player won it.
    pub set_wins: Vec<bool>,
}

impl PlayerScore {
    pub fn won_sets(&self) -> usize {
        self.set_wins.iter().filter(|won| **won).count()
    }

    /// Star fills for a best-of display; positions past the played games stay unfilled.
    pub fn filled_stars(&self, games: usize) -> Vec<bool> {
        (0..games)
            .map(|index| self.set_wins.get(index).copied().unwrap_or(false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Player::P1.opponent(), Player::P2);
        assert_eq!(Player::P2.opponent(), Player::P1);
    }

    #[test]
    fn test_filled_stars() {
        let score = PlayerScore {
            set_wins: vec![true, false],
            ..PlayerScore::default()
        };
        assert_eq!(score.filled_stars(3), vec![true, false, false]);
        assert_eq!(score.won_sets(), 1);
        assert!(PlayerScore::default().filled_stars(0).is_empty());
    }
}
