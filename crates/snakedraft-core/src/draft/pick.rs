// Roster positions and individual pick records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::player::Player;

/// Position labels used for eligibility and roster slots.
///
/// Variants are declared in display order so the derived `Ord` sorts roster
/// tables the way they are shown (C first, bench last).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "C")]
    Catcher,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    #[serde(rename = "SS")]
    ShortStop,
    #[serde(rename = "OF")]
    Outfield,
    #[serde(rename = "UTIL")]
    Utility,
    #[serde(rename = "SP")]
    StartingPitcher,
    #[serde(rename = "RP")]
    ReliefPitcher,
    #[serde(rename = "P")]
    Pitcher,
    #[serde(rename = "BN", alias = "BE")]
    Bench,
}

/// Every position, in display order.
pub const ALL_POSITIONS: &[Position] = &[
    Position::Catcher,
    Position::FirstBase,
    Position::SecondBase,
    Position::ThirdBase,
    Position::ShortStop,
    Position::Outfield,
    Position::Utility,
    Position::StartingPitcher,
    Position::ReliefPitcher,
    Position::Pitcher,
    Position::Bench,
];

impl Position {
    /// Parse a position label into a Position.
    ///
    /// Accepts the roster labels plus the common aliases found in projection
    /// sources: "LF"/"CF"/"RF" -> Outfield, "DH" -> Utility, "CL" ->
    /// ReliefPitcher, "BE" -> Bench. Case-insensitive.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" => Some(Position::Catcher),
            "1B" => Some(Position::FirstBase),
            "2B" => Some(Position::SecondBase),
            "3B" => Some(Position::ThirdBase),
            "SS" => Some(Position::ShortStop),
            "OF" | "LF" | "CF" | "RF" => Some(Position::Outfield),
            "UTIL" | "DH" => Some(Position::Utility),
            "SP" => Some(Position::StartingPitcher),
            "RP" | "CL" => Some(Position::ReliefPitcher),
            "P" => Some(Position::Pitcher),
            "BN" | "BE" => Some(Position::Bench),
            _ => None,
        }
    }

    /// Return the display label for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::ShortStop => "SS",
            Position::Outfield => "OF",
            Position::Utility => "UTIL",
            Position::StartingPitcher => "SP",
            Position::ReliefPitcher => "RP",
            Position::Pitcher => "P",
            Position::Bench => "BN",
        }
    }

    /// Whether this position is filled by pitchers.
    pub fn is_pitching(&self) -> bool {
        matches!(
            self,
            Position::StartingPitcher | Position::ReliefPitcher | Position::Pitcher
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// A single draft pick record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    /// Full snapshot of the drafted player.
    pub player: Player,
    /// Sequential pick number (1-indexed).
    pub pick_number: u32,
    /// Team that made the pick (0-indexed).
    pub team_index: usize,
}

impl Pick {
    pub fn player_id(&self) -> &str {
        &self.player.id
    }
}
