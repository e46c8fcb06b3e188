// Player records as supplied by the catalog.

use serde::{Deserialize, Serialize};

use crate::draft::pick::Position;

/// Ranking value used when a player has no ADP.
pub const UNKNOWN_ADP: f64 = 999.0;

/// Whether a player is drafted for hitting or pitching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    Batter,
    Pitcher,
}

/// Projected batting line. Zero for players without a batting projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattingStats {
    pub pa: u32,
    pub ab: u32,
    pub h: u32,
    pub doubles: u32,
    pub triples: u32,
    pub hr: u32,
    pub r: u32,
    pub rbi: u32,
    pub sb: u32,
    pub bb: u32,
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
}

/// Projected pitching line. Zero for players without a pitching projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchingStats {
    pub w: u32,
    pub l: u32,
    pub era: f64,
    pub g: u32,
    pub gs: u32,
    pub sv: u32,
    pub ip: f64,
    pub so: u32,
    pub whip: f64,
}

/// Both stat lines, always fully initialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub batting: BattingStats,
    pub pitching: PitchingStats,
}

/// A draftable player. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PlayerRecord")]
pub struct Player {
    /// Unique catalog identifier.
    pub id: String,
    pub name: String,
    /// MLB team abbreviation (e.g. "NYM").
    pub team: String,
    /// Primary position, used for need and scarcity lookups.
    pub position: Position,
    /// Eligible positions in preference order. Never empty.
    pub positions: Vec<Position>,
    /// Average draft position; lower is drafted earlier.
    pub adp: f64,
    /// Tier 1-5 derived from `adp`.
    pub tier: u8,
    /// Projected fantasy points. May be negative for pitchers.
    pub projected_points: f64,
    #[serde(rename = "type")]
    pub player_type: PlayerType,
    pub stats: PlayerStats,
    /// Set when batting and pitching projections were merged.
    pub is_two_way: bool,
}

/// Stored form of a player, where ranking fields may be absent.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRecord {
    id: String,
    name: String,
    team: String,
    position: Position,
    #[serde(default)]
    positions: Vec<Position>,
    #[serde(default = "unknown_adp")]
    adp: f64,
    tier: Option<u8>,
    #[serde(default)]
    projected_points: f64,
    #[serde(rename = "type")]
    player_type: PlayerType,
    #[serde(default)]
    stats: PlayerStats,
    #[serde(default)]
    is_two_way: bool,
}

fn unknown_adp() -> f64 {
    UNKNOWN_ADP
}

impl From<PlayerRecord> for Player {
    fn from(r: PlayerRecord) -> Self {
        let mut player = Player::new(r.id, r.name, r.team, r.position, r.positions, r.adp, r.projected_points, r.player_type);
        if let Some(tier) = r.tier {
            player.tier = tier;
        }
        player.stats = r.stats;
        player.is_two_way = r.is_two_way;
        player
    }
}

/// Tier for a ranking value: <=20 -> 1, <=50 -> 2, <=100 -> 3, <=150 -> 4,
/// else 5.
pub fn tier_for_adp(adp: f64) -> u8 {
    if adp <= 20.0 {
        1
    } else if adp <= 50.0 {
        2
    } else if adp <= 100.0 {
        3
    } else if adp <= 150.0 {
        4
    } else {
        5
    }
}

impl Player {
    /// Build a player with derived tier and empty stats.
    ///
    /// An empty `positions` list is replaced by the primary position, so the
    /// eligibility list is never empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        team: impl Into<String>,
        position: Position,
        positions: Vec<Position>,
        adp: f64,
        projected_points: f64,
        player_type: PlayerType,
    ) -> Self {
        let positions = if positions.is_empty() {
            vec![position]
        } else {
            positions
        };
        Player {
            id: id.into(),
            name: name.into(),
            team: team.into(),
            position,
            positions,
            adp,
            tier: tier_for_adp(adp),
            projected_points,
            player_type,
            stats: PlayerStats::default(),
            is_two_way: false,
        }
    }

    /// Whether the player may occupy `pos`. Bench accepts everyone.
    pub fn is_eligible_at(&self, pos: Position) -> bool {
        pos == Position::Bench || self.positions.contains(&pos)
    }

    pub fn is_pitcher(&self) -> bool {
        self.player_type == PlayerType::Pitcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds() {
        assert_eq!(tier_for_adp(1.0), 1);
        assert_eq!(tier_for_adp(20.0), 1);
        assert_eq!(tier_for_adp(20.5), 2);
        assert_eq!(tier_for_adp(45.0), 2);
        assert_eq!(tier_for_adp(50.0), 2);
        assert_eq!(tier_for_adp(100.0), 3);
        assert_eq!(tier_for_adp(150.0), 4);
        assert_eq!(tier_for_adp(151.0), 5);
        assert_eq!(tier_for_adp(UNKNOWN_ADP), 5);
    }

    #[test]
    fn new_player_derives_tier() {
        let p = Player::new(
            "pete-alonso-NYM",
            "Pete Alonso",
            "NYM",
            Position::FirstBase,
            vec![Position::FirstBase, Position::Utility],
            45.0,
            410.0,
            PlayerType::Batter,
        );
        assert_eq!(p.tier, 2);
        assert_eq!(p.stats, PlayerStats::default());
        assert!(!p.is_two_way);
    }

    #[test]
    fn new_player_never_has_empty_positions() {
        let p = Player::new("x", "X", "SDP", Position::Pitcher, vec![], 999.0, -5.0, PlayerType::Pitcher);
        assert_eq!(p.positions, vec![Position::Pitcher]);
    }

    #[test]
    fn bench_is_always_eligible() {
        let p = Player::new(
            "x",
            "X",
            "SDP",
            Position::ShortStop,
            vec![Position::ShortStop, Position::Utility],
            10.0,
            300.0,
            PlayerType::Batter,
        );
        assert!(p.is_eligible_at(Position::Bench));
        assert!(p.is_eligible_at(Position::Utility));
        assert!(!p.is_eligible_at(Position::Catcher));
    }

    #[test]
    fn deserialize_defaults_missing_fields() {
        let json = r#"{
            "id": "juan-soto-NYM",
            "name": "Juan Soto",
            "team": "NYM",
            "position": "OF",
            "positions": ["OF", "UTIL"],
            "type": "batter"
        }"#;
        let p: Player = serde_json::from_str(json).unwrap();
        assert_eq!(p.adp, UNKNOWN_ADP);
        assert_eq!(p.tier, 5);
        assert_eq!(p.projected_points, 0.0);
        assert_eq!(p.stats.batting.hr, 0);
    }

    #[test]
    fn deserialize_derives_missing_tier_from_adp() {
        let json = r#"{
            "id": "francisco-lindor-NYM",
            "name": "Francisco Lindor",
            "team": "NYM",
            "position": "SS",
            "adp": 10.0,
            "type": "batter"
        }"#;
        let p: Player = serde_json::from_str(json).unwrap();
        assert_eq!(p.tier, 1);
        assert_eq!(p.positions, vec![Position::ShortStop]);

        let stored = r#"{"id": "x", "name": "X", "team": "SDP", "position": "C",
            "positions": ["C"], "adp": 10.0, "tier": 3, "type": "batter"}"#;
        let p: Player = serde_json::from_str(stored).unwrap();
        assert_eq!(p.tier, 3);
    }
}
