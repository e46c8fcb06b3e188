// Pick recommendations for the controlled team.
//
// Each available player is scored from three signals: projected points,
// how much the team still needs the player's primary position, and how
// scarce that position is in the remaining pool. Players on the user's
// favorite club get a multiplier on top.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::scarcity::{scarcity_for_position, ScarcityEntry};
use crate::catalog::player::Player;
use crate::draft::pick::Position;
use crate::draft::roster::RosterConfig;

/// Need score used for positions the roster does not model.
pub const NEUTRAL_NEED: f64 = 5.0;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// Scoring weights, from `[recommendation]` in strategy.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationWeights {
    /// Weight on projected points after dividing by `points_scale`.
    pub points: f64,
    pub need: f64,
    pub scarcity: f64,
    pub points_scale: f64,
    /// Multiplier for players on the favorite club.
    pub favorite_bonus: f64,
    /// Maximum number of recommendations returned.
    pub limit: usize,
}

impl Default for RecommendationWeights {
    fn default() -> Self {
        RecommendationWeights {
            points: 0.5,
            need: 0.3,
            scarcity: 0.2,
            points_scale: 100.0,
            favorite_bonus: 1.2,
            limit: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Needs
// ---------------------------------------------------------------------------

/// Need score (1-10) for every configured position except the bench.
///
/// `(capacity - filled) / capacity * 10`, clamped. A zero-capacity position
/// gets the neutral score.
pub fn compute_needs(config: &RosterConfig, filled: &BTreeMap<Position, usize>) -> BTreeMap<Position, f64> {
    config
        .iter()
        .filter(|(&pos, _)| pos != Position::Bench)
        .map(|(&pos, &capacity)| {
            if capacity == 0 {
                return (pos, NEUTRAL_NEED);
            }
            let used = filled.get(&pos).copied().unwrap_or(0);
            let raw = (capacity as f64 - used as f64) / capacity as f64 * 10.0;
            (pos, raw.clamp(1.0, 10.0))
        })
        .collect()
}

pub fn need_for_position(needs: &BTreeMap<Position, f64>, position: Position) -> f64 {
    needs.get(&position).copied().unwrap_or(NEUTRAL_NEED)
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// One ranked suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub player: Player,
    pub need: f64,
    pub scarcity: f64,
    pub overall_score: f64,
    pub is_favorite_team: bool,
}

/// Rank `available` players, best first, truncated to `weights.limit`.
///
/// `favorite_club` is the MLB team abbreviation that earns the bonus. Equal
/// scores keep their order from `available`.
pub fn recommend(
    available: &[&Player],
    needs: &BTreeMap<Position, f64>,
    scarcity: &[ScarcityEntry],
    favorite_club: &str,
    weights: &RecommendationWeights,
) -> Vec<Recommendation> {
    let mut ranked: Vec<Recommendation> = available
        .iter()
        .map(|&player| {
            let need = need_for_position(needs, player.position);
            let scarcity = scarcity_for_position(scarcity, player.position);
            let is_favorite_team = player.team == favorite_club;
            let bonus = if is_favorite_team { weights.favorite_bonus } else { 1.0 };
            let points_norm = player.projected_points / weights.points_scale;
            let overall_score =
                (points_norm * weights.points + need * weights.need + scarcity * weights.scarcity) * bonus;
            Recommendation {
                player: player.clone(),
                need,
                scarcity,
                overall_score,
                is_favorite_team,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(weights.limit);
    ranked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
