// Positional scarcity from the remaining player pool.
//
// Each position is scored 1-10 by how few elite (tier 1) and strong (tier 2)
// players are still available there. A higher score means the position is
// drying up and should be addressed sooner.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::player::Player;
use crate::draft::pick::Position;

/// Score used for positions with no scarcity data.
pub const NEUTRAL_SCARCITY: f64 = 5.0;

// ---------------------------------------------------------------------------
// Scarcity urgency levels
// ---------------------------------------------------------------------------

/// Display bucket for a scarcity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScarcityUrgency {
    /// Score 9-10: no elite or strong players left.
    Critical,
    /// Score 7-8.
    High,
    /// Score 4-6.
    Medium,
    /// Score 1-3: plenty of quality remains.
    Low,
}

impl ScarcityUrgency {
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            ScarcityUrgency::Critical
        } else if score >= 7.0 {
            ScarcityUrgency::High
        } else if score >= 4.0 {
            ScarcityUrgency::Medium
        } else {
            ScarcityUrgency::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScarcityUrgency::Critical => "CRITICAL",
            ScarcityUrgency::High => "HIGH",
            ScarcityUrgency::Medium => "MEDIUM",
            ScarcityUrgency::Low => "LOW",
        }
    }
}

// ---------------------------------------------------------------------------
// Scarcity entry
// ---------------------------------------------------------------------------

/// Scarcity breakdown for one primary position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScarcityEntry {
    pub position: Position,
    /// Available players whose primary position this is.
    pub available: usize,
    pub tier1: usize,
    pub tier2: usize,
    pub tier3: usize,
    /// clamp(10 - (3 * tier1 + tier2), 1, 10).
    pub score: f64,
    pub urgency: ScarcityUrgency,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Score every primary position present in `available`.
///
/// Positions with no available players are absent from the result, in
/// display order otherwise.
pub fn compute_scarcity(available: &[&Player]) -> Vec<ScarcityEntry> {
    // position -> (total, tier1, tier2, tier3)
    let mut counts: BTreeMap<Position, (usize, usize, usize, usize)> = BTreeMap::new();
    for player in available {
        let c = counts.entry(player.position).or_default();
        c.0 += 1;
        match player.tier {
            1 => c.1 += 1,
            2 => c.2 += 1,
            3 => c.3 += 1,
            _ => {}
        }
    }

    counts
        .into_iter()
        .map(|(position, (total, tier1, tier2, tier3))| {
            let raw = 10.0 - (tier1 as f64 * 3.0 + tier2 as f64);
            let score = raw.clamp(1.0, 10.0);
            ScarcityEntry {
                position,
                available: total,
                tier1,
                tier2,
                tier3,
                score,
                urgency: ScarcityUrgency::from_score(score),
            }
        })
        .collect()
}

/// Scarcity score for `position`, or the neutral midpoint when unknown.
pub fn scarcity_for_position(scarcity: &[ScarcityEntry], position: Position) -> f64 {
    scarcity
        .iter()
        .find(|e| e.position == position)
        .map(|e| e.score)
        .unwrap_or(NEUTRAL_SCARCITY)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
