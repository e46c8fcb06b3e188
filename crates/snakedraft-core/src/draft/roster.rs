// Controlled-team roster and slot assignment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::pick::Position;
use crate::catalog::player::{Player, PlayerType};
use crate::session::IgnoredReason;

/// Position -> slot capacity, from `[league.roster]` in league.toml.
pub type RosterConfig = BTreeMap<Position, usize>;

/// Standard 23-spot roster: C 1B 2B 3B SS, 3 OF, UTIL, 5 SP, 3 RP, 6 bench.
pub fn default_roster_config() -> RosterConfig {
    [
        (Position::Catcher, 1),
        (Position::FirstBase, 1),
        (Position::SecondBase, 1),
        (Position::ThirdBase, 1),
        (Position::ShortStop, 1),
        (Position::Outfield, 3),
        (Position::Utility, 1),
        (Position::StartingPitcher, 5),
        (Position::ReliefPitcher, 3),
        (Position::Bench, 6),
    ]
    .into_iter()
    .collect()
}

/// Sum of all capacities, bench included.
pub fn total_roster_spots(config: &RosterConfig) -> usize {
    config.values().sum()
}

/// A player on the controlled team's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub player_id: String,
    /// Slot the player currently occupies.
    pub position: Position,
    /// Snapshot of the player at draft time.
    pub player_data: Player,
}

/// Projected category totals for the roster.
///
/// Counting stats are summed. AVG is averaged over batters, ERA and WHIP over
/// pitchers; all three stay 0.0 when nobody contributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatTotals {
    pub hr: u32,
    pub r: u32,
    pub rbi: u32,
    pub sb: u32,
    pub avg: f64,
    pub w: u32,
    pub sv: u32,
    pub so: u32,
    pub era: f64,
    pub whip: f64,
}

/// The controlled team's roster entries, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new() -> Self {
        Roster::default()
    }

    /// Rebuild a roster from previously saved entries.
    pub fn from_entries(entries: Vec<RosterEntry>) -> Self {
        Roster { entries }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.entries.iter().any(|e| e.player_id == player_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries per configured position, counted from the live entry list.
    ///
    /// Every configured position is present (zero when empty). Entries in a
    /// position the config does not list are not counted.
    pub fn filled_counts(&self, config: &RosterConfig) -> BTreeMap<Position, usize> {
        let mut filled: BTreeMap<Position, usize> = config.keys().map(|&p| (p, 0)).collect();
        for entry in &self.entries {
            if let Some(count) = filled.get_mut(&entry.position) {
                *count += 1;
            }
        }
        filled
    }

    /// Remaining capacity per configured position. Negative when a slot was
    /// overfilled by bench overflow or a manual move.
    pub fn available_slots(&self, config: &RosterConfig) -> BTreeMap<Position, i64> {
        let filled = self.filled_counts(config);
        config
            .iter()
            .map(|(&pos, &cap)| {
                let used = filled.get(&pos).copied().unwrap_or(0);
                (pos, cap as i64 - used as i64)
            })
            .collect()
    }

    /// Pick the slot for a newly drafted player.
    ///
    /// 1. An explicit target is used when it is the bench, or when it is one
    ///    of the player's eligible positions and still has room.
    /// 2. Otherwise the primary position, if it has room.
    /// 3. Otherwise the first eligible position (in the player's order) with
    ///    room.
    /// 4. Otherwise the primary position when the config does not list it,
    ///    since an unlisted position has no cap to fill.
    /// 5. Otherwise the bench, whatever its fill level.
    ///
    /// Steps 1 to 3 only take listed positions; a listed capacity of 0 is
    /// always full.
    pub fn choose_position(
        &self,
        player: &Player,
        config: &RosterConfig,
        target: Option<Position>,
    ) -> Position {
        let filled = self.filled_counts(config);

        if let Some(target) = target {
            if target == Position::Bench {
                return Position::Bench;
            }
            if player.positions.contains(&target) && has_room(config, &filled, target) {
                return target;
            }
        }

        if has_room(config, &filled, player.position) {
            return player.position;
        }

        if let Some(pos) = player
            .positions
            .iter()
            .copied()
            .find(|&pos| has_room(config, &filled, pos))
        {
            return pos;
        }

        if config.contains_key(&player.position) {
            Position::Bench
        } else {
            player.position
        }
    }

    /// Add a drafted player and return the slot chosen for them.
    pub fn add(&mut self, player: Player, config: &RosterConfig, target: Option<Position>) -> Position {
        let position = self.choose_position(&player, config, target);
        self.entries.push(RosterEntry {
            player_id: player.id.clone(),
            position,
            player_data: player,
        });
        position
    }

    /// Remove the entry for `player_id`, if present.
    pub fn remove(&mut self, player_id: &str) -> Option<RosterEntry> {
        let idx = self.entries.iter().position(|e| e.player_id == player_id)?;
        Some(self.entries.remove(idx))
    }

    /// Reassign an entry to `new_position`.
    ///
    /// Allowed when the destination is the bench or one of the player's
    /// eligible positions. Capacity is not checked: this is a manual override.
    /// Returns the previous position.
    pub fn move_entry(&mut self, player_id: &str, new_position: Position) -> Result<Position, IgnoredReason> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.player_id == player_id)
            .ok_or(IgnoredReason::NotOnRoster)?;

        if !entry.player_data.is_eligible_at(new_position) {
            return Err(IgnoredReason::IneligiblePosition);
        }
        if entry.position == new_position {
            return Err(IgnoredReason::Unchanged);
        }

        let previous = entry.position;
        entry.position = new_position;
        Ok(previous)
    }

    /// Sum projected categories across the roster.
    pub fn stat_totals(&self) -> StatTotals {
        let mut totals = StatTotals::default();
        let mut batters = 0u32;
        let mut pitchers = 0u32;

        for entry in &self.entries {
            let stats = &entry.player_data.stats;
            match entry.player_data.player_type {
                PlayerType::Batter => {
                    batters += 1;
                    totals.hr += stats.batting.hr;
                    totals.r += stats.batting.r;
                    totals.rbi += stats.batting.rbi;
                    totals.sb += stats.batting.sb;
                    totals.avg += stats.batting.avg;
                }
                PlayerType::Pitcher => {
                    pitchers += 1;
                    totals.w += stats.pitching.w;
                    totals.sv += stats.pitching.sv;
                    totals.so += stats.pitching.so;
                    totals.era += stats.pitching.era;
                    totals.whip += stats.pitching.whip;
                }
            }
        }

        if batters > 0 {
            totals.avg /= batters as f64;
        }
        if pitchers > 0 {
            totals.era /= pitchers as f64;
            totals.whip /= pitchers as f64;
        }
        totals
    }
}

fn has_room(config: &RosterConfig, filled: &BTreeMap<Position, usize>, pos: Position) -> bool {
    match config.get(&pos) {
        Some(&cap) if cap > 0 => filled.get(&pos).copied().unwrap_or(0) < cap,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
