// Draft ledger: ordered picks and snake-order turn arithmetic.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::pick::Pick;
use crate::catalog::player::Player;
use crate::error::DraftError;

// ---------------------------------------------------------------------------
// Turn arithmetic
// ---------------------------------------------------------------------------

/// Whose turn it is at a given pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TurnInfo {
    /// Overall pick number (1-indexed).
    pub pick_number: u32,
    /// Round number (1-indexed).
    pub round: u32,
    /// Position within the round after snake mirroring (1-indexed).
    pub pick_in_round: usize,
    /// Team on the clock (0-indexed).
    pub team_index: usize,
    /// Whether the controlled team is on the clock.
    pub is_your_turn: bool,
}

/// Round containing `pick_number`.
pub fn round_for_pick(pick_number: u32, total_teams: usize) -> u32 {
    let teams = total_teams.max(1) as u32;
    (pick_number.saturating_sub(1)) / teams + 1
}

/// Team (0-indexed) that owns `pick_number` under snake ordering.
///
/// Odd rounds run 0..N-1, even rounds run N-1..0.
pub fn team_for_pick(pick_number: u32, total_teams: usize) -> usize {
    let teams = total_teams.max(1);
    let raw = (pick_number.saturating_sub(1) as usize) % teams + 1;
    let mirrored = if round_for_pick(pick_number, teams) % 2 == 0 {
        teams - raw + 1
    } else {
        raw
    };
    mirrored - 1
}

/// Turn details for `pick_number` with the controlled team at `your_index`.
pub fn turn_at(pick_number: u32, total_teams: usize, your_index: usize) -> TurnInfo {
    let team_index = team_for_pick(pick_number, total_teams);
    TurnInfo {
        pick_number,
        round: round_for_pick(pick_number, total_teams),
        pick_in_round: team_index + 1,
        team_index,
        is_your_turn: team_index == your_index,
    }
}

/// Team indices in the order they pick during `round`.
pub fn teams_order_for_round(round: u32, total_teams: usize) -> Vec<usize> {
    let teams = total_teams.max(1);
    let first = (round.max(1) - 1) * teams as u32 + 1;
    (0..teams as u32)
        .map(|offset| team_for_pick(first + offset, teams))
        .collect()
}

// ---------------------------------------------------------------------------
// Draft board
// ---------------------------------------------------------------------------

/// Picks laid out by round and team column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftBoard {
    /// `rounds[r][t]` is the pick team `t` made in round `r + 1`, if any.
    /// Rows stop at the last round holding a pick (at least one row).
    pub rounds: Vec<Vec<Option<Pick>>>,
    /// Rounds the league is configured for.
    pub scheduled_rounds: u32,
}

impl DraftBoard {
    /// Scheduled rounds with no row because nothing was picked in them yet.
    pub fn unstarted_rounds(&self) -> u64 {
        u64::from(self.scheduled_rounds).saturating_sub(self.rounds.len() as u64)
    }

    pub fn cell(&self, round: u32, team_index: usize) -> Option<&Pick> {
        self.rounds
            .get(round.checked_sub(1)? as usize)?
            .get(team_index)?
            .as_ref()
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Every pick made so far, in order. Pick numbers run 1..=len with no gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftLedger {
    picks: Vec<Pick>,
}

impl DraftLedger {
    pub fn new() -> Self {
        DraftLedger::default()
    }

    /// Build a ledger from restored picks, checking the sequence first.
    pub fn from_picks(picks: Vec<Pick>, total_teams: usize) -> Result<Self, String> {
        validate_picks(&picks, total_teams)?;
        Ok(DraftLedger { picks })
    }

    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// The next pick number to be made.
    pub fn current_pick(&self) -> u32 {
        self.picks.len() as u32 + 1
    }

    pub fn last(&self) -> Option<&Pick> {
        self.picks.last()
    }

    pub fn find(&self, player_id: &str) -> Option<&Pick> {
        self.picks.iter().find(|p| p.player_id() == player_id)
    }

    pub fn is_drafted(&self, player_id: &str) -> bool {
        self.find(player_id).is_some()
    }

    /// Highest team index referenced by any pick.
    pub fn max_team_index(&self) -> Option<usize> {
        self.picks.iter().map(|p| p.team_index).max()
    }

    /// Append a pick for `team_index` at the current pick number.
    ///
    /// Refuses duplicates and out-of-range teams without touching the ledger.
    pub fn record(&mut self, player: Player, team_index: usize, total_teams: usize) -> Result<&Pick, DraftError> {
        if let Some(existing) = self.find(&player.id) {
            return Err(DraftError::AlreadyDrafted {
                player_id: player.id.clone(),
                pick_number: existing.pick_number,
            });
        }
        if team_index >= total_teams {
            return Err(DraftError::TeamOutOfRange {
                index: team_index,
                total_teams,
            });
        }

        let pick_number = self.current_pick();
        debug!("pick {}: {} -> team {}", pick_number, player.name, team_index);
        self.picks.push(Pick {
            player,
            pick_number,
            team_index,
        });
        Ok(&self.picks[self.picks.len() - 1])
    }

    /// Remove and return the most recent pick. `None` on an empty ledger.
    pub fn undo(&mut self) -> Option<Pick> {
        self.picks.pop()
    }

    pub fn clear(&mut self) {
        self.picks.clear();
    }

    /// Catalog players not referenced by any pick, in catalog order.
    pub fn available<'a>(&self, catalog: &'a [Player]) -> Vec<&'a Player> {
        let drafted: HashSet<&str> = self.picks.iter().map(|p| p.player_id()).collect();
        catalog
            .iter()
            .filter(|p| !drafted.contains(p.id.as_str()))
            .collect()
    }

    /// Lay the picks out by round and team.
    ///
    /// Columns come from the snake rule applied to each pick number. Rows
    /// cover the rounds picked so far, which may run past `draft_rounds`.
    pub fn board(&self, total_teams: usize, draft_rounds: u32) -> DraftBoard {
        let teams = total_teams.max(1);
        let last_round = self
            .picks
            .last()
            .map(|p| round_for_pick(p.pick_number, teams))
            .unwrap_or(0);
        let rows = last_round.max(1) as usize;

        let mut rounds = vec![vec![None; teams]; rows];
        for pick in &self.picks {
            let r = round_for_pick(pick.pick_number, teams) as usize - 1;
            let t = team_for_pick(pick.pick_number, teams);
            rounds[r][t] = Some(pick.clone());
        }
        DraftBoard {
            rounds,
            scheduled_rounds: draft_rounds,
        }
    }

    /// Players drafted by each team, in pick order.
    pub fn team_drafts(&self, total_teams: usize) -> Vec<Vec<&Player>> {
        let mut drafts: Vec<Vec<&Player>> = vec![Vec::new(); total_teams];
        for pick in &self.picks {
            if let Some(team) = drafts.get_mut(pick.team_index) {
                team.push(&pick.player);
            }
        }
        drafts
    }
}

/// Check that picks are numbered 1..=n, name each player once and stay
/// within the team range.
pub fn validate_picks(picks: &[Pick], total_teams: usize) -> Result<(), String> {
    let mut seen = HashSet::new();
    for (i, pick) in picks.iter().enumerate() {
        let expected = i as u32 + 1;
        if pick.pick_number != expected {
            return Err(format!(
                "pick numbers not contiguous: expected {}, found {}",
                expected, pick.pick_number
            ));
        }
        if !seen.insert(pick.player_id()) {
            return Err(format!("player '{}' drafted twice", pick.player_id()));
        }
        if pick.team_index >= total_teams {
            return Err(format!(
                "pick {} has team index {} outside {} teams",
                pick.pick_number, pick.team_index, total_teams
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::player::PlayerType;
    use crate::draft::pick::Position;

    fn player(id: &str) -> Player {
        Player::new(id, id, "NYM", Position::Outfield, vec![Position::Outfield], 10.0, 100.0, PlayerType::Batter)
    }

    #[test]
    fn first_round_runs_forward() {
        assert_eq!(team_for_pick(1, 12), 0);
        assert_eq!(team_for_pick(12, 12), 11);
        assert_eq!(round_for_pick(12, 12), 1);
    }

    #[test]
    fn second_round_runs_backward() {
        assert_eq!(round_for_pick(13, 12), 2);
        assert_eq!(team_for_pick(13, 12), 11);
        assert_eq!(team_for_pick(24, 12), 0);
        assert_eq!(team_for_pick(25, 12), 0);
    }

    #[test]
    fn round_two_order_for_twelve_teams() {
        let order = teams_order_for_round(2, 12);
        assert_eq!(order, (0..12).rev().collect::<Vec<_>>());
    }

    #[test]
    fn consecutive_rounds_are_reverses() {
        for teams in 1..=16 {
            for round in 1..=10 {
                let mut next = teams_order_for_round(round + 1, teams);
                next.reverse();
                assert_eq!(teams_order_for_round(round, teams), next, "teams={teams} round={round}");
            }
        }
    }

    #[test]
    fn controlled_team_turn() {
        // Team index 2 picks 3rd in round 1 and 10th in round 2 of 12.
        assert!(turn_at(3, 12, 2).is_your_turn);
        assert!(!turn_at(4, 12, 2).is_your_turn);
        let t = turn_at(22, 12, 2);
        assert_eq!(t.round, 2);
        assert_eq!(t.pick_in_round, 3);
        assert!(t.is_your_turn);
    }

    #[test]
    fn single_team_league() {
        assert_eq!(team_for_pick(1, 1), 0);
        assert_eq!(team_for_pick(2, 1), 0);
        assert_eq!(round_for_pick(5, 1), 5);
    }

    #[test]
    fn record_and_undo() {
        let mut ledger = DraftLedger::new();
        assert_eq!(ledger.current_pick(), 1);
        ledger.record(player("a"), 0, 12).unwrap();
        ledger.record(player("b"), 1, 12).unwrap();
        assert_eq!(ledger.current_pick(), 3);

        let undone = ledger.undo().unwrap();
        assert_eq!(undone.player_id(), "b");
        assert_eq!(undone.pick_number, 2);
        assert_eq!(ledger.current_pick(), 2);
    }

    #[test]
    fn undo_empty_is_none() {
        let mut ledger = DraftLedger::new();
        assert!(ledger.undo().is_none());
        assert_eq!(ledger.current_pick(), 1);
    }

    #[test]
    fn duplicate_rejected_without_change() {
        let mut ledger = DraftLedger::new();
        ledger.record(player("a"), 0, 12).unwrap();
        let err = ledger.record(player("a"), 1, 12).unwrap_err();
        assert_eq!(
            err,
            DraftError::AlreadyDrafted {
                player_id: "a".into(),
                pick_number: 1
            }
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn team_out_of_range_rejected() {
        let mut ledger = DraftLedger::new();
        let err = ledger.record(player("a"), 12, 12).unwrap_err();
        assert!(matches!(err, DraftError::TeamOutOfRange { index: 12, .. }));
        assert!(ledger.is_empty());
    }

    #[test]
    fn available_excludes_drafted() {
        let catalog = vec![player("a"), player("b"), player("c")];
        let mut ledger = DraftLedger::new();
        ledger.record(catalog[1].clone(), 0, 4).unwrap();
        let ids: Vec<&str> = ledger.available(&catalog).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn board_places_by_snake_column() {
        let mut ledger = DraftLedger::new();
        for (i, id) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            let team = team_for_pick(i as u32 + 1, 3);
            ledger.record(player(id), team, 3).unwrap();
        }
        let board = ledger.board(3, 2);
        assert_eq!(board.rounds.len(), 2);
        assert_eq!(board.unstarted_rounds(), 0);
        assert_eq!(board.cell(1, 0).unwrap().player_id(), "a");
        assert_eq!(board.cell(1, 2).unwrap().player_id(), "c");
        // Round 2 runs 2, 1, 0.
        assert_eq!(board.cell(2, 2).unwrap().player_id(), "d");
        assert_eq!(board.cell(2, 1).unwrap().player_id(), "e");
        assert!(board.cell(2, 0).is_none());
    }

    #[test]
    fn board_uses_pick_number_not_recorded_team() {
        let mut ledger = DraftLedger::new();
        // Pick 1 recorded for team 2 still sits in column 0.
        ledger.record(player("a"), 2, 3).unwrap();
        let board = ledger.board(3, 1);
        assert_eq!(board.cell(1, 0).unwrap().player_id(), "a");
    }

    #[test]
    fn board_grows_past_configured_rounds() {
        let mut ledger = DraftLedger::new();
        for id in ["a", "b", "c"] {
            ledger.record(player(id), 0, 2).unwrap();
        }
        let board = ledger.board(2, 1);
        assert_eq!(board.rounds.len(), 2);
        assert!(board.cell(2, 1).is_some());
    }

    #[test]
    fn board_rows_stop_at_last_picked_round() {
        let mut ledger = DraftLedger::new();
        assert_eq!(ledger.board(12, 400_000_000).rounds.len(), 1);

        ledger.record(player("a"), 0, 12).unwrap();
        let board = ledger.board(12, 400_000_000);
        assert_eq!(board.rounds.len(), 1);
        assert_eq!(board.unstarted_rounds(), 399_999_999);
        assert_eq!(board.cell(1, 0).unwrap().player_id(), "a");
    }

    #[test]
    fn team_drafts_grouped() {
        let mut ledger = DraftLedger::new();
        ledger.record(player("a"), 1, 3).unwrap();
        ledger.record(player("b"), 1, 3).unwrap();
        ledger.record(player("c"), 0, 3).unwrap();
        let drafts = ledger.team_drafts(3);
        assert_eq!(drafts[0].len(), 1);
        assert_eq!(drafts[1].len(), 2);
        assert!(drafts[2].is_empty());
    }

    #[test]
    fn validate_picks_rules() {
        let good = vec![
            Pick { player: player("a"), pick_number: 1, team_index: 0 },
            Pick { player: player("b"), pick_number: 2, team_index: 1 },
        ];
        assert!(validate_picks(&good, 2).is_ok());
        assert!(validate_picks(&good, 1).is_err());

        let gap = vec![Pick { player: player("a"), pick_number: 2, team_index: 0 }];
        assert!(validate_picks(&gap, 2).is_err());

        let dup = vec![
            Pick { player: player("a"), pick_number: 1, team_index: 0 },
            Pick { player: player("a"), pick_number: 2, team_index: 1 },
        ];
        assert!(validate_picks(&dup, 2).is_err());
    }
}
