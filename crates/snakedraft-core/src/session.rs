// Draft session: the single owner of ledger, roster and settings.
//
// Every mutating action either applies completely or leaves the session
// untouched, then notifies the attached snapshot store. Derived views are
// recomputed from the ledger and roster on each call.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::player::Player;
use crate::catalog::Catalog;
use crate::draft::ledger::{self, DraftBoard, DraftLedger, TurnInfo};
use crate::draft::pick::{Pick, Position};
use crate::draft::roster::{total_roster_spots, Roster, RosterEntry, StatTotals};
use crate::error::DraftError;
use crate::settings::{fit_team_names, DraftSettings, FavoriteClub, SettingsUpdate};
use crate::snapshot::{DraftSnapshot, RestoreReport, SnapshotFields, SnapshotStore};
use crate::valuation::recommend::{compute_needs, recommend, Recommendation, RecommendationWeights};
use crate::valuation::scarcity::{compute_scarcity, ScarcityEntry};

// ---------------------------------------------------------------------------
// Action outcomes
// ---------------------------------------------------------------------------

/// Why an action was absorbed without changing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoredReason {
    /// No roster entry with that player id.
    NotOnRoster,
    /// Destination is neither the bench nor an eligible position.
    IneligiblePosition,
    /// The action would not change anything.
    Unchanged,
    /// Undo on an empty ledger.
    EmptyLedger,
    /// Team index outside the league.
    TeamOutOfRange,
    /// A settings field was out of range; nothing was applied.
    InvalidSettings(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStatus {
    Applied,
    Ignored(IgnoredReason),
}

/// Result of notifying the snapshot store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    Saved,
    /// Nothing changed, so nothing was written.
    Skipped,
    /// No store is attached.
    Detached,
    /// The store failed. The in-memory session is unaffected.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub status: ActionStatus,
    pub persistence: PersistStatus,
}

impl ActionOutcome {
    fn ignored(reason: IgnoredReason) -> Self {
        ActionOutcome {
            status: ActionStatus::Ignored(reason),
            persistence: PersistStatus::Skipped,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.status == ActionStatus::Applied
    }
}

/// Result of a successful pick.
#[derive(Debug, Clone, PartialEq)]
pub struct PickOutcome {
    pub pick: Pick,
    /// Slot the player took on the controlled team's roster, if it was
    /// their pick.
    pub roster_position: Option<Position>,
    pub persistence: PersistStatus,
}

/// Ordering for the available-player list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Ranking value, ascending.
    Adp,
    /// Projected points, descending.
    Points,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct DraftSession {
    settings: DraftSettings,
    weights: RecommendationWeights,
    catalog: Catalog,
    ledger: DraftLedger,
    roster: Roster,
    store: Option<Box<dyn SnapshotStore + Send>>,
}

impl DraftSession {
    /// Start a fresh session. Team names are fitted to the team count.
    pub fn new(catalog: Catalog, mut settings: DraftSettings) -> Self {
        fit_team_names(&mut settings.team_names, settings.total_teams);
        DraftSession {
            settings,
            weights: RecommendationWeights::default(),
            catalog,
            ledger: DraftLedger::new(),
            roster: Roster::new(),
            store: None,
        }
    }

    pub fn with_weights(mut self, weights: RecommendationWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Attach the store notified after every applied mutation.
    pub fn attach_store(&mut self, store: Box<dyn SnapshotStore + Send>) {
        self.store = Some(store);
    }

    pub fn detach_store(&mut self) -> Option<Box<dyn SnapshotStore + Send>> {
        self.store.take()
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn settings(&self) -> &DraftSettings {
        &self.settings
    }

    pub fn weights(&self) -> &RecommendationWeights {
        &self.weights
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &DraftLedger {
        &self.ledger
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Current state as a snapshot.
    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            drafted_players: self.ledger.picks().to_vec(),
            your_roster: self.roster.entries().to_vec(),
            current_pick: self.ledger.current_pick(),
            team_names: self.settings.team_names.clone(),
            total_teams: self.settings.total_teams,
            draft_rounds: self.settings.draft_rounds,
            your_team_position: self.settings.your_team_position,
            favorite_team: self.settings.favorite_team,
            saved_at: Some(chrono::Utc::now()),
        }
    }

    fn persist(&self) -> PersistStatus {
        let Some(store) = &self.store else {
            return PersistStatus::Detached;
        };
        match store.save(&self.snapshot()) {
            Ok(()) => PersistStatus::Saved,
            Err(e) => {
                warn!("failed to save draft snapshot: {:#}", e);
                PersistStatus::Failed(format!("{e:#}"))
            }
        }
    }

    fn applied(&self) -> ActionOutcome {
        ActionOutcome {
            status: ActionStatus::Applied,
            persistence: self.persist(),
        }
    }

    /// Restore from the attached store.
    ///
    /// An empty store restores nothing. A store that cannot be read is
    /// reported as `DataUnavailable`; the session keeps its current state.
    /// Stored text that is not JSON is rejected as a whole and the session
    /// starts fresh, with the store still attached so the next save
    /// replaces it.
    pub fn restore(&mut self) -> Result<RestoreReport, DraftError> {
        let loaded = match &self.store {
            Some(store) => store.load().map_err(DraftError::from)?,
            None => None,
        };
        let Some(raw) = loaded else {
            return Ok(RestoreReport::default());
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Ok(self.restore_from_value(&value)),
            Err(e) => {
                warn!("stored snapshot is not valid JSON, starting fresh: {}", e);
                let mut report = RestoreReport::default();
                report.reject("snapshot", format!("not valid JSON: {e}"));
                Ok(report)
            }
        }
    }

    /// Restore every usable field of a snapshot.
    ///
    /// Settings fields are applied first so picks can be checked against the
    /// restored team count. Picks are taken as a whole or not at all. Roster
    /// entries survive only when they belong to a restored pick of the
    /// controlled team; when the roster field itself is unusable the roster
    /// is rebuilt from those picks. The current pick always follows from the
    /// ledger.
    pub fn restore_from_value(&mut self, value: &Value) -> RestoreReport {
        let (fields, mut report) = SnapshotFields::from_value(value);

        if let Some(teams) = fields.total_teams {
            if teams > 0 {
                self.settings.total_teams = teams;
                report.restored.push("totalTeams");
            } else {
                report.reject("totalTeams", "must be greater than 0");
            }
        }

        if let Some(rounds) = fields.draft_rounds {
            if rounds > 0 {
                self.settings.draft_rounds = rounds;
                report.restored.push("draftRounds");
            } else {
                report.reject("draftRounds", "must be greater than 0");
            }
        }

        if let Some(pos) = fields.your_team_position {
            if pos >= 1 && pos <= self.settings.total_teams {
                self.settings.your_team_position = pos;
                report.restored.push("yourTeamPosition");
            } else {
                report.reject("yourTeamPosition", format!("{pos} outside 1..={}", self.settings.total_teams));
            }
        }
        if self.settings.your_team_position > self.settings.total_teams {
            warn!(
                "team position {} does not fit {} teams, using 1",
                self.settings.your_team_position, self.settings.total_teams
            );
            self.settings.your_team_position = 1;
        }

        if let Some(club) = fields.favorite_team {
            self.settings.favorite_team = club;
            report.restored.push("favoriteTeam");
        }

        if let Some(names) = fields.team_names {
            self.settings.team_names = names;
            report.restored.push("teamNames");
        }
        fit_team_names(&mut self.settings.team_names, self.settings.total_teams);

        if let Some(picks) = fields.drafted_players {
            match DraftLedger::from_picks(picks, self.settings.total_teams) {
                Ok(restored) => {
                    self.ledger = restored;
                    report.restored.push("draftedPlayers");
                }
                Err(reason) => report.reject("draftedPlayers", reason),
            }
        }

        let your_index = self.settings.your_team_index();
        match fields.your_roster {
            Some(entries) => {
                let total = entries.len();
                let mut kept: Vec<RosterEntry> = Vec::with_capacity(total);
                for entry in entries {
                    let owned = self
                        .ledger
                        .find(&entry.player_id)
                        .is_some_and(|p| p.team_index == your_index);
                    let duplicate = kept.iter().any(|k| k.player_id == entry.player_id);
                    if owned && !duplicate {
                        kept.push(entry);
                    }
                }
                if kept.len() < total {
                    report.reject(
                        "yourRoster",
                        format!("dropped {} entries without a matching pick", total - kept.len()),
                    );
                }
                self.roster = Roster::from_entries(kept);
                report.restored.push("yourRoster");
            }
            None => self.rebuild_roster(),
        }

        if let Some(current) = fields.current_pick {
            if current == self.ledger.current_pick() {
                report.restored.push("currentPick");
            } else {
                report.reject(
                    "currentPick",
                    format!("{current} disagrees with ledger, using {}", self.ledger.current_pick()),
                );
            }
        }

        info!(
            "restored draft at pick {} ({} picks, {} on roster)",
            self.ledger.current_pick(),
            self.ledger.len(),
            self.roster.len()
        );
        report
    }

    /// Refill the roster from the controlled team's picks, in pick order.
    fn rebuild_roster(&mut self) {
        let your_index = self.settings.your_team_index();
        let mut roster = Roster::new();
        for pick in self.ledger.picks().iter().filter(|p| p.team_index == your_index) {
            roster.add(pick.player.clone(), &self.settings.roster, None);
        }
        self.roster = roster;
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Record a pick of `player` for `team_index`, or for the team on the
    /// clock when `None`.
    ///
    /// Picks for the controlled team also go onto the roster, at `target`
    /// when given and valid. Picks beyond the configured rounds are accepted
    /// and extend the board.
    pub fn record_pick(
        &mut self,
        player: Player,
        team_index: Option<usize>,
        target: Option<Position>,
    ) -> Result<PickOutcome, DraftError> {
        let turn = self.turn();
        let team = team_index.unwrap_or(turn.team_index);
        let name = player.name.clone();

        let pick = self
            .ledger
            .record(player, team, self.settings.total_teams)?
            .clone();

        let roster_position = if team == self.settings.your_team_index() {
            Some(self.roster.add(pick.player.clone(), &self.settings.roster, target))
        } else {
            None
        };

        match roster_position {
            Some(pos) => info!("pick {}: {} to your roster at {}", pick.pick_number, name, pos),
            None => info!("pick {}: {} to {}", pick.pick_number, name, self.team_name(team)),
        }
        if self.ledger.len() as u64 == self.settings.total_picks() {
            info!("draft complete after {} picks", self.ledger.len());
        }

        Ok(PickOutcome {
            pick,
            roster_position,
            persistence: self.persist(),
        })
    }

    /// Record a pick by catalog id.
    pub fn draft_by_id(
        &mut self,
        player_id: &str,
        team_index: Option<usize>,
        target: Option<Position>,
    ) -> Result<PickOutcome, DraftError> {
        let player = self
            .catalog
            .get(player_id)
            .cloned()
            .ok_or_else(|| DraftError::UnknownPlayer(player_id.to_string()))?;
        self.record_pick(player, team_index, target)
    }

    /// Remove the most recent pick, and its roster entry if it was ours.
    pub fn undo_last_pick(&mut self) -> ActionOutcome {
        let Some(pick) = self.ledger.undo() else {
            debug!("undo on empty ledger");
            return ActionOutcome::ignored(IgnoredReason::EmptyLedger);
        };
        if pick.team_index == self.settings.your_team_index() {
            self.roster.remove(pick.player_id());
        }
        info!("undid pick {}: {}", pick.pick_number, pick.player.name);
        self.applied()
    }

    /// Move a roster entry to another slot without a capacity check.
    pub fn move_player_position(&mut self, player_id: &str, new_position: Position) -> ActionOutcome {
        match self.roster.move_entry(player_id, new_position) {
            Ok(previous) => {
                info!("moved {} from {} to {}", player_id, previous, new_position);
                self.applied()
            }
            Err(reason) => {
                debug!("move of {} to {} ignored: {:?}", player_id, new_position, reason);
                ActionOutcome::ignored(reason)
            }
        }
    }

    /// Apply a partial settings update, all fields or none.
    ///
    /// Changing the controlled team's slot rebuilds the roster from that
    /// team's picks.
    pub fn update_settings(&mut self, update: &SettingsUpdate) -> ActionOutcome {
        let min_teams = self.ledger.max_team_index().map_or(1, |i| i + 1);
        let next = match self.settings.with_update(update, min_teams) {
            Ok(next) => next,
            Err(reason) => {
                warn!("settings update ignored: {}", reason);
                return ActionOutcome::ignored(IgnoredReason::InvalidSettings(reason));
            }
        };
        if next == self.settings {
            return ActionOutcome::ignored(IgnoredReason::Unchanged);
        }

        let seat_changed = next.your_team_position != self.settings.your_team_position;
        self.settings = next;
        if seat_changed {
            self.rebuild_roster();
        }
        info!(
            "settings: {} teams, {} rounds, slot {}, favorite {}",
            self.settings.total_teams,
            self.settings.draft_rounds,
            self.settings.your_team_position,
            self.settings.favorite_team
        );
        self.applied()
    }

    pub fn set_favorite_team(&mut self, club: FavoriteClub) -> ActionOutcome {
        if club == self.settings.favorite_team {
            return ActionOutcome::ignored(IgnoredReason::Unchanged);
        }
        self.settings.favorite_team = club;
        self.applied()
    }

    pub fn toggle_favorite_team(&mut self) -> ActionOutcome {
        self.settings.favorite_team = self.settings.favorite_team.toggled();
        self.applied()
    }

    pub fn rename_team(&mut self, index: usize, name: &str) -> ActionOutcome {
        let Some(slot) = self.settings.team_names.get_mut(index) else {
            return ActionOutcome::ignored(IgnoredReason::TeamOutOfRange);
        };
        if slot.as_str() == name {
            return ActionOutcome::ignored(IgnoredReason::Unchanged);
        }
        *slot = name.to_string();
        self.applied()
    }

    /// Clear all picks and the roster, and wipe the stored snapshot.
    pub fn reset_draft(&mut self) -> ActionOutcome {
        self.ledger.clear();
        self.roster.clear();
        info!("draft reset");
        let persistence = match &self.store {
            None => PersistStatus::Detached,
            Some(store) => match store.clear() {
                Ok(()) => PersistStatus::Saved,
                Err(e) => {
                    warn!("failed to clear stored draft: {:#}", e);
                    PersistStatus::Failed(format!("{e:#}"))
                }
            },
        };
        ActionOutcome {
            status: ActionStatus::Applied,
            persistence,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn current_pick(&self) -> u32 {
        self.ledger.current_pick()
    }

    pub fn turn(&self) -> TurnInfo {
        ledger::turn_at(
            self.ledger.current_pick(),
            self.settings.total_teams,
            self.settings.your_team_index(),
        )
    }

    pub fn is_your_turn(&self) -> bool {
        self.turn().is_your_turn
    }

    /// Whether every pick of the configured rounds has been made.
    pub fn is_complete(&self) -> bool {
        self.ledger.len() as u64 >= self.settings.total_picks()
    }

    pub fn team_name(&self, index: usize) -> &str {
        self.settings
            .team_names
            .get(index)
            .map(String::as_str)
            .unwrap_or("?")
    }

    pub fn draft_board(&self) -> DraftBoard {
        self.ledger.board(self.settings.total_teams, self.settings.draft_rounds)
    }

    pub fn team_drafts(&self) -> Vec<Vec<&Player>> {
        self.ledger.team_drafts(self.settings.total_teams)
    }

    /// Players the controlled team has drafted, in pick order.
    pub fn your_team(&self) -> Vec<&Player> {
        let your_index = self.settings.your_team_index();
        self.ledger
            .picks()
            .iter()
            .filter(|p| p.team_index == your_index)
            .map(|p| &p.player)
            .collect()
    }

    /// Undrafted catalog players in catalog order.
    pub fn available_players(&self) -> Vec<&Player> {
        self.ledger.available(self.catalog.players())
    }

    pub fn available_sorted(&self, key: SortKey) -> Vec<&Player> {
        let mut players = self.available_players();
        match key {
            SortKey::Adp => players.sort_by(|a, b| a.adp.partial_cmp(&b.adp).unwrap_or(std::cmp::Ordering::Equal)),
            SortKey::Points => players.sort_by(|a, b| {
                b.projected_points
                    .partial_cmp(&a.projected_points)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
        }
        players
    }

    /// Undrafted players eligible at `pos`, by ranking value.
    pub fn available_at_position(&self, pos: Position) -> Vec<&Player> {
        self.available_sorted(SortKey::Adp)
            .into_iter()
            .filter(|p| p.positions.contains(&pos))
            .collect()
    }

    /// Undrafted players whose name or id contains `text`.
    pub fn search_available(&self, text: &str) -> Vec<&Player> {
        self.catalog
            .search(text)
            .into_iter()
            .filter(|p| !self.ledger.is_drafted(&p.id))
            .collect()
    }

    pub fn position_scarcity(&self) -> Vec<ScarcityEntry> {
        compute_scarcity(&self.available_players())
    }

    pub fn position_needs(&self) -> BTreeMap<Position, f64> {
        compute_needs(&self.settings.roster, &self.filled_positions())
    }

    /// Best available picks for the controlled team.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        let available = self.available_players();
        if available.is_empty() {
            return Vec::new();
        }
        let scarcity = compute_scarcity(&available);
        recommend(
            &available,
            &self.position_needs(),
            &scarcity,
            self.settings.favorite_team.abbreviation(),
            &self.weights,
        )
    }

    pub fn filled_positions(&self) -> BTreeMap<Position, usize> {
        self.roster.filled_counts(&self.settings.roster)
    }

    pub fn available_slots(&self) -> BTreeMap<Position, i64> {
        self.roster.available_slots(&self.settings.roster)
    }

    pub fn total_roster_spots(&self) -> usize {
        total_roster_spots(&self.settings.roster)
    }

    pub fn stat_totals(&self) -> StatTotals {
        self.roster.stat_totals()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
