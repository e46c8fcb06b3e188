// Draft snapshots and the stores that keep them.
//
// A snapshot is the flat JSON record written after every applied mutation.
// Loading is field-by-field so a damaged or older snapshot restores whatever
// is still usable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::draft::pick::Pick;
use crate::draft::roster::RosterEntry;
use crate::settings::FavoriteClub;

/// Key the snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "draftState";

/// Serialized draft state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub drafted_players: Vec<Pick>,
    pub your_roster: Vec<RosterEntry>,
    pub current_pick: u32,
    pub team_names: Vec<String>,
    pub total_teams: usize,
    pub draft_rounds: u32,
    pub your_team_position: usize,
    pub favorite_team: FavoriteClub,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Tolerant field extraction
// ---------------------------------------------------------------------------

/// Snapshot fields that could be read, each independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotFields {
    pub drafted_players: Option<Vec<Pick>>,
    pub your_roster: Option<Vec<RosterEntry>>,
    pub current_pick: Option<u32>,
    pub team_names: Option<Vec<String>>,
    pub total_teams: Option<usize>,
    pub draft_rounds: Option<u32>,
    pub your_team_position: Option<usize>,
    pub favorite_team: Option<FavoriteClub>,
}

/// What a restore kept and what it dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RestoreReport {
    /// Fields applied to the session.
    pub restored: Vec<&'static str>,
    /// Fields not present in the snapshot.
    pub missing: Vec<&'static str>,
    /// Fields present but unusable, with the reason.
    pub rejected: Vec<(&'static str, String)>,
}

impl RestoreReport {
    /// True when every known field was present and applied.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.rejected.is_empty()
    }

    pub fn reject(&mut self, field: &'static str, reason: impl Into<String>) {
        self.rejected.push((field, reason.into()));
    }
}

fn read_field<T: DeserializeOwned>(obj: &serde_json::Map<String, Value>, key: &'static str, report: &mut RestoreReport) -> Option<T> {
    match obj.get(key) {
        None | Some(Value::Null) => {
            report.missing.push(key);
            None
        }
        Some(raw) => match T::deserialize(raw) {
            Ok(v) => Some(v),
            Err(e) => {
                report.reject(key, e.to_string());
                None
            }
        },
    }
}

impl SnapshotFields {
    /// Read every known field from a snapshot value.
    ///
    /// Unknown keys are ignored. A value that is not a JSON object yields no
    /// fields and a report that rejects the whole snapshot.
    pub fn from_value(value: &Value) -> (SnapshotFields, RestoreReport) {
        let mut report = RestoreReport::default();
        let Some(obj) = value.as_object() else {
            report.reject("snapshot", "not a JSON object");
            return (SnapshotFields::default(), report);
        };

        let fields = SnapshotFields {
            drafted_players: read_field(obj, "draftedPlayers", &mut report),
            your_roster: read_field(obj, "yourRoster", &mut report),
            current_pick: read_field(obj, "currentPick", &mut report),
            team_names: read_field(obj, "teamNames", &mut report),
            total_teams: read_field(obj, "totalTeams", &mut report),
            draft_rounds: read_field(obj, "draftRounds", &mut report),
            your_team_position: read_field(obj, "yourTeamPosition", &mut report),
            favorite_team: read_field(obj, "favoriteTeam", &mut report),
        };
        (fields, report)
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Durable home for the latest snapshot.
///
/// `load` hands back the stored text unparsed. A store that cannot be read
/// is an error; text that does not parse is the session's to judge.
pub trait SnapshotStore {
    fn save(&self, snapshot: &DraftSnapshot) -> Result<()>;
    fn load(&self) -> Result<Option<String>>;
    fn clear(&self) -> Result<()>;
}

/// In-process store. Clones share the same slot, so a test can keep a handle
/// after giving one to a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<Value>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// A store pre-loaded with `value`.
    pub fn with_value(value: Value) -> Self {
        let store = MemoryStore::default();
        *store.lock() = Some(value);
        store
    }

    /// Latest saved value.
    pub fn latest(&self) -> Option<Value> {
        self.lock().clone()
    }

    /// Make subsequent calls fail, to exercise degraded persistence.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Value>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("memory store is unavailable");
        }
        Ok(())
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, snapshot: &DraftSnapshot) -> Result<()> {
        self.check()?;
        *self.lock() = Some(serde_json::to_value(snapshot)?);
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        self.check()?;
        Ok(self.latest().map(|value| value.to_string()))
    }

    fn clear(&self) -> Result<()> {
        self.check()?;
        *self.lock() = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_snapshot() -> DraftSnapshot {
        DraftSnapshot {
            drafted_players: vec![],
            your_roster: vec![],
            current_pick: 1,
            team_names: vec!["A".into(), "B".into()],
            total_teams: 2,
            draft_rounds: 5,
            your_team_position: 1,
            favorite_team: FavoriteClub::Padres,
            saved_at: None,
        }
    }

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let value = serde_json::to_value(sample_snapshot()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "draftedPlayers",
            "yourRoster",
            "currentPick",
            "teamNames",
            "totalTeams",
            "draftRounds",
            "yourTeamPosition",
            "favoriteTeam",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj["favoriteTeam"], json!("padres"));
        assert!(!obj.contains_key("savedAt"));
    }

    #[test]
    fn fields_read_independently() {
        let value = json!({
            "totalTeams": 10,
            "draftRounds": "twenty",
            "favoriteTeam": "padres",
            "somethingNew": [1, 2, 3]
        });
        let (fields, report) = SnapshotFields::from_value(&value);
        assert_eq!(fields.total_teams, Some(10));
        assert_eq!(fields.draft_rounds, None);
        assert_eq!(fields.favorite_team, Some(FavoriteClub::Padres));
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, "draftRounds");
        assert!(report.missing.contains(&"draftedPlayers"));
        assert!(!report.is_clean());
    }

    #[test]
    fn null_counts_as_missing() {
        let (fields, report) = SnapshotFields::from_value(&json!({"teamNames": null}));
        assert!(fields.team_names.is_none());
        assert!(report.missing.contains(&"teamNames"));
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn non_object_snapshot_rejected() {
        let (fields, report) = SnapshotFields::from_value(&json!([1, 2]));
        assert_eq!(fields, SnapshotFields::default());
        assert_eq!(report.rejected[0].0, "snapshot");
    }

    #[test]
    fn memory_store_shared_between_clones() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.save(&sample_snapshot()).unwrap();
        assert_eq!(handle.latest().unwrap()["totalTeams"], json!(2));
        handle.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn memory_store_failure_mode() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(store.save(&sample_snapshot()).is_err());
        assert!(store.load().is_err());
        store.set_failing(false);
        assert!(store.save(&sample_snapshot()).is_ok());
    }
}
