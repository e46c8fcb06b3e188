// League settings for a draft session and partial updates to them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::draft::roster::{default_roster_config, RosterConfig};

/// MLB club whose players earn the favorite-team bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteClub {
    #[default]
    Mets,
    Padres,
}

impl FavoriteClub {
    /// Team abbreviation as it appears on player records.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            FavoriteClub::Mets => "NYM",
            FavoriteClub::Padres => "SDP",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            FavoriteClub::Mets => FavoriteClub::Padres,
            FavoriteClub::Padres => FavoriteClub::Mets,
        }
    }

    /// Parse a club name or abbreviation, case-insensitive.
    pub fn from_str_club(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mets" | "nym" => Some(FavoriteClub::Mets),
            "padres" | "sdp" | "sd" => Some(FavoriteClub::Padres),
            _ => None,
        }
    }
}

impl fmt::Display for FavoriteClub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FavoriteClub::Mets => write!(f, "Mets"),
            FavoriteClub::Padres => write!(f, "Padres"),
        }
    }
}

/// Default display names: "Team N", with the two fan seats labelled.
pub fn default_team_names(total_teams: usize) -> Vec<String> {
    (0..total_teams).map(default_team_name).collect()
}

fn default_team_name(index: usize) -> String {
    match index {
        2 => "Mets Fan".to_string(),
        3 => "Padres Fan".to_string(),
        i => format!("Team {}", i + 1),
    }
}

/// Pad with default names or truncate so there is one name per team.
pub fn fit_team_names(names: &mut Vec<String>, total_teams: usize) {
    names.truncate(total_teams);
    while names.len() < total_teams {
        names.push(default_team_name(names.len()));
    }
}

/// Everything configurable about a draft session.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftSettings {
    pub total_teams: usize,
    pub draft_rounds: u32,
    /// Controlled team's draft slot, 1-indexed.
    pub your_team_position: usize,
    pub favorite_team: FavoriteClub,
    /// One name per team.
    pub team_names: Vec<String>,
    pub roster: RosterConfig,
}

impl Default for DraftSettings {
    fn default() -> Self {
        DraftSettings {
            total_teams: 12,
            draft_rounds: 23,
            your_team_position: 3,
            favorite_team: FavoriteClub::Mets,
            team_names: default_team_names(12),
            roster: default_roster_config(),
        }
    }
}

impl DraftSettings {
    /// Controlled team's index (0-based).
    pub fn your_team_index(&self) -> usize {
        self.your_team_position.saturating_sub(1)
    }

    /// Total picks in a full draft.
    pub fn total_picks(&self) -> u64 {
        (self.total_teams as u64).saturating_mul(u64::from(self.draft_rounds))
    }

    /// Apply `update`, returning the new settings or the first invalid field.
    ///
    /// `min_teams` is the smallest team count that keeps existing picks in
    /// range. Nothing is applied unless every provided field is valid.
    pub fn with_update(&self, update: &SettingsUpdate, min_teams: usize) -> Result<DraftSettings, String> {
        let total_teams = update.total_teams.unwrap_or(self.total_teams);
        if total_teams == 0 {
            return Err("totalTeams must be greater than 0".into());
        }
        if total_teams < min_teams {
            return Err(format!(
                "totalTeams {total_teams} would orphan picks made by team {min_teams}"
            ));
        }

        let draft_rounds = update.draft_rounds.unwrap_or(self.draft_rounds);
        if draft_rounds == 0 {
            return Err("draftRounds must be greater than 0".into());
        }

        let your_team_position = update.your_team_position.unwrap_or(self.your_team_position);
        if your_team_position == 0 || your_team_position > total_teams {
            return Err(format!(
                "yourTeamPosition {your_team_position} must be between 1 and {total_teams}"
            ));
        }

        let mut team_names = self.team_names.clone();
        fit_team_names(&mut team_names, total_teams);

        Ok(DraftSettings {
            total_teams,
            draft_rounds,
            your_team_position,
            favorite_team: update.favorite_team.unwrap_or(self.favorite_team),
            team_names,
            roster: self.roster.clone(),
        })
    }
}

/// Partial settings change. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    pub total_teams: Option<usize>,
    pub draft_rounds: Option<u32>,
    pub your_team_position: Option<usize>,
    pub favorite_team: Option<FavoriteClub>,
}
