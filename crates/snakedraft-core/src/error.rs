// Error types for the draft core.

use thiserror::Error;

/// Failures reported by draft actions and external adapters.
///
/// The first three variants are invariant violations: the action is refused
/// and the session is left untouched. `DataUnavailable` covers catalog and
/// snapshot-store failures, which never abort a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("player '{player_id}' has already been drafted (pick {pick_number})")]
    AlreadyDrafted { player_id: String, pick_number: u32 },

    #[error("player '{0}' is not in the catalog")]
    UnknownPlayer(String),

    #[error("team index {index} is out of range for a {total_teams}-team league")]
    TeamOutOfRange { index: usize, total_teams: usize },

    #[error("data unavailable: {0}")]
    DataUnavailable(String),
}

impl DraftError {
    /// Whether the error is an invariant violation rather than an adapter
    /// failure.
    pub fn is_invalid_state(&self) -> bool {
        !matches!(self, DraftError::DataUnavailable(_))
    }
}

impl From<anyhow::Error> for DraftError {
    fn from(err: anyhow::Error) -> Self {
        DraftError::DataUnavailable(format!("{err:#}"))
    }
}
