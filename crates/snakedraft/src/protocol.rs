// Messages between the console front end and the application loop.

use snakedraft_core::{FavoriteClub, Position, SettingsUpdate, SortKey};

/// A request from the console.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Record a pick. `team` is 1-indexed; `None` means the team on the clock.
    Draft {
        player_id: String,
        team: Option<usize>,
        position: Option<Position>,
    },
    Undo,
    /// Move a player on your roster to another slot.
    Move { player_id: String, position: Position },
    UpdateSettings(SettingsUpdate),
    /// Set the favorite club, or toggle it when `None`.
    Favorite(Option<FavoriteClub>),
    /// Rename a team. `team` is 1-indexed.
    Rename { team: usize, name: String },
    Reset,
    Show(View),
    Help,
    Quit,
}

/// Read-only views the console can ask for.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Recommendations,
    Available {
        sort: SortKey,
        position: Option<Position>,
    },
    Find(String),
    Scarcity,
    Needs,
    Board,
    Roster,
    Totals,
    Turn,
}

/// Output for the console to print.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// Outcome of an action.
    Notice(String),
    /// Something the user should look at: a refused action or a failed save.
    Warning(String),
    /// A rendered view.
    Text(String),
}
