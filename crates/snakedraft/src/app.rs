// Application orchestrator: owns the draft session and serves console
// commands.

use tokio::sync::mpsc;
use tracing::{info, warn};

use snakedraft_core::{
    ActionOutcome, ActionStatus, DraftSession, PersistStatus, RestoreReport, SortKey,
};

use crate::config::Config;
use crate::console::render;
use crate::protocol::{UiUpdate, UserCommand, View};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    pub session: DraftSession,
}

impl AppState {
    pub fn new(config: Config, session: DraftSession) -> Self {
        AppState { config, session }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the application loop.
///
/// Every session mutation goes through here, one command at a time. Ends
/// on `Quit` or when the command channel closes.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let _ = ui_tx.send(UiUpdate::Notice(render::turn(&state.session))).await;

    while let Some(cmd) = cmd_rx.recv().await {
        if cmd == UserCommand::Quit {
            info!("Quit command received, shutting down");
            return Ok(());
        }
        handle_user_command(&mut state, cmd, &ui_tx).await;
    }
    info!("Command channel closed, shutting down");

    Ok(())
}

/// Handle one command from the console.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let session = &mut state.session;
    let updates = match cmd {
        UserCommand::Draft {
            player_id,
            team,
            position,
        } => {
            info!("Draft: {} team={:?} slot={:?}", player_id, team, position);
            let team_index = team.map(|t| t.saturating_sub(1));
            match session.draft_by_id(&player_id, team_index, position) {
                Ok(outcome) => {
                    let mut notice = format!(
                        "Pick {}: {} -> {}",
                        outcome.pick.pick_number,
                        outcome.pick.player.name,
                        session.team_name(outcome.pick.team_index)
                    );
                    if let Some(slot) = outcome.roster_position {
                        notice.push_str(&format!(" (your {slot})"));
                    }
                    let mut updates = vec![UiUpdate::Notice(notice)];
                    updates.extend(persistence_warning(&outcome.persistence));
                    updates.push(UiUpdate::Notice(render::turn(session)));
                    updates
                }
                Err(e) => {
                    warn!("Draft of {} refused: {}", player_id, e);
                    vec![UiUpdate::Warning(e.to_string())]
                }
            }
        }
        UserCommand::Undo => {
            let outcome = session.undo_last_pick();
            with_turn(session, describe("Undo", &outcome))
        }
        UserCommand::Move {
            player_id,
            position,
        } => {
            let outcome = session.move_player_position(&player_id, position);
            describe(&format!("Move {player_id} to {position}"), &outcome)
        }
        UserCommand::UpdateSettings(update) => {
            let outcome = session.update_settings(&update);
            let s = session.settings();
            let label = format!(
                "Settings: {} teams, {} rounds, your slot {}",
                s.total_teams, s.draft_rounds, s.your_team_position
            );
            with_turn(session, describe(&label, &outcome))
        }
        UserCommand::Favorite(club) => {
            let outcome = match club {
                Some(club) => session.set_favorite_team(club),
                None => session.toggle_favorite_team(),
            };
            let label = format!("Favorite club: {}", session.settings().favorite_team);
            describe(&label, &outcome)
        }
        UserCommand::Rename { team, name } => {
            let outcome = session.rename_team(team.saturating_sub(1), &name);
            describe(&format!("Team {team} is now {name}"), &outcome)
        }
        UserCommand::Reset => {
            let outcome = session.reset_draft();
            with_turn(session, describe("Draft reset", &outcome))
        }
        UserCommand::Show(view) => vec![UiUpdate::Text(render_view(session, &view))],
        UserCommand::Help | UserCommand::Quit => {
            // Help is answered by the console; Quit is handled in the main loop.
            vec![]
        }
    };

    for update in updates {
        if ui_tx.send(update).await.is_err() {
            warn!("UI channel closed; dropping output");
            break;
        }
    }
}

fn render_view(session: &DraftSession, view: &View) -> String {
    match view {
        View::Recommendations => render::recommendations(session),
        View::Available { sort, position } => {
            let players = match (position, sort) {
                (Some(pos), SortKey::Adp) => session.available_at_position(*pos),
                (Some(pos), SortKey::Points) => session
                    .available_sorted(SortKey::Points)
                    .into_iter()
                    .filter(|p| p.positions.contains(pos))
                    .collect(),
                (None, sort) => session.available_sorted(*sort),
            };
            let title = match position {
                Some(pos) => format!("Available at {pos}"),
                None => "Available".to_string(),
            };
            render::players(&title, &players)
        }
        View::Find(text) => render::players(&format!("Matching \"{text}\""), &session.search_available(text)),
        View::Scarcity => render::scarcity(session),
        View::Needs => render::needs(session),
        View::Board => render::board(session),
        View::Roster => render::roster(session),
        View::Totals => render::totals(session),
        View::Turn => render::turn(session),
    }
}

/// Notice for an applied action, warning for an ignored one, plus a warning
/// when the snapshot could not be written.
fn describe(label: &str, outcome: &ActionOutcome) -> Vec<UiUpdate> {
    let mut updates = match &outcome.status {
        ActionStatus::Applied => vec![UiUpdate::Notice(label.to_string())],
        ActionStatus::Ignored(reason) => {
            vec![UiUpdate::Warning(format!("Ignored: {}", render::ignored_reason(reason)))]
        }
    };
    updates.extend(persistence_warning(&outcome.persistence));
    updates
}

fn with_turn(session: &DraftSession, mut updates: Vec<UiUpdate>) -> Vec<UiUpdate> {
    updates.push(UiUpdate::Notice(render::turn(session)));
    updates
}

fn persistence_warning(status: &PersistStatus) -> Option<UiUpdate> {
    match status {
        PersistStatus::Failed(why) => Some(UiUpdate::Warning(format!("Draft not saved: {why}"))),
        PersistStatus::Saved | PersistStatus::Skipped | PersistStatus::Detached => None,
    }
}

// ---------------------------------------------------------------------------
// Crash recovery
// ---------------------------------------------------------------------------

/// Restore the session from its snapshot store.
///
/// Returns `Ok(None)` when there is no store or nothing was saved.
pub fn recover_from_store(state: &mut AppState) -> anyhow::Result<Option<RestoreReport>> {
    if !state.session.has_store() {
        info!("No snapshot store attached, starting fresh");
        return Ok(None);
    }

    let report = state.session.restore()?;
    if report.restored.is_empty() && report.rejected.is_empty() {
        info!("No saved draft found, starting fresh");
        return Ok(None);
    }

    for (field, reason) in &report.rejected {
        warn!("Snapshot field {} discarded: {}", field, reason);
    }
    info!(
        "Crash recovery complete: {} picks restored, {} players available",
        state.session.ledger().len(),
        state.session.available_players().len()
    );
    Ok(Some(report))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
