// Integration tests for the snake draft application shell.
//
// These drive the app loop over its channels the way the console does:
// parse text commands, send them, and read back the UiUpdates. Storage is
// either a MemoryStore or an in-memory SQLite database.

use std::collections::HashMap;
use std::sync::Arc;

use snakedraft::app::{self, AppState};
use snakedraft::config::{Config, DataPaths, LeagueConfig};
use snakedraft::console::input::parse_command;
use snakedraft::protocol::{UiUpdate, UserCommand};
use snakedraft_core::db::Database;
use snakedraft_core::snapshot::SNAPSHOT_KEY;
use snakedraft_core::valuation::recommend::RecommendationWeights;
use snakedraft_core::{
    Catalog, DraftSession, DraftSnapshot, MemoryStore, Player, PlayerType, Position, SnapshotStore,
};

use serde_json::json;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn inline_config() -> Config {
    Config {
        league: LeagueConfig {
            total_teams: 4,
            draft_rounds: 3,
            your_team_position: 2,
            favorite_team: "padres".into(),
            team_names: vec!["Aces".into(), "Mine".into()],
            roster: HashMap::from([
                ("C".to_string(), 1),
                ("SS".to_string(), 1),
                ("OF".to_string(), 1),
                ("UTIL".to_string(), 1),
                ("SP".to_string(), 1),
                ("BN".to_string(), 2),
            ]),
        },
        recommendation: RecommendationWeights::default(),
        db_path: String::new(),
        data_paths: DataPaths {
            batting: "unused.csv".into(),
            pitching: "unused.csv".into(),
            roster: None,
        },
    }
}

fn batter(id: &str, team: &str, pos: Position, adp: f64, points: f64) -> Player {
    Player::new(id, id, team, pos, vec![pos, Position::Utility], adp, points, PlayerType::Batter)
}

fn catalog() -> Catalog {
    Catalog::new(vec![
        batter("soto", "NYM", Position::Outfield, 3.0, 480.0),
        batter("tatis", "SDP", Position::Outfield, 10.0, 430.0),
        batter("lindor", "NYM", Position::ShortStop, 12.0, 440.0),
        batter("machado", "SDP", Position::ThirdBase, 30.0, 390.0),
        batter("bogaerts", "SDP", Position::ShortStop, 90.0, 300.0),
        batter("alvarez", "NYM", Position::Catcher, 120.0, 260.0),
        Player::new("king", "king", "SDP", Position::StartingPitcher, vec![Position::StartingPitcher, Position::Pitcher], 60.0, 330.0, PlayerType::Pitcher),
    ])
}

fn state_with_store(store: Box<dyn SnapshotStore + Send>) -> AppState {
    let config = inline_config();
    let mut session = DraftSession::new(catalog(), config.draft_settings())
        .with_weights(config.recommendation.clone());
    session.attach_store(store);
    AppState::new(config, session)
}

/// Drive the app loop with console lines and return everything it printed.
async fn drive(state: AppState, lines: &[&str]) -> Vec<UiUpdate> {
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, mut ui_rx) = mpsc::channel(256);
    let handle = tokio::spawn(app::run(cmd_rx, ui_tx, state));

    for line in lines {
        let cmd = parse_command(line)
            .unwrap_or_else(|e| panic!("bad test line {line:?}: {e}"))
            .expect("test lines are not blank");
        cmd_tx.send(cmd).await.unwrap();
    }
    cmd_tx.send(UserCommand::Quit).await.unwrap();
    handle.await.unwrap().unwrap();

    let mut updates = Vec::new();
    while let Some(update) = ui_rx.recv().await {
        updates.push(update);
    }
    updates
}

fn warnings(updates: &[UiUpdate]) -> Vec<&str> {
    updates
        .iter()
        .filter_map(|u| match u {
            UiUpdate::Warning(w) => Some(w.as_str()),
            _ => None,
        })
        .collect()
}

fn texts(updates: &[UiUpdate]) -> Vec<&str> {
    updates
        .iter()
        .filter_map(|u| match u {
            UiUpdate::Text(t) => Some(t.as_str()),
            _ => None,
        })
        .collect()
}

/// Lets a test keep reading the database after the session owns it.
struct SharedDb(Arc<Database>);

impl SnapshotStore for SharedDb {
    fn save(&self, snapshot: &DraftSnapshot) -> anyhow::Result<()> {
        self.0.save(snapshot)
    }
    fn load(&self) -> anyhow::Result<Option<String>> {
        self.0.load()
    }
    fn clear(&self) -> anyhow::Result<()> {
        self.0.clear()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// A full first round of a 4-team snake with our pick at slot 2; round 2
/// opens with the last slot.
#[tokio::test]
async fn first_round_and_snake_back() {
    let store = MemoryStore::new();
    let updates = drive(
        state_with_store(Box::new(store.clone())),
        &[
            "draft soto",
            "draft lindor",
            "draft tatis",
            "draft machado",
            "turn",
        ],
    )
    .await;

    assert!(warnings(&updates).is_empty(), "{updates:?}");
    assert!(updates.contains(&UiUpdate::Notice("Pick 2: lindor -> Mine (your SS)".into())));
    // Round 2 runs 4,3,2,1: pick 5 belongs to slot 4.
    let turn = texts(&updates);
    assert_eq!(turn, vec!["Pick 5 | Round 2, pick 4 | On the clock: Padres Fan"]);

    let saved = store.latest().unwrap();
    assert_eq!(saved["currentPick"], json!(5));
    assert_eq!(saved["draftedPlayers"].as_array().unwrap().len(), 4);
    assert_eq!(saved["yourRoster"][0]["position"], "SS");
    assert_eq!(saved["favoriteTeam"], "padres");
}

#[tokio::test]
async fn refused_and_ignored_actions_leave_state_alone() {
    let store = MemoryStore::new();
    let updates = drive(
        state_with_store(Box::new(store.clone())),
        &[
            "undo",
            "draft soto",
            "draft soto 3",
            "draft ghost",
            "draft tatis 9",
            "move soto C",
            "position 9",
        ],
    )
    .await;

    let w = warnings(&updates);
    assert_eq!(w.len(), 6, "{w:?}");
    assert_eq!(w[0], "Ignored: no picks to undo");
    assert!(w[1].contains("already been drafted"));
    assert!(w[2].contains("not in the catalog"));
    assert!(w[3].contains("out of range"));
    assert_eq!(w[4], "Ignored: that player is not on your roster");
    assert!(w[5].starts_with("Ignored: yourTeamPosition 9"));

    let saved = store.latest().unwrap();
    assert_eq!(saved["draftedPlayers"].as_array().unwrap().len(), 1);
    assert_eq!(saved["totalTeams"], 4);
    assert_eq!(saved["yourTeamPosition"], 2);
}

#[tokio::test]
async fn recommendations_favor_the_favorite_club() {
    let updates = drive(state_with_store(Box::new(MemoryStore::new())), &["recs"]).await;
    let recs = texts(&updates)[0];
    let row = |id: &str| recs.lines().position(|l| l.contains(id)).unwrap();
    // Soto out-points Tatis at the same position, but Tatis plays for the
    // favorite club.
    assert!(row("tatis") < row("soto"), "{recs}");
    assert!(recs.lines().nth(row("tatis")).unwrap().ends_with(" *"));
    assert!(!recs.lines().nth(row("soto")).unwrap().ends_with(" *"));
}

#[tokio::test]
async fn full_primary_position_overflows_to_utility() {
    let store = MemoryStore::new();
    // We pick at 2 and 7 in a 4-team league; fill the others around us.
    let updates = drive(
        state_with_store(Box::new(store.clone())),
        &[
            "draft soto",
            "draft lindor",
            "draft tatis",
            "draft machado",
            "draft king",
            "draft alvarez",
            "draft bogaerts",
            "roster",
        ],
    )
    .await;

    assert!(updates.contains(&UiUpdate::Notice("Pick 7: bogaerts -> Mine (your UTIL)".into())));
    let roster = texts(&updates)[0];
    assert!(roster.contains("SS    lindor"));
    assert!(roster.contains("UTIL  bogaerts"));
}

#[tokio::test]
async fn restart_restores_from_sqlite() {
    let db = Arc::new(Database::open(":memory:").expect("in-memory db"));

    drive(
        state_with_store(Box::new(SharedDb(db.clone()))),
        &["draft soto", "draft lindor", "rename 1 Sluggers"],
    )
    .await;
    assert!(db.has_draft_in_progress().unwrap());

    let mut state = state_with_store(Box::new(SharedDb(db.clone())));
    let report = app::recover_from_store(&mut state)
        .unwrap()
        .expect("draft in progress");
    assert!(report.rejected.is_empty(), "{:?}", report.rejected);
    assert_eq!(state.session.current_pick(), 3);
    assert_eq!(state.session.team_name(0), "Sluggers");
    assert_eq!(state.session.roster().len(), 1);
    assert!(!state.session.available_players().iter().any(|p| p.id == "soto"));

    let updates = drive(state, &["undo", "undo", "turn"]).await;
    assert_eq!(texts(&updates), vec!["Pick 1 | Round 1, pick 1 | On the clock: Sluggers"]);
    let saved = db.load_state(SNAPSHOT_KEY).unwrap().unwrap();
    assert_eq!(saved["draftedPlayers"].as_array().unwrap().len(), 0);
    assert_eq!(saved["yourRoster"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn reset_clears_the_store() {
    let store = MemoryStore::new();
    drive(
        state_with_store(Box::new(store.clone())),
        &["draft soto", "reset"],
    )
    .await;
    assert!(store.latest().is_none());
}

#[tokio::test]
async fn changing_slot_rebuilds_roster() {
    let store = MemoryStore::new();
    let updates = drive(
        state_with_store(Box::new(store.clone())),
        &["draft soto", "draft lindor", "position 1", "roster"],
    )
    .await;
    let roster = texts(&updates)[0];
    assert!(roster.contains("OF    soto"), "{roster}");
    assert!(!roster.contains("lindor"));
    assert_eq!(store.latest().unwrap()["yourTeamPosition"], 1);
}
