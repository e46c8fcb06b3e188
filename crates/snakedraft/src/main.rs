// Snake draft tracker entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open the snapshot database (continue without it on failure)
// 4. Load the player catalog (continue with whatever loaded)
// 5. Build the session and restore the saved draft
// 6. Create mpsc channels and spawn the app task
// 7. Run the console until the user quits

use snakedraft::app;
use snakedraft::config;
use snakedraft::console;
use snakedraft::console::render;

use snakedraft_core::catalog::ingest;
use snakedraft_core::db::Database;
use snakedraft_core::{Catalog, DraftSession};

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Tracing
    init_tracing()?;
    info!("Snake draft tracker starting up");

    // 2. Config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} teams, {} rounds, slot {}",
        config.league.total_teams, config.league.draft_rounds, config.league.your_team_position
    );

    // 3. Snapshot database
    let db_path = config.resolve_db_path();
    let db = match open_database(&db_path) {
        Ok(db) => {
            info!("Database opened at {}", db_path.display());
            Some(db)
        }
        Err(e) => {
            warn!("Draft will not be saved: {:#}", e);
            eprintln!("warning: draft will not be saved ({e:#})");
            None
        }
    };

    // 4. Catalog
    let catalog = match ingest::load_catalog(&config.catalog_paths()) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("Player catalog unavailable: {}", e);
            eprintln!("warning: no players loaded ({e})");
            Catalog::default()
        }
    };
    info!("Catalog holds {} players", catalog.len());

    // 5. Session and recovery
    let session = DraftSession::new(catalog, config.draft_settings())
        .with_weights(config.recommendation.clone());
    let mut app_state = app::AppState::new(config, session);
    if let Some(db) = db {
        app_state.session.attach_store(Box::new(db));
    }

    match app::recover_from_store(&mut app_state) {
        Ok(Some(report)) => {
            println!("{}", render::restore_summary(&app_state.session, &report));
        }
        Ok(None) => info!("Starting fresh draft session"),
        Err(e) => {
            // Leave the stored draft untouched; this session runs in memory.
            error!("Crash recovery failed: {:#}", e);
            eprintln!("warning: saved draft could not be read, not saving this session ({e:#})");
            app_state.session.detach_store();
        }
    }

    // 6. Channels and app task
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 7. Console (blocks until quit or end of input)
    if let Err(e) = console::run(ui_rx, cmd_tx).await {
        error!("Console error: {}", e);
    }

    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Snake draft tracker shut down cleanly");
    Ok(())
}

fn open_database(path: &std::path::Path) -> anyhow::Result<Database> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Database::open(&path.to_string_lossy())
}

/// Initialize tracing to log to a file, keeping the console clean.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("snakedraft.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("snakedraft=info,snakedraft_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
