// Library root for the snake-draft core: catalog, ledger, roster engine,
// recommendation engine, session object and snapshot persistence.

pub mod catalog;
pub mod db;
pub mod draft;
pub mod error;
pub mod session;
pub mod settings;
pub mod snapshot;
pub mod valuation;

pub use catalog::player::{Player, PlayerType};
pub use catalog::Catalog;
pub use draft::pick::{Pick, Position};
pub use error::DraftError;
pub use session::{ActionOutcome, ActionStatus, DraftSession, IgnoredReason, PersistStatus, PickOutcome, SortKey};
pub use settings::{DraftSettings, FavoriteClub, SettingsUpdate};
pub use snapshot::{DraftSnapshot, MemoryStore, RestoreReport, SnapshotStore};
