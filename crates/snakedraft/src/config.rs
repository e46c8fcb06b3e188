// Configuration loading and parsing (league.toml, strategy.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use snakedraft_core::catalog::ingest::CatalogPaths;
use snakedraft_core::draft::roster::RosterConfig;
use snakedraft_core::settings::fit_team_names;
use snakedraft_core::valuation::recommend::RecommendationWeights;
use snakedraft_core::{DraftSettings, FavoriteClub, Position};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub recommendation: RecommendationWeights,
    pub db_path: String,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub total_teams: usize,
    pub draft_rounds: u32,
    /// 1-indexed draft slot of the controlled team.
    pub your_team_position: usize,
    pub favorite_team: String,
    #[serde(default)]
    pub team_names: Vec<String>,
    /// Position label -> slot count.
    pub roster: HashMap<String, usize>,
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    recommendation: RecommendationWeights,
    database: DatabaseSection,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    #[serde(default)]
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub batting: String,
    pub pitching: String,
    #[serde(default)]
    pub roster: Option<String>,
}

// ---------------------------------------------------------------------------
// Derived settings
// ---------------------------------------------------------------------------

impl Config {
    /// Session settings described by the league file.
    ///
    /// Only meaningful on a validated config; labels that do not parse are
    /// skipped.
    pub fn draft_settings(&self) -> DraftSettings {
        let league = &self.league;
        let mut team_names = league.team_names.clone();
        fit_team_names(&mut team_names, league.total_teams);
        DraftSettings {
            total_teams: league.total_teams,
            draft_rounds: league.draft_rounds,
            your_team_position: league.your_team_position,
            favorite_team: FavoriteClub::from_str_club(&league.favorite_team).unwrap_or_default(),
            team_names,
            roster: roster_config(&league.roster),
        }
    }

    pub fn catalog_paths(&self) -> CatalogPaths {
        CatalogPaths {
            batting: PathBuf::from(&self.data_paths.batting),
            pitching: PathBuf::from(&self.data_paths.pitching),
            roster: self
                .data_paths
                .roster
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Where the snapshot database lives. An empty `database.path` means the
    /// platform data directory, or the working directory when there is none.
    pub fn resolve_db_path(&self) -> PathBuf {
        if !self.db_path.is_empty() {
            return PathBuf::from(&self.db_path);
        }
        match directories::ProjectDirs::from("", "", "snakedraft") {
            Some(dirs) => dirs.data_dir().join("snakedraft.db"),
            None => PathBuf::from("snakedraft.db"),
        }
    }
}

fn roster_config(raw: &HashMap<String, usize>) -> RosterConfig {
    raw.iter()
        .filter_map(|(label, count)| Position::from_str_pos(label).map(|pos| (pos, *count)))
        .collect()
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml` relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        recommendation: strategy_file.recommendation,
        db_path: strategy_file.database.path,
        data_paths: strategy_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;

    if league.total_teams == 0 {
        return Err(invalid("league.total_teams", "must be > 0"));
    }
    if league.draft_rounds == 0 {
        return Err(invalid("league.draft_rounds", "must be > 0"));
    }
    if league.your_team_position == 0 || league.your_team_position > league.total_teams {
        return Err(invalid(
            "league.your_team_position",
            format!(
                "must be between 1 and {}, got {}",
                league.total_teams, league.your_team_position
            ),
        ));
    }
    if FavoriteClub::from_str_club(&league.favorite_team).is_none() {
        return Err(invalid(
            "league.favorite_team",
            format!("expected \"mets\" or \"padres\", got \"{}\"", league.favorite_team),
        ));
    }
    if league.roster.is_empty() {
        return Err(invalid("league.roster", "must list at least one position"));
    }
    for label in league.roster.keys() {
        if Position::from_str_pos(label).is_none() {
            return Err(invalid(
                &format!("league.roster.{label}"),
                "unknown position label",
            ));
        }
    }

    let w = &config.recommendation;
    let weight_fields: &[(&str, f64)] = &[
        ("recommendation.points", w.points),
        ("recommendation.need", w.need),
        ("recommendation.scarcity", w.scarcity),
    ];
    for (name, val) in weight_fields {
        if *val < 0.0 || !val.is_finite() {
            return Err(invalid(name, format!("must be >= 0, got {val}")));
        }
    }
    if w.points_scale <= 0.0 {
        return Err(invalid(
            "recommendation.points_scale",
            format!("must be > 0, got {}", w.points_scale),
        ));
    }
    if w.favorite_bonus < 1.0 {
        return Err(invalid(
            "recommendation.favorite_bonus",
            format!("must be >= 1.0, got {}", w.favorite_bonus),
        ));
    }
    if w.limit == 0 {
        return Err(invalid("recommendation.limit", "must be > 0"));
    }

    if config.data_paths.batting.is_empty() {
        return Err(invalid("data_paths.batting", "must not be empty"));
    }
    if config.data_paths.pitching.is_empty() {
        return Err(invalid("data_paths.pitching", "must not be empty"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn crate_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    }

    /// Fresh temp dir with config/ holding copies of both default files.
    fn temp_config(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        let config_dir = tmp.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        let root = crate_root();
        fs::copy(root.join("defaults/league.toml"), config_dir.join("league.toml")).unwrap();
        fs::copy(root.join("defaults/strategy.toml"), config_dir.join("strategy.toml")).unwrap();
        tmp
    }

    fn write_league(tmp: &Path, body: &str) {
        fs::write(tmp.join("config/league.toml"), body).unwrap();
    }

    fn expect_field(err: ConfigError, expected: &str) {
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_default_files() {
        let tmp = temp_config("snakedraft_config_defaults");
        let config = load_config_from(&tmp).expect("defaults should load");

        assert_eq!(config.league.total_teams, 12);
        assert_eq!(config.league.draft_rounds, 23);
        assert_eq!(config.league.your_team_position, 3);
        assert_eq!(config.league.roster.get("OF"), Some(&3));
        assert_eq!(config.recommendation, RecommendationWeights::default());
        assert!(config.db_path.is_empty());
        assert!(config.data_paths.roster.is_some());

        let settings = config.draft_settings();
        assert_eq!(settings, DraftSettings::default());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn custom_team_names_are_fitted() {
        let tmp = temp_config("snakedraft_config_team_names");
        write_league(
            &tmp,
            r#"
[league]
total_teams = 4
draft_rounds = 10
your_team_position = 2
favorite_team = "Padres"
team_names = ["Aces", "Bombers"]

[league.roster]
C = 1
BN = 2
"#,
        );
        let config = load_config_from(&tmp).unwrap();
        let settings = config.draft_settings();
        assert_eq!(settings.team_names, vec!["Aces", "Bombers", "Mets Fan", "Padres Fan"]);
        assert_eq!(settings.favorite_team, FavoriteClub::Padres);
        assert_eq!(settings.roster.get(&Position::Catcher), Some(&1));
        assert_eq!(settings.roster.get(&Position::Bench), Some(&2));
        assert_eq!(settings.roster.len(), 2);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_teams() {
        let tmp = temp_config("snakedraft_config_zero_teams");
        write_league(
            &tmp,
            r#"
[league]
total_teams = 0
draft_rounds = 10
your_team_position = 1
favorite_team = "mets"

[league.roster]
C = 1
"#,
        );
        expect_field(load_config_from(&tmp).unwrap_err(), "league.total_teams");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_position_outside_league() {
        let tmp = temp_config("snakedraft_config_position_range");
        write_league(
            &tmp,
            r#"
[league]
total_teams = 8
draft_rounds = 10
your_team_position = 9
favorite_team = "mets"

[league.roster]
C = 1
"#,
        );
        expect_field(load_config_from(&tmp).unwrap_err(), "league.your_team_position");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_unknown_favorite() {
        let tmp = temp_config("snakedraft_config_favorite");
        write_league(
            &tmp,
            r#"
[league]
total_teams = 8
draft_rounds = 10
your_team_position = 1
favorite_team = "yankees"

[league.roster]
C = 1
"#,
        );
        expect_field(load_config_from(&tmp).unwrap_err(), "league.favorite_team");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_unknown_roster_label() {
        let tmp = temp_config("snakedraft_config_roster_label");
        write_league(
            &tmp,
            r#"
[league]
total_teams = 8
draft_rounds = 10
your_team_position = 1
favorite_team = "mets"

[league.roster]
C = 1
XX = 2
"#,
        );
        expect_field(load_config_from(&tmp).unwrap_err(), "league.roster.XX");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_points_scale() {
        let tmp = temp_config("snakedraft_config_points_scale");
        fs::write(
            tmp.join("config/strategy.toml"),
            r#"
[recommendation]
points_scale = 0.0

[database]
path = ""

[data_paths]
batting = "b.csv"
pitching = "p.csv"
"#,
        )
        .unwrap();
        expect_field(load_config_from(&tmp).unwrap_err(), "recommendation.points_scale");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_recommendation_section_uses_defaults() {
        let tmp = temp_config("snakedraft_config_no_weights");
        fs::write(
            tmp.join("config/strategy.toml"),
            r#"
[database]
path = "draft.db"

[data_paths]
batting = "b.csv"
pitching = "p.csv"
"#,
        )
        .unwrap();
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.recommendation, RecommendationWeights::default());
        assert_eq!(config.resolve_db_path(), PathBuf::from("draft.db"));
        assert!(config.catalog_paths().roster.is_none());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn empty_db_path_resolves_somewhere() {
        let tmp = temp_config("snakedraft_config_db_path");
        let config = load_config_from(&tmp).unwrap();
        let path = config.resolve_db_path();
        assert!(path.ends_with("snakedraft.db"));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_league_toml() {
        let tmp = temp_config("snakedraft_config_missing_league");
        fs::remove_file(tmp.join("config/league.toml")).unwrap();
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("league.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = temp_config("snakedraft_config_parse_error");
        write_league(&tmp, "[league\ntotal_teams = ");
        assert!(matches!(
            load_config_from(&tmp).unwrap_err(),
            ConfigError::ParseError { .. }
        ));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("snakedraft_config_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();

        let root = crate_root();
        fs::copy(root.join("defaults/league.toml"), defaults_dir.join("league.toml")).unwrap();
        fs::copy(root.join("defaults/strategy.toml"), defaults_dir.join("strategy.toml")).unwrap();
        fs::write(defaults_dir.join("league.toml.example"), "# sample\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 2);
        assert!(tmp.join("config/league.toml").exists());
        assert!(!tmp.join("config/league.toml.example").exists());

        // Second run copies nothing and keeps edits.
        fs::write(tmp.join("config/league.toml"), "# custom\n").unwrap();
        assert!(ensure_config_files(&tmp).unwrap().is_empty());
        assert_eq!(
            fs::read_to_string(tmp.join("config/league.toml")).unwrap(),
            "# custom\n"
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("snakedraft_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_files(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
