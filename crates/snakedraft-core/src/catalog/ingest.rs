// Projection CSV ingestion into catalog players.
//
// Reads a batting projections CSV, a pitching projections CSV and an optional
// roster CSV that supplies position eligibility. Players appearing in both
// projection files are merged into a single two-way record.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use super::player::{tier_for_adp, BattingStats, PitchingStats, Player, PlayerStats, PlayerType, UNKNOWN_ADP};
use super::Catalog;
use crate::draft::pick::Position;

/// Innings above which a pitching projection counts as the player's main role.
const PRIMARY_PITCHER_IP: f64 = 50.0;

/// ERA assumed for points when the column is blank.
const DEFAULT_ERA: f64 = 4.5;

/// WHIP assumed for points when the column is blank.
const DEFAULT_WHIP: f64 = 1.4;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV rows
// ---------------------------------------------------------------------------

/// Batting projection row. Numeric cells that are blank or unparseable read
/// as `None` and count as zero.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawBattingRow {
    Name: String,
    #[serde(default)]
    Team: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    PA: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    AB: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    H: Option<f64>,
    #[serde(rename = "2B", default, deserialize_with = "csv::invalid_option")]
    Doubles: Option<f64>,
    #[serde(rename = "3B", default, deserialize_with = "csv::invalid_option")]
    Triples: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HR: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    R: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    RBI: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    SB: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    BB: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    AVG: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    OBP: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    SLG: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    ADP: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPitchingRow {
    Name: String,
    #[serde(default)]
    Team: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    W: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    L: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    ERA: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    G: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    GS: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    SV: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    IP: Option<f64>,
    #[serde(alias = "K", default, deserialize_with = "csv::invalid_option")]
    SO: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    WHIP: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    ADP: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawRosterRow {
    Name: String,
    #[serde(default)]
    Pos: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whole-number count from a cell, truncated; blank, negative or non-finite
/// values read as 0.
fn count(v: Option<f64>) -> u32 {
    v.filter(|x| x.is_finite() && *x > 0.0)
        .map(|x| x as u32)
        .unwrap_or(0)
}

fn rate(v: Option<f64>) -> f64 {
    v.filter(|x| x.is_finite()).unwrap_or(0.0)
}

/// ADP from a cell; blank, zero or non-finite values become the sentinel.
fn adp_value(v: Option<f64>) -> f64 {
    v.filter(|x| x.is_finite() && *x != 0.0).unwrap_or(UNKNOWN_ADP)
}

/// Matching key for a player name: lowercase ASCII letters and digits only.
pub fn name_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Catalog id: lowercased name with every other character replaced by '-',
/// followed by '-' and the team abbreviation.
pub fn player_id(name: &str, team: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
        .collect();
    format!("{slug}-{team}")
}

/// Eligibility for a roster-source position label.
pub fn positions_for_label(label: &str) -> Vec<Position> {
    use Position::*;
    match label.trim().to_uppercase().as_str() {
        "C" => vec![Catcher, Utility],
        "1B" => vec![FirstBase, Utility],
        "2B" => vec![SecondBase, Utility],
        "3B" => vec![ThirdBase, Utility],
        "SS" => vec![ShortStop, Utility],
        "LF" | "CF" | "RF" | "OF" => vec![Outfield, Utility],
        "SP" => vec![StartingPitcher, Pitcher],
        "RP" | "CL" => vec![ReliefPitcher, Pitcher],
        _ => vec![Utility],
    }
}

fn infer_batting_positions(stats: &BattingStats) -> Vec<Position> {
    let (hr, sb) = (stats.hr, stats.sb);
    if hr > 30 || sb > 20 || (hr > 20 && sb > 10) {
        vec![Position::Outfield, Position::Utility]
    } else {
        vec![Position::Utility]
    }
}

fn infer_pitching_positions(stats: &PitchingStats) -> Vec<Position> {
    if stats.gs > 10 {
        vec![Position::StartingPitcher, Position::Pitcher]
    } else if stats.sv > 0 {
        vec![Position::ReliefPitcher, Position::Pitcher]
    } else {
        vec![Position::Pitcher]
    }
}

/// Batting points: 1 per single, 2 per double, 3 per triple, 4 per HR,
/// 1.5 per RBI and run, 3 per SB, 0.5 per walk.
pub fn batting_points(stats: &BattingStats) -> f64 {
    let singles = stats.h as f64 - stats.doubles as f64 - stats.triples as f64 - stats.hr as f64;
    singles
        + stats.doubles as f64 * 2.0
        + stats.triples as f64 * 3.0
        + stats.hr as f64 * 4.0
        + stats.rbi as f64 * 1.5
        + stats.r as f64 * 1.5
        + stats.sb as f64 * 3.0
        + stats.bb as f64 * 0.5
}

/// Pitching points: 5 per win, 4 per save, 1 per strikeout, minus ten times
/// ERA and WHIP. Zero ERA/WHIP fall back to league-average defaults.
pub fn pitching_points(stats: &PitchingStats) -> f64 {
    let era = if stats.era != 0.0 { stats.era } else { DEFAULT_ERA };
    let whip = if stats.whip != 0.0 { stats.whip } else { DEFAULT_WHIP };
    stats.w as f64 * 5.0 + stats.sv as f64 * 4.0 + stats.so as f64 - era * 10.0 - whip * 10.0
}

// ---------------------------------------------------------------------------
// Roster index
// ---------------------------------------------------------------------------

/// Position data for one roster-source player.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterInfo {
    pub primary: Position,
    pub positions: Vec<Position>,
}

/// Roster-source positions keyed by [`name_key`].
#[derive(Debug, Clone, Default)]
pub struct RosterIndex {
    entries: BTreeMap<String, RosterInfo>,
}

impl RosterIndex {
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, csv::Error> {
        let mut reader = csv::Reader::from_reader(rdr);
        let mut entries = BTreeMap::new();
        for result in reader.deserialize::<RawRosterRow>() {
            match result {
                Ok(raw) => {
                    let key = name_key(&raw.Name);
                    if key.is_empty() {
                        continue;
                    }
                    let positions = positions_for_label(&raw.Pos);
                    let primary = Position::from_str_pos(&raw.Pos).unwrap_or(positions[0]);
                    entries.insert(key, RosterInfo { primary, positions });
                }
                Err(e) => warn!("skipping malformed roster row: {}", e),
            }
        }
        Ok(RosterIndex { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find roster data for a projection name.
    ///
    /// Exact key match first. Otherwise a key that contains, or is contained
    /// in, the name's key; accepted only when exactly one key qualifies.
    pub fn lookup(&self, name: &str) -> Option<&RosterInfo> {
        let key = name_key(name);
        if key.is_empty() {
            return None;
        }
        if let Some(info) = self.entries.get(&key) {
            return Some(info);
        }

        let mut matches = self
            .entries
            .iter()
            .filter(|(k, _)| key.contains(k.as_str()) || k.contains(key.as_str()));
        match (matches.next(), matches.next()) {
            (Some((_, info)), None) => Some(info),
            (Some((first, _)), Some((second, _))) => {
                warn!("ambiguous roster match for '{}' ({}, {}, ...), ignoring", name, first, second);
                None
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

/// Read batting projections into batter players.
pub fn load_batters_from_reader<R: Read>(rdr: R, roster: &RosterIndex) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawBattingRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed batting row: {}", e);
                continue;
            }
        };
        let name = raw.Name.trim().to_string();
        if name.is_empty() {
            continue;
        }
        let team = raw.Team.trim().to_string();

        let batting = BattingStats {
            pa: count(raw.PA),
            ab: count(raw.AB),
            h: count(raw.H),
            doubles: count(raw.Doubles),
            triples: count(raw.Triples),
            hr: count(raw.HR),
            r: count(raw.R),
            rbi: count(raw.RBI),
            sb: count(raw.SB),
            bb: count(raw.BB),
            avg: rate(raw.AVG),
            obp: rate(raw.OBP),
            slg: rate(raw.SLG),
        };

        let (primary, positions) = match roster.lookup(&name) {
            Some(info) => (info.primary, info.positions.clone()),
            None => {
                let positions = infer_batting_positions(&batting);
                (positions[0], positions)
            }
        };

        let adp = adp_value(raw.ADP);
        players.push(Player {
            id: player_id(&name, &team),
            name,
            team,
            position: primary,
            positions,
            adp,
            tier: tier_for_adp(adp),
            projected_points: batting_points(&batting),
            player_type: PlayerType::Batter,
            stats: PlayerStats {
                batting,
                pitching: PitchingStats::default(),
            },
            is_two_way: false,
        });
    }
    Ok(players)
}

/// Read pitching projections into pitcher players.
pub fn load_pitchers_from_reader<R: Read>(rdr: R, roster: &RosterIndex) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawPitchingRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed pitching row: {}", e);
                continue;
            }
        };
        let name = raw.Name.trim().to_string();
        if name.is_empty() {
            continue;
        }
        let team = raw.Team.trim().to_string();

        let pitching = PitchingStats {
            w: count(raw.W),
            l: count(raw.L),
            era: rate(raw.ERA),
            g: count(raw.G),
            gs: count(raw.GS),
            sv: count(raw.SV),
            ip: rate(raw.IP),
            so: count(raw.SO),
            whip: rate(raw.WHIP),
        };

        let (primary, positions) = match roster.lookup(&name) {
            Some(info) => (info.primary, info.positions.clone()),
            None => {
                let positions = infer_pitching_positions(&pitching);
                (positions[0], positions)
            }
        };

        let adp = adp_value(raw.ADP);
        players.push(Player {
            id: player_id(&name, &team),
            name,
            team,
            position: primary,
            positions,
            adp,
            tier: tier_for_adp(adp),
            projected_points: pitching_points(&pitching),
            player_type: PlayerType::Pitcher,
            stats: PlayerStats {
                batting: BattingStats::default(),
                pitching,
            },
            is_two_way: false,
        });
    }
    Ok(players)
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Combine batters and pitchers into one list keyed by player name.
///
/// A pitcher whose name matches a batter is folded into that batter: the
/// pitching line and points are added, and when pitching is the player's
/// main role its positions are appended to the eligibility list. A repeated
/// name otherwise replaces the earlier row in place.
pub fn merge_players(batters: Vec<Player>, pitchers: Vec<Player>) -> Vec<Player> {
    let mut merged: Vec<Player> = Vec::with_capacity(batters.len() + pitchers.len());
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for batter in batters {
        match by_name.get(&batter.name) {
            Some(&idx) => merged[idx] = batter,
            None => {
                by_name.insert(batter.name.clone(), merged.len());
                merged.push(batter);
            }
        }
    }

    for pitcher in pitchers {
        match by_name.get(&pitcher.name) {
            Some(&idx) if merged[idx].player_type == PlayerType::Batter => {
                let existing = &mut merged[idx];
                existing.is_two_way = true;
                existing.stats.pitching = pitcher.stats.pitching;
                existing.projected_points += pitcher.projected_points;
                if pitcher.stats.pitching.ip > PRIMARY_PITCHER_IP {
                    for pos in pitcher.positions {
                        if !existing.positions.contains(&pos) {
                            existing.positions.push(pos);
                        }
                    }
                }
            }
            Some(&idx) => merged[idx] = pitcher,
            None => {
                by_name.insert(pitcher.name.clone(), merged.len());
                merged.push(pitcher);
            }
        }
    }

    merged
}

/// Order by ADP ascending, keeping input order among equal values.
pub fn sort_by_adp(players: &mut [Player]) {
    players.sort_by(|a, b| a.adp.partial_cmp(&b.adp).unwrap_or(std::cmp::Ordering::Equal));
}

// ---------------------------------------------------------------------------
// Path-based loading
// ---------------------------------------------------------------------------

/// Projection file locations.
#[derive(Debug, Clone, Default)]
pub struct CatalogPaths {
    pub batting: PathBuf,
    pub pitching: PathBuf,
    pub roster: Option<PathBuf>,
}

fn open(path: &Path) -> Result<std::fs::File, IngestError> {
    std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn csv_err(path: &Path) -> impl FnOnce(csv::Error) -> IngestError + '_ {
    move |e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    }
}

pub fn load_roster_index(path: &Path) -> Result<RosterIndex, IngestError> {
    RosterIndex::from_reader(open(path)?).map_err(csv_err(path))
}

pub fn load_batters(path: &Path, roster: &RosterIndex) -> Result<Vec<Player>, IngestError> {
    load_batters_from_reader(open(path)?, roster).map_err(csv_err(path))
}

pub fn load_pitchers(path: &Path, roster: &RosterIndex) -> Result<Vec<Player>, IngestError> {
    load_pitchers_from_reader(open(path)?, roster).map_err(csv_err(path))
}

/// Build the catalog from projection files.
///
/// A source that cannot be read is logged and skipped so a partial catalog
/// still loads. Fails only when nothing at all could be loaded.
pub fn load_catalog(paths: &CatalogPaths) -> Result<Catalog, IngestError> {
    let roster = match &paths.roster {
        Some(path) => load_roster_index(path).unwrap_or_else(|e| {
            warn!("roster positions unavailable: {}", e);
            RosterIndex::default()
        }),
        None => RosterIndex::default(),
    };

    let batters = load_batters(&paths.batting, &roster).unwrap_or_else(|e| {
        warn!("batting projections unavailable: {}", e);
        Vec::new()
    });
    let pitchers = load_pitchers(&paths.pitching, &roster).unwrap_or_else(|e| {
        warn!("pitching projections unavailable: {}", e);
        Vec::new()
    });

    info!(
        "loaded {} batters, {} pitchers, {} roster entries",
        batters.len(),
        pitchers.len(),
        roster.len()
    );

    let mut players = merge_players(batters, pitchers);
    if players.is_empty() {
        return Err(IngestError::Validation("projection files produced zero players".into()));
    }
    sort_by_adp(&mut players);
    Ok(Catalog::new(players))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
