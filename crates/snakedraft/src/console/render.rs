// Plain-text views of a draft session.
//
// Each function returns the full text of one view; the console prints it
// as-is. Nothing here mutates the session.

use snakedraft_core::draft::pick::ALL_POSITIONS;
use snakedraft_core::{DraftSession, IgnoredReason, Player, RestoreReport};

/// Rows shown by the player lists.
const LIST_LIMIT: usize = 25;
/// Board cell width.
const CELL: usize = 14;

pub const HELP: &str = "\
Commands:
  draft <id> [team#] [pos]   record a pick (team on the clock by default)
  undo                       remove the last pick
  move <id> <pos>            move a player on your roster
  teams <n> | rounds <n>     change league size or length
  position <n>               change your draft slot
  favorite [mets|padres]     set or toggle the favorite club
  rename <team#> <name>      rename a team
  reset                      clear every pick
  recs                       recommendations for your next pick
  available [adp|points] [pos]
  find <text>                search undrafted players
  scarcity | needs | board | roster | totals | turn
  help | quit";

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

fn positions_label(player: &Player) -> String {
    player
        .positions
        .iter()
        .map(|p| p.display_str())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn turn(session: &DraftSession) -> String {
    let turn = session.turn();
    let team = session.team_name(turn.team_index);
    let mut line = format!(
        "Pick {} | Round {}, pick {} | On the clock: {}",
        turn.pick_number, turn.round, turn.pick_in_round, team
    );
    if turn.is_your_turn {
        line.push_str(" (you)");
    }
    if session.is_complete() {
        line.push_str(" | all scheduled rounds done");
    }
    line
}

pub fn recommendations(session: &DraftSession) -> String {
    let recs = session.recommendations();
    if recs.is_empty() {
        return "No players available.".to_string();
    }
    let mut lines = vec![format!(
        "{:>2}  {:<24} {:<4} {:<12} {:>6} {:>7} {:>5} {:>5} {:>6}",
        "#", "Player", "Team", "Pos", "ADP", "Points", "Need", "Scar", "Score"
    )];
    for (i, rec) in recs.iter().enumerate() {
        let p = &rec.player;
        lines.push(format!(
            "{:>2}  {:<24} {:<4} {:<12} {:>6.1} {:>7.1} {:>5.1} {:>5.1} {:>6.2}{}",
            i + 1,
            clip(&p.name, 24),
            p.team,
            clip(&positions_label(p), 12),
            p.adp,
            p.projected_points,
            rec.need,
            rec.scarcity,
            rec.overall_score,
            if rec.is_favorite_team { " *" } else { "" }
        ));
    }
    lines.join("\n")
}

/// A player table with ids, for `available` and `find`.
pub fn players(title: &str, players: &[&Player]) -> String {
    if players.is_empty() {
        return format!("{title}: none");
    }
    let mut lines = vec![
        format!("{title} ({})", players.len()),
        format!(
            "{:<28} {:<22} {:<4} {:<12} {:>6} {:>4} {:>7}",
            "Id", "Player", "Team", "Pos", "ADP", "Tier", "Points"
        ),
    ];
    for p in players.iter().take(LIST_LIMIT) {
        lines.push(format!(
            "{:<28} {:<22} {:<4} {:<12} {:>6.1} {:>4} {:>7.1}",
            clip(&p.id, 28),
            clip(&p.name, 22),
            p.team,
            clip(&positions_label(p), 12),
            p.adp,
            p.tier,
            p.projected_points
        ));
    }
    if players.len() > LIST_LIMIT {
        lines.push(format!("... {} more", players.len() - LIST_LIMIT));
    }
    lines.join("\n")
}

pub fn scarcity(session: &DraftSession) -> String {
    let entries = session.position_scarcity();
    if entries.is_empty() {
        return "No players available.".to_string();
    }
    let mut lines = vec![format!(
        "{:<5} {:>5} {:>3} {:>3} {:>3} {:>5}  {}",
        "Pos", "Avail", "T1", "T2", "T3", "Score", "Urgency"
    )];
    for e in entries {
        lines.push(format!(
            "{:<5} {:>5} {:>3} {:>3} {:>3} {:>5.1}  {}",
            e.position.display_str(),
            e.available,
            e.tier1,
            e.tier2,
            e.tier3,
            e.score,
            e.urgency.label()
        ));
    }
    lines.join("\n")
}

pub fn needs(session: &DraftSession) -> String {
    let needs = session.position_needs();
    let filled = session.filled_positions();
    let config = &session.settings().roster;
    let mut lines = vec![format!("{:<5} {:>7} {:>5}", "Pos", "Filled", "Need")];
    for (pos, need) in &needs {
        lines.push(format!(
            "{:<5} {:>3}/{:<3} {:>5.1}",
            pos.display_str(),
            filled.get(pos).copied().unwrap_or(0),
            config.get(pos).copied().unwrap_or(0),
            need
        ));
    }
    lines.join("\n")
}

pub fn board(session: &DraftSession) -> String {
    let settings = session.settings();
    let board = session.draft_board();
    let mut header = format!("{:<4}", "Rd");
    for i in 0..settings.total_teams {
        header.push_str(&format!(" {:<CELL$}", clip(session.team_name(i), CELL)));
    }
    let mut lines = vec![header];
    for (r, row) in board.rounds.iter().enumerate() {
        let mut line = format!("{:<4}", r + 1);
        for cell in row {
            let text = cell.as_ref().map(|p| p.player.name.as_str()).unwrap_or("-");
            line.push_str(&format!(" {:<CELL$}", clip(text, CELL)));
        }
        lines.push(line);
    }
    let unstarted = board.unstarted_rounds();
    if unstarted > 0 {
        lines.push(format!("({unstarted} more rounds)"));
    }
    lines.join("\n")
}

pub fn roster(session: &DraftSession) -> String {
    let entries = session.roster().entries();
    let config = &session.settings().roster;
    let slots = session.available_slots();
    let mut lines = vec![format!(
        "Your roster: {} of {} spots",
        entries.len(),
        session.total_roster_spots()
    )];
    for pos in ALL_POSITIONS {
        let here: Vec<&str> = entries
            .iter()
            .filter(|e| e.position == *pos)
            .map(|e| e.player_data.name.as_str())
            .collect();
        if here.is_empty() && !config.contains_key(pos) {
            continue;
        }
        let open = slots.get(pos).copied().unwrap_or(0).max(0);
        let mut line = format!("{:<5} {}", pos.display_str(), here.join(", "));
        if open > 0 {
            if !here.is_empty() {
                line.push_str(", ");
            }
            line.push_str(&vec!["_"; open as usize].join(", "));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn totals(session: &DraftSession) -> String {
    let t = session.stat_totals();
    format!(
        "HR {}  R {}  RBI {}  SB {}  AVG {:.3}\nW {}  SV {}  K {}  ERA {:.2}  WHIP {:.2}",
        t.hr, t.r, t.rbi, t.sb, t.avg, t.w, t.sv, t.so, t.era, t.whip
    )
}

pub fn ignored_reason(reason: &IgnoredReason) -> String {
    match reason {
        IgnoredReason::NotOnRoster => "that player is not on your roster".into(),
        IgnoredReason::IneligiblePosition => "player is not eligible there".into(),
        IgnoredReason::Unchanged => "nothing to change".into(),
        IgnoredReason::EmptyLedger => "no picks to undo".into(),
        IgnoredReason::TeamOutOfRange => "no such team".into(),
        IgnoredReason::InvalidSettings(why) => why.clone(),
    }
}

/// One-line summary of a restore, for the startup banner.
pub fn restore_summary(session: &DraftSession, report: &RestoreReport) -> String {
    let mut line = format!(
        "Resumed draft: {} picks made, {} on your roster",
        session.ledger().len(),
        session.roster().len()
    );
    if !report.rejected.is_empty() {
        let fields: Vec<&str> = report.rejected.iter().map(|(f, _)| *f).collect();
        line.push_str(&format!(" (discarded: {})", fields.join(", ")));
    }
    line
}
