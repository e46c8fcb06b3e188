// Command-line parsing for the console.
//
// Turns one line of user input into a UserCommand. Parsing never touches the
// session; range checks against the league happen in the app loop.

use thiserror::Error;

use snakedraft_core::{FavoriteClub, Position, SettingsUpdate, SortKey};

use crate::protocol::{UserCommand, View};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command `{0}` (try `help`)")]
    UnknownCommand(String),

    #[error("`{command}` needs {what}")]
    MissingArgument { command: &'static str, what: &'static str },

    #[error("`{0}` is not a positive number")]
    InvalidNumber(String),

    #[error("`{0}` is not a roster position")]
    InvalidPosition(String),

    #[error("`{0}` is not a favorite club (mets or padres)")]
    InvalidClub(String),

    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<UserCommand>, InputError> {
    let line = line.trim();
    let Some((word, rest)) = split_first(line) else {
        return Ok(None);
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let cmd = match word.to_lowercase().as_str() {
        "draft" | "d" => parse_draft(&args)?,
        "undo" | "u" => no_args(&args, UserCommand::Undo)?,
        "move" | "mv" => {
            let player_id = required(&args, 0, "move", "a player id")?;
            let label = required(&args, 1, "move", "a position")?;
            extra(&args, 2)?;
            UserCommand::Move {
                player_id: player_id.to_string(),
                position: position(label)?,
            }
        }
        "teams" => UserCommand::UpdateSettings(SettingsUpdate {
            total_teams: Some(number(required(&args, 0, "teams", "a team count")?)?),
            ..SettingsUpdate::default()
        }),
        "rounds" => UserCommand::UpdateSettings(SettingsUpdate {
            draft_rounds: Some(round_count(required(&args, 0, "rounds", "a round count")?)?),
            ..SettingsUpdate::default()
        }),
        "position" | "slot" => UserCommand::UpdateSettings(SettingsUpdate {
            your_team_position: Some(number(required(&args, 0, "position", "a draft slot")?)?),
            ..SettingsUpdate::default()
        }),
        "favorite" | "fav" => match args.first() {
            None => UserCommand::Favorite(None),
            Some(name) => {
                extra(&args, 1)?;
                let club = FavoriteClub::from_str_club(name)
                    .ok_or_else(|| InputError::InvalidClub(name.to_string()))?;
                UserCommand::Favorite(Some(club))
            }
        },
        "rename" => {
            let team = number(required(&args, 0, "rename", "a team number")?)?;
            if args.len() < 2 {
                return Err(InputError::MissingArgument {
                    command: "rename",
                    what: "a name",
                });
            }
            UserCommand::Rename {
                team,
                name: args[1..].join(" "),
            }
        }
        "reset" => no_args(&args, UserCommand::Reset)?,
        "recs" | "r" => no_args(&args, UserCommand::Show(View::Recommendations))?,
        "available" | "avail" | "a" => parse_available(&args)?,
        "find" | "f" => {
            if rest.trim().is_empty() {
                return Err(InputError::MissingArgument {
                    command: "find",
                    what: "search text",
                });
            }
            UserCommand::Show(View::Find(rest.trim().to_string()))
        }
        "scarcity" => no_args(&args, UserCommand::Show(View::Scarcity))?,
        "needs" => no_args(&args, UserCommand::Show(View::Needs))?,
        "board" | "b" => no_args(&args, UserCommand::Show(View::Board))?,
        "roster" => no_args(&args, UserCommand::Show(View::Roster))?,
        "totals" => no_args(&args, UserCommand::Show(View::Totals))?,
        "turn" | "t" => no_args(&args, UserCommand::Show(View::Turn))?,
        "help" | "h" | "?" => UserCommand::Help,
        "quit" | "q" | "exit" => UserCommand::Quit,
        other => return Err(InputError::UnknownCommand(other.to_string())),
    };
    Ok(Some(cmd))
}

/// `draft <id> [team#] [pos]`. A second argument that is not a number is
/// read as the position.
fn parse_draft(args: &[&str]) -> Result<UserCommand, InputError> {
    let player_id = required(args, 0, "draft", "a player id")?.to_string();
    let mut team = None;
    let mut target = None;
    for arg in &args[1..] {
        if team.is_none() && target.is_none() && arg.chars().all(|c| c.is_ascii_digit()) {
            team = Some(number(arg)?);
        } else if target.is_none() {
            target = Some(position(arg)?);
        } else {
            return Err(InputError::UnexpectedArgument(arg.to_string()));
        }
    }
    Ok(UserCommand::Draft {
        player_id,
        team,
        position: target,
    })
}

/// `available [adp|points] [pos]`, in either order.
fn parse_available(args: &[&str]) -> Result<UserCommand, InputError> {
    let mut sort = None;
    let mut filter = None;
    for arg in args {
        match arg.to_lowercase().as_str() {
            "adp" if sort.is_none() => sort = Some(SortKey::Adp),
            "points" | "pts" if sort.is_none() => sort = Some(SortKey::Points),
            _ if filter.is_none() => filter = Some(position(arg)?),
            _ => return Err(InputError::UnexpectedArgument(arg.to_string())),
        }
    }
    Ok(UserCommand::Show(View::Available {
        sort: sort.unwrap_or(SortKey::Adp),
        position: filter,
    }))
}

fn split_first(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (line, ""),
    })
}

fn required<'a>(
    args: &[&'a str],
    index: usize,
    command: &'static str,
    what: &'static str,
) -> Result<&'a str, InputError> {
    args.get(index)
        .copied()
        .ok_or(InputError::MissingArgument { command, what })
}

fn extra(args: &[&str], allowed: usize) -> Result<(), InputError> {
    match args.get(allowed) {
        Some(arg) => Err(InputError::UnexpectedArgument(arg.to_string())),
        None => Ok(()),
    }
}

fn no_args(args: &[&str], cmd: UserCommand) -> Result<UserCommand, InputError> {
    extra(args, 0)?;
    Ok(cmd)
}

fn number(s: &str) -> Result<usize, InputError> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(InputError::InvalidNumber(s.to_string())),
    }
}

fn round_count(s: &str) -> Result<u32, InputError> {
    u32::try_from(number(s)?).map_err(|_| InputError::InvalidNumber(s.to_string()))
}

fn position(s: &str) -> Result<Position, InputError> {
    Position::from_str_pos(s).ok_or_else(|| InputError::InvalidPosition(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> UserCommand {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn draft_variants() {
        assert_eq!(
            parse("draft judge-nyy"),
            UserCommand::Draft {
                player_id: "judge-nyy".into(),
                team: None,
                position: None
            }
        );
        assert_eq!(
            parse("draft judge-nyy 4"),
            UserCommand::Draft {
                player_id: "judge-nyy".into(),
                team: Some(4),
                position: None
            }
        );
        assert_eq!(
            parse("d judge-nyy 4 bn"),
            UserCommand::Draft {
                player_id: "judge-nyy".into(),
                team: Some(4),
                position: Some(Position::Bench)
            }
        );
        assert_eq!(
            parse("draft judge-nyy UTIL"),
            UserCommand::Draft {
                player_id: "judge-nyy".into(),
                team: None,
                position: Some(Position::Utility)
            }
        );
    }

    #[test]
    fn draft_errors() {
        assert_eq!(
            parse_command("draft"),
            Err(InputError::MissingArgument {
                command: "draft",
                what: "a player id"
            })
        );
        assert_eq!(
            parse_command("draft x 0"),
            Err(InputError::InvalidNumber("0".into()))
        );
        assert_eq!(
            parse_command("draft x 2 QB"),
            Err(InputError::InvalidPosition("QB".into()))
        );
        assert_eq!(
            parse_command("draft x 2 SS C"),
            Err(InputError::UnexpectedArgument("C".into()))
        );
    }

    #[test]
    fn settings_commands() {
        assert_eq!(
            parse("teams 10"),
            UserCommand::UpdateSettings(SettingsUpdate {
                total_teams: Some(10),
                ..SettingsUpdate::default()
            })
        );
        assert_eq!(
            parse("rounds 20"),
            UserCommand::UpdateSettings(SettingsUpdate {
                draft_rounds: Some(20),
                ..SettingsUpdate::default()
            })
        );
        assert_eq!(
            parse("position 5"),
            UserCommand::UpdateSettings(SettingsUpdate {
                your_team_position: Some(5),
                ..SettingsUpdate::default()
            })
        );
        assert_eq!(
            parse_command("teams many"),
            Err(InputError::InvalidNumber("many".into()))
        );
    }

    #[test]
    fn round_count_out_of_range_is_refused() {
        assert_eq!(
            parse_command("rounds 4294967297"),
            Err(InputError::InvalidNumber("4294967297".into()))
        );
        assert_eq!(
            parse("rounds 4294967295"),
            UserCommand::UpdateSettings(SettingsUpdate {
                draft_rounds: Some(u32::MAX),
                ..SettingsUpdate::default()
            })
        );
    }

    #[test]
    fn favorite_and_rename() {
        assert_eq!(parse("favorite"), UserCommand::Favorite(None));
        assert_eq!(
            parse("fav Padres"),
            UserCommand::Favorite(Some(FavoriteClub::Padres))
        );
        assert_eq!(
            parse_command("favorite yankees"),
            Err(InputError::InvalidClub("yankees".into()))
        );
        assert_eq!(
            parse("rename 2 The Big Hurt"),
            UserCommand::Rename {
                team: 2,
                name: "The Big Hurt".into()
            }
        );
        assert!(parse_command("rename 2").is_err());
    }

    #[test]
    fn available_arguments_in_any_order() {
        assert_eq!(
            parse("available"),
            UserCommand::Show(View::Available {
                sort: SortKey::Adp,
                position: None
            })
        );
        assert_eq!(
            parse("avail SS points"),
            UserCommand::Show(View::Available {
                sort: SortKey::Points,
                position: Some(Position::ShortStop)
            })
        );
        assert_eq!(
            parse("a adp of"),
            UserCommand::Show(View::Available {
                sort: SortKey::Adp,
                position: Some(Position::Outfield)
            })
        );
    }

    #[test]
    fn find_keeps_spaces() {
        assert_eq!(
            parse("find  pete alonso "),
            UserCommand::Show(View::Find("pete alonso".into()))
        );
        assert!(parse_command("find").is_err());
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("UNDO"), UserCommand::Undo);
        assert_eq!(parse("recs"), UserCommand::Show(View::Recommendations));
        assert_eq!(parse("board"), UserCommand::Show(View::Board));
        assert_eq!(parse("q"), UserCommand::Quit);
        assert_eq!(
            parse_command("undo now"),
            Err(InputError::UnexpectedArgument("now".into()))
        );
        assert_eq!(
            parse_command("launch"),
            Err(InputError::UnknownCommand("launch".into()))
        );
    }

    #[test]
    fn move_command() {
        assert_eq!(
            parse("move alonso-nym util"),
            UserCommand::Move {
                player_id: "alonso-nym".into(),
                position: Position::Utility
            }
        );
    }
}
