// Line-oriented console front end.
//
// Reads commands from stdin, forwards them to the app loop, and prints the
// UiUpdates it sends back. Help is answered locally.

pub mod input;
pub mod render;

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::protocol::{UiUpdate, UserCommand};

/// Run the console on stdin/stdout until the user quits or the app loop
/// goes away.
pub async fn run(
    ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    run_with(ui_rx, cmd_tx, stdin, std::io::stdout()).await
}

/// Console loop over any line source and sink.
pub async fn run_with<R, W>(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    input: R,
    mut out: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "Type `help` for commands.")?;

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(update) => print_update(&mut out, update)?,
                    None => {
                        debug!("UI channel closed, console exiting");
                        break;
                    }
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("input closed, quitting");
                    let _ = cmd_tx.send(UserCommand::Quit).await;
                    break;
                };
                match input::parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(UserCommand::Help)) => writeln!(out, "{}", render::HELP)?,
                    Ok(Some(UserCommand::Quit)) => {
                        let _ = cmd_tx.send(UserCommand::Quit).await;
                        break;
                    }
                    Ok(Some(cmd)) => {
                        if cmd_tx.send(cmd).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => writeln!(out, "! {e}")?,
                }
            }
        }
        out.flush()?;
    }

    out.flush()?;
    Ok(())
}

fn print_update<W: Write>(out: &mut W, update: UiUpdate) -> std::io::Result<()> {
    match update {
        UiUpdate::Notice(text) => writeln!(out, "{text}"),
        UiUpdate::Warning(text) => writeln!(out, "! {text}"),
        UiUpdate::Text(text) => writeln!(out, "{text}\n"),
    }
}
