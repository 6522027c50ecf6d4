// THEORY:
// Control producers for the player. Each runs as its own tokio task and only
// ever talks to the playback loop through a `ControlHandle`; when the loop is
// gone the handle's sends fail and the task winds down.

use foveal_luma::{ControlHandle, ControlSignal};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Reads typed commands (`p`, `q`, ...) line by line from stdin.
pub fn spawn_stdin_commands(handle: ControlHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match ControlSignal::from_command(&line) {
                    Some(signal) => {
                        if !handle.send(signal) {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => debug!(command = line.trim(), "ignoring unknown command"),
                },
                Ok(None) => {
                    debug!("stdin closed");
                    break;
                }
                Err(err) => {
                    warn!(%err, "failed to read from stdin");
                    break;
                }
            }
        }
    })
}

/// Turns Ctrl-C into a quit request so the session still releases and reports.
pub fn spawn_ctrl_c(handle: ControlHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupted, stopping playback");
                handle.quit();
            }
            Err(err) => warn!(%err, "could not listen for Ctrl-C"),
        }
    })
}
