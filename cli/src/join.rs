//! Interactive room membership from a terminal.
//!
//! LIFECYCLE
//! =========
//! Resolve the display name (flag, then saved prefs), connect the relay and
//! wait for the first connection, join, then multiplex stdin lines (sent as
//! chat) with inbound frames (printed and applied to a local board) until
//! stdin closes, `/quit`, Ctrl-C, or the relay goes offline.

#[cfg(test)]
#[path = "join_test.rs"]
mod join_test;

use std::time::Duration;

use canvas::engine::EngineCore;
use canvas::raster::Pixmap;
use client::config::ClientConfig;
use client::prefs::PrefsStore;
use client::relay::{ConnectionStatus, Relay};
use client::session::{Session, SessionError};
use frames::Frame;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{CliError, JoinArgs};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) async fn run(args: JoinArgs) -> Result<(), CliError> {
    let store = match &args.prefs {
        Some(path) => Some(PrefsStore::at(path)),
        None => PrefsStore::default_location()
            .inspect_err(|e| warn!(error = %e, "prefs disabled"))
            .ok(),
    };
    let saved = store.as_ref().map(PrefsStore::load).unwrap_or_default();
    let name = resolve_name(args.name.as_deref(), saved.display_name.as_deref()).ok_or(CliError::MissingName)?;

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = args.url {
        config = config.with_url(url)?;
    }

    let mut relay = Relay::new(&config);
    let mut status = relay.watch_status();
    let mut inbound = relay.subscribe();
    relay.connect();
    wait_connected(&mut status, &config.url).await?;

    let mut session = Session::new(EngineCore::with_surface(Pixmap::new(args.width, args.height)), relay);
    let room = session.join(&args.room, &name)?;
    println!("joined {room} as {name}");

    if let Some(store) = &store {
        if let Err(e) = store.update(|prefs| prefs.display_name = Some(name.clone())) {
            warn!(error = %e, "failed to save display name");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim() == "/quit" {
                    break;
                }
                match session.send_chat(&line) {
                    Ok(message) => println!("<{}> {}", message.username, message.text),
                    Err(SessionError::BlankMessage) => {}
                    Err(e) => eprintln!("{e}"),
                }
            }
            frame = inbound.recv() => match frame {
                Ok(frame) => {
                    if session.apply(&frame) {
                        if let Some(text) = describe(&frame) {
                            println!("{text}");
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => warn!(skipped, "terminal fell behind relay"),
                Err(broadcast::error::RecvError::Closed) => break,
            },
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *status.borrow_and_update();
                match (current, session.relay().membership()) {
                    (ConnectionStatus::Connected, Some(room)) => eprintln!("relay: connected, rejoined {room}"),
                    _ => eprintln!("relay: {}", status_label(current)),
                }
                if current == ConnectionStatus::Offline {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.leave();
    session.relay_mut().disconnect().await?;

    if let Some(path) = &args.save {
        if let Some(surface) = session.engine().surface() {
            surface.save_png(path)?;
            info!(path = %path.display(), "saved board");
        }
    }
    Ok(())
}

async fn wait_connected(
    status: &mut tokio::sync::watch::Receiver<ConnectionStatus>,
    url: &str,
) -> Result<(), CliError> {
    let settled = tokio::time::timeout(
        CONNECT_TIMEOUT,
        status.wait_for(|s| matches!(s, ConnectionStatus::Connected | ConnectionStatus::Offline)),
    )
    .await
    .map_err(|_| CliError::ConnectTimeout(url.to_owned()))?
    .map(|s| *s);

    match settled {
        Ok(ConnectionStatus::Connected) => Ok(()),
        _ => Err(CliError::Offline(url.to_owned())),
    }
}

fn resolve_name(flag: Option<&str>, saved: Option<&str>) -> Option<String> {
    [flag, saved].into_iter().flatten().map(str::trim).find(|name| !name.is_empty()).map(str::to_owned)
}

fn status_label(status: ConnectionStatus) -> String {
    match status {
        ConnectionStatus::Idle => "idle".to_owned(),
        ConnectionStatus::Connecting => "connecting".to_owned(),
        ConnectionStatus::Connected => "connected".to_owned(),
        ConnectionStatus::Reconnecting { attempt } => format!("reconnecting (attempt {attempt})"),
        ConnectionStatus::Offline => "offline".to_owned(),
    }
}

/// One terminal line for an inbound frame, or `None` for silent events.
fn describe(frame: &Frame) -> Option<String> {
    match frame {
        Frame::Draw(f) => Some(format!(
            "* {:?} ({:.0},{:.0}) -> ({:.0},{:.0}) {} {}px",
            f.op.tool, f.op.from.x, f.op.from.y, f.op.to.x, f.op.to.y, f.op.color, f.op.brush_size
        )),
        Frame::Clear(_) => Some("* board cleared".to_owned()),
        Frame::Chat(f) => Some(format!("<{}> {}", f.message.username, f.message.text)),
        Frame::RoomUsers(f) => Some(format!("* here: {}", f.users.join(", "))),
        Frame::UserJoined(u) => Some(format!("* {} joined", u.username)),
        Frame::UserLeft(u) => Some(format!("* {} left", u.username)),
        Frame::JoinRoom(_) | Frame::LeaveRoom(_) => None,
    }
}
