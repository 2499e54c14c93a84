//! `pokerfelt replay`: feed a recorded session through a fresh client session.
//!
//! Frames are decoded and dispatched exactly as the live socket would, with
//! an in-memory transport standing in for the server. Every table the session
//! draws is printed with the time its frame arrived.

use super::drain_views;
use crate::error::CliError;
use crate::recorder::read_recording;
use crate::ui;
use pokerfelt_client::events::{Slice, ViewBus};
use pokerfelt_client::session::PokerSession;
use pokerfelt_client::transport::RecordingTransport;
use pokerfelt_table::errors::ProtocolError;
use pokerfelt_table::protocol::ServerEvent;
use std::io::Write;

#[derive(Debug, Default, Clone, Copy)]
struct ReplaySummary {
    frames: usize,
    tables: usize,
    skipped: usize,
}

pub fn handle_replay_command(
    input: &str,
    viewer: Option<&str>,
    table: Option<&str>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let (frames, bad) = read_recording(input).map_err(CliError::InvalidInput)?;
    for line in &bad {
        ui::display_warning(err, &format!("line {}: {}", line.line, line.message))?;
    }
    if frames.is_empty() {
        return Err(CliError::InvalidInput(format!("{}: no frames recorded", input)));
    }

    let bus = ViewBus::new();
    let mut views = [
        bus.subscribe(Slice::Lobby),
        bus.subscribe(Slice::Table),
        bus.subscribe(Slice::Chat),
        bus.subscribe(Slice::Notice),
    ];
    let mut session = PokerSession::with_bus(RecordingTransport::new(), bus, None);
    if let Some(viewer) = viewer {
        session.set_socket_id(viewer);
    }
    if let Some(table) = table {
        session.follow_table(table);
    }

    let mut summary = ReplaySummary {
        skipped: bad.len(),
        ..ReplaySummary::default()
    };

    for recorded in &frames {
        summary.frames += 1;
        let event = match ServerEvent::decode(&recorded.frame) {
            Ok(event) => event,
            Err(ProtocolError::UnknownEvent(name)) => {
                tracing::debug!(event = %name, "unknown event in recording");
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                ui::display_warning(err, &format!("{}: {}", recorded.ts, e))?;
                summary.skipped += 1;
                continue;
            }
        };

        if let ServerEvent::PokerTableState(snapshot) = &event
            && session.current_table().is_none()
        {
            session.follow_table(&snapshot.table_id);
        }
        let is_connect = matches!(event, ServerEvent::Connect { .. });

        session.handle(event);
        if is_connect && let Some(viewer) = viewer {
            session.set_socket_id(viewer);
        }

        let mut drawn = Vec::new();
        summary.tables += drain_views(&mut views, &mut drawn)?;
        if !drawn.is_empty() {
            writeln!(out, "-- {} --", recorded.ts)?;
            out.write_all(&drawn)?;
        }
    }

    writeln!(
        out,
        "Replayed {} frames: {} tables drawn, {} skipped",
        summary.frames, summary.tables, summary.skipped
    )?;
    Ok(())
}
