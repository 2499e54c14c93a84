//! Command handlers, one module per subcommand.

pub mod cfg;
pub mod play;
pub mod render;
pub mod replay;

pub use cfg::handle_cfg_command;
pub use play::handle_play_command;
pub use render::handle_render_command;
pub use replay::handle_replay_command;

use crate::formatters::{format_chat, format_lobby, format_table};
use crate::ui;
use pokerfelt_client::events::{Notice, Screen, Subscription, ViewEvent};
use std::io::Write;

/// Prints one view event the way the terminal shows it.
pub(crate) fn write_view_event(out: &mut dyn Write, event: &ViewEvent) -> std::io::Result<()> {
    match event {
        ViewEvent::LobbyUpdated(rows) => writeln!(out, "{}", format_lobby(rows)),
        ViewEvent::ScreenChanged(Screen::Lobby) => ui::display_info(out, "back in the lobby"),
        ViewEvent::ScreenChanged(Screen::Table) => ui::display_info(out, "seated at the table"),
        ViewEvent::TableRendered(view) => writeln!(out, "{}", format_table(view)),
        ViewEvent::ChatAppended(message) => writeln!(out, "{}", format_chat(message)),
        ViewEvent::Notice(Notice::Alert(message)) => ui::display_alert(out, message),
        ViewEvent::Notice(Notice::Info(message)) => ui::display_info(out, message),
    }
}

/// Prints everything queued on the subscriptions; returns how many tables were drawn.
pub(crate) fn drain_views(
    subscriptions: &mut [Subscription],
    out: &mut dyn Write,
) -> std::io::Result<usize> {
    let mut tables = 0;
    for sub in subscriptions.iter_mut() {
        while let Ok(event) = sub.receiver.try_recv() {
            if matches!(event, ViewEvent::TableRendered(_)) {
                tables += 1;
            }
            write_view_event(out, &event)?;
        }
    }
    Ok(tables)
}
