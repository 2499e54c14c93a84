//! `pokerfelt render`: draw one snapshot file for a viewer.

use crate::error::CliError;
use crate::formatters::format_table;
use crate::io_utils::read_text_auto;
use pokerfelt_table::protocol::ServerEvent;
use pokerfelt_table::snapshot::TableSnapshot;
use pokerfelt_table::view::render_table;
use std::io::Write;
use std::sync::Arc;

pub fn handle_render_command(
    input: &str,
    viewer: &str,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let text = read_text_auto(input).map_err(CliError::InvalidInput)?;
    let snapshot = parse_snapshot(&text)?;
    let view = render_table(&snapshot, viewer)?;

    if json {
        let json_str = serde_json::to_string_pretty(&view).map_err(std::io::Error::other)?;
        writeln!(out, "{}", json_str)?;
    } else {
        writeln!(out, "{}", format_table(&view))?;
    }
    Ok(())
}

/// Accepts either a bare snapshot or a whole `pokerTableState` frame.
pub fn parse_snapshot(text: &str) -> Result<Arc<TableSnapshot>, CliError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| CliError::InvalidInput(format!("not JSON: {}", e)))?;
    if value.get("event").is_none() {
        return Ok(Arc::new(TableSnapshot::from_value(value)?));
    }
    match ServerEvent::decode(text)? {
        ServerEvent::PokerTableState(snapshot) => Ok(snapshot),
        other => Err(CliError::InvalidInput(format!(
            "expected a pokerTableState frame, found {}",
            other.name()
        ))),
    }
}
