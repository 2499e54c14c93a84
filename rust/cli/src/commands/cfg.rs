//! `pokerfelt cfg`: resolved configuration with per-value sources.
//!
//! # Example Output
//!
//! ```json
//! {
//!   "server_url": {
//!     "value": "ws://127.0.0.1:3000/ws",
//!     "source": "default"
//!   },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::display_warning(err, &format!("check {} and POKERFELT_* variables", config::CONFIG_ENV))?;
            return Err(CliError::Config(e.to_string()));
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "server_url": {
            "value": config.server_url,
            "source": sources.server_url,
        },
        "chat_history_limit": {
            "value": config.chat_history_limit,
            "source": sources.chat_history_limit,
        },
        "reconnect_initial_ms": {
            "value": config.reconnect_initial_ms,
            "source": sources.reconnect_initial_ms,
        },
        "reconnect_max_ms": {
            "value": config.reconnect_max_ms,
            "source": sources.reconnect_max_ms,
        },
        "record_path": {
            "value": config.record_path,
            "source": sources.record_path,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
