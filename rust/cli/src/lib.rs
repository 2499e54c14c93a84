//! # pokerfelt CLI Library
//!
//! Terminal front end for the pokerfelt table client. The primary entry point
//! is [`run`], which parses arguments and dispatches to a subcommand.
//!
//! ## Available Subcommands
//!
//! - `play`: connect to a table server and play interactively
//! - `render`: render one table snapshot for a viewer
//! - `replay`: re-drive a recorded session through a fresh client session
//! - `cfg`: display the resolved configuration and its sources
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::io;
//! let args = vec!["pokerfelt", "render", "--input", "snapshot.json", "--viewer", "me"];
//! let code = pokerfelt_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```

use clap::Parser;
use std::io::Write;
pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod recorder;
pub mod ui;

use cli::{Commands, PokerfeltCli};
use commands::{
    handle_cfg_command, handle_play_command, handle_render_command, handle_replay_command,
};

pub use commands::play::{BuyIn, PlayCommand, apply_command, parse_command, play_session};
pub use error::CliError;

const COMMANDS: &[&str] = &["play", "render", "replay", "cfg"];

/// Parses `args` and runs the chosen subcommand.
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors, `130` for interruptions
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match PokerfeltCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return usage_error(e, out, err),
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Play { server, record } => handle_play_command(
            config::FlagOverrides {
                server_url: server,
                record_path: record,
            },
            out,
            err,
        ),
        Commands::Render {
            input,
            viewer,
            json,
        } => handle_render_command(&input, &viewer, json, out),
        Commands::Replay {
            input,
            viewer,
            table,
        } => handle_replay_command(&input, viewer.as_deref(), table.as_deref(), out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            if ui::write_error(err, &e.to_string()).is_err() {
                return exit_code::ERROR;
            }
            e.exit_code()
        }
    }
}

fn usage_error(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version print to stdout and succeed.
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        if write!(out, "{}", e).is_err() {
            return exit_code::ERROR;
        }
        return exit_code::SUCCESS;
    }

    let mut report = || -> std::io::Result<()> {
        writeln!(err, "{}", e)?;
        writeln!(err)?;
        writeln!(err, "pokerfelt table client")?;
        writeln!(err, "Usage: pokerfelt <command> [options]\n")?;
        writeln!(err, "Commands:")?;
        for c in COMMANDS {
            writeln!(err, "  {}", c)?;
        }
        writeln!(err, "\nFor full help, run: pokerfelt --help")
    };
    let _ = report();
    exit_code::ERROR
}
