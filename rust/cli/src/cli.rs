//! Command-line surface of the `pokerfelt` binary.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pokerfelt")]
#[command(about = "Terminal client for pokerfelt tables")]
#[command(version)]
pub struct PokerfeltCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to a table server and play from the terminal
    Play {
        /// Websocket endpoint, e.g. ws://127.0.0.1:3000/ws
        #[arg(long)]
        server: Option<String>,
        /// Append every inbound frame to this JSONL file (.zst compresses)
        #[arg(long)]
        record: Option<String>,
    },
    /// Render one table snapshot as seen by a viewer
    Render {
        /// Snapshot JSON, or a recorded `pokerTableState` frame
        #[arg(long)]
        input: String,
        /// Socket id of the viewer; empty renders as a spectator
        #[arg(long, default_value = "")]
        viewer: String,
        /// Print the view model as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Re-drive a recorded session and print every table it rendered
    Replay {
        #[arg(long)]
        input: String,
        /// Render as this socket id instead of the recorded one
        #[arg(long)]
        viewer: Option<String>,
        /// Table to follow; defaults to the first table seen
        #[arg(long)]
        table: Option<String>,
    },
    /// Display resolved configuration and where each value came from
    Cfg,
}
