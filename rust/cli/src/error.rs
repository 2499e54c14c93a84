//! Error type for the CLI application.
//!
//! Library errors from the table and client crates are folded into
//! [`CliError`] so command handlers can propagate them with `?`. Every variant
//! maps to exit code `2` except [`CliError::Interrupted`], which maps to `130`.

use crate::exit_code;
use pokerfelt_client::errors::{ClientError, SessionError, TransportError};
use pokerfelt_table::errors::{ProtocolError, RenderError, SnapshotError};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    /// I/O error (file operations, stdout/stderr writes, etc.)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// Session, transport, or rendering failure reported by the client crates
    Client(String),

    /// Operation was interrupted (e.g., by user with Ctrl+C)
    Interrupted(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Interrupted(_) => exit_code::INTERRUPTED,
            _ => exit_code::ERROR,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Client(msg) => write!(f, "Client error: {}", msg),
            CliError::Interrupted(msg) => write!(f, "Interrupted: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<ClientError> for CliError {
    fn from(error: ClientError) -> Self {
        error.log();
        match error {
            ClientError::Settings(e) => CliError::Config(e.to_string()),
            other => CliError::Client(other.to_string()),
        }
    }
}

impl From<SessionError> for CliError {
    fn from(error: SessionError) -> Self {
        CliError::Client(error.to_string())
    }
}

impl From<TransportError> for CliError {
    fn from(error: TransportError) -> Self {
        CliError::Client(error.to_string())
    }
}

impl From<SnapshotError> for CliError {
    fn from(error: SnapshotError) -> Self {
        CliError::InvalidInput(error.to_string())
    }
}

impl From<ProtocolError> for CliError {
    fn from(error: ProtocolError) -> Self {
        CliError::InvalidInput(error.to_string())
    }
}

impl From<RenderError> for CliError {
    fn from(error: RenderError) -> Self {
        CliError::Client(error.to_string())
    }
}
