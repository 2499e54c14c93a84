/// Error types for the session and connection layer
///
/// Every failure path ends in either a user-visible notice or a log entry;
/// [`ClientError::severity`] decides which log level it gets.
use crate::settings::SettingsError;
use pokerfelt_table::errors::{LobbyError, ProtocolError, RulesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Socket is closed")]
    Closed,
    #[error("A tokio runtime is required to open a socket")]
    NoRuntime,
    #[error("Failed to encode frame: {0}")]
    Encode(#[from] ProtocolError),
}

/// A session operation was refused before anything reached the server.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not seated at a table")]
    NotAtTable,
    #[error("Session has been destroyed")]
    Destroyed,
    #[error("Table {0} is not in the lobby list")]
    UnknownTable(String),
    #[error("Chat message is empty")]
    EmptyChat,
    #[error("No bet in progress")]
    NoBetSlip,
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Lobby(#[from] LobbyError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Error classification for logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// User input that was refused; expected during normal play
    Client,
    /// Network or server trouble; the client keeps running
    Server,
    /// The session can no longer talk to the server
    Critical,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl ClientError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClientError::Session(SessionError::Transport(e)) | ClientError::Transport(e) => {
                transport_severity(e)
            }
            ClientError::Session(SessionError::Destroyed) => ErrorSeverity::Critical,
            ClientError::Session(_) => ErrorSeverity::Client,
            ClientError::Settings(_) => ErrorSeverity::Critical,
        }
    }

    /// Logs the error at the level its severity calls for.
    pub fn log(&self) {
        match self.severity() {
            ErrorSeverity::Client => tracing::info!(error = %self, "request refused"),
            ErrorSeverity::Server => tracing::warn!(error = %self, "server or network error"),
            ErrorSeverity::Critical => tracing::error!(error = %self, "client cannot continue"),
        }
    }
}

fn transport_severity(err: &TransportError) -> ErrorSeverity {
    match err {
        TransportError::Closed | TransportError::NoRuntime | TransportError::Settings(_) => {
            ErrorSeverity::Critical
        }
        TransportError::Encode(_) => ErrorSeverity::Server,
    }
}
