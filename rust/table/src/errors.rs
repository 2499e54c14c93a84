use thiserror::Error;

/// A pushed table snapshot could not be ingested.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Snapshot is missing its table id")]
    MissingTableId,
}

/// A snapshot decoded but describes a state the renderer cannot draw.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("Seat {seat} is claimed by {claimants} hand players")]
    DuplicateSeatClaim { seat: usize, claimants: usize },
    #[error("Seat {seat} holds {count} hole cards (at most 2)")]
    TooManyHoleCards { seat: usize, count: usize },
    #[error("Board holds {count} community cards (at most 5)")]
    TooManyCommunityCards { count: usize },
}

/// An action the local player tried to take was refused before sending.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("Action {0} is not available right now")]
    NotOffered(&'static str),
    #[error("Bet amount must be greater than zero")]
    NonPositiveAmount,
    #[error("No hand in progress")]
    NoHandInProgress,
    #[error("It's not your turn")]
    NotYourTurn,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LobbyError {
    #[error("Big blind must be 2x the small blind")]
    BigBlindNotDouble,
    #[error("Small blind must be greater than zero")]
    ZeroSmallBlind,
    #[error("Buy-in must be between {min} and {max}")]
    BuyInOutOfRange { min: u32, max: u32 },
}

/// A wire frame could not be encoded or decoded.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] serde_json::Error),
    #[error("Unknown event `{0}`")]
    UnknownEvent(String),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
