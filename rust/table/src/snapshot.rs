//! Server-pushed table snapshots.
//!
//! A snapshot is the complete, server-authoritative description of one table.
//! It is decoded once at the ingestion boundary: every optional wire field gets
//! its default here, `seats` is normalized to [`SEAT_COUNT`] entries, and the
//! renderer and affordance calculator only ever see the normalized types.
//!
//! ```
//! use pokerfelt_table::snapshot::{GameState, TableSnapshot};
//!
//! let snapshot = TableSnapshot::from_json(
//!     r#"{"tableId":"poker_1","tableName":"Friday","smallBlind":10,"bigBlind":20,
//!         "gameState":"waiting","seats":[null,{"username":"ann","chips":400}],"players":[]}"#,
//! )
//! .unwrap();
//! assert_eq!(snapshot.game_state, GameState::Waiting);
//! assert_eq!(snapshot.seats.len(), 6);
//! assert!(snapshot.current_hand.is_none());
//! ```

use crate::errors::SnapshotError;
use serde::{Deserialize, Deserializer, Serialize};

/// Number of physical seats at every table.
pub const SEAT_COUNT: usize = 6;

/// Phase of the table as a whole.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    #[default]
    Waiting,
    Dealing,
    Betting,
    Showdown,
    /// A state name this client does not know; drawn like a non-showdown state.
    #[serde(other)]
    Unknown,
}

impl GameState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Waiting => "waiting",
            GameState::Dealing => "dealing",
            GameState::Betting => "betting",
            GameState::Showdown => "showdown",
            GameState::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeatOccupant {
    pub username: String,
    pub chips: u32,
    pub bet_amount: u32,
    pub is_active: bool,
}

impl Default for SeatOccupant {
    fn default() -> Self {
        Self {
            username: String::new(),
            chips: 0,
            bet_amount: 0,
            is_active: true,
        }
    }
}

/// Table member as listed in `players` (not necessarily dealt into the hand).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerRef {
    pub socket_id: String,
    pub username: String,
    pub seat: usize,
    pub chips: u32,
    pub is_active: bool,
}

impl Default for PlayerRef {
    fn default() -> Self {
        Self {
            socket_id: String::new(),
            username: String::new(),
            seat: 0,
            chips: 0,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandResult {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Winner {
    pub username: String,
    pub amount: u32,
    pub hand_name: String,
    pub seat: Option<usize>,
}

/// A player dealt into the current hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandPlayer {
    pub seat: usize,
    pub socket_id: String,
    pub username: String,
    pub chips: u32,
    pub bet_amount: u32,
    pub total_bet_this_round: u32,
    /// Card codes; opponents' cards arrive as `??` until showdown.
    pub cards: Vec<String>,
    pub is_folded: bool,
    pub is_all_in: bool,
    pub hand_result: Option<HandResult>,
}

/// Betting state of the hand in progress.
///
/// All positions are indices into [`HandState::players`], not seat numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandState {
    pub pot: u32,
    pub community_cards: Vec<String>,
    #[serde(deserialize_with = "lenient_index")]
    pub dealer_position: Option<usize>,
    #[serde(deserialize_with = "lenient_index")]
    pub small_blind_position: Option<usize>,
    #[serde(deserialize_with = "lenient_index")]
    pub big_blind_position: Option<usize>,
    #[serde(deserialize_with = "lenient_index")]
    pub current_player_index: Option<usize>,
    pub current_bet: u32,
    pub phase: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub winners: Vec<Winner>,
    pub players: Vec<HandPlayer>,
}

impl HandState {
    /// Seat number of the hand player at `position`, if that player exists.
    pub fn seat_at(&self, position: Option<usize>) -> Option<usize> {
        position
            .and_then(|idx| self.players.get(idx))
            .map(|p| p.seat)
    }

    pub fn dealer_seat(&self) -> Option<usize> {
        self.seat_at(self.dealer_position)
    }

    pub fn small_blind_seat(&self) -> Option<usize> {
        self.seat_at(self.small_blind_position)
    }

    pub fn big_blind_seat(&self) -> Option<usize> {
        self.seat_at(self.big_blind_position)
    }

    pub fn current_player(&self) -> Option<&HandPlayer> {
        self.current_player_index
            .and_then(|idx| self.players.get(idx))
    }

    pub fn turn_seat(&self) -> Option<usize> {
        self.current_player().map(|p| p.seat)
    }

    pub fn player_by_socket(&self, socket_id: &str) -> Option<&HandPlayer> {
        self.players.iter().find(|p| p.socket_id == socket_id)
    }

    pub fn players_in_seat(&self, seat: usize) -> impl Iterator<Item = &HandPlayer> {
        self.players.iter().filter(move |p| p.seat == seat)
    }

    /// Whether the viewer identified by `socket_id` is the player to act.
    pub fn is_turn_of(&self, socket_id: &str) -> bool {
        self.current_player()
            .is_some_and(|p| p.socket_id == socket_id)
    }
}

/// Normalized table snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    pub table_id: String,
    pub table_name: String,
    pub small_blind: u32,
    pub big_blind: u32,
    pub game_state: GameState,
    /// Always exactly [`SEAT_COUNT`] entries; the index is the seat number.
    pub seats: Vec<Option<SeatOccupant>>,
    pub players: Vec<PlayerRef>,
    pub current_hand: Option<HandState>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireSnapshot {
    table_id: Option<String>,
    table_name: Option<String>,
    small_blind: u32,
    big_blind: u32,
    game_state: GameState,
    seats: Vec<Option<SeatOccupant>>,
    players: Vec<PlayerRef>,
    current_hand: Option<HandState>,
}

impl TableSnapshot {
    pub fn from_json(payload: &str) -> Result<Self, SnapshotError> {
        let wire: WireSnapshot = serde_json::from_str(payload)?;
        Self::ingest(wire)
    }

    pub fn from_value(payload: serde_json::Value) -> Result<Self, SnapshotError> {
        let wire: WireSnapshot = serde_json::from_value(payload)?;
        Self::ingest(wire)
    }

    fn ingest(wire: WireSnapshot) -> Result<Self, SnapshotError> {
        let table_id = wire
            .table_id
            .filter(|id| !id.is_empty())
            .ok_or(SnapshotError::MissingTableId)?;

        let mut seats = wire.seats;
        if seats.len() > SEAT_COUNT {
            tracing::warn!(
                table_id = %table_id,
                seats = seats.len(),
                "snapshot carries more seats than the table has; extra seats dropped"
            );
        }
        seats.resize(SEAT_COUNT, None);

        Ok(Self {
            table_name: wire.table_name.unwrap_or_else(|| "Poker Table".to_string()),
            table_id,
            small_blind: wire.small_blind,
            big_blind: wire.big_blind,
            game_state: wire.game_state,
            seats,
            players: wire.players,
            current_hand: wire.current_hand,
        })
    }

    /// Players currently counted as active at the table.
    pub fn active_players(&self) -> impl Iterator<Item = &PlayerRef> {
        self.players.iter().filter(|p| p.is_active)
    }

    /// Seat of the viewer, looked up in the member list first, then in the hand.
    pub fn seat_of(&self, socket_id: &str) -> Option<usize> {
        self.players
            .iter()
            .find(|p| p.socket_id == socket_id)
            .map(|p| p.seat)
            .or_else(|| {
                self.current_hand
                    .as_ref()
                    .and_then(|h| h.player_by_socket(socket_id))
                    .map(|p| p.seat)
            })
    }

    pub fn is_showdown(&self) -> bool {
        self.game_state == GameState::Showdown
    }
}

/// Accepts any integer or null; negative indices mean "nobody".
fn lenient_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| usize::try_from(v).ok()))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> serde_json::Value {
        json!({
            "tableId": "poker_1",
            "tableName": "High Rollers",
            "smallBlind": 10,
            "bigBlind": 20,
            "gameState": "betting",
            "seats": [
                {"username": "ann", "chips": 380, "betAmount": 20, "isActive": true},
                {"username": "bob", "chips": 390, "betAmount": 10, "isActive": true},
                null, null, null, null
            ],
            "players": [
                {"socketId": "s-ann", "username": "ann", "seat": 0, "chips": 380, "isActive": true},
                {"socketId": "s-bob", "username": "bob", "seat": 1, "chips": 390, "isActive": true}
            ],
            "currentHand": {
                "pot": 30,
                "communityCards": [],
                "currentBet": 20,
                "dealerPosition": 1,
                "smallBlindPosition": 1,
                "bigBlindPosition": 0,
                "currentPlayerIndex": 1,
                "phase": "preflop",
                "pots": [],
                "winners": null,
                "players": [
                    {"socketId": "s-ann", "username": "ann", "seat": 0, "chips": 380,
                     "isFolded": false, "isAllIn": false, "betAmount": 20,
                     "totalBetThisRound": 20, "cards": ["Ah", "Kd"], "handResult": null},
                    {"socketId": "s-bob", "username": "bob", "seat": 1, "chips": 390,
                     "isFolded": false, "isAllIn": false, "betAmount": 10,
                     "totalBetThisRound": 10, "cards": ["??", "??"], "handResult": null}
                ]
            }
        })
    }

    #[test]
    fn ingests_full_payload() {
        let snap = TableSnapshot::from_value(base()).expect("ingest");
        assert_eq!(snap.table_id, "poker_1");
        assert_eq!(snap.game_state, GameState::Betting);
        let hand = snap.current_hand.as_ref().expect("hand");
        assert_eq!(hand.dealer_seat(), Some(1));
        assert_eq!(hand.big_blind_seat(), Some(0));
        assert_eq!(hand.turn_seat(), Some(1));
        assert!(hand.is_turn_of("s-bob"));
        assert!(hand.winners.is_empty());
        assert_eq!(snap.seat_of("s-ann"), Some(0));
    }

    #[test]
    fn pads_short_seat_list_and_truncates_long_one() {
        let mut payload = base();
        payload["seats"] = json!([null]);
        let snap = TableSnapshot::from_value(payload).expect("ingest");
        assert_eq!(snap.seats.len(), SEAT_COUNT);

        let mut payload = base();
        payload["seats"] = json!([null, null, null, null, null, null, null, null]);
        let snap = TableSnapshot::from_value(payload).expect("ingest");
        assert_eq!(snap.seats.len(), SEAT_COUNT);
    }

    #[test]
    fn out_of_range_positions_resolve_to_nobody() {
        let mut payload = base();
        payload["currentHand"]["dealerPosition"] = json!(9);
        payload["currentHand"]["currentPlayerIndex"] = json!(-1);
        let snap = TableSnapshot::from_value(payload).expect("ingest");
        let hand = snap.current_hand.expect("hand");
        assert_eq!(hand.dealer_seat(), None);
        assert_eq!(hand.turn_seat(), None);
        assert!(!hand.is_turn_of("s-ann"));
    }

    #[test]
    fn unknown_game_state_is_tolerated() {
        let mut payload = base();
        payload["gameState"] = json!("paused");
        let snap = TableSnapshot::from_value(payload).expect("ingest");
        assert_eq!(snap.game_state, GameState::Unknown);
    }

    #[test]
    fn missing_table_id_is_rejected() {
        let mut payload = base();
        payload["tableId"] = json!(null);
        assert!(matches!(
            TableSnapshot::from_value(payload),
            Err(SnapshotError::MissingTableId)
        ));
    }

    #[test]
    fn null_hand_means_no_hand() {
        let mut payload = base();
        payload["currentHand"] = json!(null);
        let snap = TableSnapshot::from_value(payload).expect("ingest");
        assert!(snap.current_hand.is_none());
        assert_eq!(snap.active_players().count(), 2);
    }
}
