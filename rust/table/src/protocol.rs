//! Wire frames exchanged with the table server.
//!
//! Every frame is one JSON text message of the form
//! `{"event": "<name>", "data": <payload>}`. Payload-less events omit `data`.

use crate::chat::ChatMessage;
use crate::errors::ProtocolError;
use crate::lobby::{CreateTableRequest, TableSummary};
use crate::rules::ActionKind;
use crate::snapshot::TableSnapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    pub table_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTableRequest {
    pub table_id: String,
    pub buy_in: u32,
    /// `None` lets the server pick the first free seat.
    pub seat: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub table_id: String,
    pub action: ActionKind,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub table_id: String,
    pub message: String,
}

/// Events this client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinPokerLobby,
    CreatePokerTable(CreateTableRequest),
    JoinPokerTable(JoinTableRequest),
    LeavePokerTable(TableRef),
    StartPokerHand(TableRef),
    PokerAction(ActionRequest),
    PokerChat(ChatRequest),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinPokerLobby => "joinPokerLobby",
            ClientEvent::CreatePokerTable(_) => "createPokerTable",
            ClientEvent::JoinPokerTable(_) => "joinPokerTable",
            ClientEvent::LeavePokerTable(_) => "leavePokerTable",
            ClientEvent::StartPokerHand(_) => "startPokerHand",
            ClientEvent::PokerAction(_) => "pokerAction",
            ClientEvent::PokerChat(_) => "pokerChat",
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Events this client receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Transport identity assigned by the server, sent on every (re)connect.
    Connect { socket_id: String },
    PokerTablesUpdate(Vec<TableSummary>),
    PokerTableCreated(TableRef),
    PokerTableState(Arc<TableSnapshot>),
    PokerChatMessage(ChatMessage),
    Error(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectPayload {
    socket_id: String,
}

#[derive(Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connect { .. } => "connect",
            ServerEvent::PokerTablesUpdate(_) => "pokerTablesUpdate",
            ServerEvent::PokerTableCreated(_) => "pokerTableCreated",
            ServerEvent::PokerTableState(_) => "pokerTableState",
            ServerEvent::PokerChatMessage(_) => "pokerChatMessage",
            ServerEvent::Error(_) => "error",
        }
    }

    /// Decodes one text frame.
    ///
    /// ```
    /// use pokerfelt_table::protocol::{ServerEvent, TableRef};
    ///
    /// let ev = ServerEvent::decode(r#"{"event":"pokerTableCreated","data":{"tableId":"T1"}}"#).unwrap();
    /// assert_eq!(ev, ServerEvent::PokerTableCreated(TableRef { table_id: "T1".into() }));
    /// ```
    pub fn decode(text: &str) -> Result<ServerEvent, ProtocolError> {
        let frame: Frame = serde_json::from_str(text)?;
        let data = frame.data;
        let event = match frame.event.as_str() {
            "connect" => {
                let payload: ConnectPayload = serde_json::from_value(data)?;
                ServerEvent::Connect {
                    socket_id: payload.socket_id,
                }
            }
            "pokerTablesUpdate" => {
                let tables: Option<Vec<TableSummary>> = serde_json::from_value(data)?;
                ServerEvent::PokerTablesUpdate(tables.unwrap_or_default())
            }
            "pokerTableCreated" => ServerEvent::PokerTableCreated(serde_json::from_value(data)?),
            "pokerTableState" => {
                ServerEvent::PokerTableState(Arc::new(TableSnapshot::from_value(data)?))
            }
            "pokerChatMessage" => ServerEvent::PokerChatMessage(serde_json::from_value(data)?),
            "error" => ServerEvent::Error(match data {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            }),
            other => return Err(ProtocolError::UnknownEvent(other.to_string())),
        };
        Ok(event)
    }
}
