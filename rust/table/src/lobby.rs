use crate::errors::LobbyError;
use crate::snapshot::GameState;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TABLE_NAME: &str = "My Table";
pub const MAX_TABLE_NAME_CHARS: usize = 30;

/// Open table as advertised in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub table_id: String,
    pub table_name: String,
    #[serde(default)]
    pub game_state: GameState,
    pub small_blind: u32,
    pub big_blind: u32,
    pub min_buy_in: u32,
    pub max_buy_in: u32,
    #[serde(default)]
    pub player_count: u32,
    #[serde(default = "default_max_players")]
    pub max_players: u32,
}

fn default_max_players() -> u32 {
    crate::snapshot::SEAT_COUNT as u32
}

/// One line of the lobby table list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbyRow {
    pub table_id: String,
    pub name: String,
    pub status: &'static str,
    pub blinds: String,
    pub buy_in: String,
    pub players: String,
}

impl From<&TableSummary> for LobbyRow {
    fn from(t: &TableSummary) -> Self {
        Self {
            table_id: t.table_id.clone(),
            name: t.table_name.clone(),
            status: if t.game_state == GameState::Waiting {
                "Open"
            } else {
                "In Play"
            },
            blinds: format!("{}/{}", t.small_blind, t.big_blind),
            buy_in: format!("{}-{}", t.min_buy_in, t.max_buy_in),
            players: format!("{}/{}", t.player_count, t.max_players),
        }
    }
}

pub const NO_TABLES_MESSAGE: &str = "No tables available. Create one to get started!";

pub fn lobby_rows(tables: &[TableSummary]) -> Vec<LobbyRow> {
    tables.iter().map(LobbyRow::from).collect()
}

/// Payload of `createPokerTable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableRequest {
    pub table_name: String,
    pub small_blind: u32,
    pub big_blind: u32,
    pub min_buy_in: u32,
    pub max_buy_in: u32,
    pub is_private: bool,
}

/// Create-table form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableForm {
    pub table_name: String,
    pub small_blind: u32,
    pub big_blind: u32,
    pub min_buy_in: u32,
    pub max_buy_in: u32,
    pub is_private: bool,
}

impl Default for CreateTableForm {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            small_blind: 10,
            big_blind: 20,
            min_buy_in: 400,
            max_buy_in: 2000,
            is_private: false,
        }
    }
}

impl CreateTableForm {
    /// Changes the small blind and re-derives the dependent fields.
    pub fn with_small_blind(mut self, small_blind: u32) -> Self {
        self.small_blind = small_blind;
        self.big_blind = small_blind.saturating_mul(2);
        self.min_buy_in = small_blind.saturating_mul(40);
        self.max_buy_in = small_blind.saturating_mul(200);
        self
    }

    pub fn validate(&self) -> Result<CreateTableRequest, LobbyError> {
        if self.small_blind == 0 {
            return Err(LobbyError::ZeroSmallBlind);
        }
        if Some(self.big_blind) != self.small_blind.checked_mul(2) {
            return Err(LobbyError::BigBlindNotDouble);
        }
        let trimmed = self.table_name.trim();
        let name = if trimmed.is_empty() {
            DEFAULT_TABLE_NAME.to_string()
        } else {
            trimmed.chars().take(MAX_TABLE_NAME_CHARS).collect()
        };
        Ok(CreateTableRequest {
            table_name: name,
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            min_buy_in: self.min_buy_in,
            max_buy_in: self.max_buy_in,
            is_private: self.is_private,
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BuyInPreset {
    Min,
    Mid,
    Max,
}

impl BuyInPreset {
    pub fn amount(self, table: &TableSummary) -> u32 {
        match self {
            BuyInPreset::Min => table.min_buy_in,
            BuyInPreset::Max => table.max_buy_in,
            BuyInPreset::Mid => {
                ((u64::from(table.min_buy_in) + u64::from(table.max_buy_in)) / 2) as u32
            }
        }
    }
}

pub fn validate_buy_in(table: &TableSummary, amount: u32) -> Result<u32, LobbyError> {
    if amount < table.min_buy_in || amount > table.max_buy_in {
        return Err(LobbyError::BuyInOutOfRange {
            min: table.min_buy_in,
            max: table.max_buy_in,
        });
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> TableSummary {
        serde_json::from_value(serde_json::json!({
            "tableId": "poker_3",
            "tableName": "Late Night",
            "gameState": "betting",
            "smallBlind": 25,
            "bigBlind": 50,
            "minBuyIn": 1000,
            "maxBuyIn": 5001,
            "playerCount": 3,
            "maxPlayers": 6
        }))
        .expect("summary")
    }

    #[test]
    fn rows_describe_tables() {
        let row = LobbyRow::from(&summary());
        assert_eq!(row.status, "In Play");
        assert_eq!(row.blinds, "25/50");
        assert_eq!(row.buy_in, "1000-5001");
        assert_eq!(row.players, "3/6");
    }

    #[test]
    fn small_blind_drives_form_defaults() {
        let form = CreateTableForm::default().with_small_blind(5);
        assert_eq!(form.big_blind, 10);
        assert_eq!(form.min_buy_in, 200);
        assert_eq!(form.max_buy_in, 1000);
    }

    #[test]
    fn form_requires_double_big_blind() {
        let form = CreateTableForm {
            big_blind: 30,
            ..CreateTableForm::default()
        };
        assert_eq!(form.validate(), Err(LobbyError::BigBlindNotDouble));
    }

    #[test]
    fn form_normalizes_name() {
        let form = CreateTableForm {
            table_name: "   ".into(),
            ..CreateTableForm::default()
        };
        assert_eq!(form.validate().unwrap().table_name, DEFAULT_TABLE_NAME);

        let form = CreateTableForm {
            table_name: "x".repeat(50),
            ..CreateTableForm::default()
        };
        assert_eq!(
            form.validate().unwrap().table_name.chars().count(),
            MAX_TABLE_NAME_CHARS
        );
    }

    #[test]
    fn buy_in_presets_and_range() {
        let t = summary();
        assert_eq!(BuyInPreset::Min.amount(&t), 1000);
        assert_eq!(BuyInPreset::Mid.amount(&t), 3000);
        assert_eq!(BuyInPreset::Max.amount(&t), 5001);
        assert_eq!(validate_buy_in(&t, 1000), Ok(1000));
        assert_eq!(
            validate_buy_in(&t, 999),
            Err(LobbyError::BuyInOutOfRange {
                min: 1000,
                max: 5001
            })
        );
    }
}
