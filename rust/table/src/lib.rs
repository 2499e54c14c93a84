//! # pokerfelt-table: Table Model and Rendering
//!
//! Pure, I/O-free core of the pokerfelt client. The table server owns all game
//! state and pushes a full snapshot after every change; this crate decodes those
//! snapshots, derives what the local player may do, and produces the complete
//! visible state of the table as a plain value.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card codes, suits, ranks, and how a card slot is drawn
//! - [`snapshot`] - Server snapshot decoding and normalization
//! - [`rules`] - Action affordances, bet presets, and the bet slip
//! - [`view`] - Snapshot renderer producing a [`view::TableView`]
//! - [`lobby`] - Lobby rows, create-table form, and buy-in presets
//! - [`chat`] - Chat messages and history
//! - [`protocol`] - Wire frames in both directions
//! - [`errors`] - Error types for every stage above
//!
//! ## Quick Start
//!
//! ```rust
//! use pokerfelt_table::snapshot::TableSnapshot;
//! use pokerfelt_table::view::{render_table, SeatView, StatusView};
//!
//! let snapshot = TableSnapshot::from_json(
//!     r#"{"tableId":"poker_1","tableName":"Friday","smallBlind":10,"bigBlind":20,
//!         "gameState":"waiting",
//!         "seats":[{"username":"ann","chips":400},null,null,null,null,null],
//!         "players":[{"socketId":"s1","username":"ann","seat":0,"chips":400,"isActive":true}]}"#,
//! )
//! .unwrap();
//!
//! let view = render_table(&snapshot, "s1").unwrap();
//! assert_eq!(view.header.blinds, "10/20");
//! assert!(matches!(view.seats[0], SeatView::Occupied { is_me: true, .. }));
//! assert!(matches!(view.seats[1], SeatView::Empty { .. }));
//! assert!(matches!(view.status, StatusView::Waiting { can_start: false, .. }));
//! ```
//!
//! ## Acting on Your Turn
//!
//! ```rust
//! use pokerfelt_table::rules::{compute_affordances, ActionKind, BetPreset, BetSlip};
//! use pokerfelt_table::snapshot::{HandPlayer, HandState};
//!
//! let me = HandPlayer { socket_id: "me".into(), chips: 500, ..Default::default() };
//! let hand = HandState { pot: 30, current_player_index: Some(0), players: vec![me.clone()], ..Default::default() };
//!
//! let panel = compute_affordances(&hand, &me);
//! let affordances = panel.affordances().unwrap();
//! let mut slip = BetSlip::open(affordances, ActionKind::Bet).unwrap();
//! slip.apply_preset(affordances, BetPreset::Pot);
//! assert_eq!(slip.submit().unwrap().amount, 30);
//! ```

pub mod cards;
pub mod chat;
pub mod errors;
pub mod lobby;
pub mod protocol;
pub mod rules;
pub mod snapshot;
pub mod view;
