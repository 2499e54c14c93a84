//! # pokerfelt_client: Session and Connection Layer
//!
//! Connects a [`session::PokerSession`] to the table server and keeps its view
//! in step with the snapshots the server pushes.
//!
//! - [`transport`] - the [`transport::Transport`] seam, shared websocket
//!   handles with reconnect, and an in-memory recording transport
//! - [`session`] - lobby and table lifecycle, actions, bet slip, chat
//! - [`events`] - observer registry keyed by UI slice
//! - [`context`] - process-wide settings, bus, and sockets
//! - [`settings`], [`errors`], [`logging`] - configuration, error
//!   classification, and tracing setup
//!
//! ```rust
//! use pokerfelt_client::events::ViewBus;
//! use pokerfelt_client::session::PokerSession;
//! use pokerfelt_client::transport::RecordingTransport;
//! use pokerfelt_table::lobby::CreateTableForm;
//! use pokerfelt_table::protocol::{ClientEvent, JoinTableRequest, ServerEvent, TableRef};
//!
//! let transport = RecordingTransport::new();
//! let mut session = PokerSession::with_bus(transport.clone(), ViewBus::new(), None);
//!
//! session.create_table(&CreateTableForm::default()).unwrap();
//! session.handle(ServerEvent::PokerTableCreated(TableRef { table_id: "T1".into() }));
//!
//! assert_eq!(
//!     transport.sent().last(),
//!     Some(&ClientEvent::JoinPokerTable(JoinTableRequest {
//!         table_id: "T1".into(),
//!         buy_in: 400,
//!         seat: None,
//!     }))
//! );
//! ```

pub mod context;
pub mod errors;
pub mod events;
pub mod logging;
pub mod session;
pub mod settings;
pub mod transport;
