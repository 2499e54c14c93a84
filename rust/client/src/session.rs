//! The poker session: one table client bound to one transport.
//!
//! Inbound events go through a single dispatch point, [`PokerSession::handle`].
//! A session is attached to its transport exactly once, so an event is never
//! handled twice no matter how often the UI re-initializes.
//!
//! The session never owns game state. It keeps the latest snapshot for the
//! table it joined, replaces it wholesale on every push, and re-renders from
//! scratch.

use crate::context::AppContext;
use crate::errors::SessionError;
use crate::events::{Notice, Screen, ViewBus, ViewEvent};
use crate::transport::Transport;
use pokerfelt_table::chat::{ChatLog, ChatMessage, prepare_outbound};
use pokerfelt_table::errors::RulesError;
use pokerfelt_table::lobby::{CreateTableForm, LobbyRow, TableSummary, lobby_rows, validate_buy_in};
use pokerfelt_table::protocol::{
    ActionRequest, ChatRequest, ClientEvent, JoinTableRequest, ServerEvent, TableRef,
};
use pokerfelt_table::rules::{
    ActionKind, Affordances, BetPreset, BetSlip, PlayerAction, validate_action,
};
use pokerfelt_table::snapshot::TableSnapshot;
use pokerfelt_table::view::{TableView, render_table};
use std::sync::Arc;
use uuid::Uuid;

pub struct PokerSession<T: Transport> {
    id: Uuid,
    transport: T,
    bus: ViewBus,
    socket_id: Option<String>,
    /// Identity the lobby was last joined under.
    lobby_joined_as: Option<String>,
    screen: Screen,
    lobby: Vec<TableSummary>,
    current_table: Option<String>,
    snapshot: Option<Arc<TableSnapshot>>,
    view: Option<Arc<TableView>>,
    /// Buy-in to join with once the server confirms a table we created.
    pending_buy_in: Option<u32>,
    bet_slip: Option<BetSlip>,
    chat: ChatLog,
    destroyed: bool,
}

impl<T: Transport> PokerSession<T> {
    pub fn new(transport: T, ctx: &AppContext) -> Self {
        Self::with_bus(
            transport,
            ctx.bus().clone(),
            ctx.settings().chat_history_limit,
        )
    }

    /// Builds a session on `transport`. A transport whose link is already up
    /// and identified is adopted as is: its `connect` has gone by, so the
    /// lobby is joined here.
    pub fn with_bus(transport: T, bus: ViewBus, chat_history_limit: Option<usize>) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, "poker session created");
        let mut session = Self {
            id,
            transport,
            bus,
            socket_id: None,
            lobby_joined_as: None,
            screen: Screen::Lobby,
            lobby: Vec::new(),
            current_table: None,
            snapshot: None,
            view: None,
            pending_buy_in: None,
            bet_slip: None,
            chat: ChatLog::new(chat_history_limit),
            destroyed: false,
        };
        if let Some(socket_id) = session.transport.identity() {
            tracing::info!(session = %id, socket_id = %socket_id, "adopting live connection");
            session.announce(socket_id);
        }
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn socket_id(&self) -> Option<&str> {
        self.socket_id.as_deref()
    }

    /// Records the transport identity when it is known before the first
    /// `connect` event reaches the session.
    pub fn set_socket_id(&mut self, socket_id: impl Into<String>) {
        self.socket_id = Some(socket_id.into());
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn lobby(&self) -> &[TableSummary] {
        &self.lobby
    }

    pub fn lobby_rows(&self) -> Vec<LobbyRow> {
        lobby_rows(&self.lobby)
    }

    pub fn current_table(&self) -> Option<&str> {
        self.current_table.as_deref()
    }

    pub fn snapshot(&self) -> Option<&Arc<TableSnapshot>> {
        self.snapshot.as_ref()
    }

    /// Last successfully rendered view of the joined table.
    pub fn view(&self) -> Option<&Arc<TableView>> {
        self.view.as_ref()
    }

    pub fn my_seat(&self) -> Option<usize> {
        self.view.as_ref().and_then(|v| v.my_seat)
    }

    pub fn pending_buy_in(&self) -> Option<u32> {
        self.pending_buy_in
    }

    pub fn bet_slip(&self) -> Option<&BetSlip> {
        self.bet_slip.as_ref()
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Dispatches one inbound event.
    pub fn handle(&mut self, event: ServerEvent) {
        let _span = tracing::debug_span!("session", id = %self.id).entered();
        if self.destroyed {
            tracing::debug!(event = event.name(), "session destroyed; event ignored");
            return;
        }
        match event {
            ServerEvent::Connect { socket_id } => self.on_connect(socket_id),
            ServerEvent::PokerTablesUpdate(tables) => self.on_tables_update(tables),
            ServerEvent::PokerTableCreated(TableRef { table_id }) => {
                self.on_table_created(table_id)
            }
            ServerEvent::PokerTableState(snapshot) => self.on_table_state(snapshot),
            ServerEvent::PokerChatMessage(message) => self.on_chat_message(message),
            ServerEvent::Error(message) => {
                tracing::info!(message = %message, "server reported an error");
                self.bus.publish(ViewEvent::Notice(Notice::Alert(message)));
            }
        }
    }

    fn on_connect(&mut self, socket_id: String) {
        if self.lobby_joined_as.as_deref() == Some(socket_id.as_str()) {
            tracing::debug!(socket_id = %socket_id, "connect already seen; lobby joined");
            return;
        }
        tracing::info!(socket_id = %socket_id, "connected");
        if let Some(table_id) = &self.current_table {
            // Only lobby membership is re-announced after a reconnect.
            tracing::info!(table_id = %table_id, "reconnected; table membership not re-requested");
        }
        self.announce(socket_id);
    }

    fn announce(&mut self, socket_id: String) {
        self.socket_id = Some(socket_id.clone());
        self.lobby_joined_as = Some(socket_id);
        self.log_failure(ClientEvent::JoinPokerLobby);
    }

    fn on_tables_update(&mut self, tables: Vec<TableSummary>) {
        tracing::debug!(tables = tables.len(), "lobby updated");
        self.lobby = tables;
        self.bus.publish(ViewEvent::LobbyUpdated(self.lobby_rows()));
    }

    fn on_table_created(&mut self, table_id: String) {
        match self.pending_buy_in.take() {
            Some(buy_in) => {
                tracing::info!(table_id = %table_id, buy_in, "table created; joining");
                if let Err(e) = self.join_table(&table_id, buy_in, None) {
                    tracing::warn!(table_id = %table_id, error = %e, "auto-join failed");
                }
            }
            None => tracing::debug!(table_id = %table_id, "table created without a pending join"),
        }
    }

    fn on_table_state(&mut self, snapshot: Arc<TableSnapshot>) {
        if self.current_table.as_deref() != Some(snapshot.table_id.as_str()) {
            tracing::debug!(table_id = %snapshot.table_id, "snapshot for another table ignored");
            return;
        }
        self.snapshot = Some(snapshot.clone());

        if self.screen != Screen::Table {
            self.screen = Screen::Table;
            self.bus.publish(ViewEvent::ScreenChanged(Screen::Table));
        }

        let viewer = self.socket_id.as_deref().unwrap_or_default();
        match render_table(&snapshot, viewer) {
            Ok(view) => {
                self.refresh_bet_slip(view.actions.affordances());
                let view = Arc::new(view);
                self.view = Some(view.clone());
                self.bus.publish(ViewEvent::TableRendered(view));
            }
            Err(e) => {
                tracing::error!(
                    table_id = %snapshot.table_id,
                    error = %e,
                    "failed to render table; keeping last view"
                );
            }
        }
    }

    /// Keeps an open bet slip in step with the newest affordances.
    fn refresh_bet_slip(&mut self, affordances: Option<&Affordances>) {
        let Some(slip) = self.bet_slip.as_mut() else {
            return;
        };
        match affordances {
            Some(a) if slip.refresh(a) => {
                tracing::debug!(amount = slip.amount(), max = slip.bounds().max, "bet slip refreshed");
            }
            Some(_) => {
                tracing::debug!(kind = slip.kind().as_str(), "action withdrawn; bet slip closed");
                self.bet_slip = None;
            }
            None => {
                tracing::debug!("turn passed; bet slip closed");
                self.bet_slip = None;
            }
        }
    }

    fn on_chat_message(&mut self, message: ChatMessage) {
        self.chat.push(message.clone());
        self.bus.publish(ViewEvent::ChatAppended(message));
    }

    pub fn join_lobby(&mut self) -> Result<(), SessionError> {
        self.emit(ClientEvent::JoinPokerLobby)
    }

    /// Sends a create request and remembers the form's minimum buy-in, which
    /// is used to join once the server confirms the new table.
    pub fn create_table(&mut self, form: &CreateTableForm) -> Result<(), SessionError> {
        let request = form.validate()?;
        let buy_in = request.min_buy_in;
        self.emit(ClientEvent::CreatePokerTable(request))?;
        self.pending_buy_in = Some(buy_in);
        Ok(())
    }

    /// Joins `table_id`; `seat: None` lets the server choose.
    pub fn join_table(
        &mut self,
        table_id: &str,
        buy_in: u32,
        seat: Option<usize>,
    ) -> Result<(), SessionError> {
        self.emit(ClientEvent::JoinPokerTable(JoinTableRequest {
            table_id: table_id.to_string(),
            buy_in,
            seat,
        }))?;
        self.follow_table(table_id);
        Ok(())
    }

    /// Joins a table from the lobby list after checking the buy-in range.
    pub fn confirm_join(&mut self, table_id: &str, buy_in: u32) -> Result<(), SessionError> {
        let summary = self
            .lobby
            .iter()
            .find(|t| t.table_id == table_id)
            .ok_or_else(|| SessionError::UnknownTable(table_id.to_string()))?;
        let buy_in = validate_buy_in(summary, buy_in)?;
        self.join_table(table_id, buy_in, None)
    }

    /// Treats `table_id` as the joined table without telling the server.
    /// Used when re-driving recorded frames.
    pub fn follow_table(&mut self, table_id: &str) {
        tracing::debug!(table_id = %table_id, "following table");
        self.current_table = Some(table_id.to_string());
        self.snapshot = None;
        self.view = None;
        self.bet_slip = None;
    }

    pub fn leave_table(&mut self) -> Result<(), SessionError> {
        let table_id = self.current_table.clone().ok_or(SessionError::NotAtTable)?;
        self.emit(ClientEvent::LeavePokerTable(TableRef { table_id }))?;
        self.clear_table();
        self.screen = Screen::Lobby;
        self.bus.publish(ViewEvent::ScreenChanged(Screen::Lobby));
        self.emit(ClientEvent::JoinPokerLobby)
    }

    pub fn start_hand(&mut self) -> Result<(), SessionError> {
        let table_id = self.table_id()?;
        self.emit(ClientEvent::StartPokerHand(TableRef { table_id }))
    }

    /// Actions currently offered to the local player.
    pub fn affordances(&self) -> Result<&Affordances, RulesError> {
        let view = self.view.as_ref().ok_or(RulesError::NoHandInProgress)?;
        if let Some(a) = view.actions.affordances() {
            return Ok(a);
        }
        let in_hand = self
            .snapshot
            .as_ref()
            .is_some_and(|s| s.current_hand.is_some());
        Err(if in_hand {
            RulesError::NotYourTurn
        } else {
            RulesError::NoHandInProgress
        })
    }

    /// Sends an action after checking it against the offered buttons.
    pub fn act(&mut self, action: PlayerAction) -> Result<(), SessionError> {
        let table_id = self.table_id()?;
        let action = validate_action(self.affordances()?, action)?;
        tracing::debug!(table_id = %table_id, action = action.action.as_str(), amount = action.amount, "acting");
        self.emit(ClientEvent::PokerAction(ActionRequest {
            table_id,
            action: action.action,
            amount: action.amount,
        }))?;
        self.bet_slip = None;
        Ok(())
    }

    /// Opens the amount input for Bet or Raise.
    pub fn open_bet_slip(&mut self, kind: ActionKind) -> Result<&BetSlip, SessionError> {
        self.table_id()?;
        let slip = BetSlip::open(self.affordances()?, kind)?;
        Ok(self.bet_slip.insert(slip))
    }

    pub fn set_bet_amount(&mut self, amount: u32) -> Result<u32, SessionError> {
        let slip = self.bet_slip.as_mut().ok_or(SessionError::NoBetSlip)?;
        Ok(slip.set_amount(amount))
    }

    pub fn apply_preset(&mut self, preset: BetPreset) -> Result<u32, SessionError> {
        let affordances = self.affordances()?.clone();
        let slip = self.bet_slip.as_mut().ok_or(SessionError::NoBetSlip)?;
        Ok(slip.apply_preset(&affordances, preset))
    }

    /// Submits the open bet slip.
    pub fn confirm_bet(&mut self) -> Result<PlayerAction, SessionError> {
        let slip = self.bet_slip.as_ref().ok_or(SessionError::NoBetSlip)?;
        let action = slip.submit()?;
        self.act(action)?;
        Ok(action)
    }

    pub fn cancel_bet(&mut self) {
        self.bet_slip = None;
    }

    pub fn send_chat(&mut self, text: &str) -> Result<(), SessionError> {
        let table_id = self.table_id()?;
        let message = prepare_outbound(text).ok_or(SessionError::EmptyChat)?;
        self.emit(ClientEvent::PokerChat(ChatRequest { table_id, message }))
    }

    /// Detaches the session and sends a best-effort leave for the joined
    /// table. Every later inbound event is ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        if let Some(table_id) = self.current_table.clone() {
            self.log_failure(ClientEvent::LeavePokerTable(TableRef { table_id }));
        }
        self.destroyed = true;
        self.clear_table();
        self.pending_buy_in = None;
        tracing::debug!(session = %self.id, "poker session destroyed");
    }

    fn table_id(&self) -> Result<String, SessionError> {
        self.current_table.clone().ok_or(SessionError::NotAtTable)
    }

    fn clear_table(&mut self) {
        self.current_table = None;
        self.snapshot = None;
        self.view = None;
        self.bet_slip = None;
    }

    fn emit(&mut self, event: ClientEvent) -> Result<(), SessionError> {
        if self.destroyed {
            return Err(SessionError::Destroyed);
        }
        self.transport.emit(event)?;
        Ok(())
    }

    fn log_failure(&mut self, event: ClientEvent) {
        let name = event.name();
        if let Err(e) = self.emit(event) {
            tracing::warn!(event = name, error = %e, "emit failed");
        }
    }
}
