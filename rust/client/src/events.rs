use pokerfelt_table::chat::ChatMessage;
use pokerfelt_table::lobby::LobbyRow;
use pokerfelt_table::view::TableView;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

// Bounded so a stalled observer cannot grow memory; it is pruned instead.
const VIEW_CHANNEL_BUFFER: usize = 1000;

pub type ViewSender = mpsc::Sender<ViewEvent>;
pub type ViewReceiver = mpsc::Receiver<ViewEvent>;

/// Part of the UI an observer redraws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Lobby,
    Table,
    Chat,
    Notice,
}

/// Which screen the session is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Lobby,
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Blocking message the user must acknowledge (server `error` events).
    Alert(String),
    Info(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    LobbyUpdated(Vec<LobbyRow>),
    ScreenChanged(Screen),
    TableRendered(Arc<TableView>),
    ChatAppended(ChatMessage),
    Notice(Notice),
}

impl ViewEvent {
    pub fn slice(&self) -> Slice {
        match self {
            ViewEvent::LobbyUpdated(_) => Slice::Lobby,
            ViewEvent::ScreenChanged(_) | ViewEvent::TableRendered(_) => Slice::Table,
            ViewEvent::ChatAppended(_) => Slice::Chat,
            ViewEvent::Notice(_) => Slice::Notice,
        }
    }
}

/// Receives view events for one slice until dropped.
pub struct Subscription {
    bus: ViewBus,
    slice: Slice,
    subscriber_id: usize,
    pub receiver: ViewReceiver,
}

impl Subscription {
    pub fn receiver(&mut self) -> &mut ViewReceiver {
        &mut self.receiver
    }

    pub fn slice(&self) -> Slice {
        self.slice
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.slice, self.subscriber_id);
    }
}

/// Observer registry keyed by UI slice.
#[derive(Debug, Clone, Default)]
pub struct ViewBus {
    inner: Arc<ViewBusInner>,
}

#[derive(Debug, Default)]
struct ViewBusInner {
    subscribers: RwLock<HashMap<Slice, Vec<(usize, ViewSender)>>>,
    next_id: AtomicUsize,
}

impl ViewBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, slice: Slice) -> Subscription {
        let (subscriber_id, receiver) = self.subscribe_raw(slice);
        Subscription {
            bus: self.clone(),
            slice,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, slice: Slice) -> (usize, ViewReceiver) {
        let (tx, rx) = mpsc::channel(VIEW_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        guard.entry(slice).or_default().push((id, tx));

        tracing::debug!(slice = ?slice, subscriber_id = id, "view observer subscribed");

        (id, rx)
    }

    pub fn publish(&self, event: ViewEvent) {
        let slice = event.slice();
        let subscribers = {
            let guard = self
                .inner
                .subscribers
                .read()
                .expect("subscriber lock poisoned");
            guard.get(&slice).cloned()
        };

        let Some(list) = subscribers else {
            tracing::trace!(slice = ?slice, "no observers for slice");
            return;
        };

        let mut failed = Vec::new();
        for (id, sender) in list {
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    slice = ?slice,
                    subscriber_id = id,
                    error = %e,
                    "dropping view observer"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(slice, &failed);
        }
    }

    pub fn unsubscribe(&self, slice: Slice, subscriber_id: usize) {
        self.remove_subscribers(slice, &[subscriber_id]);
    }

    /// Drops every observer; their receivers see the channel close.
    pub fn clear(&self) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        guard.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        let guard = self
            .inner
            .subscribers
            .read()
            .expect("subscriber lock poisoned");
        guard.values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, slice: Slice, ids: &[usize]) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        if let Some(list) = guard.get_mut(&slice) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(&slice);
            }
        }
    }
}
