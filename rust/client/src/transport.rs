//! Socket acquisition and the websocket transport.
//!
//! A [`SocketHandle`] is one shared connection to the table server. Clones
//! share the same connection, so a host that already owns a socket can hand it
//! to a poker session through [`acquire_socket`] instead of opening a second
//! one. The connection task reconnects with exponential backoff and jitter and
//! queues outbound frames while the link is down.

use crate::errors::TransportError;
use crate::settings::parse_server_url;
use futures_util::{SinkExt, StreamExt};
use pokerfelt_table::errors::ProtocolError;
use pokerfelt_table::protocol::{ClientEvent, ServerEvent};
use rand::Rng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

const INBOUND_BUFFER: usize = 1000;

/// Outbound side of a connection as seen by a session.
pub trait Transport: Send {
    fn emit(&mut self, event: ClientEvent) -> Result<(), TransportError>;

    /// Server-assigned identity of a link that is already up, if any.
    fn identity(&self) -> Option<String> {
        None
    }
}

/// How long to wait between reconnect attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub initial: Duration,
    pub max: Duration,
    /// Extra random delay, as a fraction of the backoff (0.0 disables it).
    pub jitter: f64,
    /// Give up after this many consecutive failures; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(250),
            max: Duration::from_secs(10),
            jitter: 0.2,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Backoff before reconnect attempt number `attempt` (0-based), without jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
        std::cmp::min(self.initial.saturating_mul(factor), self.max)
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        let spread = (base.as_millis() as f64 * self.jitter.max(0.0)) as u64;
        if spread == 0 {
            return base;
        }
        base + Duration::from_millis(rand::rng().random_range(0..=spread))
    }

    pub fn exhausted(&self, failures: u32) -> bool {
        self.max_attempts.is_some_and(|max| failures >= max)
    }
}

#[derive(Debug)]
struct Shared {
    instance: Uuid,
    socket_id: RwLock<Option<String>>,
    connected: AtomicBool,
    inbound: broadcast::Sender<ServerEvent>,
    frames: broadcast::Sender<String>,
    /// Connection task inputs, held until [`SocketHandle::start`].
    idle: Mutex<Option<IdleLink>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Debug)]
struct IdleLink {
    url: String,
    policy: ReconnectPolicy,
    outbound: mpsc::UnboundedReceiver<ClientEvent>,
}

impl Shared {
    fn new() -> Self {
        let (inbound, _) = broadcast::channel(INBOUND_BUFFER);
        let (frames, _) = broadcast::channel(INBOUND_BUFFER);
        Self {
            instance: Uuid::new_v4(),
            socket_id: RwLock::new(None),
            connected: AtomicBool::new(false),
            inbound,
            frames,
            idle: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    /// The server hands out a fresh identity on every connection.
    fn link_lost(&self) {
        self.connected.store(false, Ordering::Release);
        if let Ok(mut guard) = self.socket_id.write() {
            guard.take();
        }
    }

    /// Decodes one text frame and fans it out to subscribers.
    fn deliver(&self, text: &str) {
        let _ = self.frames.send(text.to_string());
        match ServerEvent::decode(text) {
            Ok(event) => {
                if let ServerEvent::Connect { socket_id } = &event {
                    tracing::info!(socket = %self.instance, socket_id = %socket_id, "socket identified");
                    if let Ok(mut guard) = self.socket_id.write() {
                        *guard = Some(socket_id.clone());
                    }
                }
                // No receivers simply means nobody is listening yet.
                let _ = self.inbound.send(event);
            }
            Err(ProtocolError::UnknownEvent(name)) => {
                tracing::debug!(socket = %self.instance, event = %name, "ignoring unknown event");
            }
            Err(e) => {
                tracing::warn!(socket = %self.instance, error = %e, "dropping undecodable frame");
            }
        }
    }
}

/// Cloneable handle to one shared server connection.
#[derive(Debug, Clone)]
pub struct SocketHandle {
    shared: Arc<Shared>,
    outbound: mpsc::UnboundedSender<ClientEvent>,
}

impl SocketHandle {
    /// Opens a websocket connection managed by a background task.
    ///
    /// Returns immediately; frames emitted before the link is up are queued.
    pub fn connect(url: &str, policy: ReconnectPolicy) -> Result<Self, TransportError> {
        let handle = Self::open(url, policy)?;
        handle.start()?;
        Ok(handle)
    }

    /// A handle for `url` whose connection task has not been started.
    ///
    /// Subscribers attached before [`SocketHandle::start`] see every frame,
    /// including the server's first `connect`. Emitted frames are queued.
    pub fn open(url: &str, policy: ReconnectPolicy) -> Result<Self, TransportError> {
        let url = parse_server_url(url)?;
        let shared = Arc::new(Shared::new());
        let (outbound, rx) = mpsc::unbounded_channel();
        if let Ok(mut guard) = shared.idle.lock() {
            *guard = Some(IdleLink {
                url: url.to_string(),
                policy,
                outbound: rx,
            });
        }
        Ok(Self { shared, outbound })
    }

    /// Spawns the connection task on the current runtime. A no-op for a
    /// handle that is already running or was never meant to connect.
    pub fn start(&self) -> Result<(), TransportError> {
        let Ok(mut idle) = self.shared.idle.lock() else {
            return Err(TransportError::Closed);
        };
        if idle.is_none() {
            return Ok(());
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        let Some(link) = idle.take() else {
            return Ok(());
        };
        tracing::info!(socket = %self.shared.instance, url = %link.url, "opening socket");

        let task = runtime.spawn(run_connection(
            link.url,
            link.policy,
            self.shared.clone(),
            link.outbound,
        ));
        if let Ok(mut guard) = self.shared.task.lock() {
            *guard = Some(task);
        }
        Ok(())
    }

    /// A handle wired to in-memory channels instead of a network socket.
    ///
    /// Returns the receiver of everything emitted through the handle; inbound
    /// events are injected with [`SocketHandle::inject`].
    pub fn detached() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let shared = Arc::new(Shared::new());
        shared.connected.store(true, Ordering::Release);
        let (outbound, rx) = mpsc::unbounded_channel();
        (Self { shared, outbound }, rx)
    }

    /// Feeds a raw inbound frame as if it came off the wire.
    pub fn inject(&self, frame: &str) {
        self.shared.deliver(frame);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.shared.inbound.subscribe()
    }

    /// Raw inbound text frames, before decoding. Used for session recording.
    pub fn subscribe_frames(&self) -> broadcast::Receiver<String> {
        self.shared.frames.subscribe()
    }

    /// Server-assigned identity of the current connection, once announced.
    pub fn socket_id(&self) -> Option<String> {
        self.shared.socket_id.read().ok().and_then(|g| g.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    pub fn instance(&self) -> Uuid {
        self.shared.instance
    }

    /// Stops the connection task for every clone of this handle.
    pub fn shutdown(&self) {
        if let Ok(mut idle) = self.shared.idle.lock() {
            idle.take();
        }
        if let Ok(mut guard) = self.shared.task.lock() {
            if let Some(task) = guard.take() {
                task.abort();
                tracing::info!(socket = %self.shared.instance, "socket shut down");
            }
        }
        self.shared.connected.store(false, Ordering::Release);
    }
}

impl Transport for SocketHandle {
    fn emit(&mut self, event: ClientEvent) -> Result<(), TransportError> {
        tracing::debug!(socket = %self.shared.instance, event = event.name(), "emit");
        self.outbound.send(event).map_err(|_| TransportError::Closed)
    }

    fn identity(&self) -> Option<String> {
        if self.is_connected() {
            self.socket_id()
        } else {
            None
        }
    }
}

/// Reuses the host's socket when one is provided, otherwise opens a
/// dedicated one that connects once [`SocketHandle::start`] is called.
pub fn acquire_socket(
    host: Option<&SocketHandle>,
    url: &str,
    policy: ReconnectPolicy,
) -> Result<SocketHandle, TransportError> {
    match host {
        Some(handle) => {
            tracing::debug!(socket = %handle.instance(), "reusing host socket");
            Ok(handle.clone())
        }
        None => SocketHandle::open(url, policy),
    }
}

/// Next inbound event, skipping over any that a slow reader missed.
/// `None` once every handle to the socket is gone.
pub async fn recv_event(rx: &mut broadcast::Receiver<ServerEvent>) -> Option<ServerEvent> {
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "inbound reader lagged; events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

async fn run_connection(
    url: String,
    policy: ReconnectPolicy,
    shared: Arc<Shared>,
    mut outbound: mpsc::UnboundedReceiver<ClientEvent>,
) {
    let mut pending: VecDeque<String> = VecDeque::new();
    let mut failures: u32 = 0;

    loop {
        match connect_async(url.as_str()).await {
            Ok((ws, _)) => {
                failures = 0;
                shared.connected.store(true, Ordering::Release);
                tracing::info!(socket = %shared.instance, "socket connected");

                let (mut sink, mut stream) = ws.split();
                let mut link_up = true;

                while let Some(text) = pending.pop_front() {
                    if let Err(e) = sink.send(Message::Text(text.clone())).await {
                        tracing::warn!(socket = %shared.instance, error = %e, "flush failed");
                        pending.push_front(text);
                        link_up = false;
                        break;
                    }
                }

                while link_up {
                    tokio::select! {
                        next = outbound.recv() => match next {
                            Some(event) => {
                                if let Some(text) = encode(&shared, &event) {
                                    if let Err(e) = sink.send(Message::Text(text.clone())).await {
                                        tracing::warn!(socket = %shared.instance, error = %e, "send failed; queued for reconnect");
                                        pending.push_back(text);
                                        link_up = false;
                                    }
                                }
                            }
                            None => {
                                let _ = sink.close().await;
                                shared.connected.store(false, Ordering::Release);
                                tracing::debug!(socket = %shared.instance, "all handles dropped; closing socket");
                                return;
                            }
                        },
                        frame = stream.next() => match frame {
                            Some(Ok(Message::Text(text))) => shared.deliver(&text),
                            Some(Ok(Message::Close(_))) | None => {
                                tracing::info!(socket = %shared.instance, "server closed the socket");
                                link_up = false;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                tracing::warn!(socket = %shared.instance, error = %e, "socket error");
                                link_up = false;
                            }
                        },
                    }
                }
                shared.link_lost();
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(
                    socket = %shared.instance,
                    attempt = failures,
                    error = %e,
                    "connect failed"
                );
                if policy.exhausted(failures) {
                    tracing::error!(socket = %shared.instance, attempts = failures, "giving up on reconnect");
                    return;
                }
            }
        }

        let delay = policy.delay(failures.saturating_sub(1));
        tracing::debug!(socket = %shared.instance, delay_ms = delay.as_millis() as u64, "reconnect scheduled");
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                next = outbound.recv() => match next {
                    Some(event) => {
                        if let Some(text) = encode(&shared, &event) {
                            pending.push_back(text);
                        }
                    }
                    None => return,
                },
            }
        }
    }
}

fn encode(shared: &Shared, event: &ClientEvent) -> Option<String> {
    match event.encode() {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!(socket = %shared.instance, event = event.name(), error = %e, "failed to encode frame");
            None
        }
    }
}

/// Transport that keeps every emitted event in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<ClientEvent>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<ClientEvent> {
        self.sent.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Returns and forgets everything emitted so far.
    pub fn take(&self) -> Vec<ClientEvent> {
        self.sent
            .lock()
            .map(|mut g| std::mem::take(&mut *g))
            .unwrap_or_default()
    }
}

impl Transport for RecordingTransport {
    fn emit(&mut self, event: ClientEvent) -> Result<(), TransportError> {
        self.sent
            .lock()
            .map_err(|_| TransportError::Closed)?
            .push(event);
        Ok(())
    }
}
