use crate::errors::{ClientError, TransportError};
use crate::events::ViewBus;
use crate::settings::ClientSettings;
use crate::transport::{SocketHandle, acquire_socket};
use std::sync::Mutex;

/// Process-wide state, built once at startup and passed to every session.
#[derive(Debug)]
pub struct AppContext {
    settings: ClientSettings,
    bus: ViewBus,
    host_socket: Option<SocketHandle>,
    /// Connection opened on first use when there is no host socket.
    dedicated: Mutex<Option<SocketHandle>>,
}

impl AppContext {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        settings.validate()?;
        tracing::debug!(server_url = %settings.server_url, "application context created");
        Ok(Self {
            settings,
            bus: ViewBus::new(),
            host_socket: None,
            dedicated: Mutex::new(None),
        })
    }

    /// Shares an existing connection with every session built from this context.
    pub fn with_host_socket(mut self, socket: SocketHandle) -> Self {
        self.host_socket = Some(socket);
        self
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn bus(&self) -> &ViewBus {
        &self.bus
    }

    /// The one socket every session of this context shares: the host's if
    /// there is one, otherwise a dedicated handle opened on first call.
    ///
    /// A dedicated handle is returned unstarted so callers can subscribe
    /// before the server's first frame; [`SocketHandle::start`] is a no-op on
    /// a handle that is already running.
    pub fn socket(&self) -> Result<SocketHandle, TransportError> {
        let mut dedicated = self.dedicated.lock().map_err(|_| TransportError::Closed)?;
        if let Some(socket) = dedicated.as_ref() {
            return Ok(socket.clone());
        }
        let socket = acquire_socket(
            self.host_socket.as_ref(),
            &self.settings.server_url,
            self.settings.reconnect_policy(),
        )?;
        if self.host_socket.is_none() {
            *dedicated = Some(socket.clone());
        }
        Ok(socket)
    }

    /// Closes the socket this context opened and drops every view observer.
    /// A host socket is left to its owner.
    pub fn teardown(self) {
        if let Ok(mut dedicated) = self.dedicated.lock() {
            if let Some(socket) = dedicated.take() {
                socket.shutdown();
            }
        }
        self.bus.clear();
        tracing::debug!("application context torn down");
    }
}
