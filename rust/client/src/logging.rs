use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

pub const DEFAULT_FILTER: &str = "info,pokerfelt_client=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    fields: BTreeMap<&'static str, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// In-memory layer that keeps every event for test assertions.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Events at `level` whose message contains `fragment`.
    pub fn matching(&self, level: Level, fragment: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level && e.message.contains(fragment))
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        if let Ok(mut events) = self.events.lock() {
            events.push(CapturedEvent {
                level: *event.metadata().level(),
                message: collector.message,
                fields: collector.fields,
            });
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: BTreeMap<&'static str, String>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = value,
            name => {
                self.fields.insert(name, value);
            }
        }
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{:?}", value));
    }
}

/// Installs the process-wide subscriber. Output goes to stderr so the
/// terminal table on stdout stays clean.
pub fn init_logging(format: LogFormat) -> Result<(), SetGlobalDefaultError> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match format {
        LogFormat::Text => {
            let subscriber = fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Json => {
            let subscriber = fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    }
}

/// Process-wide capture for integration tests; emptied on every call.
pub fn init_test_logging() -> LogCapture {
    static CAPTURE: OnceLock<LogCapture> = OnceLock::new();

    let capture = CAPTURE.get_or_init(|| {
        let capture = LogCapture::new();
        let registry = Registry::default().with(capture.clone());
        tracing::subscriber::set_global_default(registry)
            .expect("test log capture must be the first global subscriber");
        capture
    });
    capture.clear();
    capture.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, error, info, warn};

    fn capture<F: FnOnce()>(f: F) -> LogCapture {
        let logs = LogCapture::new();
        tracing::subscriber::with_default(Registry::default().with(logs.clone()), f);
        logs
    }

    #[test]
    fn captures_levels_in_order() {
        let events = capture(|| {
            debug!("socket connecting");
            info!("joined lobby");
            warn!("reconnect scheduled");
            error!("failed to render seat");
        })
        .events();
        let levels: Vec<Level> = events.iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR]
        );
        assert_eq!(events[3].message, "failed to render seat");
    }

    #[test]
    fn structured_fields_keep_display_form() {
        let table_id = String::from("poker_1");
        let logs = capture(|| {
            error!(table_id = %table_id, seat = 3usize, "failed to render seat");
            info!(socket_id = "me", "connected");
        });
        let failed = logs.matching(Level::ERROR, "render seat");
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].field("table_id"), Some("poker_1"));
        assert_eq!(failed[0].field("seat"), Some("3"));
        assert_eq!(logs.matching(Level::INFO, "connected")[0].field("socket_id"), Some("me"));

        logs.clear();
        assert!(logs.events().is_empty());
    }
}
