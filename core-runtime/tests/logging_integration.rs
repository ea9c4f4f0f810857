//! Integration tests for logging initialisation

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CollectingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for CollectingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}

// A global subscriber can only be installed once per process, so the whole
// scenario lives in one test.
#[test]
fn test_init_mirrors_to_sink_and_rejects_second_init() {
    let sink = Arc::new(CollectingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(sink.clone());

    init_logging(config).expect("first initialisation succeeds");

    tracing::info!(target: "core_shell", url = "about:blank", "Loading content");
    tracing::trace!(target: "core_shell", "Filtered out by level");
    tracing::debug!(target: "sqlx::query", "Filtered out by dependency directive");

    {
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Loading content");
        assert_eq!(entries[0].fields.get("url").map(String::as_str), Some("about:blank"));
    }

    let second = init_logging(LoggingConfig::default());
    assert!(matches!(second, Err(Error::Config(_))));
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}
