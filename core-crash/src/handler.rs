//! Process-wide panic capture
//!
//! [`CrashHandler::install`] chains a panic hook in front of whatever hook
//! was installed before it. On a panic the hook logs the failure, writes a
//! [`CrashRecord`], waits a short grace period for log sinks to flush, runs
//! the previous hook and finally terminates the process.

use crate::record::CrashRecord;
use crate::reporter::CrashReporter;
use bridge_traits::{Clock, DeviceInfoProvider};
use core_runtime::config::ShellConfig;
use core_runtime::events::{CrashEvent, EventBus, ShellEvent};
use std::backtrace::Backtrace;
use std::panic::{self, PanicHookInfo};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{error, info};

/// Exit status used when the process is terminated after a crash
pub const CRASH_EXIT_CODE: i32 = 1;

/// Ends the process after capture. Receives the exit status.
pub type Terminator = Arc<dyn Fn(i32) + Send + Sync>;

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Outcome of [`CrashHandler::install`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    Installed,
    /// A handler was installed earlier in this process; nothing changed
    AlreadyInstalled,
}

/// Captures uncaught panics into crash files.
pub struct CrashHandler {
    reporter: CrashReporter,
    device: Arc<dyn DeviceInfoProvider>,
    clock: Arc<dyn Clock>,
    app_version: String,
    grace: Duration,
    terminator: Terminator,
    events: Option<EventBus>,
}

impl CrashHandler {
    pub fn new(
        reporter: CrashReporter,
        device: Arc<dyn DeviceInfoProvider>,
        clock: Arc<dyn Clock>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            reporter,
            device,
            clock,
            app_version: app_version.into(),
            grace: Duration::from_millis(1000),
            terminator: Arc::new(|code| std::process::exit(code)),
            events: None,
        }
    }

    /// Handler writing to `config.crash_dir` with the configured grace period
    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(
            CrashReporter::new(config.crash_dir.clone()),
            Arc::clone(&config.device_info),
            Arc::clone(&config.clock),
            config.content.app_version.clone(),
        )
        .with_grace(config.timing.crash_grace)
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Replace process termination, e.g. to exit through a host API
    pub fn with_terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    /// Publish [`CrashEvent`]s on `events`
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn reporter(&self) -> &CrashReporter {
        &self.reporter
    }

    /// Install the handler for the whole process.
    ///
    /// Only the first call in a process installs anything; later calls
    /// return [`InstallStatus::AlreadyInstalled`] and drop `self`, so hooks
    /// are never chained twice.
    pub fn install(self) -> InstallStatus {
        let mut status = InstallStatus::AlreadyInstalled;

        INSTALLED.get_or_init(|| {
            let handler = Arc::new(self);
            let previous = panic::take_hook();

            panic::set_hook(Box::new(move |hook_info| {
                let record = handler.record_panic(hook_info);
                handler.capture(&record);
                previous(hook_info);
                (handler.terminator)(CRASH_EXIT_CODE);
            }));

            info!("Crash handler installed");
            status = InstallStatus::Installed;
        });

        status
    }

    /// Build a record for the panic described by `hook_info`
    pub fn record_panic(&self, hook_info: &PanicHookInfo<'_>) -> CrashRecord {
        let payload = hook_info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());

        let current = std::thread::current();
        let thread = current
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{:?}", current.id()));

        CrashRecord {
            timestamp: self.clock.now(),
            thread,
            device: self.device.descriptor(),
            app_version: self.app_version.clone(),
            exception_class: "panic".to_string(),
            message,
            location: hook_info.location().map(|l| l.to_string()),
            stack_trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Log, persist and flush one crash. Write failures are logged and
    /// swallowed; the caller terminates regardless.
    pub fn capture(&self, record: &CrashRecord) -> Option<PathBuf> {
        error!(
            thread = %record.thread,
            exception = %record.exception_class,
            message = %record.message,
            location = record.location.as_deref().unwrap_or("unknown"),
            "Uncaught panic"
        );

        let written = match self.reporter.write(record) {
            Ok(path) => {
                self.publish(CrashEvent::Captured {
                    file: path.display().to_string(),
                });
                Some(path)
            }
            Err(e) => {
                error!(error = %e, "Failed to save crash info");
                self.publish(CrashEvent::WriteFailed {
                    message: e.to_string(),
                });
                None
            }
        };

        for line in record.summary_lines() {
            error!("{}", line);
        }

        if !self.grace.is_zero() {
            std::thread::sleep(self.grace);
        }

        written
    }

    fn publish(&self, event: CrashEvent) {
        if let Some(events) = &self.events {
            let _ = events.emit(ShellEvent::Crash(event));
        }
    }
}
