//! Crash record model and its on-disk text layout

use bridge_traits::device::DeviceDescriptor;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;

const HEADER_RULE: &str = "========== CRASH REPORT ==========";
const RULE: &str = "================================";

/// One uncaught failure. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashRecord {
    pub timestamp: DateTime<Utc>,
    /// Name of the failing thread, or its id when unnamed
    pub thread: String,
    pub device: DeviceDescriptor,
    pub app_version: String,
    /// Failure category, e.g. `panic`
    pub exception_class: String,
    pub message: String,
    /// `file:line:column` of the failure, when known
    pub location: Option<String>,
    pub stack_trace: String,
}

impl CrashRecord {
    /// Second-resolution stamp used in the report header
    pub fn display_time(&self) -> String {
        self.timestamp.format("%Y-%m-%d_%H-%M-%S").to_string()
    }

    /// Base file name; millisecond resolution keeps names ordered
    pub fn file_stem(&self) -> String {
        format!("crash_{}", self.timestamp.format("%Y-%m-%d_%H-%M-%S-%3f"))
    }

    /// Plain-text report written to the crash file
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}", HEADER_RULE);
        let _ = writeln!(out, "Time: {} UTC", self.display_time());
        let _ = writeln!(out, "Thread: {}", self.thread);
        let _ = writeln!(out, "Device: {}", self.device.display_name());
        let _ = writeln!(
            out,
            "OS: {} (API {})",
            self.device.os_version, self.device.api_level
        );
        let _ = writeln!(out, "App Version: {}", self.app_version);
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out);
        let _ = writeln!(out, "Exception: {}", self.exception_class);
        let _ = writeln!(out, "Message: {}", self.message);
        if let Some(location) = &self.location {
            let _ = writeln!(out, "Location: {}", location);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Stack Trace:");
        let _ = writeln!(out, "{}", self.stack_trace.trim_end());
        let _ = writeln!(out, "{}", RULE);
        out
    }

    /// Short multi-line summary for the log after the file is written
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            HEADER_RULE.to_string(),
            format!("Thread: {}", self.thread),
            format!("Exception: {}", self.exception_class),
            format!("Message: {}", self.message),
        ];
        if let Some(location) = &self.location {
            lines.push(format!("Location: {}", location));
        }
        lines.push(RULE.to_string());
        lines
    }
}
