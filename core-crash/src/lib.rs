//! # Crash Capture
//!
//! Serializes uncaught panics to durable storage before the process
//! terminates.
//!
//! ## Overview
//!
//! - [`CrashRecord`] - The captured failure context and its text layout
//! - [`CrashReporter`] - Writes one `crash_<timestamp>.log` file per crash
//! - [`CrashHandler`] - Process-wide panic hook, installed once
//!
//! ## Usage
//!
//! ```ignore
//! use core_crash::CrashHandler;
//!
//! CrashHandler::from_config(&config)
//!     .with_events(event_bus.clone())
//!     .install();
//! ```

pub mod error;
pub mod handler;
pub mod record;
pub mod reporter;

pub use error::{CrashError, Result};
pub use handler::{CrashHandler, InstallStatus, Terminator, CRASH_EXIT_CODE};
pub use record::CrashRecord;
pub use reporter::CrashReporter;
