//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the game shell:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! Every other core crate depends on this one. It owns the shape of the
//! injected host bridges ([`config::ShellConfig`]), the typed event channel
//! the orchestrator publishes on, and the logging conventions used
//! throughout the workspace.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
