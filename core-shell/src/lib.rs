//! # Shell Lifecycle
//!
//! Top-level session orchestration for the game shell.
//!
//! ## Overview
//!
//! A session runs in two stages:
//!
//! 1. **Splash**: crash capture is installed, the splash is shown with a
//!    simulated progress indicator and a spare renderer is warmed in the
//!    background.
//! 2. **Content**: the spare (or a freshly created renderer) becomes the
//!    content surface, the native bridge is registered, connectivity is
//!    watched and the game is loaded once the network is usable.
//!
//! The host forwards its lifecycle callbacks (foreground, background, back
//! press, teardown) to [`ShellOrchestrator`] and waits on
//! [`ShellOrchestrator::wait_for_exit`] to learn when the user leaves.
//!
//! ## Usage
//!
//! ```ignore
//! use core_shell::ShellOrchestrator;
//!
//! let shell = ShellOrchestrator::new(config);
//! shell.start().await;
//! shell.on_foreground().await;
//!
//! shell.wait_for_exit().await;
//! shell.on_teardown().await;
//! ```

pub mod error;
pub mod orchestrator;
pub mod session;
pub mod spare;
pub mod splash;

pub use error::{Result, ShellError};
pub use orchestrator::{OrchestratorBuilder, ShellOrchestrator};
pub use session::{Session, SessionStage};
pub use spare::SpareSlot;
