//! Workspace placeholder crate.
//!
//! This crate exposes the shared feature flags that map onto the individual
//! workspace crates. Host applications can depend on `shell-workspace` with
//! `desktop-shims` enabled and get the lifecycle orchestrator plus the desktop
//! bridge defaults without wiring each crate by hand.

#[cfg(feature = "desktop-shims")]
pub use core_runtime::config::ShellConfig;
#[cfg(feature = "desktop-shims")]
pub use core_shell::ShellOrchestrator;
