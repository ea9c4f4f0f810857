//! # Host Bridge Traits
//!
//! Platform abstraction traits that each host must implement for the shell
//! core.
//!
//! ## Overview
//!
//! The shell core (lifecycle orchestration, content surface management, the
//! native bridge, connectivity gating and crash capture) never talks to an
//! operating system directly. Everything it needs from the host is expressed
//! here as a trait and injected at configuration time.
//!
//! ## Traits
//!
//! ### Content
//! - [`ContentRenderer`](renderer::ContentRenderer) - One embedded web renderer instance
//! - [`RendererFactory`](renderer::RendererFactory) - Creates renderer instances
//! - [`RendererClient`](renderer::RendererClient) - Page callbacks from the renderer
//! - [`ScriptInterface`](renderer::ScriptInterface) - Receiver for calls from hosted script
//!
//! ### Storage
//! - [`SettingsStore`](storage::SettingsStore) - Namespaced persisted key-value store
//!
//! ### Platform Integration
//! - [`NetworkMonitor`](network::NetworkMonitor) - Active network and transitions
//! - [`Haptics`](device::Haptics), [`ShareSheet`](device::ShareSheet),
//!   [`Notifier`](device::Notifier), [`ExternalBrowser`](device::ExternalBrowser),
//!   [`DeviceInfoProvider`](device::DeviceInfoProvider),
//!   [`DisplayController`](device::DisplayController) - Device services
//!
//! ### UI Context
//! - [`UiDispatcher`](ui::UiDispatcher) - Marshal work onto the UI-owning context
//! - [`Dialogs`](ui::Dialogs) - Blocking prompts
//! - [`ShellChrome`](ui::ShellChrome) - Splash, loading overlay, help affordance
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Headless renderer |
//! | Android  | TBD                 | 📋 Planned |
//! | iOS      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! convert platform errors into it and keep the message actionable.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! between the UI context and background tasks.

pub mod device;
pub mod error;
pub mod network;
pub mod renderer;
pub mod storage;
pub mod time;
pub mod ui;

pub use error::BridgeError;

// Re-export commonly used types
pub use device::{
    DeviceDescriptor, DeviceInfoProvider, DisplayController, DisplayMode, ExternalBrowser,
    Haptics, Notifier, ShareSheet,
};
pub use network::{
    ActiveNetwork, NetworkCapability, NetworkChange, NetworkChangeStream, NetworkId,
    NetworkMonitor, NetworkType,
};
pub use renderer::{
    BridgeCall, CacheMode, ContentRenderer, LoadError, LoadErrorKind, MixedContentMode,
    RendererClient, RendererFactory, RendererId, RendererSettings, ScriptInterface,
};
pub use storage::{SettingsStore, SettingsTransaction};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};
pub use ui::{Dialogs, MenuChoice, Prompt, PromptChoice, ShellChrome, UiDispatcher, UiJob};
