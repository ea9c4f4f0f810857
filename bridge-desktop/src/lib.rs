//! # Desktop Bridge Implementations
//!
//! Default implementations of the host bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! A desktop host has no embedded mobile webview, vibrator or share sheet,
//! so this crate provides the closest useful stand-ins:
//! - `SettingsStore` using a SQLite-backed key-value store
//! - `NetworkMonitor` using a periodic TCP reachability probe
//! - `UiDispatcher` as a serial Tokio task
//! - `ContentRenderer` as a headless renderer that probes pages with `reqwest`
//! - `Dialogs` on the controlling terminal
//! - Device services (haptics, notices, sharing) reported through `tracing`,
//!   and an external browser that uses the platform URL opener
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{app_data_dir, SqliteSettingsStore, TokioUiDispatcher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = SqliteSettingsStore::new(
//!         app_data_dir("love-money").join("settings.db"),
//!         "LoveMoneyGameData",
//!     )
//!     .await
//!     .unwrap();
//!     let ui = TokioUiDispatcher::spawn();
//!
//!     // Use in core configuration
//! }
//! ```

mod device;
mod dialogs;
mod network;
mod paths;
mod renderer;
mod settings;
mod ui;

pub use device::{
    HostDeviceInfo, LogNotifier, LogShareSheet, SystemBrowser, TracingHaptics, WindowDisplay,
};
pub use dialogs::{TerminalDialogs, TracingChrome};
pub use network::DesktopNetworkMonitor;
pub use paths::app_data_dir;
pub use renderer::{HeadlessRenderer, HeadlessRendererFactory};
pub use settings::SqliteSettingsStore;
pub use ui::TokioUiDispatcher;
