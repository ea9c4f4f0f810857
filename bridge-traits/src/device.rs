//! Device Service Abstractions
//!
//! Narrow capability traits for the platform services hosted content may
//! reach through the native bridge: haptics, sharing, transient notices,
//! an external browser, device identity and display mode.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;

/// Haptic feedback service
///
/// - **Android**: Vibrator / VibrationEffect
/// - **iOS**: UIImpactFeedbackGenerator
/// - **Desktop**: usually unavailable
pub trait Haptics: Send + Sync {
    /// Single pulse of `duration`
    fn vibrate(&self, duration: Duration) -> Result<()>;

    /// Alternating off/on timings in milliseconds, played once
    fn vibrate_waveform(&self, timings_ms: &[u64]) -> Result<()>;
}

/// Generic platform share flow
pub trait ShareSheet: Send + Sync {
    fn share_text(&self, chooser_title: &str, text: &str) -> Result<()>;
}

/// Transient, non-blocking user notice (toast/snackbar)
pub trait Notifier: Send + Sync {
    fn show_notice(&self, message: &str) -> Result<()>;
}

/// Opens URLs outside the embedded renderer
pub trait ExternalBrowser: Send + Sync {
    /// Fails with `BridgeError::NotAvailable` when no browser is installed
    fn open(&self, url: &str) -> Result<()>;
}

/// Static description of the device the shell runs on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub brand: String,
    pub model: String,
    pub os_version: String,
    pub api_level: u32,
}

impl DeviceDescriptor {
    /// One-line form used in crash reports, e.g. `Google Pixel 8`
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

pub trait DeviceInfoProvider: Send + Sync {
    fn descriptor(&self) -> DeviceDescriptor;
}

/// Host window display flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayMode {
    /// Hide system bars (immersive sticky)
    pub immersive: bool,
    /// Prevent the screen from sleeping
    pub keep_screen_on: bool,
}

/// Controls host-level display state. UI context only.
pub trait DisplayController: Send + Sync {
    fn apply(&self, mode: DisplayMode) -> Result<()>;
}
