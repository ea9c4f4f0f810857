//! Device Service Implementations
//!
//! Desktop stand-ins for handheld services. Haptics, notices and sharing
//! have no desktop equivalent and are reported through `tracing`; the
//! browser opener shells out to the platform's URL handler.

use bridge_traits::{
    device::{
        DeviceDescriptor, DeviceInfoProvider, DisplayController, DisplayMode, ExternalBrowser,
        Haptics, Notifier, ShareSheet,
    },
    error::{BridgeError, Result},
};
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Haptics that only log the requested pattern
#[derive(Debug, Default, Clone)]
pub struct TracingHaptics;

impl Haptics for TracingHaptics {
    fn vibrate(&self, duration: Duration) -> Result<()> {
        debug!(duration_ms = duration.as_millis() as u64, "Vibrate");
        Ok(())
    }

    fn vibrate_waveform(&self, timings_ms: &[u64]) -> Result<()> {
        if timings_ms.is_empty() {
            return Err(BridgeError::OperationFailed(
                "Waveform needs at least one timing".to_string(),
            ));
        }
        debug!(?timings_ms, "Vibrate waveform");
        Ok(())
    }
}

/// Notices written to the log at info level
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_notice(&self, message: &str) -> Result<()> {
        info!(notice = message, "Notice");
        Ok(())
    }
}

/// Share flow that logs the shared text
#[derive(Debug, Default, Clone)]
pub struct LogShareSheet;

impl ShareSheet for LogShareSheet {
    fn share_text(&self, chooser_title: &str, text: &str) -> Result<()> {
        info!(chooser = chooser_title, text, "Share requested");
        Ok(())
    }
}

/// Opens URLs with the platform's default handler
#[derive(Debug, Clone)]
pub struct SystemBrowser {
    program: String,
    leading_args: Vec<String>,
}

impl SystemBrowser {
    pub fn new() -> Self {
        let (program, leading_args): (&str, &[&str]) = if cfg!(target_os = "macos") {
            ("open", &[])
        } else if cfg!(target_os = "windows") {
            ("cmd", &["/C", "start", ""])
        } else {
            ("xdg-open", &[])
        };

        Self {
            program: program.to_string(),
            leading_args: leading_args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Use a specific opener program, invoked as `program <url>`
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }
}

impl Default for SystemBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalBrowser for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        Command::new(&self.program)
            .args(&self.leading_args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("No browser available ({}): {}", self.program, e))
            })?;

        debug!(url, program = %self.program, "Opened external browser");
        Ok(())
    }
}

/// Device identity derived from the build target
#[derive(Debug, Clone)]
pub struct HostDeviceInfo {
    descriptor: DeviceDescriptor,
}

impl HostDeviceInfo {
    pub fn detect() -> Self {
        Self {
            descriptor: DeviceDescriptor {
                brand: std::env::consts::FAMILY.to_string(),
                model: std::env::consts::ARCH.to_string(),
                os_version: std::env::consts::OS.to_string(),
                api_level: 0,
            },
        }
    }

    pub fn with_descriptor(descriptor: DeviceDescriptor) -> Self {
        Self { descriptor }
    }
}

impl Default for HostDeviceInfo {
    fn default() -> Self {
        Self::detect()
    }
}

impl DeviceInfoProvider for HostDeviceInfo {
    fn descriptor(&self) -> DeviceDescriptor {
        self.descriptor.clone()
    }
}

/// Remembers the requested display mode; a windowing host reads it back
#[derive(Debug, Default)]
pub struct WindowDisplay {
    mode: Mutex<DisplayMode>,
}

impl WindowDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DisplayMode {
        *self.mode.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl DisplayController for WindowDisplay {
    fn apply(&self, mode: DisplayMode) -> Result<()> {
        *self.mode.lock().unwrap_or_else(|p| p.into_inner()) = mode;
        debug!(
            immersive = mode.immersive,
            keep_screen_on = mode.keep_screen_on,
            "Display mode applied"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_opener_is_not_available() {
        let browser = SystemBrowser::with_program("definitely-not-a-browser-binary");
        let err = browser.open("https://example.com").unwrap_err();
        assert!(matches!(err, BridgeError::NotAvailable(_)));
    }

    #[test]
    fn test_empty_waveform_rejected() {
        assert!(TracingHaptics.vibrate_waveform(&[]).is_err());
        assert!(TracingHaptics.vibrate_waveform(&[0, 100, 50, 100]).is_ok());
    }

    #[test]
    fn test_window_display_remembers_mode() {
        let display = WindowDisplay::new();
        let mode = DisplayMode {
            immersive: true,
            keep_screen_on: true,
        };
        display.apply(mode).unwrap();
        assert_eq!(display.mode(), mode);
    }

    #[test]
    fn test_host_descriptor_is_populated() {
        let descriptor = HostDeviceInfo::detect().descriptor();
        assert!(!descriptor.model.is_empty());
        assert!(!descriptor.os_version.is_empty());
    }
}
