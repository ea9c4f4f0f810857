//! # Shell Configuration
//!
//! Provides configuration management for the game shell.
//!
//! ## Overview
//!
//! The configuration system uses a builder to construct a [`ShellConfig`]
//! holding every host bridge the shell needs plus its content and timing
//! settings. Validation is fail-fast: a missing bridge or an inconsistent
//! URL is reported at build time with an actionable message, never at the
//! first use.
//!
//! ## Required Bridges
//!
//! `SettingsStore`, `NetworkMonitor`, `RendererFactory`, `Haptics`,
//! `ShareSheet`, `Notifier`, `ExternalBrowser`, `DeviceInfoProvider`,
//! `DisplayController`, `Dialogs`, `ShellChrome` and `UiDispatcher`.
//!
//! When the `desktop-shims` feature is enabled, desktop implementations from
//! `bridge-desktop` are injected for any bridge that was not provided. Without
//! it, a missing bridge fails with [`Error::CapabilityMissing`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::ShellConfig;
//! use std::sync::Arc;
//!
//! let config = ShellConfig::builder()
//!     .data_dir("/data/love-money")
//!     .settings_store(Arc::new(MySettingsStore))
//!     .renderer_factory(Arc::new(MyWebViewFactory))
//!     // ... remaining bridges
//!     .build()
//!     .await?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    Clock, DeviceInfoProvider, Dialogs, DisplayController, ExternalBrowser, Haptics,
    NetworkMonitor, Notifier, RendererFactory, SettingsStore, ShareSheet, ShellChrome,
    SystemClock, UiDispatcher,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Upper bound for every configurable delay
const MAX_DELAY: Duration = Duration::from_secs(60);

/// What the shell hosts and how it identifies itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSettings {
    /// Entry point of the hosted game
    pub content_url: String,
    /// Host whose pages load inside the surface
    pub content_host: String,
    /// Tutorial/help page, always opened in the external browser
    pub help_url: String,
    /// Host whose pages are always delegated externally
    pub help_host: String,
    /// Global script object the native bridge is exposed as
    pub bridge_namespace: String,
    /// Appended to the renderer's default user agent after a space
    pub user_agent_suffix: String,
    /// Reported by `getDeviceInfo` and in crash reports
    pub app_version: String,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            content_url: "https://bloodmoneygame.io/game/bloodmoney/".to_string(),
            content_host: "bloodmoneygame.io".to_string(),
            help_url: "https://lovemoney-game.com".to_string(),
            help_host: "lovemoney-game.com".to_string(),
            bridge_namespace: "LoveMoneyNative".to_string(),
            user_agent_suffix: "LoveMoneyApp/1.0".to_string(),
            app_version: "1.0.0".to_string(),
        }
    }
}

impl ContentSettings {
    pub fn validate(&self) -> Result<()> {
        check_url_host("content_url", &self.content_url, &self.content_host)?;
        check_url_host("help_url", &self.help_url, &self.help_host)?;

        if self.content_host.eq_ignore_ascii_case(&self.help_host) {
            return Err(Error::Config(
                "content_host and help_host must differ: a host cannot be both loaded in-surface and delegated".to_string(),
            ));
        }

        if !is_script_identifier(&self.bridge_namespace) {
            return Err(Error::Config(format!(
                "bridge_namespace '{}' is not a valid script identifier",
                self.bridge_namespace
            )));
        }

        if self.user_agent_suffix.trim().is_empty() {
            return Err(Error::Config(
                "user_agent_suffix cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_url_host(field: &str, raw: &str, expected_host: &str) -> Result<()> {
    let parsed = Url::parse(raw)
        .map_err(|e| Error::Config(format!("{} '{}' is not a valid URL: {}", field, raw, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "{} must use http or https, got '{}'",
            field,
            parsed.scheme()
        )));
    }

    match parsed.host_str() {
        Some(host) if host.eq_ignore_ascii_case(expected_host) => Ok(()),
        other => Err(Error::Config(format!(
            "{} host {:?} does not match configured host '{}'",
            field, other, expected_host
        ))),
    }
}

fn is_script_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Fixed delays of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Splash to content transition
    pub splash_duration: Duration,
    /// Page finished to overlay hidden
    pub settle_delay: Duration,
    /// Pause after writing a crash record before terminating
    pub crash_grace: Duration,
    /// Delay before the first splash progress step
    pub splash_progress_delay: Duration,
    pub splash_progress_interval: Duration,
    /// Percent added per splash progress step
    pub splash_progress_step: u8,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            splash_duration: Duration::from_millis(2500),
            settle_delay: Duration::from_millis(500),
            crash_grace: Duration::from_millis(1000),
            splash_progress_delay: Duration::from_millis(500),
            splash_progress_interval: Duration::from_millis(200),
            splash_progress_step: 10,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<()> {
        let delays = [
            ("splash_duration", self.splash_duration),
            ("settle_delay", self.settle_delay),
            ("crash_grace", self.crash_grace),
            ("splash_progress_delay", self.splash_progress_delay),
            ("splash_progress_interval", self.splash_progress_interval),
        ];

        for (name, delay) in delays {
            if delay > MAX_DELAY {
                return Err(Error::Config(format!(
                    "{} of {:?} exceeds maximum of 60 seconds",
                    name, delay
                )));
            }
        }

        if self.splash_progress_interval.is_zero() {
            return Err(Error::Config(
                "splash_progress_interval must be greater than 0".to_string(),
            ));
        }

        if self.splash_progress_step == 0 || self.splash_progress_step > 100 {
            return Err(Error::Config(
                "splash_progress_step must be between 1 and 100".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of progress steps needed to reach 100 %
    pub fn splash_progress_steps(&self) -> u32 {
        let step = u32::from(self.splash_progress_step.max(1));
        100u32.div_ceil(step)
    }
}

/// Complete shell configuration.
///
/// Use [`ShellConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct ShellConfig {
    pub content: ContentSettings,
    pub timing: TimingConfig,

    /// Root for persisted state; the settings database lives here
    pub data_dir: PathBuf,
    /// Directory crash records are written to
    pub crash_dir: PathBuf,
    /// Namespace of the game's persisted key-value store
    pub store_namespace: String,

    pub settings_store: Arc<dyn SettingsStore>,
    pub network_monitor: Arc<dyn NetworkMonitor>,
    pub renderer_factory: Arc<dyn RendererFactory>,
    pub haptics: Arc<dyn Haptics>,
    pub share_sheet: Arc<dyn ShareSheet>,
    pub notifier: Arc<dyn Notifier>,
    pub browser: Arc<dyn ExternalBrowser>,
    pub device_info: Arc<dyn DeviceInfoProvider>,
    pub display: Arc<dyn DisplayController>,
    pub dialogs: Arc<dyn Dialogs>,
    pub chrome: Arc<dyn ShellChrome>,
    pub ui: Arc<dyn UiDispatcher>,
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ShellConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellConfig")
            .field("content", &self.content)
            .field("timing", &self.timing)
            .field("data_dir", &self.data_dir)
            .field("crash_dir", &self.crash_dir)
            .field("store_namespace", &self.store_namespace)
            .field("settings_store", &self.settings_store.namespace())
            .finish_non_exhaustive()
    }
}

impl ShellConfig {
    pub fn builder() -> ShellConfigBuilder {
        ShellConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.content.validate()?;
        self.timing.validate()?;

        if self.data_dir.as_os_str().is_empty() {
            return Err(Error::Config("Data directory cannot be empty".to_string()));
        }

        if self.crash_dir.as_os_str().is_empty() {
            return Err(Error::Config("Crash directory cannot be empty".to_string()));
        }

        if self.store_namespace.trim().is_empty() {
            return Err(Error::Config("Store namespace cannot be empty".to_string()));
        }

        if self.settings_store.namespace() != self.store_namespace {
            return Err(Error::Config(format!(
                "Settings store is bound to namespace '{}' but the shell expects '{}'",
                self.settings_store.namespace(),
                self.store_namespace
            )));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn capability_missing(capability: &str, purpose: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required {}. \
             Desktop: enable the 'desktop-shims' feature to use the bridge-desktop default. \
             Mobile: inject the platform-native implementation.",
            capability, purpose
        ),
    }
}

/// Desktop defaults for bridges the host did not provide.
#[cfg(feature = "desktop-shims")]
mod defaults {
    use super::*;
    use bridge_desktop::{
        DesktopNetworkMonitor, HeadlessRendererFactory, HostDeviceInfo, LogNotifier,
        LogShareSheet, SqliteSettingsStore, SystemBrowser, TerminalDialogs, TokioUiDispatcher,
        TracingChrome, TracingHaptics, WindowDisplay,
    };

    pub const APP_DIR_NAME: &str = "love-money-shell";

    pub fn data_dir() -> Result<PathBuf> {
        Ok(bridge_desktop::app_data_dir(APP_DIR_NAME))
    }

    pub async fn settings_store(
        data_dir: &std::path::Path,
        namespace: &str,
    ) -> Result<Arc<dyn SettingsStore>> {
        let path = data_dir.join(format!("{}.db", namespace));
        let store = SqliteSettingsStore::new(path, namespace).await.map_err(|e| {
            Error::Internal(format!("Failed to initialize default SettingsStore: {}", e))
        })?;
        Ok(Arc::new(store))
    }

    pub fn network_monitor() -> Result<Arc<dyn NetworkMonitor>> {
        Ok(Arc::new(DesktopNetworkMonitor::new()))
    }

    pub fn renderer_factory() -> Result<Arc<dyn RendererFactory>> {
        Ok(Arc::new(HeadlessRendererFactory::new()?))
    }

    pub fn haptics() -> Result<Arc<dyn Haptics>> {
        Ok(Arc::new(TracingHaptics))
    }

    pub fn share_sheet() -> Result<Arc<dyn ShareSheet>> {
        Ok(Arc::new(LogShareSheet))
    }

    pub fn notifier() -> Result<Arc<dyn Notifier>> {
        Ok(Arc::new(LogNotifier))
    }

    pub fn browser() -> Result<Arc<dyn ExternalBrowser>> {
        Ok(Arc::new(SystemBrowser::new()))
    }

    pub fn device_info() -> Result<Arc<dyn DeviceInfoProvider>> {
        Ok(Arc::new(HostDeviceInfo::detect()))
    }

    pub fn display() -> Result<Arc<dyn DisplayController>> {
        Ok(Arc::new(WindowDisplay::new()))
    }

    pub fn dialogs() -> Result<Arc<dyn Dialogs>> {
        Ok(Arc::new(TerminalDialogs::new()))
    }

    pub fn chrome() -> Result<Arc<dyn ShellChrome>> {
        Ok(Arc::new(TracingChrome))
    }

    pub fn ui() -> Result<Arc<dyn UiDispatcher>> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(Error::Internal(
                "The default UiDispatcher must be created inside a Tokio runtime".to_string(),
            ));
        }
        Ok(Arc::new(TokioUiDispatcher::spawn()))
    }
}

#[cfg(not(feature = "desktop-shims"))]
mod defaults {
    use super::*;

    pub fn data_dir() -> Result<PathBuf> {
        Err(Error::Config(
            "Data directory is required. Use .data_dir() to set it.".to_string(),
        ))
    }

    pub async fn settings_store(
        _data_dir: &std::path::Path,
        _namespace: &str,
    ) -> Result<Arc<dyn SettingsStore>> {
        Err(capability_missing(
            "SettingsStore",
            "for the game's persisted data (SharedPreferences/UserDefaults)",
        ))
    }

    pub fn network_monitor() -> Result<Arc<dyn NetworkMonitor>> {
        Err(capability_missing("NetworkMonitor", "to gate content loading"))
    }

    pub fn renderer_factory() -> Result<Arc<dyn RendererFactory>> {
        Err(capability_missing(
            "RendererFactory",
            "to create the embedded content renderer",
        ))
    }

    pub fn haptics() -> Result<Arc<dyn Haptics>> {
        Err(capability_missing("Haptics", "for bridge vibration calls"))
    }

    pub fn share_sheet() -> Result<Arc<dyn ShareSheet>> {
        Err(capability_missing("ShareSheet", "for the bridge share call"))
    }

    pub fn notifier() -> Result<Arc<dyn Notifier>> {
        Err(capability_missing("Notifier", "for transient notices"))
    }

    pub fn browser() -> Result<Arc<dyn ExternalBrowser>> {
        Err(capability_missing(
            "ExternalBrowser",
            "to open help and delegated links",
        ))
    }

    pub fn device_info() -> Result<Arc<dyn DeviceInfoProvider>> {
        Err(capability_missing(
            "DeviceInfoProvider",
            "for device info and crash reports",
        ))
    }

    pub fn display() -> Result<Arc<dyn DisplayController>> {
        Err(capability_missing(
            "DisplayController",
            "for fullscreen requests",
        ))
    }

    pub fn dialogs() -> Result<Arc<dyn Dialogs>> {
        Err(capability_missing("Dialogs", "for retry/exit prompts"))
    }

    pub fn chrome() -> Result<Arc<dyn ShellChrome>> {
        Err(capability_missing(
            "ShellChrome",
            "for splash and loading indicators",
        ))
    }

    pub fn ui() -> Result<Arc<dyn UiDispatcher>> {
        Err(capability_missing(
            "UiDispatcher",
            "to reach the UI-owning execution context",
        ))
    }
}

/// Builder for [`ShellConfig`].
///
/// Call [`build()`](ShellConfigBuilder::build) once every required bridge is
/// set (or rely on `desktop-shims`). Building is async because default
/// bridges may open storage or spawn the UI context on the current runtime.
#[derive(Default)]
pub struct ShellConfigBuilder {
    content: Option<ContentSettings>,
    timing: Option<TimingConfig>,
    data_dir: Option<PathBuf>,
    crash_dir: Option<PathBuf>,
    store_namespace: Option<String>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    network_monitor: Option<Arc<dyn NetworkMonitor>>,
    renderer_factory: Option<Arc<dyn RendererFactory>>,
    haptics: Option<Arc<dyn Haptics>>,
    share_sheet: Option<Arc<dyn ShareSheet>>,
    notifier: Option<Arc<dyn Notifier>>,
    browser: Option<Arc<dyn ExternalBrowser>>,
    device_info: Option<Arc<dyn DeviceInfoProvider>>,
    display: Option<Arc<dyn DisplayController>>,
    dialogs: Option<Arc<dyn Dialogs>>,
    chrome: Option<Arc<dyn ShellChrome>>,
    ui: Option<Arc<dyn UiDispatcher>>,
    clock: Option<Arc<dyn Clock>>,
}

/// Default namespace of the game's persisted store
pub const DEFAULT_STORE_NAMESPACE: &str = "LoveMoneyGameData";

impl ShellConfigBuilder {
    /// Replace all content settings at once.
    pub fn content(mut self, content: ContentSettings) -> Self {
        self.content = Some(content);
        self
    }

    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Sets the data directory.
    ///
    /// Default with `desktop-shims`: the platform data directory.
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Sets the crash directory. Default: `<data_dir>/crashes`.
    pub fn crash_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.crash_dir = Some(path.into());
        self
    }

    /// Default: `LoveMoneyGameData`
    pub fn store_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.store_namespace = Some(namespace.into());
        self
    }

    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    pub fn network_monitor(mut self, monitor: Arc<dyn NetworkMonitor>) -> Self {
        self.network_monitor = Some(monitor);
        self
    }

    pub fn renderer_factory(mut self, factory: Arc<dyn RendererFactory>) -> Self {
        self.renderer_factory = Some(factory);
        self
    }

    pub fn haptics(mut self, haptics: Arc<dyn Haptics>) -> Self {
        self.haptics = Some(haptics);
        self
    }

    pub fn share_sheet(mut self, share_sheet: Arc<dyn ShareSheet>) -> Self {
        self.share_sheet = Some(share_sheet);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn browser(mut self, browser: Arc<dyn ExternalBrowser>) -> Self {
        self.browser = Some(browser);
        self
    }

    pub fn device_info(mut self, device_info: Arc<dyn DeviceInfoProvider>) -> Self {
        self.device_info = Some(device_info);
        self
    }

    pub fn display(mut self, display: Arc<dyn DisplayController>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn dialogs(mut self, dialogs: Arc<dyn Dialogs>) -> Self {
        self.dialogs = Some(dialogs);
        self
    }

    pub fn chrome(mut self, chrome: Arc<dyn ShellChrome>) -> Self {
        self.chrome = Some(chrome);
        self
    }

    pub fn ui_dispatcher(mut self, ui: Arc<dyn UiDispatcher>) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Default: [`SystemClock`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the final `ShellConfig`.
    ///
    /// Fails when a required bridge is missing (without `desktop-shims`),
    /// when a default bridge cannot be created, or when validation fails.
    pub async fn build(self) -> Result<ShellConfig> {
        let content = self.content.unwrap_or_default();
        let timing = self.timing.unwrap_or_default();
        // Cheap checks first so a bad URL never opens a database.
        content.validate()?;
        timing.validate()?;

        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => defaults::data_dir()?,
        };
        let crash_dir = self
            .crash_dir
            .unwrap_or_else(|| data_dir.join("crashes"));
        let store_namespace = self
            .store_namespace
            .unwrap_or_else(|| DEFAULT_STORE_NAMESPACE.to_string());

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => defaults::settings_store(&data_dir, &store_namespace).await?,
        };

        let config = ShellConfig {
            content,
            timing,
            data_dir,
            crash_dir,
            store_namespace,
            settings_store,
            network_monitor: take_or(self.network_monitor, defaults::network_monitor)?,
            renderer_factory: take_or(self.renderer_factory, defaults::renderer_factory)?,
            haptics: take_or(self.haptics, defaults::haptics)?,
            share_sheet: take_or(self.share_sheet, defaults::share_sheet)?,
            notifier: take_or(self.notifier, defaults::notifier)?,
            browser: take_or(self.browser, defaults::browser)?,
            device_info: take_or(self.device_info, defaults::device_info)?,
            display: take_or(self.display, defaults::display)?,
            dialogs: take_or(self.dialogs, defaults::dialogs)?,
            chrome: take_or(self.chrome, defaults::chrome)?,
            ui: take_or(self.ui, defaults::ui)?,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        };

        config.validate()?;
        Ok(config)
    }
}

fn take_or<T: ?Sized>(
    provided: Option<Arc<T>>,
    default: impl FnOnce() -> Result<Arc<T>>,
) -> Result<Arc<T>> {
    match provided {
        Some(value) => Ok(value),
        None => default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::device::{DeviceDescriptor, DisplayMode};
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::network::{ActiveNetwork, NetworkChangeStream};
    use bridge_traits::renderer::ContentRenderer;
    use bridge_traits::storage::SettingsTransaction;
    use bridge_traits::ui::{MenuChoice, Prompt, PromptChoice, UiJob};
    use bridge_traits::BridgeError;
    use std::collections::BTreeSet;

    struct NullStore(&'static str);

    #[async_trait]
    impl SettingsStore for NullStore {
        fn namespace(&self) -> &str {
            self.0
        }
        async fn set_string(&self, _: &str, _: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn get_string(&self, _: &str) -> BridgeResult<Option<String>> {
            Ok(None)
        }
        async fn set_bool(&self, _: &str, _: bool) -> BridgeResult<()> {
            Ok(())
        }
        async fn get_bool(&self, _: &str) -> BridgeResult<Option<bool>> {
            Ok(None)
        }
        async fn set_i64(&self, _: &str, _: i64) -> BridgeResult<()> {
            Ok(())
        }
        async fn get_i64(&self, _: &str) -> BridgeResult<Option<i64>> {
            Ok(None)
        }
        async fn set_string_set(&self, _: &str, _: &BTreeSet<String>) -> BridgeResult<()> {
            Ok(())
        }
        async fn get_string_set(&self, _: &str) -> BridgeResult<Option<BTreeSet<String>>> {
            Ok(None)
        }
        async fn delete(&self, _: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn has_key(&self, _: &str) -> BridgeResult<bool> {
            Ok(false)
        }
        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(Vec::new())
        }
        async fn clear_all(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn begin_transaction(&self) -> BridgeResult<Box<dyn SettingsTransaction + Send>> {
            Err(BridgeError::NotAvailable("no transactions".to_string()))
        }
    }

    struct Null;

    #[async_trait]
    impl NetworkMonitor for Null {
        async fn active_network(&self) -> BridgeResult<Option<ActiveNetwork>> {
            Ok(None)
        }
        async fn subscribe_changes(&self) -> BridgeResult<Box<dyn NetworkChangeStream>> {
            Err(BridgeError::NotAvailable("no changes".to_string()))
        }
    }

    #[async_trait]
    impl RendererFactory for Null {
        async fn create(&self) -> BridgeResult<Arc<dyn ContentRenderer>> {
            Err(BridgeError::NotAvailable("no renderer".to_string()))
        }
    }

    impl Haptics for Null {
        fn vibrate(&self, _: Duration) -> BridgeResult<()> {
            Ok(())
        }
        fn vibrate_waveform(&self, _: &[u64]) -> BridgeResult<()> {
            Ok(())
        }
    }

    impl ShareSheet for Null {
        fn share_text(&self, _: &str, _: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    impl Notifier for Null {
        fn show_notice(&self, _: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    impl ExternalBrowser for Null {
        fn open(&self, _: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    impl DeviceInfoProvider for Null {
        fn descriptor(&self) -> DeviceDescriptor {
            DeviceDescriptor {
                brand: "Test".to_string(),
                model: "Device".to_string(),
                os_version: "1".to_string(),
                api_level: 1,
            }
        }
    }

    impl DisplayController for Null {
        fn apply(&self, _: DisplayMode) -> BridgeResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl Dialogs for Null {
        async fn retry_or_exit(&self, _: &Prompt) -> PromptChoice {
            PromptChoice::Exit
        }
        async fn game_menu(&self) -> MenuChoice {
            MenuChoice::Cancel
        }
        async fn confirm_exit(&self) -> bool {
            false
        }
        async fn alert(&self, _: &Prompt) {}
    }

    impl ShellChrome for Null {
        fn show_splash(&self) {}
        fn set_splash_progress(&self, _: u8) {}
        fn set_loading_overlay(&self, _: bool) {}
        fn set_page_progress(&self, _: Option<u8>) {}
        fn show_help_affordance(&self) {}
    }

    impl UiDispatcher for Null {
        fn dispatch(&self, _: UiJob) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn complete_builder() -> ShellConfigBuilder {
        let null = Arc::new(Null);
        ShellConfig::builder()
            .data_dir("/data/shell")
            .settings_store(Arc::new(NullStore(DEFAULT_STORE_NAMESPACE)))
            .network_monitor(null.clone())
            .renderer_factory(null.clone())
            .haptics(null.clone())
            .share_sheet(null.clone())
            .notifier(null.clone())
            .browser(null.clone())
            .device_info(null.clone())
            .display(null.clone())
            .dialogs(null.clone())
            .chrome(null.clone())
            .ui_dispatcher(null)
    }

    #[tokio::test]
    async fn test_build_with_all_bridges_applies_defaults() {
        let config = complete_builder().build().await.unwrap();

        assert_eq!(config.content, ContentSettings::default());
        assert_eq!(config.timing.splash_duration, Duration::from_millis(2500));
        assert_eq!(config.timing.settle_delay, Duration::from_millis(500));
        assert_eq!(config.timing.crash_grace, Duration::from_millis(1000));
        assert_eq!(config.crash_dir, PathBuf::from("/data/shell/crashes"));
        assert_eq!(config.store_namespace, "LoveMoneyGameData");
    }

    #[tokio::test]
    async fn test_custom_crash_dir_is_kept() {
        let config = complete_builder()
            .crash_dir("/cache/crashes")
            .build()
            .await
            .unwrap();
        assert_eq!(config.crash_dir, PathBuf::from("/cache/crashes"));
    }

    #[tokio::test]
    async fn test_rejects_content_url_on_foreign_host() {
        let content = ContentSettings {
            content_url: "https://example.com/game/".to_string(),
            ..ContentSettings::default()
        };
        let err = complete_builder().content(content).build().await.unwrap_err();
        assert!(err.to_string().contains("content_url host"));
    }

    #[tokio::test]
    async fn test_rejects_unparseable_help_url() {
        let content = ContentSettings {
            help_url: "not a url".to_string(),
            ..ContentSettings::default()
        };
        let err = complete_builder().content(content).build().await.unwrap_err();
        assert!(err.to_string().contains("help_url"));
    }

    #[tokio::test]
    async fn test_rejects_bad_namespace_identifier() {
        let content = ContentSettings {
            bridge_namespace: "9Native-Bridge".to_string(),
            ..ContentSettings::default()
        };
        let err = complete_builder().content(content).build().await.unwrap_err();
        assert!(err.to_string().contains("bridge_namespace"));
    }

    #[tokio::test]
    async fn test_rejects_excessive_delay() {
        let timing = TimingConfig {
            splash_duration: Duration::from_secs(120),
            ..TimingConfig::default()
        };
        let err = complete_builder().timing(timing).build().await.unwrap_err();
        assert!(err.to_string().contains("splash_duration"));
    }

    #[tokio::test]
    async fn test_rejects_store_namespace_mismatch() {
        let err = complete_builder()
            .store_namespace("OtherGame")
            .build()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("namespace"));
    }

    #[test]
    fn test_progress_steps() {
        assert_eq!(TimingConfig::default().splash_progress_steps(), 10);
        let uneven = TimingConfig {
            splash_progress_step: 30,
            ..TimingConfig::default()
        };
        assert_eq!(uneven.splash_progress_steps(), 4);
    }

    #[test]
    fn test_script_identifier() {
        assert!(is_script_identifier("LoveMoneyNative"));
        assert!(is_script_identifier("_bridge$"));
        assert!(!is_script_identifier(""));
        assert!(!is_script_identifier("with space"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[tokio::test]
    async fn test_missing_renderer_factory_is_capability_missing() {
        let null = Arc::new(Null);
        let result = ShellConfig::builder()
            .data_dir("/data/shell")
            .settings_store(Arc::new(NullStore(DEFAULT_STORE_NAMESPACE)))
            .network_monitor(null)
            .build()
            .await;

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "RendererFactory")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[cfg(feature = "desktop-shims")]
    #[tokio::test]
    async fn test_desktop_defaults_fill_missing_bridges() {
        let base = std::env::temp_dir().join(format!("shell-config-{}", uuid::Uuid::new_v4()));

        let config = ShellConfig::builder()
            .data_dir(&base)
            .build()
            .await
            .expect("desktop defaults should succeed");

        config.settings_store.set_string("probe", "ok").await.unwrap();
        assert_eq!(
            config.settings_store.get_string("probe").await.unwrap().as_deref(),
            Some("ok")
        );
        assert!(base.join("LoveMoneyGameData.db").exists());

        drop(config);
        let _ = tokio::fs::remove_dir_all(&base).await;
    }
}
