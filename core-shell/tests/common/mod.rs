//! Recording host fakes for orchestrator tests

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_desktop::{
    HostDeviceInfo, LogShareSheet, SqliteSettingsStore, TokioUiDispatcher, TracingHaptics,
    WindowDisplay,
};
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{
    ActiveNetwork, ContentRenderer, Dialogs, ExternalBrowser, MenuChoice, NetworkCapability,
    NetworkChange, NetworkChangeStream, NetworkId, NetworkMonitor, NetworkType, Notifier, Prompt,
    PromptChoice, RendererClient, RendererFactory, RendererId, RendererSettings, ScriptInterface,
    ShellChrome,
};
use core_runtime::config::{ShellConfig, TimingConfig};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Notify};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PageState {
    url: Option<String>,
    history: Vec<String>,
    loads: Vec<String>,
    client: Option<Arc<dyn RendererClient>>,
    paused: bool,
    destroyed: bool,
}

/// Renderer that "loads" every URL instantly and records what it was asked
/// to do.
pub struct FakeRenderer {
    id: RendererId,
    state: Mutex<PageState>,
}

impl FakeRenderer {
    fn new() -> Self {
        Self {
            id: RendererId(NEXT_ID.fetch_add(1, Ordering::SeqCst)),
            state: Mutex::new(PageState::default()),
        }
    }

    /// Every URL passed to `load_url`, blank placeholders included
    pub fn loads(&self) -> Vec<String> {
        self.state.lock().unwrap().loads.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().unwrap().destroyed
    }

    fn check(&self) -> Result<()> {
        if self.state.lock().unwrap().destroyed {
            Err(BridgeError::RendererDestroyed)
        } else {
            Ok(())
        }
    }

    fn navigate(&self, url: &str) -> Option<Arc<dyn RendererClient>> {
        let mut state = self.state.lock().unwrap();
        state.url = Some(url.to_string());
        state.history.push(url.to_string());
        state.client.clone()
    }
}

#[async_trait]
impl ContentRenderer for FakeRenderer {
    fn id(&self) -> RendererId {
        self.id
    }

    async fn apply_settings(&self, _settings: &RendererSettings) -> Result<()> {
        self.check()
    }

    async fn default_user_agent(&self) -> Result<String> {
        Ok("FakeRenderer/1.0".to_string())
    }

    async fn set_client(&self, client: Option<Arc<dyn RendererClient>>) -> Result<()> {
        self.check()?;
        self.state.lock().unwrap().client = client;
        Ok(())
    }

    async fn add_script_interface(
        &self,
        _namespace: &str,
        _interface: Arc<dyn ScriptInterface>,
    ) -> Result<()> {
        self.check()
    }

    async fn load_url(&self, url: &str) -> Result<()> {
        self.check()?;
        self.state.lock().unwrap().loads.push(url.to_string());
        if let Some(client) = self.navigate(url) {
            client.on_page_started(url);
            client.on_progress_changed(100);
            client.on_page_finished(url);
        }
        Ok(())
    }

    async fn load_html(&self, _html: &str) -> Result<()> {
        self.check()?;
        let url = "data:text/html";
        if let Some(client) = self.navigate(url) {
            client.on_page_started(url);
            client.on_page_finished(url);
        }
        Ok(())
    }

    async fn evaluate_script(&self, _script: &str) -> Result<()> {
        self.check()
    }

    async fn current_url(&self) -> Option<String> {
        self.state.lock().unwrap().url.clone()
    }

    async fn stop_loading(&self) -> Result<()> {
        self.check()
    }

    async fn set_javascript_enabled(&self, _enabled: bool) -> Result<()> {
        self.check()
    }

    async fn clear_history(&self) -> Result<()> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let current = state.history.pop();
        state.history.clear();
        state.history.extend(current);
        Ok(())
    }

    async fn history_len(&self) -> usize {
        self.state.lock().unwrap().history.len()
    }

    async fn can_go_back(&self) -> bool {
        self.state.lock().unwrap().history.len() > 1
    }

    async fn go_back(&self) -> Result<()> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.history.pop();
        state.url = state.history.last().cloned();
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.check()?;
        self.state.lock().unwrap().paused = true;
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.check()?;
        self.state.lock().unwrap().paused = false;
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.destroyed = true;
        state.url = None;
        state.client = None;
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRendererFactory {
    created: Mutex<Vec<Arc<FakeRenderer>>>,
    failures: Mutex<u32>,
}

impl FakeRendererFactory {
    /// Fail the next `n` creations
    pub fn fail_next(&self, n: u32) {
        *self.failures.lock().unwrap() = n;
    }

    pub fn created(&self) -> Vec<Arc<FakeRenderer>> {
        self.created.lock().unwrap().clone()
    }

    /// Non-placeholder loads across every renderer
    pub fn content_loads(&self) -> Vec<String> {
        self.created()
            .iter()
            .flat_map(|r| r.loads())
            .filter(|url| !url.starts_with("about:"))
            .collect()
    }
}

#[async_trait]
impl RendererFactory for FakeRendererFactory {
    async fn create(&self) -> Result<Arc<dyn ContentRenderer>> {
        {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(BridgeError::OperationFailed("renderer unavailable".to_string()));
            }
        }
        let renderer = Arc::new(FakeRenderer::new());
        self.created.lock().unwrap().push(renderer.clone());
        Ok(renderer)
    }
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeNetwork {
    online: AtomicBool,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<NetworkChange>>>,
}

impl FakeNetwork {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        let id = NetworkId::new("wlan0");
        let change = if online {
            NetworkChange::Available(id)
        } else {
            NetworkChange::Lost(id)
        };
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(change.clone()).is_ok());
    }

    /// Change reachability without notifying subscribers
    pub fn set_online_quietly(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }
}

struct ChannelStream(mpsc::UnboundedReceiver<NetworkChange>);

#[async_trait]
impl NetworkChangeStream for ChannelStream {
    async fn next(&mut self) -> Option<NetworkChange> {
        self.0.recv().await
    }
}

#[async_trait]
impl NetworkMonitor for FakeNetwork {
    async fn active_network(&self) -> Result<Option<ActiveNetwork>> {
        if self.online.load(Ordering::SeqCst) {
            Ok(Some(
                ActiveNetwork::new(NetworkId::new("wlan0"), NetworkType::WiFi)
                    .with_capability(NetworkCapability::Internet),
            ))
        } else {
            Ok(None)
        }
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn NetworkChangeStream>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        Ok(Box::new(ChannelStream(rx)))
    }
}

// ---------------------------------------------------------------------------
// Dialogs, chrome, browser, notices
// ---------------------------------------------------------------------------

/// Answers prompts from a script. A retry/exit prompt with no scripted
/// answer stays open until one is supplied, like a user who has not tapped
/// yet.
#[derive(Default)]
pub struct ScriptedDialogs {
    answers: Mutex<VecDeque<PromptChoice>>,
    answered: Notify,
    menu: Mutex<Option<MenuChoice>>,
    confirm: AtomicBool,
    prompts: Mutex<Vec<Prompt>>,
    alerts: Mutex<Vec<Prompt>>,
    menus_shown: Mutex<u32>,
}

impl ScriptedDialogs {
    pub fn answer(&self, choice: PromptChoice) {
        self.answers.lock().unwrap().push_back(choice);
        self.answered.notify_one();
    }

    pub fn menu_choice(&self, choice: MenuChoice) {
        *self.menu.lock().unwrap() = Some(choice);
    }

    pub fn confirm_exit_with(&self, confirm: bool) {
        self.confirm.store(confirm, Ordering::SeqCst);
    }

    pub fn prompt_titles(&self) -> Vec<String> {
        self.prompts.lock().unwrap().iter().map(|p| p.title.clone()).collect()
    }

    pub fn alert_titles(&self) -> Vec<String> {
        self.alerts.lock().unwrap().iter().map(|p| p.title.clone()).collect()
    }

    pub fn menus_shown(&self) -> u32 {
        *self.menus_shown.lock().unwrap()
    }
}

#[async_trait]
impl Dialogs for ScriptedDialogs {
    async fn retry_or_exit(&self, prompt: &Prompt) -> PromptChoice {
        self.prompts.lock().unwrap().push(prompt.clone());
        loop {
            let answer = self.answers.lock().unwrap().pop_front();
            if let Some(choice) = answer {
                return choice;
            }
            self.answered.notified().await;
        }
    }

    async fn game_menu(&self) -> MenuChoice {
        *self.menus_shown.lock().unwrap() += 1;
        self.menu.lock().unwrap().unwrap_or(MenuChoice::Cancel)
    }

    async fn confirm_exit(&self) -> bool {
        self.confirm.load(Ordering::SeqCst)
    }

    async fn alert(&self, prompt: &Prompt) {
        self.alerts.lock().unwrap().push(prompt.clone());
    }
}

#[derive(Default)]
pub struct RecordingChrome {
    calls: Mutex<Vec<String>>,
}

impl RecordingChrome {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn splash_progress(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("splash:"))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ShellChrome for RecordingChrome {
    fn show_splash(&self) {
        self.record("splash".to_string());
    }

    fn set_splash_progress(&self, percent: u8) {
        self.record(format!("splash:{}", percent));
    }

    fn set_loading_overlay(&self, visible: bool) {
        self.record(format!("overlay:{}", visible));
    }

    fn set_page_progress(&self, percent: Option<u8>) {
        self.record(format!("progress:{:?}", percent));
    }

    fn show_help_affordance(&self) {
        self.record("help".to_string());
    }
}

#[derive(Default)]
pub struct FakeBrowser {
    missing: AtomicBool,
    opened: Mutex<Vec<String>>,
}

impl FakeBrowser {
    pub fn missing() -> Self {
        Self {
            missing: AtomicBool::new(true),
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl ExternalBrowser for FakeBrowser {
    fn open(&self, url: &str) -> Result<()> {
        if self.missing.load(Ordering::SeqCst) {
            return Err(BridgeError::NotAvailable("no browser".to_string()));
        }
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show_notice(&self, message: &str) -> Result<()> {
        self.notices.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Host {
    pub factory: Arc<FakeRendererFactory>,
    pub network: Arc<FakeNetwork>,
    pub dialogs: Arc<ScriptedDialogs>,
    pub chrome: Arc<RecordingChrome>,
    pub browser: Arc<FakeBrowser>,
    pub notifier: Arc<RecordingNotifier>,
    pub display: Arc<WindowDisplay>,
    pub ui: Arc<TokioUiDispatcher>,
}

impl Host {
    pub fn new(online: bool) -> Self {
        Self {
            factory: Arc::new(FakeRendererFactory::default()),
            network: Arc::new(FakeNetwork::new(online)),
            dialogs: Arc::new(ScriptedDialogs::default()),
            chrome: Arc::new(RecordingChrome::default()),
            browser: Arc::new(FakeBrowser::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            display: Arc::new(WindowDisplay::new()),
            ui: Arc::new(TokioUiDispatcher::spawn()),
        }
    }

    pub fn without_browser(mut self) -> Self {
        self.browser = Arc::new(FakeBrowser::missing());
        self
    }

    pub async fn config(&self) -> ShellConfig {
        let namespace = format!("test-{}", uuid::Uuid::new_v4());
        let store = SqliteSettingsStore::in_memory(namespace.clone()).await.unwrap();

        ShellConfig::builder()
            .timing(TimingConfig::default())
            .store_namespace(namespace)
            .data_dir(std::env::temp_dir().join(format!("shell-test-{}", uuid::Uuid::new_v4())))
            .settings_store(Arc::new(store))
            .network_monitor(self.network.clone())
            .renderer_factory(self.factory.clone())
            .haptics(Arc::new(TracingHaptics))
            .share_sheet(Arc::new(LogShareSheet))
            .notifier(self.notifier.clone())
            .browser(self.browser.clone())
            .device_info(Arc::new(HostDeviceInfo::default()))
            .display(self.display.clone())
            .dialogs(self.dialogs.clone())
            .chrome(self.chrome.clone())
            .ui_dispatcher(self.ui.clone())
            .build()
            .await
            .unwrap()
    }

    /// Let queued UI jobs, and the jobs they queue, run to completion
    pub async fn settle(&self) {
        for _ in 0..5 {
            self.ui.idle().await;
            tokio::task::yield_now().await;
        }
    }
}

/// Poll `check` until it holds, failing the test after about two seconds
pub async fn eventually(what: &str, check: impl Fn() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {}", what);
}

/// Every lifecycle event published so far
pub fn drain_lifecycle(
    rx: &mut core_runtime::events::Receiver<core_runtime::events::ShellEvent>,
) -> Vec<core_runtime::events::LifecycleEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let core_runtime::events::ShellEvent::Lifecycle(event) = event {
            seen.push(event);
        }
    }
    seen
}
