//! Headless Content Renderer
//!
//! A renderer without a display: navigations are probed over HTTP with
//! `reqwest` and reported through the installed [`RendererClient`] the way a
//! real webview reports them. Script is recorded rather than executed, and
//! calls into registered script interfaces can be driven by the host through
//! [`HeadlessRenderer::call_interface`].

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    renderer::{
        BridgeCall, ContentRenderer, LoadError, LoadErrorKind, RendererClient, RendererFactory,
        RendererId, RendererSettings, ScriptInterface,
    },
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const HEADLESS_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) HeadlessShell/0.1";
const INLINE_DOCUMENT_URL: &str = "data:text/html";

static NEXT_RENDERER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
struct HeadlessState {
    settings: RendererSettings,
    client: Option<Arc<dyn RendererClient>>,
    interfaces: HashMap<String, Arc<dyn ScriptInterface>>,
    history: Vec<String>,
    evaluated_scripts: Vec<String>,
    in_flight: Option<JoinHandle<()>>,
    paused: bool,
    destroyed: bool,
}

/// Display-less renderer backed by HTTP probes
pub struct HeadlessRenderer {
    id: RendererId,
    http: reqwest::Client,
    state: Mutex<HeadlessState>,
}

impl HeadlessRenderer {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            id: RendererId(NEXT_RENDERER_ID.fetch_add(1, Ordering::Relaxed)),
            http,
            state: Mutex::new(HeadlessState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        // A poisoned lock only means another caller panicked mid-update; the
        // state itself stays usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn live(&self) -> Result<MutexGuard<'_, HeadlessState>> {
        let state = self.lock();
        if state.destroyed {
            return Err(BridgeError::RendererDestroyed);
        }
        Ok(state)
    }

    /// Settings most recently applied
    pub fn settings(&self) -> RendererSettings {
        self.lock().settings.clone()
    }

    /// Scripts passed to `evaluate_script`, oldest first
    pub fn evaluated_scripts(&self) -> Vec<String> {
        self.lock().evaluated_scripts.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    pub fn is_destroyed(&self) -> bool {
        self.lock().destroyed
    }

    /// Invoke `namespace.method(args)` as hosted script would.
    pub async fn call_interface(&self, namespace: &str, call: BridgeCall) -> Result<Value> {
        let interface = {
            let state = self.live()?;
            if !state.settings.javascript_enabled {
                return Err(BridgeError::NotAvailable(
                    "Script execution is disabled".to_string(),
                ));
            }
            state.interfaces.get(namespace).cloned().ok_or_else(|| {
                BridgeError::NotAvailable(format!("No script interface named '{}'", namespace))
            })?
        };
        Ok(interface.invoke(call).await)
    }

    /// Simulate a navigation started by the page itself (link click,
    /// `location.href`). The installed client may cancel it.
    ///
    /// Returns `true` when the renderer went on to load `url`.
    pub async fn navigate_from_content(&self, url: &str) -> Result<bool> {
        let client = self.live()?.client.clone();
        if let Some(client) = client {
            if client.should_override_url_loading(url) {
                debug!(renderer = self.id.0, url, "Navigation overridden by client");
                return Ok(false);
            }
        }
        self.load_url(url).await?;
        Ok(true)
    }

    fn begin_navigation(&self, url: &str) -> Result<Option<Arc<dyn RendererClient>>> {
        let mut state = self.live()?;
        if let Some(previous) = state.in_flight.take() {
            previous.abort();
        }
        state.history.push(url.to_string());
        Ok(state.client.clone())
    }

    fn complete_inline(client: Option<Arc<dyn RendererClient>>, url: &str) {
        if let Some(client) = client {
            client.on_page_started(url);
            client.on_progress_changed(100);
            client.on_page_finished(url);
        }
    }
}

async fn probe(http: reqwest::Client, client: Option<Arc<dyn RendererClient>>, url: String) {
    if let Some(client) = &client {
        client.on_page_started(&url);
        client.on_progress_changed(10);
    }

    let outcome = http.get(&url).send().await;

    let Some(client) = client else {
        return;
    };

    match outcome {
        Ok(response) if response.status().is_success() => {
            client.on_progress_changed(100);
            client.on_page_finished(&url);
        }
        Ok(response) => {
            let status = response.status();
            client.on_received_error(LoadError {
                url: Some(url.clone()),
                kind: LoadErrorKind::HttpStatus(status.as_u16()),
                description: status.to_string(),
                is_main_frame: true,
            });
            client.on_page_finished(&url);
        }
        Err(err) => {
            let kind = if err.is_connect() || err.is_timeout() {
                LoadErrorKind::HostUnreachable
            } else {
                LoadErrorKind::Network
            };
            client.on_received_error(LoadError {
                url: Some(url.clone()),
                kind,
                description: err.to_string(),
                is_main_frame: true,
            });
            client.on_page_finished(&url);
        }
    }
}

#[async_trait]
impl ContentRenderer for HeadlessRenderer {
    fn id(&self) -> RendererId {
        self.id
    }

    async fn apply_settings(&self, settings: &RendererSettings) -> Result<()> {
        self.live()?.settings = settings.clone();
        debug!(renderer = self.id.0, "Applied renderer settings");
        Ok(())
    }

    async fn default_user_agent(&self) -> Result<String> {
        self.live()?;
        Ok(HEADLESS_USER_AGENT.to_string())
    }

    async fn set_client(&self, client: Option<Arc<dyn RendererClient>>) -> Result<()> {
        self.live()?.client = client;
        Ok(())
    }

    async fn add_script_interface(
        &self,
        namespace: &str,
        interface: Arc<dyn ScriptInterface>,
    ) -> Result<()> {
        self.live()?
            .interfaces
            .insert(namespace.to_string(), interface);
        Ok(())
    }

    async fn load_url(&self, url: &str) -> Result<()> {
        let client = self.begin_navigation(url)?;

        if url.starts_with("about:") {
            Self::complete_inline(client, url);
            return Ok(());
        }

        let task = tokio::spawn(probe(self.http.clone(), client, url.to_string()));
        self.lock().in_flight = Some(task);
        Ok(())
    }

    async fn load_html(&self, html: &str) -> Result<()> {
        let client = self.begin_navigation(INLINE_DOCUMENT_URL)?;
        debug!(renderer = self.id.0, bytes = html.len(), "Loaded inline document");
        Self::complete_inline(client, INLINE_DOCUMENT_URL);
        Ok(())
    }

    async fn evaluate_script(&self, script: &str) -> Result<()> {
        let mut state = self.live()?;
        if !state.settings.javascript_enabled {
            warn!(renderer = self.id.0, "Ignoring script while execution is disabled");
            return Ok(());
        }
        state.evaluated_scripts.push(script.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Option<String> {
        let state = self.lock();
        if state.destroyed {
            return None;
        }
        state.history.last().cloned()
    }

    async fn stop_loading(&self) -> Result<()> {
        if let Some(task) = self.live()?.in_flight.take() {
            task.abort();
        }
        Ok(())
    }

    async fn set_javascript_enabled(&self, enabled: bool) -> Result<()> {
        self.live()?.settings.javascript_enabled = enabled;
        Ok(())
    }

    async fn clear_history(&self) -> Result<()> {
        let mut state = self.live()?;
        // The current entry survives a history clear.
        let current = state.history.pop();
        state.history.clear();
        state.history.extend(current);
        Ok(())
    }

    async fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    async fn can_go_back(&self) -> bool {
        let state = self.lock();
        !state.destroyed && state.history.len() > 1
    }

    async fn go_back(&self) -> Result<()> {
        let (client, url) = {
            let mut state = self.live()?;
            if state.history.len() < 2 {
                return Ok(());
            }
            state.history.pop();
            (state.client.clone(), state.history.last().cloned())
        };

        if let Some(url) = url {
            Self::complete_inline(client, &url);
        }
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.live()?.paused = true;
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.live()?.paused = false;
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        let mut state = self.lock();
        if state.destroyed {
            return Ok(());
        }
        if let Some(task) = state.in_flight.take() {
            task.abort();
        }
        state.client = None;
        state.interfaces.clear();
        state.history.clear();
        state.destroyed = true;
        debug!(renderer = self.id.0, "Renderer destroyed");
        Ok(())
    }
}

/// Factory for [`HeadlessRenderer`] instances sharing one HTTP client
#[derive(Clone)]
pub struct HeadlessRendererFactory {
    http: reqwest::Client,
}

impl HeadlessRendererFactory {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(HEADLESS_USER_AGENT)
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }

    /// Share a preconfigured client
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl RendererFactory for HeadlessRendererFactory {
    async fn create(&self) -> Result<Arc<dyn ContentRenderer>> {
        let renderer: Arc<dyn ContentRenderer> = Arc::new(HeadlessRenderer::new(self.http.clone()));
        Ok(renderer)
    }
}
