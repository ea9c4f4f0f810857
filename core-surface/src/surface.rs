//! The configured content surface and its page lifecycle hooks
//!
//! Renderer callbacks arrive on the renderer's own context. The surface
//! answers navigation checks inline (the policy is pure) and queues every
//! state or chrome change onto the UI context. A generation counter ties
//! each settle timer to the navigation that started it, so a timer from a
//! superseded load never hides the overlay of a newer one.

use crate::error::{Result, SurfaceError};
use crate::handle::RendererHandle;
use crate::page::{injected_script, FALLBACK_PAGE};
use crate::policy::{NavigationDecision, NavigationPolicy};
use crate::settings::{content_settings, user_agent_with_suffix};
use bridge_traits::{
    ContentRenderer, ExternalBrowser, LoadError, Notifier, RendererClient, RendererId,
    ScriptInterface, ShellChrome, UiDispatcher,
};
use core_runtime::config::{ContentSettings, ShellConfig};
use core_runtime::events::{EventBus, ShellEvent, SurfaceEvent};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const NO_BROWSER_NOTICE: &str = "No browser found";

/// What the surface is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// Nothing has been loaded, or the renderer was released
    Unloaded,
    Loading,
    Ready,
    /// The fallback page is shown
    Error,
}

/// Host services and settings the surface needs
#[derive(Clone)]
pub struct SurfaceContext {
    pub content: ContentSettings,
    pub settle_delay: Duration,
    pub chrome: Arc<dyn ShellChrome>,
    pub browser: Arc<dyn ExternalBrowser>,
    pub notifier: Arc<dyn Notifier>,
    pub ui: Arc<dyn UiDispatcher>,
    pub events: Option<EventBus>,
}

impl SurfaceContext {
    pub fn from_config(config: &ShellConfig) -> Self {
        Self {
            content: config.content.clone(),
            settle_delay: config.timing.settle_delay,
            chrome: Arc::clone(&config.chrome),
            browser: Arc::clone(&config.browser),
            notifier: Arc::clone(&config.notifier),
            ui: Arc::clone(&config.ui),
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }
}

struct Shared {
    ctx: SurfaceContext,
    policy: NavigationPolicy,
    script: String,
    handle: Mutex<Option<RendererHandle>>,
    state: Mutex<SurfaceState>,
    generation: AtomicU64,
    /// Set until the first page that is not a blank placeholder finishes.
    /// A promoted spare carries its warm-up entry, which must not become a
    /// back target.
    history_pending_reset: AtomicBool,
}

impl Shared {
    fn handle(&self) -> MutexGuard<'_, Option<RendererHandle>> {
        self.handle.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn renderer(&self) -> Result<Arc<dyn ContentRenderer>> {
        self.handle()
            .as_ref()
            .map(|h| Arc::clone(h.renderer()))
            .ok_or(SurfaceError::Released)
    }

    fn is_attached(&self) -> bool {
        self.handle().is_some()
    }

    fn state(&self) -> SurfaceState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn set_state(&self, state: SurfaceState) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = state;
    }

    fn publish(&self, event: SurfaceEvent) {
        if let Some(events) = &self.ctx.events {
            let _ = events.emit(ShellEvent::Surface(event));
        }
    }

    fn dispatch(&self, what: &str, job: BoxFuture<'static, ()>) {
        if let Err(e) = self.ctx.ui.dispatch(job) {
            warn!(job = what, error = %e, "UI context unavailable");
        }
    }

    /// Apply the allowlist. `true` when the navigation may proceed in-surface.
    fn admit(&self, url: &str) -> bool {
        match self.policy.decide(url) {
            NavigationDecision::Allow => true,
            NavigationDecision::Block => {
                info!(url, "Blocking navigation outside the content domain");
                self.publish(SurfaceEvent::NavigationBlocked {
                    url: url.to_string(),
                });
                false
            }
            NavigationDecision::DelegateExternal(target) => {
                info!(url = %target, "Opening link in external browser");
                if let Err(e) = self.ctx.browser.open(&target) {
                    warn!(url = %target, error = %e, "No browser to delegate to");
                    let notifier = Arc::clone(&self.ctx.notifier);
                    self.dispatch(
                        "no browser notice",
                        async move {
                            if let Err(e) = notifier.show_notice(NO_BROWSER_NOTICE) {
                                debug!(error = %e, "Could not show no-browser notice");
                            }
                        }
                        .boxed(),
                    );
                }
                self.publish(SurfaceEvent::NavigationDelegated { url: target });
                false
            }
        }
    }

    async fn show_error_page(&self) -> Result<()> {
        let renderer = self.renderer()?;
        self.set_state(SurfaceState::Error);
        renderer.load_html(FALLBACK_PAGE).await?;
        self.publish(SurfaceEvent::ErrorPageShown);
        Ok(())
    }
}

/// Renderer callback receiver. Holds the surface weakly so a renderer that
/// outlives its surface keeps nothing alive.
struct SurfaceClient {
    shared: Weak<Shared>,
}

fn is_inline_document(url: &str) -> bool {
    url.starts_with("data:")
}

fn is_placeholder(url: &str) -> bool {
    url.starts_with("about:")
}

impl RendererClient for SurfaceClient {
    fn should_override_url_loading(&self, url: &str) -> bool {
        match self.shared.upgrade() {
            Some(shared) => !shared.admit(url),
            None => true,
        }
    }

    fn on_page_started(&self, url: &str) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        debug!(url, "Page started");
        shared.generation.fetch_add(1, Ordering::SeqCst);
        shared.publish(SurfaceEvent::PageStarted {
            url: url.to_string(),
        });

        let inline = is_inline_document(url);
        let job_shared = Arc::clone(&shared);
        shared.dispatch(
            "page started",
            async move {
                if !job_shared.is_attached() {
                    return;
                }
                // The fallback page is loading; keep reporting the failure.
                if !inline {
                    job_shared.set_state(SurfaceState::Loading);
                }
                job_shared.ctx.chrome.set_loading_overlay(true);
            }
            .boxed(),
        );
    }

    fn on_page_finished(&self, url: &str) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        debug!(url, "Page finished");
        shared.publish(SurfaceEvent::PageFinished {
            url: url.to_string(),
        });

        let generation = shared.generation.load(Ordering::SeqCst);
        let url = url.to_string();
        let job_shared = Arc::clone(&shared);
        shared.dispatch(
            "page finished",
            async move {
                let Ok(renderer) = job_shared.renderer() else {
                    return;
                };
                if let Err(e) = renderer.evaluate_script(&job_shared.script).await {
                    warn!(error = %e, "Page script injection failed");
                }

                if !is_placeholder(&url)
                    && job_shared.history_pending_reset.swap(false, Ordering::SeqCst)
                {
                    match renderer.clear_history().await {
                        Ok(()) => debug!(url = %url, "Dropped warm-up history"),
                        Err(e) => warn!(error = %e, "Could not clear renderer history"),
                    }
                }

                let timer_shared = Arc::clone(&job_shared);
                tokio::spawn(async move {
                    tokio::time::sleep(timer_shared.ctx.settle_delay).await;
                    let ui_shared = Arc::clone(&timer_shared);
                    timer_shared.dispatch("settle", settle(ui_shared, generation, url).boxed());
                });
            }
            .boxed(),
        );
    }

    fn on_received_error(&self, error: LoadError) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        if !error.is_main_frame {
            debug!(url = ?error.url, kind = ?error.kind, "Ignoring sub-resource failure");
            return;
        }

        warn!(
            url = ?error.url,
            kind = ?error.kind,
            description = %error.description,
            "Main frame load failed"
        );
        shared.publish(SurfaceEvent::LoadFailed {
            url: error.url.clone(),
            description: error.description.clone(),
        });

        let job_shared = Arc::clone(&shared);
        shared.dispatch(
            "load failed",
            async move {
                match job_shared.show_error_page().await {
                    Ok(()) | Err(SurfaceError::Released) => {}
                    Err(e) => warn!(error = %e, "Could not render fallback page"),
                }
            }
            .boxed(),
        );
    }

    fn on_progress_changed(&self, progress: u8) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let job_shared = Arc::clone(&shared);
        shared.dispatch(
            "progress",
            async move {
                let shown = (progress < 100).then_some(progress);
                job_shared.ctx.chrome.set_page_progress(shown);
            }
            .boxed(),
        );
    }
}

/// Runs on the UI context once the settle delay has passed.
async fn settle(shared: Arc<Shared>, generation: u64, url: String) {
    if !shared.is_attached() || shared.generation.load(Ordering::SeqCst) != generation {
        debug!(url = %url, "Settle superseded");
        return;
    }

    shared.ctx.chrome.set_loading_overlay(false);
    shared.ctx.chrome.show_help_affordance();

    if shared.state() != SurfaceState::Error {
        shared.set_state(SurfaceState::Ready);
        shared.publish(SurfaceEvent::Ready { url });
    }
}

/// The content surface: one configured renderer plus its policy and hooks.
///
/// Cheap to clone; clones share the same renderer.
#[derive(Clone)]
pub struct ContentSurface {
    shared: Arc<Shared>,
}

impl ContentSurface {
    /// Apply the fixed configuration to `handle`'s renderer, install the
    /// page hooks and register `bridge` under the content namespace.
    ///
    /// On failure the handle is released before the error is returned.
    #[instrument(skip_all, fields(renderer = handle.id().0))]
    pub async fn configure(
        handle: RendererHandle,
        bridge: Arc<dyn ScriptInterface>,
        ctx: SurfaceContext,
    ) -> Result<Self> {
        let shared = Arc::new(Shared {
            policy: NavigationPolicy::from_settings(&ctx.content),
            script: injected_script(&ctx.content.bridge_namespace),
            ctx,
            handle: Mutex::new(None),
            state: Mutex::new(SurfaceState::Unloaded),
            generation: AtomicU64::new(0),
            history_pending_reset: AtomicBool::new(true),
        });

        let renderer = Arc::clone(handle.renderer());
        let setup = async {
            let base = renderer.default_user_agent().await?;
            let user_agent = user_agent_with_suffix(&base, &shared.ctx.content.user_agent_suffix);
            renderer.apply_settings(&content_settings(user_agent)).await?;

            let client: Arc<dyn RendererClient> = Arc::new(SurfaceClient {
                shared: Arc::downgrade(&shared),
            });
            renderer.set_client(Some(client)).await?;
            renderer
                .add_script_interface(&shared.ctx.content.bridge_namespace, bridge)
                .await
        };

        if let Err(e) = setup.await {
            warn!(error = %e, "Content surface configuration failed");
            handle.release().await;
            return Err(e.into());
        }

        *shared.handle() = Some(handle);
        info!(
            namespace = %shared.ctx.content.bridge_namespace,
            "Content surface configured"
        );
        Ok(Self { shared })
    }

    pub fn renderer_id(&self) -> Option<RendererId> {
        self.shared.handle().as_ref().map(|h| h.id())
    }

    pub fn state(&self) -> SurfaceState {
        self.shared.state()
    }

    pub fn policy(&self) -> &NavigationPolicy {
        &self.shared.policy
    }

    /// Navigate to `url` after checking it against the allowlist.
    ///
    /// Blocked and delegated URLs never reach the renderer; the decision is
    /// returned either way.
    #[instrument(skip(self))]
    pub async fn load(&self, url: &str) -> Result<NavigationDecision> {
        let renderer = self.shared.renderer()?;
        let decision = self.shared.policy.decide(url);
        if !self.shared.admit(url) {
            return Ok(decision);
        }

        // Starting state is applied here so callers observe it immediately.
        self.shared.set_state(SurfaceState::Loading);
        renderer.load_url(url).await?;
        Ok(decision)
    }

    /// Load the configured game URL
    pub async fn load_content(&self) -> Result<NavigationDecision> {
        let url = self.shared.ctx.content.content_url.clone();
        self.load(&url).await
    }

    /// Replace the page with the local fallback document. Safe to repeat.
    pub async fn show_error_page(&self) -> Result<()> {
        self.shared.show_error_page().await
    }

    /// `false` when nothing, or only a blank placeholder, is loaded
    pub async fn shows_content(&self) -> bool {
        let Ok(renderer) = self.shared.renderer() else {
            return false;
        };
        match renderer.current_url().await {
            None => false,
            Some(url) => url != "about:blank",
        }
    }

    pub async fn current_url(&self) -> Option<String> {
        self.shared.renderer().ok()?.current_url().await
    }

    pub async fn history_depth(&self) -> usize {
        match self.shared.renderer() {
            Ok(renderer) => renderer.history_len().await,
            Err(_) => 0,
        }
    }

    /// Step back in the renderer's history. `false` when there is nowhere
    /// to go back to.
    pub async fn go_back(&self) -> Result<bool> {
        let renderer = self.shared.renderer()?;
        if !renderer.can_go_back().await {
            return Ok(false);
        }
        renderer.go_back().await?;
        Ok(true)
    }

    pub async fn pause(&self) -> Result<()> {
        Ok(self.shared.renderer()?.pause().await?)
    }

    pub async fn resume(&self) -> Result<()> {
        Ok(self.shared.renderer()?.resume().await?)
    }

    /// Detach and release the renderer. Idempotent; never fails.
    pub async fn release(&self) {
        let Some(handle) = self.shared.handle().take() else {
            debug!("Content surface already released");
            return;
        };

        let id = handle.id();
        // Pending settle timers and queued hooks see a new generation and
        // a detached surface.
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = handle.renderer().set_client(None).await {
            debug!(error = %e, "Could not detach renderer client");
        }

        handle.release().await;
        self.shared.set_state(SurfaceState::Unloaded);
        self.shared.publish(SurfaceEvent::Released { renderer_id: id.0 });
    }

    pub fn is_released(&self) -> bool {
        !self.shared.is_attached()
    }
}

impl std::fmt::Debug for ContentSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentSurface")
            .field("renderer", &self.renderer_id())
            .field("state", &self.state())
            .finish()
    }
}
