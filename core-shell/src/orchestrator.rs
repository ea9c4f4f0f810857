//! Session lifecycle: splash, content stage, foreground/background and
//! teardown.

use crate::error::{Result, ShellError};
use crate::session::{Session, SessionStage};
use crate::spare::SpareSlot;
use crate::splash;
use async_trait::async_trait;
use bridge_traits::{DisplayMode, MenuChoice, Prompt, PromptChoice, ScriptInterface};
use core_bridge::NativeBridge;
use core_connectivity::{ConnectivityHandler, ConnectivityMonitor, Registration};
use core_crash::CrashHandler;
use core_runtime::config::ShellConfig;
use core_runtime::events::{EventBus, LifecycleEvent, ShellEvent};
use core_surface::{ContentSurface, RendererHandle, SurfaceContext, SurfaceError, SurfaceState};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

const NO_NETWORK_TITLE: &str = "No Network Connection";
const NO_NETWORK_MESSAGE: &str = "Please check your network connection and try again";
const INIT_FAILED_TITLE: &str = "Initialization Failed";
const INIT_FAILED_MESSAGE: &str = "An error occurred during app startup. Please try again.";
const HELP_NOTICE: &str = "Opening tutorial in browser...";
const NO_BROWSER_TITLE: &str = "Browser Not Found";
const NO_BROWSER_MESSAGE: &str =
    "No web browser found to open the tutorial. Please install a browser and try again.";

/// Builder for [`ShellOrchestrator`]
pub struct OrchestratorBuilder {
    config: ShellConfig,
    events: Option<EventBus>,
    crash_capture: bool,
}

impl OrchestratorBuilder {
    /// Publish on an existing bus instead of a private one
    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Whether `start` installs the process-wide crash handler. On by
    /// default.
    pub fn crash_capture(mut self, enabled: bool) -> Self {
        self.crash_capture = enabled;
        self
    }

    pub fn build(self) -> ShellOrchestrator {
        let events = self.events.unwrap_or_default();
        let config = self.config;

        let bridge = Arc::new(NativeBridge::from_config(&config).with_events(events.clone()));
        let monitor =
            ConnectivityMonitor::new(Arc::clone(&config.network_monitor)).with_events(events.clone());
        let spare = SpareSlot::new().with_events(events.clone());
        let (exit, _) = watch::channel(false);

        let shutdown = CancellationToken::new();
        let splash = shutdown.child_token();

        ShellOrchestrator {
            inner: Arc::new(Inner {
                config,
                events,
                bridge,
                monitor,
                spare,
                crash_capture: self.crash_capture,
                stage: Mutex::new(SessionStage::Created),
                slots: tokio::sync::Mutex::new(Slots::default()),
                foreground: AtomicBool::new(false),
                shutdown,
                splash,
                prompts: Mutex::new(Vec::new()),
                exit,
            }),
        }
    }
}

#[derive(Default)]
struct Slots {
    surface: Option<ContentSurface>,
    registration: Option<Registration>,
}

struct Inner {
    config: ShellConfig,
    events: EventBus,
    bridge: Arc<NativeBridge>,
    monitor: ConnectivityMonitor,
    spare: SpareSlot,
    crash_capture: bool,
    stage: Mutex<SessionStage>,
    slots: tokio::sync::Mutex<Slots>,
    foreground: AtomicBool,
    /// Cancelled on teardown; parent of every background timer
    shutdown: CancellationToken,
    /// Cancelled when the content stage is entered
    splash: CancellationToken,
    /// Outstanding modal prompts, aborted on teardown
    prompts: Mutex<Vec<JoinHandle<()>>>,
    exit: watch::Sender<bool>,
}

/// Drives one session from splash to teardown.
///
/// Operations are meant to be called from the host's UI context. Cheap to
/// clone; clones drive the same session.
#[derive(Clone)]
pub struct ShellOrchestrator {
    inner: Arc<Inner>,
}

impl ShellOrchestrator {
    pub fn new(config: ShellConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: ShellConfig) -> OrchestratorBuilder {
        OrchestratorBuilder {
            config,
            events: None,
            crash_capture: true,
        }
    }

    /// Build with every host service from the desktop defaults, storing
    /// data under `data_dir`.
    #[cfg(feature = "desktop-shims")]
    pub async fn with_desktop_defaults(data_dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        let config = ShellConfig::builder().data_dir(data_dir).build().await?;
        Ok(Self::new(config))
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    pub fn config(&self) -> &ShellConfig {
        &self.inner.config
    }

    pub fn bridge(&self) -> &Arc<NativeBridge> {
        &self.inner.bridge
    }

    pub fn stage(&self) -> SessionStage {
        *self.inner.stage()
    }

    pub async fn session(&self) -> Session {
        let surface = self.surface().await;
        let (surface_state, navigation_history_depth) = match surface {
            Some(surface) => (surface.state(), surface.history_depth().await),
            None => (SurfaceState::Unloaded, 0),
        };

        Session {
            stage: self.stage(),
            surface_state,
            is_foreground: self.inner.foreground.load(Ordering::SeqCst),
            navigation_history_depth,
        }
    }

    /// Begin the session: crash capture, splash, background pre-warm and
    /// the timed switch to content.
    ///
    /// Anything failing here is logged and the content stage is entered
    /// immediately instead.
    #[instrument(skip(self))]
    pub async fn start(&self) {
        {
            let mut stage = self.inner.stage();
            if *stage != SessionStage::Created {
                debug!(stage = ?*stage, "Session already started");
                return;
            }
            *stage = SessionStage::Splash;
        }

        if let Err(e) = self.begin_splash() {
            warn!(error = %e, "Splash failed, entering content directly");
            if let Err(e) = self.transition_to_content().await {
                error!(error = %e, "Content stage failed after splash error");
            }
        }
    }

    fn begin_splash(&self) -> Result<()> {
        let inner = &self.inner;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ShellError::Initialization(format!("no async runtime: {}", e)))?;

        if inner.crash_capture {
            let status = CrashHandler::from_config(&inner.config)
                .with_events(inner.events.clone())
                .install();
            debug!(?status, "Crash capture");
        }

        inner.config.chrome.show_splash();
        inner.publish(LifecycleEvent::SplashShown);

        let progress = splash::run_progress(
            inner.config.timing,
            Arc::clone(&inner.config.chrome),
            Arc::clone(&inner.config.ui),
        );
        let token = inner.splash.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = progress => {}
            }
        });

        inner.spare.start(Arc::clone(&inner.config.renderer_factory));

        let delay = inner.config.timing.splash_duration;
        let token = inner.shutdown.clone();
        let this = self.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            let ui = Arc::clone(&this.inner.config.ui);
            let job = async move {
                if let Err(e) = this.transition_to_content().await {
                    warn!(error = %e, "Scheduled content transition failed");
                }
            }
            .boxed();
            if let Err(e) = ui.dispatch(job) {
                warn!(error = %e, "Could not schedule content transition");
            }
        });

        info!(splash = ?delay, "Splash shown");
        Ok(())
    }

    /// Switch from splash to the content stage. Idempotent: only the first
    /// call does anything.
    #[instrument(skip(self))]
    pub async fn transition_to_content(&self) -> Result<()> {
        {
            let mut stage = self.inner.stage();
            match *stage {
                SessionStage::Content | SessionStage::TornDown => {
                    debug!(stage = ?*stage, "Content transition skipped");
                    return Ok(());
                }
                _ => *stage = SessionStage::Content,
            }
        }

        self.inner.splash.cancel();
        self.enter_content().await
    }

    async fn enter_content(&self) -> Result<()> {
        match self.build_content_stage().await {
            Ok(()) => {
                self.load_game().await;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Content stage initialization failed");
                self.inner.publish(LifecycleEvent::InitializationFailed {
                    message: e.to_string(),
                });
                self.prompt_retry_or_exit(
                    Prompt::new(INIT_FAILED_TITLE, INIT_FAILED_MESSAGE),
                    |this| this.recreate_content(),
                );
                Err(e)
            }
        }
    }

    async fn build_content_stage(&self) -> Result<()> {
        let inner = &self.inner;

        let (handle, promoted_spare) = match inner.spare.promote() {
            Some(handle) => (handle, true),
            None => {
                let renderer = inner.config.renderer_factory.create().await?;
                (RendererHandle::new(renderer), false)
            }
        };
        inner.spare.discard().await;
        let renderer_id = handle.id().0;

        let mode = DisplayMode {
            immersive: true,
            keep_screen_on: true,
        };
        if let Err(e) = inner.config.display.apply(mode) {
            warn!(error = %e, "Could not apply immersive display");
        }

        let bridge: Arc<dyn ScriptInterface> = inner.bridge.clone();
        let ctx = SurfaceContext::from_config(&inner.config).with_events(inner.events.clone());
        let surface = ContentSurface::configure(handle, bridge, ctx).await?;

        let handler: Arc<dyn ConnectivityHandler> = Arc::new(ShellConnectivity {
            inner: Arc::downgrade(inner),
        });
        let registration = match inner
            .monitor
            .watch(handler, Arc::clone(&inner.config.ui))
            .await
        {
            Ok(registration) => registration,
            Err(e) => {
                surface.release().await;
                return Err(e.into());
            }
        };

        let mut slots = inner.slots.lock().await;
        if self.is_torn_down() {
            drop(slots);
            registration.unregister().await;
            surface.release().await;
            return Err(ShellError::Initialization(
                "session torn down during content setup".to_string(),
            ));
        }
        slots.surface = Some(surface);
        slots.registration = Some(registration);
        drop(slots);

        inner.publish(LifecycleEvent::ContentEntered {
            renderer_id,
            promoted_spare,
        });
        info!(renderer = renderer_id, promoted_spare, "Content stage entered");
        Ok(())
    }

    /// Tear down whatever the content stage holds and build it again.
    fn recreate_content(&self) -> BoxFuture<'static, ()> {
        let this = self.clone();
        async move {
            if this.is_torn_down() {
                return;
            }
            this.release_content().await;
            if let Err(e) = this.enter_content().await {
                debug!(error = %e, "Content stage recreation failed");
            }
        }
        .boxed()
    }

    async fn release_content(&self) {
        let (surface, registration) = {
            let mut slots = self.inner.slots.lock().await;
            (slots.surface.take(), slots.registration.take())
        };
        if let Some(registration) = registration {
            registration.unregister().await;
        }
        if let Some(surface) = surface {
            surface.release().await;
        }
    }

    /// Load the game if the network is up, otherwise ask the user.
    async fn load_game(&self) {
        let Some(surface) = self.surface().await else {
            debug!("No content surface to load into");
            return;
        };

        if !self.inner.monitor.is_available().await {
            info!("Network unavailable, prompting");
            self.prompt_no_network();
            return;
        }

        match surface.load_content().await {
            Ok(decision) => debug!(?decision, "Game load requested"),
            Err(SurfaceError::Released) => debug!("Surface released before load"),
            Err(e) => {
                warn!(error = %e, "Game load failed");
                if let Err(e) = surface.show_error_page().await {
                    warn!(error = %e, "Could not show fallback page");
                }
            }
        }
    }

    fn prompt_no_network(&self) {
        self.prompt_retry_or_exit(
            Prompt::new(NO_NETWORK_TITLE, NO_NETWORK_MESSAGE),
            |this| {
                async move {
                    if this.inner.monitor.is_available().await {
                        this.load_game().await;
                    } else {
                        this.prompt_no_network();
                    }
                }
                .boxed()
            },
        );
    }

    /// Show a retry/exit prompt without blocking the UI context. The
    /// answer is handled back on the UI context.
    fn prompt_retry_or_exit<F>(&self, prompt: Prompt, on_retry: F)
    where
        F: FnOnce(ShellOrchestrator) -> BoxFuture<'static, ()> + Send + 'static,
    {
        if self.is_torn_down() {
            return;
        }

        let this = self.clone();
        let task = tokio::spawn(async move {
            let choice = this.inner.config.dialogs.retry_or_exit(&prompt).await;
            debug!(title = %prompt.title, ?choice, "Prompt answered");

            let ui = Arc::clone(&this.inner.config.ui);
            let job = async move {
                if this.is_torn_down() {
                    return;
                }
                match choice {
                    PromptChoice::Retry => on_retry(this).await,
                    PromptChoice::Exit => this.request_exit(),
                }
            }
            .boxed();
            if let Err(e) = ui.dispatch(job) {
                warn!(error = %e, "Could not handle prompt answer");
            }
        });

        let mut prompts = self.inner.prompts();
        prompts.retain(|task| !task.is_finished());
        prompts.push(task);
    }

    pub async fn on_foreground(&self) {
        self.inner.foreground.store(true, Ordering::SeqCst);
        if let Some(surface) = self.surface().await {
            if let Err(e) = surface.resume().await {
                debug!(error = %e, "Resume skipped");
            }
        }
        self.inner.publish(LifecycleEvent::Foreground);
    }

    pub async fn on_background(&self) {
        self.inner.foreground.store(false, Ordering::SeqCst);
        if let Some(surface) = self.surface().await {
            if let Err(e) = surface.pause().await {
                debug!(error = %e, "Pause skipped");
            }
        }
        self.inner.publish(LifecycleEvent::Background);
    }

    /// Release everything the session holds. Idempotent; never fails.
    #[instrument(skip(self))]
    pub async fn on_teardown(&self) {
        {
            let mut stage = self.inner.stage();
            if *stage == SessionStage::TornDown {
                debug!("Session already torn down");
                return;
            }
            *stage = SessionStage::TornDown;
        }

        self.inner.shutdown.cancel();
        for task in self.inner.prompts().drain(..) {
            task.abort();
        }

        self.release_content().await;
        self.inner.spare.shutdown().await;

        self.inner.publish(LifecycleEvent::TornDown);
        info!("Session torn down");
    }

    /// Step back in the page history, or open the in-game menu when there
    /// is none.
    pub async fn on_back_pressed(&self) {
        if let Some(surface) = self.surface().await {
            match surface.go_back().await {
                Ok(true) => return,
                Ok(false) => {}
                Err(e) => debug!(error = %e, "Back navigation unavailable"),
            }
        }

        match self.inner.config.dialogs.game_menu().await {
            MenuChoice::Help => self.open_help().await,
            MenuChoice::Exit => {
                if self.inner.config.dialogs.confirm_exit().await {
                    self.request_exit();
                }
            }
            MenuChoice::Cancel => debug!("Menu dismissed"),
        }
    }

    /// Open the tutorial in the external browser
    pub async fn open_help(&self) {
        let url = &self.inner.config.content.help_url;
        match self.inner.config.browser.open(url) {
            Ok(()) => {
                if let Err(e) = self.inner.config.notifier.show_notice(HELP_NOTICE) {
                    debug!(error = %e, "Help notice not shown");
                }
            }
            Err(e) => {
                warn!(error = %e, %url, "No browser for help");
                self.inner
                    .config
                    .dialogs
                    .alert(&Prompt::new(NO_BROWSER_TITLE, NO_BROWSER_MESSAGE))
                    .await;
            }
        }
    }

    /// Ask the host to end the session. The host observes this through
    /// [`wait_for_exit`](Self::wait_for_exit) and then calls
    /// [`on_teardown`](Self::on_teardown).
    pub fn request_exit(&self) {
        info!("Exit requested");
        self.inner.publish(LifecycleEvent::ExitRequested);
        self.inner.exit.send_replace(true);
    }

    pub fn exit_requested(&self) -> bool {
        *self.inner.exit.borrow()
    }

    pub async fn wait_for_exit(&self) {
        let mut rx = self.inner.exit.subscribe();
        let _ = rx.wait_for(|exit| *exit).await;
    }

    /// The active content surface, if the content stage is up
    pub async fn surface(&self) -> Option<ContentSurface> {
        self.inner.slots.lock().await.surface.clone()
    }

    fn is_torn_down(&self) -> bool {
        *self.inner.stage() == SessionStage::TornDown
    }
}

impl std::fmt::Debug for ShellOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellOrchestrator")
            .field("stage", &self.stage())
            .field("exit_requested", &self.exit_requested())
            .finish()
    }
}

impl Inner {
    fn stage(&self) -> MutexGuard<'_, SessionStage> {
        self.stage.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn prompts(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.prompts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, event: LifecycleEvent) {
        let _ = self.events.emit(ShellEvent::Lifecycle(event));
    }
}

/// Connectivity callbacks for the content stage. Holds the session weakly
/// so a registration never keeps it alive.
struct ShellConnectivity {
    inner: Weak<Inner>,
}

impl ShellConnectivity {
    fn session(&self) -> Option<ShellOrchestrator> {
        let inner = self.inner.upgrade()?;
        let session = ShellOrchestrator { inner };
        (!session.is_torn_down()).then_some(session)
    }
}

#[async_trait]
impl ConnectivityHandler for ShellConnectivity {
    async fn on_available(&self) {
        let Some(session) = self.session() else {
            return;
        };
        match session.surface().await {
            Some(surface) if surface.shows_content().await => {
                debug!("Network back, content already shown");
            }
            _ => session.load_game().await,
        }
    }

    async fn on_lost(&self) {
        if let Some(session) = self.session() {
            session.prompt_no_network();
        }
    }
}
