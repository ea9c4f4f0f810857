//! Embedded Content Renderer Abstraction
//!
//! The host owns the actual web renderer (Android WebView, WKWebView, a
//! desktop webview or a headless probe). The core drives it through
//! [`ContentRenderer`] and receives page callbacks through
//! [`RendererClient`]. Calls coming back from hosted script are routed to a
//! registered [`ScriptInterface`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Identity of one renderer instance, unique per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RendererId(pub u64);

/// HTTP cache behaviour of the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Use cached resources when fresh, otherwise the network
    #[default]
    Default,
    /// Prefer the cache even when stale
    CacheElseNetwork,
    /// Never use the cache
    NoCache,
}

/// How secure pages may load insecure sub-resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixedContentMode {
    #[default]
    NeverAllow,
    /// Allow passive and active mixed content where the platform deems it safe
    Compatibility,
    AlwaysAllow,
}

/// Full renderer configuration applied in one call.
///
/// `Default` mirrors the restrictive platform defaults; the content surface
/// builds its own fixed set on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererSettings {
    pub javascript_enabled: bool,
    pub dom_storage_enabled: bool,
    pub database_enabled: bool,
    pub cache_mode: CacheMode,
    pub use_wide_viewport: bool,
    pub load_with_overview_mode: bool,
    pub support_zoom: bool,
    pub builtin_zoom_controls: bool,
    pub display_zoom_controls: bool,
    pub media_playback_requires_gesture: bool,
    pub mixed_content: MixedContentMode,
    pub allow_file_access: bool,
    pub allow_content_access: bool,
    /// Complete user agent string; `None` keeps the renderer default
    pub user_agent: Option<String>,
    pub long_press_enabled: bool,
    pub haptic_feedback_enabled: bool,
    pub hardware_accelerated: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            javascript_enabled: false,
            dom_storage_enabled: false,
            database_enabled: false,
            cache_mode: CacheMode::Default,
            use_wide_viewport: false,
            load_with_overview_mode: false,
            support_zoom: true,
            builtin_zoom_controls: false,
            display_zoom_controls: true,
            media_playback_requires_gesture: true,
            mixed_content: MixedContentMode::NeverAllow,
            allow_file_access: false,
            allow_content_access: true,
            user_agent: None,
            long_press_enabled: true,
            haptic_feedback_enabled: true,
            hardware_accelerated: false,
        }
    }
}

/// Why a load failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// Transport-level failure (DNS, TLS, reset)
    Network,
    /// The server answered with a non-success status
    HttpStatus(u16),
    /// The host could not be reached at all
    HostUnreachable,
    Other,
}

/// A failed load reported by the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub url: Option<String>,
    pub kind: LoadErrorKind,
    pub description: String,
    /// Sub-resource failures are reported with `false`
    pub is_main_frame: bool,
}

/// A call from hosted script into a registered interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeCall {
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl BridgeCall {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// Argument at `index` as a string slice, if present and a string
    pub fn str_arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(Value::as_str)
    }

    /// Argument at `index` as an integer. Numeric strings and whole-valued
    /// floats are accepted; fractional values are not.
    pub fn i64_arg(&self, index: usize) -> Option<i64> {
        let whole = |f: f64| (f.is_finite() && f.fract() == 0.0).then(|| f as i64);
        match self.args.get(index)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
            Value::String(s) => {
                let s = s.trim();
                s.parse()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole))
            }
            _ => None,
        }
    }
}

/// Host-side handler registered under a script namespace.
///
/// Implementations must never fail: whatever happens inside, hosted content
/// receives a plain JSON value (`Value::Null` for calls without a result).
#[async_trait]
pub trait ScriptInterface: Send + Sync {
    async fn invoke(&self, call: BridgeCall) -> Value;
}

/// Page callbacks delivered by the renderer.
///
/// Invoked on the renderer's own execution context; implementations must hop
/// to the UI context before touching UI state.
pub trait RendererClient: Send + Sync {
    /// Return `true` to cancel the navigation
    fn should_override_url_loading(&self, url: &str) -> bool;

    fn on_page_started(&self, url: &str);

    fn on_page_finished(&self, url: &str);

    fn on_received_error(&self, error: LoadError);

    /// Load progress in percent, 0..=100
    fn on_progress_changed(&self, _progress: u8) {}
}

/// One embedded content surface instance.
///
/// After [`destroy`](ContentRenderer::destroy) every other call returns
/// [`BridgeError::RendererDestroyed`](crate::BridgeError::RendererDestroyed).
#[async_trait]
pub trait ContentRenderer: Send + Sync {
    fn id(&self) -> RendererId;

    async fn apply_settings(&self, settings: &RendererSettings) -> Result<()>;

    /// The user agent the renderer would send without overrides
    async fn default_user_agent(&self) -> Result<String>;

    /// Install (or clear) the page callback receiver
    async fn set_client(&self, client: Option<Arc<dyn RendererClient>>) -> Result<()>;

    /// Expose `interface` to hosted script as `window.<namespace>`
    async fn add_script_interface(
        &self,
        namespace: &str,
        interface: Arc<dyn ScriptInterface>,
    ) -> Result<()>;

    async fn load_url(&self, url: &str) -> Result<()>;

    /// Render an inline HTML document without touching the network
    async fn load_html(&self, html: &str) -> Result<()>;

    async fn evaluate_script(&self, script: &str) -> Result<()>;

    async fn current_url(&self) -> Option<String>;

    async fn stop_loading(&self) -> Result<()>;

    async fn set_javascript_enabled(&self, enabled: bool) -> Result<()>;

    /// Drop every back/forward entry except the current one
    async fn clear_history(&self) -> Result<()>;

    /// Number of entries in the back/forward list
    async fn history_len(&self) -> usize;

    async fn can_go_back(&self) -> bool;

    async fn go_back(&self) -> Result<()>;

    /// Pause rendering and script timers
    async fn pause(&self) -> Result<()>;

    /// Resume rendering and script timers
    async fn resume(&self) -> Result<()>;

    /// Release the instance. Irreversible; repeated calls are no-ops.
    async fn destroy(&self) -> Result<()>;
}

/// Creates renderer instances.
#[async_trait]
pub trait RendererFactory: Send + Sync {
    async fn create(&self) -> Result<Arc<dyn ContentRenderer>>;
}
