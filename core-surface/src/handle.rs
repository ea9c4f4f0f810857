//! Exclusive renderer ownership

use crate::settings::prewarm_settings;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{ContentRenderer, RendererFactory, RendererId};
use std::sync::Arc;
use tracing::{debug, info, warn};

const BLANK_URL: &str = "about:blank";

/// Sole owner of one renderer instance.
///
/// Releasing consumes the handle, so a released renderer can never be
/// addressed through it again.
pub struct RendererHandle {
    renderer: Arc<dyn ContentRenderer>,
    released: bool,
}

impl RendererHandle {
    pub fn new(renderer: Arc<dyn ContentRenderer>) -> Self {
        Self {
            renderer,
            released: false,
        }
    }

    /// Create a renderer with script, storage and cache enabled, parked on
    /// a blank page.
    pub async fn prewarm(factory: &dyn RendererFactory) -> Result<Self> {
        let handle = Self::new(factory.create().await?);
        let setup = async {
            handle.renderer.apply_settings(&prewarm_settings()).await?;
            handle.renderer.load_url(BLANK_URL).await
        };
        if let Err(e) = setup.await {
            handle.release().await;
            return Err(e);
        }
        debug!(renderer = handle.id().0, "Renderer pre-warmed");
        Ok(handle)
    }

    pub fn id(&self) -> RendererId {
        self.renderer.id()
    }

    pub fn renderer(&self) -> &Arc<dyn ContentRenderer> {
        &self.renderer
    }

    /// Blank the page, stop loading, revoke script, clear history, destroy.
    ///
    /// Never fails: step errors are logged and the sequence continues so the
    /// renderer is always destroyed.
    pub async fn release(mut self) {
        let id = self.id().0;
        let r = &self.renderer;

        log_step(id, "blank", r.load_url(BLANK_URL).await);
        log_step(id, "stop loading", r.stop_loading().await);
        log_step(id, "disable script", r.set_javascript_enabled(false).await);
        log_step(id, "clear history", r.clear_history().await);
        log_step(id, "destroy", r.destroy().await);

        self.released = true;
        info!(renderer = id, "Renderer released");
    }
}

fn log_step(id: u64, step: &str, result: Result<()>) {
    match result {
        Ok(()) => {}
        Err(BridgeError::RendererDestroyed) => {
            debug!(renderer = id, step, "Renderer already destroyed")
        }
        Err(e) => warn!(renderer = id, step, error = %e, "Release step failed"),
    }
}

impl Drop for RendererHandle {
    fn drop(&mut self) {
        if !self.released {
            warn!(renderer = self.id().0, "Renderer handle dropped without release");
        }
    }
}

impl std::fmt::Debug for RendererHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererHandle")
            .field("id", &self.id())
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::{HeadlessRenderer, HeadlessRendererFactory};

    #[tokio::test]
    async fn test_prewarm_parks_on_blank_page() {
        let factory = HeadlessRendererFactory::with_client(reqwest::Client::new());
        let handle = RendererHandle::prewarm(&factory).await.unwrap();

        let renderer = handle.renderer().clone();
        assert_eq!(renderer.current_url().await.as_deref(), Some("about:blank"));

        handle.release().await;
        assert_eq!(renderer.current_url().await, None);
    }

    #[tokio::test]
    async fn test_release_runs_full_sequence() {
        let headless = Arc::new(HeadlessRenderer::new(reqwest::Client::new()));
        headless.apply_settings(&prewarm_settings()).await.unwrap();
        headless.load_url("about:blank#1").await.unwrap();
        headless.load_url("about:blank#2").await.unwrap();

        let handle = RendererHandle::new(headless.clone());
        handle.release().await;

        assert!(headless.is_destroyed());
        assert!(!headless.settings().javascript_enabled);
        assert!(matches!(
            headless.load_url("about:blank").await,
            Err(BridgeError::RendererDestroyed)
        ));
    }

    #[tokio::test]
    async fn test_release_of_destroyed_renderer_is_quiet() {
        let headless = Arc::new(HeadlessRenderer::new(reqwest::Client::new()));
        headless.destroy().await.unwrap();

        RendererHandle::new(headless.clone()).release().await;
        assert!(headless.is_destroyed());
    }
}
