//! Renderer configuration sets

use bridge_traits::{CacheMode, MixedContentMode, RendererSettings};

/// `base` with `suffix` appended, separated by one space
pub fn user_agent_with_suffix(base: &str, suffix: &str) -> String {
    let base = base.trim_end();
    if base.is_empty() {
        suffix.to_string()
    } else {
        format!("{} {}", base, suffix)
    }
}

/// The fixed configuration of the content surface.
pub fn content_settings(user_agent: String) -> RendererSettings {
    RendererSettings {
        javascript_enabled: true,
        dom_storage_enabled: true,
        database_enabled: true,
        cache_mode: CacheMode::Default,
        use_wide_viewport: true,
        load_with_overview_mode: true,
        support_zoom: false,
        builtin_zoom_controls: false,
        display_zoom_controls: false,
        media_playback_requires_gesture: false,
        mixed_content: MixedContentMode::Compatibility,
        allow_file_access: true,
        allow_content_access: true,
        user_agent: Some(user_agent),
        long_press_enabled: false,
        haptic_feedback_enabled: false,
        hardware_accelerated: true,
    }
}

/// Minimal configuration for a spare renderer warmed before it is shown.
pub fn prewarm_settings() -> RendererSettings {
    RendererSettings {
        javascript_enabled: true,
        dom_storage_enabled: true,
        cache_mode: CacheMode::Default,
        ..RendererSettings::default()
    }
}
