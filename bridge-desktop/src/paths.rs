//! Platform directory resolution

use std::path::PathBuf;

/// Per-application data directory, e.g. `~/.local/share/<app>` on Linux.
///
/// Falls back to `~/.local/share` and finally the working directory when
/// the platform reports no data location.
pub fn app_data_dir(app: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("share")
        })
        .join(app)
}
