//! Session snapshot

use core_surface::SurfaceState;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    Created,
    Splash,
    Content,
    TornDown,
}

/// Point-in-time view of the running session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub stage: SessionStage,
    pub surface_state: SurfaceState,
    pub is_foreground: bool,
    pub navigation_history_depth: usize,
}

impl Session {
    pub fn is_torn_down(&self) -> bool {
        self.stage == SessionStage::TornDown
    }
}
