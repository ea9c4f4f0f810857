//! # Event Bus System
//!
//! Provides an event-driven architecture for the shell using `tokio::sync::broadcast`.
//! Host callbacks (connectivity, page lifecycle, bridge traffic) are turned into
//! typed events so the orchestrator, hosts and tests can observe the session
//! without registering ad-hoc callbacks.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    emit     ┌───────────┐
//! │ Orchestrator ├────────────>│           │
//! └──────────────┘             │           │
//!                              │ EventBus  │    subscribe    ┌────────────┐
//! ┌──────────────┐    emit     │ (broadcast├────────────────>│ Subscriber │
//! │ Surface      ├────────────>│  channel) │                 └────────────┘
//! └──────────────┘             │           │
//! ┌──────────────┐    emit     │           │    subscribe    ┌────────────┐
//! │ Bridge       ├────────────>│           ├────────────────>│ Subscriber │
//! └──────────────┘             └───────────┘                 └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, LifecycleEvent, ShellEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus.emit(ShellEvent::Lifecycle(LifecycleEvent::Foreground)).ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event, ShellEvent::Lifecycle(LifecycleEvent::Foreground));
//! # }
//! ```
//!
//! Publishers ignore the `SendError` returned when nobody is subscribed.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast::{self, error::RecvError, error::SendError};

pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Shell Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum ShellEvent {
    Lifecycle(LifecycleEvent),
    Surface(SurfaceEvent),
    Connectivity(ConnectivityEvent),
    Bridge(BridgeEvent),
    Crash(CrashEvent),
}

impl ShellEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            ShellEvent::Lifecycle(e) => e.description(),
            ShellEvent::Surface(e) => e.description(),
            ShellEvent::Connectivity(e) => e.description(),
            ShellEvent::Bridge(e) => e.description(),
            ShellEvent::Crash(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            ShellEvent::Crash(_) => EventSeverity::Error,
            ShellEvent::Lifecycle(LifecycleEvent::InitializationFailed { .. }) => {
                EventSeverity::Error
            }
            ShellEvent::Surface(SurfaceEvent::LoadFailed { .. }) => EventSeverity::Warning,
            ShellEvent::Connectivity(ConnectivityEvent::Lost) => EventSeverity::Warning,
            ShellEvent::Bridge(BridgeEvent::CallFailed { .. }) => EventSeverity::Warning,
            ShellEvent::Lifecycle(_) => EventSeverity::Info,
            ShellEvent::Connectivity(_) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Lifecycle Events
// ============================================================================

/// Session lifecycle transitions published by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LifecycleEvent {
    SplashShown,
    /// A spare renderer finished pre-warming.
    PreWarmed { renderer_id: u64 },
    /// The spare was not promoted and has been destroyed.
    SpareDiscarded { renderer_id: u64 },
    /// The content stage became active.
    ContentEntered {
        renderer_id: u64,
        /// `true` when the pre-warmed spare was promoted
        promoted_spare: bool,
    },
    Foreground,
    Background,
    InitializationFailed { message: String },
    /// The user chose to leave the session.
    ExitRequested,
    TornDown,
}

impl LifecycleEvent {
    fn description(&self) -> &str {
        match self {
            LifecycleEvent::SplashShown => "Splash shown",
            LifecycleEvent::PreWarmed { .. } => "Spare renderer pre-warmed",
            LifecycleEvent::SpareDiscarded { .. } => "Spare renderer discarded",
            LifecycleEvent::ContentEntered { .. } => "Content stage entered",
            LifecycleEvent::Foreground => "Moved to foreground",
            LifecycleEvent::Background => "Moved to background",
            LifecycleEvent::InitializationFailed { .. } => "Initialization failed",
            LifecycleEvent::ExitRequested => "Exit requested",
            LifecycleEvent::TornDown => "Session torn down",
        }
    }
}

// ============================================================================
// Surface Events
// ============================================================================

/// Content surface page lifecycle and navigation policy outcomes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SurfaceEvent {
    PageStarted { url: String },
    PageFinished { url: String },
    /// Settle delay elapsed; overlay hidden.
    Ready { url: String },
    LoadFailed {
        url: Option<String>,
        description: String,
    },
    ErrorPageShown,
    NavigationBlocked { url: String },
    NavigationDelegated { url: String },
    Released { renderer_id: u64 },
}

impl SurfaceEvent {
    fn description(&self) -> &str {
        match self {
            SurfaceEvent::PageStarted { .. } => "Page load started",
            SurfaceEvent::PageFinished { .. } => "Page load finished",
            SurfaceEvent::Ready { .. } => "Content ready",
            SurfaceEvent::LoadFailed { .. } => "Content load failed",
            SurfaceEvent::ErrorPageShown => "Fallback page shown",
            SurfaceEvent::NavigationBlocked { .. } => "Navigation blocked",
            SurfaceEvent::NavigationDelegated { .. } => "Navigation delegated to browser",
            SurfaceEvent::Released { .. } => "Renderer released",
        }
    }
}

// ============================================================================
// Connectivity Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ConnectivityEvent {
    Available,
    Lost,
}

impl ConnectivityEvent {
    fn description(&self) -> &str {
        match self {
            ConnectivityEvent::Available => "Network available",
            ConnectivityEvent::Lost => "Network lost",
        }
    }
}

// ============================================================================
// Bridge Events
// ============================================================================

/// Traffic across the native bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum BridgeEvent {
    /// A game event envelope was dispatched.
    GameEvent { kind: String },
    DataSaved { key: String },
    DataRemoved { key: String },
    DataCleared,
    FullscreenChanged { immersive: bool },
    /// A capability failed and was absorbed.
    CallFailed { method: String, message: String },
}

impl BridgeEvent {
    fn description(&self) -> &str {
        match self {
            BridgeEvent::GameEvent { .. } => "Game event handled",
            BridgeEvent::DataSaved { .. } => "Data saved",
            BridgeEvent::DataRemoved { .. } => "Data removed",
            BridgeEvent::DataCleared => "Data cleared",
            BridgeEvent::FullscreenChanged { .. } => "Fullscreen changed",
            BridgeEvent::CallFailed { .. } => "Bridge call failed",
        }
    }
}

// ============================================================================
// Crash Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CrashEvent {
    /// A crash record was written to `file`.
    Captured { file: String },
    /// The crash record could not be written; termination proceeds.
    WriteFailed { message: String },
}

impl CrashEvent {
    fn description(&self) -> &str {
        match self {
            CrashEvent::Captured { .. } => "Crash captured",
            CrashEvent::WriteFailed { .. } => "Crash record write failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for shell events.
///
/// Cloning is cheap; every clone publishes into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ShellEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: ShellEvent) -> Result<usize, SendError<ShellEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<ShellEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&ShellEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, ShellEvent};
///
/// let event_bus = EventBus::new(100);
/// let surface_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, ShellEvent::Surface(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<ShellEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<ShellEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ShellEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn matches(&self, event: &ShellEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once every sender is gone.
    pub async fn recv(&mut self) -> Result<ShellEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without waiting.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<ShellEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.matches(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drain every matching event currently buffered.
    pub fn drain(&mut self) -> Vec<ShellEvent> {
        let mut events = Vec::new();
        while let Some(next) = self.try_recv() {
            match next {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
