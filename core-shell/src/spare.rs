//! Pre-warmed spare renderer

use bridge_traits::RendererFactory;
use core_runtime::events::{EventBus, LifecycleEvent, ShellEvent};
use core_surface::RendererHandle;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Default)]
struct SlotState {
    handle: Option<RendererHandle>,
    /// Set once the slot has been promoted or discarded. A spare that
    /// finishes warming after this is released immediately.
    closed: bool,
}

/// Holds at most one renderer warmed in the background during the splash.
///
/// The spare is either promoted to the content surface exactly once or
/// released; it is never leaked.
#[derive(Default)]
pub struct SpareSlot {
    state: Arc<Mutex<SlotState>>,
    task: Mutex<Option<JoinHandle<()>>>,
    events: Option<EventBus>,
}

impl SpareSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Start warming a spare on a background task. A second call while a
    /// spare exists or is warming does nothing.
    pub fn start(&self, factory: Arc<dyn RendererFactory>) {
        let mut task = lock(&self.task);
        if task.is_some() {
            debug!("Spare renderer already requested");
            return;
        }

        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        *task = Some(tokio::spawn(async move {
            let handle = match RendererHandle::prewarm(factory.as_ref()).await {
                Ok(handle) => handle,
                Err(e) => {
                    warn!(error = %e, "Renderer pre-warm failed");
                    return;
                }
            };

            let renderer_id = handle.id().0;
            let late = {
                let mut slot = lock(&state);
                if slot.closed {
                    Some(handle)
                } else {
                    slot.handle = Some(handle);
                    None
                }
            };

            match late {
                Some(handle) => {
                    debug!(renderer = renderer_id, "Spare finished after the slot closed");
                    handle.release().await;
                    publish(&events, LifecycleEvent::SpareDiscarded { renderer_id });
                }
                None => publish(&events, LifecycleEvent::PreWarmed { renderer_id }),
            }
        }));
    }

    /// Take the spare if it has finished warming. Closes the slot either
    /// way.
    pub fn promote(&self) -> Option<RendererHandle> {
        let mut slot = lock(&self.state);
        slot.closed = true;
        slot.handle.take()
    }

    pub fn is_ready(&self) -> bool {
        lock(&self.state).handle.is_some()
    }

    /// Close the slot and release a spare that was never promoted.
    pub async fn discard(&self) {
        let spare = {
            let mut slot = lock(&self.state);
            slot.closed = true;
            slot.handle.take()
        };

        if let Some(handle) = spare {
            let renderer_id = handle.id().0;
            handle.release().await;
            publish(&self.events, LifecycleEvent::SpareDiscarded { renderer_id });
        }
    }

    /// Discard, then wait for an in-flight warm-up to finish and clean up
    /// after itself.
    pub async fn shutdown(&self) {
        self.discard().await;
        let task = lock(&self.task).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Spare warm-up task failed");
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn publish(events: &Option<EventBus>, event: LifecycleEvent) {
    if let Some(events) = events {
        let _ = events.emit(ShellEvent::Lifecycle(event));
    }
}
