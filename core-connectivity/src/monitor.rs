//! Network reachability and transition observer

use crate::error::{ConnectivityError, Result};
use async_trait::async_trait;
use bridge_traits::network::{NetworkCapability, NetworkChange, NetworkMonitor};
use bridge_traits::ui::UiDispatcher;
use core_runtime::events::{ConnectivityEvent, EventBus, ShellEvent};
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Reachability as seen by the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Available,
    Unavailable,
}

/// Reactions to default-network transitions.
///
/// Both callbacks run on the UI context, one at a time.
#[async_trait]
pub trait ConnectivityHandler: Send + Sync {
    async fn on_available(&self);

    async fn on_lost(&self);
}

/// Checks and observes the platform's default network.
pub struct ConnectivityMonitor {
    network: Arc<dyn NetworkMonitor>,
    events: Option<EventBus>,
    watching: Arc<AtomicBool>,
}

impl ConnectivityMonitor {
    pub fn new(network: Arc<dyn NetworkMonitor>) -> Self {
        Self {
            network,
            events: None,
            watching: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Current reachability.
    ///
    /// Unavailable when there is no active network, when it lacks the
    /// internet capability, or when the platform query fails.
    pub async fn state(&self) -> ConnectivityState {
        match self.network.active_network().await {
            Ok(Some(network)) if network.has_capability(NetworkCapability::Internet) => {
                ConnectivityState::Available
            }
            Ok(Some(network)) => {
                debug!(network = ?network.id, "Active network has no internet capability");
                ConnectivityState::Unavailable
            }
            Ok(None) => ConnectivityState::Unavailable,
            Err(e) => {
                warn!(error = %e, "Network query failed; treating as offline");
                ConnectivityState::Unavailable
            }
        }
    }

    pub async fn is_available(&self) -> bool {
        self.state().await == ConnectivityState::Available
    }

    /// Register `handler` for network transitions.
    ///
    /// Each transition is dispatched onto `ui` so the handler may touch UI
    /// state. Only one registration may be live per monitor; it must be
    /// released with [`Registration::unregister`].
    #[instrument(skip_all)]
    pub async fn watch(
        &self,
        handler: Arc<dyn ConnectivityHandler>,
        ui: Arc<dyn UiDispatcher>,
    ) -> Result<Registration> {
        if self.watching.swap(true, Ordering::SeqCst) {
            return Err(ConnectivityError::AlreadyWatching);
        }

        let mut changes = match self.network.subscribe_changes().await {
            Ok(changes) => changes,
            Err(e) => {
                self.watching.store(false, Ordering::SeqCst);
                return Err(e.into());
            }
        };

        let token = CancellationToken::new();
        let child = token.child_token();
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            loop {
                let change = tokio::select! {
                    _ = child.cancelled() => break,
                    change = changes.next() => change,
                };

                let Some(change) = change else {
                    debug!("Network change stream closed");
                    break;
                };

                let event = match &change {
                    NetworkChange::Available(id) => {
                        info!(network = ?id, "Network available");
                        ConnectivityEvent::Available
                    }
                    NetworkChange::Lost(id) => {
                        warn!(network = ?id, "Network lost");
                        ConnectivityEvent::Lost
                    }
                };
                if let Some(events) = &events {
                    let _ = events.emit(ShellEvent::Connectivity(event));
                }

                let handler = Arc::clone(&handler);
                let job = async move {
                    match change {
                        NetworkChange::Available(_) => handler.on_available().await,
                        NetworkChange::Lost(_) => handler.on_lost().await,
                    }
                }
                .boxed();

                if let Err(e) = ui.dispatch(job) {
                    warn!(error = %e, "Dropping network transition; UI context unavailable");
                }
            }
        });

        info!("Connectivity observer registered");

        Ok(Registration {
            token,
            task: Some(task),
            watching: Arc::clone(&self.watching),
        })
    }

    pub fn is_watching(&self) -> bool {
        self.watching.load(Ordering::SeqCst)
    }
}

/// Live observer registration. Has exactly one owner and is cancelled once.
pub struct Registration {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
    watching: Arc<AtomicBool>,
}

impl Registration {
    /// Stop observing and wait for the observer task to finish.
    ///
    /// Transitions already handed to the UI context still run.
    pub async fn unregister(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Connectivity observer task failed");
            }
        }
        self.watching.store(false, Ordering::SeqCst);
        info!("Connectivity observer unregistered");
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.task.is_some() {
            warn!("Connectivity registration dropped without unregister");
            self.token.cancel();
            self.watching.store(false, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use bridge_traits::network::{
        ActiveNetwork, NetworkChangeStream, NetworkId, NetworkType,
    };
    use bridge_traits::ui::UiJob;
    use mockall::mock;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    mock! {
        Network {}

        #[async_trait]
        impl NetworkMonitor for Network {
            async fn active_network(&self) -> bridge_traits::error::Result<Option<ActiveNetwork>>;
            async fn subscribe_changes(&self) -> bridge_traits::error::Result<Box<dyn NetworkChangeStream>>;
        }
    }

    struct ChannelStream(mpsc::UnboundedReceiver<NetworkChange>);

    #[async_trait]
    impl NetworkChangeStream for ChannelStream {
        async fn next(&mut self) -> Option<NetworkChange> {
            self.0.recv().await
        }
    }

    /// Runs UI jobs straight on the runtime
    struct SpawnDispatcher;

    impl UiDispatcher for SpawnDispatcher {
        fn dispatch(&self, job: UiJob) -> bridge_traits::error::Result<()> {
            tokio::spawn(job);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<&'static str>>,
        notify: tokio::sync::Notify,
    }

    #[async_trait]
    impl ConnectivityHandler for Recorder {
        async fn on_available(&self) {
            self.calls.lock().unwrap().push("available");
            self.notify.notify_one();
        }

        async fn on_lost(&self) {
            self.calls.lock().unwrap().push("lost");
            self.notify.notify_one();
        }
    }

    fn wifi() -> ActiveNetwork {
        ActiveNetwork::new(NetworkId::new("wlan0"), NetworkType::WiFi)
    }

    #[tokio::test]
    async fn test_state_requires_internet_capability() {
        let mut network = MockNetwork::new();
        let mut answers = vec![
            Ok(Some(wifi().with_capability(NetworkCapability::Internet))),
            Ok(Some(wifi())),
            Ok(None),
            Err(BridgeError::NotAvailable("no service".to_string())),
        ]
        .into_iter();
        network
            .expect_active_network()
            .times(4)
            .returning(move || answers.next().unwrap());

        let monitor = ConnectivityMonitor::new(Arc::new(network));

        assert_eq!(monitor.state().await, ConnectivityState::Available);
        assert!(!monitor.is_available().await);
        assert!(!monitor.is_available().await);
        assert_eq!(monitor.state().await, ConnectivityState::Unavailable);
    }

    #[tokio::test]
    async fn test_watch_dispatches_transitions_and_unregisters() {
        let (tx, rx) = mpsc::unbounded_channel();
        let stream = Mutex::new(Some(ChannelStream(rx)));

        let mut network = MockNetwork::new();
        network.expect_subscribe_changes().times(1).returning(move || {
            let stream = stream.lock().unwrap().take().unwrap();
            Ok(Box::new(stream) as Box<dyn NetworkChangeStream>)
        });

        let events = EventBus::default();
        let mut rx_events = events.subscribe();
        let monitor = ConnectivityMonitor::new(Arc::new(network)).with_events(events);
        let recorder = Arc::new(Recorder::default());

        let registration = monitor
            .watch(recorder.clone(), Arc::new(SpawnDispatcher))
            .await
            .unwrap();
        assert!(monitor.is_watching());

        tx.send(NetworkChange::Lost(NetworkId::new("wlan0"))).unwrap();
        recorder.notify.notified().await;
        tx.send(NetworkChange::Available(NetworkId::new("wlan0"))).unwrap();
        recorder.notify.notified().await;

        assert_eq!(*recorder.calls.lock().unwrap(), vec!["lost", "available"]);
        assert_eq!(
            rx_events.recv().await.unwrap(),
            ShellEvent::Connectivity(ConnectivityEvent::Lost)
        );

        registration.unregister().await;
        assert!(!monitor.is_watching());
        // The stream is gone once the observer stops.
        assert!(tx.send(NetworkChange::Lost(NetworkId::new("wlan0"))).is_err());
    }

    #[tokio::test]
    async fn test_second_watch_is_rejected() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let stream = Mutex::new(Some(ChannelStream(rx)));

        let mut network = MockNetwork::new();
        network.expect_subscribe_changes().times(1).returning(move || {
            let stream = stream.lock().unwrap().take().unwrap();
            Ok(Box::new(stream) as Box<dyn NetworkChangeStream>)
        });

        let monitor = ConnectivityMonitor::new(Arc::new(network));
        let recorder = Arc::new(Recorder::default());

        let registration = monitor
            .watch(recorder.clone(), Arc::new(SpawnDispatcher))
            .await
            .unwrap();
        let second = monitor.watch(recorder, Arc::new(SpawnDispatcher)).await;
        assert!(matches!(second, Err(ConnectivityError::AlreadyWatching)));

        registration.unregister().await;
    }

    #[tokio::test]
    async fn test_subscribe_failure_leaves_monitor_unwatched() {
        let mut network = MockNetwork::new();
        network
            .expect_subscribe_changes()
            .returning(|| Err(BridgeError::NotAvailable("denied".to_string())));

        let monitor = ConnectivityMonitor::new(Arc::new(network));
        let result = monitor
            .watch(Arc::new(Recorder::default()), Arc::new(SpawnDispatcher))
            .await;

        assert!(matches!(result, Err(ConnectivityError::Subscribe(_))));
        assert!(!monitor.is_watching());
    }
}
