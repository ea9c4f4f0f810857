//! Network Monitoring Implementation

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    network::{
        ActiveNetwork, NetworkCapability, NetworkChange, NetworkChangeStream, NetworkId,
        NetworkMonitor, NetworkType,
    },
};
use std::time::Duration;
use tracing::debug;

const DEFAULT_PROBE_ADDR: &str = "8.8.8.8:53";
const DESKTOP_NETWORK_ID: &str = "desktop-default";

/// Desktop network monitor implementation
///
/// Desktop has no portable default-network API, so the active network is
/// inferred from a TCP probe: a successful connect means a network with
/// internet capability is up.
#[derive(Debug, Clone)]
pub struct DesktopNetworkMonitor {
    probe_addr: String,
    probe_timeout: Duration,
    poll_interval: Duration,
}

impl DesktopNetworkMonitor {
    pub fn new() -> Self {
        Self {
            probe_addr: DEFAULT_PROBE_ADDR.to_string(),
            probe_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(5),
        }
    }

    /// Probe a different `host:port`
    pub fn with_probe_addr(mut self, addr: impl Into<String>) -> Self {
        self.probe_addr = addr.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    async fn probe(&self) -> bool {
        matches!(
            tokio::time::timeout(
                self.probe_timeout,
                tokio::net::TcpStream::connect(&self.probe_addr),
            )
            .await,
            Ok(Ok(_))
        )
    }
}

impl Default for DesktopNetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkMonitor for DesktopNetworkMonitor {
    async fn active_network(&self) -> Result<Option<ActiveNetwork>> {
        let reachable = self.probe().await;
        debug!(reachable, probe = %self.probe_addr, "Network probe finished");

        if !reachable {
            return Ok(None);
        }

        // Desktop connections are treated as unmetered and validated once the probe succeeds.
        Ok(Some(
            ActiveNetwork::new(NetworkId::new(DESKTOP_NETWORK_ID), NetworkType::Other)
                .with_capability(NetworkCapability::Internet)
                .with_capability(NetworkCapability::Validated)
                .with_capability(NetworkCapability::NotMetered),
        ))
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn NetworkChangeStream>> {
        Ok(Box::new(DesktopNetworkChangeStream {
            monitor: self.clone(),
            last_reachable: None,
        }))
    }
}

/// Change stream that re-probes on an interval and reports transitions
struct DesktopNetworkChangeStream {
    monitor: DesktopNetworkMonitor,
    last_reachable: Option<bool>,
}

#[async_trait]
impl NetworkChangeStream for DesktopNetworkChangeStream {
    async fn next(&mut self) -> Option<NetworkChange> {
        loop {
            // The first probe runs immediately so subscribers learn the current state.
            if self.last_reachable.is_some() {
                tokio::time::sleep(self.monitor.poll_interval).await;
            }

            let reachable = self.monitor.probe().await;
            let previous = self.last_reachable.replace(reachable);

            let id = NetworkId::new(DESKTOP_NETWORK_ID);
            match (previous, reachable) {
                (None, true) | (Some(false), true) => return Some(NetworkChange::Available(id)),
                (Some(true), false) => return Some(NetworkChange::Lost(id)),
                _ => continue,
            }
        }
    }
}
