//! Network Monitoring Abstraction
//!
//! Exposes the host's view of the active network and the capabilities it
//! advertises, plus a stream of default-network transitions.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;

/// Network connection type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkType {
    /// Cellular/mobile data connection
    Cellular,
    /// WiFi connection
    WiFi,
    /// Ethernet connection
    Ethernet,
    /// Other or unknown connection type
    Other,
}

/// Capabilities a network can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkCapability {
    /// The network is expected to reach the public internet
    Internet,
    /// The platform has verified that internet access actually works
    Validated,
    /// The network has no data caps
    NotMetered,
}

/// Opaque identifier the platform assigns to a network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkId(pub String);

impl NetworkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// The network the platform currently routes default traffic through.
#[derive(Debug, Clone)]
pub struct ActiveNetwork {
    pub id: NetworkId,
    pub network_type: NetworkType,
    pub capabilities: HashSet<NetworkCapability>,
}

impl ActiveNetwork {
    pub fn new(id: NetworkId, network_type: NetworkType) -> Self {
        Self {
            id,
            network_type,
            capabilities: HashSet::new(),
        }
    }

    pub fn with_capability(mut self, capability: NetworkCapability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn has_capability(&self, capability: NetworkCapability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// A transition of the default network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkChange {
    /// A network became the default and is usable
    Available(NetworkId),
    /// The default network went away
    Lost(NetworkId),
}

/// Network monitor trait
///
/// Abstracts the platform connectivity service:
/// - **Android**: ConnectivityManager default-network callbacks
/// - **iOS**: NWPathMonitor
/// - **Desktop**: probe-based detection
///
/// # Example
///
/// ```ignore
/// use bridge_traits::network::{NetworkCapability, NetworkMonitor};
///
/// async fn online(monitor: &dyn NetworkMonitor) -> bool {
///     matches!(
///         monitor.active_network().await,
///         Ok(Some(network)) if network.has_capability(NetworkCapability::Internet)
///     )
/// }
/// ```
#[async_trait]
pub trait NetworkMonitor: Send + Sync {
    /// The network default traffic is routed through, if any.
    async fn active_network(&self) -> Result<Option<ActiveNetwork>>;

    /// Subscribe to default-network transitions.
    ///
    /// The stream ends (returns `None`) when the platform tears the
    /// registration down. Dropping the stream unregisters it.
    async fn subscribe_changes(&self) -> Result<Box<dyn NetworkChangeStream>>;
}

/// Stream of default-network transitions
#[async_trait]
pub trait NetworkChangeStream: Send {
    /// Get the next transition
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<NetworkChange>;
}
