//! # Connectivity Monitor
//!
//! Point-in-time reachability checks plus a continuous observer of
//! default-network transitions.
//!
//! ```ignore
//! let monitor = ConnectivityMonitor::new(config.network_monitor.clone());
//! if monitor.is_available().await {
//!     surface.load(&url).await?;
//! }
//!
//! let registration = monitor.watch(handler, config.ui.clone()).await?;
//! // ...
//! registration.unregister().await;
//! ```

pub mod error;
pub mod monitor;

pub use error::{ConnectivityError, Result};
pub use monitor::{ConnectivityHandler, ConnectivityMonitor, ConnectivityState, Registration};
