//! # Native Bridge
//!
//! The capability surface hosted content calls into, registered on the
//! content renderer under a fixed script namespace.
//!
//! - [`NativeBridge`] dispatches [`BridgeCall`](bridge_traits::BridgeCall)s
//!   by method name and never lets a failure escape to the caller
//! - [`GameStore`] layers the game's typed progress keys over the host
//!   [`SettingsStore`](bridge_traits::SettingsStore)
//! - [`GameEvent`] decodes the `{"type": ...}` envelope posted by the game

pub mod bridge;
pub mod event;
pub mod store;

pub use bridge::{parse_waveform, BridgeServices, NativeBridge};
pub use event::{EventError, GameEvent};
pub use store::GameStore;
