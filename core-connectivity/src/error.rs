use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectivityError {
    #[error("Failed to subscribe to network changes: {0}")]
    Subscribe(#[from] BridgeError),

    #[error("Observer already registered")]
    AlreadyWatching,
}

pub type Result<T> = std::result::Result<T, ConnectivityError>;
