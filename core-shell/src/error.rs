use bridge_traits::error::BridgeError;
use core_connectivity::ConnectivityError;
use core_surface::SurfaceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Shell initialization failed: {0}")]
    Initialization(String),

    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Connectivity error: {0}")]
    Connectivity(#[from] ConnectivityError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),
}

pub type Result<T> = std::result::Result<T, ShellError>;
