use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Renderer error: {0}")]
    Renderer(#[from] BridgeError),

    #[error("Content surface has been released")]
    Released,
}

pub type Result<T> = std::result::Result<T, SurfaceError>;
