use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrashError {
    #[error("Failed to write crash record: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crash directory unavailable: {0}")]
    Directory(String),
}

pub type Result<T> = std::result::Result<T, CrashError>;
