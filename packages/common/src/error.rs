use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the shared file system layer
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
