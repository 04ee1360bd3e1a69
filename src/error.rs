use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort a whole run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Item folder root not found: {}", .0.display())]
    RootMissing(PathBuf),
}
