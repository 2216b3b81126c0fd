//! File I/O helpers.

use crate::{Result, ZeichenError};
use std::path::Path;
use tokio::fs;

/// Read a file asynchronously.
///
/// # Errors
///
/// Returns `ZeichenError::Io` for I/O errors (these always bubble up).
pub async fn read_file_async(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    fs::read(path.as_ref()).await.map_err(ZeichenError::Io)
}

/// Validate that `path` exists and is a regular file.
pub fn validate_file_exists(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ZeichenError::validation(format!("File does not exist: {}", path.display())));
    }
    Ok(())
}

/// Final path component as UTF-8, or the whole path when there is none.
pub fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
