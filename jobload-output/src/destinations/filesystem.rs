//! Atomic file writes

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::errors::DeliveryError;

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `data` next to `path` and rename it into place. On failure the
/// temporary file is removed and any existing file at `path` is untouched.
pub async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), DeliveryError> {
    let tmp = temp_path(path);

    if let Err(e) = fs::write(&tmp, data).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(DeliveryError::filesystem(&tmp, "write", e));
    }

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(DeliveryError::filesystem(path, "rename", e));
    }

    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}
