//! Writing the reassembled file to disk
//!
//! Data is written to `<filename>.tmp` beside the destination and renamed
//! into place, so an interrupted run never leaves a truncated file under the
//! final name.

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{debug, error, info};

use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// Check that an index-supplied filename is a single plain path component
///
/// Rejects empty names, `.` and `..`, absolute paths and anything containing
/// a separator.
pub fn validate_filename(name: &str) -> DownloadResult<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(()),
        _ => Err(DownloadError::UnsafeFilename {
            name: name.to_string(),
        }),
    }
}

/// Destination path for `filename` under `directory`
pub fn destination_path(directory: &Path, filename: &str) -> DownloadResult<PathBuf> {
    validate_filename(filename)?;
    Ok(directory.join(filename))
}

/// Write `data` to `directory/filename` via temp file and rename
///
/// # Errors
///
/// Returns `DownloadError` if:
/// - The filename is not a single safe path component
/// - The destination exists and `force` is not set
/// - The temp file cannot be written or renamed
pub async fn write_atomic(
    directory: &Path,
    filename: &str,
    data: &[u8],
    force: bool,
) -> DownloadResult<PathBuf> {
    let final_path = destination_path(directory, filename)?;

    if !force && fs::try_exists(&final_path).await? {
        return Err(DownloadError::FileExists { path: final_path });
    }

    fs::create_dir_all(directory).await?;

    let temp_path = directory.join(format!("{}{}", filename, files::TEMP_FILE_SUFFIX));
    debug!("Writing {} bytes to {}", data.len(), temp_path.display());
    fs::write(&temp_path, data).await.map_err(|e| {
        error!("Failed to write temporary file {}: {}", temp_path.display(), e);
        DownloadError::Io(e)
    })?;

    if let Err(e) = fs::rename(&temp_path, &final_path).await {
        error!("Failed to rename temporary file: {}", e);
        let _ = fs::remove_file(&temp_path).await;
        return Err(DownloadError::AtomicOperationFailed {
            temp_path,
            final_path,
        });
    }

    info!("Saved {} ({} bytes)", final_path.display(), data.len());
    Ok(final_path)
}
