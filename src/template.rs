use log::{error, info};
use std::fs;
use std::path::Path;

use crate::error::{PatchError, Result};

/// Read the template as UTF-8 text
pub fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| {
        error!("Failed to read template {}: {}", path.display(), source);
        PatchError::Read {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Overwrite the template in place, creating parent directories first.
///
/// Returns the size of the file on disk after the write.
pub fn write_template(path: &Path, content: &str) -> Result<u64> {
    let to_write_error = |source: std::io::Error| {
        error!("Failed to write template {}: {}", path.display(), source);
        PatchError::Write {
            path: path.to_path_buf(),
            source,
        }
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(to_write_error)?;
        }
    }

    fs::write(path, content).map_err(to_write_error)?;
    let size = fs::metadata(path).map_err(to_write_error)?.len();

    info!("Template written: {} ({} bytes)", path.display(), size);
    Ok(size)
}
