use crate::{
    config::Config,
    error::{Error, Result},
};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, info};

/// Writes the aggregated document to its destination with atomic operations.
pub(crate) struct Writer {
    output_path: PathBuf,
    backup_existing: bool,
}

impl Writer {
    /// Creates a new writer from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            output_path: config.output_path.clone(),
            backup_existing: config.backup_existing,
        }
    }

    /// Writes the document, creating parent directories as needed.
    ///
    /// # Process
    ///
    /// 1. Creates backup if file exists and backup is enabled
    /// 2. Writes content to temporary file
    /// 3. Syncs temporary file to disk
    /// 4. Atomically renames temporary file to target path
    ///
    /// The temporary file is removed again if any later step fails.
    ///
    /// # Errors
    ///
    /// Returns an error if any filesystem operation fails.
    pub(crate) fn write(&self, content: &str) -> Result<()> {
        let path = &self.output_path;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        if path.exists() && self.backup_existing {
            self.backup_file(path)?;
        }

        let temp_path = temp_path_for(path);
        if let Err(e) = write_and_rename(&temp_path, path, content) {
            if fs::remove_file(&temp_path).is_ok() {
                debug!("Removed temporary file {}", temp_path.display());
            }
            return Err(e);
        }

        info!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    /// Creates a timestamped backup of an existing file.
    fn backup_file(&self, path: &Path) -> Result<PathBuf> {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|e| Error::config(format!("System clock is before the epoch: {e}")))?
            .as_nanos();

        let filename = path
            .file_name()
            .ok_or_else(|| Error::config("Invalid output path"))?
            .to_string_lossy();

        let backup_path = path.with_file_name(format!("{filename}.backup.{timestamp}"));

        fs::copy(path, &backup_path).map_err(|e| Error::io(&backup_path, e))?;

        debug!("Created backup: {}", backup_path.display());
        Ok(backup_path)
    }
}

fn write_and_rename(temp_path: &Path, path: &Path, content: &str) -> Result<()> {
    let mut temp_file = fs::File::create(temp_path).map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .sync_all()
        .map_err(|e| Error::io(temp_path, e))?;

    drop(temp_file);

    fs::rename(temp_path, path).map_err(|e| Error::io(path, e))
}

/// Sibling temporary file, so the final rename stays on one filesystem.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
