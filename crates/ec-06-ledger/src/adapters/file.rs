use crate::domain::block::Block;
use crate::domain::errors::StoreError;
use crate::ports::LedgerStore;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// File-backed ledger store.
///
/// The chain is kept as a pretty-printed JSON array of blocks. Saves go to a
/// uniquely named temp file in the ledger's directory that is fsynced and then
/// renamed over the ledger, so a reader sees either the old chain or the new
/// one. The directory is synced after the rename.
#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    path: PathBuf,
}

impl FileLedgerStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Directory the ledger lives in; `.` for a bare file name.
    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    #[cfg(unix)]
    fn sync_dir(&self, dir: &Path) -> Result<(), StoreError> {
        fs::File::open(dir)
            .and_then(|d| d.sync_all())
            .map_err(|e| self.io_error(e))
    }

    #[cfg(not(unix))]
    fn sync_dir(&self, _dir: &Path) -> Result<(), StoreError> {
        Ok(())
    }
}

impl LedgerStore for FileLedgerStore {
    fn load(&self) -> Result<Vec<Block>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("[ec-06] 📁 No existing ledger at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let blocks: Vec<Block> =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Format {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        info!(
            "[ec-06] 💾 Loaded {} blocks from {} ({} bytes)",
            blocks.len(),
            self.path.display(),
            bytes.len()
        );
        Ok(blocks)
    }

    fn save(&self, blocks: &[Block]) -> Result<(), StoreError> {
        let dir = self.parent_dir().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let bytes = serde_json::to_vec_pretty(blocks).map_err(|e| StoreError::Format {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        // Write atomically via a uniquely named temp file in the same directory.
        // Dropping it on any error path removes it.
        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        temp.write_all(&bytes).map_err(|e| self.io_error(e))?;
        temp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        temp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        self.sync_dir(&dir)?;

        debug!(
            "[ec-06] saved {} blocks to {}",
            blocks.len(),
            self.path.display()
        );
        Ok(())
    }
}
