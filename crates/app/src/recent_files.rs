//! Recently opened documents, persisted as a JSON list.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Maximum number of recent files to track.
const MAX_RECENT_FILES: usize = 10;

/// Errors reading or writing the recent-files list.
#[derive(Debug, Error)]
pub enum RecentFilesError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Most-recent-first list of opened files, capped at [`MAX_RECENT_FILES`].
#[derive(Debug, Clone)]
pub struct RecentFiles {
    files: Vec<PathBuf>,
    storage_path: PathBuf,
}

impl RecentFiles {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            storage_path: Self::default_storage_path(),
        }
    }

    #[cfg(test)]
    fn with_storage_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            files: Vec::new(),
            storage_path: path.as_ref().to_path_buf(),
        }
    }

    fn default_storage_path() -> PathBuf {
        if let Some(data_dir) = dirs::data_dir() {
            data_dir.join("preview-demo").join("recent_files.json")
        } else {
            PathBuf::from("recent_files.json")
        }
    }

    /// Add a file to the front of the list, de-duplicating by path.
    pub fn add<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref().to_path_buf();
        self.files.retain(|p| p != &path);
        self.files.insert(0, path);
        self.files.truncate(MAX_RECENT_FILES);
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Load the list from disk, dropping entries that no longer exist.
    pub fn load(&mut self) -> Result<(), RecentFilesError> {
        if !self.storage_path.exists() {
            return Ok(());
        }
        let contents = fs::read_to_string(&self.storage_path)?;
        self.files = serde_json::from_str(&contents)?;
        self.files.retain(|p| p.exists());
        Ok(())
    }

    pub fn save(&self) -> Result<(), RecentFilesError> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.files)?;
        fs::write(&self.storage_path, json)?;
        Ok(())
    }
}

impl Default for RecentFiles {
    fn default() -> Self {
        Self::new()
    }
}
