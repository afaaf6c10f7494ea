//! Delivery of built workbooks

use std::fs;
use std::path::{Path, PathBuf};

use super::{ExportError, ExportFile};

/// Hands a built workbook to the user
pub trait DownloadTrigger: Send + Sync {
    /// Deliver `file`, returning where it ended up
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Delivery`] if the file cannot be handed over.
    fn deliver(&self, file: &ExportFile) -> Result<PathBuf, ExportError>;
}

/// Writes workbooks into a directory, creating it if needed
#[derive(Debug, Clone)]
pub struct SaveToDirectory {
    directory: PathBuf,
}

impl SaveToDirectory {
    /// Save into `directory`
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Target directory
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl DownloadTrigger for SaveToDirectory {
    fn deliver(&self, file: &ExportFile) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(&file.file_name);
        fs::write(&path, &file.bytes)?;
        Ok(path)
    }
}
