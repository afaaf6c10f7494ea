//! Download trigger that only records what it was given

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::export::{DownloadTrigger, ExportError, ExportFile};

/// Keeps every delivered file in memory
#[derive(Debug, Default)]
pub struct RecordingDownload {
    delivered: Mutex<Vec<ExportFile>>,
}

impl RecordingDownload {
    /// A trigger with nothing delivered yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files delivered so far
    #[must_use]
    pub fn deliveries(&self) -> Vec<ExportFile> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DownloadTrigger for RecordingDownload {
    fn deliver(&self, file: &ExportFile) -> Result<PathBuf, ExportError> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(file.clone());
        Ok(PathBuf::from(&file.file_name))
    }
}
