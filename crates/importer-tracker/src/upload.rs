//! CSV upload.
//!
//! The file is checked before anything is sent: it must be present and end
//! in `.csv`. A successful upload hands its task id to the progress poller.
//! The upload control is back to ready when the call returns, whatever the
//! outcome.

use std::path::Path;

use importer_client::UploadFile;
use importer_core::TaskId;
use tracing::{info, warn};

use crate::coordinator::ImportCoordinator;
use crate::error::{Result, TrackerError};
use crate::state::{Shared, UploadControl};

/// Marks the upload control busy until dropped.
struct BusyGuard<'a> {
    shared: &'a Shared,
}

impl<'a> BusyGuard<'a> {
    fn new(shared: &'a Shared) -> Self {
        shared.update(|ui| ui.upload = UploadControl::Uploading);
        Self { shared }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.shared.update(|ui| ui.upload = UploadControl::Ready);
    }
}

/// Returns true if `filename` has a `.csv` extension, in any case.
pub fn is_csv(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".csv")
}

impl ImportCoordinator {
    /// Upload the file at `path` and start tracking its import.
    ///
    /// `None` means no file was chosen.
    pub async fn upload(&self, path: Option<&Path>) -> Result<TaskId> {
        let _busy = BusyGuard::new(&self.shared);

        let path = match path {
            Some(path) => path,
            None => return Err(self.reject(TrackerError::NoFileSelected)),
        };
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_csv(&filename) {
            return Err(self.reject(TrackerError::InvalidFileType { filename }));
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(source) => {
                let err = TrackerError::Io {
                    path: path.display().to_string(),
                    source,
                };
                self.shared.notifier.error(err.to_string());
                return Err(err);
            }
        };

        self.send_upload(UploadFile::new(filename, bytes)).await
    }

    /// Upload already-read file contents and start tracking the import.
    pub async fn upload_file(&self, file: UploadFile) -> Result<TaskId> {
        let _busy = BusyGuard::new(&self.shared);
        if !is_csv(&file.filename) {
            return Err(self.reject(TrackerError::InvalidFileType {
                filename: file.filename,
            }));
        }
        self.send_upload(file).await
    }

    async fn send_upload(&self, file: UploadFile) -> Result<TaskId> {
        let filename = file.filename.clone();
        match self.shared.api.upload_csv(file).await {
            Ok(receipt) => {
                info!(filename = %filename, task_id = %receipt.task_id, "upload accepted");
                // The old loop must be cancelled before progress is cleared.
                self.poller.arm(receipt.task_id.clone());
                self.shared.update(|ui| {
                    ui.progress_visible = true;
                    ui.progress = None;
                });
                self.shared
                    .notifier
                    .success("File uploaded successfully! Processing...");
                Ok(receipt.task_id)
            }
            Err(e) => {
                warn!(filename = %filename, error = %e, "upload failed");
                self.shared.notifier.error(e.detail_or("Upload failed"));
                Err(e.into())
            }
        }
    }

    /// Notify about a precondition failure and hand the error back.
    fn reject(&self, err: TrackerError) -> TrackerError {
        let message = match &err {
            TrackerError::InvalidFileType { .. } => "Please select a CSV file".to_string(),
            other => other.to_string(),
        };
        self.shared.notifier.error(message);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_csv_ignores_case() {
        assert!(is_csv("products.csv"));
        assert!(is_csv("PRODUCTS.CSV"));
        assert!(!is_csv("products.csv.txt"));
        assert!(!is_csv("csv"));
        assert!(!is_csv(""));
    }
}
