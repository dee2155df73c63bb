//! Import job listing.

use importer_client::{ClientError, JobQuery};
use importer_core::{ImportJob, ImportJobId, ImportStatus};
use tracing::warn;

use crate::coordinator::ImportCoordinator;
use crate::error::Result;
use crate::state::Shared;

impl Shared {
    /// Fetch the job list with the current query.
    pub(crate) async fn fetch_jobs(&self) -> importer_client::Result<Vec<ImportJob>> {
        let query = self.ui().jobs_query.clone();
        self.api.list_import_jobs(&query).await
    }

    /// Replace the job table.
    pub(crate) fn store_jobs(&self, jobs: Vec<ImportJob>) {
        self.update(|ui| ui.jobs = jobs);
    }

    pub(crate) fn report_jobs_error(&self, error: &ClientError) {
        warn!(error = %error, "failed to load import jobs");
        self.notifier.error("Failed to load import jobs");
    }

    /// Fetch and store the job list, reporting failures.
    pub(crate) async fn load_jobs(&self) -> std::result::Result<Vec<ImportJob>, ClientError> {
        match self.fetch_jobs().await {
            Ok(jobs) => {
                self.store_jobs(jobs.clone());
                Ok(jobs)
            }
            Err(e) => {
                self.report_jobs_error(&e);
                Err(e)
            }
        }
    }
}

impl ImportCoordinator {
    /// Reload the job table.
    pub async fn load_jobs(&self) -> Result<Vec<ImportJob>> {
        Ok(self.shared.load_jobs().await?)
    }

    /// Change paging or status filter of the job table and reload it.
    pub async fn set_jobs_query(&self, query: JobQuery) -> Result<Vec<ImportJob>> {
        self.shared.update(|ui| ui.jobs_query = query);
        self.load_jobs().await
    }

    /// Show only jobs with the given status, or all when `None`.
    pub async fn filter_jobs(&self, status: Option<ImportStatus>) -> Result<Vec<ImportJob>> {
        let mut query = self.shared.ui().jobs_query.clone();
        query.status = status;
        query.skip = 0;
        self.set_jobs_query(query).await
    }

    /// Fetch a single import job.
    pub async fn import_job(&self, id: ImportJobId) -> Result<ImportJob> {
        match self.shared.api.get_import_job(id).await {
            Ok(job) => Ok(job),
            Err(e) => {
                warn!(job_id = id, error = %e, "failed to load import job");
                self.shared.notifier.error("Failed to load import job");
                Err(e.into())
            }
        }
    }
}
