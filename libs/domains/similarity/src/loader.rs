use std::sync::Arc;

use crate::error::ServiceResult;
use crate::index::VectorIndex;
use crate::models::LOAD_PAGE_SIZE;
use crate::service::ContentService;
use crate::source::RecordSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    /// Drop and recreate the domain index before loading.
    pub rebuild: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub fetched: usize,
    pub indexed: usize,
    pub pages: usize,
}

/// Copies every record of a source into a domain index, one page at a time.
pub struct BulkLoader<S: RecordSource, R: VectorIndex> {
    source: S,
    service: Arc<ContentService<R>>,
}

impl<S: RecordSource, R: VectorIndex> BulkLoader<S, R> {
    pub fn new(source: S, service: Arc<ContentService<R>>) -> Self {
        Self { source, service }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The first failure aborts the run; pages already written stay indexed.
    pub async fn run(&self, options: LoadOptions) -> ServiceResult<LoadReport> {
        let domain = self.service.domain();

        if options.rebuild {
            self.service.rebuild_index().await?;
        }

        let records = self.source.fetch_records().await?;
        tracing::info!(%domain, "Attempting to index {} records", records.len());

        let mut report = LoadReport {
            fetched: records.len(),
            ..LoadReport::default()
        };

        for page in records.chunks(LOAD_PAGE_SIZE) {
            report.indexed += self.service.add_to_index(page).await?;
            report.pages += 1;
            tracing::info!(%domain, total = report.indexed, "Inserted {} records", page.len());
        }

        tracing::info!(%domain, "Completed, indexed {} records", report.indexed);
        Ok(report)
    }
}
