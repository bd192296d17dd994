use serde::Serialize;

use fundsheet_sheets::FundSheetLayout;

use super::{FundPipelines, RunBanner};
use crate::error::PipelineError;
use crate::mapper::flatten_fund_group;

/// Result of a bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// The sheet already held data rows; nothing was fetched or written.
    Skipped { existing_rows: usize },
    Appended { groups: usize, rows: usize },
}

impl FundPipelines {
    /// Populates an empty sheet with every class of the catalog.
    ///
    /// # Errors
    ///
    /// A catalog failure or a mapping error aborts before any row is written;
    /// a store error aborts the run where it happens.
    pub async fn ingest(&self) -> Result<IngestOutcome, PipelineError> {
        let banner = RunBanner::begin("bootstrap");
        let outcome = self.ingest_inner().await;
        banner.end();
        outcome
    }

    async fn ingest_inner(&self) -> Result<IngestOutcome, PipelineError> {
        let sheet = self.layout.sheet();
        let existing = self.store.read(sheet, &self.layout.full_range()).await?;
        if existing.len() > 1 {
            tracing::info!(
                sheet,
                rows = existing.len(),
                "sheet already populated, bootstrap skipped"
            );
            return Ok(IngestOutcome::Skipped {
                existing_rows: existing.len(),
            });
        }

        let groups = self.source.fetch_catalog().await?;
        let today = self.today();

        let mut rows = Vec::new();
        for group in &groups {
            let flattened = flatten_fund_group(group, &self.settings.class_filter, today)?;
            rows.extend(flattened.iter().map(|row| row.to_cells()));
        }
        tracing::info!(groups = groups.len(), rows = rows.len(), "catalog flattened");

        if existing.is_empty() {
            tracing::info!(sheet, "empty sheet, writing header row");
            self.store
                .append(
                    sheet,
                    &self.layout.header_range(),
                    vec![FundSheetLayout::header_row()],
                )
                .await?;
        }

        let total = rows.len();
        let chunk_size = self.settings.append_chunk.max(1);
        let range = self.layout.full_range();
        let mut chunks = 0usize;
        let mut pending = rows.into_iter().peekable();
        while pending.peek().is_some() {
            let chunk: Vec<Vec<String>> = pending.by_ref().take(chunk_size).collect();
            let written = chunk.len();
            self.store.append(sheet, &range, chunk).await?;
            chunks += 1;
            tracing::debug!(sheet, chunk = chunks, rows = written, "rows appended");
        }
        tracing::info!(sheet, rows = total, chunks, "bootstrap rows appended");

        Ok(IngestOutcome::Appended {
            groups: groups.len(),
            rows: total,
        })
    }
}
