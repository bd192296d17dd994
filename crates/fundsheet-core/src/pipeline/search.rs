use fundsheet_sheets::{rows_to_records, FundRecord};

use super::FundPipelines;
use crate::error::PipelineError;

impl FundPipelines {
    /// Stored rows whose fund name contains `query`, ignoring case, keyed by
    /// class id.
    pub async fn search_by_name(
        &self,
        query: &str,
    ) -> Result<Vec<(String, FundRecord)>, PipelineError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(PipelineError::InvalidInput(String::from(
                "search query must not be empty",
            )));
        }

        let rows = self
            .store
            .read(self.layout.sheet(), &self.layout.data_range())
            .await?;
        let matches: Vec<(String, FundRecord)> = rows_to_records(&rows)
            .into_iter()
            .filter(|(_, record)| {
                record
                    .get("name")
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .collect();

        tracing::debug!(query, scanned = rows.len(), matches = matches.len(), "search done");
        Ok(matches)
    }
}
