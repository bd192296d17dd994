use serde::Serialize;

use fundsheet_sheets::layout::NUMERIC_METRICS;
use fundsheet_sheets::pad_row;

use super::{recompute, FundPipelines, RunBanner};
use crate::domain::{parse_decimal, FundKey};
use crate::error::PipelineError;

/// Result of an integrity sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub scanned: usize,
    pub repaired: usize,
    /// Invalid rows without a usable key.
    pub skipped: usize,
}

/// Whether every numeric metric cell of a padded row parses as a decimal.
pub fn metrics_are_valid(cells: &[String]) -> bool {
    NUMERIC_METRICS.clone().all(|column| {
        cells
            .get(column)
            .is_some_and(|cell| parse_decimal(cell).is_some())
    })
}

impl FundPipelines {
    /// Re-reads every data row and recomputes the ones with missing or
    /// non-numeric metrics, one row and one update at a time.
    ///
    /// # Errors
    ///
    /// A store failure ends the sweep; rows repaired before it stay written.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, PipelineError> {
        let banner = RunBanner::begin("integrity check");
        let outcome = self.check_integrity_inner().await;
        banner.end();
        outcome
    }

    async fn check_integrity_inner(&self) -> Result<IntegrityReport, PipelineError> {
        let sheet = self.layout.sheet();
        let rows = self.store.read(sheet, &self.layout.data_range()).await?;
        let today = self.today();
        let mut report = IntegrityReport {
            scanned: rows.len(),
            ..IntegrityReport::default()
        };

        for (index, row) in rows.iter().enumerate() {
            let cells = pad_row(row);
            if metrics_are_valid(&cells) {
                continue;
            }

            let sheet_row = self.layout.sheet_row(index);
            let Some(key) = FundKey::from_row(&cells) else {
                tracing::warn!(sheet, row = sheet_row, "invalid row has no fund key, skipped");
                report.skipped += 1;
                continue;
            };

            tracing::info!(
                sheet,
                row = sheet_row,
                class_id = %key.class_id,
                fund_id = %key.fund_id,
                "repairing row"
            );
            let metrics = recompute(
                self.source.as_ref(),
                &key,
                self.settings.interval_days,
                today,
            )
            .await;
            self.store
                .update(
                    sheet,
                    &self.layout.metrics_row_range(index),
                    vec![metrics.to_cells()],
                )
                .await?;
            report.repaired += 1;
        }

        tracing::info!(
            sheet,
            scanned = report.scanned,
            repaired = report.repaired,
            skipped = report.skipped,
            "integrity sweep done"
        );
        Ok(report)
    }
}
