use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::{recompute, FundPipelines, RunBanner};
use crate::domain::{format_sheet_date, FundKey, FundMetrics};
use crate::error::PipelineError;

/// Result of a metrics refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Data rows refreshed.
    pub rows: usize,
    /// Rows whose key cells were incomplete.
    pub missing_keys: usize,
    /// Rows left with at least one null metric.
    pub degraded: usize,
}

impl FundPipelines {
    /// Recomputes the metric block of every stored row and writes it back in
    /// one bulk update.
    ///
    /// # Errors
    ///
    /// A store failure or a failed worker task ends the run; per-fund data
    /// source trouble only degrades that row to null metrics.
    pub async fn update(&self) -> Result<UpdateReport, PipelineError> {
        let banner = RunBanner::begin("update");
        let outcome = self.update_inner().await;
        banner.end();
        outcome
    }

    async fn update_inner(&self) -> Result<UpdateReport, PipelineError> {
        let sheet = self.layout.sheet();
        let key_rows = self.store.read(sheet, &self.layout.fund_codes_range()).await?;
        if key_rows.is_empty() {
            tracing::info!(sheet, "no fund rows to update");
            return Ok(UpdateReport::default());
        }

        let today = self.today();
        let interval_days = self.settings.interval_days;
        let workers = self.settings.workers.max(1);
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();
        let mut missing_keys = 0usize;

        tracing::info!(rows = key_rows.len(), workers, "refreshing fund metrics");
        for (index, cells) in key_rows.iter().enumerate() {
            let Some(key) = FundKey::from_pair(cells) else {
                missing_keys += 1;
                tracing::warn!(
                    sheet,
                    row = self.layout.sheet_row(index),
                    "fund key incomplete, metrics left empty"
                );
                let metrics = FundMetrics::empty(format_sheet_date(today));
                tasks.spawn(async move { (index, metrics) });
                continue;
            };

            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                tracing::debug!(class_id = %key.class_id, fund_id = %key.fund_id, "recomputing");
                let metrics = recompute(source.as_ref(), &key, interval_days, today).await;
                (index, metrics)
            });
        }

        let mut results = Vec::with_capacity(key_rows.len());
        while let Some(joined) = tasks.join_next().await {
            results.push(joined?);
        }
        results.sort_by_key(|(index, _)| *index);

        let degraded = results
            .iter()
            .filter(|(_, metrics)| has_null_metric(metrics))
            .count();
        let values: Vec<Vec<String>> = results
            .into_iter()
            .map(|(_, metrics)| metrics.to_cells())
            .collect();
        let rows = values.len();

        self.store
            .update(sheet, &self.layout.metrics_range(rows), values)
            .await?;
        tracing::info!(sheet, rows, missing_keys, degraded, "fund metrics written");

        Ok(UpdateReport {
            rows,
            missing_keys,
            degraded,
        })
    }
}

fn has_null_metric(metrics: &FundMetrics) -> bool {
    [
        metrics.tna,
        metrics.tea,
        metrics.tem,
        metrics.monthly_performance,
        metrics.six_month_performance,
        metrics.year_performance,
    ]
    .iter()
    .any(Option::is_none)
}
