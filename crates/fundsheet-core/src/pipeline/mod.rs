//! # Pipelines
//!
//! Orchestration over a [`FundDataSource`] and a [`SheetStore`].
//!
//! | Entry point | Reads | Writes |
//! |-------------|-------|--------|
//! | [`FundPipelines::ingest`] | `A1:O` | header (empty sheet), then appended rows in chunks |
//! | [`FundPipelines::update`] | `D2:E` | one bulk update of `H2:N{1+n}` |
//! | [`FundPipelines::check_integrity`] | `A2:O` | one `H{r}:N{r}` update per repaired row |
//! | [`FundPipelines::search_by_name`] | `A2:O` | nothing |
//!
//! Each entry point can run on its own and can be repeated: ingestion skips a
//! populated sheet, and recomputation overwrites the metric block in place.

mod ingest;
mod integrity;
mod search;
mod update;

use std::sync::Arc;
use std::time::Instant;

use time::Date;

use fundsheet_sheets::{FundSheetLayout, SheetStore};

use crate::config::{PipelineSettings, Settings};
use crate::data_source::FundDataSource;
use crate::domain::{format_sheet_date, today_in_buenos_aires, DateWindow, FundKey, FundMetrics};
use crate::rates::projection;

pub use ingest::IngestOutcome;
pub use integrity::{metrics_are_valid, IntegrityReport};
pub use update::UpdateReport;

/// Performance windows, in days: monthly, six-month and yearly.
pub const PERFORMANCE_WINDOWS: [u32; 3] = [30, 180, 365];

/// The pipelines, bound to one data source, one store and one settings snapshot.
#[derive(Clone)]
pub struct FundPipelines {
    source: Arc<dyn FundDataSource>,
    store: Arc<dyn SheetStore>,
    layout: FundSheetLayout,
    settings: PipelineSettings,
    today: Option<Date>,
}

impl FundPipelines {
    pub fn new(
        source: Arc<dyn FundDataSource>,
        store: Arc<dyn SheetStore>,
        settings: &Settings,
    ) -> Self {
        Self {
            source,
            store,
            layout: FundSheetLayout::default(),
            settings: settings.pipeline.clone(),
            today: None,
        }
    }

    /// Pins the calendar date instead of reading the Buenos Aires clock.
    pub fn with_today(mut self, today: Date) -> Self {
        self.today = Some(today);
        self
    }

    pub fn layout(&self) -> &FundSheetLayout {
        &self.layout
    }

    fn today(&self) -> Date {
        self.today.unwrap_or_else(today_in_buenos_aires)
    }
}

/// Recomputes the metric block of one fund class.
///
/// Prices come from the `interval_days` window, performance figures from the
/// 30, 180 and 365 day windows; all windows end on the last Friday.
pub(crate) async fn recompute(
    source: &dyn FundDataSource,
    key: &FundKey,
    interval_days: u32,
    today: Date,
) -> FundMetrics {
    let prices = source
        .fetch_price_pair(key, DateWindow::last_days(interval_days, today))
        .await;
    let rates = projection(prices.initial, prices.last, interval_days);

    let [month, six_months, year] = PERFORMANCE_WINDOWS;
    let (monthly_performance, six_month_performance, year_performance) = tokio::join!(
        source.fetch_performance(key, DateWindow::last_days(month, today)),
        source.fetch_performance(key, DateWindow::last_days(six_months, today)),
        source.fetch_performance(key, DateWindow::last_days(year, today)),
    );

    FundMetrics {
        tna: rates.tna,
        tea: rates.tea,
        tem: rates.tem,
        monthly_performance,
        six_month_performance,
        year_performance,
        updated_at: format_sheet_date(today),
    }
}

/// Start/end log lines around a pipeline run.
struct RunBanner {
    name: &'static str,
    started: Instant,
}

impl RunBanner {
    fn begin(name: &'static str) -> Self {
        tracing::info!(pipeline = name, "==== {name} started ====");
        Self {
            name,
            started: Instant::now(),
        }
    }

    fn end(self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        tracing::info!(
            pipeline = self.name,
            elapsed_ms,
            "==== {} finished in {:.1}s ====",
            self.name,
            elapsed_ms as f64 / 1000.0
        );
    }
}
