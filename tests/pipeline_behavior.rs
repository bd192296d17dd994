//! Behavior-driven tests for the fund pipelines
//!
//! These tests verify HOW bootstrap, update, integrity repair and search use
//! the data source and the store: what they read, what they write and what
//! they leave alone.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fundsheet_core::{
    DateWindow, FundDataSource, FundKey, FundPipelines, IngestOutcome, IntegrityReport,
    PipelineError, PricePair, RawFundGroup, Settings, SourceError, SourceFuture,
};
use fundsheet_sheets::{FundSheetLayout, MemorySheet, SheetStore, StoreError, StoreFuture};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::date;
use time::Date;

const TODAY: Date = date!(2024 - 03 - 10);
const TODAY_CELL: &str = "10-03-2024";

// =============================================================================
// Test doubles
// =============================================================================

/// Data source with canned answers and call counters.
#[derive(Default)]
struct FakeSource {
    catalog: Vec<RawFundGroup>,
    prices: HashMap<String, PricePair>,
    delays_ms: HashMap<String, u64>,
    catalog_calls: AtomicUsize,
    price_calls: AtomicUsize,
    performance_calls: AtomicUsize,
}

impl FakeSource {
    fn with_catalog(catalog: Vec<RawFundGroup>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    fn with_price(mut self, class_id: &str, initial: Decimal, last: Decimal) -> Self {
        self.prices
            .insert(class_id.to_string(), PricePair::new(initial, last));
        self
    }

    fn with_delay(mut self, class_id: &str, millis: u64) -> Self {
        self.delays_ms.insert(class_id.to_string(), millis);
        self
    }

    fn total_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
            + self.price_calls.load(Ordering::SeqCst)
            + self.performance_calls.load(Ordering::SeqCst)
    }
}

impl FundDataSource for FakeSource {
    fn fetch_catalog<'a>(&'a self) -> SourceFuture<'a, Result<Vec<RawFundGroup>, SourceError>> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        let catalog = self.catalog.clone();
        Box::pin(async move { Ok(catalog) })
    }

    fn fetch_price_pair<'a>(
        &'a self,
        key: &'a FundKey,
        _window: DateWindow,
    ) -> SourceFuture<'a, PricePair> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Some(millis) = self.delays_ms.get(&key.class_id) {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
            }
            self.prices
                .get(&key.class_id)
                .copied()
                .unwrap_or_else(PricePair::null)
        })
    }

    fn fetch_performance<'a>(
        &'a self,
        _key: &'a FundKey,
        window: DateWindow,
    ) -> SourceFuture<'a, Option<Decimal>> {
        self.performance_calls.fetch_add(1, Ordering::SeqCst);
        // 30 days -> 0.30, 180 -> 1.80, 365 -> 3.65
        let value = Decimal::new(window.days(), 2);
        Box::pin(async move { Some(value) })
    }

    fn check_connection<'a>(&'a self) -> SourceFuture<'a, bool> {
        Box::pin(async { true })
    }
}

/// Memory sheet that records every write.
struct RecordingStore {
    inner: MemorySheet,
    appends: Mutex<Vec<(String, usize)>>,
    updates: Mutex<Vec<(String, Vec<Vec<String>>)>>,
    fail_updates: bool,
}

impl RecordingStore {
    fn new(rows: Vec<Vec<String>>) -> Arc<Self> {
        Arc::new(Self::build(rows, false))
    }

    fn failing_updates(rows: Vec<Vec<String>>) -> Arc<Self> {
        Arc::new(Self::build(rows, true))
    }

    fn build(rows: Vec<Vec<String>>, fail_updates: bool) -> Self {
        Self {
            inner: MemorySheet::new().with_sheet("funds", rows),
            appends: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            fail_updates,
        }
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.inner.rows("funds")
    }

    fn appends(&self) -> Vec<(String, usize)> {
        self.appends.lock().expect("appends").clone()
    }

    fn updates(&self) -> Vec<(String, Vec<Vec<String>>)> {
        self.updates.lock().expect("updates").clone()
    }

    fn write_count(&self) -> usize {
        self.appends().len() + self.updates().len()
    }
}

impl SheetStore for RecordingStore {
    fn read<'a>(&'a self, sheet: &'a str, range: &'a str) -> StoreFuture<'a, Vec<Vec<String>>> {
        self.inner.read(sheet, range)
    }

    fn append<'a>(
        &'a self,
        sheet: &'a str,
        range: &'a str,
        rows: Vec<Vec<String>>,
    ) -> StoreFuture<'a, usize> {
        self.appends
            .lock()
            .expect("appends")
            .push((range.to_string(), rows.len()));
        self.inner.append(sheet, range, rows)
    }

    fn update<'a>(
        &'a self,
        sheet: &'a str,
        range: &'a str,
        rows: Vec<Vec<String>>,
    ) -> StoreFuture<'a, usize> {
        self.updates
            .lock()
            .expect("updates")
            .push((range.to_string(), rows.clone()));
        if self.fail_updates {
            let error = StoreError::Status {
                sheet: sheet.to_string(),
                range: range.to_string(),
                status: 503,
                body: String::from("backend error"),
            };
            return Box::pin(async move { Err(error) });
        }
        self.inner.update(sheet, range, rows)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn header() -> Vec<String> {
    FundSheetLayout::header_row()
}

fn stored_row(class_id: &str, fund_id: &str, name: &str, metrics: [&str; 6]) -> Vec<String> {
    let mut row = cells(&["A", name, "ARS", class_id, fund_id, "24", "1"]);
    row.extend(metrics.iter().map(|m| (*m).to_string()));
    row.push(String::from("01-03-2024"));
    row
}

fn group(id: usize, classes: usize) -> RawFundGroup {
    let classes: Vec<serde_json::Value> = (0..classes)
        .map(|n| {
            serde_json::json!({
                "id": format!("{id}{n}"),
                "nombre": format!("Fondo {id} - Clase {}", char::from(b'A' + n as u8)),
            })
        })
        .collect();
    serde_json::from_value(serde_json::json!({
        "id": id.to_string(),
        "nombre": format!("Fondo {id}"),
        "monedaId": "1",
        "diasLiquidacion": "1",
        "tipoRentaId": "4",
        "clase_fondos": classes,
    }))
    .expect("group fixture")
}

fn pipelines(source: Arc<FakeSource>, store: Arc<RecordingStore>) -> FundPipelines {
    pipelines_with(source, store, Settings::default())
}

fn pipelines_with(
    source: Arc<FakeSource>,
    store: Arc<RecordingStore>,
    settings: Settings,
) -> FundPipelines {
    FundPipelines::new(source, store, &settings).with_today(TODAY)
}

// =============================================================================
// Bootstrap
// =============================================================================

#[tokio::test]
async fn when_sheet_already_has_data_bootstrap_makes_no_calls_and_no_writes() {
    // Given: A sheet with a header and one fund row
    let store = RecordingStore::new(vec![
        header(),
        stored_row("40", "12", "Fondo", ["", "", "", "", "", ""]),
    ]);
    let source = Arc::new(FakeSource::with_catalog(vec![group(1, 2)]));

    // When: Bootstrap runs
    let outcome = pipelines(source.clone(), store.clone())
        .ingest()
        .await
        .expect("ingest");

    // Then: It is a no-op
    assert_eq!(outcome, IngestOutcome::Skipped { existing_rows: 2 });
    assert_eq!(source.total_calls(), 0);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn when_sheet_is_empty_bootstrap_writes_header_then_chunked_rows() {
    // Given: An empty sheet and a catalog of 23 classes
    let store = RecordingStore::new(Vec::new());
    let source = Arc::new(FakeSource::with_catalog(vec![
        group(1, 10),
        group(2, 10),
        group(3, 3),
    ]));

    // When: Bootstrap runs with the default chunk of 10
    let outcome = pipelines(source.clone(), store.clone())
        .ingest()
        .await
        .expect("ingest");

    // Then: Header first, then 10 + 10 + 3 rows, all in catalog order
    assert_eq!(outcome, IngestOutcome::Appended { groups: 3, rows: 23 });
    let appends = store.appends();
    assert_eq!(
        appends.iter().map(|(_, n)| *n).collect::<Vec<_>>(),
        vec![1, 10, 10, 3]
    );
    let rows = store.rows();
    assert_eq!(rows.len(), 24);
    assert_eq!(rows[0], header());
    assert_eq!(rows[1][3], "10");
    assert_eq!(rows[23][3], "32");
    assert_eq!(rows[1][13], TODAY_CELL);
    assert_eq!(source.catalog_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn when_sheet_has_only_header_bootstrap_does_not_duplicate_it() {
    // Given: A sheet holding just the header row
    let store = RecordingStore::new(vec![header()]);
    let source = Arc::new(FakeSource::with_catalog(vec![group(7, 2)]));

    // When: Bootstrap runs
    pipelines(source, store.clone()).ingest().await.expect("ingest");

    // Then: Only the data rows are appended
    assert_eq!(store.appends().len(), 1);
    let rows = store.rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][0], "A");
    assert_eq!(rows[2][0], "B");
}

#[tokio::test]
async fn when_catalog_has_malformed_group_bootstrap_writes_nothing() {
    // Given: The second group has no class list
    let mut broken = group(2, 1);
    broken.clase_fondos = None;
    let store = RecordingStore::new(Vec::new());
    let source = Arc::new(FakeSource::with_catalog(vec![group(1, 1), broken]));

    // When: Bootstrap runs
    let result = pipelines(source, store.clone()).ingest().await;

    // Then: The mapping error surfaces before any write, header included
    assert!(matches!(result, Err(PipelineError::Mapping(_))));
    assert_eq!(store.write_count(), 0);
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn when_workers_finish_out_of_order_update_writes_rows_in_input_order() {
    // Given: Four rows whose lookups finish in reverse order
    let store = RecordingStore::new(vec![
        header(),
        stored_row("1", "10", "Uno", ["", "", "", "", "", ""]),
        stored_row("2", "10", "Dos", ["", "", "", "", "", ""]),
        stored_row("3", "10", "Tres", ["", "", "", "", "", ""]),
        stored_row("4", "10", "Cuatro", ["", "", "", "", "", ""]),
    ]);
    let source = Arc::new(
        FakeSource::default()
            .with_price("1", dec!(100), dec!(110))
            .with_price("2", dec!(100), dec!(100))
            .with_price("3", dec!(0), dec!(5))
            .with_delay("1", 60)
            .with_delay("2", 40)
            .with_delay("3", 20),
    );

    // When: Update runs
    let report = pipelines(source, store.clone()).update().await.expect("update");

    // Then: One bulk write over H2:N5, each row holding its own metrics
    assert_eq!(report.rows, 4);
    let updates = store.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, "H2:N5");

    let written = &updates[0].1;
    assert_eq!(
        written[0],
        cells(&["521.42", "14299.01", "50.45", "0.30", "1.80", "3.65", TODAY_CELL])
    );
    assert_eq!(
        written[1],
        cells(&["0.00", "0.00", "0.00", "0.30", "1.80", "3.65", TODAY_CELL])
    );
    assert_eq!(
        written[2],
        cells(&["0.00", "0.00", "0.00", "0.30", "1.80", "3.65", TODAY_CELL])
    );
    assert_eq!(
        written[3],
        cells(&["", "", "", "0.30", "1.80", "3.65", TODAY_CELL])
    );
    assert_eq!(report.degraded, 1);
}

#[tokio::test]
async fn when_key_cell_is_missing_update_keeps_row_position_with_empty_metrics() {
    // Given: The middle row has no fund id
    let keyless = stored_row("2", "", "Sin fondo", ["", "", "", "", "", ""]);
    let store = RecordingStore::new(vec![
        header(),
        stored_row("1", "10", "Uno", ["", "", "", "", "", ""]),
        keyless,
        stored_row("3", "10", "Tres", ["", "", "", "", "", ""]),
    ]);
    let source = Arc::new(FakeSource::default().with_price("1", dec!(100), dec!(110)));

    // When: Update runs
    let report = pipelines(source.clone(), store.clone())
        .update()
        .await
        .expect("update");

    // Then: The keyless row gets only the update date; the others are computed
    assert_eq!(report.missing_keys, 1);
    assert_eq!(source.price_calls.load(Ordering::SeqCst), 2);
    let rows = store.rows();
    assert_eq!(
        rows[2][7..].to_vec(),
        cells(&["", "", "", "", "", "", TODAY_CELL])
    );
    assert_eq!(rows[1][7], "521.42");
    assert_eq!(rows[3][12], "3.65");
}

#[tokio::test]
async fn when_store_rejects_write_back_update_fails_with_store_error() {
    // Given: A store whose updates fail
    let store = RecordingStore::failing_updates(vec![
        header(),
        stored_row("1", "10", "Uno", ["", "", "", "", "", ""]),
    ]);
    let source = Arc::new(FakeSource::default());

    // When: Update runs
    let result = pipelines(source, store.clone()).update().await;

    // Then: The run ends with the store error after a single attempt
    assert!(matches!(result, Err(PipelineError::Store(_))));
    assert_eq!(store.updates().len(), 1);
}

#[tokio::test]
async fn when_sheet_has_no_rows_update_writes_nothing() {
    // Given: A sheet with just the header
    let store = RecordingStore::new(vec![header()]);
    let source = Arc::new(FakeSource::default());

    // When: Update runs
    let report = pipelines(source.clone(), store.clone())
        .update()
        .await
        .expect("update");

    // Then: Nothing is fetched or written
    assert_eq!(report.rows, 0);
    assert_eq!(source.total_calls(), 0);
    assert_eq!(store.write_count(), 0);
}

// =============================================================================
// Integrity check
// =============================================================================

#[tokio::test]
async fn when_one_row_has_non_numeric_metric_check_repairs_exactly_that_row() {
    // Given: Three rows, the second with a text metric
    let valid = ["61.82", "84.89", "5.18", "1.10", "6.00", "12.00"];
    let store = RecordingStore::new(vec![
        header(),
        stored_row("1", "10", "Uno", valid),
        stored_row("2", "10", "Dos", ["61.82", "error", "5.18", "1.10", "6.00", "12.00"]),
        stored_row("3", "10", "Tres", valid),
    ]);
    let source = Arc::new(FakeSource::default().with_price("2", dec!(100), dec!(110)));

    // When: The integrity check runs
    let report = pipelines(source.clone(), store.clone())
        .check_integrity()
        .await
        .expect("check");

    // Then: One recomputation and one single-row update at sheet row 3
    assert_eq!(
        report,
        IntegrityReport {
            scanned: 3,
            repaired: 1,
            skipped: 0
        }
    );
    assert_eq!(source.price_calls.load(Ordering::SeqCst), 1);
    let updates = store.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, "H3:N3");
    assert_eq!(store.rows()[2][8], "14299.01");
}

#[tokio::test]
async fn when_every_row_is_valid_check_makes_no_calls_and_no_writes() {
    // Given: A fully populated sheet
    let valid = ["61.82", "84.89", "5.18", "1.10", "6.00", "12.00"];
    let store = RecordingStore::new(vec![
        header(),
        stored_row("1", "10", "Uno", valid),
        stored_row("2", "10", "Dos", ["0.00", "0.00", "0.00", "0.00", "0.00", "0.00"]),
    ]);
    let source = Arc::new(FakeSource::default());

    // When: The integrity check runs
    let report = pipelines(source.clone(), store.clone())
        .check_integrity()
        .await
        .expect("check");

    // Then: Nothing happens
    assert_eq!(report.repaired, 0);
    assert_eq!(source.total_calls(), 0);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn when_trailing_metrics_are_missing_check_treats_row_as_invalid() {
    // Given: A row the store returns without its empty trailing cells
    let store = RecordingStore::new(vec![header(), cells(&["A", "Uno", "ARS", "1", "10", "24", "1"])]);
    let source = Arc::new(FakeSource::default().with_price("1", dec!(100), dec!(110)));

    // When: The integrity check runs
    let report = pipelines(source, store.clone())
        .check_integrity()
        .await
        .expect("check");

    // Then: The short row is repaired in place
    assert_eq!(report.repaired, 1);
    assert_eq!(store.updates()[0].0, "H2:N2");
    assert_eq!(store.rows()[1][13], TODAY_CELL);
}

#[tokio::test]
async fn when_invalid_row_has_no_key_check_skips_it() {
    // Given: An invalid row without class or fund id
    let store = RecordingStore::new(vec![header(), cells(&["", "Huerfano"])]);
    let source = Arc::new(FakeSource::default());

    // When: The integrity check runs
    let report = pipelines(source.clone(), store.clone())
        .check_integrity()
        .await
        .expect("check");

    // Then: It is reported as skipped and nothing is fetched
    assert_eq!(report.skipped, 1);
    assert_eq!(source.total_calls(), 0);
    assert_eq!(store.write_count(), 0);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn when_searching_by_name_system_matches_case_insensitively() {
    // Given: Three stored funds
    let store = RecordingStore::new(vec![
        header(),
        stored_row("1", "10", "Alianza de Capitales", ["", "", "", "", "", ""]),
        stored_row("2", "20", "Renta Pesos", ["", "", "", "", "", ""]),
        stored_row("3", "30", "ALIANZA Ahorro", ["", "", "", "", "", ""]),
    ]);
    let source = Arc::new(FakeSource::default());

    // When: Searching for "alianza"
    let matches = pipelines(source, store)
        .search_by_name("alianza")
        .await
        .expect("search");

    // Then: Both Alianza funds come back keyed by class id
    let keys: Vec<&str> = matches.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, vec!["1", "3"]);
    assert_eq!(matches[0].1["fund_id"], "10");
}

#[tokio::test]
async fn when_search_query_is_blank_system_rejects_it() {
    // Given: Any sheet
    let store = RecordingStore::new(vec![header()]);
    let source = Arc::new(FakeSource::default());

    // When: Searching for whitespace
    let result = pipelines(source, store).search_by_name("   ").await;

    // Then: The query is rejected as invalid input
    assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
}

#[tokio::test]
async fn when_class_filter_is_set_bootstrap_keeps_only_that_class() {
    // Given: Settings restricted to class A
    let mut settings = Settings::default();
    settings.pipeline.class_filter = "A".parse().expect("filter");
    let store = RecordingStore::new(Vec::new());
    let source = Arc::new(FakeSource::with_catalog(vec![group(1, 3), group(2, 2)]));

    // When: Bootstrap runs
    let outcome = pipelines_with(source, store.clone(), settings)
        .ingest()
        .await
        .expect("ingest");

    // Then: One row per group
    assert_eq!(outcome, IngestOutcome::Appended { groups: 2, rows: 2 });
    assert!(store.rows()[1..].iter().all(|row| row[0] == "A"));
}

#[tokio::test]
async fn when_sheet_renders_comma_decimals_check_leaves_rows_alone() {
    // Given: Metrics stored by an es-AR sheet with comma separators
    let store = RecordingStore::new(vec![
        header(),
        stored_row("1", "10", "Uno", ["521,42", "14.299,01", "50,45", "0,30", "1,80", "-3,65"]),
    ]);
    let source = Arc::new(FakeSource::default());

    // When: The integrity check runs
    let report = pipelines(source.clone(), store.clone())
        .check_integrity()
        .await
        .expect("check");

    // Then: The row counts as valid and nothing is recomputed
    assert_eq!(report.repaired, 0);
    assert_eq!(source.total_calls(), 0);
    assert_eq!(store.write_count(), 0);
}
