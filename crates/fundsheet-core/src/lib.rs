//! # Fundsheet Core
//!
//! Fund metadata ingestion, yield metrics and sheet reconciliation.
//!
//! ## Overview
//!
//! This crate pulls fund groups and share prices from the CAFCI API, derives
//! monthly and annual rates, and keeps a spreadsheet of fund classes current:
//!
//! - **Typed upstream payloads** and the flat fifteen-column row
//! - **Rate math** on arbitrary-precision decimals, truncated to two places
//! - **Record mapping** with the currency, risk and rescue-time rules
//! - **Retried data source** that separates transport trouble from upstream "no data"
//! - **Pipelines** for bootstrap, bulk refresh, integrity repair and search
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | CAFCI API adapter |
//! | [`config`] | Settings loaded from `FUNDSHEET_*` variables |
//! | [`data_source`] | Data source trait, price pair and source errors |
//! | [`domain`] | Raw payloads, rows, keys and date windows |
//! | [`error`] | Mapping and pipeline errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`mapper`] | Catalog group to row flattening |
//! | [`pipeline`] | Bootstrap, update, integrity and search |
//! | [`rates`] | TEM / TNA / TEA math |
//! | [`retry`] | Retry budget and backoff |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fundsheet_core::{CafciAdapter, FundPipelines, Settings};
//! use fundsheet_sheets::MemorySheet;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let source = Arc::new(CafciAdapter::new(settings.cafci_config()));
//!     let store = Arc::new(MemorySheet::new().with_sheet("funds", Vec::new()));
//!
//!     let pipelines = FundPipelines::new(source, store, &settings);
//!     pipelines.ingest().await?;
//!     pipelines.update().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Menu     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  FundPipelines  │────▶│ SheetStore       │
//! └────────┬────────┘     │ (Sheets/memory)  │
//!          │              └──────────────────┘
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ FundDataSource  │────▶│ HTTP Client      │
//! │ (CAFCI adapter) │     │ + retry budget   │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Mapper / Rates  │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Per-fund lookups degrade instead of failing:
//!
//! ```rust
//! use fundsheet_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::Transport => "null metrics after retries",
//!         SourceErrorKind::Upstream => "zero metrics",
//!         SourceErrorKind::Decode | SourceErrorKind::InvalidRequest => "null metrics",
//!     }
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod mapper;
pub mod pipeline;
pub mod rates;
pub mod retry;

pub use adapters::{CafciAdapter, CafciConfig, PERFORMANCE_SCALE, PRICE_SCALE};

pub use config::{ApiSettings, PipelineSettings, Settings, SettingsError, SheetsSettings};

pub use data_source::{FundDataSource, PricePair, SourceError, SourceErrorKind, SourceFuture};

pub use domain::{
    Currency, DateWindow, FundKey, FundMetrics, FundRow, RawFundClass, RawFundGroup,
    RawPerformance,
};

pub use error::{MappingError, PipelineError};

pub use http_client::{
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, ReqwestHttpClient,
};

pub use mapper::{flatten_fund_group, ClassFilter};

pub use pipeline::{FundPipelines, IngestOutcome, IntegrityReport, UpdateReport};

pub use rates::{
    annual_effective_rate, annual_nominal_rate, monthly_rate, period_performance, projection,
    Projection,
};

pub use retry::RetryConfig;
