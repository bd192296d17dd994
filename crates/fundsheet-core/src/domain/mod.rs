//! # Domain Models
//!
//! Typed upstream payloads, the flat persisted row, and date helpers.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RawFundGroup`] | Listed fund with its classes, as returned by the catalog |
//! | [`RawFundClass`] | One tradable class of a fund group |
//! | [`RawPerformance`] | Price range and performance for a class |
//! | [`FundRow`] | Fifteen-column persisted record |
//! | [`FundMetrics`] | Seven-cell metric block `H..N` |
//! | [`FundKey`] | `(class_id, fund_id)` natural key |
//! | [`DateWindow`] | Query window anchored on the last Friday |
//!
//! Upstream ids may be JSON strings or numbers; both normalize to strings so
//! untyped maps never reach the rate math or the store.

mod dates;
mod raw;
mod row;

pub use dates::{
    format_iso_date, format_sheet_date, last_business_week_end, today_in_buenos_aires, DateWindow,
    BUENOS_AIRES,
};
pub use raw::{
    parse_decimal, RawCatalog, RawFundClass, RawFundGroup, RawPerformance, RawPerformanceData,
    RawPricePoint, RawRentType,
};
pub use row::{metric_cell, Currency, FundKey, FundMetrics, FundRow};
