//! # Fundsheet Sheets
//!
//! Spreadsheet-backed tabular store for fundsheet.
//!
//! ## Overview
//!
//! The fund table lives in a single spreadsheet tab. This crate exposes the
//! three primitives the pipelines rely on, plus the fixed layout of that tab:
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | [`SheetStore::read`] | Values of an A1 range, trailing empty cells dropped |
//! | [`SheetStore::append`] | Rows appended after the last filled row |
//! | [`SheetStore::update`] | Rows written over an A1 range |
//!
//! ## Backends
//!
//! | Type | Description |
//! |------|-------------|
//! | [`GoogleSheetsStore`] | Sheets v4 REST API (access token or service account) |
//! | [`MemorySheet`] | In-process grid with the same A1 semantics |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fundsheet_sheets::{FundSheetLayout, MemorySheet, SheetStore};
//!
//! # async fn demo() -> Result<(), fundsheet_sheets::StoreError> {
//! let layout = FundSheetLayout::default();
//! let store = MemorySheet::new().with_sheet(layout.sheet(), vec![FundSheetLayout::header_row()]);
//!
//! let rows = store.read(layout.sheet(), &layout.full_range()).await?;
//! assert_eq!(rows.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod google;
pub mod layout;
pub mod memory;
pub mod range;
pub mod records;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub use auth::{ServiceAccountKey, SheetsAuth};
pub use error::StoreError;
pub use google::{GoogleSheetsConfig, GoogleSheetsStore};
pub use layout::{FundSheetLayout, COLUMN_COUNT, HEADERS};
pub use memory::MemorySheet;
pub use range::{CellRange, CellRef};
pub use records::{pad_row, rows_to_records, FundRecord};

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Tabular store contract.
///
/// Rows are plain strings in column order. Implementations are not required
/// to tolerate concurrent writers; callers serialize writes.
pub trait SheetStore: Send + Sync {
    /// Reads the values of `range` on `sheet`.
    fn read<'a>(&'a self, sheet: &'a str, range: &'a str) -> StoreFuture<'a, Vec<Vec<String>>>;

    /// Appends `rows` after the table found in `range`; returns rows written.
    fn append<'a>(
        &'a self,
        sheet: &'a str,
        range: &'a str,
        rows: Vec<Vec<String>>,
    ) -> StoreFuture<'a, usize>;

    /// Overwrites `range` with `rows`; returns rows written.
    fn update<'a>(
        &'a self,
        sheet: &'a str,
        range: &'a str,
        rows: Vec<Vec<String>>,
    ) -> StoreFuture<'a, usize>;
}

impl<T: SheetStore + ?Sized> SheetStore for Arc<T> {
    fn read<'a>(&'a self, sheet: &'a str, range: &'a str) -> StoreFuture<'a, Vec<Vec<String>>> {
        (**self).read(sheet, range)
    }

    fn append<'a>(
        &'a self,
        sheet: &'a str,
        range: &'a str,
        rows: Vec<Vec<String>>,
    ) -> StoreFuture<'a, usize> {
        (**self).append(sheet, range, rows)
    }

    fn update<'a>(
        &'a self,
        sheet: &'a str,
        range: &'a str,
        rows: Vec<Vec<String>>,
    ) -> StoreFuture<'a, usize> {
        (**self).update(sheet, range, rows)
    }
}
