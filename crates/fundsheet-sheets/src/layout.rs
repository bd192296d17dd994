//! Fixed layout of the `funds` sheet.
//!
//! | Col | Header | Field |
//! |-----|--------|-------|
//! | A | `class` | class code |
//! | B | `name` | fund name |
//! | C | `trading_currency` | ARS / USD |
//! | D | `class_id` | class id (lookup index) |
//! | E | `fund_id` | fund id |
//! | F | `rescue_time` | hours |
//! | G | `risk_level` | 0 / 1 / 2 |
//! | H..M | `tna` .. `year_performance` | metrics |
//! | N | `updated` | `DD-MM-YYYY` |
//! | O | `logo_url` | logo |

use crate::range::{column_letters, CellRange};

pub const HEADERS: [&str; 15] = [
    "class",
    "name",
    "trading_currency",
    "class_id",
    "fund_id",
    "rescue_time",
    "risk_level",
    "tna",
    "tea",
    "tem",
    "monthly_performance",
    "six_month_performance",
    "year_performance",
    "updated",
    "logo_url",
];

pub const COLUMN_COUNT: usize = HEADERS.len();

/// 0-based column positions.
pub mod columns {
    pub const CLASS_CODE: usize = 0;
    pub const FUND_NAME: usize = 1;
    pub const TRADING_CURRENCY: usize = 2;
    pub const CLASS_ID: usize = 3;
    pub const FUND_ID: usize = 4;
    pub const RESCUE_TIME: usize = 5;
    pub const RISK_LEVEL: usize = 6;
    pub const TNA: usize = 7;
    pub const TEA: usize = 8;
    pub const TEM: usize = 9;
    pub const MONTHLY_PERF: usize = 10;
    pub const SIX_MONTH_PERF: usize = 11;
    pub const YEAR_PERF: usize = 12;
    pub const UPDATED_AT: usize = 13;
    pub const LOGO_URL: usize = 14;
}

/// Metric block written by recomputation: `tna..=updated`.
pub const METRICS_FIRST: usize = columns::TNA;
pub const METRICS_LAST: usize = columns::UPDATED_AT;
pub const METRICS_WIDTH: usize = METRICS_LAST - METRICS_FIRST + 1;

/// Numeric metric cells validated by the integrity sweep: `tna..=year_performance`.
pub const NUMERIC_METRICS: std::ops::RangeInclusive<usize> = columns::TNA..=columns::YEAR_PERF;

/// Sheet name and header height for the fund table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundSheetLayout {
    pub sheet: String,
    pub header_rows: u32,
}

impl Default for FundSheetLayout {
    fn default() -> Self {
        Self {
            sheet: String::from("funds"),
            header_rows: 1,
        }
    }
}

impl FundSheetLayout {
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            ..Self::default()
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn header_range(&self) -> String {
        CellRange::rows(0, last_column(), 1, self.header_rows).to_string()
    }

    /// Header plus every data row, e.g. `A1:O`.
    pub fn full_range(&self) -> String {
        format!("A1:{}", column_letters(last_column()))
    }

    /// Data rows only, e.g. `A2:O`.
    pub fn data_range(&self) -> String {
        format!(
            "A{}:{}",
            self.first_data_row(),
            column_letters(last_column())
        )
    }

    /// Class and fund id columns, e.g. `D2:E`.
    pub fn fund_codes_range(&self) -> String {
        format!(
            "{}{}:{}",
            column_letters(columns::CLASS_ID as u32),
            self.first_data_row(),
            column_letters(columns::FUND_ID as u32)
        )
    }

    /// Metric block covering `count` data rows starting at the first data row.
    pub fn metrics_range(&self, count: usize) -> String {
        let first = self.first_data_row();
        let last = first + count.saturating_sub(1) as u32;
        metrics_block(first, last)
    }

    /// Metric block of the data row at 0-based `index`.
    pub fn metrics_row_range(&self, index: usize) -> String {
        let row = self.sheet_row(index);
        metrics_block(row, row)
    }

    /// 1-based sheet row of the data row at 0-based `index`.
    pub fn sheet_row(&self, index: usize) -> u32 {
        index as u32 + 1 + self.header_rows
    }

    pub fn first_data_row(&self) -> u32 {
        self.header_rows + 1
    }

    pub fn header_row() -> Vec<String> {
        HEADERS.iter().map(|h| (*h).to_string()).collect()
    }
}

fn last_column() -> u32 {
    (COLUMN_COUNT - 1) as u32
}

fn metrics_block(first: u32, last: u32) -> String {
    CellRange::rows(METRICS_FIRST as u32, METRICS_LAST as u32, first, last).to_string()
}
