use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fundsheet_sheets::layout::{columns, COLUMN_COUNT, METRICS_WIDTH};

use crate::rates::{truncate, RATE_DECIMALS};

/// Trading currency of a fund class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ars,
    Usd,
}

impl Currency {
    /// Upstream currency id `"1"` is pesos; every other id is dollars.
    pub fn from_currency_id(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            Some("1") => Self::Ars,
            _ => Self::Usd,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ars => "ARS",
            Self::Usd => "USD",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Natural key of a stored row, read from the `D..E` columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FundKey {
    pub class_id: String,
    pub fund_id: String,
}

impl FundKey {
    pub fn new(class_id: impl Into<String>, fund_id: impl Into<String>) -> Self {
        Self {
            class_id: class_id.into(),
            fund_id: fund_id.into(),
        }
    }

    /// Builds a key from a `[class_id, fund_id]` pair; `None` if either is blank.
    pub fn from_pair(cells: &[String]) -> Option<Self> {
        let class_id = cells.first().map(|c| c.trim()).filter(|c| !c.is_empty())?;
        let fund_id = cells.get(1).map(|c| c.trim()).filter(|c| !c.is_empty())?;
        Some(Self::new(class_id, fund_id))
    }

    /// Builds a key from a full-width row.
    pub fn from_row(cells: &[String]) -> Option<Self> {
        cells
            .get(columns::CLASS_ID..=columns::FUND_ID)
            .and_then(Self::from_pair)
    }
}

impl Display for FundKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.fund_id, self.class_id)
    }
}

/// The seven-cell metric block `H..N`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundMetrics {
    pub tna: Option<Decimal>,
    pub tea: Option<Decimal>,
    pub tem: Option<Decimal>,
    pub monthly_performance: Option<Decimal>,
    pub six_month_performance: Option<Decimal>,
    pub year_performance: Option<Decimal>,
    pub updated_at: String,
}

impl FundMetrics {
    /// All metrics null, only the update date set.
    pub fn empty(updated_at: impl Into<String>) -> Self {
        Self {
            updated_at: updated_at.into(),
            ..Self::default()
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(METRICS_WIDTH);
        for value in [
            self.tna,
            self.tea,
            self.tem,
            self.monthly_performance,
            self.six_month_performance,
            self.year_performance,
        ] {
            cells.push(metric_cell(value));
        }
        cells.push(self.updated_at.clone());
        cells
    }
}

/// Flat persisted record, one per fund class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundRow {
    pub class_code: Option<String>,
    pub fund_name: String,
    pub trading_currency: Currency,
    pub class_id: String,
    pub fund_id: String,
    pub rescue_time_hours: u32,
    pub risk_level: u8,
    pub metrics: FundMetrics,
    pub logo_url: Option<String>,
}

impl FundRow {
    /// Renders the row as the 15 `A..O` cells.
    pub fn to_cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(COLUMN_COUNT);
        cells.push(self.class_code.clone().unwrap_or_default());
        cells.push(self.fund_name.clone());
        cells.push(self.trading_currency.as_str().to_string());
        cells.push(self.class_id.clone());
        cells.push(self.fund_id.clone());
        cells.push(self.rescue_time_hours.to_string());
        cells.push(self.risk_level.to_string());
        cells.extend(self.metrics.to_cells());
        cells.push(self.logo_url.clone().unwrap_or_default());
        cells
    }
}

/// Two-decimal text for a metric, truncated toward zero; empty for null.
pub fn metric_cell(value: Option<Decimal>) -> String {
    match value {
        Some(value) => {
            let mut value = truncate(value);
            if value.is_zero() {
                value = Decimal::ZERO;
            }
            value.rescale(RATE_DECIMALS);
            value.to_string()
        }
        None => String::new(),
    }
}
