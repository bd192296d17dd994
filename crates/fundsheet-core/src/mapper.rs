//! Flattening of catalog fund groups into persisted rows.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::{format_sheet_date, Currency, FundMetrics, FundRow, RawFundGroup};
use crate::error::MappingError;

/// Longest rescue time stored, in hours.
pub const MAX_RESCUE_HOURS: u32 = 72;
/// Rescue time forced on dollar classes that settle same day.
pub const USD_MIN_RESCUE_HOURS: u32 = 24;
/// Bucket for categories missing from [`RISK_BUCKETS`].
pub const UNKNOWN_RISK_BUCKET: u8 = 2;

/// Upstream rent-type id to risk bucket.
///
/// | Id | Category | Bucket |
/// |----|----------|--------|
/// | 4 | Mercado de Dinero | 0 |
/// | 3 | Renta Fija | 1 |
/// | 5 | Renta Mixta | 1 |
/// | 2 | Renta Variable | 2 |
/// | 6 | PyMes | 2 |
/// | 7 | Retorno Total | 2 |
/// | 8 | Infraestructura | 2 |
pub const RISK_BUCKETS: [(&str, u8); 7] = [
    ("4", 0),
    ("3", 1),
    ("5", 1),
    ("2", 2),
    ("6", 2),
    ("7", 2),
    ("8", 2),
];

/// Which classes of a fund group become rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClassFilter {
    #[default]
    All,
    /// Only classes whose parsed code equals this letter.
    OnlyCode(String),
}

impl ClassFilter {
    pub fn accepts(&self, class_code: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::OnlyCode(code) => class_code.is_some_and(|c| c.eq_ignore_ascii_case(code)),
        }
    }
}

impl FromStr for ClassFilter {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        if trimmed.chars().count() == 1 {
            return Ok(Self::OnlyCode(trimmed.to_ascii_uppercase()));
        }
        Err(format!(
            "class filter must be 'all' or a single class letter, got '{trimmed}'"
        ))
    }
}

impl TryFrom<String> for ClassFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClassFilter> for String {
    fn from(value: ClassFilter) -> Self {
        value.to_string()
    }
}

impl Display for ClassFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::OnlyCode(code) => f.write_str(code),
        }
    }
}

/// Single-letter class code: the last word of the name when it is one character.
pub fn class_code(class_name: &str) -> Option<String> {
    let last = class_name.split_whitespace().last()?;
    (last.chars().count() == 1).then(|| last.to_string())
}

pub fn risk_bucket(category_id: Option<&str>) -> u8 {
    let Some(id) = category_id.map(str::trim) else {
        return UNKNOWN_RISK_BUCKET;
    };
    RISK_BUCKETS
        .iter()
        .find(|(key, _)| *key == id)
        .map_or(UNKNOWN_RISK_BUCKET, |(_, bucket)| *bucket)
}

pub fn rescue_hours(settlement_days: u32, currency: Currency) -> u32 {
    let hours = settlement_days.saturating_mul(24).min(MAX_RESCUE_HOURS);
    if currency == Currency::Usd && hours == 0 {
        USD_MIN_RESCUE_HOURS
    } else {
        hours
    }
}

fn settlement_days(group: &RawFundGroup, group_id: &str) -> Result<u32, MappingError> {
    let Some(raw) = group.dias_liquidacion.as_deref().map(str::trim) else {
        return Ok(0);
    };
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>()
        .map_err(|_| MappingError::InvalidSettlementDays {
            group_id: group_id.to_string(),
            value: raw.to_string(),
        })
}

/// Flattens one fund group into one row per accepted class.
///
/// Metrics start null; `updated_at` is `today` as `DD-MM-YYYY`.
pub fn flatten_fund_group(
    group: &RawFundGroup,
    filter: &ClassFilter,
    today: Date,
) -> Result<Vec<FundRow>, MappingError> {
    let group_id = group
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(MappingError::MissingGroupId)?;
    let classes = group
        .clase_fondos
        .as_ref()
        .ok_or_else(|| MappingError::MissingClasses {
            group_id: group_id.to_string(),
        })?;

    let currency = Currency::from_currency_id(group.moneda_id.as_deref());
    let rescue_time_hours = rescue_hours(settlement_days(group, group_id)?, currency);
    let risk_level = risk_bucket(group.category_id());
    let fund_name = group.nombre.clone().unwrap_or_default();
    let updated_at = format_sheet_date(today);

    let mut rows = Vec::with_capacity(classes.len());
    for (position, class) in classes.iter().enumerate() {
        let class_id = class
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MappingError::MissingClassId {
                group_id: group_id.to_string(),
                position,
            })?;
        let code = class.nombre.as_deref().and_then(class_code);
        if !filter.accepts(code.as_deref()) {
            tracing::debug!(fund_id = group_id, class_id, "class filtered out");
            continue;
        }

        rows.push(FundRow {
            class_code: code,
            fund_name: fund_name.clone(),
            trading_currency: currency,
            class_id: class_id.to_string(),
            fund_id: group_id.to_string(),
            rescue_time_hours,
            risk_level,
            metrics: FundMetrics::empty(updated_at.clone()),
            logo_url: None,
        });
    }

    Ok(rows)
}
