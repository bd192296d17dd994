use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One listed fund as returned by the catalog endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFundGroup {
    #[serde(default, deserialize_with = "flexible_text")]
    pub id: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub moneda_id: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub dias_liquidacion: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub tipo_renta_id: Option<String>,
    #[serde(default)]
    pub tipo_renta: Option<RawRentType>,
    #[serde(default, rename = "clase_fondos")]
    pub clase_fondos: Option<Vec<RawFundClass>>,
}

impl RawFundGroup {
    /// Risk category id, preferring the flat field over the embedded object.
    pub fn category_id(&self) -> Option<&str> {
        self.tipo_renta_id
            .as_deref()
            .or_else(|| self.tipo_renta.as_ref().and_then(|t| t.id.as_deref()))
    }
}

/// Embedded risk category.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRentType {
    #[serde(default, deserialize_with = "flexible_text")]
    pub id: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
}

/// One tradable class of a fund group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFundClass {
    #[serde(default, deserialize_with = "flexible_text")]
    pub id: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub fondo_id: Option<String>,
}

/// Catalog envelope: `{"data": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCatalog {
    pub data: Vec<RawFundGroup>,
}

/// Performance envelope for a class over a date range.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPerformance {
    pub data: RawPerformanceData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPerformanceData {
    #[serde(default)]
    pub desde: Option<RawPricePoint>,
    #[serde(default)]
    pub hasta: Option<RawPricePoint>,
    #[serde(default, deserialize_with = "flexible_decimal")]
    pub rendimiento: Option<Decimal>,
}

/// Share value at one end of the range.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPricePoint {
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default, deserialize_with = "flexible_decimal")]
    pub valor: Option<Decimal>,
}

/// Accepts a JSON string or number; anything else becomes `None`.
fn flexible_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

fn flexible_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = flexible_text(deserializer)? else {
        return Ok(None);
    };
    parse_decimal(&text)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid decimal '{text}'")))
}

/// Parses plain or scientific decimal notation.
///
/// A comma is read as the decimal separator, with dots before it taken as
/// thousands separators, the way es-AR sheets render numbers.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };
    normalized
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&normalized).ok())
}
