//! CAFCI public API adapter.
//!
//! Every call goes through [`CafciAdapter::fetch`], which retries transport
//! failures with the configured backoff and classifies what comes back:
//!
//! | Outcome | Kind | Retried |
//! |---------|------|---------|
//! | connect / timeout / 408 / 429 / 5xx | `Transport` | yes, up to the budget |
//! | other non-2xx status | `InvalidRequest` | no |
//! | body is not JSON | `Decode` | no |
//! | JSON with an `error` member | `Upstream` | no |

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::data_source::{FundDataSource, PricePair, SourceError, SourceFuture};
use crate::domain::{format_iso_date, DateWindow, FundKey, RawCatalog, RawFundGroup, RawPerformance};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::retry::RetryConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.cafci.org.ar";

/// Share values are published in thousandths.
pub const PRICE_SCALE: Decimal = dec!(1000);
/// Performance figures are published in thousandths.
pub const PERFORMANCE_SCALE: Decimal = dec!(1000);

const CATALOG_INCLUDE: &str = "gerente,tipoRenta,region,benchmark,clase_fondo";
const HEALTH_FUND_ID: &str = "1222";
const HEALTH_CLASS_ID: &str = "3924";

/// Connection settings for the CAFCI API.
#[derive(Debug, Clone)]
pub struct CafciConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for CafciConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: 30_000,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Clone)]
pub struct CafciAdapter {
    http_client: Arc<dyn HttpClient>,
    config: CafciConfig,
}

impl Default for CafciAdapter {
    fn default() -> Self {
        Self::new(CafciConfig::default())
    }
}

impl CafciAdapter {
    pub fn new(config: CafciConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), config)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: CafciConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &CafciConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    pub fn catalog_url(&self) -> String {
        format!("{}/fondo", self.base_url())
    }

    pub fn performance_url(&self, key: &FundKey, window: DateWindow) -> String {
        format!(
            "{}/fondo/{}/clase/{}/rendimiento/{}/{}",
            self.base_url(),
            key.fund_id,
            key.class_id,
            format_iso_date(window.start),
            format_iso_date(window.end)
        )
    }

    pub fn detail_url(&self, fund_id: &str, class_id: &str) -> String {
        format!("{}/fondo/{fund_id}/clase/{class_id}/ficha", self.base_url())
    }

    /// Requests `url` with the retry budget and returns the decoded JSON body.
    ///
    /// # Errors
    ///
    /// `Transport` after the budget is spent; `Decode`, `InvalidRequest` and
    /// `Upstream` immediately.
    pub async fn fetch(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, SourceError> {
        let url = with_query(url, params);
        let budget = self.config.retry.budget.max(1);
        let mut last_error = None;

        for attempt in 1..=budget {
            match self.fetch_once(&url).await {
                Ok(value) => return Ok(value),
                Err(error) if error.retryable() => {
                    tracing::debug!(attempt, budget, url = %url, error = %error, "transient failure");
                    last_error = Some(error);
                    if attempt < budget {
                        let delay = self.config.retry.delay_for_attempt(attempt);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
                Err(error) => return Err(error),
            }
        }

        let reason = last_error.map_or_else(String::new, |e| e.message().to_string());
        tracing::warn!(url = %url, budget, reason = %reason, "retry budget exhausted");
        Err(SourceError::transport(format!(
            "{reason} (gave up after {budget} attempts)"
        )))
    }

    async fn fetch_once(&self, url: &str) -> Result<Value, SourceError> {
        let request = HttpRequest::json(url, Duration::from_millis(self.config.timeout_ms));

        let response = self.http_client.execute(request).await.map_err(|error| {
            if error.is_transient() {
                SourceError::transport(format!("cafci {error}"))
            } else {
                SourceError::invalid_request(format!("cafci {error}"))
            }
        })?;

        if !response.is_success() {
            if self.config.retry.should_retry_status(response.status) {
                return Err(SourceError::transport(format!(
                    "cafci upstream returned status {}",
                    response.status
                )));
            }
            if let Some(code) = serde_json::from_str::<Value>(&response.body)
                .ok()
                .as_ref()
                .and_then(upstream_error_code)
            {
                return Err(SourceError::upstream(code));
            }
            return Err(SourceError::invalid_request(format!(
                "cafci upstream returned status {}",
                response.status
            )));
        }

        let value: Value = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::decode(format!("cafci response is not json: {e}")))?;

        match upstream_error_code(&value) {
            Some(code) => Err(SourceError::upstream(code)),
            None => Ok(value),
        }
    }

    async fn catalog(&self) -> Result<Vec<RawFundGroup>, SourceError> {
        tracing::info!("fetching fund catalog");
        let value = self
            .fetch(
                &self.catalog_url(),
                &[("estado", "1"), ("include", CATALOG_INCLUDE), ("limit", "0")],
            )
            .await?;
        let catalog: RawCatalog = serde_json::from_value(value)
            .map_err(|e| SourceError::decode(format!("malformed fund catalog: {e}")))?;
        tracing::info!(groups = catalog.data.len(), "fund catalog fetched");
        Ok(catalog.data)
    }

    async fn performance(
        &self,
        key: &FundKey,
        window: DateWindow,
    ) -> Result<RawPerformance, SourceError> {
        let value = self
            .fetch(&self.performance_url(key, window), &[])
            .await?;
        serde_json::from_value(value)
            .map_err(|e| SourceError::decode(format!("malformed performance payload: {e}")))
    }

    async fn price_pair(&self, key: &FundKey, window: DateWindow) -> PricePair {
        let outcome = self
            .performance(key, window)
            .await
            .and_then(|raw| decode_price_pair(&raw));

        match outcome {
            Ok(pair) => pair,
            Err(error) if error.is_upstream() => {
                tracing::debug!(class_id = %key.class_id, fund_id = %key.fund_id, code = error.message(), "no prices for window");
                PricePair::zero()
            }
            Err(error) => {
                tracing::info!(class_id = %key.class_id, fund_id = %key.fund_id, error = %error, "prices unavailable");
                PricePair::null()
            }
        }
    }

    async fn performance_figure(&self, key: &FundKey, window: DateWindow) -> Option<Decimal> {
        let outcome = self.performance(key, window).await.and_then(|raw| {
            let value = raw
                .data
                .rendimiento
                .ok_or_else(|| SourceError::decode("performance payload has no 'rendimiento'"))?;
            value
                .checked_div(PERFORMANCE_SCALE)
                .ok_or_else(|| SourceError::decode("performance out of range"))
        });

        match outcome {
            Ok(value) => Some(value),
            Err(error) if error.is_upstream() => {
                tracing::debug!(class_id = %key.class_id, fund_id = %key.fund_id, days = window.days(), code = error.message(), "no performance for window");
                Some(Decimal::ZERO)
            }
            Err(error) => {
                tracing::info!(class_id = %key.class_id, fund_id = %key.fund_id, days = window.days(), error = %error, "performance unavailable");
                None
            }
        }
    }

    async fn reachable(&self) -> bool {
        let url = self.detail_url(HEALTH_FUND_ID, HEALTH_CLASS_ID);
        match self.fetch_once(&url).await {
            Ok(_) => true,
            Err(error) => {
                tracing::warn!(url = %url, error = %error, "cafci connection check failed");
                false
            }
        }
    }
}

impl FundDataSource for CafciAdapter {
    fn fetch_catalog<'a>(&'a self) -> SourceFuture<'a, Result<Vec<RawFundGroup>, SourceError>> {
        Box::pin(self.catalog())
    }

    fn fetch_price_pair<'a>(
        &'a self,
        key: &'a FundKey,
        window: DateWindow,
    ) -> SourceFuture<'a, PricePair> {
        Box::pin(self.price_pair(key, window))
    }

    fn fetch_performance<'a>(
        &'a self,
        key: &'a FundKey,
        window: DateWindow,
    ) -> SourceFuture<'a, Option<Decimal>> {
        Box::pin(self.performance_figure(key, window))
    }

    fn check_connection<'a>(&'a self) -> SourceFuture<'a, bool> {
        Box::pin(self.reachable())
    }
}

/// `desde` is the start of the window, `hasta` the end.
fn decode_price_pair(raw: &RawPerformance) -> Result<PricePair, SourceError> {
    let initial = raw
        .data
        .desde
        .as_ref()
        .and_then(|point| point.valor)
        .ok_or_else(|| SourceError::decode("performance payload has no initial value"))?;
    let last = raw
        .data
        .hasta
        .as_ref()
        .and_then(|point| point.valor)
        .ok_or_else(|| SourceError::decode("performance payload has no final value"))?;

    let scale = |value: Decimal| {
        value
            .checked_div(PRICE_SCALE)
            .ok_or_else(|| SourceError::decode("share value out of range"))
    };
    Ok(PricePair::new(scale(initial)?, scale(last)?))
}

fn upstream_error_code(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(code) => Some(code.clone()),
        other => Some(other.to_string()),
    }
}

fn with_query(url: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query = params
        .iter()
        .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{url}?{query}")
}
