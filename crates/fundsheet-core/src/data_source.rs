//! Fund data source contract and error types.
//!
//! Pipelines talk to the fund-data API only through [`FundDataSource`], so
//! tests can drive them with scripted doubles.
//!
//! | Method | Result | On failure |
//! |--------|--------|------------|
//! | [`fetch_catalog`](FundDataSource::fetch_catalog) | every listed fund group | [`SourceError`] |
//! | [`fetch_price_pair`](FundDataSource::fetch_price_pair) | share value at both ends of a window | null pair, or zeros for upstream data errors |
//! | [`fetch_performance`](FundDataSource::fetch_performance) | performance over a window | null, or zero for upstream data errors |
//! | [`check_connection`](FundDataSource::check_connection) | reachability check | `false` |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{DateWindow, FundKey, RawFundGroup};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Connection, timeout or transient status; retried until the budget runs out.
    Transport,
    /// Body that is not the expected JSON.
    Decode,
    /// Well-formed response carrying an upstream `error` member.
    Upstream,
    /// Non-retryable HTTP status or malformed request.
    InvalidRequest,
}

/// Structured source error with a stable code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transport,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Decode,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn upstream(code: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Upstream,
            message: code.into(),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn is_upstream(&self) -> bool {
        matches!(self.kind, SourceErrorKind::Upstream)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::Decode => "source.decode",
            SourceErrorKind::Upstream => "source.upstream",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Share values at the start and end of a window; `None` means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePair {
    pub initial: Option<Decimal>,
    pub last: Option<Decimal>,
}

impl PricePair {
    pub const fn new(initial: Decimal, last: Decimal) -> Self {
        Self {
            initial: Some(initial),
            last: Some(last),
        }
    }

    /// No data: both ends unknown.
    pub const fn null() -> Self {
        Self {
            initial: None,
            last: None,
        }
    }

    /// Upstream reported no data for the window.
    pub const fn zero() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO)
    }
}

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fund data source contract.
///
/// Price and performance lookups never fail: degraded lookups come back as
/// null (transport or decode trouble) or zero (the upstream has no data for
/// that class and window).
pub trait FundDataSource: Send + Sync {
    /// Every active fund group with its classes.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] once retries are exhausted or the catalog
    /// cannot be decoded.
    fn fetch_catalog<'a>(&'a self) -> SourceFuture<'a, Result<Vec<RawFundGroup>, SourceError>>;

    fn fetch_price_pair<'a>(
        &'a self,
        key: &'a FundKey,
        window: DateWindow,
    ) -> SourceFuture<'a, PricePair>;

    fn fetch_performance<'a>(
        &'a self,
        key: &'a FundKey,
        window: DateWindow,
    ) -> SourceFuture<'a, Option<Decimal>>;

    /// Whether the API answers a known class detail request.
    fn check_connection<'a>(&'a self) -> SourceFuture<'a, bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(SourceError::transport("x").code(), "source.transport");
        assert_eq!(SourceError::decode("x").code(), "source.decode");
        assert_eq!(SourceError::upstream("wrong-dates").code(), "source.upstream");
        assert_eq!(SourceError::invalid_request("x").code(), "source.invalid_request");
    }

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(SourceError::transport("timeout").retryable());
        assert!(!SourceError::decode("not json").retryable());
        assert!(!SourceError::upstream("inexistence").retryable());
    }

    #[test]
    fn display_includes_code() {
        let error = SourceError::upstream("wrong-dates");
        assert_eq!(error.to_string(), "wrong-dates (source.upstream)");
        assert!(error.is_upstream());
    }
}
