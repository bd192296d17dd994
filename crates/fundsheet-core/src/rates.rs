//! Yield metrics derived from two share prices.
//!
//! | Metric | Formula |
//! |--------|---------|
//! | TEM | `((final / initial) ^ (30 / days) - 1) * 100` |
//! | TNA | `((final / initial) - 1) * 100 * (365 / days)` |
//! | TEA | `((final / initial) ^ (365 / days) - 1) * 100` |
//!
//! Every result is truncated toward zero at [`RATE_DECIMALS`] places. Null
//! inputs give null outputs; an interval of zero days, a non-positive price
//! ratio or a power beyond the decimal range give null as well.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places kept in every metric.
pub const RATE_DECIMALS: u32 = 2;
/// Default price interval, in days.
pub const DEFAULT_INTERVAL_DAYS: u32 = 7;

const MONTH_DAYS: u32 = 30;
const YEAR_DAYS: u32 = 365;
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Monthly, nominal-annual and effective-annual rates for one price pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub tem: Option<Decimal>,
    pub tna: Option<Decimal>,
    pub tea: Option<Decimal>,
}

impl Projection {
    pub const fn zero() -> Self {
        Self {
            tem: Some(Decimal::ZERO),
            tna: Some(Decimal::ZERO),
            tea: Some(Decimal::ZERO),
        }
    }
}

/// Cuts `value` to [`RATE_DECIMALS`] places toward zero.
pub fn truncate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATE_DECIMALS, RoundingStrategy::ToZero)
}

fn ratio(initial: Decimal, last: Decimal) -> Option<Decimal> {
    if initial.is_zero() {
        return None;
    }
    let ratio = last.checked_div(initial)?;
    (ratio > Decimal::ZERO).then_some(ratio)
}

fn compounded(
    initial: Option<Decimal>,
    last: Option<Decimal>,
    period_days: u32,
    interval_days: u32,
) -> Option<Decimal> {
    if interval_days == 0 {
        return None;
    }
    let ratio = ratio(initial?, last?)?;
    let exponent = Decimal::from(period_days).checked_div(Decimal::from(interval_days))?;
    let Some(growth) = ratio.checked_powd(exponent) else {
        tracing::debug!(%ratio, %exponent, "rate power out of decimal range");
        return None;
    };
    let rate = growth.checked_sub(Decimal::ONE)?.checked_mul(HUNDRED)?;
    Some(truncate(rate))
}

/// TEM: monthly effective rate.
pub fn monthly_rate(
    initial: Option<Decimal>,
    last: Option<Decimal>,
    interval_days: u32,
) -> Option<Decimal> {
    compounded(initial, last, MONTH_DAYS, interval_days)
}

/// TEA: effective annual rate.
pub fn annual_effective_rate(
    initial: Option<Decimal>,
    last: Option<Decimal>,
    interval_days: u32,
) -> Option<Decimal> {
    compounded(initial, last, YEAR_DAYS, interval_days)
}

/// TNA: nominal annual rate.
pub fn annual_nominal_rate(
    initial: Option<Decimal>,
    last: Option<Decimal>,
    interval_days: u32,
) -> Option<Decimal> {
    if interval_days == 0 {
        return None;
    }
    let ratio = ratio(initial?, last?)?;
    let rate = ratio
        .checked_sub(Decimal::ONE)?
        .checked_mul(HUNDRED)?
        .checked_mul(Decimal::from(YEAR_DAYS))?
        .checked_div(Decimal::from(interval_days))?;
    Some(truncate(rate))
}

/// All three rates for a price pair.
///
/// A zero on either side gives an all-zero projection even when the other
/// side is missing; so do equal prices.
pub fn projection(
    initial: Option<Decimal>,
    last: Option<Decimal>,
    interval_days: u32,
) -> Projection {
    match (initial, last) {
        (Some(price), _) | (_, Some(price)) if price.is_zero() => Projection::zero(),
        (Some(initial), Some(last)) if initial == last => Projection::zero(),
        _ => Projection {
            tem: monthly_rate(initial, last, interval_days),
            tna: annual_nominal_rate(initial, last, interval_days),
            tea: annual_effective_rate(initial, last, interval_days),
        },
    }
}

/// Percentage change between two values, zero when `initial` is absent or zero.
pub fn period_performance(initial: Option<Decimal>, last: Option<Decimal>) -> Decimal {
    match (initial, last) {
        (Some(initial), Some(last)) if !initial.is_zero() => last
            .checked_div(initial)
            .and_then(|r| r.checked_sub(Decimal::ONE))
            .and_then(|r| r.checked_mul(HUNDRED))
            .map_or(Decimal::ZERO, truncate),
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn monthly_rate_truncates_to_two_decimals() {
        assert_eq!(monthly_rate(Some(dec!(100)), Some(dec!(110)), 7), Some(dec!(50.45)));
    }

    #[test]
    fn truncation_differs_from_rounding() {
        assert_eq!(
            annual_nominal_rate(Some(dec!(100)), Some(dec!(110)), 7),
            Some(dec!(521.42))
        );
        assert_eq!(
            annual_effective_rate(Some(dec!(100)), Some(dec!(110)), 7),
            Some(dec!(14299.01))
        );
        assert_eq!(monthly_rate(Some(dec!(100)), Some(dec!(99)), 7), Some(dec!(-4.21)));
    }

    #[test]
    fn realistic_share_prices_project_all_three_rates() {
        let result = projection(Some(dec!(1220.100)), Some(dec!(1234.567)), 7);

        assert_eq!(result.tem, Some(dec!(5.18)));
        assert_eq!(result.tna, Some(dec!(61.82)));
        assert_eq!(result.tea, Some(dec!(84.89)));
    }

    #[test]
    fn equal_prices_project_zero() {
        assert_eq!(projection(Some(dec!(1.5)), Some(dec!(1.5)), 7), Projection::zero());
    }

    #[test]
    fn zero_price_on_either_side_projects_zero() {
        assert_eq!(projection(Some(Decimal::ZERO), Some(dec!(110)), 7), Projection::zero());
        assert_eq!(projection(Some(dec!(100)), Some(Decimal::ZERO), 7), Projection::zero());
    }

    #[test]
    fn zero_price_wins_over_a_missing_one() {
        assert_eq!(projection(Some(Decimal::ZERO), None, 7), Projection::zero());
        assert_eq!(projection(None, Some(Decimal::ZERO), 7), Projection::zero());
    }

    #[test]
    fn truncate_cuts_toward_zero() {
        assert_eq!(truncate(dec!(12.346)), dec!(12.34));
        assert_eq!(truncate(dec!(-12.346)), dec!(-12.34));
    }

    #[test]
    fn missing_price_projects_null() {
        assert_eq!(projection(None, Some(dec!(110)), 7), Projection::default());
        assert_eq!(monthly_rate(Some(dec!(100)), None, 7), None);
    }

    #[test]
    fn zero_interval_and_negative_ratio_are_null() {
        assert_eq!(monthly_rate(Some(dec!(100)), Some(dec!(110)), 0), None);
        assert_eq!(annual_nominal_rate(Some(dec!(100)), Some(dec!(110)), 0), None);
        assert_eq!(annual_effective_rate(Some(dec!(100)), Some(dec!(-110)), 7), None);
    }

    #[test]
    fn period_performance_is_zero_without_a_base() {
        assert_eq!(period_performance(Some(dec!(100)), Some(dec!(110))), dec!(10.00));
        assert_eq!(period_performance(Some(dec!(100)), Some(dec!(90))), dec!(-10.00));
        assert_eq!(period_performance(None, Some(dec!(110))), Decimal::ZERO);
        assert_eq!(period_performance(Some(Decimal::ZERO), Some(dec!(110))), Decimal::ZERO);
    }
}
