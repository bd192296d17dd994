use time::format_description::BorrowedFormatItem;
use time::macros::{format_description, offset};
use time::{Date, Duration, OffsetDateTime, UtcOffset, Weekday};

/// Buenos Aires has no daylight saving; a fixed UTC-3 offset is exact.
pub const BUENOS_AIRES: UtcOffset = offset!(-3);

/// Current calendar date in Buenos Aires.
pub fn today_in_buenos_aires() -> Date {
    OffsetDateTime::now_utc().to_offset(BUENOS_AIRES).date()
}

/// Most recent Friday on or before `today`.
pub fn last_business_week_end(today: Date) -> Date {
    let from_monday = i64::from(today.weekday().number_days_from_monday());
    let friday = i64::from(Weekday::Friday.number_days_from_monday());
    let back = (from_monday - friday).rem_euclid(7);
    today - Duration::days(back)
}

const SHEET_DATE: &[BorrowedFormatItem<'static>] = format_description!("[day]-[month]-[year]");
const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// `DD-MM-YYYY`, the format of the `updated` column.
pub fn format_sheet_date(date: Date) -> String {
    date.format(SHEET_DATE).unwrap_or_default()
}

/// ISO `YYYY-MM-DD`, used in API paths.
pub fn format_iso_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_default()
}

/// Closed date range queried for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Date,
    pub end: Date,
}

impl DateWindow {
    /// The `days`-long window ending on the last Friday on or before `today`.
    pub fn last_days(days: u32, today: Date) -> Self {
        let end = last_business_week_end(today);
        Self {
            start: end - Duration::days(i64::from(days)),
            end,
        }
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).whole_days()
    }
}
