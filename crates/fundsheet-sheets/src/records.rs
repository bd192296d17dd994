//! Conversion of raw sheet rows into keyed records.

use std::collections::BTreeMap;

use crate::layout::{columns, COLUMN_COUNT, HEADERS};

/// One stored fund row, keyed by header name (class id excluded).
pub type FundRecord = BTreeMap<&'static str, String>;

/// Pads a row returned by the store to the full layout width.
///
/// The Sheets API drops trailing empty cells, so stored rows can be shorter
/// than the layout.
pub fn pad_row(row: &[String]) -> Vec<String> {
    let mut padded: Vec<String> = row.iter().take(COLUMN_COUNT).cloned().collect();
    padded.resize(COLUMN_COUNT, String::new());
    padded
}

/// Maps data rows to records keyed by their class id column.
///
/// Every other column is kept verbatim under its header name. Rows without a
/// class id are dropped; a repeated class id keeps the last row.
pub fn rows_to_records(rows: &[Vec<String>]) -> BTreeMap<String, FundRecord> {
    let mut records = BTreeMap::new();
    for row in rows {
        let cells = pad_row(row);
        let key = cells[columns::CLASS_ID].trim();
        if key.is_empty() {
            continue;
        }

        let record: FundRecord = cells
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != columns::CLASS_ID)
            .map(|(index, value)| (HEADERS[index], value.clone()))
            .collect();
        records.insert(key.to_string(), record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn two_rows_are_keyed_by_class_id_with_fields_preserved() {
        let rows = vec![
            row(&[
                "A", "name1", "ARS", "code1", "fund1", "24", "0", "tna1", "tea1", "tem1",
                "month1", "six1", "year1", "updated1", "logo1",
            ]),
            row(&[
                "B", "name2", "USD", "code2", "fund2", "72", "2", "tna2", "tea2", "tem2",
                "month2", "six2", "year2", "updated2", "logo2",
            ]),
        ];

        let records = rows_to_records(&rows);

        assert_eq!(records.len(), 2);
        let first = &records["code1"];
        assert_eq!(first.len(), COLUMN_COUNT - 1);
        assert_eq!(first["class"], "A");
        assert_eq!(first["name"], "name1");
        assert_eq!(first["trading_currency"], "ARS");
        assert_eq!(first["fund_id"], "fund1");
        assert_eq!(first["rescue_time"], "24");
        assert_eq!(first["risk_level"], "0");
        assert_eq!(first["tna"], "tna1");
        assert_eq!(first["tea"], "tea1");
        assert_eq!(first["tem"], "tem1");
        assert_eq!(first["monthly_performance"], "month1");
        assert_eq!(first["six_month_performance"], "six1");
        assert_eq!(first["year_performance"], "year1");
        assert_eq!(first["updated"], "updated1");
        assert_eq!(first["logo_url"], "logo1");
        assert!(!first.contains_key("class_id"));

        let second = &records["code2"];
        assert_eq!(second["name"], "name2");
        assert_eq!(second["logo_url"], "logo2");
    }

    #[test]
    fn short_rows_are_padded_and_keyless_rows_dropped() {
        let rows = vec![row(&["", "name", "ARS", "7", "3"]), row(&["", "orphan"])];

        let records = rows_to_records(&rows);

        assert_eq!(records.len(), 1);
        assert_eq!(records["7"]["tna"], "");
        assert_eq!(records["7"]["logo_url"], "");
    }
}
