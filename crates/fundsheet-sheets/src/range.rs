//! A1-notation range addressing.
//!
//! Supports the subset the fund sheet relies on: single cells (`A1`),
//! bounded blocks (`H2:N10`) and row-open blocks (`A1:O`, `D2:E`).

use std::fmt::{Display, Formatter};

use crate::error::StoreError;

/// A single corner of a range. `column` is 0-based, `row` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub column: u32,
    pub row: Option<u32>,
}

impl CellRef {
    pub const fn new(column: u32, row: Option<u32>) -> Self {
        Self { column, row }
    }

    fn parse(raw: &str, whole: &str) -> Result<Self, StoreError> {
        let split = raw
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(raw.len());
        let (letters, digits) = raw.split_at(split);

        let column = column_index(letters)
            .ok_or_else(|| StoreError::invalid_range(whole, "expected a column letter"))?;
        let row = if digits.is_empty() {
            None
        } else {
            let row = digits
                .parse::<u32>()
                .map_err(|_| StoreError::invalid_range(whole, "row is not a number"))?;
            if row == 0 {
                return Err(StoreError::invalid_range(whole, "rows start at 1"));
            }
            Some(row)
        };

        Ok(Self { column, row })
    }
}

impl Display for CellRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&column_letters(self.column))?;
        if let Some(row) = self.row {
            write!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Parsed A1 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellRef,
    pub end: Option<CellRef>,
}

impl CellRange {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StoreError::invalid_range(raw, "range is empty"));
        }

        let (start, end) = match trimmed.split_once(':') {
            Some((start, end)) => (
                CellRef::parse(&start.to_ascii_uppercase(), raw)?,
                Some(CellRef::parse(&end.to_ascii_uppercase(), raw)?),
            ),
            None => (CellRef::parse(&trimmed.to_ascii_uppercase(), raw)?, None),
        };

        if let Some(end) = end {
            if end.column < start.column {
                return Err(StoreError::invalid_range(raw, "end column precedes start column"));
            }
            if let (Some(first), Some(last)) = (start.row, end.row) {
                if last < first {
                    return Err(StoreError::invalid_range(raw, "end row precedes start row"));
                }
            }
        }

        Ok(Self { start, end })
    }

    /// Block spanning `first_row..=last_row` over the given columns.
    pub const fn rows(start_column: u32, end_column: u32, first_row: u32, last_row: u32) -> Self {
        Self {
            start: CellRef::new(start_column, Some(first_row)),
            end: Some(CellRef::new(end_column, Some(last_row))),
        }
    }

    pub fn first_column(&self) -> u32 {
        self.start.column
    }

    pub fn last_column(&self) -> u32 {
        self.end.map_or(self.start.column, |end| end.column)
    }

    pub fn first_row(&self) -> u32 {
        self.start.row.unwrap_or(1)
    }

    /// Last addressed row; `None` for row-open ranges.
    pub fn last_row(&self) -> Option<u32> {
        match self.end {
            Some(end) => end.row,
            None => self.start.row,
        }
    }

    pub fn width(&self) -> usize {
        (self.last_column() - self.first_column() + 1) as usize
    }
}

impl Display for CellRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)?;
        if let Some(end) = self.end {
            write!(f, ":{end}")?;
        }
        Ok(())
    }
}

/// `A` -> 0, `Z` -> 25, `AA` -> 26.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    letters.bytes().try_fold(0u32, |acc, b| {
        acc.checked_mul(26)?
            .checked_add(u32::from(b - b'A') + 1)
    })
    .map(|n| n - 1)
}

pub fn column_letters(index: u32) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
