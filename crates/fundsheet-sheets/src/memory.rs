//! In-memory [`SheetStore`] with the same A1 semantics as the Sheets API.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::StoreError;
use crate::range::CellRange;
use crate::{SheetStore, StoreFuture};

/// Grid-per-sheet store used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySheet {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(self, name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        self.sheets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), rows);
        self
    }

    /// Snapshot of a sheet's grid, trailing empty cells trimmed.
    pub fn rows(&self, sheet: &str) -> Vec<Vec<String>> {
        let sheets = self.sheets.lock().unwrap_or_else(PoisonError::into_inner);
        sheets
            .get(sheet)
            .map(|grid| trim_grid(grid.clone()))
            .unwrap_or_default()
    }

    fn read_now(&self, sheet: &str, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let range = CellRange::parse(range)?;
        let sheets = self.sheets.lock().unwrap_or_else(PoisonError::into_inner);
        let grid = sheets
            .get(sheet)
            .ok_or_else(|| StoreError::UnknownSheet(sheet.to_string()))?;

        let first_row = range.first_row() as usize;
        let last_row = range
            .last_row()
            .map_or(grid.len(), |row| (row as usize).min(grid.len()));
        let first_col = range.first_column() as usize;
        let last_col = range.last_column() as usize;

        let mut out = Vec::new();
        for row in first_row..=last_row {
            let Some(cells) = grid.get(row - 1) else {
                break;
            };
            let slice: Vec<String> = (first_col..=last_col)
                .map(|col| cells.get(col).cloned().unwrap_or_default())
                .collect();
            out.push(slice);
        }

        Ok(trim_grid(out))
    }

    fn write_now(
        &self,
        sheet: &str,
        range: &str,
        rows: Vec<Vec<String>>,
        append: bool,
    ) -> Result<usize, StoreError> {
        let parsed = CellRange::parse(range)?;
        let mut sheets = self.sheets.lock().unwrap_or_else(PoisonError::into_inner);
        let grid = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::UnknownSheet(sheet.to_string()))?;

        let first_col = parsed.first_column() as usize;
        let start_row = if append {
            last_filled_row(grid) + 1
        } else {
            parsed.first_row() as usize
        };

        if !append {
            if let Some(last) = parsed.last_row() {
                let span = last as usize - start_row + 1;
                if rows.len() > span {
                    return Err(StoreError::invalid_range(
                        range,
                        format!("{} rows do not fit in {span} addressed rows", rows.len()),
                    ));
                }
            }
            if rows.iter().any(|row| row.len() > parsed.width()) && parsed.end.is_some() {
                return Err(StoreError::invalid_range(range, "row wider than range"));
            }
        }

        let written = rows.len();
        for (offset, row) in rows.into_iter().enumerate() {
            let index = start_row + offset - 1;
            if grid.len() <= index {
                grid.resize_with(index + 1, Vec::new);
            }
            let target = &mut grid[index];
            if target.len() < first_col + row.len() {
                target.resize(first_col + row.len(), String::new());
            }
            for (col, value) in row.into_iter().enumerate() {
                target[first_col + col] = value;
            }
        }

        Ok(written)
    }
}

impl SheetStore for MemorySheet {
    fn read<'a>(&'a self, sheet: &'a str, range: &'a str) -> StoreFuture<'a, Vec<Vec<String>>> {
        Box::pin(async move { self.read_now(sheet, range) })
    }

    fn append<'a>(
        &'a self,
        sheet: &'a str,
        range: &'a str,
        rows: Vec<Vec<String>>,
    ) -> StoreFuture<'a, usize> {
        Box::pin(async move { self.write_now(sheet, range, rows, true) })
    }

    fn update<'a>(
        &'a self,
        sheet: &'a str,
        range: &'a str,
        rows: Vec<Vec<String>>,
    ) -> StoreFuture<'a, usize> {
        Box::pin(async move { self.write_now(sheet, range, rows, false) })
    }
}

/// 1-based index of the last row holding a non-empty cell, 0 for an empty grid.
fn last_filled_row(grid: &[Vec<String>]) -> usize {
    grid.iter()
        .rposition(|row| row.iter().any(|cell| !cell.is_empty()))
        .map_or(0, |index| index + 1)
}

fn trim_grid(mut grid: Vec<Vec<String>>) -> Vec<Vec<String>> {
    for row in &mut grid {
        while row.last().is_some_and(String::is_empty) {
            row.pop();
        }
    }
    while grid.last().is_some_and(Vec::is_empty) {
        grid.pop();
    }
    grid
}
