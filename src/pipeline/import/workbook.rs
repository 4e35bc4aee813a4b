//! calamine adapter: decodes XLSX bytes into positional rows of [`CellValue`].

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use chrono::NaiveDateTime;

use super::cell::CellValue;
use super::ImportError;

/// One worksheet row. `number` is the 1-based sheet row; `cells[0]` is column A.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub number: u32,
    pub cells: Vec<CellValue>,
}

static EMPTY: CellValue = CellValue::Empty;

impl RawRow {
    pub fn cell(&self, column: usize) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<RawRow>,
}

impl RawSheet {
    pub fn row(&self, number: u32) -> Option<&RawRow> {
        self.rows.iter().find(|r| r.number == number)
    }
}

/// An opened workbook. Sheets are decoded on demand so unrecognized ones
/// are never read.
pub struct Workbook<'a> {
    inner: Xlsx<Cursor<&'a [u8]>>,
}

impl<'a> Workbook<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self, ImportError> {
        let inner = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| ImportError::Workbook(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Worksheet names in file order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    pub fn sheet(&mut self, name: &str) -> Result<RawSheet, ImportError> {
        let range = self
            .inner
            .worksheet_range(name)
            .map_err(|e| ImportError::Workbook(format!("sheet '{name}': {e}")))?;
        Ok(RawSheet {
            name: name.to_string(),
            rows: rows_from_range(&range),
        })
    }
}

/// Rows with at least one non-empty cell, placed at their absolute position.
fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    range
        .rows()
        .enumerate()
        .filter_map(|(offset, row)| {
            if row.iter().all(|d| matches!(d, Data::Empty)) {
                return None;
            }
            let mut cells = vec![CellValue::Empty; start_col as usize];
            cells.extend(row.iter().map(cell_from_data));
            Some(RawRow {
                number: start_row + offset as u32 + 1,
                cells,
            })
        })
        .collect()
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(CellValue::Date)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        // Formula errors (#N/A, #REF!) carry no patient data
        Data::Error(_) => CellValue::Empty,
    }
}
