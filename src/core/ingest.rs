//! Spreadsheet ingestion: decode an uploaded workbook or CSV export into a
//! cell grid, map the required column headers, and validate every data row.
//!
//! Structural problems (no data rows, missing headers) void the whole parse;
//! missing cell values are a per-row quality issue and are reported on the
//! record instead of failing the file.

use crate::domain::model::{ParseReport, SheetGrid, TicketField, TicketRecord};
use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("Spreadsheet file is empty or has no data rows")]
    EmptyFile,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Failed to parse spreadsheet file: {0}")]
    Malformed(String),
}

/// Zero-based header positions for each required column, built once per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [usize; TicketField::COUNT],
}

impl ColumnMap {
    /// Case-insensitive exact match of trimmed header text against the
    /// canonical column names. All-or-nothing: any unmatched name fails the
    /// build, and the error lists every one of them.
    pub fn from_headers(headers: &[String]) -> Result<Self, IngestError> {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        let mut positions = [0usize; TicketField::COUNT];
        let mut missing = Vec::new();
        for field in TicketField::ALL {
            let wanted = field.column_header().to_lowercase();
            match normalized.iter().position(|h| *h == wanted) {
                Some(index) => positions[field as usize] = index,
                None => missing.push(field.column_header().to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(IngestError::MissingColumns(missing));
        }
        Ok(Self { positions })
    }

    pub fn position(&self, field: TicketField) -> usize {
        self.positions[field as usize]
    }
}

/// Decode + parse in one step. This is the full ingestion boundary: every
/// failure comes back as an [`IngestError`] value, nothing panics.
pub fn parse_bytes(bytes: &[u8]) -> Result<ParseReport, IngestError> {
    let grid = decode_workbook(bytes)?;
    parse_grid(&grid)
}

/// Turns a decoded grid into validated [`TicketRecord`]s.
///
/// Blank (zero-length) rows are skipped silently and do not count toward the
/// totals, but row numbering still reflects the sheet position.
pub fn parse_grid(grid: &SheetGrid) -> Result<ParseReport, IngestError> {
    if grid.len() < 2 {
        return Err(IngestError::EmptyFile);
    }

    let map = ColumnMap::from_headers(&grid[0])?;

    let mut records = Vec::new();
    for (offset, row) in grid[1..].iter().enumerate() {
        if row.is_empty() {
            continue;
        }
        // Missing cell (row shorter than the mapped position) coerces to "".
        let cells =
            TicketField::ALL.map(|field| row.get(map.position(field)).cloned().unwrap_or_default());
        records.push(TicketRecord::from_cells(offset + 1, cells));
    }

    Ok(ParseReport::from_records(records))
}

/// Decodes the raw upload into a grid. xlsx workbooks are detected by their
/// ZIP container magic; anything else is treated as CSV.
pub fn decode_workbook(bytes: &[u8]) -> Result<SheetGrid, IngestError> {
    if bytes.starts_with(b"PK") {
        decode_xlsx(bytes)
    } else {
        decode_csv(bytes)
    }
}

fn decode_xlsx(bytes: &[u8]) -> Result<SheetGrid, IngestError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| IngestError::Malformed(e.to_string()))?;

    // First-sheet convention: any other sheets in the workbook are ignored.
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::Malformed("workbook contains no sheets".to_string()))?
        .map_err(|e| IngestError::Malformed(e.to_string()))?;

    let mut grid = SheetGrid::new();
    for row in range.rows() {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            grid.push(Vec::new());
            continue;
        }
        grid.push(row.iter().map(cell_to_string).collect());
    }
    Ok(grid)
}

fn decode_csv(bytes: &[u8]) -> Result<SheetGrid, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = SheetGrid::new();
    for result in reader.records() {
        let record = result.map_err(|e| IngestError::Malformed(e.to_string()))?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

/// String coercion only, no trimming: empty cells become "", numbers render
/// without a trailing `.0`, booleans lowercase.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
