//! Output encoders for fetched report rows
//!
//! All formats share the same shape: one header row of display headings,
//! then one line per data row with cells ordered by the column mapping.
//! Missing and null cells are written as empty strings.

use crate::error::Result;
use crate::types::{ColumnMapping, OutputFormat, RowRecord};
use std::path::Path;

/// Write `rows` to `dest` in the given format
pub(crate) fn write_output(
    format: OutputFormat,
    columns: &ColumnMapping,
    rows: &[RowRecord],
    dest: &Path,
) -> Result<()> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    match format {
        OutputFormat::Xlsx => write_xlsx(columns, rows, dest),
        OutputFormat::Csv => write_delimited(b',', columns, rows, dest),
        OutputFormat::Tsv => write_delimited(b'\t', columns, rows, dest),
    }
}

fn cell<'a>(row: &'a RowRecord, key: &str) -> &'a str {
    row.get(key).and_then(|v| v.as_deref()).unwrap_or("")
}

fn write_xlsx(columns: &ColumnMapping, rows: &[RowRecord], dest: &Path) -> Result<()> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, heading) in columns.headings().enumerate() {
        sheet.write_string(0, col as u16, heading)?;
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col, key) in columns.keys().enumerate() {
            sheet.write_string(row_idx as u32 + 1, col as u16, cell(row, key))?;
        }
    }

    workbook.save(dest)?;
    Ok(())
}

fn write_delimited(
    delimiter: u8,
    columns: &ColumnMapping,
    rows: &[RowRecord],
    dest: &Path,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(dest)?;

    writer.write_record(columns.headings())?;
    for row in rows {
        writer.write_record(columns.keys().map(|key| cell(row, key)))?;
    }
    writer.flush()?;
    Ok(())
}
