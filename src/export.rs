//! Result sink: write an aggregated result set to disk.
//!
//! The format is chosen by file extension: `.csv`, `.json`, `.xlsx`, and
//! anything else falls back to tab-delimited text. A save failure never
//! touches the in-memory results — the caller keeps them and can retry with
//! another path or format.

use crate::paginate::AggregateResult;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Why a save failed.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),
    /// The writer for this format was not compiled in.
    #[error("{0}")]
    Unsupported(String),
    #[cfg(feature = "xlsx")]
    #[error("failed to write spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Save results to `path`, dispatching on the extension.
pub fn save(results: &AggregateResult, path: &Path) -> Result<(), ExportError> {
    tracing::info!(path = %path.display(), "saving results");

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("json") => save_json(results, path),
        Some("csv") => save_csv(results, path),
        Some("xlsx") => save_xlsx(results, path),
        _ => save_text(results, path),
    }
}

fn save_json(results: &AggregateResult, path: &Path) -> Result<(), ExportError> {
    let body = serde_json::to_string_pretty(results)?;
    write_all(path, body.as_bytes())
}

fn save_csv(results: &AggregateResult, path: &Path) -> Result<(), ExportError> {
    let mut out = String::new();
    push_csv_row(&mut out, results.headers.iter().map(String::as_str));
    for record in &results.data {
        let row = record.as_row();
        push_csv_row(&mut out, row.iter().map(String::as_str));
    }
    write_all(path, out.as_bytes())
}

/// Tab-delimited text, the default: header row, 80-dash rule, data rows.
fn save_text(results: &AggregateResult, path: &Path) -> Result<(), ExportError> {
    let mut out = String::new();
    out.push_str(&results.headers.join("\t"));
    out.push('\n');
    out.push_str(&"-".repeat(80));
    out.push('\n');
    for record in &results.data {
        out.push_str(&record.as_row().join("\t"));
        out.push('\n');
    }
    write_all(path, out.as_bytes())
}

#[cfg(feature = "xlsx")]
fn save_xlsx(results: &AggregateResult, path: &Path) -> Result<(), ExportError> {
    use rust_xlsxwriter::{Color, Format, Workbook};

    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet().set_name("Tax Records")?;
    let header_format = Format::new().set_bold().set_background_color(Color::RGB(0xDDDDDD));
    for (col, header) in results.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &header_format)?;
        sheet.set_column_width(col as u16, (header.len() + 2).max(12) as f64)?;
    }
    for (row, record) in results.data.iter().enumerate() {
        for (col, cell) in record.as_row().iter().enumerate() {
            sheet.write_string((row + 1) as u32, col as u16, cell)?;
        }
    }

    // Second sheet with search metadata, mirroring the records sheet.
    let meta = workbook.add_worksheet().set_name("Search Info")?;
    let bold = Format::new().set_bold();
    meta.write_string_with_format(0, 0, "Search Date", &bold)?;
    meta.write_string(0, 1, chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string())?;
    meta.write_string_with_format(1, 0, "Records Found", &bold)?;
    meta.write_number(1, 1, results.data.len() as f64)?;
    meta.write_string_with_format(2, 0, "Current Page", &bold)?;
    meta.write_number(2, 1, f64::from(results.pagination.current_page))?;
    meta.write_string_with_format(3, 0, "Total Pages", &bold)?;
    meta.write_number(3, 1, f64::from(results.pagination.total_pages.unwrap_or(1)))?;
    meta.set_column_width(0, 15.0)?;
    meta.set_column_width(1, 25.0)?;

    workbook.save(path)?;
    Ok(())
}

#[cfg(not(feature = "xlsx"))]
fn save_xlsx(_results: &AggregateResult, _path: &Path) -> Result<(), ExportError> {
    Err(ExportError::Unsupported(
        "spreadsheet output requires a build with the `xlsx` feature \
         (cargo install montax --features xlsx)"
            .to_string(),
    ))
}

fn write_all(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut file = std::fs::File::create(path).map_err(io_err)?;
    file.write_all(bytes).map_err(io_err)?;
    Ok(())
}

fn push_csv_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(',');
        }
        first = false;
        if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}
