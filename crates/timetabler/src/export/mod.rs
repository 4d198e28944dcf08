//! Spreadsheet and document export of a resource view.
//!
//! Both formats walk the resources in scope in response order. The sheet
//! re-derives cell text with its own formatting; the document reuses the
//! screen rendering.
mod document;

pub use document::build_document;

use crate::grid::view::{day_label, period_labels};
use crate::grid::{PeriodEntry, ResourceView, Selection, FREE_MARKER};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Name of the single worksheet every block goes into.
pub const SHEET_NAME: &str = "Timetables";

const DAY_PERIOD_HEADER: &str = "Day/Period";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data available")]
    NoData,

    #[error("Failed to write spreadsheet: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to render document: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Html => "html",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "html" | "document" => Ok(ExportFormat::Html),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

/// Cell text for exported sheets: `subject(faculty)[room]`, with the batch
/// inside the brackets for labs.
pub fn export_cell_text(entry: &PeriodEntry) -> String {
    match entry.detail() {
        None => FREE_MARKER.to_string(),
        Some(d) if d.is_lab => format!("{}({})[{}, {}]", d.subject, d.faculty, d.room, d.batch),
        Some(d) => format!("{}({})[{}]", d.subject, d.faculty, d.room),
    }
}

/// Builds the rows of the combined sheet.
///
/// Per resource: a title row, a period header row sized to that resource,
/// one row per day the resource has, padded with `Free`, and a blank
/// separator row. A resource without rows keeps its title and header only.
pub fn build_sheet(view: &ResourceView<'_>, selection: &Selection) -> Result<Vec<Vec<String>>, ExportError> {
    let scope = view.scope(selection);
    if scope.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut rows = Vec::new();
    for (name, days) in scope {
        let dims = view.resource_dimensions(name);

        rows.push(vec![format!("{}: {}", view.kind().label(), name)]);

        let mut header = vec![DAY_PERIOD_HEADER.to_string()];
        header.extend(period_labels(dims.periods));
        rows.push(header);

        for (day, cells) in days.iter().enumerate() {
            let mut row = Vec::with_capacity(dims.periods + 1);
            row.push(day_label(day));
            row.extend((0..dims.periods).map(|p| {
                cells
                    .get(p)
                    .map(export_cell_text)
                    .unwrap_or_else(|| FREE_MARKER.to_string())
            }));
            rows.push(row);
        }

        rows.push(Vec::new());
    }

    Ok(rows)
}

/// Serializes sheet rows into an xlsx workbook held in memory.
pub fn xlsx_bytes(rows: &[Vec<String>]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    // the title row of each block is one cell wide; its header row follows
    let mut header_next = false;
    for (r, row) in rows.iter().enumerate() {
        let is_title = row.len() == 1;
        for (c, text) in row.iter().enumerate() {
            if is_title || header_next {
                worksheet.write_string_with_format(r as u32, c as u16, text, &bold)?;
            } else {
                worksheet.write_string(r as u32, c as u16, text)?;
            }
        }
        header_next = is_title;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Writes sheet rows to an xlsx file.
pub fn write_xlsx(rows: &[Vec<String>], path: &Path) -> Result<(), ExportError> {
    let bytes = xlsx_bytes(rows)?;
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), rows = rows.len(), "Wrote spreadsheet");
    Ok(())
}

/// Download name for an export.
pub fn export_filename(view: &ResourceView<'_>, selection: &Selection, format: ExportFormat) -> String {
    match selection {
        Selection::All => format!("all_{}_timetables.{}", view.kind().as_str(), format.extension()),
        Selection::One(name) => format!(
            "{}_{}_timetable.{}",
            view.kind().as_str(),
            sanitize_file_component(name),
            format.extension()
        ),
    }
}

fn sanitize_file_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// Builds and writes one export into `dir`, returning the file path.
pub fn export_to_dir(
    view: &ResourceView<'_>,
    selection: &Selection,
    format: ExportFormat,
    dir: &Path,
) -> Result<std::path::PathBuf, ExportError> {
    let path = dir.join(export_filename(view, selection, format));
    match format {
        ExportFormat::Xlsx => write_xlsx(&build_sheet(view, selection)?, &path)?,
        ExportFormat::Html => {
            let html = build_document(view, selection)?;
            std::fs::write(&path, html)?;
            info!(path = %path.display(), "Wrote document");
        }
    }
    Ok(path)
}
