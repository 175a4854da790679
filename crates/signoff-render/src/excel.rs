//! XLSX output for sign-off grids
//!
//! Each grid sheet becomes one worksheet. Merged ranges are written first
//! with the anchor cell's value and style; the remaining cells are written
//! individually, skipping anything a merge already covers.
//!
//! Grid rows and columns are 1-based, worksheet rows and columns 0-based.

use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use signoff_core::{
    Border, BorderWeight, CellAlign, CellRef, CellStyle, Grid, RenderError, Renderer, Sheet,
};
use tracing::{debug, info};

/// Excel sign-off workbook renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Keep the header rows and date column in view while scrolling
    pub freeze_headers: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            freeze_headers: true,
        }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Do not freeze the header panes
    pub fn no_freeze(mut self) -> Self {
        self.freeze_headers = false;
        self
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(&self, grid: &Grid) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        for sheet in grid.sheets() {
            self.add_sheet(&mut workbook, sheet)?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    /// Render `grid` and write it to `path`
    pub fn write_file(&self, grid: &Grid, path: &Path) -> Result<(), RenderError> {
        let bytes = self.render(grid)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, bytes).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), sheets = grid.sheets().len(), "workbook written");
        Ok(())
    }

    fn add_sheet(&self, workbook: &mut Workbook, sheet: &Sheet) -> Result<(), RenderError> {
        let ws = workbook.add_worksheet();
        ws.set_name(sheet.name())
            .map_err(|e| RenderError::Format(e.to_string()))?;

        for merge in sheet.merges() {
            let anchor = sheet.cell(merge.first.row, merge.first.col);
            let text = anchor.and_then(|c| c.value.as_deref()).unwrap_or_default();
            let format = anchor.map(|c| to_format(&c.style)).unwrap_or_default();
            ws.merge_range(
                merge.first.row - 1,
                merge.first.col - 1,
                merge.last.row - 1,
                merge.last.col - 1,
                text,
                &format,
            )
            .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        let merged = |at: CellRef| sheet.merges().iter().any(|m| m.contains(at));
        for (at, cell) in sheet.cells() {
            if merged(at) {
                continue;
            }
            write_cell(ws, at, cell.value.as_deref(), &cell.style)?;
        }

        for (col, width) in sheet.column_widths() {
            ws.set_column_width(col - 1, width)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }
        for (row, height) in sheet.row_heights() {
            ws.set_row_height(row - 1, height)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        if self.freeze_headers {
            ws.set_freeze_panes(sheet.header_rows(), 1)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        debug!(sheet = sheet.name(), cells = sheet.cells().count(), "worksheet written");
        Ok(())
    }
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, grid: &Grid) -> Result<Vec<u8>, RenderError> {
        if grid.sheets().is_empty() {
            return Err(RenderError::InvalidData("No sheets to render".into()));
        }
        self.render_to_bytes(grid)
    }
}

fn write_cell(
    ws: &mut Worksheet,
    at: CellRef,
    value: Option<&str>,
    style: &CellStyle,
) -> Result<(), RenderError> {
    let format = to_format(style);
    let (row, col) = (at.row - 1, at.col - 1);
    let written = match value {
        Some(text) => ws.write_string_with_format(row, col, text, &format),
        None => ws.write_blank(row, col, &format),
    };
    written.map_err(|e| RenderError::Format(e.to_string()))?;
    Ok(())
}

fn to_format(style: &CellStyle) -> Format {
    let mut format = Format::new();
    if style.bold {
        format = format.set_bold();
    }
    format = match style.align {
        CellAlign::General => format,
        CellAlign::Left => format
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter),
        CellAlign::Center => format
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter),
    };
    if style.wrap {
        format = format.set_text_wrap();
    }
    apply_border(format, &style.border)
}

fn apply_border(mut format: Format, border: &Border) -> Format {
    let weight = |w: BorderWeight| match w {
        BorderWeight::Thin => FormatBorder::Thin,
        BorderWeight::Medium => FormatBorder::Medium,
    };
    if let Some(w) = border.left {
        format = format.set_border_left(weight(w));
    }
    if let Some(w) = border.right {
        format = format.set_border_right(weight(w));
    }
    if let Some(w) = border.top {
        format = format.set_border_top(weight(w));
    }
    if let Some(w) = border.bottom {
        format = format.set_border_bottom(weight(w));
    }
    format
}
