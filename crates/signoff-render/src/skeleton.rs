//! Blank monthly sign-off grid.
//!
//! Per-frequency layout (one sheet per frequency):
//!
//! ```text
//!      A                B          C          D
//! 1  | Date |  Production - Weekly (Sweep floor)  |
//! 2  |      |  1.94,1.97 |   1.95   |   8.17     |
//! 3  | Wed, Jan 1 2025 |          |            |
//! ..
//! 33 | Fri, Jan 31 2025 |         |            |
//! 36 | Reviewed by
//! 38 | Sign: | ________________________ |
//! 39 | Name: | ________________________ |
//! 40 | Date: | ________________________ |
//! ```
//!
//! The combined layout adds a section band above the frequency band, so it
//! has three header rows instead of two.

use chrono::{Datelike, Weekday};
use signoff_core::index::SheetLayout;
use signoff_core::{
    day_label, Border, BorderWeight, CellAlign, CellStyle, Grid, LayoutMode, ReportPeriod, Sheet,
    TaxonomyIndex, DATE_COLUMN,
};
use tracing::debug;

pub const DATE_HEADER: &str = "Date";
pub const REVIEWED_BY: &str = "Reviewed by";
pub const SIGNATURE_FIELDS: [&str; 3] = ["Sign:", "Name:", "Date:"];

pub const DATE_COLUMN_WIDTH: f64 = 20.0;
pub const DATA_COLUMN_WIDTH: f64 = 12.0;
pub const HEADER_ROW_HEIGHT: f64 = 30.0;

/// Blank rows between the last day and "Reviewed by"
const FOOTER_GAP: u32 = 2;
/// Columns spanned by each signature field
const SIGNATURE_SPAN: u16 = 3;

/// Lay out the blank grid for `period`, one sheet per index sheet
pub fn build_grid(period: ReportPeriod, index: &TaxonomyIndex) -> Grid {
    let mut grid = Grid::new(period, index.layout());
    for layout in index.sheets() {
        grid.push_sheet(build_sheet(period, index.layout(), layout));
    }
    debug!(
        period = %period,
        sheets = grid.sheets().len(),
        days = period.days_in_month(),
        "skeleton built"
    );
    grid
}

fn header_style() -> CellStyle {
    CellStyle::default()
        .bold()
        .align(CellAlign::Center)
        .wrap()
        .border(Border::thin_box())
}

fn build_sheet(period: ReportPeriod, mode: LayoutMode, layout: &SheetLayout) -> Sheet {
    let header_rows = mode.header_rows();
    let mut sheet = Sheet::new(layout.name.clone(), header_rows);
    let last_column = layout.last_column();

    // Columns that close a frequency or section group
    let group_ends: Vec<u16> = layout.frequencies().map(|(_, f)| f.span.last).collect();
    let edge = |col: u16, border: Border| {
        if group_ends.contains(&col) {
            border.with_right(BorderWeight::Medium)
        } else {
            border
        }
    };

    // Date header spans every header row
    merge_block(
        &mut sheet,
        (1, DATE_COLUMN),
        (header_rows, DATE_COLUMN),
        DATE_HEADER,
        header_style(),
    );

    let mut band_row = 1;
    if mode == LayoutMode::Combined {
        for section in &layout.sections {
            let style = header_style().border(edge(section.span.last, Border::thin_box()));
            merge_block(
                &mut sheet,
                (band_row, section.span.first),
                (band_row, section.span.last),
                &section.name,
                style,
            );
        }
        band_row += 1;
    }

    for (section, frequency) in layout.frequencies() {
        let text = match mode {
            LayoutMode::PerFrequency => format!(
                "{} - {}\n({})",
                section.name, frequency.name, frequency.description
            ),
            LayoutMode::Combined => format!("{}\n({})", frequency.name, frequency.description),
        };
        let style = header_style().border(edge(frequency.span.last, Border::thin_box()));
        merge_block(
            &mut sheet,
            (band_row, frequency.span.first),
            (band_row, frequency.span.last),
            &text,
            style,
        );

        for (col, label) in &frequency.columns {
            let style = header_style().border(edge(*col, Border::thin_box()));
            sheet.set_cell(header_rows, *col, Some(label.clone()), style);
        }
    }

    // One row per day
    let first_day_row = header_rows + 1;
    let mut last_day_row = header_rows;
    for (offset, date) in period.dates().enumerate() {
        let row = first_day_row + offset as u32;
        let border = if date.weekday() == Weekday::Sun {
            Border::thin_box().with_bottom(BorderWeight::Medium)
        } else {
            Border::thin_box()
        };

        sheet.set_cell(
            row,
            DATE_COLUMN,
            Some(day_label(date)),
            CellStyle::default().align(CellAlign::Left).border(border),
        );
        for col in DATE_COLUMN + 1..=last_column {
            let style = CellStyle::default()
                .align(CellAlign::Center)
                .wrap()
                .border(edge(col, border));
            sheet.set_cell(row, col, None, style);
        }
        last_day_row = row;
    }

    // Reviewed-by footer
    let review_row = last_day_row + FOOTER_GAP + 1;
    sheet.set_cell(
        review_row,
        DATE_COLUMN,
        Some(REVIEWED_BY.to_string()),
        CellStyle::default().bold(),
    );
    for (i, field) in SIGNATURE_FIELDS.iter().enumerate() {
        let row = review_row + 2 + i as u32;
        sheet.set_cell(row, DATE_COLUMN, Some((*field).to_string()), CellStyle::default());
        let first = DATE_COLUMN + 1;
        let last = DATE_COLUMN + SIGNATURE_SPAN;
        for col in first..=last {
            sheet.set_cell(row, col, None, CellStyle::default().border(Border::underline()));
        }
        sheet.merge(row, first, row, last);
    }

    sheet.set_column_width(DATE_COLUMN, DATE_COLUMN_WIDTH);
    for col in DATE_COLUMN + 1..=last_column {
        sheet.set_column_width(col, DATA_COLUMN_WIDTH);
    }
    for row in 1..=header_rows {
        sheet.set_row_height(row, HEADER_ROW_HEIGHT);
    }

    sheet
}

/// Write `text` into the top-left cell of a block, style every cell in it
/// and merge it when it covers more than one cell
fn merge_block(
    sheet: &mut Sheet,
    (first_row, first_col): (u32, u16),
    (last_row, last_col): (u32, u16),
    text: &str,
    style: CellStyle,
) {
    for row in first_row..=last_row {
        for col in first_col..=last_col {
            let value = (row == first_row && col == first_col).then(|| text.to_string());
            sheet.set_cell(row, col, value, style);
        }
    }
    if first_row != last_row || first_col != last_col {
        sheet.merge(first_row, first_col, last_row, last_col);
    }
}
