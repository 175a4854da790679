//! In-memory spreadsheet model of a sign-off sheet.
//!
//! Rows and columns are 1-based, as they appear to someone reading the
//! workbook. The skeleton builder lays out every cell; after that only cell
//! values change ([`Sheet::write_value`] refuses to create new cells).

use std::collections::BTreeMap;

use crate::period::ReportPeriod;
use crate::taxonomy::LayoutMode;

/// Column holding the day labels
pub const DATE_COLUMN: u16 = 1;

// ============================================================================
// Styles
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderWeight {
    Thin,
    /// Visually heavier line marking group and week boundaries
    Medium,
}

/// Border on each side of a cell (`None` = no line)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Border {
    pub left: Option<BorderWeight>,
    pub right: Option<BorderWeight>,
    pub top: Option<BorderWeight>,
    pub bottom: Option<BorderWeight>,
}

impl Border {
    /// Thin line on all four sides
    pub fn thin_box() -> Self {
        Self {
            left: Some(BorderWeight::Thin),
            right: Some(BorderWeight::Thin),
            top: Some(BorderWeight::Thin),
            bottom: Some(BorderWeight::Thin),
        }
    }

    /// A single line under the cell
    pub fn underline() -> Self {
        Self {
            bottom: Some(BorderWeight::Thin),
            ..Self::default()
        }
    }

    pub fn with_bottom(mut self, weight: BorderWeight) -> Self {
        self.bottom = Some(weight);
        self
    }

    pub fn with_right(mut self, weight: BorderWeight) -> Self {
        self.right = Some(weight);
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellAlign {
    #[default]
    General,
    /// Left, vertically centered
    Left,
    /// Centered both ways
    Center,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub bold: bool,
    pub align: CellAlign,
    pub wrap: bool,
    pub border: Border,
}

impl CellStyle {
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn align(mut self, align: CellAlign) -> Self {
        self.align = align;
        self
    }

    pub fn wrap(mut self) -> Self {
        self.wrap = true;
        self
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }
}

// ============================================================================
// Cells
// ============================================================================

/// 1-based cell address, ordered row-major
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", column_letter(self.col), self.row)
    }
}

/// Spreadsheet column letters for a 1-based column number (1 → "A")
pub fn column_letter(col: u16) -> String {
    let mut n = u32::from(col);
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub value: Option<String>,
    pub style: CellStyle,
}

/// Rectangular merged area; the value lives in `first`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergedRange {
    pub first: CellRef,
    pub last: CellRef,
}

impl MergedRange {
    pub fn contains(&self, cell: CellRef) -> bool {
        (self.first.row..=self.last.row).contains(&cell.row)
            && (self.first.col..=self.last.col).contains(&cell.col)
    }
}

// ============================================================================
// Sheet
// ============================================================================

/// One worksheet of the grid
#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
    name: String,
    header_rows: u32,
    cells: BTreeMap<CellRef, Cell>,
    merges: Vec<MergedRange>,
    column_widths: BTreeMap<u16, f64>,
    row_heights: BTreeMap<u32, f64>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, header_rows: u32) -> Self {
        Self {
            name: name.into(),
            header_rows,
            cells: BTreeMap::new(),
            merges: Vec::new(),
            column_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows above the first day row
    pub fn header_rows(&self) -> u32 {
        self.header_rows
    }

    /// Lay out a cell (skeleton building)
    pub fn set_cell(&mut self, row: u32, col: u16, value: Option<String>, style: CellStyle) {
        self.cells.insert(CellRef::new(row, col), Cell { value, style });
    }

    /// Merge a rectangular range
    pub fn merge(&mut self, first_row: u32, first_col: u16, last_row: u32, last_col: u16) {
        self.merges.push(MergedRange {
            first: CellRef::new(first_row, first_col),
            last: CellRef::new(last_row, last_col),
        });
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    /// Grow a column to `width` unless it is already at least that wide
    pub fn widen_column(&mut self, col: u16, width: f64) {
        let current = self.column_widths.entry(col).or_insert(0.0);
        if width > *current {
            *current = width;
        }
    }

    /// Replace the value of an existing cell.
    ///
    /// Returns `false`, leaving the sheet untouched, if the skeleton never
    /// laid out that cell.
    pub fn write_value(&mut self, row: u32, col: u16, value: impl Into<String>) -> bool {
        match self.cells.get_mut(&CellRef::new(row, col)) {
            Some(cell) => {
                cell.value = Some(value.into());
                true
            }
            None => false,
        }
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&CellRef::new(row, col))
    }

    pub fn value(&self, row: u32, col: u16) -> Option<&str> {
        self.cell(row, col).and_then(|c| c.value.as_deref())
    }

    /// First row (top to bottom) whose cell in `col` holds exactly `value`
    pub fn find_row(&self, col: u16, value: &str, from_row: u32) -> Option<u32> {
        self.cells
            .range(CellRef::new(from_row, 0)..)
            .find(|(at, cell)| at.col == col && cell.value.as_deref() == Some(value))
            .map(|(at, _)| at.row)
    }

    /// Row of the day labeled `label`, searching below the headers
    pub fn find_day_row(&self, label: &str) -> Option<u32> {
        self.find_row(DATE_COLUMN, label, self.header_rows + 1)
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells.iter().map(|(at, cell)| (*at, cell))
    }

    pub fn merges(&self) -> &[MergedRange] {
        &self.merges
    }

    /// The merged range anchored at `cell`, if any
    pub fn merge_at(&self, cell: CellRef) -> Option<&MergedRange> {
        self.merges.iter().find(|m| m.first == cell)
    }

    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.column_widths.iter().map(|(c, w)| (*c, *w))
    }

    pub fn row_heights(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.row_heights.iter().map(|(r, h)| (*r, *h))
    }
}

// ============================================================================
// Grid
// ============================================================================

/// All sheets of one sign-off workbook for one month.
///
/// Every sheet shares the same row layout: same header height, one row per
/// day in the same order, same footer position.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    period: ReportPeriod,
    layout: LayoutMode,
    sheets: Vec<Sheet>,
}

impl Grid {
    pub fn new(period: ReportPeriod, layout: LayoutMode) -> Self {
        Self {
            period,
            layout,
            sheets: Vec::new(),
        }
    }

    pub fn period(&self) -> ReportPeriod {
        self.period
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    /// Row of the day labeled `label`
    pub fn find_day_row(&self, label: &str) -> Option<u32> {
        self.sheets.first().and_then(|s| s.find_day_row(label))
    }
}
