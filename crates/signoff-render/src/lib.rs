//! # signoff-render
//!
//! Output side of the sign-off sheet generator.
//!
//! This crate provides:
//! - The skeleton builder: a blank monthly grid from a taxonomy index
//! - `ExcelRenderer`: XLSX workbooks from a (populated) grid
//! - `UnmatchedReport`: the plain-text review file for unmatched records
//!
//! ## Example
//!
//! ```rust
//! use signoff_core::{FrequencyGroup, ReportPeriod, Renderer, Section, Taxonomy, TaxonomyIndex};
//! use signoff_render::{build_grid, ExcelRenderer};
//!
//! let taxonomy = Taxonomy::new(vec![Section::new(
//!     "Production",
//!     vec![FrequencyGroup::new("Weekly", "Sweep floor", ["1.94,1.97", "1.95"])],
//! )]);
//! let index = TaxonomyIndex::build(&taxonomy).unwrap();
//!
//! let grid = build_grid(ReportPeriod::new(2025, 1).unwrap(), &index);
//! assert_eq!(grid.find_day_row("Mon, Jan 6 2025"), Some(8));
//!
//! let xlsx = ExcelRenderer::new().render(&grid).unwrap();
//! assert_eq!(&xlsx[0..2], b"PK");
//! ```

pub mod excel;
pub mod skeleton;
pub mod unmatched;

pub use excel::ExcelRenderer;
pub use skeleton::build_grid;
pub use unmatched::UnmatchedReport;
