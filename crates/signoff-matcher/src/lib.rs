//! # signoff-matcher
//!
//! Places completion records into a sign-off grid.
//!
//! For every record of the matcher's report type the matcher finds the day
//! row, resolves (frequency, room) through the taxonomy index and writes the
//! assignee's name into that cell. Anything that cannot be placed becomes an
//! [`UnmatchedEntry`]; nothing is ever fatal per record.
//!
//! ## Example
//!
//! ```rust,ignore
//! use signoff_matcher::CompletionMatcher;
//!
//! let matcher = CompletionMatcher::new(&index, ReportType::Production);
//! let report = matcher.populate(&mut grid, &records);
//! println!("{} of {} matched", report.matched, report.attempted);
//! ```

use signoff_core::{
    day_label, normalize, CompletionRecord, Grid, LayoutMode, LookupMiss, ReportType, RoomAliases,
    TaxonomyIndex, UnmatchedEntry, UnmatchedKind,
};
use tracing::{debug, info, trace, warn};

/// Widest a column grows to fit a name
pub const NAME_WIDTH_CAP: f64 = 20.0;

/// Outcome of one population run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Records of the matcher's report type
    pub attempted: usize,
    pub matched: usize,
    /// Records of other report types, never attempted
    pub skipped: usize,
    /// Failures in record order
    pub unmatched: Vec<UnmatchedEntry>,
}

impl MatchReport {
    pub fn unmatched_count(&self) -> usize {
        self.unmatched.len()
    }

    /// Whether every attempted record was placed
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }

    /// Number of unmatched entries of one kind
    pub fn count_of(&self, kind: UnmatchedKind) -> usize {
        self.unmatched.iter().filter(|e| e.kind() == kind).count()
    }
}

/// Matches completion records of one report type against one grid
#[derive(Clone, Debug)]
pub struct CompletionMatcher<'a> {
    index: &'a TaxonomyIndex,
    report_type: ReportType,
    aliases: RoomAliases,
}

impl<'a> CompletionMatcher<'a> {
    /// A matcher using the default room aliases
    pub fn new(index: &'a TaxonomyIndex, report_type: ReportType) -> Self {
        Self {
            index,
            report_type,
            aliases: RoomAliases::default(),
        }
    }

    /// Replace the room alias table (builder pattern)
    pub fn with_aliases(mut self, aliases: RoomAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    /// Write every matching record into `grid`, in order.
    ///
    /// A later record for the same cell overwrites an earlier one. The grid's
    /// shape never changes.
    pub fn populate<'r, I>(&self, grid: &mut Grid, records: I) -> MatchReport
    where
        I: IntoIterator<Item = &'r CompletionRecord>,
    {
        if grid.layout() != self.index.layout() {
            warn!(
                grid = grid.layout().as_str(),
                index = self.index.layout().as_str(),
                "grid and index layouts differ"
            );
        }

        let mut report = MatchReport::default();
        for record in records {
            if !self.report_type.matches_task_type(&record.task_type) {
                trace!(task_type = %record.task_type, "record skipped");
                report.skipped += 1;
                continue;
            }

            report.attempted += 1;
            match self.place(grid, record) {
                Ok(()) => report.matched += 1,
                Err(entry) => {
                    debug!(kind = entry.kind().as_str(), "{entry}");
                    report.unmatched.push(entry);
                }
            }
        }

        info!(
            report_type = self.report_type.as_str(),
            attempted = report.attempted,
            matched = report.matched,
            unmatched = report.unmatched.len(),
            skipped = report.skipped,
            "population finished"
        );
        report
    }

    fn place(&self, grid: &mut Grid, record: &CompletionRecord) -> Result<(), UnmatchedEntry> {
        let label = day_label(record.date());
        let row = grid
            .find_day_row(&label)
            .ok_or(UnmatchedEntry::DateNotFound { date: label })?;

        let frequency = normalize(&record.frequency);
        let room = normalize(self.aliases.resolve(&record.room));

        let no_column = || UnmatchedEntry::NoColumn {
            frequency: record.frequency.clone(),
            room: record.room.clone(),
        };

        let target = self
            .index
            .resolve(&frequency, &room)
            .map_err(|miss| match (miss, self.index.layout()) {
                (LookupMiss::UnknownFrequency, LayoutMode::PerFrequency) => {
                    UnmatchedEntry::NoSheetForFrequency {
                        frequency: record.frequency.clone(),
                    }
                }
                _ => no_column(),
            })?;

        let sheet = grid.sheet_mut(target.sheet).ok_or_else(no_column)?;
        if !sheet.write_value(row, target.column, record.name.as_str()) {
            warn!(
                sheet = sheet.name(),
                row,
                column = target.column,
                "resolved cell is not part of the grid"
            );
            return Err(no_column());
        }

        let width = (record.name.chars().count() as f64 + 2.0).min(NAME_WIDTH_CAP);
        sheet.widen_column(target.column, width);
        trace!(sheet = sheet.name(), row, column = target.column, name = %record.name, "placed");
        Ok(())
    }
}
