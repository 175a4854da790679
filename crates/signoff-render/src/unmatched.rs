//! Plain-text review file for records that could not be placed.
//!
//! ```text
//! Unmatched Tasks Review for Production - January 2025
//! ================================================================================
//!
//! Summary of Unmatched Combinations:
//! ----------------------------------------
//! Frequency: 'Weekly', Room: '9.99' - 2 occurrences
//!
//!
//! Detailed Error List:
//! ----------------------------------------
//! No matching column for frequency 'Weekly' and room '9.99'
//! Date not found: Sat, Feb 1 2025
//! No matching column for frequency 'Weekly' and room '9.99'
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use signoff_core::{RenderError, ReportPeriod, ReportType, UnmatchedEntry};
use tracing::info;

/// Summary and detail listing of one run's unmatched entries
#[derive(Clone, Debug)]
pub struct UnmatchedReport<'a> {
    report_type: ReportType,
    period: ReportPeriod,
    entries: &'a [UnmatchedEntry],
}

impl<'a> UnmatchedReport<'a> {
    pub fn new(report_type: ReportType, period: ReportPeriod, entries: &'a [UnmatchedEntry]) -> Self {
        Self {
            report_type,
            period,
            entries,
        }
    }

    /// Occurrences per (frequency, room) among no-column entries, sorted
    pub fn summary(&self) -> BTreeMap<(&'a str, &'a str), usize> {
        let mut groups = BTreeMap::new();
        for entry in self.entries {
            if let UnmatchedEntry::NoColumn { frequency, room } = entry {
                *groups.entry((frequency.as_str(), room.as_str())).or_insert(0) += 1;
            }
        }
        groups
    }

    /// The full review text
    pub fn render(&self) -> String {
        let mut out = format!(
            "Unmatched Tasks Review for {} - {}\n",
            self.report_type.display_name(),
            self.period
        );
        out.push_str(&"=".repeat(80));
        out.push_str("\n\n");

        out.push_str("Summary of Unmatched Combinations:\n");
        out.push_str(&"-".repeat(40));
        out.push('\n');
        for ((frequency, room), count) in self.summary() {
            out.push_str(&format!(
                "Frequency: '{frequency}', Room: '{room}' - {count} occurrences\n"
            ));
        }

        out.push_str("\n\nDetailed Error List:\n");
        out.push_str(&"-".repeat(40));
        out.push('\n');
        for entry in self.entries {
            out.push_str(&format!("{entry}\n"));
        }
        out
    }

    /// Write the review text to `path`, creating parent directories
    pub fn write(&self, path: &Path) -> Result<(), RenderError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, self.render()).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), entries = self.entries.len(), "unmatched report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_column(frequency: &str, room: &str) -> UnmatchedEntry {
        UnmatchedEntry::NoColumn {
            frequency: frequency.into(),
            room: room.into(),
        }
    }

    #[test]
    fn summary_groups_and_sorts() {
        let entries = vec![
            no_column("Weekly", "9.99"),
            no_column("Daily", "8.00"),
            UnmatchedEntry::NoSheetForFrequency {
                frequency: "Hourly".into(),
            },
            no_column("Weekly", "9.99"),
        ];
        let report = UnmatchedReport::new(
            ReportType::Warehouse,
            ReportPeriod::new(2025, 1).unwrap(),
            &entries,
        );
        let summary: Vec<_> = report.summary().into_iter().collect();
        assert_eq!(summary, [(("Daily", "8.00"), 1), (("Weekly", "9.99"), 2)]);
    }

    #[test]
    fn renders_summary_then_details() {
        let entries = vec![
            no_column("Weekly", "9.99"),
            UnmatchedEntry::DateNotFound {
                date: "Sat, Feb 1 2025".into(),
            },
            no_column("Weekly", "9.99"),
        ];
        let report = UnmatchedReport::new(
            ReportType::Production,
            ReportPeriod::new(2025, 1).unwrap(),
            &entries,
        );

        let expected = format!(
            "Unmatched Tasks Review for Production - January 2025\n\
             {}\n\
             \n\
             Summary of Unmatched Combinations:\n\
             {}\n\
             Frequency: 'Weekly', Room: '9.99' - 2 occurrences\n\
             \n\
             \n\
             Detailed Error List:\n\
             {}\n\
             No matching column for frequency 'Weekly' and room '9.99'\n\
             Date not found: Sat, Feb 1 2025\n\
             No matching column for frequency 'Weekly' and room '9.99'\n",
            "=".repeat(80),
            "-".repeat(40),
            "-".repeat(40),
        );
        assert_eq!(report.render(), expected);
    }

    #[test]
    fn empty_summary_still_has_sections() {
        let entries = vec![UnmatchedEntry::DateNotFound {
            date: "Sat, Feb 1 2025".into(),
        }];
        let text = UnmatchedReport::new(
            ReportType::Idf,
            ReportPeriod::new(2025, 1).unwrap(),
            &entries,
        )
        .render();
        assert!(text.starts_with("Unmatched Tasks Review for Idf - January 2025\n"));
        assert!(text.contains("Summary of Unmatched Combinations:\n----------------------------------------\n\n\nDetailed"));
    }
}
