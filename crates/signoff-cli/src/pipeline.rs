//! Generation pipeline: one workbook (and review file) per report type.
//!
//! Report types run independently. A failure in one is recorded and the
//! batch moves on to the next; the caller turns the failure count into the
//! process exit code.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use signoff_core::{CompletionRecord, ReportPeriod, ReportType, RoomAliases, TaxonomyIndex};
use signoff_matcher::{CompletionMatcher, MatchReport};
use signoff_parser::{latest_snapshot, load_completion_records, load_taxonomy, ParseError};
use signoff_render::{build_grid, ExcelRenderer, UnmatchedReport};
use tracing::{error, info, warn};

/// Number of unmatched messages echoed per report type
pub const DEFAULT_DETAIL_LIMIT: usize = 10;

/// Run configuration, built from command-line arguments
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Holds `{type}_config.json` taxonomy documents
    pub config_dir: PathBuf,
    /// Holds processed `task_data_*.csv` snapshots
    pub data_dir: PathBuf,
    /// Receives the generated workbooks
    pub output_dir: PathBuf,
    /// Receives unmatched-record review files
    pub review_dir: PathBuf,
    pub aliases: RoomAliases,
    pub detail_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("configs"),
            data_dir: PathBuf::from("data/processed"),
            output_dir: PathBuf::from("data/signoff_sheets"),
            review_dir: PathBuf::from("data/review"),
            aliases: RoomAliases::default(),
            detail_limit: DEFAULT_DETAIL_LIMIT,
        }
    }
}

/// Completion data available to a batch
#[derive(Debug)]
pub enum CompletionData {
    Loaded {
        path: PathBuf,
        records: Vec<CompletionRecord>,
    },
    /// No data for the period; sheets are generated empty
    Missing { reason: String },
    /// Data exists but is unusable; population is skipped for every type
    Invalid { reason: String },
}

impl CompletionData {
    pub fn records(&self) -> Option<&[CompletionRecord]> {
        match self {
            CompletionData::Loaded { records, .. } => Some(records),
            _ => None,
        }
    }
}

/// Load the run's completion data once.
///
/// `explicit` overrides the snapshot lookup in the data directory.
pub fn load_completion_data(
    config: &PipelineConfig,
    period: ReportPeriod,
    explicit: Option<&Path>,
) -> CompletionData {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match latest_snapshot(&config.data_dir, period) {
            Ok(path) => path,
            Err(e @ (ParseError::NoSnapshot { .. } | ParseError::Io { .. })) => {
                warn!(error = %e, "no completion data");
                return CompletionData::Missing {
                    reason: e.to_string(),
                };
            }
            Err(e) => {
                return CompletionData::Invalid {
                    reason: e.to_string(),
                }
            }
        },
    };

    match load_completion_records(&path) {
        Ok(records) => CompletionData::Loaded { path, records },
        Err(e) => {
            error!(error = %e, "completion data rejected");
            CompletionData::Invalid {
                reason: e.to_string(),
            }
        }
    }
}

/// What one report type produced
#[derive(Debug)]
pub struct ReportSummary {
    pub report_type: ReportType,
    pub workbook: PathBuf,
    /// Written only when something did not match
    pub review_file: Option<PathBuf>,
    /// `None` when there was nothing to populate from
    pub matching: Option<MatchReport>,
}

/// Build, populate and write the workbook for one report type
pub fn generate_report(
    config: &PipelineConfig,
    period: ReportPeriod,
    report_type: ReportType,
    records: Option<&[CompletionRecord]>,
) -> Result<ReportSummary> {
    let config_path = config.config_dir.join(report_type.config_file_name());
    let taxonomy = load_taxonomy(&config_path)
        .with_context(|| format!("loading {report_type} taxonomy"))?;
    let index = TaxonomyIndex::build(&taxonomy)
        .with_context(|| format!("indexing {}", config_path.display()))?;

    let mut grid = build_grid(period, &index);

    let matching = records.map(|records| {
        let in_period: Vec<&CompletionRecord> =
            records.iter().filter(|r| period.contains(r.date())).collect();
        info!(
            report_type = report_type.as_str(),
            total = records.len(),
            in_period = in_period.len(),
            "records filtered to period"
        );
        CompletionMatcher::new(&index, report_type)
            .with_aliases(config.aliases.clone())
            .populate(&mut grid, in_period)
    });

    let workbook = config.output_dir.join(report_type.workbook_file_name(period));
    ExcelRenderer::new()
        .write_file(&grid, &workbook)
        .with_context(|| format!("writing {report_type} workbook"))?;

    let mut review_file = None;
    if let Some(report) = matching.as_ref().filter(|r| !r.is_complete()) {
        let path = config.review_dir.join(report_type.unmatched_file_name(period));
        UnmatchedReport::new(report_type, period, &report.unmatched)
            .write(&path)
            .with_context(|| format!("writing {report_type} review file"))?;
        review_file = Some(path);
    }

    Ok(ReportSummary {
        report_type,
        workbook,
        review_file,
        matching,
    })
}

/// Outcome of a multi-type run
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub summaries: Vec<ReportSummary>,
    pub failures: Vec<(ReportType, anyhow::Error)>,
    /// Set when completion data existed but could not be used
    pub population_error: Option<String>,
}

impl BatchOutcome {
    /// Failed report types, plus one if population was aborted
    pub fn failure_count(&self) -> usize {
        self.failures.len() + usize::from(self.population_error.is_some())
    }
}

/// Generate every requested report type, isolating failures.
///
/// Progress and summaries go to `out`.
pub fn run_batch<W: Write>(
    config: &PipelineConfig,
    period: ReportPeriod,
    types: &[ReportType],
    data: &CompletionData,
    out: &mut W,
) -> io::Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();

    match data {
        CompletionData::Loaded { path, records } => {
            writeln!(out, "Found task data file: {} ({} records)", path.display(), records.len())?;
        }
        CompletionData::Missing { reason } => {
            writeln!(out, "Warning: {reason}")?;
            writeln!(out, "Will generate empty sign-off sheets.")?;
        }
        CompletionData::Invalid { reason } => {
            writeln!(out, "Error: {reason}")?;
            writeln!(out, "Sign-off sheets will be generated without completion data.")?;
            outcome.population_error = Some(reason.clone());
        }
    }

    for &report_type in types {
        writeln!(out)?;
        writeln!(out, "Generating {report_type} report for {period}...")?;
        match generate_report(config, period, report_type, data.records()) {
            Ok(summary) => {
                write_summary(out, &summary, config.detail_limit)?;
                outcome.summaries.push(summary);
            }
            Err(e) => {
                error!(report_type = report_type.as_str(), error = %format!("{e:#}"), "report failed");
                writeln!(out, "Error processing {report_type} report: {e:#}")?;
                writeln!(out, "Continuing with next report...")?;
                outcome.failures.push((report_type, e));
            }
        }
    }

    Ok(outcome)
}

/// Human-readable summary of one report type
pub fn write_summary<W: Write>(out: &mut W, summary: &ReportSummary, limit: usize) -> io::Result<()> {
    writeln!(out, "Created {}", summary.workbook.display())?;

    let Some(report) = &summary.matching else {
        return Ok(());
    };
    writeln!(
        out,
        "Records: {} attempted, {} matched, {} unmatched ({} of other types skipped)",
        report.attempted,
        report.matched,
        report.unmatched_count(),
        report.skipped
    )?;

    if !report.unmatched.is_empty() {
        writeln!(out, "Unmatched records:")?;
        for entry in report.unmatched.iter().take(limit) {
            writeln!(out, "  {entry}")?;
        }
        if report.unmatched.len() > limit {
            writeln!(out, "  ... and {} more errors", report.unmatched.len() - limit)?;
        }
    }
    if let Some(path) = &summary.review_file {
        writeln!(out, "Unmatched tasks written to: {}", path.display())?;
    }
    Ok(())
}
