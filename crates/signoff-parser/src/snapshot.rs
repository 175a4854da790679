//! Processed snapshot naming and discovery.
//!
//! Snapshots are named `task_data_{YYYY}_{MM}_{stamp}.csv`, where the stamp
//! is `%Y%m%d%H%M%S` at write time, so the lexicographically greatest name
//! for a month is the newest one.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use signoff_core::ReportPeriod;
use tracing::debug;

use crate::ParseError;

fn month_prefix(period: ReportPeriod) -> String {
    format!("task_data_{}_{:02}_", period.year(), period.month())
}

/// File name of a snapshot for `period` written at `now`
pub fn snapshot_file_name(period: ReportPeriod, now: NaiveDateTime) -> String {
    format!("{}{}.csv", month_prefix(period), now.format("%Y%m%d%H%M%S"))
}

/// Newest snapshot for `period` in `dir`
pub fn latest_snapshot(dir: &Path, period: ReportPeriod) -> Result<PathBuf, ParseError> {
    let prefix = month_prefix(period);
    let entries = std::fs::read_dir(dir).map_err(|source| ParseError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let latest = entries
        .filter_map(Result::ok)
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.starts_with(&prefix) && name.ends_with(".csv"))
        .max()
        .ok_or_else(|| ParseError::NoSnapshot {
            dir: dir.to_path_buf(),
            period,
        })?;

    debug!(file = %latest, "latest snapshot");
    Ok(dir.join(latest))
}
