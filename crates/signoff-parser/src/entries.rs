//! Raw task entries → processed completion rows.
//!
//! Raw entries are the JSON objects returned by the task-tracking service and
//! cached on disk as one JSON array per file. Structured fields are pulled out
//! of free text:
//!
//! | Field     | Source                  | Rule                                        |
//! |-----------|-------------------------|---------------------------------------------|
//! | room      | `area.point.name`       | first `(…)` group of digits, `.`, `,`, `-`  |
//! | frequency | `title`                 | first whole-word frequency, default monthly |
//! | task type | `title`                 | IDF / Server Room, Warehouse, Production    |
//! | name      | `user` via directory    | user id → full name                         |

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use signoff_core::{ReportPeriod, RoomAliases};
use tracing::{debug, info, warn};

use crate::completion::DATETIME_FORMAT;
use crate::snapshot::snapshot_file_name;
use crate::ParseError;

static ROOM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([\d.,\-]+)\)").expect("valid room regex"));

static FREQUENCY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(daily|weekly|2x weekly|quarterly|monthly)\b").expect("valid frequency regex")
});

/// Frequency assumed when a title names none
pub const DEFAULT_FREQUENCY: &str = "monthly";

// ============================================================================
// Raw input
// ============================================================================

/// One task entry as cached from the remote service
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTaskEntry {
    #[serde(default)]
    pub sequence_id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: String,
    /// User id of the assignee
    #[serde(default)]
    pub user: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub area: Option<RawArea>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawArea {
    #[serde(default)]
    pub location: Option<RawNamed>,
    #[serde(default)]
    pub point: Option<RawNamed>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawNamed {
    #[serde(default)]
    pub name: Option<String>,
}

impl RawTaskEntry {
    fn location(&self) -> Option<&str> {
        self.area.as_ref()?.location.as_ref()?.name.as_deref()
    }

    fn point(&self) -> Option<&str> {
        self.area.as_ref()?.point.as_ref()?.name.as_deref()
    }

    fn task_id(&self) -> String {
        match &self.sequence_id {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct UserRecord {
    user: UserInfo,
}

#[derive(Deserialize)]
struct UserInfo {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "fullName", default)]
    full_name: Option<String>,
}

/// Maps user ids to display names
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserDirectory {
    names: HashMap<String, String>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user (builder pattern)
    pub fn with_user(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(id.into(), name.into());
        self
    }

    /// Parse a users listing: `[{"user": {"_id": "...", "fullName": "..."}}]`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<UserRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Load a users listing from disk
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let file = File::open(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<UserRecord> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ParseError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_records(records))
    }

    fn from_records(records: Vec<UserRecord>) -> Self {
        let names = records
            .into_iter()
            .filter_map(|r| r.user.full_name.map(|name| (r.user.id, name)))
            .collect();
        Self { names }
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ============================================================================
// Field extraction
// ============================================================================

/// Room number from a location point name: `"Corridor (1.94)"` → `"1.94"`
pub fn extract_room(point: &str) -> Option<&str> {
    ROOM_PATTERN
        .captures(point)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Frequency word from a task title, as written (`"Weekly"`), or `"monthly"`
pub fn extract_frequency(title: &str) -> &str {
    FREQUENCY_PATTERN
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map_or(DEFAULT_FREQUENCY, |m| m.as_str())
}

/// Task-type label from a task title
pub fn extract_task_type(title: &str) -> Option<&'static str> {
    if title.contains("IDF") || title.contains("Server Room") {
        Some("IDF")
    } else if title.contains("Warehouse") {
        Some("Warehouse")
    } else if title.contains("Production") {
        Some("Production")
    } else {
        None
    }
}

// ============================================================================
// Processed rows
// ============================================================================

/// One row of a processed snapshot
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    #[serde(rename = "Task ID")]
    pub task_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Datetime", serialize_with = "serialize_datetime")]
    pub datetime: NaiveDateTime,
    #[serde(rename = "Location 1")]
    pub location: String,
    #[serde(rename = "Location 2")]
    pub point: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Room Number")]
    pub room: String,
    #[serde(rename = "Frequency")]
    pub frequency: String,
    #[serde(rename = "Task Type")]
    pub task_type: String,
    #[serde(rename = "Year/Month")]
    pub year_month: String,
}

fn serialize_datetime<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&dt.format(DATETIME_FORMAT))
}

/// Turn raw entries into snapshot rows.
///
/// Entries without a location point or with an unreadable timestamp are
/// dropped. The rest are sorted by time and de-duplicated on (calendar date,
/// location point), keeping the earliest.
pub fn process_entries(
    entries: &[RawTaskEntry],
    users: &UserDirectory,
    aliases: &RoomAliases,
) -> Vec<TaskRow> {
    let mut dated: Vec<(NaiveDateTime, &RawTaskEntry)> = entries
        .iter()
        .filter(|entry| entry.point().is_some())
        .filter_map(|entry| match DateTime::parse_from_rfc3339(entry.created_at.trim()) {
            Ok(dt) => Some((dt.naive_local(), entry)),
            Err(e) => {
                warn!(created_at = %entry.created_at, error = %e, "skipping entry with bad timestamp");
                None
            }
        })
        .collect();
    dated.sort_by_key(|(dt, _)| *dt);

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for (datetime, entry) in dated {
        let point = entry.point().unwrap_or_default();
        if !seen.insert((datetime.date(), point.to_string())) {
            debug!(point, date = %datetime.date(), "duplicate entry dropped");
            continue;
        }

        let room = extract_room(point)
            .map(|room| aliases.resolve(room).to_string())
            .unwrap_or_default();
        let name = entry
            .user
            .as_deref()
            .and_then(|id| users.name(id))
            .unwrap_or_default()
            .to_string();

        rows.push(TaskRow {
            task_id: entry.task_id(),
            title: entry.title.clone(),
            datetime,
            location: entry.location().unwrap_or_default().to_string(),
            point: point.to_string(),
            name,
            room,
            frequency: extract_frequency(&entry.title).to_string(),
            task_type: extract_task_type(&entry.title).unwrap_or_default().to_string(),
            year_month: format!("{}-{}", datetime.year(), datetime.month()),
        });
    }
    rows
}

/// Read every `*.json` file in `dir` as an array of raw entries
pub fn load_raw_entries(dir: &Path) -> Result<Vec<RawTaskEntry>, ParseError> {
    let read_dir = std::fs::read_dir(dir).map_err(|source| ParseError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut entries = Vec::new();
    for path in files {
        let file = File::open(&path).map_err(|source| ParseError::Io {
            path: path.clone(),
            source,
        })?;
        let page: Vec<RawTaskEntry> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ParseError::Json {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), entries = page.len(), "raw entries loaded");
        entries.extend(page);
    }
    Ok(entries)
}

/// Write rows as a processed snapshot into `dir`.
///
/// The file is named after the month of the newest row and stamped with
/// `now`. Returns the path written.
pub fn write_snapshot(dir: &Path, rows: &[TaskRow], now: NaiveDateTime) -> Result<PathBuf, ParseError> {
    let newest = rows
        .iter()
        .map(|r| r.datetime)
        .max()
        .ok_or_else(|| ParseError::NoEntries {
            dir: dir.to_path_buf(),
        })?;
    let period = ReportPeriod::containing(newest.date());

    std::fs::create_dir_all(dir).map_err(|source| ParseError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(snapshot_file_name(period, now));

    let csv_error = |source| ParseError::Csv {
        path: path.clone(),
        source,
    };
    let mut writer = csv::Writer::from_path(&path).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| ParseError::Io {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), rows = rows.len(), "snapshot written");
    Ok(path)
}
