//! Taxonomy documents.
//!
//! Shape: `{Section: {Frequency: {"description": string, "columns": [string]}}}`
//! plus an optional top-level `"layout"` string. Section and frequency order
//! is the document order, so the JSON map must preserve insertion order.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use signoff_core::{ConfigError, FrequencyGroup, LayoutMode, ReportType, Section, Taxonomy};
use tracing::{debug, info};

use crate::ParseError;

const LAYOUT_KEY: &str = "layout";

const PRODUCTION_CONFIG: &str = include_str!("../configs/production_config.json");
const WAREHOUSE_CONFIG: &str = include_str!("../configs/warehouse_config.json");
const IDF_CONFIG: &str = include_str!("../configs/idf_config.json");

/// Parse a taxonomy document
pub fn parse_taxonomy(json: &str) -> Result<Taxonomy, ConfigError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ConfigError::Malformed(format!("invalid JSON: {e}")))?;
    let root = value
        .as_object()
        .ok_or_else(|| ConfigError::Malformed("document must be a JSON object".into()))?;

    let mut layout = LayoutMode::default();
    let mut sections = Vec::new();

    for (key, value) in root {
        match value {
            Value::String(mode) if key == LAYOUT_KEY => layout = mode.parse()?,
            Value::Object(frequencies) => sections.push(parse_section(key, frequencies)?),
            _ => {
                return Err(ConfigError::Malformed(format!(
                    "section '{key}' must be an object"
                )))
            }
        }
    }

    if sections.is_empty() {
        return Err(ConfigError::Empty);
    }

    Ok(Taxonomy::new(sections).layout(layout))
}

fn parse_section(name: &str, frequencies: &Map<String, Value>) -> Result<Section, ConfigError> {
    if frequencies.is_empty() {
        return Err(ConfigError::EmptySection {
            section: name.to_string(),
        });
    }

    let groups = frequencies
        .iter()
        .map(|(frequency, value)| parse_frequency(name, frequency, value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Section::new(name, groups))
}

fn parse_frequency(section: &str, frequency: &str, value: &Value) -> Result<FrequencyGroup, ConfigError> {
    let missing = |field: &'static str| ConfigError::MissingField {
        section: section.to_string(),
        frequency: frequency.to_string(),
        field,
    };

    let entry = value.as_object().ok_or_else(|| {
        ConfigError::Malformed(format!("'{section}' / '{frequency}' must be an object"))
    })?;

    let description = entry
        .get("description")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("description"))?;

    let columns = entry
        .get("columns")
        .and_then(Value::as_array)
        .ok_or_else(|| missing("columns"))?;

    if columns.is_empty() {
        return Err(ConfigError::EmptyColumns {
            section: section.to_string(),
            frequency: frequency.to_string(),
        });
    }

    let labels = columns
        .iter()
        .map(|column| {
            column.as_str().map(str::to_string).ok_or_else(|| {
                ConfigError::Malformed(format!(
                    "'{section}' / '{frequency}' has a non-string column {column}"
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FrequencyGroup::new(frequency, description, labels))
}

/// Read and parse a taxonomy document from disk
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let taxonomy = parse_taxonomy(&content).map_err(|source| ParseError::Taxonomy {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        sections = taxonomy.sections.len(),
        labels = taxonomy.label_count(),
        "taxonomy loaded"
    );
    Ok(taxonomy)
}

/// The bundled catalog for a report type
pub fn default_taxonomy_json(report_type: ReportType) -> &'static str {
    match report_type {
        ReportType::Production => PRODUCTION_CONFIG,
        ReportType::Warehouse => WAREHOUSE_CONFIG,
        ReportType::Idf => IDF_CONFIG,
    }
}

/// Write the bundled catalogs into `dir`.
///
/// Existing files are kept unless `overwrite` is set. Returns the paths
/// actually written.
pub fn write_default_configs(dir: &Path, overwrite: bool) -> Result<Vec<PathBuf>, ParseError> {
    std::fs::create_dir_all(dir).map_err(|source| ParseError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for report_type in ReportType::ALL {
        let path = dir.join(report_type.config_file_name());
        if path.exists() && !overwrite {
            debug!(path = %path.display(), "config exists, skipping");
            continue;
        }
        std::fs::write(&path, default_taxonomy_json(report_type)).map_err(|source| {
            ParseError::Io {
                path: path.clone(),
                source,
            }
        })?;
        info!(path = %path.display(), "wrote default config");
        written.push(path);
    }
    Ok(written)
}
