//! Operator-defined catalog of sections, frequencies and room groupings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// How a taxonomy is laid out on the grid.
///
/// The mode travels with the taxonomy into the index, so the skeleton
/// builder and the matcher always agree on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// One sheet per frequency; rooms are looked up within that sheet
    #[default]
    PerFrequency,
    /// A single sheet with every section and frequency side by side;
    /// rooms are looked up by (frequency, room)
    Combined,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::PerFrequency => "per-frequency",
            LayoutMode::Combined => "combined",
        }
    }

    /// Number of header rows above the first day row
    pub fn header_rows(&self) -> u32 {
        match self {
            LayoutMode::PerFrequency => 2,
            LayoutMode::Combined => 3,
        }
    }
}

impl std::str::FromStr for LayoutMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per-frequency" => Ok(LayoutMode::PerFrequency),
            "combined" => Ok(LayoutMode::Combined),
            _ => Err(ConfigError::UnknownLayout(s.to_string())),
        }
    }
}

/// The full catalog for one report type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub layout: LayoutMode,
    /// Sections in declared order
    pub sections: Vec<Section>,
}

impl Taxonomy {
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            layout: LayoutMode::default(),
            sections,
        }
    }

    /// Set the layout mode (builder pattern)
    pub fn layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }

    /// Total number of room-group labels across all frequencies
    pub fn label_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| &s.frequencies)
            .map(|f| f.columns.len())
            .sum()
    }
}

/// A named area (e.g. "Warehouse") holding one or more frequencies
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    /// Frequencies in declared order
    pub frequencies: Vec<FrequencyGroup>,
}

impl Section {
    pub fn new(name: impl Into<String>, frequencies: Vec<FrequencyGroup>) -> Self {
        Self {
            name: name.into(),
            frequencies,
        }
    }
}

/// A cleaning frequency within a section and the room groups it covers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyGroup {
    pub name: String,
    /// What the task consists of, shown in the header band
    pub description: String,
    /// Room-group labels, one per spreadsheet column. A label may list
    /// several comma-separated room identifiers sharing that column.
    pub columns: Vec<String>,
}

impl FrequencyGroup {
    pub fn new<I, S>(name: impl Into<String>, description: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}
