//! Taxonomy index: (frequency, room) → grid column.
//!
//! Columns are allocated left to right starting at 2 (column 1 holds the
//! date label), section by section and frequency by frequency in declared
//! order. Each room-group label takes exactly one column no matter how many
//! room identifiers it lists.
//!
//! Every label is indexed twice: under its full normalized form and under
//! each of its room tokens, so `"1.94"`, `"1.97"` and `"1.94,1.97"` all
//! resolve to the same column. A token listed by two different labels of one
//! frequency resolves to nothing; records naming it end up unmatched. When
//! the same full label is declared twice for one frequency (a repeated
//! frequency across sections), the first declaration wins.
//!
//! ```text
//! per-frequency                      combined
//! sheet "Weekly"   sheet "Quarterly"  sheet "Sign-off"
//! | Date | B | C | | Date | B | C |     | Date | B | C | D | E |
//!                                       \-- Weekly --/\-Quarterly-/
//! ```

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::normalize::{normalize, room_tokens};
use crate::taxonomy::{LayoutMode, Taxonomy};
use crate::ConfigError;

/// First column available for room groups (column 1 is the date label)
pub const FIRST_DATA_COLUMN: u16 = 2;

/// Largest column number a worksheet accepts
pub const MAX_COLUMN: u16 = 16_384;

/// Sheet name used by the combined layout
pub const COMBINED_SHEET_NAME: &str = "Sign-off";

/// Where a (frequency, room) pair lands on the grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColumnTarget {
    /// Index into `Grid::sheets`
    pub sheet: usize,
    /// 1-based column number
    pub column: u16,
}

/// Why a lookup failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupMiss {
    /// The frequency is not part of the taxonomy
    UnknownFrequency,
    /// The frequency exists but no column covers the room
    UnknownRoom,
}

/// Inclusive 1-based column range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnSpan {
    pub first: u16,
    pub last: u16,
}

/// Header layout of one sheet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    pub name: String,
    pub sections: Vec<SectionLayout>,
}

impl SheetLayout {
    /// Rightmost room-group column on this sheet
    pub fn last_column(&self) -> u16 {
        self.sections
            .last()
            .map(|s| s.span.last)
            .unwrap_or(FIRST_DATA_COLUMN - 1)
    }

    /// Every frequency group on the sheet, left to right
    pub fn frequencies(&self) -> impl Iterator<Item = (&SectionLayout, &FrequencyLayout)> {
        self.sections
            .iter()
            .flat_map(|s| s.frequencies.iter().map(move |f| (s, f)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionLayout {
    pub name: String,
    pub span: ColumnSpan,
    pub frequencies: Vec<FrequencyLayout>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyLayout {
    pub name: String,
    pub description: String,
    pub span: ColumnSpan,
    /// (column, room-group label as written in the taxonomy)
    pub columns: Vec<(u16, String)>,
}

/// Token entry: one column, or several labels claiming it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TokenKey {
    Column(ColumnTarget),
    Ambiguous,
}

#[derive(Clone, Debug, Default)]
struct FrequencyKeys {
    /// Full normalized labels
    labels: HashMap<String, ColumnTarget>,
    /// Individual tokens of compound labels
    tokens: HashMap<String, TokenKey>,
}

impl FrequencyKeys {
    fn token(&self, token: &str) -> Option<ColumnTarget> {
        if let Some(&target) = self.labels.get(token) {
            return Some(target);
        }
        match self.tokens.get(token) {
            Some(&TokenKey::Column(target)) => Some(target),
            _ => None,
        }
    }
}

/// Lookup table built once per taxonomy
#[derive(Clone, Debug)]
pub struct TaxonomyIndex {
    layout: LayoutMode,
    sheets: Vec<SheetLayout>,
    keys: HashMap<String, FrequencyKeys>,
    column_count: usize,
}

impl TaxonomyIndex {
    /// Flatten a taxonomy into sheet layouts and lookup keys
    pub fn build(taxonomy: &Taxonomy) -> Result<Self, ConfigError> {
        if taxonomy.sections.is_empty() {
            return Err(ConfigError::Empty);
        }

        let mut builder = IndexBuilder {
            layout: taxonomy.layout,
            sheets: Vec::new(),
            keys: HashMap::new(),
            column_count: 0,
        };

        for section in &taxonomy.sections {
            if section.frequencies.is_empty() {
                return Err(ConfigError::EmptySection {
                    section: section.name.clone(),
                });
            }

            for group in &section.frequencies {
                if group.columns.is_empty() {
                    return Err(ConfigError::EmptyColumns {
                        section: section.name.clone(),
                        frequency: group.name.clone(),
                    });
                }

                let (sheet, first) = builder.open_frequency(&section.name, &group.name);
                let last = usize::from(first) + group.columns.len() - 1;
                if last > usize::from(MAX_COLUMN) {
                    return Err(ConfigError::TooManyColumns(last));
                }
                let last = last as u16;

                let mut seen = HashSet::new();
                let mut columns = Vec::with_capacity(group.columns.len());
                for (column, label) in (first..=last).zip(&group.columns) {
                    let normalized = normalize(label);
                    if normalized.is_empty() {
                        return Err(ConfigError::Malformed(format!(
                            "blank column label under '{}' / '{}'",
                            section.name, group.name
                        )));
                    }
                    if !seen.insert(normalized.clone()) {
                        return Err(ConfigError::DuplicateLabel {
                            section: section.name.clone(),
                            frequency: group.name.clone(),
                            label: label.clone(),
                        });
                    }
                    builder.register(&group.name, &normalized, ColumnTarget { sheet, column });
                    columns.push((column, label.clone()));
                }
                builder.column_count += columns.len();

                builder.push_frequency(
                    sheet,
                    &section.name,
                    FrequencyLayout {
                        name: group.name.clone(),
                        description: group.description.clone(),
                        span: ColumnSpan { first, last },
                        columns,
                    },
                );
            }
        }

        debug!(
            layout = taxonomy.layout.as_str(),
            sheets = builder.sheets.len(),
            columns = builder.column_count,
            "taxonomy index built"
        );

        Ok(Self {
            layout: builder.layout,
            sheets: builder.sheets,
            keys: builder.keys,
            column_count: builder.column_count,
        })
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    /// Sheet layouts in workbook order
    pub fn sheets(&self) -> &[SheetLayout] {
        &self.sheets
    }

    /// Number of room-group columns across all sheets
    pub fn len(&self) -> usize {
        self.column_count
    }

    pub fn is_empty(&self) -> bool {
        self.column_count == 0
    }

    /// Resolve a normalized (frequency, room) pair to its column.
    ///
    /// The full room string is tried first; failing that, every token of a
    /// compound room must resolve to one and the same column. Ambiguous
    /// tokens never resolve.
    pub fn resolve(&self, frequency: &str, room: &str) -> Result<ColumnTarget, LookupMiss> {
        let keys = self
            .keys
            .get(frequency)
            .ok_or(LookupMiss::UnknownFrequency)?;

        if let Some(&target) = keys.labels.get(room) {
            return Ok(target);
        }

        let mut found = None;
        for token in room_tokens(room) {
            let target = keys.token(&token).ok_or(LookupMiss::UnknownRoom)?;
            match found {
                Some(prev) if prev != target => return Err(LookupMiss::UnknownRoom),
                _ => found = Some(target),
            }
        }
        found.ok_or(LookupMiss::UnknownRoom)
    }
}

struct IndexBuilder {
    layout: LayoutMode,
    sheets: Vec<SheetLayout>,
    keys: HashMap<String, FrequencyKeys>,
    column_count: usize,
}

impl IndexBuilder {
    /// Pick the sheet for a new frequency group and its first column
    fn open_frequency(&mut self, section: &str, frequency: &str) -> (usize, u16) {
        match self.layout {
            LayoutMode::PerFrequency => {
                if self.keys.contains_key(&normalize(frequency)) {
                    warn!(section, frequency, "frequency declared again; earlier labels take precedence");
                }
                let name = unique_sheet_name(&self.sheets, frequency);
                self.sheets.push(SheetLayout {
                    name,
                    sections: vec![SectionLayout {
                        name: section.to_string(),
                        span: ColumnSpan {
                            first: FIRST_DATA_COLUMN,
                            last: FIRST_DATA_COLUMN,
                        },
                        frequencies: Vec::new(),
                    }],
                });
                (self.sheets.len() - 1, FIRST_DATA_COLUMN)
            }
            LayoutMode::Combined => {
                if self.sheets.is_empty() {
                    self.sheets.push(SheetLayout {
                        name: COMBINED_SHEET_NAME.to_string(),
                        sections: Vec::new(),
                    });
                }
                let sheet = &mut self.sheets[0];
                let next = sheet.last_column() + 1;
                if sheet.sections.last().map(|s| s.name.as_str()) != Some(section) {
                    sheet.sections.push(SectionLayout {
                        name: section.to_string(),
                        span: ColumnSpan {
                            first: next,
                            last: next,
                        },
                        frequencies: Vec::new(),
                    });
                }
                (0, next)
            }
        }
    }

    fn push_frequency(&mut self, sheet: usize, section: &str, frequency: FrequencyLayout) {
        let sheet = &mut self.sheets[sheet];
        if let Some(last) = sheet.sections.last_mut().filter(|s| s.name == section) {
            last.span.last = frequency.span.last;
            last.frequencies.push(frequency);
        }
    }

    fn register(&mut self, frequency: &str, label: &str, target: ColumnTarget) {
        let keys = self.keys.entry(normalize(frequency)).or_default();

        match keys.labels.entry(label.to_string()) {
            Entry::Occupied(existing) => {
                warn!(
                    frequency,
                    label,
                    kept = existing.get().column,
                    ignored = target.column,
                    "room label declared twice for one frequency"
                );
                return;
            }
            Entry::Vacant(slot) => {
                slot.insert(target);
            }
        }

        for token in room_tokens(label).filter(|t| t != label) {
            keys.tokens
                .entry(token)
                .and_modify(|key| {
                    if *key != TokenKey::Column(target) {
                        *key = TokenKey::Ambiguous;
                    }
                })
                .or_insert(TokenKey::Column(target));
        }
    }
}

/// Excel sheet names: at most 31 characters, none of `[]:*?/\`, unique
fn unique_sheet_name(existing: &[SheetLayout], raw: &str) -> String {
    let base: String = raw
        .trim()
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(31)
        .collect();
    let base = if base.is_empty() { "Sheet".to_string() } else { base };

    let taken = |name: &str| existing.iter().any(|s| s.name.eq_ignore_ascii_case(name));
    if !taken(&base) {
        return base;
    }
    (2..)
        .map(|n| {
            let suffix = format!(" ({n})");
            let stem: String = base.chars().take(31 - suffix.len()).collect();
            format!("{stem}{suffix}")
        })
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.clone())
}
