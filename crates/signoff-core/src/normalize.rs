//! Canonical forms for free-text frequency and room tokens.
//!
//! The same [`normalize`] function is used when the taxonomy index is built
//! and when completion records are looked up. Rules, in precedence order:
//!
//! 1. lowercase and trim;
//! 2. a multiplier marker (`"2x "` or `"twice "`) is kept as a prefix and the
//!    remainder has its whitespace collapsed, so `"2x  Weekly"` becomes
//!    `"2x weekly"` and stays distinct from `"weekly"`;
//! 3. anything containing a digit is treated as a room identifier: split on
//!    commas, trim each token, collapse whitespace inside it, drop empty
//!    tokens, rejoin with commas (`"8.77A, 8.77B"` → `"8.77a,8.77b"`);
//! 4. otherwise whitespace runs collapse to single spaces.
//!
//! Whitespace inside a room token is preserved (collapsed, not removed), so
//! `"8.77 A"` and `"8.77A"` stay distinct unless an alias maps one onto the
//! other.

use std::collections::HashMap;

const MULTIPLIER_MARKERS: [&str; 2] = ["2x ", "twice "];

/// Normalize a frequency or room string for comparison
pub fn normalize(raw: &str) -> String {
    let s = raw.trim().to_lowercase();

    for marker in MULTIPLIER_MARKERS {
        if let Some(pos) = s.find(marker) {
            let rest = &s[pos + marker.len()..];
            return format!("{marker}{}", collapse_whitespace(rest));
        }
    }

    if s.chars().any(|c| c.is_ascii_digit()) {
        return room_tokens(&s).collect::<Vec<_>>().join(",");
    }

    collapse_whitespace(&s)
}

/// Split an already-normalized room string into its individual tokens
pub fn room_tokens(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(',')
        .map(collapse_whitespace)
        .filter(|token| !token.is_empty())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fixed rewrite table applied to raw room identifiers before normalization.
///
/// Used when the source system reports a bare room number for a space the
/// taxonomy splits into sub-rooms sharing one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomAliases {
    aliases: HashMap<String, String>,
}

impl Default for RoomAliases {
    fn default() -> Self {
        Self::empty().with_alias("8.77", "8.77A,8.77B")
    }
}

impl RoomAliases {
    /// A table with no aliases
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Add an alias (builder pattern)
    pub fn with_alias(mut self, room: impl Into<String>, label: impl Into<String>) -> Self {
        self.aliases.insert(room.into(), label.into());
        self
    }

    /// Rewrite `room` if it is an alias, otherwise return it unchanged.
    ///
    /// Matching is exact on the trimmed string.
    pub fn resolve<'a>(&'a self, room: &'a str) -> &'a str {
        self.aliases.get(room.trim()).map_or(room, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequencies_lowercase_and_collapse() {
        assert_eq!(normalize("  Weekly "), "weekly");
        assert_eq!(normalize("Bi   Monthly"), "bi monthly");
        assert_eq!(normalize("QUARTERLY"), "quarterly");
    }

    #[test]
    fn multiplier_marker_kept_as_prefix() {
        assert_eq!(normalize("2x Weekly"), "2x weekly");
        assert_eq!(normalize("2x   Weekly  "), "2x weekly");
        assert_eq!(normalize("Twice Monthly"), "twice monthly");
        assert_ne!(normalize("2x Weekly"), normalize("Weekly"));
    }

    #[test]
    fn multiplier_drops_leading_text() {
        assert_eq!(normalize("Warehouse 2x weekly"), "2x weekly");
    }

    #[test]
    fn room_lists_trim_around_commas() {
        assert_eq!(normalize("1.94, 1.97"), "1.94,1.97");
        assert_eq!(normalize("7.08, 7.09, 7.17"), "7.08,7.09,7.17");
        assert_eq!(normalize("8.77A, 8.77B"), "8.77a,8.77b");
    }

    #[test]
    fn room_internal_space_preserved() {
        assert_eq!(normalize("8.77 A"), "8.77 a");
        assert_eq!(normalize("8.77   A"), "8.77 a");
        assert_ne!(normalize("8.77 A"), normalize("8.77A"));
    }

    #[test]
    fn room_empty_tokens_dropped() {
        assert_eq!(normalize("1.94,"), "1.94");
        assert_eq!(normalize("1.94,,1.97"), "1.94,1.97");
    }

    #[test]
    fn room_ranges_are_opaque_tokens() {
        assert_eq!(normalize("7.00-7.03"), "7.00-7.03");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["2x Weekly", "8.77A, 8.77B", "  Monthly ", "1.18,1.20,1.50"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn default_alias_rewrites_bare_room() {
        let aliases = RoomAliases::default();
        assert_eq!(aliases.resolve("8.77"), "8.77A,8.77B");
        assert_eq!(aliases.resolve(" 8.77 "), "8.77A,8.77B");
        assert_eq!(aliases.resolve("8.72"), "8.72");
        assert_eq!(aliases.resolve("8.77A"), "8.77A");
    }

    #[test]
    fn empty_alias_table() {
        let aliases = RoomAliases::empty();
        assert!(aliases.is_empty());
        assert_eq!(aliases.resolve("8.77"), "8.77");
    }
}
