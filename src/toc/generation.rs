//! Chronological generation series of a product entry.
//!
//! Generations are kept in a `BTreeMap` keyed by `Reverse(valid_from)`, so
//! iteration runs most-recent-first and every resolution query is one range
//! lookup:
//!
//! | query                | lookup                                            |
//! |----------------------|---------------------------------------------------|
//! | `latest()`           | first entry                                       |
//! | `as_of(t)`           | first entry of `Reverse(t)..`                     |
//! | `next_after(t)`      | last entry of `..Reverse(t)`                      |
//! | `previous_before(t)` | first entry strictly after `as_of(t)` in the map  |

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, Serializer};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::ops::Bound;

/// A time-sliced revision of a product, valid from `valid_from` until the
/// next generation takes over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationTocEntry {
    /// Instant from which this generation is in force
    pub valid_from: DateTime<Utc>,
    /// Implementation type of the generation, when it differs from the
    /// product's default generation implementation type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation_type: Option<String>,
}

impl GenerationTocEntry {
    /// Create a generation valid from the given instant.
    #[must_use]
    pub const fn new(valid_from: DateTime<Utc>) -> Self {
        Self {
            valid_from,
            implementation_type: None,
        }
    }

    /// Set the generation-specific implementation type.
    #[must_use]
    pub fn with_implementation_type(mut self, implementation_type: impl Into<String>) -> Self {
        self.implementation_type = Some(implementation_type.into());
        self
    }
}

/// Generations of one product, ordered descending by validity start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSeries {
    by_valid_from: BTreeMap<Reverse<DateTime<Utc>>, GenerationTocEntry>,
}

impl GenerationSeries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a generation. A generation with the same validity start is
    /// replaced and returned.
    pub fn insert(&mut self, generation: GenerationTocEntry) -> Option<GenerationTocEntry> {
        self.by_valid_from
            .insert(Reverse(generation.valid_from), generation)
    }

    /// Remove the generation starting at `valid_from`.
    pub fn remove(&mut self, valid_from: DateTime<Utc>) -> Option<GenerationTocEntry> {
        self.by_valid_from.remove(&Reverse(valid_from))
    }

    /// The generation with the largest validity start.
    #[must_use]
    pub fn latest(&self) -> Option<&GenerationTocEntry> {
        self.by_valid_from.values().next()
    }

    /// The generation in force at `at`: the most recent one whose validity
    /// start is not after `at`.
    #[must_use]
    pub fn as_of(&self, at: DateTime<Utc>) -> Option<&GenerationTocEntry> {
        self.by_valid_from
            .range(Reverse(at)..)
            .next()
            .map(|(_, generation)| generation)
    }

    /// The generation that takes over after the one in force at `at`.
    ///
    /// No generation lies between `as_of(at)` and `at`, so this is the
    /// earliest generation starting strictly after `at`. When nothing is in
    /// force at `at` that is the very first generation after it.
    #[must_use]
    pub fn next_after(&self, at: DateTime<Utc>) -> Option<&GenerationTocEntry> {
        self.by_valid_from
            .range(..Reverse(at))
            .next_back()
            .map(|(_, generation)| generation)
    }

    /// The generation that was in force just before the one in force at `at`.
    #[must_use]
    pub fn previous_before(&self, at: DateTime<Utc>) -> Option<&GenerationTocEntry> {
        let current = self.as_of(at)?;
        self.by_valid_from
            .range((Bound::Excluded(Reverse(current.valid_from)), Bound::Unbounded))
            .next()
            .map(|(_, generation)| generation)
    }

    /// Look up the generation starting exactly at `valid_from`.
    #[must_use]
    pub fn get(&self, valid_from: DateTime<Utc>) -> Option<&GenerationTocEntry> {
        self.by_valid_from.get(&Reverse(valid_from))
    }

    /// Generations, most recent first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &GenerationTocEntry> + ExactSizeIterator {
        self.by_valid_from.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_valid_from.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_valid_from.is_empty()
    }
}

impl Serialize for GenerationSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl FromIterator<GenerationTocEntry> for GenerationSeries {
    fn from_iter<I: IntoIterator<Item = GenerationTocEntry>>(iter: I) -> Self {
        let mut series = Self::new();
        for generation in iter {
            series.insert(generation);
        }
        series
    }
}

// ============================================================================
// Instant text form
// ============================================================================

/// Parse an instant in one of the accepted textual forms:
/// RFC 3339 (`2024-01-01T00:00:00Z`, offsets allowed), a local date-time
/// taken as UTC (`2024-01-01T08:30:00`) or a plain date meaning midnight UTC
/// (`2024-01-01`).
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>, String> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(format!(
        "'{text}' is not an instant (expected RFC 3339, YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD)"
    ))
}

/// Canonical textual form written to the persisted format. Sub-second
/// precision is kept, in groups of three digits.
#[must_use]
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
