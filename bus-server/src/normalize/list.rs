//! Whole-response normalization.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::warn;

use crate::bus_api::RawResponse;

use super::field::{FieldTable, NormalizedRecord, normalize};

/// A normalized multi-record response.
///
/// Serializes as the summary fields at top level plus an `entries` array.
/// An empty result serializes as `{}`: no summary, no entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedList {
    /// Aggregate fields taken from the first entry.
    pub summary: NormalizedRecord,
    pub entries: Vec<NormalizedRecord>,
    /// Records dropped as malformed.
    pub skipped: usize,
}

impl NormalizedList {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for NormalizedList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.summary.iter() {
            map.serialize_entry(key, value)?;
        }
        if !self.entries.is_empty() {
            map.serialize_entry("entries", &self.entries)?;
        }
        if self.skipped > 0 {
            map.serialize_entry("skipped", &self.skipped)?;
        }
        map.end()
    }
}

/// Apply `table` to every record of `response`.
///
/// Malformed records are logged and skipped rather than failing the list.
/// A null or empty `resultList` yields an empty list.
pub fn normalize_list(response: &RawResponse, table: &FieldTable) -> NormalizedList {
    let mut entries = Vec::with_capacity(response.records().len());
    let mut skipped = 0;

    for record in response.records() {
        match normalize(record, table) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(error = %e, "Skipping malformed record");
                skipped += 1;
            }
        }
    }

    let summary = entries
        .first()
        .map(|first| summarize(first, table))
        .unwrap_or_default();

    NormalizedList {
        summary,
        entries,
        skipped,
    }
}

fn summarize(first: &NormalizedRecord, table: &FieldTable) -> NormalizedRecord {
    let mut summary = NormalizedRecord::default();
    for key in table.aggregates {
        if let Some((target, value)) = first.iter().find(|(k, _)| k == key) {
            summary.push(target, value.clone());
        }
    }
    summary
}
