//! Duplicate person entries.
//!
//! The identity key is the name field up to its first comma, trimmed and
//! compared exactly. It is deliberately not passed through
//! [`casereg_core::normalize`]: `Петренко` and `ПЕТРЕНКО` are different keys
//! here even though name matching treats them as the same person.

use indexmap::IndexMap;
use std::collections::BTreeSet;
use tracing::{debug, info};

use casereg_core::{Record, RecordId, Registry};

pub struct DuplicateDetector;

impl DuplicateDetector {
    /// Identity key of a record, or `None` when the name part is blank.
    #[must_use]
    pub fn identity_key(record: &Record, name_field: &str) -> Option<String> {
        let name = record.value(name_field);
        if name.is_missing() {
            return None;
        }
        let rendered = name.render();
        let key = rendered.split(',').next().unwrap_or_default().trim();
        (!key.is_empty()).then(|| key.to_string())
    }

    /// Non-deleted records grouped by identity key, in first-seen order.
    /// Only groups with two or more members are returned.
    #[must_use]
    pub fn groups(registry: &Registry, name_field: &str) -> Vec<(String, Vec<RecordId>)> {
        if !registry.schema().contains(name_field) {
            debug!("Duplicate check skipped: no field '{name_field}'");
            return Vec::new();
        }
        let mut by_key: IndexMap<String, Vec<RecordId>> = IndexMap::new();
        for record in registry.iter().filter(|r| !r.is_deleted()) {
            if let Some(key) = Self::identity_key(record, name_field) {
                by_key.entry(key).or_default().push(record.id());
            }
        }
        by_key
            .into_iter()
            .filter(|(_, ids)| ids.len() >= 2)
            .collect()
    }

    /// Every record that shares its identity key with another live record.
    #[must_use]
    pub fn recompute(registry: &Registry, name_field: &str) -> BTreeSet<RecordId> {
        let groups = Self::groups(registry, name_field);
        let flagged: BTreeSet<RecordId> = groups.iter().flat_map(|(_, ids)| ids.iter().copied()).collect();
        info!(
            "Duplicates: {} records in {} groups",
            flagged.len(),
            groups.len()
        );
        flagged
    }
}
