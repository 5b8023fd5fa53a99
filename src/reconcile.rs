//! Correction policy and the buffered update set.
//!
//! Corrections are never written piecemeal: each service's verification step
//! appends to an in-memory update set keyed by (section, key), and the run
//! flushes everything through `ConfigStore::write_all` once, after the last
//! service. Re-applying a correction and re-diffing against the same
//! discovered set must always yield zero discrepancies.

use crate::join_list;
use crate::model::{DeclaredSet, Direction, Discrepancy};
use std::collections::BTreeMap;
use toml::Value;

/// Buffered (section, key) → value mutations for one run.
#[derive(Debug, Default)]
pub struct UpdateSet {
    entries: BTreeMap<(String, String), Value>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Buffers a corrected capability list.
    pub fn put_list(&mut self, section: &str, key: &str, value: String) {
        self.entries
            .insert((section.to_string(), key.to_string()), Value::String(value));
    }

    /// Buffers an availability flag flip.
    pub fn put_flag(&mut self, section: &str, key: &str, direction: Direction) {
        self.entries.insert(
            (section.to_string(), key.to_string()),
            Value::Boolean(matches!(direction, Direction::ShouldEnable)),
        );
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(String, String), &Value)> {
        self.entries.iter()
    }
}

/// Computes the corrected list value for one (service, kind) pair, or `None`
/// when the declared value should be left untouched.
///
/// A wildcard declaration stays untouched unless `replace_wildcard` asks for
/// the discovered set verbatim. An explicit declaration is corrected to
/// declared ∪ should-enable − should-disable whenever any discrepancy was
/// found, rendered sorted and comma-space-joined.
pub fn corrected_list(
    declared: &DeclaredSet,
    discovered: &std::collections::BTreeSet<String>,
    discrepancies: &[Discrepancy],
    replace_wildcard: bool,
) -> Option<String> {
    match declared {
        DeclaredSet::All => replace_wildcard.then(|| join_list(discovered.iter())),
        DeclaredSet::Explicit(current) => {
            if discrepancies.is_empty() {
                return None;
            }
            let mut corrected = current.clone();
            for discrepancy in discrepancies {
                match discrepancy.direction {
                    Direction::ShouldEnable => {
                        corrected.insert(discrepancy.capability.clone());
                    }
                    Direction::ShouldDisable => {
                        corrected.remove(&discrepancy.capability);
                    }
                }
            }
            Some(join_list(corrected.iter()))
        }
    }
}
