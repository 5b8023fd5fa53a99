//! Declared-versus-discovered set comparison.
//!
//! Symmetric-difference semantics with directional labels: a capability that
//! is declared but not discovered should be disabled, one that is discovered
//! but not declared should be enabled. A wildcard declaration produces no
//! discrepancies here; the reconciliation path decides what to do with the
//! discovered set in that case.

use crate::model::{CapabilityKind, DeclaredSet, Direction, Discrepancy};
use crate::registry::ServiceId;
use std::collections::BTreeSet;

/// Diffs one (service, kind) pair. Output is sorted lexicographically by
/// capability id so reports and tests are reproducible.
pub fn diff_sets(
    service: ServiceId,
    kind: CapabilityKind,
    declared: &DeclaredSet,
    discovered: &BTreeSet<String>,
) -> Vec<Discrepancy> {
    let DeclaredSet::Explicit(declared) = declared else {
        return Vec::new();
    };

    let mut out: Vec<Discrepancy> = declared
        .difference(discovered)
        .map(|capability| Discrepancy {
            service,
            kind,
            capability: capability.clone(),
            direction: Direction::ShouldDisable,
        })
        .chain(discovered.difference(declared).map(|capability| Discrepancy {
            service,
            kind,
            capability: capability.clone(),
            direction: Direction::ShouldEnable,
        }))
        .collect();
    out.sort_by(|a, b| a.capability.cmp(&b.capability));
    out
}
