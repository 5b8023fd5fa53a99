//! Capability drift checker for service deployments.
//!
//! capsync probes a live deployment for what each service actually exposes
//! (API versions, optional extensions, the service's mere presence), diffs
//! the findings against the declared harness configuration, and reports —
//! or, on request, rewrites — the configuration so it matches reality.
//! Report lines are the product: discrepancies are findings, not failures,
//! and the process exits zero when only discrepancies were found.

pub mod availability;
pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod normalize;
pub mod probe;
pub mod reconcile;
pub mod registry;
pub mod run;

pub use availability::{AvailabilityOutcome, resolve_availability};
pub use config::{ConfigStore, OutputTarget};
pub use diff::diff_sets;
pub use error::VerifyError;
pub use model::{CapabilityKind, CatalogEntry, DeclaredSet, Direction, Discrepancy, WILDCARD};
pub use normalize::{normalize_extensions, normalize_versions};
pub use probe::{CapabilityProbe, HttpProber, ServiceCatalog};
pub use reconcile::{UpdateSet, corrected_list};
pub use registry::{
    AVAILABILITY_SECTION, ExtensionShape, SERVICES, ServiceId, ServiceSpec, VersionShape,
};
pub use run::{RunContext, RunFlags, RunReport, SkippedStep, report_line, run_verification};

/// Splits a comma-separated config value into trimmed, non-empty tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Joins capability tokens into the on-disk form: sorted, comma-space
/// separated. Input iteration order does not matter.
pub fn join_list<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens: Vec<String> = tokens
        .into_iter()
        .map(|t| t.as_ref().to_string())
        .collect();
    tokens.sort();
    tokens.join(", ")
}
