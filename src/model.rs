//! Shared capability model.
//!
//! Everything a run passes between components lives here: the capability
//! kinds, declared and discovered sets, discrepancies, and catalog entries.
//! Discovered sets are `BTreeSet<String>` throughout so iteration is
//! lexicographic without explicit sorting.

use crate::registry::ServiceId;
use crate::split_list;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

/// Wildcard token accepted as the first element of a declared list.
pub const WILDCARD: &str = "all";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapabilityKind {
    ApiVersion,
    Extension,
    Availability,
}

impl CapabilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::ApiVersion => "api version",
            CapabilityKind::Extension => "extension",
            CapabilityKind::Availability => "availability",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which way the declared configuration should move to match reality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    ShouldEnable,
    ShouldDisable,
}

/// One mismatch between declared and discovered state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discrepancy {
    pub service: ServiceId,
    pub kind: CapabilityKind,
    pub capability: String,
    pub direction: Direction,
}

/// Declared expectation for one (service, kind) pair as read from config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclaredSet {
    /// The wildcard: every capability the service reports is expected and
    /// no enumeration is possible.
    All,
    Explicit(BTreeSet<String>),
}

impl DeclaredSet {
    /// Parses a raw config value. An absent key reads as the empty explicit
    /// set; a list whose first token is `all` reads as the wildcard.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return DeclaredSet::Explicit(BTreeSet::new());
        };
        let tokens = split_list(raw);
        if tokens.first().map(String::as_str) == Some(WILDCARD) {
            return DeclaredSet::All;
        }
        DeclaredSet::Explicit(tokens.into_iter().collect())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, DeclaredSet::All)
    }
}

/// One entry of the live service catalog, immutable once fetched.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Published endpoint type, e.g. `compute` or `object-store`.
    #[serde(rename = "type")]
    pub endpoint_type: String,
    /// Base URL advertised for the service.
    pub url: String,
}
