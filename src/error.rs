//! Error taxonomy for a verification run.
//!
//! Only two failures abort a whole run: the catalog fetch and output-target
//! setup, because every downstream decision depends on them. Everything else
//! is scoped to a single service so one unreachable or mis-probed service
//! never blocks verification of the rest.

use crate::model::CapabilityKind;
use crate::registry::ServiceId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// The live service catalog could not be fetched.
    #[error("catalog fetch failed: {reason}")]
    Catalog { reason: String },

    /// A probe request failed for one service.
    #[error("probing {service} {kind}s failed: {reason}")]
    Probe {
        service: ServiceId,
        kind: CapabilityKind,
        reason: String,
    },

    /// A probe answered with a payload of an unexpected shape.
    #[error("malformed {kind} payload from {service}: {reason}")]
    Discovery {
        service: ServiceId,
        kind: CapabilityKind,
        reason: String,
    },

    /// The declared-config source or the rewrite target could not be used.
    #[error("configuration persistence failed: {reason}")]
    Persistence { reason: String },

    /// A service has no registered probe client or declared-option mapping
    /// for the requested kind.
    #[error("no registered {kind} verification for {service}")]
    UnsupportedService {
        service: ServiceId,
        kind: CapabilityKind,
    },
}

impl VerifyError {
    /// Whether this error must abort the whole run rather than skip one
    /// service's verification step.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            VerifyError::Catalog { .. } | VerifyError::Persistence { .. }
        )
    }
}
