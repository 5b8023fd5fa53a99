//! Probe payload normalization.
//!
//! Probe sources answer in service-specific shapes: most list extensions as
//! `{"name": ...}` entries, neutron identifies them by `alias`, swift returns
//! an object keyed by extension id with one metadata key mixed in, and
//! keystone nests its version list one level deeper than everyone else. This
//! module collapses all of that into plain `BTreeSet<String>` values so the
//! diff engine never sees a service-specific shape. Dispatch is driven by the
//! registry's shape tags, one case per service, exhaustiveness-checked.

use crate::error::VerifyError;
use crate::model::CapabilityKind;
use crate::registry::{ExtensionShape, ServiceId, VersionShape};
use serde_json::Value;
use std::collections::BTreeSet;

/// Normalizes a raw extension probe payload for `service`.
///
/// Duplicates collapse; case and whitespace are preserved as received.
pub fn normalize_extensions(
    service: ServiceId,
    payload: &Value,
) -> Result<BTreeSet<String>, VerifyError> {
    let Some(extensions) = service.spec().extensions else {
        return Err(VerifyError::UnsupportedService {
            service,
            kind: CapabilityKind::Extension,
        });
    };

    match extensions.shape {
        ExtensionShape::NamedList => collect_entry_field(service, payload, "name"),
        ExtensionShape::AliasList => collect_entry_field(service, payload, "alias"),
        ExtensionShape::KeyedObject { strip } => {
            let map = payload.as_object().ok_or_else(|| {
                malformed(service, "expected an object keyed by extension id")
            })?;
            Ok(map.keys().filter(|key| *key != strip).cloned().collect())
        }
    }
}

/// Normalizes a raw API-version probe payload for `service`.
pub fn normalize_versions(
    service: ServiceId,
    payload: &Value,
) -> Result<BTreeSet<String>, VerifyError> {
    let Some(versions) = service.spec().versions else {
        return Err(VerifyError::UnsupportedService {
            service,
            kind: CapabilityKind::ApiVersion,
        });
    };

    let entries = match versions.shape {
        VersionShape::IdList => payload.get("versions").and_then(Value::as_array),
        VersionShape::NestedValues => payload
            .get("versions")
            .and_then(|nested| nested.get("values"))
            .and_then(Value::as_array),
    }
    .ok_or_else(|| {
        version_malformed(service, "missing the expected 'versions' list")
    })?;

    entries
        .iter()
        .map(|entry| {
            entry
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| version_malformed(service, "version entry missing string 'id'"))
        })
        .collect()
}

/// Extracts `field` from each entry, accepting both the wrapped
/// `{"extensions": [...]}` object and a bare array of entries.
fn collect_entry_field(
    service: ServiceId,
    payload: &Value,
    field: &str,
) -> Result<BTreeSet<String>, VerifyError> {
    let entries = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map
            .get("extensions")
            .and_then(Value::as_array)
            .ok_or_else(|| malformed(service, "missing the expected 'extensions' list"))?
            .as_slice(),
        _ => return Err(malformed(service, "expected an object or a list")),
    };

    entries
        .iter()
        .map(|entry| {
            entry
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    malformed(service, &format!("extension entry missing string '{field}'"))
                })
        })
        .collect()
}

fn malformed(service: ServiceId, reason: &str) -> VerifyError {
    VerifyError::Discovery {
        service,
        kind: CapabilityKind::Extension,
        reason: reason.to_string(),
    }
}

fn version_malformed(service: ServiceId, reason: &str) -> VerifyError {
    VerifyError::Discovery {
        service,
        kind: CapabilityKind::ApiVersion,
        reason: reason.to_string(),
    }
}
