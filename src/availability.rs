//! Catalog cross-reference for service availability.
//!
//! Runs before any capability probing: the live catalog decides which
//! services are reachable at all, and declared `[service_available]` flags
//! are checked against it. Keystone is exempt — it is mandatory
//! infrastructure and not subject to availability toggling.

use crate::config::ConfigStore;
use crate::model::{CapabilityKind, CatalogEntry, Direction, Discrepancy};
use crate::registry::{AVAILABILITY_SECTION, SERVICES, ServiceId};
use std::collections::BTreeSet;

/// Result of the availability pass.
#[derive(Debug, Default)]
pub struct AvailabilityOutcome {
    /// Services whose endpoint is present, in catalog order.
    pub reachable: Vec<ServiceId>,
    /// Present services whose declared flag already agreed with the catalog.
    /// Only these proceed to extension/version verification in this run; a
    /// service corrected just now waits for a re-run.
    pub available: Vec<ServiceId>,
    pub discrepancies: Vec<Discrepancy>,
}

impl AvailabilityOutcome {
    /// Whether a service's extension/version verification may proceed.
    pub fn cleared(&self, service: ServiceId) -> bool {
        match service {
            // Mandatory infrastructure, always probed.
            ServiceId::Keystone => true,
            // nova_v3 shares nova's endpoint and rides on its clearance.
            ServiceId::NovaV3 => self.available.contains(&ServiceId::Nova),
            other => self.available.contains(&other),
        }
    }
}

/// Cross-references the fetched catalog against declared availability flags.
pub fn resolve_availability(catalog: &[CatalogEntry], store: &ConfigStore) -> AvailabilityOutcome {
    let published: BTreeSet<&str> = catalog
        .iter()
        .map(|entry| entry.endpoint_type.as_str())
        .collect();

    let mut outcome = AvailabilityOutcome::default();
    for entry in catalog {
        let known = SERVICES
            .iter()
            .find(|spec| spec.catalog_type == Some(entry.endpoint_type.as_str()));
        if let Some(spec) = known {
            if spec.id != ServiceId::Keystone && !outcome.reachable.contains(&spec.id) {
                outcome.reachable.push(spec.id);
            }
        }
    }

    for spec in SERVICES {
        if spec.id == ServiceId::Keystone {
            continue;
        }
        let Some(catalog_type) = spec.catalog_type else {
            continue;
        };
        let declared = store.declared_flag(AVAILABILITY_SECTION, spec.id.as_str());
        if published.contains(catalog_type) {
            if declared {
                outcome.available.push(spec.id);
            } else {
                outcome.discrepancies.push(Discrepancy {
                    service: spec.id,
                    kind: CapabilityKind::Availability,
                    capability: spec.id.as_str().to_string(),
                    direction: Direction::ShouldEnable,
                });
            }
        } else if declared {
            outcome.discrepancies.push(Discrepancy {
                service: spec.id,
                kind: CapabilityKind::Availability,
                capability: spec.id.as_str().to_string(),
                direction: Direction::ShouldDisable,
            });
        }
    }
    outcome
}
