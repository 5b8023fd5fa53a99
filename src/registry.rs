//! Static service registry.
//!
//! One record per supported service: the config section its feature toggles
//! live in, the endpoint type the live catalog advertises it under, and the
//! shape of its probe payloads. The supported set is fixed and small, so it
//! is enumerated once here and every consumer dispatches over the closed
//! enum instead of inspecting config attributes at runtime.

use anyhow::bail;
use std::fmt;

/// Section holding the per-service availability booleans.
pub const AVAILABILITY_SECTION: &str = "service_available";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceId {
    Nova,
    NovaV3,
    Cinder,
    Neutron,
    Swift,
    Glance,
    Keystone,
    Heat,
    Ceilometer,
    Sahara,
    Ironic,
    Marconi,
    Trove,
}

impl ServiceId {
    /// Codename used in report lines and as the `[service_available]` key.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::Nova => "nova",
            ServiceId::NovaV3 => "nova_v3",
            ServiceId::Cinder => "cinder",
            ServiceId::Neutron => "neutron",
            ServiceId::Swift => "swift",
            ServiceId::Glance => "glance",
            ServiceId::Keystone => "keystone",
            ServiceId::Heat => "heat",
            ServiceId::Ceilometer => "ceilometer",
            ServiceId::Sahara => "sahara",
            ServiceId::Ironic => "ironic",
            ServiceId::Marconi => "marconi",
            ServiceId::Trove => "trove",
        }
    }

    /// Registry record for this service.
    pub fn spec(&self) -> &'static ServiceSpec {
        SERVICES
            .iter()
            .find(|spec| spec.id == *self)
            .unwrap_or_else(|| unreachable!("every ServiceId has a registry record"))
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match SERVICES.iter().find(|spec| spec.id.as_str() == value) {
            Some(spec) => Ok(spec.id),
            None => bail!("Unknown service: {value}"),
        }
    }
}

/// How a service's extension probe payload is shaped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionShape {
    /// `{"extensions": [{"name": ...}, ...]}` or a bare array of the same
    /// entry objects; the identifying field is `name`.
    NamedList,
    /// Same layout keyed by `alias`; the canonical names contain whitespace
    /// and cannot round-trip through a comma-separated config list.
    AliasList,
    /// Object whose keys ARE the extension identifiers, with one well-known
    /// metadata key to drop before use.
    KeyedObject { strip: &'static str },
}

/// How a service's version probe payload is shaped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionShape {
    /// `{"versions": [{"id": ...}, ...]}`.
    IdList,
    /// `{"versions": {"values": [{"id": ...}, ...]}}`.
    NestedValues,
}

/// Extension verification wiring for one service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtensionOption {
    /// Config key holding the enabled-extension list.
    pub option: &'static str,
    pub shape: ExtensionShape,
}

/// Version verification wiring for one service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionOption {
    /// Config key holding the enabled-version list.
    pub option: &'static str,
    pub shape: VersionShape,
}

/// One registry record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceSpec {
    pub id: ServiceId,
    /// Endpoint type the live catalog advertises this service under.
    /// `None` for nova_v3, which shares nova's endpoint and has no catalog
    /// presence of its own.
    pub catalog_type: Option<&'static str>,
    /// Config section holding this service's feature toggles.
    pub section: &'static str,
    pub extensions: Option<ExtensionOption>,
    pub versions: Option<VersionOption>,
}

/// The full registry, in iteration (and therefore report) order.
pub const SERVICES: &[ServiceSpec] = &[
    ServiceSpec {
        id: ServiceId::Nova,
        catalog_type: Some("compute"),
        section: "compute-feature-enabled",
        extensions: Some(ExtensionOption {
            option: "api_extensions",
            shape: ExtensionShape::NamedList,
        }),
        versions: Some(VersionOption {
            option: "api_versions",
            shape: VersionShape::IdList,
        }),
    },
    ServiceSpec {
        id: ServiceId::NovaV3,
        catalog_type: None,
        section: "compute-feature-enabled",
        extensions: Some(ExtensionOption {
            option: "api_v3_extensions",
            shape: ExtensionShape::NamedList,
        }),
        versions: None,
    },
    ServiceSpec {
        id: ServiceId::Cinder,
        catalog_type: Some("volume"),
        section: "volume-feature-enabled",
        extensions: Some(ExtensionOption {
            option: "api_extensions",
            shape: ExtensionShape::NamedList,
        }),
        versions: Some(VersionOption {
            option: "api_versions",
            shape: VersionShape::IdList,
        }),
    },
    ServiceSpec {
        id: ServiceId::Neutron,
        catalog_type: Some("network"),
        section: "network-feature-enabled",
        extensions: Some(ExtensionOption {
            option: "api_extensions",
            shape: ExtensionShape::AliasList,
        }),
        versions: None,
    },
    ServiceSpec {
        id: ServiceId::Swift,
        catalog_type: Some("object-store"),
        section: "object-storage-feature-enabled",
        extensions: Some(ExtensionOption {
            option: "discoverable_apis",
            shape: ExtensionShape::KeyedObject { strip: "swift" },
        }),
        versions: None,
    },
    ServiceSpec {
        id: ServiceId::Glance,
        catalog_type: Some("image"),
        section: "image-feature-enabled",
        extensions: None,
        versions: Some(VersionOption {
            option: "api_versions",
            shape: VersionShape::IdList,
        }),
    },
    ServiceSpec {
        id: ServiceId::Keystone,
        catalog_type: Some("identity"),
        section: "identity-feature-enabled",
        extensions: None,
        versions: Some(VersionOption {
            option: "api_versions",
            shape: VersionShape::NestedValues,
        }),
    },
    ServiceSpec {
        id: ServiceId::Heat,
        catalog_type: Some("orchestration"),
        section: "orchestration",
        extensions: None,
        versions: None,
    },
    ServiceSpec {
        id: ServiceId::Ceilometer,
        catalog_type: Some("metering"),
        section: "telemetry",
        extensions: None,
        versions: None,
    },
    ServiceSpec {
        id: ServiceId::Sahara,
        catalog_type: Some("data_processing"),
        section: "data_processing",
        extensions: None,
        versions: None,
    },
    ServiceSpec {
        id: ServiceId::Ironic,
        catalog_type: Some("baremetal"),
        section: "baremetal",
        extensions: None,
        versions: None,
    },
    ServiceSpec {
        id: ServiceId::Marconi,
        catalog_type: Some("queuing"),
        section: "queuing",
        extensions: None,
        versions: None,
    },
    ServiceSpec {
        id: ServiceId::Trove,
        catalog_type: Some("database"),
        section: "database",
        extensions: None,
        versions: None,
    },
];
