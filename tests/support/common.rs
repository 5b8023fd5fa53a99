#![allow(dead_code)]

// Shared fixtures: in-memory collaborators and payload builders for the
// verification-run tests.

use capsync::{
    CapabilityKind, CapabilityProbe, CatalogEntry, ServiceCatalog, ServiceId, VerifyError,
};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// Catalog collaborator backed by a fixed entry list.
pub struct FakeCatalog {
    pub entries: Vec<CatalogEntry>,
    pub fail: bool,
}

impl FakeCatalog {
    pub fn with_types(types: &[&str]) -> Self {
        Self {
            entries: catalog_entries(types),
            fail: false,
        }
    }

    pub fn down() -> Self {
        Self {
            entries: Vec::new(),
            fail: true,
        }
    }
}

impl ServiceCatalog for FakeCatalog {
    fn fetch(&self) -> Result<Vec<CatalogEntry>, VerifyError> {
        if self.fail {
            return Err(VerifyError::Catalog {
                reason: "fixture catalog is down".to_string(),
            });
        }
        Ok(self.entries.clone())
    }
}

/// Probe collaborator serving canned payloads and recording every call.
#[derive(Default)]
pub struct FakeProbe {
    pub extensions: BTreeMap<ServiceId, Value>,
    pub versions: BTreeMap<ServiceId, Value>,
    pub failing: BTreeSet<ServiceId>,
    pub calls: RefCell<Vec<(ServiceId, CapabilityKind)>>,
}

impl FakeProbe {
    pub fn ext(mut self, service: ServiceId, payload: Value) -> Self {
        self.extensions.insert(service, payload);
        self
    }

    pub fn ver(mut self, service: ServiceId, payload: Value) -> Self {
        self.versions.insert(service, payload);
        self
    }

    pub fn failing(mut self, service: ServiceId) -> Self {
        self.failing.insert(service);
        self
    }

    pub fn probed(&self, service: ServiceId, kind: CapabilityKind) -> bool {
        self.calls.borrow().contains(&(service, kind))
    }

    fn serve(
        &self,
        map: &BTreeMap<ServiceId, Value>,
        service: ServiceId,
        kind: CapabilityKind,
    ) -> Result<Value, VerifyError> {
        self.calls.borrow_mut().push((service, kind));
        if self.failing.contains(&service) {
            return Err(VerifyError::Probe {
                service,
                kind,
                reason: "fixture marked failing".to_string(),
            });
        }
        map.get(&service).cloned().ok_or_else(|| VerifyError::Probe {
            service,
            kind,
            reason: "no fixture payload".to_string(),
        })
    }
}

impl CapabilityProbe for FakeProbe {
    fn probe_extensions(&self, service: ServiceId) -> Result<Value, VerifyError> {
        self.serve(&self.extensions, service, CapabilityKind::Extension)
    }

    fn probe_api_versions(&self, service: ServiceId) -> Result<Value, VerifyError> {
        self.serve(&self.versions, service, CapabilityKind::ApiVersion)
    }
}

pub fn catalog_entries(types: &[&str]) -> Vec<CatalogEntry> {
    types
        .iter()
        .map(|t| CatalogEntry {
            endpoint_type: t.to_string(),
            url: format!("http://{t}.example/v1"),
        })
        .collect()
}

pub fn named_extensions(names: &[&str]) -> Value {
    json!({
        "extensions": names.iter().map(|name| json!({"name": name})).collect::<Vec<_>>(),
    })
}

pub fn alias_extensions(aliases: &[&str]) -> Value {
    json!({
        "extensions": aliases
            .iter()
            .map(|alias| json!({"name": format!("{alias} long name"), "alias": alias}))
            .collect::<Vec<_>>(),
    })
}

pub fn swift_info(apis: &[&str]) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("swift".to_string(), json!({"max_file_size": 5368709122u64}));
    for api in apis {
        map.insert(api.to_string(), json!({}));
    }
    Value::Object(map)
}

pub fn version_list(ids: &[&str]) -> Value {
    json!({
        "versions": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
    })
}

pub fn keystone_versions(ids: &[&str]) -> Value {
    json!({
        "versions": {
            "values": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
        }
    })
}
