//! Collaborator seams and the blocking HTTP prober.
//!
//! The run driver programs against `ServiceCatalog` and `CapabilityProbe`;
//! tests substitute in-memory fakes. `HttpProber` is the production
//! implementation: it fetches the endpoint catalog once at construction and
//! answers probes with plain GET requests against the advertised base URLs.
//! Version documents live at the unversioned endpoint (scheme://host:port),
//! so the base URL's path is stripped for those probes.

use crate::error::VerifyError;
use crate::model::{CapabilityKind, CatalogEntry};
use crate::registry::ServiceId;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("capsync/", env!("CARGO_PKG_VERSION"));

/// Source of the live endpoint catalog. May fail; a failed fetch aborts the
/// whole run.
pub trait ServiceCatalog {
    fn fetch(&self) -> Result<Vec<CatalogEntry>, VerifyError>;
}

/// Raw capability probes for one service. Payload shape is service-specific;
/// normalization happens downstream.
pub trait CapabilityProbe {
    fn probe_extensions(&self, service: ServiceId) -> Result<Value, VerifyError>;
    fn probe_api_versions(&self, service: ServiceId) -> Result<Value, VerifyError>;
}

#[derive(Deserialize)]
struct CatalogDocument {
    endpoints: Vec<CatalogEntry>,
}

#[derive(Debug)]
pub struct HttpProber {
    client: Client,
    entries: Vec<CatalogEntry>,
    by_type: BTreeMap<String, Url>,
}

impl HttpProber {
    /// Fetches the endpoint catalog from `catalog_url` and keeps the snapshot
    /// for the lifetime of the run. Construction is the catalog fetch; any
    /// failure here is fatal for the run.
    pub fn connect(catalog_url: &str) -> Result<Self, VerifyError> {
        let catalog_url = Url::parse(catalog_url).map_err(|err| VerifyError::Catalog {
            reason: format!("invalid catalog url '{catalog_url}': {err}"),
        })?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| VerifyError::Catalog {
                reason: format!("building http client: {err}"),
            })?;

        let document: CatalogDocument = client
            .get(catalog_url.clone())
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| VerifyError::Catalog {
                reason: format!("requesting {catalog_url}: {err}"),
            })?
            .json()
            .map_err(|err| VerifyError::Catalog {
                reason: format!("decoding catalog from {catalog_url}: {err}"),
            })?;

        let mut by_type = BTreeMap::new();
        for entry in &document.endpoints {
            let url = Url::parse(&entry.url).map_err(|err| VerifyError::Catalog {
                reason: format!(
                    "catalog advertises invalid url '{}' for '{}': {err}",
                    entry.url, entry.endpoint_type
                ),
            })?;
            // First entry for a type wins; catalogs may list one per region.
            by_type.entry(entry.endpoint_type.clone()).or_insert(url);
        }

        Ok(Self {
            client,
            entries: document.endpoints,
            by_type,
        })
    }

    fn endpoint(&self, service: ServiceId, kind: CapabilityKind) -> Result<&Url, VerifyError> {
        // nova_v3 has no catalog presence of its own; probe nova's endpoint.
        let effective = match service {
            ServiceId::NovaV3 => ServiceId::Nova,
            other => other,
        };
        let Some(catalog_type) = effective.spec().catalog_type else {
            return Err(VerifyError::UnsupportedService { service, kind });
        };
        self.by_type
            .get(catalog_type)
            .ok_or_else(|| VerifyError::Probe {
                service,
                kind,
                reason: format!("no '{catalog_type}' endpoint in the catalog"),
            })
    }

    fn get_json(
        &self,
        url: Url,
        service: ServiceId,
        kind: CapabilityKind,
    ) -> Result<Value, VerifyError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| VerifyError::Probe {
                service,
                kind,
                reason: format!("requesting {url}: {err}"),
            })?;
        response.json().map_err(|err| VerifyError::Discovery {
            service,
            kind,
            reason: format!("response from {url} was not JSON: {err}"),
        })
    }
}

impl ServiceCatalog for HttpProber {
    fn fetch(&self) -> Result<Vec<CatalogEntry>, VerifyError> {
        Ok(self.entries.clone())
    }
}

impl CapabilityProbe for HttpProber {
    fn probe_extensions(&self, service: ServiceId) -> Result<Value, VerifyError> {
        let kind = CapabilityKind::Extension;
        let base = self.endpoint(service, kind)?;
        // Swift publishes its discoverable capabilities at the unversioned
        // /info document; everything else lists extensions under the base.
        let url = match service {
            ServiceId::Swift => push_segment(&unversioned(base), "info", service, kind)?,
            _ => push_segment(base, "extensions", service, kind)?,
        };
        self.get_json(url, service, kind)
    }

    fn probe_api_versions(&self, service: ServiceId) -> Result<Value, VerifyError> {
        let kind = CapabilityKind::ApiVersion;
        let base = self.endpoint(service, kind)?;
        self.get_json(unversioned(base), service, kind)
    }
}

/// Strips path, query, and fragment: version documents are served at the
/// endpoint root.
fn unversioned(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_path("");
    stripped.set_query(None);
    stripped.set_fragment(None);
    stripped
}

fn push_segment(
    base: &Url,
    segment: &str,
    service: ServiceId,
    kind: CapabilityKind,
) -> Result<Url, VerifyError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| VerifyError::Probe {
            service,
            kind,
            reason: format!("endpoint '{base}' cannot take a path"),
        })?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}
