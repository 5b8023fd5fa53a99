// Wire-level tests for the blocking HTTP prober against a local server:
// catalog decoding, endpoint derivation, and error mapping.

use capsync::{CapabilityProbe, HttpProber, ServiceCatalog, ServiceId, VerifyError};
use serde_json::json;
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Response, Server};

/// Serves exactly `requests` requests from canned (path, status, body)
/// routes, then returns every URL it saw. Unrouted paths answer 404.
fn spawn_server(
    server: Server,
    routes: Vec<(String, u16, String)>,
    requests: usize,
) -> JoinHandle<Vec<String>> {
    thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..requests {
            let Ok(request) = server.recv() else { break };
            seen.push(request.url().to_string());
            let route = routes
                .iter()
                .find(|(path, _, _)| path == request.url())
                .cloned();
            let (status, body) = match route {
                Some((_, status, body)) => (status, body),
                None => (404, "not found".to_string()),
            };
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(
                    Header::from_bytes("Content-Type", "application/json")
                        .expect("static header"),
                );
            let _ = request.respond(response);
        }
        seen
    })
}

fn local_server() -> (Server, String) {
    let server = Server::http("127.0.0.1:0").expect("bind local http server");
    let base = format!("http://{}", server.server_addr());
    (server, base)
}

#[test]
fn connect_fetches_and_caches_the_catalog() {
    let (server, base) = local_server();
    let catalog_body = json!({
        "endpoints": [
            {"type": "compute", "url": format!("{base}/v2.1/tenant")},
            {"type": "volume", "url": format!("{base}/v1/tenant")},
        ]
    })
    .to_string();
    let handle = spawn_server(server, vec![("/catalog".to_string(), 200, catalog_body)], 1);

    let prober = HttpProber::connect(&format!("{base}/catalog")).expect("connect");
    let entries = prober.fetch().expect("cached catalog");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].endpoint_type, "compute");

    // A second fetch answers from the snapshot, no extra request.
    prober.fetch().expect("cached catalog again");
    assert_eq!(handle.join().expect("server thread"), vec!["/catalog"]);
}

#[test]
fn version_probe_hits_the_unversioned_root() {
    let (server, base) = local_server();
    let catalog_body = json!({
        "endpoints": [{"type": "compute", "url": format!("{base}/v2.1/tenant?noise=1")}]
    })
    .to_string();
    let versions_body = json!({"versions": [{"id": "v2.0"}, {"id": "v3.0"}]}).to_string();
    let handle = spawn_server(
        server,
        vec![
            ("/catalog".to_string(), 200, catalog_body),
            ("/".to_string(), 200, versions_body),
        ],
        2,
    );

    let prober = HttpProber::connect(&format!("{base}/catalog")).expect("connect");
    let payload = prober
        .probe_api_versions(ServiceId::Nova)
        .expect("version probe");
    assert_eq!(payload["versions"][1]["id"], "v3.0");
    assert_eq!(
        handle.join().expect("server thread"),
        vec!["/catalog", "/"],
        "version documents come from the endpoint root, path stripped"
    );
}

#[test]
fn extension_probe_appends_to_the_base_url() {
    let (server, base) = local_server();
    let catalog_body = json!({
        "endpoints": [{"type": "network", "url": format!("{base}/v2.0")}]
    })
    .to_string();
    let extensions_body =
        json!({"extensions": [{"name": "Port Binding", "alias": "binding"}]}).to_string();
    let handle = spawn_server(
        server,
        vec![
            ("/catalog".to_string(), 200, catalog_body),
            ("/v2.0/extensions".to_string(), 200, extensions_body),
        ],
        2,
    );

    let prober = HttpProber::connect(&format!("{base}/catalog")).expect("connect");
    let payload = prober
        .probe_extensions(ServiceId::Neutron)
        .expect("extension probe");
    assert_eq!(payload["extensions"][0]["alias"], "binding");
    assert_eq!(
        handle.join().expect("server thread"),
        vec!["/catalog", "/v2.0/extensions"]
    );
}

#[test]
fn swift_probe_reads_the_info_document() {
    let (server, base) = local_server();
    let catalog_body = json!({
        "endpoints": [{"type": "object-store", "url": format!("{base}/v1/AUTH_test")}]
    })
    .to_string();
    let info_body = json!({"swift": {}, "tempurl": {}}).to_string();
    let handle = spawn_server(
        server,
        vec![
            ("/catalog".to_string(), 200, catalog_body),
            ("/info".to_string(), 200, info_body),
        ],
        2,
    );

    let prober = HttpProber::connect(&format!("{base}/catalog")).expect("connect");
    prober.probe_extensions(ServiceId::Swift).expect("info probe");
    assert_eq!(
        handle.join().expect("server thread"),
        vec!["/catalog", "/info"]
    );
}

#[test]
fn http_failure_maps_to_a_probe_error() {
    let (server, base) = local_server();
    let catalog_body = json!({
        "endpoints": [{"type": "compute", "url": format!("{base}/v2.1")}]
    })
    .to_string();
    let handle = spawn_server(
        server,
        vec![
            ("/catalog".to_string(), 200, catalog_body),
            ("/v2.1/extensions".to_string(), 500, "{}".to_string()),
        ],
        2,
    );

    let prober = HttpProber::connect(&format!("{base}/catalog")).expect("connect");
    let err = prober
        .probe_extensions(ServiceId::Nova)
        .expect_err("500 answer");
    assert!(matches!(
        err,
        VerifyError::Probe {
            service: ServiceId::Nova,
            ..
        }
    ));
    assert!(!err.is_fatal());
    handle.join().expect("server thread");
}

#[test]
fn non_json_payload_maps_to_a_discovery_error() {
    let (server, base) = local_server();
    let catalog_body = json!({
        "endpoints": [{"type": "compute", "url": format!("{base}/v2.1")}]
    })
    .to_string();
    let handle = spawn_server(
        server,
        vec![
            ("/catalog".to_string(), 200, catalog_body),
            ("/v2.1/extensions".to_string(), 200, "not json".to_string()),
        ],
        2,
    );

    let prober = HttpProber::connect(&format!("{base}/catalog")).expect("connect");
    let err = prober
        .probe_extensions(ServiceId::Nova)
        .expect_err("non-JSON answer");
    assert!(matches!(err, VerifyError::Discovery { .. }));
    handle.join().expect("server thread");
}

#[test]
fn missing_endpoint_is_a_probe_error_without_a_request() {
    let (server, base) = local_server();
    let catalog_body = json!({"endpoints": [{"type": "compute", "url": format!("{base}/v2")}]})
        .to_string();
    let handle = spawn_server(server, vec![("/catalog".to_string(), 200, catalog_body)], 1);

    let prober = HttpProber::connect(&format!("{base}/catalog")).expect("connect");
    let err = prober
        .probe_extensions(ServiceId::Neutron)
        .expect_err("no network endpoint");
    assert!(matches!(
        err,
        VerifyError::Probe {
            service: ServiceId::Neutron,
            ..
        }
    ));
    assert_eq!(handle.join().expect("server thread"), vec!["/catalog"]);
}

#[test]
fn undecodable_catalog_is_fatal() {
    let (server, base) = local_server();
    let handle = spawn_server(
        server,
        vec![("/catalog".to_string(), 200, "surprise".to_string())],
        1,
    );

    let err = HttpProber::connect(&format!("{base}/catalog")).expect_err("bad catalog");
    assert!(matches!(err, VerifyError::Catalog { .. }));
    assert!(err.is_fatal());
    handle.join().expect("server thread");
}
