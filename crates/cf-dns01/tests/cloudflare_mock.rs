//! End-to-end challenge lifecycle against a mocked Cloudflare API

use cf_common::SolverConfig;
use cf_dns01::{Dns01Error, DnsProvider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FQDN: &str = "_acme-challenge.test.sub.domain.com.";
const NAME: &str = "_acme-challenge.test.sub.domain.com";
const ZONE_ID: &str = "1a23cc4567b8def91a01c23a456e78cd";

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result
    }))
}

async fn mount_zones(server: &MockServer) {
    for name in [NAME, "test.sub.domain.com"] {
        Mock::given(method("GET"))
            .and(path("/zones"))
            .and(query_param("name", name))
            .respond_with(ok(json!([])))
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(query_param("name", "sub.domain.com"))
        .respond_with(ok(json!([{"id": ZONE_ID, "name": "sub.domain.com"}])))
        .mount(server)
        .await;
}

fn provider_for(server: &MockServer) -> DnsProvider {
    let config = SolverConfig {
        api_token: Some("test-token".to_string()),
        api_url: server.uri(),
        ..SolverConfig::default()
    };
    DnsProvider::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_present_then_cleanup() {
    let server = MockServer::start().await;
    mount_zones(&server).await;

    let records_path = format!("/zones/{ZONE_ID}/dns_records");

    Mock::given(method("GET"))
        .and(path(records_path.as_str()))
        .and(query_param("type", "TXT"))
        .and(query_param("name", NAME))
        .respond_with(ok(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(records_path.as_str()))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({"type": "TXT", "name": NAME, "content": "123d==", "ttl": 120})))
        .respond_with(ok(json!({"id": "rec-1", "name": NAME, "content": "123d=="})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    provider.present("test.sub.domain.com", FQDN, "123d==").await.unwrap();

    Mock::given(method("GET"))
        .and(path(records_path.as_str()))
        .and(query_param("name", NAME))
        .respond_with(ok(json!([
            {"id": "rec-1", "zone_id": ZONE_ID, "name": NAME, "content": "123d==", "ttl": 120}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{records_path}/rec-1").as_str()))
        .respond_with(ok(json!({"id": "rec-1"})))
        .expect(1)
        .mount(&server)
        .await;

    provider.cleanup("test.sub.domain.com", FQDN, "123d==").await.unwrap();
}

#[tokio::test]
async fn test_invalid_token_surfaces_provider_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "errors": [{"code": 9109, "message": "Invalid access token"}],
            "messages": [],
            "result": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = provider
        .present("test.sub.domain.com", FQDN, "123d==")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Invalid access token"));
    assert!(matches!(err.root(), Dns01Error::ZoneLookup { .. }));
}
