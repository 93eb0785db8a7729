//! API integration tests against a real bound server and a mocked openFDA.
//!
//! Each test spawns the full router on an ephemeral port and points the
//! openFDA client at an httpmock server, so request handling, caching,
//! retries, and error mapping are exercised end to end.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use apothecary::config::AppConfig;
use apothecary::http::{bind, serve};
use apothecary::openfda::OpenFdaService;
use apothecary::routes::create_router;
use apothecary::state::{AppState, Readiness};
use axum_server::Handle;

/// Config pointing the upstream at a mock server, with fast timeouts.
fn test_config(upstream_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.openfda.base_url = upstream_url.to_string();
    config.openfda.timeout_seconds = 5;
    config.openfda.max_retries = 3;
    config.http.request_timeout_seconds = 10;
    config
}

/// Spawn the app on an ephemeral port; returns its base URL and the handle.
async fn spawn_app(config: AppConfig) -> (String, Handle) {
    let readiness = Readiness::default();
    let openfda = OpenFdaService::new(&config).expect("service builds");
    let state = AppState::new(config, openfda, readiness.clone());
    let app = create_router(state);

    let listener = bind("127.0.0.1:0".parse().unwrap()).expect("ephemeral port binds");
    let addr = listener.local_addr().unwrap();
    let handle = Handle::new();
    tokio::spawn(serve(app, listener, handle.clone(), readiness));

    (format!("http://{}", addr), handle)
}

fn label_fixture() -> serde_json::Value {
    json!({
        "results": [
            {
                "openfda": {
                    "brand_name": ["ADVIL"],
                    "generic_name": ["IBUPROFEN"],
                    "manufacturer_name": ["Pfizer"],
                    "substance_name": ["IBUPROFEN"],
                    "product_ndc": ["0573-0164"]
                },
                "indications_and_usage": ["For temporary relief of minor aches."],
                "dosage_and_administration": ["Take 1 tablet every 4 to 6 hours."],
                "effective_time": "20230115"
            },
            {
                "openfda": {
                    "brand_name": ["MOTRIN"],
                    "generic_name": ["IBUPROFEN"],
                    "manufacturer_name": ["Johnson & Johnson"]
                },
                "dosage_and_administration": ["Do not exceed 6 tablets in 24 hours."]
            }
        ]
    })
}

#[tokio::test]
async fn health_is_ready_and_uncached() {
    let upstream = MockServer::start();
    let (base, _handle) = spawn_app(test_config(&upstream.url("/label.json"))).await;

    for _ in 0..3 {
        let response = reqwest::get(format!("{}/health", base)).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get("cache-control").unwrap(),
            "no-store"
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    }
}

#[tokio::test]
async fn index_describes_the_service() {
    let upstream = MockServer::start();
    let (base, _handle) = spawn_app(test_config(&upstream.url("/label.json"))).await;

    let response = reqwest::get(format!("{}/", base)).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["service"], "apothecary");
    assert!(body["endpoints"]
        .as_array()
        .unwrap()
        .contains(&json!("/drug/indications")));
}

#[tokio::test]
async fn indications_return_per_product_views() {
    let upstream = MockServer::start();
    let mock = upstream.mock(|when, then| {
        when.method(GET)
            .path("/label.json")
            .query_param(
                "search",
                "(openfda.brand_name:\"ibuprofen\" OR openfda.generic_name:\"ibuprofen\" OR openfda.substance_name:\"ibuprofen\")",
            )
            .query_param("limit", "3");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(label_fixture());
    });

    let (base, _handle) = spawn_app(test_config(&upstream.url("/label.json"))).await;

    let response = reqwest::get(format!("{}/drug/indications?drug=ibuprofen", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["brandNames"][0], "ADVIL");
    assert_eq!(body[0]["effectiveDate"], "2023-01-15");
    assert_eq!(body[1]["manufacturer"][0], "Johnson & Johnson");
    mock.assert();

    // Second identical request is served from cache, not the upstream
    let response = reqwest::get(format!("{}/drug/indications?drug=ibuprofen", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn section_endpoint_concatenates_blocks_in_order() {
    let upstream = MockServer::start();
    upstream.mock(|when, then| {
        when.method(GET).path("/label.json");
        then.status(200).json_body(label_fixture());
    });

    let (base, _handle) = spawn_app(test_config(&upstream.url("/label.json"))).await;

    let response = reqwest::get(format!("{}/drug/dosage?drug=ibuprofen", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Vec<String> = response.json().await.unwrap();
    assert_eq!(
        body,
        vec![
            "Take 1 tablet every 4 to 6 hours.",
            "Do not exceed 6 tablets in 24 hours."
        ]
    );
}

#[tokio::test]
async fn upstream_404_yields_empty_list_without_retries() {
    let upstream = MockServer::start();
    let mock = upstream.mock(|when, then| {
        when.method(GET).path("/label.json");
        then.status(404).json_body(json!({"error": "NOT_FOUND"}));
    });

    let (base, _handle) = spawn_app(test_config(&upstream.url("/label.json"))).await;

    let response = reqwest::get(format!("{}/drug/warnings?drug=nosuchdrug", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Vec<String> = response.json().await.unwrap();
    assert!(body.is_empty());
    assert_eq!(mock.hits(), 1);

    // The miss is negatively cached
    let response = reqwest::get(format!("{}/drug/warnings?drug=nosuchdrug", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn upstream_failure_retries_then_surfaces_502() {
    let upstream = MockServer::start();
    let mock = upstream.mock(|when, then| {
        when.method(GET).path("/label.json");
        then.status(500);
    });

    let (base, _handle) = spawn_app(test_config(&upstream.url("/label.json"))).await;

    let response = reqwest::get(format!("{}/drug/description?drug=aspirin", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 502);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], 502);
    assert_eq!(mock.hits(), 3);
}

#[tokio::test]
async fn upstream_recovery_within_retry_budget_succeeds() {
    let upstream = MockServer::start();
    // First attempt fails, the retry hits a healthy mock added afterwards
    let mut failing = upstream.mock(|when, then| {
        when.method(GET).path("/label.json");
        then.status(503);
    });

    let (base, _handle) = spawn_app(test_config(&upstream.url("/label.json"))).await;

    let request = tokio::spawn({
        let url = format!("{}/drug/dosage?drug=ibuprofen", base);
        async move { reqwest::get(url).await.unwrap() }
    });

    // Let the first attempt fail, then swap the mock to a healthy response
    tokio::time::sleep(Duration::from_millis(100)).await;
    failing.delete();
    upstream.mock(|when, then| {
        when.method(GET).path("/label.json");
        then.status(200).json_body(label_fixture());
    });

    let response = request.await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn unparseable_limit_is_rejected() {
    let upstream = MockServer::start();
    let (base, _handle) = spawn_app(test_config(&upstream.url("/label.json"))).await;

    let response = reqwest::get(format!("{}/drug/dosage?drug=x&limit=lots", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn quoted_search_term_is_rejected() {
    let upstream = MockServer::start();
    let (base, _handle) = spawn_app(test_config(&upstream.url("/label.json"))).await;

    let response = reqwest::get(format!("{}/drug/indications?drug=as%22pirin", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn oversized_limit_is_clamped_before_the_upstream_sees_it() {
    let upstream = MockServer::start();
    let mock = upstream.mock(|when, then| {
        when.method(GET).path("/label.json").query_param("limit", "10");
        then.status(200).json_body(label_fixture());
    });

    let (base, _handle) = spawn_app(test_config(&upstream.url("/label.json"))).await;

    let response = reqwest::get(format!("{}/drug/dosage?drug=ibuprofen&limit=500", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    mock.assert();
}

#[tokio::test]
async fn label_responses_carry_public_cache_headers() {
    let upstream = MockServer::start();
    upstream.mock(|when, then| {
        when.method(GET).path("/label.json");
        then.status(200).json_body(label_fixture());
    });

    let (base, _handle) = spawn_app(test_config(&upstream.url("/label.json"))).await;

    let response = reqwest::get(format!("{}/drug/dosage?drug=ibuprofen", base))
        .await
        .unwrap();
    let cache_control = response
        .headers()
        .get("cache-control")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cache_control.contains("max-age=3600"));
    assert!(cache_control.contains("stale-while-revalidate"));
}
