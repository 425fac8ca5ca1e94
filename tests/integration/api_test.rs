// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! HTTP层端到端测试：真实路由、真实用例，
//! 自动化引擎由shell脚本替身扮演。

use axum_test::TestServer;
use carcrawl::application::usecases::run_scrape::RunScrapeUseCase;
use carcrawl::config::settings::ScraperSettings;
use carcrawl::engines::stagehand::StagehandEngine;
use carcrawl::infrastructure::storage::ListingStore;
use carcrawl::presentation::routes;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

fn test_server(handoff_dir: &Path, data_file: &Path, script: &str) -> TestServer {
    let settings = ScraperSettings {
        runner_command: "sh".to_string(),
        runner_args: vec!["-c".to_string(), script.to_string(), "runner".to_string()],
        job_timeout_secs: 10,
        settle_secs: 0,
        handoff_dir: handoff_dir.display().to_string(),
        model_name: "test-model".to_string(),
        engine_url: "http://127.0.0.1:1".to_string(),
    };
    let engine = Arc::new(StagehandEngine::new(settings.clone()));
    let use_case = Arc::new(RunScrapeUseCase::from_settings(engine, &settings));
    let store = Arc::new(ListingStore::new(data_file));
    TestServer::new(routes::routes(use_case, store)).unwrap()
}

const SUCCESS_SCRIPT: &str = r#"
printf '[{"brand":"%s","model":"%s","year":%s,"price":15000,"currency":"USD"}]' \
    "$1" "$2" "$3" > "$CARCRAWL_HANDOFF_FILE"
echo EXTRACTION_COMPLETE
"#;

#[tokio::test]
async fn test_scrape_endpoint_success() {
    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("listings.json");
    let server = test_server(dir.path(), &data_file, SUCCESS_SCRIPT);

    let response = server
        .post("/v1/scrape")
        .json(&json!({
            "url": "https://example.test/search",
            "brand": "Toyota",
            "model": "Corolla",
            "year": 2020,
            "api_key": "k1"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["brand"], "Toyota");
    assert_eq!(body["stats"]["count"], 1);
    assert_eq!(body["stats"]["average_price"], 15000.0);

    // Successful scrapes land in the listing store.
    let stored: Value =
        serde_json::from_str(&std::fs::read_to_string(&data_file).unwrap()).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 1);
    assert_eq!(stored[0]["model"], "Corolla");
}

#[tokio::test]
async fn test_scrape_endpoint_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let script = r#"
printf '[]' > "$CARCRAWL_HANDOFF_FILE"
echo EXTRACTION_COMPLETE
"#;
    let server = test_server(dir.path(), &dir.path().join("listings.json"), script);

    let response = server
        .post("/v1/scrape")
        .json(&json!({
            "url": "https://example.test/search",
            "brand": "Toyota",
            "model": "Corolla",
            "year": 2020,
            "api_key": "k1"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "empty_result");
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_missing_api_key_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let server = test_server(dir.path(), &dir.path().join("listings.json"), SUCCESS_SCRIPT);

    let response = server
        .post("/v1/scrape")
        .json(&json!({
            "url": "https://example.test/search",
            "brand": "Toyota",
            "model": "Corolla",
            "year": 2020,
            "api_key": ""
        }))
        .await;

    assert_eq!(response.status_code().as_u16(), 401);
    let body: Value = response.json();
    assert_eq!(body["status"], "auth_error");
}

#[tokio::test]
async fn test_placeholder_api_key_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let server = test_server(dir.path(), &dir.path().join("listings.json"), SUCCESS_SCRIPT);

    let response = server
        .post("/v1/scrape")
        .json(&json!({
            "url": "https://example.test/search",
            "brand": "Toyota",
            "model": "Corolla",
            "year": 2020,
            "api_key": "YOUR_API_KEY"
        }))
        .await;

    assert_eq!(response.status_code().as_u16(), 401);
}

#[tokio::test]
async fn test_invalid_url_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let server = test_server(dir.path(), &dir.path().join("listings.json"), SUCCESS_SCRIPT);

    let response = server
        .post("/v1/scrape")
        .json(&json!({
            "url": "ftp://example.test/search",
            "brand": "Toyota",
            "model": "Corolla",
            "year": 2020,
            "api_key": "k1"
        }))
        .await;

    assert_eq!(response.status_code().as_u16(), 400);
}

#[tokio::test]
async fn test_crashed_runner_is_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let script = r#"
echo "CRITICAL_ERROR: network failure" >&2
exit 1
"#;
    let server = test_server(dir.path(), &dir.path().join("listings.json"), script);

    let response = server
        .post("/v1/scrape")
        .json(&json!({
            "url": "https://example.test/search",
            "brand": "Toyota",
            "model": "Corolla",
            "year": 2020,
            "api_key": "k1"
        }))
        .await;

    assert_eq!(response.status_code().as_u16(), 502);
    let body: Value = response.json();
    assert_eq!(body["status"], "crash_error");
}

#[tokio::test]
async fn test_health_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let server = test_server(dir.path(), &dir.path().join("listings.json"), SUCCESS_SCRIPT);

    let health = server.get("/health").await;
    health.assert_status_ok();
    let body: Value = health.json();
    assert_eq!(body["status"], "ok");

    let version = server.get("/v1/version").await;
    version.assert_status_ok();
    assert!(!version.text().is_empty());
}
