use posture_config::SourcesConfig;
use posture_server::store::{FileStore, MemoryStore, ReportStore};
use posture_server::{router, AppState};
use posture_sources::Orchestrator;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY_LIMIT: usize = 10 * 1024 * 1024;

fn sources_for(upstream: &MockServer) -> SourcesConfig {
    let uri = upstream.uri();
    SourcesConfig {
        crtsh_url: uri.clone(),
        ssllabs_url: uri,
        poll_interval_ms: 20,
        poll_ceiling_secs: 1,
        ..Default::default()
    }
}

/// Serves the API on an ephemeral port and returns its base URL.
async fn serve(store: Arc<dyn ReportStore>, sources: &SourcesConfig) -> String {
    let orchestrator = Orchestrator::from_config(sources).unwrap();
    let app = router(Arc::new(AppState::new(store, orchestrator)), BODY_LIMIT);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn mount_upstream(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("output", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name_value": "a.example.com"},
            {"name_value": "b.example.com\na.example.com"}
        ])))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("server", "nginx")
                .insert_header("strict-transport-security", "max-age=63072000")
                .set_body_raw(
                    "<html><head><meta name=\"generator\" content=\"WordPress 6.5\"></head></html>",
                    "text/html",
                ),
        )
        .with_priority(2)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin\n"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "READY",
            "endpoints": [{"grade": "A+", "ipAddress": "10.0.0.1"}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn ping_is_plain_text() {
    let upstream = MockServer::start().await;
    let base = serve(Arc::new(MemoryStore::new()), &sources_for(&upstream)).await;

    let resp = reqwest::get(format!("{}/ping", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn scan_summarize_save_and_export() {
    let upstream = MockServer::start().await;
    mount_upstream(&upstream).await;
    let base = serve(Arc::new(MemoryStore::new()), &sources_for(&upstream)).await;
    let client = reqwest::Client::new();

    let scan: Value = client
        .post(format!("{}/scan", base))
        .json(&json!({ "url": format!("{}/", upstream.uri()) }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(scan["ok"], true);
    let bag = scan["result"].clone();
    assert_eq!(bag["domain"], "127.0.0.1");
    assert_eq!(bag["home"]["ok"]["generator"], "WordPress 6.5");
    assert!(bag["urlscan"]["skipped"].is_string());
    assert!(bag["shodan"].is_null());
    let live_ids: Vec<&str> = bag["risks"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["id"].as_str())
        .collect();
    assert!(live_ids.contains(&"missing_csp"));
    assert!(live_ids.contains(&"cms_detected"));
    assert!(!live_ids.contains(&"missing_hsts"));

    let summary: Value = client
        .post(format!("{}/summarize", base))
        .json(&bag)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["subdomainCount"], 2);
    assert_eq!(summary["sslGrade"], "A+");
    assert_eq!(summary["suspiciousDisallows"], json!(["/admin"]));

    let saved: Value = client
        .post(format!("{}/save", base))
        .json(&json!({
            "target": "example.com",
            "url": "https://example.com/",
            "result": summary,
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved["ok"], true);
    let id = saved["data"]["id"].as_str().unwrap().to_string();

    let all: Value = reqwest::get(format!("{}/allScans", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["result"]["subdomainCount"], 2);

    let pdf = reqwest::get(format!("{}/scan/{}/pdf", base, id))
        .await
        .unwrap();
    assert_eq!(pdf.status(), 200);
    assert_eq!(pdf.headers()["content-type"], "application/pdf");
    let bytes = pdf.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn bad_requests_and_missing_records() {
    let upstream = MockServer::start().await;
    let base = serve(Arc::new(MemoryStore::new()), &sources_for(&upstream)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/scan", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "target domain or url required");

    let resp = client
        .post(format!("{}/scan", base))
        .json(&json!({ "target": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = client
        .post(format!("{}/scan", base))
        .body("target=example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = client
        .post(format!("{}/scan", base))
        .json(&json!({ "target": "https://example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid URL provided");

    let resp = reqwest::get(format!("{}/scan/unknown", base)).await.unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .delete(format!("{}/saved-reports/unknown", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .post(format!("{}/saved-reports", base))
        .json(&json!({ "scanId": "unknown", "domain": "example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let upstream = MockServer::start().await;
    let base = serve(Arc::new(MemoryStore::new()), &sources_for(&upstream)).await;

    let resp = reqwest::Client::new()
        .get(format!("{}/allScans", base))
        .header("origin", "http://dashboard.local")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports.json");
    let upstream = MockServer::start().await;
    let sources = sources_for(&upstream);
    let client = reqwest::Client::new();

    let first = serve(Arc::new(FileStore::new(&path)), &sources).await;
    for grade in ["B", "A"] {
        let resp = client
            .post(format!("{}/save", first))
            .json(&json!({
                "target": "example.com",
                "url": "https://example.com/",
                "result": { "sslGrade": grade },
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let second = serve(Arc::new(FileStore::new(&path)), &sources).await;
    let all: Value = reqwest::get(format!("{}/allScans", second))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["result"]["sslGrade"], "A");
}
