use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use designflow_automation::{AutomationError, JobExecutor, JobReport};
use designflow_core::DesignRecord;
use designflow_llm::{DescriptionGenerator, LlmError};
use designflow_service::{
    AutomationService, DesignService, Dispatcher, EnrichmentService,
};
use designflow_storage::{DesignStore, Storage};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{AppState, create_router};

struct EchoGenerator;

#[async_trait]
impl DescriptionGenerator for EchoGenerator {
    async fn describe(&self, image_url: &str) -> Result<String, LlmError> {
        Ok(format!("prompt for {image_url}"))
    }
}

struct NoopExecutor;

#[async_trait]
impl JobExecutor for NoopExecutor {
    async fn run(&self, record: &DesignRecord) -> Result<JobReport, AutomationError> {
        Ok(JobReport {
            record_id: record.id.clone(),
            target_url: "https://studio.example/".to_owned(),
            reused_target: false,
            steps: Vec::new(),
        })
    }
}

fn test_router() -> (axum::Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let storage = Storage::new(&temp_dir.path().join("test.db")).unwrap();
    let store: Arc<dyn DesignStore> = Arc::new(storage);
    let design_service = Arc::new(DesignService::new(Arc::clone(&store)));
    let enrichment = Arc::new(EnrichmentService::new(Arc::clone(&store), Arc::new(EchoGenerator)));
    let automation_service = Arc::new(AutomationService::new(store, Arc::new(NoopExecutor)));
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&design_service),
        enrichment,
        Arc::clone(&automation_service),
    ));
    let state = Arc::new(AppState { dispatcher, design_service, automation_service });
    (create_router(state), temp_dir)
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_action(payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/actions")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn import_payload(url: &str) -> Value {
    json!({"action": "import", "title": "T1", "brand": "B1", "sourceUrl": url, "imageUrl": "i1"})
}

#[tokio::test]
async fn test_health() {
    let (router, _dir) = test_router();
    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_import_then_list_and_get() {
    let (router, _dir) = test_router();

    let (status, ack) = send(&router, post_action(&import_payload("u1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "ok");
    assert_eq!(ack["detail"]["outcome"], "imported");
    let id = ack["detail"]["record"]["id"].as_str().unwrap().to_owned();

    let (_, ack) = send(&router, post_action(&import_payload("u1"))).await;
    assert_eq!(ack["detail"]["outcome"], "duplicateSkipped");

    let (status, list) = send(&router, get("/api/designs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, record) = send(&router, get(&format!("/api/designs/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["sourceUrl"], "u1");
    assert_eq!(record["prompt"], Value::Null);
}

#[tokio::test]
async fn test_unknown_design_is_404() {
    let (router, _dir) = test_router();
    let (status, body) = send(&router, get("/api/designs/design-missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "design 'design-missing' not found"}));
}

#[tokio::test]
async fn test_failed_action_is_error_ack() {
    let (router, _dir) = test_router();

    let (status, ack) =
        send(&router, post_action(&json!({"action": "startAutomation", "id": "nope"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "error");
    assert_eq!(ack["reason"], "design not found: nope");

    let (_, ack) = send(&router, post_action(&json!({"action": "dance"}))).await;
    assert_eq!(ack["status"], "error");
}

#[tokio::test]
async fn test_malformed_body_is_error_ack() {
    let (router, _dir) = test_router();

    let request = Request::builder()
        .method("POST")
        .uri("/api/actions")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, ack) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "error");
    assert!(ack["reason"].as_str().unwrap().starts_with("invalid action"));

    let request = Request::builder()
        .method("POST")
        .uri("/api/actions")
        .body(Body::from(import_payload("u1").to_string()))
        .unwrap();
    let (status, ack) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "error");

    let (_, list) = send(&router, get("/api/designs")).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_analyze_and_automate_over_http() {
    let (router, _dir) = test_router();
    let (_, ack) = send(&router, post_action(&import_payload("u1"))).await;
    let id = ack["detail"]["record"]["id"].as_str().unwrap().to_owned();

    let (_, ack) = send(&router, post_action(&json!({"action": "analyzeAll"}))).await;
    assert_eq!(ack["detail"], json!({"analyzed": 1, "skipped": 0, "failed": []}));

    let (_, ack) =
        send(&router, post_action(&json!({"action": "startBulkAutomation", "ids": [id]}))).await;
    assert_eq!(ack["detail"]["submitted"][0]["submission"], "started");

    let (status, snapshot) = send(&router, get("/api/automation/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(snapshot.get("state").is_some());
    assert!(snapshot.get("backlog").is_some());
}
