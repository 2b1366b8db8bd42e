//! Admin router behaviour, driven in-process.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use endpoint_host::admin::{setup_admin_router, AdminState};
use endpoint_host::config::schema::PortDeployment;
use endpoint_host::config::{SettingsSnapshot, SettingsStore};
use endpoint_host::injection::ClassRegistry;
use endpoint_host::lifecycle::EndpointRegistry;
use endpoint_host::naming::{InMemoryContext, NamingContext};
use endpoint_host::services::{self, echo};

const KEY: &str = "test-admin-key";

fn admin() -> (Router, Arc<EndpointRegistry>) {
    let naming = InMemoryContext::from_json(&json!({
        "global": {"greeting": "hello", "db": {"url": "jdbc:h2:mem"}},
        "app": {"limit": 5},
        "env": {"greeting": "hello"},
    }));
    let naming: Arc<dyn NamingContext> = Arc::new(naming);

    let mut classes = ClassRegistry::new();
    services::register_builtin(&mut classes);
    let environment = endpoint_host::lifecycle::EndpointEnvironment {
        naming: naming.clone(),
        engine: Arc::new(endpoint_host::descriptor::ReflectiveEngine),
    };
    let registry = Arc::new(EndpointRegistry::new(
        classes,
        environment,
        Arc::new(SettingsStore::new(SettingsSnapshot::default())),
    ));

    let state = AdminState::new(registry.clone(), naming, KEY);
    (setup_admin_router(state, Duration::from_secs(5)), registry)
}

fn request(method: Method, uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("Authorization", format!("Bearer {}", key));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_requests_without_key_are_rejected() {
    let (router, _) = admin();

    let response = router
        .clone()
        .oneshot(request(Method::GET, "/admin/status", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router
        .oneshot(request(Method::GET, "/admin/status", Some("wrong")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_counts_endpoints() {
    let (router, registry) = admin();
    registry.publish(PortDeployment::new("echo", echo::CLASS_NAME)).unwrap();

    let response = router
        .oneshot(request(Method::GET, "/admin/status", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "operational");
    assert_eq!(body["endpoints"], 1);
}

#[tokio::test]
async fn test_endpoints_lists_summaries() {
    let (router, registry) = admin();
    registry.publish(PortDeployment::new("echo", echo::CLASS_NAME)).unwrap();

    let response = router
        .oneshot(request(Method::GET, "/admin/endpoints", Some(KEY)))
        .await
        .unwrap();
    let body = json_body(response).await;

    assert_eq!(body[0]["port_id"], "echo");
    assert_eq!(body[0]["class"], echo::CLASS_NAME);
    assert_eq!(body[0]["state"], "active");
    assert_eq!(body[0]["service_name"], "EchoServiceService");
    assert_eq!(body[0]["operations"], json!(["echo", "whoami"]));
}

#[tokio::test]
async fn test_undeploy_endpoint() {
    let (router, registry) = admin();
    registry.publish(PortDeployment::new("echo", echo::CLASS_NAME)).unwrap();

    let response = router
        .clone()
        .oneshot(request(Method::DELETE, "/admin/endpoints/echo", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["clean"], true);
    assert!(registry.is_empty());

    let response = router
        .oneshot(request(Method::DELETE, "/admin/endpoints/echo", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_naming_listing() {
    let (router, _) = admin();

    let response = router
        .oneshot(request(Method::GET, "/admin/naming", Some(KEY)))
        .await
        .unwrap();
    let body = json_body(response).await;

    // `comp` is absent and skipped; `env` is not a listed root.
    assert_eq!(
        body,
        json!([
            {"module": "host", "name": "global/db/url", "value": "jdbc:h2:mem"},
            {"module": "host", "name": "global/greeting", "value": "hello"},
            {"module": "host", "name": "app/limit", "value": "5"},
        ])
    );
}
