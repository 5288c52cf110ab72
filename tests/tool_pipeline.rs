//! Pipeline integration tests - store → executor → mapper → text, and probes
//! persisted back to the store, against a local mock HTTP server.

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::net::SocketAddr;

use toolgate::tools::{
    Authentication, FieldMapping, FieldType, ResponseMapping, TestStatus, ToolDefinition, ToolKind,
};
use toolgate::{Config, ToolId, ToolRegistry, ToolStore};

// =============================================================================
// Mock server
// =============================================================================

async fn items() -> Json<Value> {
    Json(json!({"data": {"items": [{"x": 1}]}}))
}

async fn echo_query(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!(query))
}

async fn echo_body(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"result": body}))
}

async fn echo_auth(headers: HeaderMap) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };
    Json(json!({
        "authorization": header("authorization"),
        "api_key": header("x-api-key"),
    }))
}

async fn basic_only(headers: HeaderMap) -> StatusCode {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Basic dXNlcjpwYXNz") => StatusCode::OK,
        _ => StatusCode::UNAUTHORIZED,
    }
}

async fn ok() -> Json<Value> {
    Json(json!({}))
}

async fn fail() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn html() -> &'static str {
    "<html>not json</html>"
}

/// Spin up the mock server on a random port.
async fn spawn_server() -> SocketAddr {
    let app = Router::new()
        .route("/items", get(items))
        .route("/query", get(echo_query))
        .route("/body", post(echo_body))
        .route("/auth", get(echo_auth))
        .route("/basic", get(basic_only).post(basic_only))
        .route("/ok", get(ok).post(ok))
        .route("/fail", get(fail).post(fail))
        .route("/html", get(html));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// An address nothing listens on.
async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

// =============================================================================
// Helpers
// =============================================================================

fn registry() -> ToolRegistry {
    let store = ToolStore::open_in_memory().unwrap();
    ToolRegistry::new(store, &Config::default()).unwrap()
}

fn tool(id: &str, method: &str, url: String, mapping: ResponseMapping) -> ToolDefinition {
    let mut tool = ToolDefinition::new(id, &format!("Tool {}", id), "Mock tool", ToolKind::Api, &url);
    tool.method = method.to_string();
    tool.response_mapping = mapping;
    tool
}

fn mapping(path: &str, fields: Vec<FieldMapping>) -> ResponseMapping {
    ResponseMapping {
        data_path: path.to_string(),
        fields,
    }
}

fn params(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

// =============================================================================
// Invocation
// =============================================================================

#[tokio::test]
async fn test_exported_capability_end_to_end() {
    let addr = spawn_server().await;
    let registry = registry();
    registry
        .store()
        .save(&tool(
            "items",
            "GET",
            format!("http://{}/items", addr),
            mapping("data.items", vec![FieldMapping::new("x", "y", FieldType::Number)]),
        ))
        .unwrap();

    let capabilities = registry.capabilities().unwrap();
    let cap = capabilities
        .iter()
        .find(|c| c.name() == "tool_items")
        .unwrap();

    let text = cap.invoke(Map::new()).await;
    assert!(text.contains("y: 1"), "unexpected output: {}", text);
    assert!(text.starts_with("✅ Tool items - 1 resultados encontrados:"));
}

#[tokio::test]
async fn test_get_sends_query_string() {
    let addr = spawn_server().await;
    let registry = registry();
    registry
        .store()
        .save(&tool(
            "query",
            "GET",
            format!("http://{}/query", addr),
            mapping(
                "",
                vec![
                    FieldMapping::new("curso", "curso", FieldType::String),
                    FieldMapping::new("ano", "ano", FieldType::Number),
                ],
            ),
        ))
        .unwrap();

    let text = registry
        .invoke(
            &ToolId::from("query"),
            params(json!({"curso": "Medicina", "ano": 2024})),
        )
        .await;
    assert!(text.contains("• curso: Medicina"), "unexpected output: {}", text);
    assert!(text.contains("• ano: 2024"));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let addr = spawn_server().await;
    let registry = registry();
    registry
        .store()
        .save(&tool(
            "body",
            "POST",
            format!("http://{}/body", addr),
            mapping(
                "result",
                vec![FieldMapping::new("estudante_id", "estudante", FieldType::String)],
            ),
        ))
        .unwrap();

    let text = registry
        .invoke(
            &ToolId::from("body"),
            params(json!({"estudante_id": 42, "disciplinas": ["MED101"]})),
        )
        .await;
    assert!(text.contains("• estudante: 42"), "unexpected output: {}", text);
}

#[tokio::test]
async fn test_auth_headers_override_static_headers() {
    let addr = spawn_server().await;
    let registry = registry();

    let mut bearer = tool(
        "bearer",
        "GET",
        format!("http://{}/auth", addr),
        mapping(
            "",
            vec![FieldMapping::new("authorization", "authorization", FieldType::String)],
        ),
    );
    bearer.headers.insert("authorization".into(), "stale".into());
    bearer.authentication = Authentication::Bearer {
        token: "abc".to_string(),
    };
    registry.store().save(&bearer).unwrap();

    let mut keyed = tool(
        "keyed",
        "GET",
        format!("http://{}/auth", addr),
        mapping("", vec![FieldMapping::new("api_key", "api_key", FieldType::String)]),
    );
    keyed.authentication = Authentication::ApiKey {
        key: "k-123".to_string(),
        header_name: None,
    };
    registry.store().save(&keyed).unwrap();

    let text = registry.invoke(&ToolId::from("bearer"), Map::new()).await;
    assert!(text.contains("• authorization: Bearer abc"), "unexpected output: {}", text);

    let text = registry.invoke(&ToolId::from("keyed"), Map::new()).await;
    assert!(text.contains("• api_key: k-123"), "unexpected output: {}", text);
}

#[tokio::test]
async fn test_non_success_status_is_error_text() {
    let addr = spawn_server().await;
    let registry = registry();
    registry
        .store()
        .save(&tool(
            "fail",
            "GET",
            format!("http://{}/fail", addr),
            ResponseMapping::default(),
        ))
        .unwrap();

    let text = registry.invoke(&ToolId::from("fail"), Map::new()).await;
    assert!(text.starts_with("❌ Erro na requisição para Tool fail: "));
    assert!(text.contains("500"));
    assert!(text.contains("upstream exploded"));
}

#[tokio::test]
async fn test_non_json_body_is_decode_error_text() {
    let addr = spawn_server().await;
    let registry = registry();
    registry
        .store()
        .save(&tool(
            "html",
            "GET",
            format!("http://{}/html", addr),
            ResponseMapping::default(),
        ))
        .unwrap();

    let text = registry.invoke(&ToolId::from("html"), Map::new()).await;
    assert_eq!(text, "❌ Erro ao decodificar resposta JSON de Tool html");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_error_text() {
    let addr = dead_addr().await;
    let registry = registry();
    registry
        .store()
        .save(&tool(
            "dead",
            "GET",
            format!("http://{}/", addr),
            ResponseMapping::default(),
        ))
        .unwrap();

    let text = registry.invoke(&ToolId::from("dead"), Map::new()).await;
    assert!(text.starts_with("❌ Erro na requisição para Tool dead: network error"));
}

#[tokio::test]
async fn test_unknown_tool_is_not_found_text() {
    let registry = registry();
    let text = registry.invoke(&ToolId::from("nope"), Map::new()).await;
    assert_eq!(text, "❌ Ferramenta não encontrada: nope");
}

#[tokio::test]
async fn test_export_excludes_inactive() {
    let registry = registry();
    let all = registry.store().list_all().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all.iter().filter(|t| !t.is_active).count(), 1);
    assert_eq!(registry.capabilities().unwrap().len(), 2);
}

// =============================================================================
// Probes
// =============================================================================

#[tokio::test]
async fn test_probe_success_is_persisted() {
    let addr = spawn_server().await;
    let registry = registry();
    registry
        .store()
        .save(&tool("ok", "POST", format!("http://{}/ok", addr), ResponseMapping::default()))
        .unwrap();

    let result = registry.probe(&ToolId::from("ok")).await.unwrap();
    assert!(result.success);

    let stored = registry.store().get(&ToolId::from("ok")).unwrap();
    assert_eq!(stored.test_status, Some(TestStatus::Success));
    assert_eq!(
        stored.test_message.as_deref(),
        Some("Conexão bem-sucedida! API respondeu corretamente.")
    );
    assert!(stored.last_tested.is_some());
}

#[tokio::test]
async fn test_probe_sends_basic_credentials() {
    let addr = spawn_server().await;
    let registry = registry();
    let mut basic = tool("basic", "GET", format!("http://{}/basic", addr), ResponseMapping::default());
    basic.authentication = Authentication::Basic {
        username: "user".to_string(),
        password: "pass".to_string(),
    };
    registry.store().save(&basic).unwrap();

    let result = registry.probe(&ToolId::from("basic")).await.unwrap();
    assert!(result.success, "probe failed: {}", result.message);
}

#[tokio::test]
async fn test_probe_bad_status_is_persisted() {
    let addr = spawn_server().await;
    let registry = registry();
    registry
        .store()
        .save(&tool("fail", "GET", format!("http://{}/fail", addr), ResponseMapping::default()))
        .unwrap();

    let result = registry.probe(&ToolId::from("fail")).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.status_code, Some(500));

    let stored = registry.store().get(&ToolId::from("fail")).unwrap();
    assert_eq!(stored.test_status, Some(TestStatus::Error));
    assert_eq!(stored.test_message.as_deref(), Some("API retornou status 500"));
    assert!(stored.last_tested.is_some());
}

#[tokio::test]
async fn test_probe_network_failure_is_persisted() {
    let addr = dead_addr().await;
    let registry = registry();
    registry
        .store()
        .save(&tool("dead", "GET", format!("http://{}/", addr), ResponseMapping::default()))
        .unwrap();

    let result = registry.probe(&ToolId::from("dead")).await.unwrap();
    assert!(!result.success);

    let stored = registry.store().get(&ToolId::from("dead")).unwrap();
    assert_eq!(stored.test_status, Some(TestStatus::Error));
    let message = stored.test_message.unwrap_or_default();
    assert!(message.starts_with("Erro de conexão: "), "message: {}", message);
    assert!(stored.last_tested.is_some());
}

#[tokio::test]
async fn test_probe_unknown_tool() {
    let registry = registry();
    let err = registry.probe(&ToolId::from("nope")).await.unwrap_err();
    assert!(matches!(err, toolgate::Error::NotFound(_)));
}

#[tokio::test]
async fn test_probe_all_covers_every_tool() {
    let addr = spawn_server().await;
    let registry = registry();

    // Point the seed tools at the mock server, one of them failing
    for (i, mut seeded) in registry.store().list_all().unwrap().into_iter().enumerate() {
        let route = if i == 0 { "fail" } else { "ok" };
        seeded.endpoint = format!("http://{}/{}", addr, route);
        registry.store().save(&seeded).unwrap();
    }

    let results = registry.probe_all().await.unwrap();
    assert_eq!(results.len(), 3);
    assert!(!results[0].success);
    assert!(results[1].success);
    assert!(results[2].success, "inactive tools are probed too");

    let stored = registry.store().list_all().unwrap();
    assert!(stored.iter().all(|t| t.last_tested.is_some()));
}
