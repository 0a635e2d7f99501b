use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Item};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- items ---

#[tokio::test]
async fn list_items_empty() {
    let resp = app().oneshot(empty_request("GET", "/api/items/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"result": []}));
}

#[tokio::test]
async fn create_item_wraps_result() {
    let resp = app()
        .oneshot(json_request("POST", "/api/items/", r#"{"name":"bolt","tags":["m4"]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let item: Item = serde_json::from_value(body["result"].clone()).unwrap();
    assert_eq!(item.name, "bolt");
    assert_eq!(item.tags, vec!["m4".to_string()]);
}

#[tokio::test]
async fn create_item_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/items/", r#"{"not_name":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_item_not_found() {
    let resp = app()
        .oneshot(empty_request(
            "GET",
            "/api/items/00000000-0000-0000-0000-000000000000/",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"error": "not found"}));
}

#[tokio::test]
async fn get_item_bad_uuid_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/items/not-a-uuid/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_item_not_found() {
    let resp = app()
        .oneshot(empty_request(
            "DELETE",
            "/api/items/00000000-0000-0000-0000-000000000000/",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- echo ---

#[tokio::test]
async fn echo_reports_method_path_query_and_body() {
    let resp = app()
        .oneshot(json_request(
            "PATCH",
            "/api/echo/a/b/?tag=x&tag=y&page=2",
            r#"{"k":"v"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let result = &body["result"];
    assert_eq!(result["method"], "PATCH");
    assert_eq!(result["path"], "/api/echo/a/b/");
    assert_eq!(result["query"], json!({"page": ["2"], "tag": ["x", "y"]}));
    assert_eq!(result["body"], json!({"k": "v"}));
    assert_eq!(result["headers"]["content-type"], "application/json");
}

#[tokio::test]
async fn echo_accepts_custom_verbs() {
    let resp = app().oneshot(empty_request("PURGE", "/api/echo/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["result"]["method"], "PURGE");
    assert_eq!(body["result"]["body"], Value::Null);
}

// --- status / raw ---

#[tokio::test]
async fn status_route_returns_requested_code() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/status/503/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"status": 503}));
}

#[tokio::test]
async fn status_route_uses_body_override() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/status/500/?body=%7B%7D"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(&body_bytes(resp).await[..], b"{}");
}

#[tokio::test]
async fn raw_route_is_not_json() {
    let resp = app().oneshot(empty_request("GET", "/api/raw/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(serde_json::from_slice::<Value>(&body_bytes(resp).await).is_err());
}

#[tokio::test]
async fn large_route_returns_requested_length() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/large/16/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"result": "x".repeat(16)}));
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/items/", r#"{"name":"nut"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let created: Item = serde_json::from_value(body["result"].clone()).unwrap();
    let id = created.id;

    // update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/items/{id}/"),
            r#"{"tags":["steel"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["result"]["name"], "nut");
    assert_eq!(body["result"]["tags"], json!(["steel"]));

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/api/items/{id}/")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"result": {}}));

    // get after delete: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/api/items/{id}/")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
