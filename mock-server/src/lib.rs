use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Item>>>;

/// Routes, all under `/api` and all ending with a slash:
///
/// - `/api/items/` and `/api/items/{id}/`: CRUD, answers wrapped in `result`
/// - `/api/echo/...`: any verb, answers with what was received
/// - `/api/status/{code}/`: answers with `code`; `?body=<json>` sets the body
/// - `/api/raw/`: answers 200 with a non-JSON body
/// - `/api/large/{len}/`: answers `{"result": "xx..."}` with `len` characters
pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/api/items/", get(list_items).post(create_item))
        .route(
            "/api/items/{id}/",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/api/echo/", any(echo))
        .route("/api/echo/{*rest}", any(echo))
        .route("/api/status/{code}/", any(status))
        .route("/api/raw/", any(raw))
        .route("/api/large/{len}/", get(large))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_items(State(db): State<Db>) -> Json<Value> {
    let items = db.read().await;
    let mut items: Vec<Item> = items.values().cloned().collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Json(json!({ "result": items }))
}

async fn create_item(State(db): State<Db>, Json(input): Json<CreateItem>) -> Json<Value> {
    let item = Item {
        id: Uuid::new_v4(),
        name: input.name,
        tags: input.tags,
    };
    db.write().await.insert(item.id, item.clone());
    Json(json!({ "result": item }))
}

async fn get_item(State(db): State<Db>, Path(id): Path<Uuid>) -> (StatusCode, Json<Value>) {
    let items = db.read().await;
    match items.get(&id) {
        Some(item) => (StatusCode::OK, Json(json!({ "result": item }))),
        None => not_found(),
    }
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateItem>,
) -> (StatusCode, Json<Value>) {
    let mut items = db.write().await;
    let Some(item) = items.get_mut(&id) else {
        return not_found();
    };
    if let Some(name) = input.name {
        item.name = name;
    }
    if let Some(tags) = input.tags {
        item.tags = tags;
    }
    (StatusCode::OK, Json(json!({ "result": item })))
}

async fn delete_item(State(db): State<Db>, Path(id): Path<Uuid>) -> (StatusCode, Json<Value>) {
    let mut items = db.write().await;
    match items.remove(&id) {
        Some(_) => (StatusCode::ACCEPTED, Json(json!({ "result": {} }))),
        None => not_found(),
    }
}

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

async fn echo(
    method: Method,
    uri: Uri,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: axum::http::HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in pairs {
        query.entry(key).or_default().push(value);
    }
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let headers: BTreeMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();

    Json(json!({
        "result": {
            "method": method.as_str(),
            "path": uri.path(),
            "query": query,
            "headers": headers,
            "body": body,
        }
    }))
}

#[derive(Deserialize)]
struct StatusParams {
    body: Option<String>,
}

async fn status(Path(code): Path<u16>, Query(params): Query<StatusParams>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    let body = params
        .body
        .unwrap_or_else(|| json!({ "status": code }).to_string());
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn raw() -> (StatusCode, &'static str) {
    (StatusCode::OK, "definitely not json")
}

async fn large(Path(len): Path<usize>) -> Json<Value> {
    Json(json!({ "result": "x".repeat(len) }))
}
