use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use brandlink_bynder::api::MEDIA_PATH;
use brandlink_bynder::BynderApi;
use brandlink_core::config::BynderConfig;
use serde_json::{json, Value};

/// A request as seen by the fake portal.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub params: HashMap<String, String>,
}

/// Shared state of the fake portal: a library of `library_size`
/// images and every request received.
pub struct PortalState {
    pub library_size: usize,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl PortalState {
    pub fn with_library(library_size: usize) -> Arc<Self> {
        Arc::new(Self {
            library_size,
            requests: Mutex::new(Vec::new()),
        })
    }
}

/// Build a media record. Even ids only carry the nested derivative
/// thumbnail, odd ids the direct one.
fn media_record(index: usize, keyword: &str) -> Value {
    if index % 2 == 0 {
        json!({
            "id": format!("media-{index}"),
            "name": format!("{keyword} {index}"),
            "derivatives": {"webImage": {"url": format!("https://dam.test/derived/{index}.jpg")}},
            "originalUrl": format!("https://dam.test/original/{index}.jpg"),
        })
    } else {
        json!({
            "id": format!("media-{index}"),
            "name": format!("{keyword} {index}"),
            "thumbnails": {"webimage": format!("https://dam.test/web/{index}.jpg")},
            "originalUrl": format!("https://dam.test/original/{index}.jpg"),
        })
    }
}

async fn media_handler(
    State(state): State<Arc<PortalState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(50);
    let keyword = params.get("keyword").cloned().unwrap_or_default();

    state.requests.lock().unwrap().push(RecordedRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        params,
    });

    let start = (page.saturating_sub(1) * limit).min(state.library_size);
    let end = (start + limit).min(state.library_size);
    let records: Vec<Value> = (start..end).map(|i| media_record(i, &keyword)).collect();
    Json(Value::Array(records))
}

/// Bind a router on an ephemeral localhost port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

/// Start a fake portal serving the state's library.
pub async fn spawn_portal(state: Arc<PortalState>) -> String {
    let router = Router::new()
        .route(MEDIA_PATH, get(media_handler))
        .with_state(state);
    serve(router).await
}

/// Start a fake portal that answers every search with `status`.
pub async fn spawn_status_portal(status: StatusCode) -> String {
    let router = Router::new().route(
        MEDIA_PATH,
        get(move || async move { (status, "portal says no").into_response() }),
    );
    serve(router).await
}

/// Start a fake portal that answers every search with `200` and `body`.
pub async fn spawn_body_portal(body: Value) -> String {
    let router = Router::new().route(
        MEDIA_PATH,
        get(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );
    serve(router).await
}

/// Search client pointed at `base` with the given page size.
pub fn api_for(base: &str, page_size: u32) -> BynderApi {
    let config = BynderConfig::new("test-token", base)
        .expect("valid test config")
        .with_page_size(page_size)
        .expect("valid page size");
    BynderApi::new(&config).expect("client builds")
}
