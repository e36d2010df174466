use crate::relay::{ Relay, RelayBody, RelayRequest, RelayResponse };

use axum::{
    body::{ to_bytes, Body },
    extract::State,
    http::{ header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode },
    response::{ IntoResponse, Response },
    routing::{ any, get },
    Json,
    Router,
};
use log::warn;
use serde::Serialize;

pub const CHAT_PATH: &str = "/api/chat";

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
    pub max_body_bytes: usize,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(CHAT_PATH, any(chat_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn chat_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    // Buffered here rather than through an extractor so an oversized or
    // broken body still gets a relay response with CORS headers.
    let body = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => RelayBody::from_bytes(&bytes),
        Err(e) => RelayBody::Unreadable(e.to_string()),
    };

    let request = RelayRequest::new(method, origin, body);
    into_http_response(state.relay.handle(request).await)
}

fn into_http_response(resp: RelayResponse) -> Response {
    let mut http = match &resp.body {
        Some(body) => (resp.status, Json(body)).into_response(),
        None => {
            let mut empty = Response::new(Body::empty());
            *empty.status_mut() = resp.status;
            empty
        }
    };

    for (name, value) in &resp.headers {
        let parsed = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| e.to_string())
            .and_then(|n| HeaderValue::from_str(value).map(|v| (n, v)).map_err(|e| e.to_string()));
        match parsed {
            Ok((n, v)) => {
                http.headers_mut().insert(n, v);
            }
            Err(e) => {
                warn!("Dropping invalid {} header value {:?}: {}", name, value, e);
                if name.eq_ignore_ascii_case("access-control-allow-origin") {
                    http.headers_mut().insert(
                        header::ACCESS_CONTROL_ALLOW_ORIGIN,
                        HeaderValue::from_static("*")
                    );
                }
            }
        }
    }

    if resp.status == StatusCode::METHOD_NOT_ALLOWED {
        http.headers_mut().insert(header::ALLOW, HeaderValue::from_static("POST, OPTIONS"));
    }

    http
}
