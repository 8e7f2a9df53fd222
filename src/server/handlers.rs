use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{info, warn};

use crate::LanguageContents;
use crate::settings;

use super::models::{ErrorResponse, ServerRequest};
use super::state::ServerState;
use super::translate::{FAILURE_MESSAGE, translate_request};

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/translate", post(translate))
        .with_state(Arc::new(state))
        .layer(axum::middleware::from_fn(cors_middleware))
}

pub async fn run_server(settings: settings::Settings, addr: String) -> Result<()> {
    let app = router(ServerState::new(settings));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind server address: {}", addr))?;
    info!("server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type,authorization"),
    );
}

async fn translate(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ServerRequest>, JsonRejection>,
) -> Result<Json<Vec<LanguageContents>>, (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("rejected request body: {}", rejection.body_text());
        failure(StatusCode::INTERNAL_SERVER_ERROR, FAILURE_MESSAGE)
    })?;

    match translate_request(state.as_ref(), request).await {
        Ok(contents) => Ok(Json(contents)),
        Err(err) => Err(failure(err.status, &err.message)),
    }
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}
