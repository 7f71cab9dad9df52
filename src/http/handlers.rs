//! Route handlers.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::forwarding::ForwardRequest;
use crate::http::request::{request_id, X_REQUEST_ID};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::registry::{ServiceConfig, ServiceInput};

pub async fn list_services(State(state): State<AppState>) -> Json<Vec<ServiceConfig>> {
    Json(state.registry.list_all())
}

pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ServiceConfig>, ApiError> {
    state
        .registry
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Service configuration not found"))
}

pub async fn create_service(
    State(state): State<AppState>,
    payload: Result<Json<ServiceInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let created = state.registry.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ServiceInput>, JsonRejection>,
) -> Result<Json<ServiceConfig>, ApiError> {
    let Json(patch) = payload?;
    Ok(Json(state.registry.update(&id, patch).await?))
}

pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.registry.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_health(
    State(state): State<AppState>,
    Path(service_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let healthy = state.probe.check_health(&service_name).await?;
    Ok(Json(json!({ "healthy": healthy })))
}

/// Body of `POST /forward/{serviceName}`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForwardBody {
    pub method: Option<String>,
    pub path: Option<String>,
    pub data: Option<Value>,
    pub headers: HashMap<String, String>,
}

impl ForwardBody {
    fn into_request(self, request_id: Option<&str>) -> ForwardRequest {
        let mut request = ForwardRequest::new(
            self.method.unwrap_or_else(|| "GET".to_string()),
            self.path.unwrap_or_default(),
        );
        request.body = self.data.filter(|d| !d.is_null());
        request.headers = self.headers;

        if let Some(id) = request_id {
            let already_set = request.headers.keys().any(|k| k.eq_ignore_ascii_case(X_REQUEST_ID));
            if !already_set {
                request.headers.insert(X_REQUEST_ID.to_string(), id.to_string());
            }
        }
        request
    }
}

pub async fn forward(
    State(state): State<AppState>,
    Path(service_name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body: ForwardBody = if body.iter().all(u8::is_ascii_whitespace) {
        ForwardBody::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(format!("Invalid forward body: {e}")))?
    };

    let request = body.into_request(request_id(&headers));
    let response = state.engine.forward(&service_name, request).await.map_err(|e| {
        tracing::error!(service = %service_name, error = %e, "Forward failed");
        ApiError::from(e)
    })?;
    Ok(Json(response.body))
}

pub async fn rpc(State(state): State<AppState>, body: Bytes) -> Response {
    let outcome = state.dispatcher.dispatch_bytes(&body).await;
    (outcome.status, Json(outcome.response)).into_response()
}

pub async fn rpc_tools(State(state): State<AppState>) -> Json<Value> {
    Json(state.dispatcher.tools())
}

pub async fn liveness() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
