use crate::infra::{AppState, EngineFacade};
use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use mortgage_rules::engine::domain::{Rule, RuleCategory, RuleId};
use mortgage_rules::engine::facade::{error_envelope, tool_specs, ToolError};
use mortgage_rules::engine::EngineError;
use mortgage_rules::error::engine_status;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const DEADLINE_HEADER: &str = "x-evaluation-deadline-ms";

pub(crate) fn engine_router(facade: Arc<EngineFacade>) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/tools", axum::routing::get(list_tools))
        .route("/api/v1/tools/:name", axum::routing::post(call_tool))
        .route("/api/v1/rules", axum::routing::post(upsert_rule))
        .route(
            "/api/v1/rules/:category/:id",
            axum::routing::delete(delete_rule),
        )
        .layer(Extension(facade))
}

pub(crate) async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn list_tools() -> Json<Value> {
    Json(json!({ "tools": tool_specs() }))
}

fn deadline_from(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(DEADLINE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.parse::<u64>().ok())
        .map(Duration::from_millis)
}

pub(crate) async fn call_tool(
    Extension(facade): Extension<Arc<EngineFacade>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let deadline = deadline_from(&headers);
    match facade.dispatch(&name, &payload, deadline).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(ToolError::UnknownTool(name)) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown tool '{name}'") })),
        )
            .into_response(),
        Err(ToolError::Engine(error)) => {
            (engine_status(&error), Json(error_envelope(&error))).into_response()
        }
    }
}

pub(crate) async fn upsert_rule(
    Extension(facade): Extension<Arc<EngineFacade>>,
    Json(rule): Json<Rule>,
) -> impl IntoResponse {
    let service = facade.service();
    if let Err(error) = service.repository().upsert_rule(&rule) {
        let error = EngineError::RepositoryUnavailable(error.to_string());
        return (engine_status(&error), Json(error_envelope(&error))).into_response();
    }
    service.invalidate_category(rule.category);

    (
        StatusCode::OK,
        Json(json!({
            "status": "stored",
            "id": rule.id,
            "category": rule.category,
        })),
    )
        .into_response()
}

pub(crate) async fn delete_rule(
    Extension(facade): Extension<Arc<EngineFacade>>,
    Path((category, id)): Path<(String, String)>,
) -> impl IntoResponse {
    let Some(category) = RuleCategory::parse(&category) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("unknown category '{category}'") })),
        )
            .into_response();
    };

    let service = facade.service();
    let removed = match service.repository().remove_rule(&RuleId::new(id.clone())) {
        Ok(removed) => removed,
        Err(error) => {
            let error = EngineError::RepositoryUnavailable(error.to_string());
            return (engine_status(&error), Json(error_envelope(&error))).into_response();
        }
    };

    if !removed {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no rule '{id}'") })),
        )
            .into_response();
    }

    service.invalidate_category(category);
    (StatusCode::OK, Json(json!({ "status": "removed", "id": id }))).into_response()
}
