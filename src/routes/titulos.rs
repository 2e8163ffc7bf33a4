//! HTTP shell for the titulo tesouro operations. Handlers stay thin:
//! parse the body, call the service, wrap the outcome in the
//! `{"success": ...}` / `{"err": ...}` envelopes. Status mapping lives in
//! [`AppError`]'s response conversion; absent ids become 404 here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::errors::AppError;
use crate::models::Action;
use crate::services::{import_service, RangeParams};
use crate::state::AppState;
use crate::validation;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/titulo_tesouro", post(create_titulo))
        .route("/titulo_tesouro/importar", post(import_csv))
        .route(
            "/titulo_tesouro/:id",
            put(update_titulo).delete(delete_titulo),
        )
        .route("/titulo_tesouro/:id/historico", get(read_history))
        .route("/titulo_tesouro/:id/historico/venda", get(read_venda))
        .route("/titulo_tesouro/:id/historico/resgate", get(read_resgate))
}

/// Parses a raw request body into a JSON object, reproducing the shell's
/// body diagnostics: absent body, non-object body, and (for updates) an
/// empty object.
fn parse_object(raw: &str, reject_empty: bool) -> Result<Map<String, Value>, AppError> {
    if raw.trim().is_empty() {
        return Err(AppError::Validation("No request body.".to_string()));
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?;

    let Value::Object(map) = value else {
        return Err(AppError::Validation(
            "Invalid request body: expected a JSON object.".to_string(),
        ));
    };

    if reject_empty && map.is_empty() {
        return Err(AppError::Validation("Empty request body.".to_string()));
    }

    Ok(map)
}

pub async fn create_titulo(
    State(state): State<AppState>,
    body: String,
) -> Result<Response, AppError> {
    info!("POST /titulo_tesouro - Creating titulo tesouro record");

    let fields = parse_object(&body, false)?;
    let titulo = state.service.create(&fields).await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": titulo }))).into_response())
}

pub async fn delete_titulo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    info!("DELETE /titulo_tesouro/{} - Deleting titulo tesouro record", id);

    if !state.service.delete(&id).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "success": "Deleted." })))
}

pub async fn update_titulo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<Value>, AppError> {
    info!("PUT /titulo_tesouro/{} - Updating titulo tesouro record", id);

    let fields = parse_object(&body, true)?;
    if !state.service.update(&id, &fields).await? {
        return Err(AppError::NotFound);
    }

    // Echo the applied changes back together with the record id.
    let mut echo = Map::new();
    echo.insert("id".to_string(), json!(validation::validate_titulo_id(&id)?));
    echo.extend(fields);

    Ok(Json(json!({ "success": echo })))
}

pub async fn read_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Value>, AppError> {
    info!("GET /titulo_tesouro/{}/historico - Reading history", id);

    match state.service.read_history(&id, &params).await? {
        Some(report) => Ok(Json(json!({ "success": report }))),
        None => Err(AppError::NotFound),
    }
}

pub async fn read_venda(
    state: State<AppState>,
    id: Path<String>,
    params: Query<RangeParams>,
) -> Result<Json<Value>, AppError> {
    read_action_history(state, id, params, Action::Venda).await
}

pub async fn read_resgate(
    state: State<AppState>,
    id: Path<String>,
    params: Query<RangeParams>,
) -> Result<Json<Value>, AppError> {
    read_action_history(state, id, params, Action::Resgate).await
}

async fn read_action_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<RangeParams>,
    action: Action,
) -> Result<Json<Value>, AppError> {
    info!(
        "GET /titulo_tesouro/{}/historico/{} - Reading action history",
        id,
        action.key_suffix()
    );

    match state.service.read_by_action(&id, action, &params).await? {
        Some(report) => Ok(Json(json!({ "success": report }))),
        None => Err(AppError::NotFound),
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub file_path: String,
}

pub async fn import_csv(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Value>, AppError> {
    info!("POST /titulo_tesouro/importar - Importing CSV series");

    let fields = parse_object(&body, true)?;
    let request: ImportRequest = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::Validation(format!("Invalid import request: {e}")))?;

    let outcome = import_service::import_file(&state.service, &request.file_path).await?;
    Ok(Json(json!({ "success": outcome })))
}
