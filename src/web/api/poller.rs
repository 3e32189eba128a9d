use axum::{extract::State, Json};

use crate::poller::{RequestParameters, TaskStatus};
use crate::position::PositionRecord;
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    post,
    path = "/api/poller/start",
    request_body(content = RequestParameters, description = "Omit to use the configured request"),
    responses(
        (status = 200, description = "Poller started", body = TaskStatus),
        (status = 400, description = "Invalid request parameters", body = ErrorResponse),
        (status = 409, description = "Poller already running", body = ErrorResponse)
    ),
    tag = "poller"
)]
pub async fn start(
    State(state): State<AppState>,
    body: Option<Json<RequestParameters>>,
) -> ApiResult<Json<TaskStatus>> {
    let params = match body {
        Some(Json(params)) => params,
        None => state.config.request.clone().ok_or_else(|| {
            ApiError::Validation("no request parameters given and none configured".into())
        })?,
    };

    let mut poller = state.poller.lock().await;
    let handle = poller.start(params)?;
    Ok(Json(handle.status()))
}

#[utoipa::path(
    post,
    path = "/api/poller/stop",
    responses(
        (status = 200, description = "Stop requested", body = Option<TaskStatus>)
    ),
    tag = "poller"
)]
pub async fn stop(State(state): State<AppState>) -> ApiResult<Json<Option<TaskStatus>>> {
    let poller = state.poller.lock().await;
    poller.stop();
    Ok(Json(poller.current().map(|h| h.status())))
}

#[utoipa::path(
    get,
    path = "/api/poller/status",
    responses(
        (status = 200, description = "Status of the latest poll task", body = Option<TaskStatus>)
    ),
    tag = "poller"
)]
pub async fn status(State(state): State<AppState>) -> ApiResult<Json<Option<TaskStatus>>> {
    let poller = state.poller.lock().await;
    Ok(Json(poller.current().map(|h| h.status())))
}

#[utoipa::path(
    get,
    path = "/api/position",
    responses(
        (status = 200, description = "Latest published position", body = Option<PositionRecord>)
    ),
    tag = "poller"
)]
pub async fn position(State(state): State<AppState>) -> ApiResult<Json<Option<PositionRecord>>> {
    Ok(Json(state.latest_position()))
}
