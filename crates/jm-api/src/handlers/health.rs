use axum::{extract::State, Json};
use serde_json::json;
use tokio::time::{timeout, Duration};

use crate::error::ApiError;
use crate::SharedState;

const READINESS_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn livez() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn readyz(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.readiness.load(std::sync::atomic::Ordering::SeqCst) {
        return Err(ApiError::ServiceUnavailable("shutting_down".into()));
    }

    let data_dir = &state.config.data_dir;
    let metadata = timeout(READINESS_TIMEOUT, tokio::fs::metadata(data_dir))
        .await
        .map_err(|_| ApiError::ServiceUnavailable("data_dir_timeout".into()))?
        .map_err(|err| ApiError::ServiceUnavailable(format!("data_dir_unavailable: {err}")))?;

    if !metadata.is_dir() {
        return Err(ApiError::ServiceUnavailable("data_dir_not_a_directory".into()));
    }

    Ok(Json(json!({
        "status": "ok",
        "storage": "ok",
        "application": env!("CARGO_PKG_NAME"),
    })))
}
