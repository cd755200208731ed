use axum::{extract::State, http::StatusCode, Form, Json};
use jm_common::api::worker::{Worker, WorkerRegistration};

use crate::error::ApiError;
use crate::SharedState;

pub async fn register_worker(
    State(state): State<SharedState>,
    Form(registration): Form<WorkerRegistration>,
) -> Result<(StatusCode, Json<Worker>), ApiError> {
    let worker = state.workers.register(registration).await?;
    Ok((StatusCode::CREATED, Json(worker)))
}
