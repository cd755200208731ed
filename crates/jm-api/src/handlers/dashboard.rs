use axum::{
    extract::{Path, State},
    Json,
};
use jm_common::api::contractor::ContractorAccount;
use jm_common::api::dashboard::{DashboardResponse, HireResponse, HireStatus};
use jm_common::matching::available_workers;

use crate::auth::ContractorSession;
use crate::error::ApiError;
use crate::SharedState;

async fn current_contractor(
    state: &SharedState,
    session: &ContractorSession,
) -> Result<ContractorAccount, ApiError> {
    state
        .contractors
        .find(&session.username)
        .await
        .ok_or_else(|| ApiError::Unauthorized(format!("unknown contractor: {}", session.username)))
}

pub async fn dashboard(
    State(state): State<SharedState>,
    session: ContractorSession,
) -> Result<Json<DashboardResponse>, ApiError> {
    let contractor = current_contractor(&state, &session).await?;
    let (available, registered) = available_workers(&state.workers, &state.ledger).await;

    Ok(Json(DashboardResponse {
        contractor,
        available_workers: available,
        registered_workers: registered,
    }))
}

pub async fn hire(
    State(state): State<SharedState>,
    session: ContractorSession,
    Path(worker_id): Path<u64>,
) -> Result<Json<HireResponse>, ApiError> {
    let contractor = current_contractor(&state, &session).await?;
    let worker = state
        .workers
        .find_by_id(worker_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("worker not found: {worker_id}")))?;

    let notice = state.notifier.notify(&contractor, &worker);

    Ok(Json(HireResponse {
        status: HireStatus::Notified,
        worker_id: worker.id,
        worker_name: worker.name,
        message: notice.message,
    }))
}
