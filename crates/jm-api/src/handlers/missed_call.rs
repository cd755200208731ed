use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Form, Json,
};
use jm_common::api::availability::{MissedCallResponse, MissedCallStatus};
use jm_common::api::missed_call::extract_caller_number;
use tracing::info;

use crate::error::ApiError;
use crate::SharedState;

/// Telephony webhook: a missed call from a registered worker marks them
/// available. Accepts the number as form or query parameters.
pub async fn missed_call(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
    form: Option<Form<HashMap<String, String>>>,
) -> Result<Json<MissedCallResponse>, ApiError> {
    let form = form.map(|Form(params)| params).unwrap_or_default();

    let phone_number = extract_caller_number(&form, &query)
        .ok_or_else(|| ApiError::BadRequest("no caller phone number in request".into()))?;

    let worker = state
        .workers
        .find_by_phone(&phone_number)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("phone number not registered: {phone_number}")))?;

    let event = state
        .ledger
        .record_availability(&phone_number, None)
        .await?;

    info!(worker_id = worker.id, "worker_marked_available");

    Ok(Json(MissedCallResponse {
        status: MissedCallStatus::Available,
        worker_id: worker.id,
        phone_number: event.phone_number,
        recorded_at: event.timestamp,
    }))
}
