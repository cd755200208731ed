use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use chrono::{DateTime, Utc};
use jm_common::api::contractor::{ContractorAccount, ContractorRegistration, LoginRequest};
use serde::Serialize;
use tracing::info;

use crate::auth::{issue_session_token, logout_cookie, session_cookie};
use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub contractor: ContractorAccount,
    pub expires_at: DateTime<Utc>,
    pub redirect: &'static str,
}

pub async fn register_contractor(
    State(state): State<SharedState>,
    Form(registration): Form<ContractorRegistration>,
) -> Result<(StatusCode, Json<ContractorAccount>), ApiError> {
    let account = state.contractors.register(registration).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn login(
    State(state): State<SharedState>,
    Form(request): Form<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let contractor = state
        .contractors
        .authenticate(&request.username, &request.password)
        .await?;

    let session = &state.config.session;
    let (token, expires_at) = issue_session_token(session, &contractor.username)?;
    let cookie = session_cookie(session, token);

    info!(username = %contractor.username, "contractor_logged_in");

    Ok((
        [(SET_COOKIE, cookie.to_string())],
        Json(LoginResponse {
            contractor,
            expires_at,
            redirect: "/dashboard",
        }),
    ))
}

pub async fn logout(State(state): State<SharedState>) -> impl IntoResponse {
    let cookie = logout_cookie(&state.config.session);
    (
        [(SET_COOKIE, cookie.to_string())],
        Json(serde_json::json!({ "status": "logged_out", "redirect": "/" })),
    )
}
