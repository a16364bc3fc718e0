use axum::{
    extract::{Json, State},
    http::StatusCode,
};

use crate::AppState;
use crate::error::AppError;

use super::model::{AuthResponse, LoginRequest, SignupRequest};

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let session = state
        .identity
        .register(&req.email, &req.password, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let session = state.identity.authenticate(&req.email, &req.password).await?;
    Ok(Json(session.into()))
}
