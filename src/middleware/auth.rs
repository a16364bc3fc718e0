use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppError;
use crate::store::Role;

/// The identity the gate attaches to every authenticated request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Validates the bearer token and resolves the live account. The role comes
/// from the account record, not the claim, so out-of-band role changes take
/// effect on the next request instead of requiring a re-login.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthenticated)?;

    let claims = state.identity.verify_token(token)?;
    let account_id = claims.account_id().ok_or(AppError::Unauthenticated)?;

    let account = state
        .identity
        .find_account(account_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    request.extensions_mut().insert(AuthUser {
        id: account.id,
        email: account.email,
        role: account.role,
    });
    Ok(next.run(request).await)
}

/// Runs after `auth_middleware`; authenticated non-admins get a 403.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.role == Role::Admin => Ok(next.run(request).await),
        Some(_) => Err(AppError::Forbidden),
        None => Err(AppError::Unauthenticated),
    }
}
