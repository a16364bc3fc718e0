use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::store::ContentStatus;
use crate::workflow::{ContentView, StatsSummary};

use super::model::{CreateContentRequest, SearchQuery};

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateContentRequest>,
) -> Result<(StatusCode, Json<ContentView>), AppError> {
    let item = state
        .workflow
        .create(user.id, &req.title, &req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ContentView>>, AppError> {
    let items = state.workflow.list(user.id, user.role).await?;
    Ok(Json(items))
}

pub async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ContentView>>, AppError> {
    let filter = query.into_filter()?;
    let items = state.workflow.search(user.id, user.role, filter).await?;
    Ok(Json(items))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsSummary>, AppError> {
    Ok(Json(state.workflow.stats().await?))
}

pub async fn recent(State(state): State<AppState>) -> Result<Json<Vec<ContentView>>, AppError> {
    Ok(Json(state.workflow.recent_activity().await?))
}

pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentView>, AppError> {
    let item = state
        .workflow
        .transition(id, ContentStatus::Approved)
        .await?;
    Ok(Json(item))
}

pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentView>, AppError> {
    let item = state
        .workflow
        .transition(id, ContentStatus::Rejected)
        .await?;
    Ok(Json(item))
}
