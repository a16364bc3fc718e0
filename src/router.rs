use axum::{
    Router,
    routing::{get, post, put},
};

use crate::AppState;
use crate::middleware::{auth_middleware, log_errors, require_admin};
use crate::routes;

/// Assembles the full route tree: public auth routes, token-gated content
/// routes, and an inner admin-only layer for review operations.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login));

    let user_routes = Router::new()
        .route(
            "/content",
            post(routes::content::create).get(routes::content::list),
        )
        .route("/content/search", get(routes::content::search));

    let admin_routes = Router::new()
        .route("/content/stats", get(routes::content::stats))
        .route("/content/recent", get(routes::content::recent))
        .route("/content/{id}/approve", put(routes::content::approve))
        .route("/content/{id}/reject", put(routes::content::reject))
        .layer(axum::middleware::from_fn(require_admin));

    let protected_routes = user_routes.merge(admin_routes).layer(
        axum::middleware::from_fn_with_state(state.clone(), auth_middleware),
    );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
