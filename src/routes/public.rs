use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints accessible to any client, anonymous or logged-in. All reads on
/// catalog and review content are public by the permission rules; the two
/// auth endpoints are the entry gates of the signup flow.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness endpoint for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/signup — create or re-trigger a pending identity.
        .route("/auth/signup", post(handlers::signup))
        // POST /auth/token — exchange a confirmation code for a token pair.
        .route("/auth/token", post(handlers::issue_token))
        // --- Catalog reads ---
        .route("/categories", get(handlers::list_categories))
        .route("/genres", get(handlers::list_genres))
        .route("/titles", get(handlers::list_titles))
        .route("/titles/{title_id}", get(handlers::get_title))
        // --- Review & comment reads (nested, parent resolved first) ---
        .route("/titles/{title_id}/reviews", get(handlers::list_reviews))
        .route(
            "/titles/{title_id}/reviews/{review_id}",
            get(handlers::get_review),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments",
            get(handlers::list_comments),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
            get(handlers::get_comment),
        )
}
