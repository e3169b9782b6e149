use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Authenticated Router Module
///
/// Routes for any actor who passed the authentication layer. Ownership and
/// staff checks for review/comment mutations happen in the handlers via the
/// permission evaluator, against the resolved resource owner.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/PATCH /users/me
        // Self-service record access. The PATCH applies the role field mask:
        // only elevated actors may change their own role.
        .route(
            "/users/me",
            get(handlers::get_me).patch(handlers::update_me),
        )
        // --- Reviews ---
        // POST /titles/{title_id}/reviews
        // One review per author per title, enforced at the storage level.
        .route("/titles/{title_id}/reviews", post(handlers::create_review))
        // PATCH/DELETE /titles/{title_id}/reviews/{review_id}
        // Author, moderator, or admin.
        .route(
            "/titles/{title_id}/reviews/{review_id}",
            patch(handlers::update_review).delete(handlers::delete_review),
        )
        // --- Comments ---
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments",
            post(handlers::create_comment),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
            patch(handlers::update_comment).delete(handlers::delete_comment),
        )
}
