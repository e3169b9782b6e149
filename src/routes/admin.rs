use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

/// Admin Router Module
///
/// Catalog writes and user management. These routes sit behind the same
/// authentication layer as the authenticated router; elevation itself is
/// decided by the permission evaluator inside each handler, so a logged-in
/// non-admin receives 403 rather than 404.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- User management ---
        // GET/POST /users, GET/PATCH/DELETE /users/{username}
        // Full account administration, including role assignment.
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/{username}",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // --- Catalog writes ---
        // Categories and genres are flat create/delete; titles also PATCH.
        .route("/categories", post(handlers::create_category))
        .route("/categories/{slug}", delete(handlers::delete_category))
        .route("/genres", post(handlers::create_genre))
        .route("/genres/{slug}", delete(handlers::delete_genre))
        .route("/titles", post(handlers::create_title))
        .route(
            "/titles/{title_id}",
            patch(handlers::update_title).delete(handlers::delete_title),
        )
}
