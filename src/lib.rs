use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notifier;
pub mod permissions;
pub mod repository;
pub mod tokens;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point.
pub use config::AppConfig;
pub use error::ApiError;
pub use notifier::{LogNotifier, MockNotifier, NotifierState};
pub use repository::{PostgresRepository, RepositoryState};
pub use tokens::{JwtTokenIssuer, MockTokenIssuer, TokenIssuerState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation for the service, aggregating
/// every handler decorated with `#[utoipa::path]` and every schema used in
/// request/response bodies. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::signup, handlers::issue_token,
        handlers::list_users, handlers::create_user, handlers::get_user,
        handlers::update_user, handlers::delete_user, handlers::get_me, handlers::update_me,
        handlers::list_categories, handlers::create_category, handlers::delete_category,
        handlers::list_genres, handlers::create_genre, handlers::delete_genre,
        handlers::list_titles, handlers::get_title, handlers::create_title,
        handlers::update_title, handlers::delete_title,
        handlers::list_reviews, handlers::get_review, handlers::create_review,
        handlers::update_review, handlers::delete_review,
        handlers::list_comments, handlers::get_comment, handlers::create_comment,
        handlers::update_comment, handlers::delete_comment
    ),
    components(
        schemas(
            models::User, models::Role, models::Category, models::Genre, models::Title,
            models::Review, models::Comment,
            models::SignupRequest, models::TokenRequest, models::TokenResponse,
            models::CreateUserRequest, models::UpdateUserRequest, models::SlugPayload,
            models::CreateTitleRequest, models::UpdateTitleRequest,
            models::CreateReviewRequest, models::UpdateReviewRequest,
            models::CreateCommentRequest, models::UpdateCommentRequest,
        )
    ),
    tags(
        (name = "reviewdb", description = "Content catalog and review API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe container holding all application services and
/// configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: persistence behind the `Repository` trait.
    pub repo: RepositoryState,
    /// Token issuer collaborator: confirmation codes and JWT pairs.
    pub tokens: TokenIssuerState,
    /// Notifier collaborator: out-of-band confirmation-code delivery.
    pub notifier: NotifierState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These let extractors and handlers pull individual components out of the
// shared AppState without depending on the whole of it.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for TokenIssuerState {
    fn from_ref(app_state: &AppState) -> TokenIssuerState {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for NotifierState {
    fn from_ref(app_state: &AppState) -> NotifierState {
        app_state.notifier.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the protected route groups. `AuthUser`
/// implements `FromRequestParts`, so a failed extraction (bad token, unknown
/// or inactive user) rejects the request with 401 before the handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Protected routes: authenticated actors only. Elevation for the
        // admin group is decided by the permission evaluator in handlers,
        // so denials answer 403 instead of a missing route.
        .merge(
            authenticated::authenticated_routes()
                .merge(admin::admin_routes())
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        // Apply the unified state to all routes.
        .with_state(state);

    // 3. Observability and correlation layers (outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique UUID per request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: span per request, correlated by id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes TraceLayer span creation: pulls the `x-request-id` header into
/// the span so every log line of one request is correlated by a unique id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
