use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{
        self, Category, Comment, CreateCommentRequest, CreateReviewRequest, CreateTitleRequest,
        CreateUserRequest, Genre, Review, Role, SignupRequest, SlugPayload, Title, TokenRequest,
        TokenResponse, UpdateCommentRequest, UpdateReviewRequest, UpdateTitleRequest,
        UpdateUserRequest, User, derive_privileges,
    },
    permissions::{Action, ResourceKind, check},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

// --- Shared resolution helpers ---
//
// Nested resources resolve their parent chain first and fail with NotFound
// before any permission decision is made.

async fn resolve_title(state: &AppState, title_id: Uuid) -> Result<Title, ApiError> {
    state
        .repo
        .get_title(title_id)
        .await
        .ok_or(ApiError::NotFound("title"))
}

async fn resolve_review(
    state: &AppState,
    title_id: Uuid,
    review_id: i64,
) -> Result<Review, ApiError> {
    resolve_title(state, title_id).await?;
    state
        .repo
        .get_review(title_id, review_id)
        .await
        .ok_or(ApiError::NotFound("review"))
}

async fn resolve_comment(
    state: &AppState,
    title_id: Uuid,
    review_id: i64,
    comment_id: i64,
) -> Result<Comment, ApiError> {
    resolve_review(state, title_id, review_id).await?;
    state
        .repo
        .get_comment(review_id, comment_id)
        .await
        .ok_or(ApiError::NotFound("comment"))
}

// --- Auth Flow ---

/// signup
///
/// [Public Route] Creates a pending identity and dispatches a confirmation
/// code. Repeating a signup for the same (username, email) pair regenerates
/// and redelivers the code instead of erroring; a username or email already
/// held by a different identity is rejected.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Pending identity, code dispatched", body = SignupRequest),
        (status = 400, description = "Invalid or taken username/email")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<SignupRequest>, ApiError> {
    models::validate_username(&payload.username)?;
    models::validate_email(&payload.email)?;

    let by_username = state.repo.get_user_by_username(&payload.username).await;
    let by_email = state.repo.get_user_by_email(&payload.email).await;

    let user = match (by_username, by_email) {
        // Same identity on both lookups: idempotent re-signup.
        (Some(u), Some(v)) if u.id == v.id => u,
        (None, None) => {
            state
                .repo
                .create_user(
                    CreateUserRequest {
                        username: payload.username.clone(),
                        email: payload.email.clone(),
                        first_name: None,
                        last_name: None,
                        bio: None,
                        role: Some(Role::User),
                    },
                    false,
                )
                .await?
        }
        _ => {
            return Err(ApiError::Validation(
                "username or email is already in use".to_string(),
            ));
        }
    };

    let code = state.tokens.new_confirmation_code();
    state.repo.set_confirmation_code(user.id, &code).await?;
    // Fire-and-forget: delivery failure is the notifier's problem, not the caller's.
    state.notifier.deliver_confirmation_code(&user, &code).await;

    Ok(Json(payload))
}

/// issue_token
///
/// [Public Route] Exchanges a (username, confirmation_code) pair for an
/// access/refresh token pair and activates the identity. A wrong code leaves
/// the identity pending and answers 400; an unknown username answers 404.
#[utoipa::path(
    post,
    path = "/auth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenResponse),
        (status = 400, description = "Wrong confirmation code"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .repo
        .get_user_by_username(&payload.username)
        .await
        .ok_or(ApiError::NotFound("user"))?;

    if !state
        .tokens
        .check_confirmation_code(user.confirmation_code.as_deref(), &payload.confirmation_code)
    {
        return Err(ApiError::Validation(
            "wrong confirmation code".to_string(),
        ));
    }

    state.repo.activate_user(user.id).await?;
    let pair = state.tokens.issue_pair(&user)?;
    Ok(Json(pair))
}

// --- Users (admin management + self-service `me`) ---

/// list_users
///
/// [Admin Route] Lists every user record.
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All users", body = [User]), (status = 403, description = "Not admin"))
)]
pub async fn list_users(
    actor: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    check(Some(&actor), ResourceKind::User, None, Action::List)?;
    Ok(Json(state.repo.list_users().await))
}

/// create_user
///
/// [Admin Route] Creates a user directly, active immediately (only the
/// signup flow produces pending identities).
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses((status = 201, description = "Created", body = User))
)]
pub async fn create_user(
    actor: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    check(Some(&actor), ResourceKind::User, None, Action::Create)?;
    models::validate_username(&payload.username)?;
    models::validate_email(&payload.email)?;
    let user = state.repo.create_user(payload, true).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// get_user
///
/// [Admin Route] Retrieves a user record by username.
#[utoipa::path(
    get,
    path = "/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses((status = 200, description = "Found", body = User), (status = 404, description = "Not Found"))
)]
pub async fn get_user(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<User>, ApiError> {
    check(Some(&actor), ResourceKind::User, None, Action::Retrieve)?;
    let user = state
        .repo
        .get_user_by_username(&username)
        .await
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

/// update_user
///
/// [Admin Route] Partial update of any user field, including role.
#[utoipa::path(
    patch,
    path = "/users/{username}",
    params(("username" = String, Path, description = "Username")),
    request_body = UpdateUserRequest,
    responses((status = 200, description = "Updated", body = User), (status = 404, description = "Not Found"))
)]
pub async fn update_user(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    check(Some(&actor), ResourceKind::User, None, Action::Update)?;
    if let Some(email) = &payload.email {
        models::validate_email(email)?;
    }
    let user = state
        .repo
        .update_user(&username, payload)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

/// delete_user
///
/// [Admin Route] Deletes a user; their reviews and comments cascade away.
#[utoipa::path(
    delete,
    path = "/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_user(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    check(Some(&actor), ResourceKind::User, None, Action::Delete)?;
    if state.repo.delete_user(&username).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("user"))
    }
}

/// get_me
///
/// [Authenticated Route] The actor's own record, freshly loaded so role
/// changes made by an admin since token issuance are reflected.
#[utoipa::path(
    get,
    path = "/users/me",
    responses((status = 200, description = "Own record", body = User))
)]
pub async fn get_me(
    actor: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .repo
        .get_user(actor.id)
        .await
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

/// update_me
///
/// [Authenticated Route] Self-service partial update. The field mask strips
/// `role` for non-elevated actors (moderators included) and lets the rest of
/// the update apply; an elevated actor may change any field on itself.
#[utoipa::path(
    patch,
    path = "/users/me",
    request_body = UpdateUserRequest,
    responses((status = 200, description = "Updated", body = User))
)]
pub async fn update_me(
    actor: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let flags = derive_privileges(actor.role);
    let payload = payload.masked_for(flags);
    if let Some(email) = &payload.email {
        models::validate_email(email)?;
    }
    let user = state
        .repo
        .update_user(&actor.username, payload)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

// --- Categories ---

/// list_categories
///
/// [Public Route] Lists all categories.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Categories", body = [Category]))
)]
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.repo.list_categories().await)
}

/// create_category
///
/// [Admin Route] Creates a category; the slug must be unique and URL-safe.
#[utoipa::path(
    post,
    path = "/categories",
    request_body = SlugPayload,
    responses((status = 201, description = "Created", body = Category), (status = 403, description = "Not admin"))
)]
pub async fn create_category(
    actor: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<SlugPayload>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    check(Some(&actor), ResourceKind::Category, None, Action::Create)?;
    models::validate_slug(&payload.slug)?;
    let category = state.repo.create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// delete_category
///
/// [Admin Route] Deletes a category by slug. Titles referencing it keep
/// existing with a nulled category.
#[utoipa::path(
    delete,
    path = "/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_category(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    check(Some(&actor), ResourceKind::Category, None, Action::Delete)?;
    if state.repo.delete_category(&slug).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("category"))
    }
}

// --- Genres ---

/// list_genres
///
/// [Public Route] Lists all genres.
#[utoipa::path(
    get,
    path = "/genres",
    responses((status = 200, description = "Genres", body = [Genre]))
)]
pub async fn list_genres(State(state): State<AppState>) -> Json<Vec<Genre>> {
    Json(state.repo.list_genres().await)
}

/// create_genre
///
/// [Admin Route] Creates a genre.
#[utoipa::path(
    post,
    path = "/genres",
    request_body = SlugPayload,
    responses((status = 201, description = "Created", body = Genre), (status = 403, description = "Not admin"))
)]
pub async fn create_genre(
    actor: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<SlugPayload>,
) -> Result<(StatusCode, Json<Genre>), ApiError> {
    check(Some(&actor), ResourceKind::Genre, None, Action::Create)?;
    models::validate_slug(&payload.slug)?;
    let genre = state.repo.create_genre(payload).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// delete_genre
///
/// [Admin Route] Deletes a genre by slug; link rows to titles go with it.
#[utoipa::path(
    delete,
    path = "/genres/{slug}",
    params(("slug" = String, Path, description = "Genre slug")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_genre(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    check(Some(&actor), ResourceKind::Genre, None, Action::Delete)?;
    if state.repo.delete_genre(&slug).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("genre"))
    }
}

// --- Titles ---

/// list_titles
///
/// [Public Route] Lists all titles with category, genres, and the rating
/// aggregate computed on read.
#[utoipa::path(
    get,
    path = "/titles",
    responses((status = 200, description = "Titles", body = [Title]))
)]
pub async fn list_titles(State(state): State<AppState>) -> Json<Vec<Title>> {
    Json(state.repo.list_titles().await)
}

/// get_title
///
/// [Public Route] Retrieves a single title by id.
#[utoipa::path(
    get,
    path = "/titles/{title_id}",
    params(("title_id" = Uuid, Path, description = "Title ID")),
    responses((status = 200, description = "Found", body = Title), (status = 404, description = "Not Found"))
)]
pub async fn get_title(
    State(state): State<AppState>,
    Path(title_id): Path<Uuid>,
) -> Result<Json<Title>, ApiError> {
    Ok(Json(resolve_title(&state, title_id).await?))
}

/// create_title
///
/// [Admin Route] Creates a title. The year must not lie in the future;
/// category and genre slugs must already exist.
#[utoipa::path(
    post,
    path = "/titles",
    request_body = CreateTitleRequest,
    responses((status = 201, description = "Created", body = Title), (status = 403, description = "Not admin"))
)]
pub async fn create_title(
    actor: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateTitleRequest>,
) -> Result<(StatusCode, Json<Title>), ApiError> {
    check(Some(&actor), ResourceKind::Title, None, Action::Create)?;
    models::validate_year(payload.year)?;
    let title = state.repo.create_title(payload).await?;
    Ok((StatusCode::CREATED, Json(title)))
}

/// update_title
///
/// [Admin Route] Partial update of a title.
#[utoipa::path(
    patch,
    path = "/titles/{title_id}",
    params(("title_id" = Uuid, Path, description = "Title ID")),
    request_body = UpdateTitleRequest,
    responses((status = 200, description = "Updated", body = Title), (status = 404, description = "Not Found"))
)]
pub async fn update_title(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(title_id): Path<Uuid>,
    Json(payload): Json<UpdateTitleRequest>,
) -> Result<Json<Title>, ApiError> {
    check(Some(&actor), ResourceKind::Title, None, Action::Update)?;
    if let Some(year) = payload.year {
        models::validate_year(year)?;
    }
    let title = state
        .repo
        .update_title(title_id, payload)
        .await?
        .ok_or(ApiError::NotFound("title"))?;
    Ok(Json(title))
}

/// delete_title
///
/// [Admin Route] Deletes a title; its reviews and their comments cascade.
#[utoipa::path(
    delete,
    path = "/titles/{title_id}",
    params(("title_id" = Uuid, Path, description = "Title ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_title(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(title_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    check(Some(&actor), ResourceKind::Title, None, Action::Delete)?;
    if state.repo.delete_title(title_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("title"))
    }
}

// --- Reviews ---

/// list_reviews
///
/// [Public Route] Lists a title's reviews, newest first.
#[utoipa::path(
    get,
    path = "/titles/{title_id}/reviews",
    params(("title_id" = Uuid, Path, description = "Title ID")),
    responses((status = 200, description = "Reviews", body = [Review]), (status = 404, description = "Title Not Found"))
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(title_id): Path<Uuid>,
) -> Result<Json<Vec<Review>>, ApiError> {
    resolve_title(&state, title_id).await?;
    Ok(Json(state.repo.list_reviews(title_id).await))
}

/// get_review
///
/// [Public Route] Retrieves a single review under a title.
#[utoipa::path(
    get,
    path = "/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = Uuid, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    responses((status = 200, description = "Found", body = Review), (status = 404, description = "Not Found"))
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(Uuid, i64)>,
) -> Result<Json<Review>, ApiError> {
    Ok(Json(resolve_review(&state, title_id, review_id).await?))
}

/// create_review
///
/// [Authenticated Route] Posts a review. Authorship is assigned from the
/// acting identity; the storage-level (author, title) constraint settles
/// concurrent duplicates, answering Conflict to the loser.
#[utoipa::path(
    post,
    path = "/titles/{title_id}/reviews",
    params(("title_id" = Uuid, Path, description = "Title ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Created", body = Review),
        (status = 400, description = "Score out of range or duplicate review"),
        (status = 404, description = "Title Not Found")
    )
)]
pub async fn create_review(
    actor: AuthUser,
    State(state): State<AppState>,
    Path(title_id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    resolve_title(&state, title_id).await?;
    check(Some(&actor), ResourceKind::Review, None, Action::Create)?;
    models::validate_score(payload.score)?;
    let review = state.repo.create_review(title_id, actor.id, payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// update_review
///
/// [Authenticated Route] Partial update of a review, allowed for the author,
/// staff, and admins. `pub_date` stays immutable.
#[utoipa::path(
    patch,
    path = "/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = Uuid, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated", body = Review),
        (status = 403, description = "Not the author or staff"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_review(
    actor: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(Uuid, i64)>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<Json<Review>, ApiError> {
    let review = resolve_review(&state, title_id, review_id).await?;
    check(
        Some(&actor),
        ResourceKind::Review,
        Some(review.author),
        Action::Update,
    )?;
    if let Some(score) = payload.score {
        models::validate_score(score)?;
    }
    let review = state
        .repo
        .update_review(review_id, payload)
        .await?
        .ok_or(ApiError::NotFound("review"))?;
    Ok(Json(review))
}

/// delete_review
///
/// [Authenticated Route] Deletes a review (author, staff, or admin); its
/// comments cascade away.
#[utoipa::path(
    delete,
    path = "/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = Uuid, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author or staff"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_review(
    actor: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(Uuid, i64)>,
) -> Result<StatusCode, ApiError> {
    let review = resolve_review(&state, title_id, review_id).await?;
    check(
        Some(&actor),
        ResourceKind::Review,
        Some(review.author),
        Action::Delete,
    )?;
    if state.repo.delete_review(review_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("review"))
    }
}

// --- Comments ---

/// list_comments
///
/// [Public Route] Lists the comments on a review.
#[utoipa::path(
    get,
    path = "/titles/{title_id}/reviews/{review_id}/comments",
    params(
        ("title_id" = Uuid, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    responses((status = 200, description = "Comments", body = [Comment]), (status = 404, description = "Parent Not Found"))
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(Uuid, i64)>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    resolve_review(&state, title_id, review_id).await?;
    Ok(Json(state.repo.list_comments(review_id).await))
}

/// get_comment
///
/// [Public Route] Retrieves a single comment under a review.
#[utoipa::path(
    get,
    path = "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = Uuid, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses((status = 200, description = "Found", body = Comment), (status = 404, description = "Not Found"))
)]
pub async fn get_comment(
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(Uuid, i64, i64)>,
) -> Result<Json<Comment>, ApiError> {
    Ok(Json(
        resolve_comment(&state, title_id, review_id, comment_id).await?,
    ))
}

/// create_comment
///
/// [Authenticated Route] Posts a comment on a review; authorship comes from
/// the acting identity.
#[utoipa::path(
    post,
    path = "/titles/{title_id}/reviews/{review_id}/comments",
    params(
        ("title_id" = Uuid, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    request_body = CreateCommentRequest,
    responses((status = 201, description = "Created", body = Comment), (status = 404, description = "Parent Not Found"))
)]
pub async fn create_comment(
    actor: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(Uuid, i64)>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    resolve_review(&state, title_id, review_id).await?;
    check(Some(&actor), ResourceKind::Comment, None, Action::Create)?;
    let comment = state
        .repo
        .create_comment(review_id, actor.id, &payload.text)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// update_comment
///
/// [Authenticated Route] Partial update of a comment (author, staff, admin).
#[utoipa::path(
    patch,
    path = "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = Uuid, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Updated", body = Comment),
        (status = 403, description = "Not the author or staff"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_comment(
    actor: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(Uuid, i64, i64)>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    let comment = resolve_comment(&state, title_id, review_id, comment_id).await?;
    check(
        Some(&actor),
        ResourceKind::Comment,
        Some(comment.author),
        Action::Update,
    )?;
    let comment = state
        .repo
        .update_comment(comment_id, payload)
        .await?
        .ok_or(ApiError::NotFound("comment"))?;
    Ok(Json(comment))
}

/// delete_comment
///
/// [Authenticated Route] Deletes a comment (author, staff, admin).
#[utoipa::path(
    delete,
    path = "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = Uuid, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author or staff"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment(
    actor: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(Uuid, i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let comment = resolve_comment(&state, title_id, review_id, comment_id).await?;
    check(
        Some(&actor),
        ResourceKind::Comment,
        Some(comment.author),
        Action::Delete,
    )?;
    if state.repo.delete_comment(comment_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("comment"))
    }
}
