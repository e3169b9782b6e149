use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

// --- Roles & Privileges ---

/// Role
///
/// The RBAC field stored on every user row, mapped to the `user_role` SQL
/// enum. Privilege flags are derived from it on demand and never persisted,
/// so the two cannot drift apart.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

/// PrivilegeFlags
///
/// Derived boolean capabilities. `elevated` is superuser-equivalent (admin),
/// `staff` is the moderation tier (moderator and above).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivilegeFlags {
    pub elevated: bool,
    pub staff: bool,
}

/// Computes the privilege flags implied by a role. Invoked at every mutation
/// and permission boundary instead of reading stored flags.
pub fn derive_privileges(role: Role) -> PrivilegeFlags {
    match role {
        Role::Admin => PrivilegeFlags {
            elevated: true,
            staff: true,
        },
        Role::Moderator => PrivilegeFlags {
            elevated: false,
            staff: true,
        },
        Role::User => PrivilegeFlags {
            elevated: false,
            staff: false,
        },
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record from the `users` table. Created inactive by the
/// signup flow and activated on confirmation-code exchange; admin-created
/// users are active immediately.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    // Gates authentication until the confirmation code has been exchanged.
    pub is_active: bool,
    // Pending confirmation code, managed by the signup flow. Never serialized.
    #[serde(skip)]
    #[sqlx(default)]
    pub confirmation_code: Option<String>,
}

/// Category
///
/// Flat lookup entity. Titles hold a weak reference to it: deleting a
/// category nulls the reference on its titles, it does not delete them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Genre
///
/// Flat lookup entity, many-to-many with Title through `title_genres`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Title
///
/// A titled work. `rating` is computed on read as the mean of associated
/// review scores (`AVG(score)`), null while no reviews exist — never zero.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct Title {
    pub id: Uuid,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub category: Option<Category>,
    pub genre: Vec<Genre>,
}

/// TitleRow
///
/// Raw database row for a title (internal use). The repository joins the
/// category and computes the rating aggregate in one query, then attaches
/// genres before handing back the public `Title`.
#[derive(Debug, Clone, FromRow)]
pub struct TitleRow {
    pub id: Uuid,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}

impl TitleRow {
    /// Assembles the API model from the joined row plus its genre list.
    pub fn into_title(self, genre: Vec<Genre>) -> Title {
        let category = match (self.category_id, self.category_name, self.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(Category { id, name, slug }),
            _ => None,
        };
        Title {
            id: self.id,
            name: self.name,
            year: self.year,
            description: self.description,
            rating: self.rating,
            category,
            genre,
        }
    }
}

/// Review
///
/// One review of a title. Lifecycle-owned by the title (cascade on delete),
/// permission-owned by `author` — the evaluator checks the latter.
/// `pub_date` is set once at creation and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Review {
    pub id: i64,
    pub title_id: Uuid,
    pub author: Uuid,
    // Loaded via a JOIN on users in the repository query.
    pub author_username: String,
    pub text: String,
    pub score: i32,
    pub pub_date: DateTime<Utc>,
}

/// Comment
///
/// One comment on a review. Same dual-ownership split as Review: cascade
/// under the review, permission under `author`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Comment {
    pub id: i64,
    pub review_id: i64,
    pub author: Uuid,
    pub author_username: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// SignupRequest
///
/// Input for POST /auth/signup. Repeating a signup for the same identity
/// regenerates and redelivers the confirmation code instead of erroring.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

/// TokenRequest
///
/// Input for POST /auth/token: exchanges a confirmation code for a token pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

/// TokenResponse
///
/// Output of a successful token exchange. Both tokens are opaque to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// CreateUserRequest
///
/// Admin-side user creation (POST /users). Role defaults to `user`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// UpdateUserRequest
///
/// Partial update payload for PATCH /users/{username} and PATCH /users/me.
/// All fields optional; only provided fields are applied.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    /// Field mask applied at the handler boundary: only elevated actors may
    /// alter `role` (including on their own record); for everyone else the
    /// field is silently dropped and the rest of the update applies.
    pub fn masked_for(mut self, flags: PrivilegeFlags) -> Self {
        if !flags.elevated {
            self.role = None;
        }
        self
    }
}

/// SlugPayload
///
/// Input for creating a Category or Genre: a display name plus a unique,
/// URL-safe slug.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct SlugPayload {
    pub name: String,
    pub slug: String,
}

/// CreateTitleRequest
///
/// Input for POST /titles. Category and genres are referenced by slug.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateTitleRequest {
    pub name: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genre: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// UpdateTitleRequest
///
/// Partial update for PATCH /titles/{title_id}. A provided `genre` list
/// replaces the existing set wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateTitleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// CreateReviewRequest
///
/// Input for posting a review. The author is taken from the authenticated
/// actor, never from the payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateReviewRequest {
    pub text: String,
    pub score: i32,
}

/// UpdateReviewRequest
///
/// Partial update for a review. `pub_date` and authorship are immutable.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateReviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
}

/// CreateCommentRequest
///
/// Input payload for posting a new comment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateCommentRequest {
    pub text: String,
}

/// UpdateCommentRequest
///
/// Partial update for a comment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateCommentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// --- Invariant checks ---
//
// Enforced at the point of mutation by handlers before storage is touched.
// Uniqueness constraints live in the database and are translated by the
// repository; everything checkable without storage lives here.

/// Review scores are integers in [0, 10] inclusive.
pub fn validate_score(score: i32) -> Result<(), ApiError> {
    if (0..=10).contains(&score) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "score must be between 0 and 10, got {score}"
        )))
    }
}

/// A title's year must not exceed the current calendar year.
pub fn validate_year(year: i32) -> Result<(), ApiError> {
    let current = Utc::now().year();
    if year > current {
        return Err(ApiError::Validation(format!(
            "year {year} is in the future (current year is {current})"
        )));
    }
    Ok(())
}

/// Slugs are non-empty, at most 50 chars, and URL-safe.
pub fn validate_slug(slug: &str) -> Result<(), ApiError> {
    if slug.is_empty() || slug.len() > 50 {
        return Err(ApiError::Validation(
            "slug must be between 1 and 50 characters".to_string(),
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::Validation(format!(
            "slug '{slug}' contains characters that are not URL-safe"
        )));
    }
    Ok(())
}

/// Usernames are non-empty and may not shadow the `me` endpoint.
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() || username.len() > 150 {
        return Err(ApiError::Validation(
            "username must be between 1 and 150 characters".to_string(),
        ));
    }
    if username == "me" {
        return Err(ApiError::Validation(
            "'me' is not a valid username".to_string(),
        ));
    }
    Ok(())
}

/// Minimal shape check; full address validation is the mail system's problem.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() || email.len() > 60 || !email.contains('@') {
        return Err(ApiError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}
