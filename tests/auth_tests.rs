mod common;

use axum::{extract::FromRequestParts, http::Request};
use chrono::Utc;
use common::{seed_user, test_state};
use jsonwebtoken::{EncodingKey, Header, encode};
use reviewdb::{
    auth::{AuthUser, Claims, TokenKind},
    models::Role,
};
use uuid::Uuid;

fn sign(secret: &str, sub: Uuid, exp_offset_secs: i64, kind: TokenKind) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub,
        iat: now as usize,
        exp: (now + exp_offset_secs) as usize,
        kind,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

async fn extract(state: &reviewdb::AppState, request: Request<()>) -> Result<AuthUser, reviewdb::ApiError> {
    let (mut parts, _) = request.into_parts();
    AuthUser::from_request_parts(&mut parts, state).await
}

fn bearer(token: &str) -> Request<()> {
    Request::builder()
        .uri("/users/me")
        .header("Authorization", format!("Bearer {token}"))
        .body(())
        .unwrap()
}

#[tokio::test]
async fn test_valid_access_token_resolves_actor() {
    let (state, repo, _) = test_state();
    let user = seed_user(&repo, "alice", Role::Moderator, true).await;
    let token = sign(&state.config.jwt_secret, user.id, 3600, TokenKind::Access);

    let actor = extract(&state, bearer(&token)).await.expect("must resolve");
    assert_eq!(actor.id, user.id);
    assert_eq!(actor.username, "alice");
    assert_eq!(actor.role, Role::Moderator);
}

#[tokio::test]
async fn test_missing_header_is_unauthenticated() {
    let (state, _, _) = test_state();
    let request = Request::builder().uri("/users/me").body(()).unwrap();
    assert!(extract(&state, request).await.is_err());
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let (state, repo, _) = test_state();
    let user = seed_user(&repo, "bob", Role::User, true).await;
    // Far enough in the past to clear the default validation leeway.
    let token = sign(&state.config.jwt_secret, user.id, -3600, TokenKind::Access);
    assert!(extract(&state, bearer(&token)).await.is_err());
}

#[tokio::test]
async fn test_refresh_token_is_not_a_credential() {
    let (state, repo, _) = test_state();
    let user = seed_user(&repo, "carol", Role::User, true).await;
    let token = sign(&state.config.jwt_secret, user.id, 3600, TokenKind::Refresh);
    assert!(extract(&state, bearer(&token)).await.is_err());
}

#[tokio::test]
async fn test_token_for_pending_identity_is_rejected() {
    let (state, repo, _) = test_state();
    let user = seed_user(&repo, "dave", Role::User, false).await;
    let token = sign(&state.config.jwt_secret, user.id, 3600, TokenKind::Access);
    assert!(extract(&state, bearer(&token)).await.is_err());
}

#[tokio::test]
async fn test_token_for_deleted_user_is_rejected() {
    let (state, _, _) = test_state();
    // Structurally valid token whose subject has no user row.
    let token = sign(
        &state.config.jwt_secret,
        Uuid::new_v4(),
        3600,
        TokenKind::Access,
    );
    assert!(extract(&state, bearer(&token)).await.is_err());
}

#[tokio::test]
async fn test_forged_signature_is_rejected() {
    let (state, repo, _) = test_state();
    let user = seed_user(&repo, "erin", Role::User, true).await;
    let token = sign("some-other-secret", user.id, 3600, TokenKind::Access);
    assert!(extract(&state, bearer(&token)).await.is_err());
}

#[tokio::test]
async fn test_local_header_bypass_resolves_active_users_only() {
    let (state, repo, _) = test_state();
    let active = seed_user(&repo, "frank", Role::Admin, true).await;
    let pending = seed_user(&repo, "grace", Role::User, false).await;

    let request = Request::builder()
        .uri("/users/me")
        .header("x-user-id", active.id.to_string())
        .body(())
        .unwrap();
    let actor = extract(&state, request).await.expect("bypass must resolve");
    assert_eq!(actor.role, Role::Admin);

    // A pending identity does not authenticate even through the bypass.
    let request = Request::builder()
        .uri("/users/me")
        .header("x-user-id", pending.id.to_string())
        .body(())
        .unwrap();
    assert!(extract(&state, request).await.is_err());
}
