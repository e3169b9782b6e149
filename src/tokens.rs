use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::{Claims, TokenKind},
    config::AppConfig,
    error::ApiError,
    models::{TokenResponse, User},
};

// 1. TokenIssuer Contract

/// TokenIssuer
///
/// Abstract contract for the trusted credential service: confirmation-code
/// generation and verification, plus access/refresh token issuance for a
/// validated identity. The signup/token-exchange flow only orchestrates state
/// transitions; all code and token mechanics stay behind this boundary.
pub trait TokenIssuer: Send + Sync {
    /// Produces a fresh confirmation code for out-of-band delivery. The flow
    /// stores the returned value against the identity.
    fn new_confirmation_code(&self) -> String;

    /// Verifies a client-submitted code against the value stored for the
    /// identity. A missing stored code never verifies.
    fn check_confirmation_code(&self, stored: Option<&str>, submitted: &str) -> bool;

    /// Issues a short-lived access token and a long-lived refresh token,
    /// both keyed to the identity.
    fn issue_pair(&self, user: &User) -> Result<TokenResponse, ApiError>;
}

/// The concrete type used to share the token issuer across the application state.
pub type TokenIssuerState = Arc<dyn TokenIssuer>;

// 2. The Real Implementation (HS256 JWTs)

/// JwtTokenIssuer
///
/// Signs HS256 JWTs with the configured secret. Access and refresh tokens
/// share the claims layout and differ in lifetime and the `kind` claim; the
/// auth extractor rejects refresh tokens presented as credentials.
#[derive(Clone)]
pub struct JwtTokenIssuer {
    secret: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl JwtTokenIssuer {
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            secret: secret.to_string(),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            config.access_ttl_secs,
            config.refresh_ttl_secs,
        )
    }

    fn sign(&self, sub: Uuid, ttl_secs: i64, kind: TokenKind) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub,
            iat: now as usize,
            exp: (now + ttl_secs) as usize,
            kind,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            tracing::error!("token signing failed: {:?}", e);
            ApiError::Internal
        })
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn new_confirmation_code(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn check_confirmation_code(&self, stored: Option<&str>, submitted: &str) -> bool {
        matches!(stored, Some(code) if code == submitted)
    }

    fn issue_pair(&self, user: &User) -> Result<TokenResponse, ApiError> {
        Ok(TokenResponse {
            access_token: self.sign(user.id, self.access_ttl_secs, TokenKind::Access)?,
            refresh_token: self.sign(user.id, self.refresh_ttl_secs, TokenKind::Refresh)?,
        })
    }
}

// 3. The Mock Implementation (For Unit Tests)

/// MockTokenIssuer
///
/// Deterministic issuer for handler tests: a fixed confirmation code and
/// predictable token strings, no signing involved.
#[derive(Clone)]
pub struct MockTokenIssuer {
    pub code: String,
}

impl MockTokenIssuer {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
        }
    }
}

impl TokenIssuer for MockTokenIssuer {
    fn new_confirmation_code(&self) -> String {
        self.code.clone()
    }

    fn check_confirmation_code(&self, stored: Option<&str>, submitted: &str) -> bool {
        matches!(stored, Some(code) if code == submitted)
    }

    fn issue_pair(&self, user: &User) -> Result<TokenResponse, ApiError> {
        Ok(TokenResponse {
            access_token: format!("access-{}", user.id),
            refresh_token: format!("refresh-{}", user.id),
        })
    }
}
