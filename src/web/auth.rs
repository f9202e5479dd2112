use std::time::{Duration, SystemTime, UNIX_EPOCH};

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher, SaltString,
    },
    Argon2, PasswordVerifier,
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{User, UserId};

use super::AppState;

/// Issues and validates the two token kinds the service uses: logged-in
/// session tokens (subject = user id) and short-lived pending-signup tokens
/// carrying the OAuth-provided identity until a username is chosen.
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    session_ttl: Duration,
    pending_ttl: Duration,
}

#[derive(Debug)]
pub enum AuthError {
    Unauthorized,
    InvalidCredentials,
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    code: u16,
    message: String,
}

const KIND_SESSION: &str = "session";
const KIND_PENDING: &str = "pending";
const KIND_OAUTH_STATE: &str = "oauth_state";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id for session tokens, OAuth email for pending tokens
    sub: String,
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    exp: usize,
    iat: usize,
}

/// Identity held between the OAuth callback and username submission.
#[derive(Debug, Clone)]
pub struct PendingSignup {
    pub email: String,
    pub name: String,
}

impl AuthManager {
    pub fn new(secret: &[u8], session_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            session_ttl,
            // The awaiting-username state should not outlive a short form fill
            pending_ttl: Duration::from_secs(15 * 60),
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {e}")))
    }

    pub fn verify_password(&self, hash: &str, candidate: &str) -> Result<(), AuthError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid stored password hash: {e}")))?;
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .map_err(|err| match err {
                PasswordHashError::Password => AuthError::InvalidCredentials,
                other => AuthError::Internal(format!("Password verification failed: {other}")),
            })
    }

    pub fn issue_session(&self, user_id: UserId) -> Result<String, AuthError> {
        self.issue(user_id.to_string(), KIND_SESSION, None, self.session_ttl)
    }

    pub fn issue_pending(&self, email: &str, name: &str) -> Result<String, AuthError> {
        self.issue(
            email.to_string(),
            KIND_PENDING,
            Some(name.to_string()),
            self.pending_ttl,
        )
    }

    /// Signed nonce sent as the OAuth `state` parameter. The provider echoes
    /// it back on the callback, proving the flow started here.
    pub fn issue_oauth_state(&self) -> Result<String, AuthError> {
        self.issue(
            Uuid::new_v4().to_string(),
            KIND_OAUTH_STATE,
            None,
            self.pending_ttl,
        )
    }

    pub fn verify_oauth_state(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.decode(token)?;
        if claims.kind != KIND_OAUTH_STATE {
            return Err(AuthError::Unauthorized);
        }
        Ok(())
    }

    fn issue(
        &self,
        sub: String,
        kind: &str,
        name: Option<String>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::Internal("System clock is before UNIX_EPOCH".into()))?;
        let claims = Claims {
            sub,
            kind: kind.to_string(),
            name,
            iat: now.as_secs() as usize,
            exp: (now + ttl).as_secs() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a session token and return its user id.
    pub fn session_user(&self, token: &str) -> Result<UserId, AuthError> {
        let claims = self.decode(token)?;
        if claims.kind != KIND_SESSION {
            return Err(AuthError::Unauthorized);
        }
        Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Unauthorized)
    }

    /// Validate a pending-signup token and return the held identity.
    pub fn pending_identity(&self, token: &str) -> Result<PendingSignup, AuthError> {
        let claims = self.decode(token)?;
        if claims.kind != KIND_PENDING {
            return Err(AuthError::Unauthorized);
        }
        Ok(PendingSignup {
            email: claims.sub,
            name: claims.name.unwrap_or_default(),
        })
    }

    fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
                | jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_) => {
                    AuthError::Unauthorized
                }
                other => AuthError::Internal(format!("Failed to validate token: {other:?}")),
            })
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "auth failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        let body = Json(AuthErrorBody {
            code: status.as_u16(),
            message,
        });
        (status, body).into_response()
    }
}

/// Extractor for the authenticated user behind a Bearer session token.
pub struct CurrentUser(pub User);

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    let mut pieces = header.splitn(2, ' ');
    let (Some(scheme), Some(token)) = (pieces.next(), pieces.next()) else {
        return Err(AuthError::Unauthorized);
    };
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::Unauthorized);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Unauthorized);
    }
    Ok(token)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user_id = state.auth.session_user(token)?;
        let user = state
            .service
            .user(user_id)
            .await
            .map_err(|_| AuthError::Unauthorized)?;
        Ok(CurrentUser(user))
    }
}
