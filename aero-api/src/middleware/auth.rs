use aero_core::account::{Actor, Role};
use aero_core::{CoreError, CoreResult};
use aero_search::AccessPolicy;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    pub fn new(user_id: &str, email: &str, role: Role, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            exp: expires_at.timestamp().max(0) as usize,
        }
    }

    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.sub.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Signs an HS256 token for `user_id` valid for the configured lifetime.
pub fn issue_token(
    auth: &AuthConfig,
    user_id: &str,
    email: &str,
    role: Role,
) -> CoreResult<(String, DateTime<Utc>)> {
    let expires_at = Utc::now() + Duration::seconds(auth.expiration as i64);
    let claims = Claims::new(user_id, email, role, expires_at);
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| CoreError::InternalError(format!("token encoding failed: {}", e)))?;
    Ok((token, expires_at))
}

pub fn verify_token(auth: &AuthConfig, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

// ============================================================================
// Authentication Middleware
// ============================================================================

/// Decodes the bearer token when one is sent and stores its claims in the
/// request extensions. Requests without a valid token pass through
/// anonymously; handlers that need a user reject them via the extractors.
pub async fn authenticate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    if let Ok(TypedHeader(Authorization(bearer))) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &state).await
    {
        match verify_token(&state.auth, bearer.token()) {
            Ok(claims) => {
                parts.extensions.insert(claims);
            }
            Err(err) => debug!(error = %err, "ignoring invalid bearer token"),
        }
    }

    next.run(Request::from_parts(parts, body)).await
}

// ============================================================================
// Extractors
// ============================================================================

/// The caller's claims, if authenticated.
#[derive(Debug, Clone)]
pub struct Requester(pub Option<Claims>);

impl Requester {
    pub fn email(&self) -> Option<&str> {
        self.0.as_ref().map(|claims| claims.email.as_str())
    }
}

impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Requester(parts.extensions.get::<Claims>().cloned()))
    }
}

#[derive(Debug, Clone)]
pub struct CurrentUser(pub Actor);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .map(|claims| CurrentUser(claims.actor()))
            .ok_or_else(|| AppError::AuthenticationError("authentication required".to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct AdminUser(pub Actor);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(actor) = CurrentUser::from_request_parts(parts, state).await?;
        if !actor.is_admin() {
            return Err(AppError::AuthorizationError("admin access required".to_string()));
        }
        Ok(AdminUser(actor))
    }
}

/// The caller's data-source policy, resolved once from the whitelist.
#[derive(Debug, Clone)]
pub struct Policy(pub AccessPolicy);

impl FromRequestParts<AppState> for Policy {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(policy) = parts.extensions.get::<AccessPolicy>() {
            return Ok(Policy(policy.clone()));
        }
        let email = parts.extensions.get::<Claims>().map(|claims| claims.email.clone());
        let policy = state.resolver.policy_for(email.as_deref()).await;
        parts.extensions.insert(policy.clone());
        Ok(Policy(policy))
    }
}
