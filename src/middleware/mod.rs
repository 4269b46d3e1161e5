use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    Json,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::models::user::ROLE_ADMIN;

/// Token claims issued by the auth service. `role` may be absent in older
/// tokens and defaults to customer.
#[derive(Debug, Deserialize)]
struct Claims {
    id: i64,
    role: Option<i16>,
    #[allow(dead_code)]
    exp: usize,
}

/// Verified caller identity, extracted from the Bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: i16,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

type AuthRejection = (StatusCode, Json<Value>);

fn reject(status: StatusCode, message: &str) -> AuthRejection {
    (status, Json(json!({ "message": message })))
}

// Bearer JWT extractor
impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                reject(StatusCode::FORBIDDEN, "Access denied, no token provided")
            })?;

        // Accept both "Bearer <token>" and a bare token
        let token = auth_header.strip_prefix("Bearer ").unwrap_or(auth_header);
        if token.is_empty() {
            return Err(reject(StatusCode::FORBIDDEN, "Access denied, no token provided"));
        }

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!("token verification error: {:?}", e);
            reject(StatusCode::UNAUTHORIZED, "Invalid token")
        })?;

        Ok(AuthUser {
            user_id: decoded.claims.id,
            role: decoded.claims.role.unwrap_or(0),
        })
    }
}

/// Verified caller with the admin role. Every admin surface takes this
/// instead of [`AuthUser`].
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<Arc<crate::AppState>> for AdminUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(reject(
                StatusCode::FORBIDDEN,
                "Access denied. Admin privileges required.",
            ));
        }
        Ok(AdminUser(user))
    }
}
