use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use diesel::prelude::*;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::shared::schema::employees;
use crate::shared::state::AppState;

pub const SESSION_COOKIE: &str = "accessToken";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub name: String,
    pub exp: i64,
}

/// Authenticated caller identity, decoded from the session cookie.
/// Handlers take this as an argument instead of reading identity from
/// request bodies.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub employee_id: Uuid,
    pub username: String,
    pub role: String,
    pub name: String,
}

impl AuthSession {
    pub fn is_manager(&self) -> bool {
        self.role == "manager"
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthSession {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))?;

        let token = cookies
            .get(SESSION_COOKIE)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))?;

        let claims = verify_token(token.value(), &state.config.auth.jwt_secret)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))?;

        Ok(AuthSession {
            employee_id: claims.sub,
            username: claims.username,
            role: claims.role,
            name: claims.name,
        })
    }
}

pub fn hash_password(plain: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(plain.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(plain: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

pub fn sign_token(
    claims: &SessionClaims,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: SessionUser,
    pub redirect_url: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Missing credentials".to_string()));
    }

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let row: Option<(Uuid, String, String, Option<String>)> = employees::table
        .filter(employees::username.eq(&req.username))
        .filter(employees::is_active.eq(true))
        .select((
            employees::id,
            employees::name,
            employees::role,
            employees::password_hash,
        ))
        .first(&mut conn)
        .optional()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    let Some((id, name, role, Some(hash))) = row else {
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()));
    };

    if !verify_password(&req.password, &hash) {
        warn!("Failed login attempt for {}", req.username);
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()));
    }

    let claims = SessionClaims {
        sub: id,
        username: req.username.clone(),
        role: role.clone(),
        name: name.clone(),
        exp: (Utc::now() + Duration::hours(state.config.auth.session_hours)).timestamp(),
    };

    let token = sign_token(&claims, &state.config.auth.jwt_secret)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Token error: {e}")))?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::hours(state.config.auth.session_hours))
        .build();
    cookies.add(cookie);

    let redirect_url = if role == "manager" {
        "/admin/dashboard".to_string()
    } else {
        "/sale/dashboard".to_string()
    };

    Ok(Json(LoginResponse {
        success: true,
        user: SessionUser {
            id,
            name,
            username: req.username,
            role,
        },
        redirect_url,
    }))
}

pub async fn logout(cookies: Cookies) -> StatusCode {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookies.remove(cookie);
    StatusCode::NO_CONTENT
}

pub async fn me(session: AuthSession) -> Json<SessionUser> {
    Json(SessionUser {
        id: session.employee_id,
        name: session.name,
        username: session.username,
        role: session.role,
    })
}

pub fn configure_auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_token_roundtrip() {
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            username: "nida".to_string(),
            role: "sales".to_string(),
            name: "Nida Somjai".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = sign_token(&claims, "test-secret").unwrap();
        let decoded = verify_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, "sales");
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            username: "nida".to_string(),
            role: "sales".to_string(),
            name: "Nida Somjai".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = sign_token(&claims, "test-secret").unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_token_rejects_expired() {
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            username: "nida".to_string(),
            role: "sales".to_string(),
            name: "Nida Somjai".to_string(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = sign_token(&claims, "test-secret").unwrap();
        assert!(verify_token(&token, "test-secret").is_err());
    }
}
