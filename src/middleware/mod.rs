pub mod access;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

use crate::error::ApiError;
use crate::services::auth;
use crate::AppState;
use access::{authorize, Action, Role};

#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub is_staff: bool,
}

impl AuthUser {
    pub fn role(&self) -> Role {
        if self.is_staff {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// Пользователь с правом изменять каталог. Отказ (403) происходит до
/// разбора тела запроса.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

async fn resolve_bearer(token: &str, state: &AppState) -> Result<AuthUser, ApiError> {
    let user_id = auth::verify_token(token, &state.config.jwt).ok_or(ApiError::Unauthorized)?;
    let user = state.store.get_user(user_id).await?.ok_or(ApiError::Unauthorized)?;
    if !user.is_active {
        return Err(ApiError::Unauthorized);
    }
    Ok(AuthUser { user_id: user.id, email: user.email, is_staff: user.is_staff })
}

async fn resolve_basic(authorization: &str, encoded: &str, state: &AppState) -> Result<AuthUser, ApiError> {
    // Декодируем base64
    let decoded = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| ApiError::Unauthorized)?;
    let credentials = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

    // Разделяем email:password
    let (email, password) = credentials.split_once(':').ok_or(ApiError::Unauthorized)?;

    // пользователь читается всегда: активность и роль не кешируются
    let user = state
        .store
        .find_user_by_email(email)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    if !user.is_active || !password_matches(authorization, password, &user.password_hash, state).await {
        return Err(ApiError::Unauthorized);
    }
    Ok(AuthUser { user_id: user.id, email: user.email, is_staff: user.is_staff })
}

// Кеш позволяет пропустить bcrypt, если этот заголовок уже проверялся
// против текущего хеша пароля
async fn password_matches(authorization: &str, password: &str, password_hash: &str, state: &AppState) -> bool {
    if let Some(cache) = &state.cache {
        match cache.credentials_verified(authorization, password_hash).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => tracing::warn!("auth cache lookup failed: {:?}", e),
        }
    }

    if !auth::verify_password(password.to_string(), password_hash.to_string()).await {
        return false;
    }

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.remember_credentials(authorization, password_hash).await {
            tracing::warn!("failed to cache verified credentials: {:?}", e);
        }
    }
    true
}

// Bearer (JWT) или Basic auth extractor
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let Some(authorization) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
        else {
            return Err(ApiError::Unauthorized);
        };

        // JWT проверяется на каждом запросе, срок действия тоже
        if let Some(token) = authorization.strip_prefix("Bearer ") {
            resolve_bearer(token.trim(), state).await
        } else if let Some(encoded) = authorization.strip_prefix("Basic ") {
            resolve_basic(authorization, encoded.trim(), state).await
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize(user.role(), Action::Write)?;
        Ok(AdminUser(user))
    }
}
