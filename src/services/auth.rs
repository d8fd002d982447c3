//! Пароли (bcrypt) и access-токены (JWT).

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{AuthConfig, JwtConfig};
use crate::error::ApiError;
use crate::models::NewUser;
use crate::store::CinemaStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// user id
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn issue_token(user_id: i64, config: &JwtConfig) -> Result<String, ApiError> {
    let now = Utc::now();
    let exp = now + chrono::Duration::hours(config.expires_in_hours);
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
}

/// Id пользователя из валидного, непросроченного токена.
pub fn verify_token(token: &str, config: &JwtConfig) -> Option<i64> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .and_then(|data| data.claims.sub.parse().ok())
}

// bcrypt нагружает CPU - уводим с async-потоков
pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))
}

pub async fn verify_password(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

/// Создает администратора из ADMIN_EMAIL / ADMIN_PASSWORD, если его еще нет.
pub async fn ensure_admin(store: &dyn CinemaStore, config: &AuthConfig) -> Result<(), ApiError> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    if store.find_user_by_email(email).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password(password.clone(), config.bcrypt_cost).await?;
    let admin = store
        .create_user(NewUser {
            email: email.to_lowercase(),
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            is_staff: true,
        })
        .await?;
    info!("Created admin user {} (id {})", admin.email, admin.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt() -> JwtConfig {
        JwtConfig { secret: "test-secret".into(), expires_in_hours: 1 }
    }

    #[test]
    fn issued_token_resolves_to_user() {
        let token = issue_token(42, &jwt()).unwrap();
        assert_eq!(verify_token(&token, &jwt()), Some(42));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(42, &jwt()).unwrap();
        let other = JwtConfig { secret: "other".into(), expires_in_hours: 1 };
        assert_eq!(verify_token(&token, &other), None);
        assert_eq!(verify_token("garbage", &jwt()), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let expired = JwtConfig { secret: "test-secret".into(), expires_in_hours: -2 };
        let token = issue_token(42, &expired).unwrap();
        assert_eq!(verify_token(&token, &jwt()), None);
    }

    #[tokio::test]
    async fn password_round_trip() {
        let hash = hash_password("secret-pass".into(), 4).await.unwrap();
        assert!(verify_password("secret-pass".into(), hash.clone()).await);
        assert!(!verify_password("wrong".into(), hash).await);
    }
}
