use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};

use crate::cache::CacheService;

fn digest(value: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(Sha256::digest(value.as_bytes()))
}

// В ключ попадает только хеш заголовка Authorization, не сами credentials
fn auth_key(authorization: &str) -> String {
    format!("auth:{}", digest(authorization))
}

impl CacheService {
    /// Запомнить, что заголовок прошел bcrypt-проверку против этого хеша пароля
    pub async fn remember_credentials(&self, authorization: &str, password_hash: &str) -> redis::RedisResult<()> {
        self.backend
            .set_ex(&auth_key(authorization), &digest(password_hash), self.auth_ttl_seconds)
            .await
    }

    /// true, только если заголовок уже проверялся против текущего хеша пароля.
    /// Смена пароля делает запись недействительной.
    pub async fn credentials_verified(&self, authorization: &str, password_hash: &str) -> redis::RedisResult<bool> {
        let cached = self.backend.get(&auth_key(authorization)).await?;
        Ok(cached.as_deref() == Some(digest(password_hash).as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use std::sync::Arc;

    const HEADER: &str = "Basic dXNlckBleGFtcGxlLmNvbTpzZWNyZXQ=";

    #[test]
    fn key_does_not_leak_credentials() {
        let key = auth_key(HEADER);
        assert!(key.starts_with("auth:"));
        assert!(!key.contains("dXNlck"));
        assert_eq!(key, auth_key(HEADER));
    }

    #[tokio::test]
    async fn remembered_credentials_are_bound_to_password_hash() {
        let cache = CacheService::new(Arc::new(MemoryCache::new()), 60);
        assert!(!cache.credentials_verified(HEADER, "$2b$hash-1").await.unwrap());

        cache.remember_credentials(HEADER, "$2b$hash-1").await.unwrap();
        assert!(cache.credentials_verified(HEADER, "$2b$hash-1").await.unwrap());
        assert!(!cache.credentials_verified(HEADER, "$2b$hash-2").await.unwrap());
        assert!(!cache.credentials_verified("Basic other", "$2b$hash-1").await.unwrap());
    }

    #[tokio::test]
    async fn entries_expire() {
        let cache = CacheService::new(Arc::new(MemoryCache::new()), 0);
        cache.remember_credentials(HEADER, "$2b$hash-1").await.unwrap();
        assert!(!cache.credentials_verified(HEADER, "$2b$hash-1").await.unwrap());
    }
}
