#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use fake::{faker::internet::en::SafeEmail, Fake};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use cinema_api::config::{AppConfig, AuthConfig, Config, DatabaseConfig, JwtConfig, RedisConfig};
use cinema_api::models::{
    CinemaHall, Movie, MovieSession, NewCinemaHall, NewMovie, NewMovieSession, NewTicket, NewUser,
    OrderWithTickets, User,
};
use cinema_api::cache::{CacheService, MemoryCache};
use cinema_api::services::auth;
use cinema_api::store::MemoryStore;
use cinema_api::{app, AppState};

pub const PASSWORD: &str = "password";

static USER_SEQ: AtomicUsize = AtomicUsize::new(0);

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            environment: "test".into(),
            rust_log: "cinema_api=debug".into(),
            log_format: "fmt".into(),
            time_zone: Tz::UTC,
        },
        database: DatabaseConfig { url: None, pool_size: 1 },
        redis: RedisConfig { url: None, auth_cache_ttl_seconds: 60 },
        auth: AuthConfig { bcrypt_cost: 4, admin_email: None, admin_password: None },
        jwt: JwtConfig { secret: "integration-test-secret".into(), expires_in_hours: 1 },
    }
}

pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub struct TestApp {
    pub app: Router,
    pub state: Arc<AppState>,
    /// То же хранилище, что и в `state`, для изменений в обход API
    pub memory: MemoryStore,
    pub auth_cache: Option<Arc<MemoryCache>>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, None)
    }

    /// Приложение с кешем авторизации (in-memory вместо Redis)
    pub fn with_auth_cache() -> Self {
        Self::build(test_config(), Some(Arc::new(MemoryCache::new())))
    }

    fn build(config: Config, auth_cache: Option<Arc<MemoryCache>>) -> Self {
        let memory = MemoryStore::new();
        let cache = auth_cache
            .clone()
            .map(|backend| CacheService::new(backend, config.redis.auth_cache_ttl_seconds));
        let state = Arc::new(AppState { store: Arc::new(memory.clone()), cache, config });
        Self { app: app(state.clone()), state, memory, auth_cache }
    }

    /* ---------- fixtures ---------- */

    /// Пользователь с паролем [`PASSWORD`] и его access-токен.
    pub async fn create_user(&self, is_staff: bool) -> (User, String) {
        let seq = USER_SEQ.fetch_add(1, Ordering::SeqCst);
        let email: String = SafeEmail().fake();
        let password_hash = auth::hash_password(PASSWORD.into(), 4).await.unwrap();
        let user = self
            .state
            .store
            .create_user(NewUser {
                email: format!("{seq}.{email}"),
                password_hash,
                first_name: String::new(),
                last_name: String::new(),
                is_staff,
            })
            .await
            .unwrap();
        let token = auth::issue_token(user.id, &self.state.config.jwt).unwrap();
        (user, token)
    }

    pub async fn sample_movie(&self, title: &str) -> Movie {
        self.state
            .store
            .create_movie(NewMovie {
                title: title.into(),
                description: "Sample description".into(),
                duration: 90,
            })
            .await
            .unwrap()
    }

    pub async fn sample_hall(&self) -> CinemaHall {
        self.state
            .store
            .create_cinema_hall(NewCinemaHall { name: "Blue".into(), rows: 20, seats_in_row: 20 })
            .await
            .unwrap()
    }

    pub async fn sample_movie_session(&self, show_time: &str, movie: &Movie) -> MovieSession {
        let hall = self.sample_hall().await;
        self.state
            .store
            .create_movie_session(NewMovieSession {
                show_time: utc(show_time),
                movie_id: movie.id,
                cinema_hall_id: hall.id,
            })
            .await
            .unwrap()
    }

    pub async fn sample_ticket(&self, user: &User, session: &MovieSession, row: i32, seat: i32) -> OrderWithTickets {
        self.state
            .store
            .create_order(user.id, &[NewTicket { row, seat, movie_session: session.id }])
            .await
            .unwrap()
    }

    /* ---------- HTTP ---------- */

    pub async fn send(&self, method: Method, uri: &str, authorization: Option<String>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token.map(bearer), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token.map(bearer), Some(body)).await
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn basic(email: &str, password: &str) -> String {
    use base64::{engine::general_purpose, Engine as _};
    format!("Basic {}", general_purpose::STANDARD.encode(format!("{email}:{password}")))
}

pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    format!("{}?{}", path, serde_urlencoded::to_string(params).unwrap())
}

/// Элемент списка без вычисляемого поля - для сравнения с ожидаемым
pub fn without_key(value: &Value, key: &str) -> Value {
    let mut object = value.as_object().cloned().unwrap_or_default();
    object.remove(key);
    Value::Object(object)
}
