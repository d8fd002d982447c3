use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::middleware::AuthUser;
use crate::models::user::UserView;
use crate::models::NewUser;
use crate::services::auth;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/register", post(register))
        .route("/user/token", post(obtain_token))
        .route("/user/me", get(me))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 5, max = 128))]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

// POST /api/user/register
async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let password_hash = auth::hash_password(req.password, state.config.auth.bcrypt_cost).await?;
    let user = state
        .store
        .create_user(NewUser {
            email: req.email.trim().to_lowercase(),
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            is_staff: false,
        })
        .await?;

    tracing::info!("registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(UserView::from(user))))
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

// POST /api/user/token
async fn obtain_token(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<TokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .store
        .find_user_by_email(req.email.trim())
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !user.is_active || !auth::verify_password(req.password, user.password_hash.clone()).await {
        return Err(ApiError::Unauthorized);
    }

    let access = auth::issue_token(user.id, &state.config.jwt)?;
    Ok(Json(json!({ "access": access })))
}

// GET /api/user/me
async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .store
        .get_user(user.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(UserView::from(user)))
}
