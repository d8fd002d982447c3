use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::middleware::{AdminUser, AuthUser};
use crate::models::NewMovie;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/{id}", get(get_movie))
}

#[derive(Debug, Deserialize)]
pub struct MoviesQuery {
    pub title: Option<String>,
}

// GET /api/movies?title=
async fn list_movies(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(params): Query<MoviesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let title = params.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let movies = state.store.list_movies(title).await?;
    Ok(Json(movies))
}

// GET /api/movies/{id}
async fn get_movie(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = state
        .store
        .get_movie(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("movie {} not found", id)))?;
    Ok(Json(movie))
}

// POST /api/movies (admin)
async fn create_movie(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<NewMovie>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    let movie = state.store.create_movie(req).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}
