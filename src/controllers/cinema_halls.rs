use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::middleware::{AdminUser, AuthUser};
use crate::models::cinema_hall::CinemaHallView;
use crate::models::NewCinemaHall;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/cinema_halls", get(list_cinema_halls).post(create_cinema_hall))
}

// GET /api/cinema_halls
async fn list_cinema_halls(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let halls = state.store.list_cinema_halls().await?;
    let halls: Vec<CinemaHallView> = halls.iter().map(CinemaHallView::from).collect();
    Ok(Json(halls))
}

// POST /api/cinema_halls (admin)
async fn create_cinema_hall(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<NewCinemaHall>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    let hall = state.store.create_cinema_hall(req).await?;
    Ok((StatusCode::CREATED, Json(CinemaHallView::from(&hall))))
}
