use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::middleware::{AdminUser, AuthUser};
use crate::models::cinema_hall::CinemaHallView;
use crate::models::{Movie, NewMovieSession, SessionSummary, TakenPlace};
use crate::services::availability;
use crate::services::sessions::{parse_show_time, SessionFilter};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movie_sessions", get(list_movie_sessions).post(create_movie_session))
        .route("/movie_sessions/{id}", get(get_movie_session))
}

/* ---------- LIST ---------- */

// Сырые строки: кривой фильтр игнорируем, а не отвечаем 400
#[derive(Debug, Deserialize)]
pub struct MovieSessionsQuery {
    pub date: Option<String>,
    pub movie: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MovieSessionListItem {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub movie_title: String,
    pub cinema_hall_name: String,
    pub cinema_hall_capacity: i64,
    pub tickets_available: i64,
}

impl From<SessionSummary> for MovieSessionListItem {
    fn from(s: SessionSummary) -> Self {
        Self {
            id: s.id,
            show_time: s.show_time,
            cinema_hall_capacity: s.capacity(),
            tickets_available: s.tickets_available(),
            movie_title: s.movie_title,
            cinema_hall_name: s.cinema_hall_name,
        }
    }
}

// GET /api/movie_sessions?date=YYYY-MM-DD&movie=<id>
async fn list_movie_sessions(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(params): Query<MovieSessionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = SessionFilter::from_query(
        params.date.as_deref(),
        params.movie.as_deref(),
        state.config.app.time_zone,
    );

    let sessions = state.store.list_movie_sessions(&filter).await?;
    let items: Vec<MovieSessionListItem> = sessions.into_iter().map(Into::into).collect();

    Ok(Json(items))
}

/* ---------- CREATE ---------- */

#[derive(Debug, Deserialize)]
pub struct CreateMovieSessionRequest {
    pub show_time: String,
    pub movie: i64,
    pub cinema_hall: i64,
}

// POST /api/movie_sessions (admin)
async fn create_movie_session(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<CreateMovieSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let show_time = parse_show_time(&req.show_time, state.config.app.time_zone).ok_or_else(|| {
        ApiError::Validation(format!("show_time {:?} is not a valid date and time", req.show_time))
    })?;

    if state.store.get_movie(req.movie).await?.is_none() {
        return Err(ApiError::Validation(format!("movie {} does not exist", req.movie)));
    }
    if state.store.get_cinema_hall(req.cinema_hall).await?.is_none() {
        return Err(ApiError::Validation(format!("cinema hall {} does not exist", req.cinema_hall)));
    }

    let session = state
        .store
        .create_movie_session(NewMovieSession {
            show_time,
            movie_id: req.movie,
            cinema_hall_id: req.cinema_hall,
        })
        .await?;

    tracing::info!("movie session {} created by {}", session.id, admin.email);
    Ok((StatusCode::CREATED, Json(session)))
}

/* ---------- DETAIL ---------- */

#[derive(Debug, Serialize)]
pub struct MovieSessionDetail {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub movie: Movie,
    pub cinema_hall: CinemaHallView,
    pub taken_places: Vec<TakenPlace>,
    pub tickets_available: i64,
}

// GET /api/movie_sessions/{id}
async fn get_movie_session(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .store
        .get_movie_session(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("movie session {} not found", id)))?;

    let movie = state
        .store
        .get_movie(session.movie_id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("movie {} of session {} is missing", session.movie_id, id)))?;
    let hall = state
        .store
        .get_cinema_hall(session.cinema_hall_id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("cinema hall {} of session {} is missing", session.cinema_hall_id, id)))?;
    let taken_places = state.store.taken_places(id).await?;

    let tickets_available = availability::tickets_available(hall.capacity(), taken_places.len() as i64);

    Ok(Json(MovieSessionDetail {
        id: session.id,
        show_time: session.show_time,
        movie,
        cinema_hall: CinemaHallView::from(&hall),
        taken_places,
        tickets_available,
    }))
}
