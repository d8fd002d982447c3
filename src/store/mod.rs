//! Хранилище записей кинотеатра.
//!
//! Обработчики работают только через [`CinemaStore`]: в проде это
//! [`PgStore`] поверх пула sqlx, в тестах и при локальном запуске без
//! `DATABASE_URL` - [`MemoryStore`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    CinemaHall, Movie, MovieSession, NewCinemaHall, NewMovie, NewMovieSession, NewTicket, NewUser,
    OrderSummary, OrderWithTickets, SessionSummary, TakenPlace, User,
};
use crate::services::sessions::SessionFilter;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Нарушено ограничение уникальности (занятое место, повторный email)
    #[error("{0}")]
    Conflict(String),
    #[error("{entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: i64 },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CinemaStore: Send + Sync {
    async fn list_movies(&self, title: Option<&str>) -> StoreResult<Vec<Movie>>;
    async fn get_movie(&self, id: i64) -> StoreResult<Option<Movie>>;
    async fn create_movie(&self, movie: NewMovie) -> StoreResult<Movie>;

    async fn list_cinema_halls(&self) -> StoreResult<Vec<CinemaHall>>;
    async fn get_cinema_hall(&self, id: i64) -> StoreResult<Option<CinemaHall>>;
    async fn create_cinema_hall(&self, hall: NewCinemaHall) -> StoreResult<CinemaHall>;

    /// Sessions ordered by `show_time`, then `id`, with the sold ticket count.
    async fn list_movie_sessions(&self, filter: &SessionFilter) -> StoreResult<Vec<SessionSummary>>;
    async fn get_movie_session(&self, id: i64) -> StoreResult<Option<MovieSession>>;
    async fn create_movie_session(&self, session: NewMovieSession) -> StoreResult<MovieSession>;
    async fn taken_places(&self, movie_session_id: i64) -> StoreResult<Vec<TakenPlace>>;

    /// Creates the order and all of its tickets atomically. A ticket on an
    /// already taken place fails the whole order with [`StoreError::Conflict`].
    async fn create_order(&self, user_id: i64, tickets: &[NewTicket]) -> StoreResult<OrderWithTickets>;
    /// Newest first.
    async fn list_orders(&self, user_id: i64, limit: i64, offset: i64) -> StoreResult<Vec<OrderSummary>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn get_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
}
