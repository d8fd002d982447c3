use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{CinemaStore, StoreError, StoreResult};
use crate::database::Database;
use crate::models::{
    CinemaHall, Movie, MovieSession, NewCinemaHall, NewMovie, NewMovieSession, NewTicket, NewUser,
    Order, OrderSummary, OrderTicket, OrderWithTickets, SessionBrief, SessionSummary, TakenPlace,
    Ticket, User,
};
use crate::services::sessions::SessionFilter;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool.clone() }
    }
}

// unique violation -> Conflict, foreign key -> MissingReference, остальное как есть
fn map_write_error(e: sqlx::Error, conflict: impl FnOnce() -> String, entity: &'static str, id: i64) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(conflict());
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::MissingReference { entity, id };
        }
    }
    StoreError::Database(e)
}

#[derive(FromRow)]
struct OrderTicketRow {
    order_id: i64,
    created_at: DateTime<Utc>,
    ticket_id: i64,
    row: i32,
    seat: i32,
    movie_session_id: i64,
    show_time: DateTime<Utc>,
    movie_title: String,
    cinema_hall_name: String,
}

#[async_trait]
impl CinemaStore for PgStore {
    /* ---------- MOVIES ---------- */

    async fn list_movies(&self, title: Option<&str>) -> StoreResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, duration
             FROM movies
             WHERE ($1::text IS NULL OR strpos(lower(title), lower($1)) > 0)
             ORDER BY id",
        )
        .bind(title)
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    async fn get_movie(&self, id: i64) -> StoreResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, duration FROM movies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(movie)
    }

    async fn create_movie(&self, movie: NewMovie) -> StoreResult<Movie> {
        let movie = sqlx::query_as::<_, Movie>(
            "INSERT INTO movies (title, description, duration)
             VALUES ($1, $2, $3)
             RETURNING id, title, description, duration",
        )
        .bind(movie.title)
        .bind(movie.description)
        .bind(movie.duration)
        .fetch_one(&self.pool)
        .await?;
        Ok(movie)
    }

    /* ---------- CINEMA HALLS ---------- */

    async fn list_cinema_halls(&self) -> StoreResult<Vec<CinemaHall>> {
        let halls = sqlx::query_as::<_, CinemaHall>(
            "SELECT id, name, rows, seats_in_row FROM cinema_halls ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(halls)
    }

    async fn get_cinema_hall(&self, id: i64) -> StoreResult<Option<CinemaHall>> {
        let hall = sqlx::query_as::<_, CinemaHall>(
            "SELECT id, name, rows, seats_in_row FROM cinema_halls WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(hall)
    }

    async fn create_cinema_hall(&self, hall: NewCinemaHall) -> StoreResult<CinemaHall> {
        let hall = sqlx::query_as::<_, CinemaHall>(
            "INSERT INTO cinema_halls (name, rows, seats_in_row)
             VALUES ($1, $2, $3)
             RETURNING id, name, rows, seats_in_row",
        )
        .bind(hall.name)
        .bind(hall.rows)
        .bind(hall.seats_in_row)
        .fetch_one(&self.pool)
        .await?;
        Ok(hall)
    }

    /* ---------- MOVIE SESSIONS ---------- */

    async fn list_movie_sessions(&self, filter: &SessionFilter) -> StoreResult<Vec<SessionSummary>> {
        // дата сравнивается в зоне сервера, как и при выдаче фильтра
        let sessions = sqlx::query_as::<_, SessionSummary>(
            r#"
            SELECT ms.id, ms.show_time,
                   ms.movie_id, m.title AS movie_title,
                   ms.cinema_hall_id, ch.name AS cinema_hall_name,
                   ch.rows, ch.seats_in_row,
                   (SELECT COUNT(*) FROM tickets t WHERE t.movie_session_id = ms.id) AS tickets_sold
            FROM movie_sessions ms
            JOIN movies m ON m.id = ms.movie_id
            JOIN cinema_halls ch ON ch.id = ms.cinema_hall_id
            WHERE ($1::date IS NULL OR (ms.show_time AT TIME ZONE $2)::date = $1)
              AND ($3::bigint IS NULL OR ms.movie_id = $3)
            ORDER BY ms.show_time, ms.id
            "#,
        )
        .bind(filter.date)
        .bind(filter.time_zone.name())
        .bind(filter.movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    async fn get_movie_session(&self, id: i64) -> StoreResult<Option<MovieSession>> {
        let session = sqlx::query_as::<_, MovieSession>(
            "SELECT id, show_time, movie_id, cinema_hall_id FROM movie_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn create_movie_session(&self, session: NewMovieSession) -> StoreResult<MovieSession> {
        sqlx::query_as::<_, MovieSession>(
            "INSERT INTO movie_sessions (show_time, movie_id, cinema_hall_id)
             VALUES ($1, $2, $3)
             RETURNING id, show_time, movie_id, cinema_hall_id",
        )
        .bind(session.show_time)
        .bind(session.movie_id)
        .bind(session.cinema_hall_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                || "movie session already exists".to_string(),
                "movie or cinema hall",
                session.movie_id,
            )
        })
    }

    async fn taken_places(&self, movie_session_id: i64) -> StoreResult<Vec<TakenPlace>> {
        let places = sqlx::query_as::<_, TakenPlace>(
            "SELECT row, seat FROM tickets WHERE movie_session_id = $1 ORDER BY row, seat",
        )
        .bind(movie_session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(places)
    }

    /* ---------- ORDERS ---------- */

    async fn create_order(&self, user_id: i64, tickets: &[NewTicket]) -> StoreResult<OrderWithTickets> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (user_id) VALUES ($1) RETURNING id, user_id, created_at",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut created = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            // при ошибке транзакция откатывается на drop
            let row = sqlx::query_as::<_, Ticket>(
                "INSERT INTO tickets (order_id, movie_session_id, row, seat)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, order_id, movie_session_id, row, seat",
            )
            .bind(order.id)
            .bind(ticket.movie_session)
            .bind(ticket.row)
            .bind(ticket.seat)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                map_write_error(
                    e,
                    || {
                        format!(
                            "row {} seat {} is already taken for movie session {}",
                            ticket.row, ticket.seat, ticket.movie_session
                        )
                    },
                    "movie session",
                    ticket.movie_session,
                )
            })?;
            created.push(row);
        }

        tx.commit().await?;

        Ok(OrderWithTickets {
            id: order.id,
            created_at: order.created_at,
            tickets: created,
        })
    }

    async fn list_orders(&self, user_id: i64, limit: i64, offset: i64) -> StoreResult<Vec<OrderSummary>> {
        let rows = sqlx::query_as::<_, OrderTicketRow>(
            r#"
            SELECT o.id AS order_id, o.created_at,
                   t.id AS ticket_id, t.row, t.seat, t.movie_session_id,
                   ms.show_time, m.title AS movie_title, ch.name AS cinema_hall_name
            FROM (
                SELECT id, created_at FROM orders
                WHERE user_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2 OFFSET $3
            ) o
            JOIN tickets t ON t.order_id = o.id
            JOIN movie_sessions ms ON ms.id = t.movie_session_id
            JOIN movies m ON m.id = ms.movie_id
            JOIN cinema_halls ch ON ch.id = ms.cinema_hall_id
            ORDER BY o.created_at DESC, o.id DESC, t.id
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        // строки уже отсортированы, соседние с одним order_id склеиваем
        let mut orders: Vec<OrderSummary> = Vec::new();
        for r in rows {
            let ticket = OrderTicket {
                id: r.ticket_id,
                row: r.row,
                seat: r.seat,
                movie_session: SessionBrief {
                    id: r.movie_session_id,
                    show_time: r.show_time,
                    movie_title: r.movie_title,
                    cinema_hall_name: r.cinema_hall_name,
                },
            };
            match orders.last_mut() {
                Some(order) if order.id == r.order_id => order.tickets.push(ticket),
                _ => orders.push(OrderSummary {
                    id: r.order_id,
                    created_at: r.created_at,
                    tickets: vec![ticket],
                }),
            }
        }
        Ok(orders)
    }

    /* ---------- USERS ---------- */

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, first_name, last_name, is_staff, is_active, date_joined
             FROM users
             WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, first_name, last_name, is_staff, is_active, date_joined
             FROM users
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let email = user.email.clone();
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, first_name, last_name, is_staff)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, email, password_hash, first_name, last_name, is_staff, is_active, date_joined",
        )
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.is_staff)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, || format!("user with email {} already exists", email), "user", 0))
    }
}
