//! In-memory хранилище: тесты и локальный запуск без Postgres.
//!
//! Все таблицы лежат под одним `RwLock`, поэтому проверка занятых мест и
//! запись заказа выполняются атомарно, как транзакция в [`super::PgStore`].

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{CinemaStore, StoreError, StoreResult};
use crate::models::{
    CinemaHall, Movie, MovieSession, NewCinemaHall, NewMovie, NewMovieSession, NewTicket, NewUser,
    Order, OrderSummary, OrderTicket, OrderWithTickets, SessionBrief, SessionSummary, TakenPlace,
    Ticket, User,
};
use crate::services::sessions::SessionFilter;

struct Table<T> {
    last_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { last_id: 0, rows: BTreeMap::new() }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
struct Tables {
    movies: Table<Movie>,
    halls: Table<CinemaHall>,
    sessions: Table<MovieSession>,
    orders: Table<Order>,
    tickets: Table<Ticket>,
    users: Table<User>,
}

impl Tables {
    fn tickets_sold(&self, movie_session_id: i64) -> i64 {
        self.tickets
            .rows
            .values()
            .filter(|t| t.movie_session_id == movie_session_id)
            .count() as i64
    }

    fn place_taken(&self, ticket: &NewTicket) -> bool {
        self.tickets.rows.values().any(|t| {
            t.movie_session_id == ticket.movie_session && t.row == ticket.row && t.seat == ticket.seat
        })
    }

    fn brief(&self, movie_session_id: i64) -> Option<SessionBrief> {
        let session = self.sessions.rows.get(&movie_session_id)?;
        let movie = self.movies.rows.get(&session.movie_id)?;
        let hall = self.halls.rows.get(&session.cinema_hall_id)?;
        Some(SessionBrief {
            id: session.id,
            show_time: session.show_time,
            movie_title: movie.title.clone(),
            cinema_hall_name: hall.name.clone(),
        })
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Блокировка или смена роли пользователя в обход API. `false`, если
    /// пользователя нет.
    pub async fn set_user_flags(&self, user_id: i64, is_active: bool, is_staff: bool) -> bool {
        let mut tables = self.tables.write().await;
        match tables.users.rows.get_mut(&user_id) {
            Some(user) => {
                user.is_active = is_active;
                user.is_staff = is_staff;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CinemaStore for MemoryStore {
    async fn list_movies(&self, title: Option<&str>) -> StoreResult<Vec<Movie>> {
        let needle = title.map(str::to_lowercase);
        let tables = self.tables.read().await;
        Ok(tables
            .movies
            .rows
            .values()
            .filter(|m| match &needle {
                Some(n) => m.title.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get_movie(&self, id: i64) -> StoreResult<Option<Movie>> {
        Ok(self.tables.read().await.movies.rows.get(&id).cloned())
    }

    async fn create_movie(&self, movie: NewMovie) -> StoreResult<Movie> {
        let mut tables = self.tables.write().await;
        let id = tables.movies.next_id();
        let movie = Movie {
            id,
            title: movie.title,
            description: movie.description,
            duration: movie.duration,
        };
        tables.movies.rows.insert(id, movie.clone());
        Ok(movie)
    }

    async fn list_cinema_halls(&self) -> StoreResult<Vec<CinemaHall>> {
        Ok(self.tables.read().await.halls.rows.values().cloned().collect())
    }

    async fn get_cinema_hall(&self, id: i64) -> StoreResult<Option<CinemaHall>> {
        Ok(self.tables.read().await.halls.rows.get(&id).cloned())
    }

    async fn create_cinema_hall(&self, hall: NewCinemaHall) -> StoreResult<CinemaHall> {
        let mut tables = self.tables.write().await;
        let id = tables.halls.next_id();
        let hall = CinemaHall {
            id,
            name: hall.name,
            rows: hall.rows,
            seats_in_row: hall.seats_in_row,
        };
        tables.halls.rows.insert(id, hall.clone());
        Ok(hall)
    }

    async fn list_movie_sessions(&self, filter: &SessionFilter) -> StoreResult<Vec<SessionSummary>> {
        let tables = self.tables.read().await;
        let mut sessions: Vec<SessionSummary> = tables
            .sessions
            .rows
            .values()
            .filter(|s| filter.matches(s.show_time, s.movie_id))
            .filter_map(|s| {
                let movie = tables.movies.rows.get(&s.movie_id)?;
                let hall = tables.halls.rows.get(&s.cinema_hall_id)?;
                Some(SessionSummary {
                    id: s.id,
                    show_time: s.show_time,
                    movie_id: movie.id,
                    movie_title: movie.title.clone(),
                    cinema_hall_id: hall.id,
                    cinema_hall_name: hall.name.clone(),
                    rows: hall.rows,
                    seats_in_row: hall.seats_in_row,
                    tickets_sold: tables.tickets_sold(s.id),
                })
            })
            .collect();
        sessions.sort_by_key(|s| (s.show_time, s.id));
        Ok(sessions)
    }

    async fn get_movie_session(&self, id: i64) -> StoreResult<Option<MovieSession>> {
        Ok(self.tables.read().await.sessions.rows.get(&id).cloned())
    }

    async fn create_movie_session(&self, session: NewMovieSession) -> StoreResult<MovieSession> {
        let mut tables = self.tables.write().await;
        if !tables.movies.rows.contains_key(&session.movie_id) {
            return Err(StoreError::MissingReference { entity: "movie", id: session.movie_id });
        }
        if !tables.halls.rows.contains_key(&session.cinema_hall_id) {
            return Err(StoreError::MissingReference {
                entity: "cinema hall",
                id: session.cinema_hall_id,
            });
        }
        let id = tables.sessions.next_id();
        let session = MovieSession {
            id,
            show_time: session.show_time,
            movie_id: session.movie_id,
            cinema_hall_id: session.cinema_hall_id,
        };
        tables.sessions.rows.insert(id, session.clone());
        Ok(session)
    }

    async fn taken_places(&self, movie_session_id: i64) -> StoreResult<Vec<TakenPlace>> {
        let tables = self.tables.read().await;
        let mut places: Vec<TakenPlace> = tables
            .tickets
            .rows
            .values()
            .filter(|t| t.movie_session_id == movie_session_id)
            .map(|t| TakenPlace { row: t.row, seat: t.seat })
            .collect();
        places.sort();
        Ok(places)
    }

    async fn create_order(&self, user_id: i64, tickets: &[NewTicket]) -> StoreResult<OrderWithTickets> {
        let mut tables = self.tables.write().await;

        // сначала все проверки, потом запись - иначе заказ останется наполовину
        let mut requested = HashSet::new();
        for ticket in tickets {
            if !tables.sessions.rows.contains_key(&ticket.movie_session) {
                return Err(StoreError::MissingReference {
                    entity: "movie session",
                    id: ticket.movie_session,
                });
            }
            if tables.place_taken(ticket) || !requested.insert(*ticket) {
                return Err(StoreError::Conflict(format!(
                    "row {} seat {} is already taken for movie session {}",
                    ticket.row, ticket.seat, ticket.movie_session
                )));
            }
        }

        let order_id = tables.orders.next_id();
        let order = Order { id: order_id, user_id, created_at: Utc::now() };
        tables.orders.rows.insert(order_id, order.clone());

        let mut created = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let id = tables.tickets.next_id();
            let ticket = Ticket {
                id,
                order_id,
                movie_session_id: ticket.movie_session,
                row: ticket.row,
                seat: ticket.seat,
            };
            tables.tickets.rows.insert(id, ticket.clone());
            created.push(ticket);
        }

        Ok(OrderWithTickets {
            id: order.id,
            created_at: order.created_at,
            tickets: created,
        })
    }

    async fn list_orders(&self, user_id: i64, limit: i64, offset: i64) -> StoreResult<Vec<OrderSummary>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<&Order> = tables
            .orders
            .rows
            .values()
            .filter(|o| o.user_id == user_id)
            .collect();
        orders.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(orders
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|o| OrderSummary {
                id: o.id,
                created_at: o.created_at,
                tickets: tables
                    .tickets
                    .rows
                    .values()
                    .filter(|t| t.order_id == o.id)
                    .filter_map(|t| {
                        Some(OrderTicket {
                            id: t.id,
                            row: t.row,
                            seat: t.seat,
                            movie_session: tables.brief(t.movie_session_id)?,
                        })
                    })
                    .collect(),
            })
            .collect())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.rows.get(&id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.rows.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(StoreError::Conflict(format!(
                "user with email {} already exists",
                user.email
            )));
        }
        let id = tables.users.next_id();
        let user = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
            is_active: true,
            date_joined: Utc::now(),
        };
        tables.users.rows.insert(id, user.clone());
        Ok(user)
    }
}
