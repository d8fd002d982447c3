use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Ticket {
    pub id: i64,
    #[serde(skip)]
    pub order_id: i64,
    #[serde(rename = "movie_session")]
    pub movie_session_id: i64,
    pub row: i32,
    pub seat: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Validate)]
pub struct NewTicket {
    #[validate(range(min = 1))]
    pub row: i32,
    #[validate(range(min = 1))]
    pub seat: i32,
    pub movie_session: i64,
}

/// Ответ на создание заказа
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithTickets {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub tickets: Vec<Ticket>,
}

// --- Список заказов пользователя ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionBrief {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub movie_title: String,
    pub cinema_hall_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderTicket {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub movie_session: SessionBrief,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub tickets: Vec<OrderTicket>,
}
