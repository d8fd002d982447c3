use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::services::availability;

/// Сеанс в том виде, в котором его принимает и отдает POST /movie_sessions
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MovieSession {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    #[serde(rename = "movie")]
    pub movie_id: i64,
    #[serde(rename = "cinema_hall")]
    pub cinema_hall_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewMovieSession {
    pub show_time: DateTime<Utc>,
    pub movie_id: i64,
    pub cinema_hall_id: i64,
}

/// Строка списка сеансов: сеанс + фильм + зал + число проданных билетов.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SessionSummary {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub movie_id: i64,
    pub movie_title: String,
    pub cinema_hall_id: i64,
    pub cinema_hall_name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub tickets_sold: i64,
}

impl SessionSummary {
    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }

    pub fn tickets_available(&self) -> i64 {
        availability::tickets_available(self.capacity(), self.tickets_sold)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, FromRow, Serialize, Deserialize)]
pub struct TakenPlace {
    pub row: i32,
    pub seat: i32,
}
