use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CinemaHall {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
}

impl CinemaHall {
    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }

    /// Места нумеруются с единицы: 1..=rows, 1..=seats_in_row
    pub fn has_place(&self, row: i32, seat: i32) -> bool {
        (1..=self.rows).contains(&row) && (1..=self.seats_in_row).contains(&seat)
    }
}

// Ответ API - вместе с вычисляемой вместимостью
#[derive(Debug, Clone, Serialize)]
pub struct CinemaHallView {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub capacity: i64,
}

impl From<&CinemaHall> for CinemaHallView {
    fn from(hall: &CinemaHall) -> Self {
        Self {
            id: hall.id,
            name: hall.name.clone(),
            rows: hall.rows,
            seats_in_row: hall.seats_in_row,
            capacity: hall.capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCinemaHall {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 1, max = 1000))]
    pub rows: i32,
    #[validate(range(min = 1, max = 1000))]
    pub seats_in_row: i32,
}
