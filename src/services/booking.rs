use std::collections::{HashMap, HashSet};

use crate::error::ApiError;
use crate::models::{CinemaHall, NewTicket};
use crate::store::CinemaStore;

pub fn check_place(hall: &CinemaHall, ticket: &NewTicket) -> Result<(), ApiError> {
    if !hall.has_place(ticket.row, ticket.seat) {
        return Err(ApiError::Validation(format!(
            "row must be in 1..={} and seat in 1..={} for cinema hall {}, got row {} seat {}",
            hall.rows, hall.seats_in_row, hall.name, ticket.row, ticket.seat
        )));
    }
    Ok(())
}

/// Проверяет билеты заказа до записи: сеансы существуют, места внутри зала,
/// без повторов в одном запросе. Занятость мест проверяет хранилище.
pub async fn validate_tickets(store: &dyn CinemaStore, tickets: &[NewTicket]) -> Result<(), ApiError> {
    if tickets.is_empty() {
        return Err(ApiError::Validation("order must contain at least one ticket".to_string()));
    }

    let mut seen = HashSet::new();
    for ticket in tickets {
        if !seen.insert((ticket.movie_session, ticket.row, ticket.seat)) {
            return Err(ApiError::Validation(format!(
                "row {} seat {} is requested twice",
                ticket.row, ticket.seat
            )));
        }
    }

    // один зал на сеанс - грузим по разу
    let mut halls: HashMap<i64, CinemaHall> = HashMap::new();
    for ticket in tickets {
        if !halls.contains_key(&ticket.movie_session) {
            let session = store
                .get_movie_session(ticket.movie_session)
                .await?
                .ok_or_else(|| {
                    ApiError::Validation(format!("movie session {} does not exist", ticket.movie_session))
                })?;
            let hall = store
                .get_cinema_hall(session.cinema_hall_id)
                .await?
                .ok_or_else(|| {
                    ApiError::Internal(format!("cinema hall {} of session {} is missing", session.cinema_hall_id, session.id))
                })?;
            halls.insert(ticket.movie_session, hall);
        }
        if let Some(hall) = halls.get(&ticket.movie_session) {
            check_place(hall, ticket)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hall() -> CinemaHall {
        CinemaHall { id: 1, name: "Red".into(), rows: 10, seats_in_row: 12 }
    }

    #[test]
    fn place_outside_hall_is_rejected() {
        let ok = NewTicket { row: 10, seat: 12, movie_session: 1 };
        let bad_row = NewTicket { row: 11, seat: 1, movie_session: 1 };
        let bad_seat = NewTicket { row: 1, seat: 13, movie_session: 1 };

        assert!(check_place(&hall(), &ok).is_ok());
        assert!(matches!(check_place(&hall(), &bad_row), Err(ApiError::Validation(_))));
        assert!(matches!(check_place(&hall(), &bad_seat), Err(ApiError::Validation(_))));
    }
}
