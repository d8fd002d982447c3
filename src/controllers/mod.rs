pub mod cinema_halls;
pub mod movie_sessions;
pub mod movies;
pub mod orders;
pub mod users;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(movies::routes())
        .merge(cinema_halls::routes())
        .merge(movie_sessions::routes())
        .merge(orders::routes())
        .merge(users::routes())
}
