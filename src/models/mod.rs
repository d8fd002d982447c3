pub mod user;
pub mod movie;
pub mod cinema_hall;
pub mod movie_session;
pub mod order;

pub use user::{NewUser, User};
pub use movie::{Movie, NewMovie};
pub use cinema_hall::{CinemaHall, NewCinemaHall};
pub use movie_session::{MovieSession, NewMovieSession, SessionSummary, TakenPlace};
pub use order::{NewTicket, Order, OrderSummary, OrderTicket, OrderWithTickets, SessionBrief, Ticket};
