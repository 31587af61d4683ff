pub mod customer;
pub mod genre;
pub mod movie;
pub mod rental;
pub mod user;

pub use customer::Customer;
pub use genre::{Genre, GenreSnapshot};
pub use movie::Movie;
pub use rental::{CustomerSnapshot, MovieSnapshot, Rental};
pub use user::User;
