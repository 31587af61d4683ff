pub mod customer_service;
pub mod error;
pub mod genre_service;
pub mod movie_service;
pub mod rental_service;
pub mod resource;
pub mod user_service;

pub use customer_service::CustomerService;
pub use error::ServiceError;
pub use genre_service::GenreService;
pub use movie_service::MovieService;
pub use rental_service::RentalService;
pub use user_service::UserService;
