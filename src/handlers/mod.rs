pub mod customers;
pub mod genres;
pub mod movies;
pub mod rentals;
pub mod system;
pub mod users;
