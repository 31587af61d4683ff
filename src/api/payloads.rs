//! Request bodies. Every field is optional at the serde level so that a
//! missing field is reported by the validation gate with a readable message
//! instead of a deserialization error.

use serde::Deserialize;
use validator::Validate;

use super::validate::Payload;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenrePayload {
    #[validate(
        required(message = "\"name\" is required"),
        length(min = 3, max = 50, message = "\"name\" length must be between 3 and 50 characters")
    )]
    pub name: Option<String>,

    #[validate(length(
        min = 3,
        max = 255,
        message = "\"description\" length must be between 3 and 255 characters"
    ))]
    pub description: Option<String>,
}

impl Payload for GenrePayload {
    const FIELDS: &'static [(&'static str, &'static str)] =
        &[("name", "name"), ("description", "description")];
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[validate(
        required(message = "\"name\" is required"),
        length(min = 3, max = 50, message = "\"name\" length must be between 3 and 50 characters")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "\"phone\" is required"),
        length(min = 3, max = 50, message = "\"phone\" length must be between 3 and 50 characters")
    )]
    pub phone: Option<String>,

    pub is_gold: Option<bool>,
}

impl Payload for CustomerPayload {
    const FIELDS: &'static [(&'static str, &'static str)] =
        &[("name", "name"), ("phone", "phone"), ("is_gold", "isGold")];
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoviePayload {
    #[validate(
        required(message = "\"title\" is required"),
        length(min = 5, max = 255, message = "\"title\" length must be between 5 and 255 characters")
    )]
    pub title: Option<String>,

    #[validate(required(message = "\"genreIds\" is required"))]
    pub genre_ids: Option<Vec<String>>,

    #[validate(
        required(message = "\"numberInStock\" is required"),
        range(min = 0, max = 255, message = "\"numberInStock\" must be between 0 and 255")
    )]
    pub number_in_stock: Option<i64>,

    #[validate(
        required(message = "\"dailyRentalRate\" is required"),
        range(min = 0.0, max = 255.0, message = "\"dailyRentalRate\" must be between 0 and 255")
    )]
    pub daily_rental_rate: Option<f64>,
}

impl Payload for MoviePayload {
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("title", "title"),
        ("genre_ids", "genreIds"),
        ("number_in_stock", "numberInStock"),
        ("daily_rental_rate", "dailyRentalRate"),
    ];
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RentalPayload {
    #[validate(
        required(message = "\"customerId\" is required"),
        length(min = 5, max = 255, message = "\"customerId\" length must be between 5 and 255 characters")
    )]
    pub customer_id: Option<String>,

    #[validate(
        required(message = "\"movieId\" is required"),
        length(min = 5, max = 255, message = "\"movieId\" length must be between 5 and 255 characters")
    )]
    pub movie_id: Option<String>,
}

impl Payload for RentalPayload {
    const FIELDS: &'static [(&'static str, &'static str)] =
        &[("customer_id", "customerId"), ("movie_id", "movieId")];
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReturnPayload {
    #[validate(required(message = "\"customerId\" is required"))]
    pub customer_id: Option<String>,

    #[validate(required(message = "\"movieId\" is required"))]
    pub movie_id: Option<String>,
}

impl Payload for ReturnPayload {
    const FIELDS: &'static [(&'static str, &'static str)] =
        &[("customer_id", "customerId"), ("movie_id", "movieId")];
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[validate(
        required(message = "\"name\" is required"),
        length(min = 5, max = 255, message = "\"name\" length must be between 5 and 255 characters")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "\"email\" is required"),
        length(min = 5, max = 255, message = "\"email\" length must be between 5 and 255 characters"),
        email(message = "\"email\" must be a valid email")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "\"password\" is required"),
        length(min = 8, max = 255, message = "\"password\" length must be between 8 and 255 characters")
    )]
    pub password: Option<String>,
}

impl Payload for UserPayload {
    const FIELDS: &'static [(&'static str, &'static str)] =
        &[("name", "name"), ("email", "email"), ("password", "password")];
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(
        required(message = "\"email\" is required"),
        email(message = "\"email\" must be a valid email")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "\"password\" is required"),
        length(min = 5, max = 255, message = "\"password\" length must be between 5 and 255 characters")
    )]
    pub password: Option<String>,
}

impl Payload for LoginPayload {
    const FIELDS: &'static [(&'static str, &'static str)] =
        &[("email", "email"), ("password", "password")];
}
