//! PostgreSQL backend. Each collection lives in its own table; snapshots are
//! stored by value (movie genres as JSONB, rental snapshots as flat columns).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::movie::MAX_STOCK;
use crate::database::models::{
    Customer, CustomerSnapshot, Genre, GenreSnapshot, Movie, MovieSnapshot, Rental, User,
};
use crate::database::repository::{
    IssueOutcome, Page, RentalLedger, RentalRepository, Repository, UserRepository,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    genres: Json<Vec<GenreSnapshot>>,
    number_in_stock: i32,
    daily_rental_rate: f64,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            genres: row.genres.0,
            number_in_stock: row.number_in_stock,
            daily_rental_rate: row.daily_rental_rate,
        }
    }
}

#[derive(Debug, FromRow)]
struct RentalRow {
    id: Uuid,
    customer_id: Uuid,
    customer_name: String,
    customer_phone: String,
    customer_is_gold: bool,
    movie_id: Uuid,
    movie_title: String,
    movie_daily_rental_rate: f64,
    date_out: DateTime<Utc>,
    date_returned: Option<DateTime<Utc>>,
    rental_fee: Option<f64>,
}

impl From<RentalRow> for Rental {
    fn from(row: RentalRow) -> Self {
        Rental {
            id: row.id,
            customer: CustomerSnapshot {
                id: row.customer_id,
                name: row.customer_name,
                phone: row.customer_phone,
                is_gold: row.customer_is_gold,
            },
            movie: MovieSnapshot {
                id: row.movie_id,
                title: row.movie_title,
                daily_rental_rate: row.movie_daily_rental_rate,
            },
            date_out: row.date_out,
            date_returned: row.date_returned,
            rental_fee: row.rental_fee,
        }
    }
}

const GENRE_COLUMNS: &str = "id, name, description";
const CUSTOMER_COLUMNS: &str = "id, name, phone, is_gold";
const MOVIE_COLUMNS: &str = "id, title, genres, number_in_stock, daily_rental_rate";
const RENTAL_COLUMNS: &str = "id, customer_id, customer_name, customer_phone, customer_is_gold, \
     movie_id, movie_title, movie_daily_rental_rate, date_out, date_returned, rental_fee";
const USER_COLUMNS: &str = "id, name, email, password_hash, is_admin";

// ORDER BY clauses mirror `Entity::list_order`; "C" collation keeps string
// comparison bytewise like Rust's.
const GENRE_ORDER: &str =
    "name COLLATE \"C\", description COLLATE \"C\" ASC NULLS FIRST, id";
const CUSTOMER_ORDER: &str = "name COLLATE \"C\", phone COLLATE \"C\", is_gold, id";
const MOVIE_ORDER: &str = "title COLLATE \"C\", number_in_stock, daily_rental_rate, id";
const RENTAL_ORDER: &str =
    "date_out DESC, customer_name COLLATE \"C\", movie_title COLLATE \"C\", id";
const USER_ORDER: &str = "name COLLATE \"C\", email COLLATE \"C\", id";

fn page_args(page: Page) -> (i64, i64) {
    (page.limit() as i64, page.offset() as i64)
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

#[async_trait]
impl Repository<Genre> for PgStore {
    async fn find(&self, id: Uuid) -> Result<Option<Genre>, DatabaseError> {
        let sql = format!("SELECT {} FROM genres WHERE id = $1", GENRE_COLUMNS);
        Ok(sqlx::query_as::<_, Genre>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, page: Page) -> Result<Vec<Genre>, DatabaseError> {
        let (limit, offset) = page_args(page);
        let sql = format!(
            "SELECT {} FROM genres ORDER BY {} LIMIT $1 OFFSET $2",
            GENRE_COLUMNS, GENRE_ORDER
        );
        Ok(sqlx::query_as::<_, Genre>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert(&self, genre: &Genre) -> Result<Genre, DatabaseError> {
        let sql = format!(
            "INSERT INTO genres ({cols}) VALUES ($1, $2, $3) RETURNING {cols}",
            cols = GENRE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Genre>(&sql)
            .bind(genre.id)
            .bind(&genre.name)
            .bind(&genre.description)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn replace(&self, genre: &Genre) -> Result<Option<Genre>, DatabaseError> {
        let sql = format!(
            "UPDATE genres SET name = $2, description = $3 WHERE id = $1 RETURNING {}",
            GENRE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Genre>(&sql)
            .bind(genre.id)
            .bind(&genre.name)
            .bind(&genre.description)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn remove(&self, id: Uuid) -> Result<Option<Genre>, DatabaseError> {
        let sql = format!("DELETE FROM genres WHERE id = $1 RETURNING {}", GENRE_COLUMNS);
        Ok(sqlx::query_as::<_, Genre>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[async_trait]
impl Repository<Customer> for PgStore {
    async fn find(&self, id: Uuid) -> Result<Option<Customer>, DatabaseError> {
        let sql = format!("SELECT {} FROM customers WHERE id = $1", CUSTOMER_COLUMNS);
        Ok(sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, page: Page) -> Result<Vec<Customer>, DatabaseError> {
        let (limit, offset) = page_args(page);
        let sql = format!(
            "SELECT {} FROM customers ORDER BY {} LIMIT $1 OFFSET $2",
            CUSTOMER_COLUMNS, CUSTOMER_ORDER
        );
        Ok(sqlx::query_as::<_, Customer>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert(&self, customer: &Customer) -> Result<Customer, DatabaseError> {
        let sql = format!(
            "INSERT INTO customers ({cols}) VALUES ($1, $2, $3, $4) RETURNING {cols}",
            cols = CUSTOMER_COLUMNS
        );
        Ok(sqlx::query_as::<_, Customer>(&sql)
            .bind(customer.id)
            .bind(&customer.name)
            .bind(&customer.phone)
            .bind(customer.is_gold)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn replace(&self, customer: &Customer) -> Result<Option<Customer>, DatabaseError> {
        let sql = format!(
            "UPDATE customers SET name = $2, phone = $3, is_gold = $4 WHERE id = $1 RETURNING {}",
            CUSTOMER_COLUMNS
        );
        Ok(sqlx::query_as::<_, Customer>(&sql)
            .bind(customer.id)
            .bind(&customer.name)
            .bind(&customer.phone)
            .bind(customer.is_gold)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn remove(&self, id: Uuid) -> Result<Option<Customer>, DatabaseError> {
        let sql = format!("DELETE FROM customers WHERE id = $1 RETURNING {}", CUSTOMER_COLUMNS);
        Ok(sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

#[async_trait]
impl Repository<Movie> for PgStore {
    async fn find(&self, id: Uuid) -> Result<Option<Movie>, DatabaseError> {
        let sql = format!("SELECT {} FROM movies WHERE id = $1", MOVIE_COLUMNS);
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Movie::from))
    }

    async fn list(&self, page: Page) -> Result<Vec<Movie>, DatabaseError> {
        let (limit, offset) = page_args(page);
        let sql = format!(
            "SELECT {} FROM movies ORDER BY {} LIMIT $1 OFFSET $2",
            MOVIE_COLUMNS, MOVIE_ORDER
        );
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn insert(&self, movie: &Movie) -> Result<Movie, DatabaseError> {
        let sql = format!(
            "INSERT INTO movies ({cols}) VALUES ($1, $2, $3, $4, $5) RETURNING {cols}",
            cols = MOVIE_COLUMNS
        );
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(movie.id)
            .bind(&movie.title)
            .bind(Json(&movie.genres))
            .bind(movie.number_in_stock)
            .bind(movie.daily_rental_rate)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn replace(&self, movie: &Movie) -> Result<Option<Movie>, DatabaseError> {
        let sql = format!(
            "UPDATE movies SET title = $2, genres = $3, number_in_stock = $4, daily_rental_rate = $5 \
             WHERE id = $1 RETURNING {}",
            MOVIE_COLUMNS
        );
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(movie.id)
            .bind(&movie.title)
            .bind(Json(&movie.genres))
            .bind(movie.number_in_stock)
            .bind(movie.daily_rental_rate)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Movie::from))
    }

    async fn remove(&self, id: Uuid) -> Result<Option<Movie>, DatabaseError> {
        let sql = format!("DELETE FROM movies WHERE id = $1 RETURNING {}", MOVIE_COLUMNS);
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Movie::from))
    }
}

// ---------------------------------------------------------------------------
// Rentals
// ---------------------------------------------------------------------------

fn insert_rental_sql() -> String {
    format!(
        "INSERT INTO rentals ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {cols}",
        cols = RENTAL_COLUMNS
    )
}

fn bind_rental<'q>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, RentalRow, sqlx::postgres::PgArguments>,
    rental: &'q Rental,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, RentalRow, sqlx::postgres::PgArguments> {
    q.bind(rental.id)
        .bind(rental.customer.id)
        .bind(&rental.customer.name)
        .bind(&rental.customer.phone)
        .bind(rental.customer.is_gold)
        .bind(rental.movie.id)
        .bind(&rental.movie.title)
        .bind(rental.movie.daily_rental_rate)
        .bind(rental.date_out)
        .bind(rental.date_returned)
        .bind(rental.rental_fee)
}

#[async_trait]
impl Repository<Rental> for PgStore {
    async fn find(&self, id: Uuid) -> Result<Option<Rental>, DatabaseError> {
        let sql = format!("SELECT {} FROM rentals WHERE id = $1", RENTAL_COLUMNS);
        let row = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Rental::from))
    }

    async fn list(&self, page: Page) -> Result<Vec<Rental>, DatabaseError> {
        let (limit, offset) = page_args(page);
        let sql = format!(
            "SELECT {} FROM rentals ORDER BY {} LIMIT $1 OFFSET $2",
            RENTAL_COLUMNS, RENTAL_ORDER
        );
        let rows = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Rental::from).collect())
    }

    async fn insert(&self, rental: &Rental) -> Result<Rental, DatabaseError> {
        let sql = insert_rental_sql();
        let row = bind_rental(sqlx::query_as::<_, RentalRow>(&sql), rental)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn replace(&self, rental: &Rental) -> Result<Option<Rental>, DatabaseError> {
        let sql = format!(
            "UPDATE rentals SET date_returned = $2, rental_fee = $3 WHERE id = $1 RETURNING {}",
            RENTAL_COLUMNS
        );
        let row = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(rental.id)
            .bind(rental.date_returned)
            .bind(rental.rental_fee)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Rental::from))
    }

    async fn remove(&self, id: Uuid) -> Result<Option<Rental>, DatabaseError> {
        let sql = format!("DELETE FROM rentals WHERE id = $1 RETURNING {}", RENTAL_COLUMNS);
        let row = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Rental::from))
    }
}

#[async_trait]
impl RentalRepository for PgStore {
    async fn lookup(
        &self,
        customer_id: Uuid,
        movie_id: Uuid,
    ) -> Result<Option<Rental>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM rentals WHERE customer_id = $1 AND movie_id = $2 \
             ORDER BY (date_returned IS NULL) DESC, date_out DESC, id DESC LIMIT 1",
            RENTAL_COLUMNS
        );
        let row = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(customer_id)
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Rental::from))
    }
}

#[async_trait]
impl RentalLedger for PgStore {
    async fn issue(&self, rental: &Rental) -> Result<IssueOutcome, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Conditional decrement: only one of two racing issuances can take
        // the last unit.
        let decremented = sqlx::query(
            "UPDATE movies SET number_in_stock = number_in_stock - 1 \
             WHERE id = $1 AND number_in_stock > 0",
        )
        .bind(rental.movie.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if decremented == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM movies WHERE id = $1)")
                .bind(rental.movie.id)
                .fetch_one(&mut *tx)
                .await?;
            tx.rollback().await?;
            return Ok(if exists {
                IssueOutcome::OutOfStock
            } else {
                IssueOutcome::MovieMissing
            });
        }

        let sql = insert_rental_sql();
        let row = bind_rental(sqlx::query_as::<_, RentalRow>(&sql), rental)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(IssueOutcome::Issued(row.into()))
    }

    async fn close(&self, rental: &Rental) -> Result<Rental, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE rentals SET date_returned = $2, rental_fee = $3 WHERE id = $1 RETURNING {}",
            RENTAL_COLUMNS
        );
        let row = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(rental.id)
            .bind(rental.date_returned)
            .bind(rental.rental_fee)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::QueryError(format!("rental {} vanished", rental.id)))?;

        sqlx::query("UPDATE movies SET number_in_stock = LEAST(number_in_stock + 1, $2) WHERE id = $1")
            .bind(rental.movie.id)
            .bind(MAX_STOCK)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[async_trait]
impl Repository<User> for PgStore {
    async fn find(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, page: Page) -> Result<Vec<User>, DatabaseError> {
        let (limit, offset) = page_args(page);
        let sql = format!(
            "SELECT {} FROM users ORDER BY {} LIMIT $1 OFFSET $2",
            USER_COLUMNS, USER_ORDER
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert(&self, user: &User) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users ({cols}) VALUES ($1, $2, $3, $4, $5) RETURNING {cols}",
            cols = USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_admin)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn replace(&self, user: &User) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, is_admin = $5 \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_admin)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn remove(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("DELETE FROM users WHERE id = $1 RETURNING {}", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE lower(email) = lower($1)", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }
}
