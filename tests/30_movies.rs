mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{read, TestServer};

#[tokio::test]
async fn movie_embeds_genre_snapshot() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user_token().await?;

    let genre = server.create("/api/genres", &user, &json!({ "name": "Sci-Fi" })).await?;
    let movie = server
        .create(
            "/api/movies",
            &user,
            &json!({
                "title": "  Blade Runner  ",
                "genreIds": [genre["id"]],
                "numberInStock": 4,
                "dailyRentalRate": 1.5
            }),
        )
        .await?;

    assert_eq!(movie["title"], "Blade Runner");
    assert_eq!(movie["genres"][0]["name"], "Sci-Fi");
    assert_eq!(movie["numberInStock"], 4);
    assert_eq!(movie["dailyRentalRate"], 1.5);

    // Renaming the genre leaves the movie's copy alone
    let res = server
        .client
        .put(server.url(&format!("/api/genres/{}", genre["id"].as_str().unwrap_or_default())))
        .header("x-auth-token", &user)
        .json(&json!({ "name": "Science Fiction" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let path = format!("/api/movies/{}", movie["id"].as_str().unwrap_or_default());
    let (status, body) = read(server.client.get(server.url(&path)).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["genres"][0]["name"], "Sci-Fi");

    Ok(())
}

#[tokio::test]
async fn movie_rejects_unknown_genre_and_bad_stock() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user_token().await?;

    let res = server
        .client
        .post(server.url("/api/movies"))
        .header("x-auth-token", &user)
        .json(&json!({
            "title": "Alien",
            "genreIds": [Uuid::new_v4()],
            "numberInStock": 1,
            "dailyRentalRate": 1.0
        }))
        .send()
        .await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid genre.");

    let res = server
        .client
        .post(server.url("/api/movies"))
        .header("x-auth-token", &user)
        .json(&json!({
            "title": "Alien",
            "genreIds": [],
            "numberInStock": 300,
            "dailyRentalRate": 1.0
        }))
        .send()
        .await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "\"numberInStock\" must be between 0 and 255");
    assert_eq!(body["field_errors"]["numberInStock"], "\"numberInStock\" must be between 0 and 255");

    Ok(())
}

#[tokio::test]
async fn movie_reads_are_public_but_writes_are_not() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = read(server.client.get(server.url("/api/movies")).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let res = server
        .client
        .post(server.url("/api/movies"))
        .json(&json!({ "title": "Alien" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn movie_title_padding_does_not_count_toward_length() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user_token().await?;

    let res = server
        .client
        .post(server.url("/api/movies"))
        .header("x-auth-token", &user)
        .json(&json!({
            "title": "   abc   ",
            "genreIds": [],
            "numberInStock": 1,
            "dailyRentalRate": 1.0
        }))
        .send()
        .await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "\"title\" length must be between 5 and 255 characters");

    let (status, body) = read(server.client.get(server.url("/api/movies")).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    Ok(())
}
