//! Reference data loader for `vidly-api seed`.

use anyhow::Context;
use std::path::Path;

use crate::api::payloads::GenrePayload;
use crate::api::validate_payload;
use crate::database::models::Genre;
use crate::database::Store;
use crate::services::{GenreService, ServiceError};

/// Genres loaded when no file is given.
pub const DEFAULT_GENRES: &[(&str, &str)] = &[
    ("Action", "Movies with lots of action and explosions."),
    ("Comedy", "Movies that make you laugh out loud."),
    ("Drama", "Movies that make you cry."),
    ("Horror", "Movies that scare you."),
    ("Romance", "Movies about love and relationships."),
    ("Sci-Fi", "Movies about space and the future."),
    ("Thriller", "Movies that keep you on the edge of your seat."),
    ("Western", "Movies set in the American Old West."),
    ("Animation", "Movies that are animated."),
    ("Documentary", "Movies that are based on real events."),
    ("Musical", "Movies that have singing and dancing."),
    ("Mystery", "Movies that are mysterious and puzzling."),
    ("Sport", "Movies about sports and athletes."),
    ("War", "Movies about war and conflict."),
    ("Biography", "Movies about real people and their lives."),
    ("Crime", "Movies about criminals and the law."),
    ("Family", "Movies that are suitable for the whole family."),
    ("Fantasy", "Movies about magic and mythical creatures."),
    ("History", "Movies about historical events and figures."),
    ("Music", "Movies about music and musicians."),
    ("News", "Movies that are based on current events."),
    ("Reality-TV", "Movies that are based on real-life situations."),
    ("Short", "Movies that are short in length."),
    ("Talk-Show", "Movies that are based on talk shows."),
    ("War & Politics", "Movies about war and politics."),
    ("Game-Show", "Movies that are based on game shows."),
    ("Sci-Fi & Fantasy", "Movies that are both science fiction and fantasy."),
    ("Action & Adventure", "Movies that are both action and adventure."),
    ("Kids", "Movies that are suitable for kids."),
    ("News & Politics", "Movies that are both news and politics."),
    ("Reality", "Movies that are based on reality."),
];

pub fn default_genres() -> Vec<GenrePayload> {
    DEFAULT_GENRES
        .iter()
        .map(|(name, description)| GenrePayload {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
        })
        .collect()
}

/// Read a JSON array of `{ "name", "description" }` objects.
pub fn load_genres(path: &Path) -> anyhow::Result<Vec<GenrePayload>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read genre file {}", path.display()))?;
    let genres = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse genre file {}", path.display()))?;
    Ok(genres)
}

/// Insert every genre through the regular create path. The whole batch is
/// validated first so a bad entry writes nothing.
pub async fn seed_genres(store: &Store, genres: Vec<GenrePayload>) -> Result<Vec<Genre>, ServiceError> {
    for genre in &genres {
        validate_payload(genre)?;
    }

    let service = GenreService::new(store);
    let mut created = Vec::with_capacity(genres.len());
    for genre in genres {
        created.push(service.create(genre).await?);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Page;
    use std::io::Write;

    #[tokio::test]
    async fn seeds_default_genres_in_list_order() {
        let store = Store::memory();
        let created = seed_genres(&store, default_genres()).await.unwrap();
        assert_eq!(created.len(), DEFAULT_GENRES.len());

        let listed: Vec<String> = store
            .genres
            .list(Page::new(1, 100))
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();

        let mut expected: Vec<String> = DEFAULT_GENRES.iter().map(|(name, _)| name.to_string()).collect();
        expected.sort();
        assert_eq!(listed, expected);
        assert_eq!(listed.first().map(String::as_str), Some("Action"));
    }

    #[tokio::test]
    async fn invalid_entry_aborts_the_whole_batch() {
        let store = Store::memory();
        let mut genres = default_genres();
        genres.push(GenrePayload {
            name: Some("Xy".to_string()),
            description: None,
        });

        let err = seed_genres(&store, genres).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
        assert!(store.genres.list(Page::new(1, 10)).await.unwrap().is_empty());
    }

    #[test]
    fn loads_genres_from_json_file() {
        let path = std::env::temp_dir().join(format!("vidly-genres-{}.json", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"name": "Noir", "description": "Shadows and smoke."}}, {{"name": "Giallo"}}]"#
        )
        .unwrap();

        let genres = load_genres(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(genres.len(), 2);
        assert_eq!(genres[0].name.as_deref(), Some("Noir"));
        assert_eq!(genres[1].description, None);
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = load_genres(Path::new("/nonexistent/genres.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/genres.json"));
    }
}
