//! Area and genre lookup tables.
//!
//! Both are created lazily the first time a venue or artist mentions a new
//! value. Lookups are case-insensitive (the columns use `COLLATE NOCASE`) and
//! new rows are stored normalized. The insert is `ON CONFLICT DO NOTHING`
//! followed by a re-select, so two concurrent submissions of the same new
//! value converge on a single row.

use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    sea_query::OnConflict,
};

use crate::entities::{area, artist_genre, genre, venue_genre};

/// Title-cases words the way form input is normalized: the first cased
/// character after any non-alphabetic character is uppercased, the rest are
/// lowercased ("rock n roll" -> "Rock N Roll", "hip-hop" -> "Hip-Hop").
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_alphabetic = false;
    for c in value.trim().chars() {
        if previous_is_alphabetic {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_is_alphabetic = c.is_alphabetic();
    }
    out
}

pub fn normalize_state(value: &str) -> String {
    value.trim().to_uppercase()
}

pub async fn find_area(
    conn: &impl ConnectionTrait,
    city: &str,
    state: &str,
) -> Result<Option<area::Model>, DbErr> {
    area::Entity::find()
        .filter(area::Column::City.eq(city.trim()))
        .filter(area::Column::State.eq(state.trim()))
        .one(conn)
        .await
}

/// Returns the area matching `city`/`state` in any letter case, inserting a
/// normalized one if none exists.
pub async fn resolve_area(
    conn: &impl ConnectionTrait,
    city: &str,
    state: &str,
) -> Result<area::Model, DbErr> {
    match find_area(conn, city, state).await? {
        Some(existing) => Ok(existing),
        None => insert_area(conn, city, state).await,
    }
}

/// Inserts a normalized area unless an equal one already exists, then returns
/// whichever row is stored. Safe to call after a lookup has raced with
/// another writer.
async fn insert_area(
    conn: &impl ConnectionTrait,
    city: &str,
    state: &str,
) -> Result<area::Model, DbErr> {
    let city = title_case(city);
    let state = normalize_state(state);
    log::debug!("Creating area: {}, {}", city, state);

    let new_area = area::ActiveModel {
        city: Set(city.clone()),
        state: Set(state.clone()),
        ..Default::default()
    };
    area::Entity::insert(new_area)
        .on_conflict(
            OnConflict::columns([area::Column::City, area::Column::State])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    find_area(conn, &city, &state)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("area {city}, {state}")))
}

pub async fn find_genre(
    conn: &impl ConnectionTrait,
    name: &str,
) -> Result<Option<genre::Model>, DbErr> {
    genre::Entity::find()
        .filter(genre::Column::Name.eq(name.trim()))
        .one(conn)
        .await
}

/// Returns the genre named `name` in any letter case, inserting a title-cased
/// one if none exists.
pub async fn resolve_genre(conn: &impl ConnectionTrait, name: &str) -> Result<genre::Model, DbErr> {
    match find_genre(conn, name).await? {
        Some(existing) => Ok(existing),
        None => insert_genre(conn, name).await,
    }
}

async fn insert_genre(conn: &impl ConnectionTrait, name: &str) -> Result<genre::Model, DbErr> {
    let name = title_case(name);
    log::debug!("Creating genre: {}", name);

    let new_genre = genre::ActiveModel {
        name: Set(name.clone()),
        ..Default::default()
    };
    genre::Entity::insert(new_genre)
        .on_conflict(
            OnConflict::column(genre::Column::Name)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    find_genre(conn, &name)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("genre {name}")))
}

pub async fn resolve_genres(
    conn: &impl ConnectionTrait,
    names: &[String],
) -> Result<Vec<genre::Model>, DbErr> {
    let mut genres: Vec<genre::Model> = Vec::with_capacity(names.len());
    for name in names {
        let genre = resolve_genre(conn, name).await?;
        if !genres.iter().any(|g| g.id == genre.id) {
            genres.push(genre);
        }
    }
    Ok(genres)
}

/// Replaces the venue's genre associations with exactly `genres`.
pub async fn replace_venue_genres(
    conn: &impl ConnectionTrait,
    venue_id: i32,
    genres: &[genre::Model],
) -> Result<(), DbErr> {
    venue_genre::Entity::delete_many()
        .filter(venue_genre::Column::VenueId.eq(venue_id))
        .exec(conn)
        .await?;

    if genres.is_empty() {
        return Ok(());
    }

    let links = genres.iter().map(|genre| venue_genre::ActiveModel {
        venue_id: Set(venue_id),
        genre_id: Set(genre.id),
    });
    venue_genre::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

/// Replaces the artist's genre associations with exactly `genres`.
pub async fn replace_artist_genres(
    conn: &impl ConnectionTrait,
    artist_id: i32,
    genres: &[genre::Model],
) -> Result<(), DbErr> {
    artist_genre::Entity::delete_many()
        .filter(artist_genre::Column::ArtistId.eq(artist_id))
        .exec(conn)
        .await?;

    if genres.is_empty() {
        return Ok(());
    }

    let links = genres.iter().map(|genre| artist_genre::ActiveModel {
        artist_id: Set(artist_id),
        genre_id: Set(genre.id),
    });
    artist_genre::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_db;
    use sea_orm::{ActiveModelTrait, PaginatorTrait};

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("san francisco"), "San Francisco");
        assert_eq!(title_case("  rock n ROLL "), "Rock N Roll");
        assert_eq!(title_case("hip-hop"), "Hip-Hop");
        assert_eq!(title_case("r&b"), "R&B");
    }

    #[test]
    fn test_normalize_state() {
        assert_eq!(normalize_state(" ca"), "CA");
    }

    #[tokio::test]
    async fn test_resolve_area_normalizes_new_area() {
        let db = test_db().await;

        let area = resolve_area(&db.conn, "new york", "ny").await.unwrap();

        assert_eq!(area.city, "New York");
        assert_eq!(area.state, "NY");
    }

    #[tokio::test]
    async fn test_resolve_area_is_case_insensitive() {
        let db = test_db().await;

        let first = resolve_area(&db.conn, "San Francisco", "CA").await.unwrap();
        let second = resolve_area(&db.conn, "SAN francisco", "ca").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(area::Entity::find().count(&db.conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resolve_genre_reuses_existing_row() {
        let db = test_db().await;
        let existing = genre::ActiveModel {
            name: Set("Rock n Roll".into()),
            ..Default::default()
        }
        .insert(&db.conn)
        .await
        .unwrap();

        let resolved = resolve_genre(&db.conn, "ROCK N ROLL").await.unwrap();

        assert_eq!(resolved.id, existing.id);
        assert_eq!(resolved.name, "Rock n Roll");
        assert_eq!(genre::Entity::find().count(&db.conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_genre_uniqueness_is_enforced_by_schema() {
        let db = test_db().await;
        resolve_genre(&db.conn, "Jazz").await.unwrap();

        // Bypass the resolver: a plain insert differing only in case must fail.
        let duplicate = genre::ActiveModel {
            name: Set("jazz".into()),
            ..Default::default()
        }
        .insert(&db.conn)
        .await;

        assert!(duplicate.is_err());
        assert_eq!(genre::Entity::find().count(&db.conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_interleaved_resolves_share_one_row() {
        let db = test_db().await;

        let (a, b) = tokio::join!(
            resolve_genre(&db.conn, "swing"),
            resolve_genre(&db.conn, "SWING")
        );

        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert_eq!(genre::Entity::find().count(&db.conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_after_lost_race_returns_existing_genre() {
        let db = test_db().await;
        // Another writer stored the genre after our lookup missed it.
        let winner = resolve_genre(&db.conn, "Swing").await.unwrap();

        let loser = insert_genre(&db.conn, "sWiNg").await.unwrap();

        assert_eq!(loser, winner);
        assert_eq!(loser.name, "Swing");
        assert_eq!(genre::Entity::find().count(&db.conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_after_lost_race_returns_existing_area() {
        let db = test_db().await;
        let winner = resolve_area(&db.conn, "New York", "NY").await.unwrap();

        let loser = insert_area(&db.conn, "new york", "ny").await.unwrap();

        assert_eq!(loser, winner);
        assert_eq!(area::Entity::find().count(&db.conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resolve_genres_dedups() {
        let db = test_db().await;

        let genres = resolve_genres(
            &db.conn,
            &["Jazz".to_string(), "Folk".to_string(), "JAZZ".to_string()],
        )
        .await
        .unwrap();

        let names: Vec<_> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Jazz", "Folk"]);
    }
}
