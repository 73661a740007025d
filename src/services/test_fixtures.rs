use chrono::NaiveDateTime;
use sea_orm::{ActiveModelTrait, ActiveValue::Set};

use super::form::parse_date_time;
use super::lookup::{replace_artist_genres, replace_venue_genres, resolve_area, resolve_genres};
use crate::database::Database;
use crate::entities::{artist, show, venue};

pub fn at(value: &str) -> NaiveDateTime {
    parse_date_time(value).unwrap()
}

fn names(genres: &[&str]) -> Vec<String> {
    genres.iter().map(|g| g.to_string()).collect()
}

pub async fn insert_venue(
    db: &Database,
    name: &str,
    city: &str,
    state: &str,
    genres: &[&str],
) -> venue::Model {
    let area = resolve_area(&db.conn, city, state).await.unwrap();
    let venue = venue::ActiveModel {
        name: Set(name.into()),
        address: Set(format!("address: {name}")),
        area_id: Set(area.id),
        seeking_talent: Set(false),
        ..Default::default()
    }
    .insert(&db.conn)
    .await
    .unwrap();
    let genres = resolve_genres(&db.conn, &names(genres)).await.unwrap();
    replace_venue_genres(&db.conn, venue.id, &genres).await.unwrap();
    venue
}

pub async fn insert_artist(db: &Database, name: &str, genres: &[&str]) -> artist::Model {
    let artist = artist::ActiveModel {
        name: Set(name.into()),
        city: Set("San Francisco".into()),
        state: Set("CA".into()),
        seeking_venue: Set(false),
        ..Default::default()
    }
    .insert(&db.conn)
    .await
    .unwrap();
    let genres = resolve_genres(&db.conn, &names(genres)).await.unwrap();
    replace_artist_genres(&db.conn, artist.id, &genres).await.unwrap();
    artist
}

pub async fn insert_show(
    db: &Database,
    venue_id: i32,
    artist_id: i32,
    start_time: NaiveDateTime,
) -> show::Model {
    show::ActiveModel {
        start_time: Set(start_time),
        venue_id: Set(venue_id),
        artist_id: Set(artist_id),
        ..Default::default()
    }
    .insert(&db.conn)
    .await
    .unwrap()
}
