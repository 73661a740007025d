//! Explicit relationship traversal. Every hop is one query against the
//! connection passed in; nothing is loaded lazily behind the caller's back.

// Outside of tests only the venue/artist to area and genre hops are used.
#![allow(dead_code)]

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter, QueryOrder};

use crate::entities::{area, artist, genre, show, venue};

/// A venue joined with its area, exposing the derived `city`/`state`.
#[derive(Debug, Clone)]
pub struct VenueWithArea {
    pub venue: venue::Model,
    pub area: area::Model,
}

impl VenueWithArea {
    pub fn city(&self) -> &str {
        &self.area.city
    }

    pub fn state(&self) -> &str {
        &self.area.state
    }
}

pub async fn venue_area(
    conn: &impl ConnectionTrait,
    venue: &venue::Model,
) -> Result<area::Model, DbErr> {
    venue
        .find_related(area::Entity)
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("area {} of venue {}", venue.area_id, venue.id)))
}

pub async fn venue_with_area(
    conn: &impl ConnectionTrait,
    venue_id: i32,
) -> Result<Option<VenueWithArea>, DbErr> {
    let Some((venue, area)) = venue::Entity::find_by_id(venue_id)
        .find_also_related(area::Entity)
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let area = area.ok_or_else(|| {
        DbErr::RecordNotFound(format!("area {} of venue {}", venue.area_id, venue.id))
    })?;

    Ok(Some(VenueWithArea { venue, area }))
}

pub async fn venue_genres(
    conn: &impl ConnectionTrait,
    venue: &venue::Model,
) -> Result<Vec<genre::Model>, DbErr> {
    venue
        .find_related(genre::Entity)
        .order_by_asc(genre::Column::Name)
        .all(conn)
        .await
}

pub async fn venue_shows(
    conn: &impl ConnectionTrait,
    venue: &venue::Model,
) -> Result<Vec<show::Model>, DbErr> {
    venue
        .find_related(show::Entity)
        .order_by_asc(show::Column::StartTime)
        .all(conn)
        .await
}

pub async fn artist_genres(
    conn: &impl ConnectionTrait,
    artist: &artist::Model,
) -> Result<Vec<genre::Model>, DbErr> {
    artist
        .find_related(genre::Entity)
        .order_by_asc(genre::Column::Name)
        .all(conn)
        .await
}

pub async fn artist_shows(
    conn: &impl ConnectionTrait,
    artist: &artist::Model,
) -> Result<Vec<show::Model>, DbErr> {
    artist
        .find_related(show::Entity)
        .order_by_asc(show::Column::StartTime)
        .all(conn)
        .await
}

pub async fn show_venue(
    conn: &impl ConnectionTrait,
    show: &show::Model,
) -> Result<venue::Model, DbErr> {
    show.find_related(venue::Entity)
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("venue {} of show {}", show.venue_id, show.id)))
}

pub async fn show_artist(
    conn: &impl ConnectionTrait,
    show: &show::Model,
) -> Result<artist::Model, DbErr> {
    show.find_related(artist::Entity)
        .one(conn)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!("artist {} of show {}", show.artist_id, show.id))
        })
}

pub async fn genre_venues(
    conn: &impl ConnectionTrait,
    genre: &genre::Model,
) -> Result<Vec<venue::Model>, DbErr> {
    genre
        .find_related(venue::Entity)
        .order_by_asc(venue::Column::Name)
        .all(conn)
        .await
}

pub async fn genre_artists(
    conn: &impl ConnectionTrait,
    genre: &genre::Model,
) -> Result<Vec<artist::Model>, DbErr> {
    genre
        .find_related(artist::Entity)
        .order_by_asc(artist::Column::Name)
        .all(conn)
        .await
}

pub async fn area_venues(
    conn: &impl ConnectionTrait,
    area: &area::Model,
) -> Result<Vec<venue::Model>, DbErr> {
    venue::Entity::find()
        .filter(venue::Column::AreaId.eq(area.id))
        .order_by_asc(venue::Column::Name)
        .all(conn)
        .await
}
