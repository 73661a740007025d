use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;

use super::error::{ServiceResult, ValidationError};
use super::form::FormData;
use super::views::{ArtistShowView, ShowPartition, VenueShowView, format_start_time};
use crate::database::Database;
use crate::entities::{artist, show, venue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowInput {
    pub venue_id: i32,
    pub artist_id: i32,
    pub start_time: NaiveDateTime,
}

impl ShowInput {
    pub fn from_form(form: &FormData) -> Result<Self, ValidationError> {
        Ok(Self {
            venue_id: form.required_id("venue_id")?,
            artist_id: form.required_id("artist_id")?,
            start_time: form.required_date_time("start_time")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

/// Splits a venue's shows around `now`: past is `start_time < now`,
/// upcoming is `start_time >= now`.
pub async fn partition_venue_shows(
    conn: &impl ConnectionTrait,
    venue_id: i32,
    now: NaiveDateTime,
) -> Result<ShowPartition<ArtistShowView>, DbErr> {
    let base = show::Entity::find().filter(show::Column::VenueId.eq(venue_id));

    let past = base
        .clone()
        .filter(show::Column::StartTime.lt(now))
        .order_by_asc(show::Column::StartTime)
        .find_also_related(artist::Entity)
        .all(conn)
        .await?;
    let upcoming = base
        .filter(show::Column::StartTime.gte(now))
        .order_by_asc(show::Column::StartTime)
        .find_also_related(artist::Entity)
        .all(conn)
        .await?;

    Ok(ShowPartition {
        past: to_artist_views(past),
        upcoming: to_artist_views(upcoming),
    })
}

/// Splits an artist's shows around `now` with the same operators as
/// [`partition_venue_shows`].
pub async fn partition_artist_shows(
    conn: &impl ConnectionTrait,
    artist_id: i32,
    now: NaiveDateTime,
) -> Result<ShowPartition<VenueShowView>, DbErr> {
    let base = show::Entity::find().filter(show::Column::ArtistId.eq(artist_id));

    let past = base
        .clone()
        .filter(show::Column::StartTime.lt(now))
        .order_by_asc(show::Column::StartTime)
        .find_also_related(venue::Entity)
        .all(conn)
        .await?;
    let upcoming = base
        .filter(show::Column::StartTime.gte(now))
        .order_by_asc(show::Column::StartTime)
        .find_also_related(venue::Entity)
        .all(conn)
        .await?;

    Ok(ShowPartition {
        past: to_venue_views(past),
        upcoming: to_venue_views(upcoming),
    })
}

fn to_artist_views(rows: Vec<(show::Model, Option<artist::Model>)>) -> Vec<ArtistShowView> {
    rows.into_iter()
        .filter_map(|(show, artist)| match artist {
            Some(artist) => Some(ArtistShowView {
                artist_id: artist.id,
                artist_name: artist.name,
                artist_image_link: artist.image_link,
                start_time: format_start_time(show.start_time),
            }),
            None => {
                log::warn!("Show {} references missing artist {}", show.id, show.artist_id);
                None
            }
        })
        .collect()
}

fn to_venue_views(rows: Vec<(show::Model, Option<venue::Model>)>) -> Vec<VenueShowView> {
    rows.into_iter()
        .filter_map(|(show, venue)| match venue {
            Some(venue) => Some(VenueShowView {
                venue_id: venue.id,
                venue_name: venue.name,
                venue_image_link: venue.image_link,
                start_time: format_start_time(show.start_time),
            }),
            None => {
                log::warn!("Show {} references missing venue {}", show.id, show.venue_id);
                None
            }
        })
        .collect()
}

/// Number of shows with `start_time > now` per artist. Note the strict
/// comparison: a show starting exactly at `now` is upcoming on the artist's
/// page but is not counted here.
pub async fn upcoming_counts_by_artist(
    conn: &impl ConnectionTrait,
    artist_ids: &[i32],
    now: NaiveDateTime,
) -> Result<HashMap<i32, u64>, DbErr> {
    if artist_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let shows = show::Entity::find()
        .filter(show::Column::ArtistId.is_in(artist_ids.iter().copied()))
        .filter(show::Column::StartTime.gt(now))
        .all(conn)
        .await?;

    let mut counts = HashMap::new();
    for show in shows {
        *counts.entry(show.artist_id).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Venue counterpart of [`upcoming_counts_by_artist`], same `>` comparison.
pub async fn upcoming_counts_by_venue(
    conn: &impl ConnectionTrait,
    venue_ids: &[i32],
    now: NaiveDateTime,
) -> Result<HashMap<i32, u64>, DbErr> {
    if venue_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let shows = show::Entity::find()
        .filter(show::Column::VenueId.is_in(venue_ids.iter().copied()))
        .filter(show::Column::StartTime.gt(now))
        .all(conn)
        .await?;

    let mut counts = HashMap::new();
    for show in shows {
        *counts.entry(show.venue_id).or_insert(0) += 1;
    }
    Ok(counts)
}

pub struct ShowService {
    db: Arc<Database>,
}

impl ShowService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> ServiceResult<Vec<ShowListing>> {
        let shows = show::Entity::find()
            .order_by_asc(show::Column::StartTime)
            .all(&self.db.conn)
            .await?;

        let venue_ids: Vec<i32> = shows.iter().map(|s| s.venue_id).collect();
        let artist_ids: Vec<i32> = shows.iter().map(|s| s.artist_id).collect();

        let venues: HashMap<i32, venue::Model> = venue::Entity::find()
            .filter(venue::Column::Id.is_in(venue_ids))
            .all(&self.db.conn)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();
        let artists: HashMap<i32, artist::Model> = artist::Entity::find()
            .filter(artist::Column::Id.is_in(artist_ids))
            .all(&self.db.conn)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let listings = shows
            .into_iter()
            .filter_map(|show| {
                let venue = venues.get(&show.venue_id)?;
                let artist = artists.get(&show.artist_id)?;
                Some(ShowListing {
                    venue_id: venue.id,
                    venue_name: venue.name.clone(),
                    artist_id: artist.id,
                    artist_name: artist.name.clone(),
                    artist_image_link: artist.image_link.clone(),
                    start_time: format_start_time(show.start_time),
                })
            })
            .collect();

        Ok(listings)
    }

    /// Inserts a show. The referenced venue and artist are only checked by
    /// the foreign keys; a dangling id fails the unit of work.
    pub async fn create(&self, input: ShowInput) -> ServiceResult<show::Model> {
        log::debug!(
            "Creating show: venue={}, artist={}, start={}",
            input.venue_id,
            input.artist_id,
            input.start_time
        );

        let txn = self.db.conn.begin().await?;
        let show = show::ActiveModel {
            start_time: Set(input.start_time),
            venue_id: Set(input.venue_id),
            artist_id: Set(input.artist_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("Show created (ID: {})", show.id);
        Ok(show)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::error::ServiceError;
    use crate::services::test_fixtures::{at, insert_artist, insert_show, insert_venue};
    use crate::test_utils::test_db;
    use chrono::Duration;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_partition_around_now() {
        let db = test_db().await;
        let venue = insert_venue(&db, "The Musical Hop", "San Francisco", "CA", &["Jazz"]).await;
        let artist = insert_artist(&db, "Guns N Petals", &["Rock n Roll"]).await;
        let now = at("2030-06-01 20:00:00");
        insert_show(&db, venue.id, artist.id, now - Duration::hours(1)).await;
        insert_show(&db, venue.id, artist.id, now + Duration::hours(1)).await;

        let by_venue = partition_venue_shows(&db.conn, venue.id, now).await.unwrap();
        assert_eq!(by_venue.past_count(), 1);
        assert_eq!(by_venue.upcoming_count(), 1);
        assert_eq!(by_venue.past[0].start_time, "2030-06-01 19:00:00");
        assert_eq!(by_venue.upcoming[0].start_time, "2030-06-01 21:00:00");
        assert_eq!(by_venue.upcoming[0].artist_name, "Guns N Petals");

        let by_artist = partition_artist_shows(&db.conn, artist.id, now).await.unwrap();
        assert_eq!(by_artist.past_count(), 1);
        assert_eq!(by_artist.upcoming_count(), 1);
        assert_eq!(by_artist.past[0].venue_name, "The Musical Hop");
    }

    #[tokio::test]
    async fn test_show_starting_exactly_now() {
        let db = test_db().await;
        let venue = insert_venue(&db, "The Musical Hop", "San Francisco", "CA", &["Jazz"]).await;
        let artist = insert_artist(&db, "The Wild Sax Band", &["Jazz"]).await;
        let now = at("2030-06-01 20:00:00");
        insert_show(&db, venue.id, artist.id, now).await;

        // Detail pages: `start_time >= now` is upcoming.
        let by_venue = partition_venue_shows(&db.conn, venue.id, now).await.unwrap();
        assert_eq!(by_venue.past_count(), 0);
        assert_eq!(by_venue.upcoming_count(), 1);
        let by_artist = partition_artist_shows(&db.conn, artist.id, now).await.unwrap();
        assert_eq!(by_artist.upcoming_count(), 1);

        // Search aggregate: only `start_time > now` is counted.
        let counts = upcoming_counts_by_artist(&db.conn, &[artist.id], now)
            .await
            .unwrap();
        assert_eq!(counts.get(&artist.id), None);
        let counts = upcoming_counts_by_artist(&db.conn, &[artist.id], now - Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(counts.get(&artist.id), Some(&1));
    }

    #[tokio::test]
    async fn test_upcoming_counts_by_venue() {
        let db = test_db().await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA", &["Jazz"]).await;
        let park = insert_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA", &["Jazz"]).await;
        let artist = insert_artist(&db, "Matt Quevado", &["Jazz"]).await;
        let now = at("2030-06-01 20:00:00");
        insert_show(&db, hop.id, artist.id, now + Duration::days(1)).await;
        insert_show(&db, hop.id, artist.id, now + Duration::days(2)).await;
        insert_show(&db, park.id, artist.id, now - Duration::days(1)).await;

        let counts = upcoming_counts_by_venue(&db.conn, &[hop.id, park.id], now)
            .await
            .unwrap();

        assert_eq!(counts.get(&hop.id), Some(&2));
        assert_eq!(counts.get(&park.id), None);
    }

    #[tokio::test]
    async fn test_list_shows() {
        let db = test_db().await;
        let venue = insert_venue(&db, "The Musical Hop", "San Francisco", "CA", &["Jazz"]).await;
        let artist = insert_artist(&db, "Guns N Petals", &["Rock n Roll"]).await;
        insert_show(&db, venue.id, artist.id, at("2019-05-21 21:30:00")).await;

        let shows = ShowService::new(db).list().await.unwrap();

        assert_eq!(
            shows,
            vec![ShowListing {
                venue_id: venue.id,
                venue_name: "The Musical Hop".into(),
                artist_id: artist.id,
                artist_name: "Guns N Petals".into(),
                artist_image_link: None,
                start_time: "2019-05-21 21:30:00".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_create_show() {
        let db = test_db().await;
        let venue = insert_venue(&db, "The Musical Hop", "San Francisco", "CA", &["Jazz"]).await;
        let artist = insert_artist(&db, "Guns N Petals", &["Rock n Roll"]).await;
        let service = ShowService::new(db.clone());

        let show = service
            .create(ShowInput {
                venue_id: venue.id,
                artist_id: artist.id,
                start_time: at("2035-04-01 20:00:00"),
            })
            .await
            .unwrap();

        assert_eq!(show.venue_id, venue.id);
        assert_eq!(show::Entity::find().count(&db.conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_show_with_dangling_venue_fails() {
        let db = test_db().await;
        let artist = insert_artist(&db, "Guns N Petals", &["Rock n Roll"]).await;
        let service = ShowService::new(db.clone());

        let result = service
            .create(ShowInput {
                venue_id: 9999,
                artist_id: artist.id,
                start_time: at("2035-04-01 20:00:00"),
            })
            .await;

        assert!(matches!(result, Err(ServiceError::Database(_))));
        assert_eq!(show::Entity::find().count(&db.conn).await.unwrap(), 0);
    }
}
