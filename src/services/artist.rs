use std::sync::Arc;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;

use super::error::{ServiceError, ServiceResult, ValidationError};
use super::form::FormData;
use super::lookup::{replace_artist_genres, resolve_genres};
use super::relations::artist_genres;
use super::search::NameSearch;
use super::show::{partition_artist_shows, upcoming_counts_by_artist};
use super::views::{ListingSummary, SearchResults, VenueShowView};
use crate::database::Database;
use crate::entities::{artist, artist_genre, show};

/// Validated artist submission. City and state are kept as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub genres: Vec<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
}

impl ArtistInput {
    pub fn from_form(form: &FormData) -> Result<Self, ValidationError> {
        Ok(Self {
            name: form.required("name")?,
            city: form.required("city")?,
            state: form.required("state")?,
            genres: form.required_all("genres")?,
            phone: form.optional("phone"),
            website: form.optional("website"),
            facebook_link: form.optional("facebook_link"),
            seeking_venue: form.flag("seeking_venue"),
            seeking_description: form.optional("seeking_description"),
            image_link: form.optional("image_link"),
        })
    }

    fn apply(self, model: &mut artist::ActiveModel) {
        model.name = Set(self.name);
        model.city = Set(self.city);
        model.state = Set(self.state);
        model.phone = Set(self.phone);
        model.website = Set(self.website);
        model.facebook_link = Set(self.facebook_link);
        model.seeking_venue = Set(self.seeking_venue);
        model.seeking_description = Set(self.seeking_description);
        model.image_link = Set(self.image_link);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistListing {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistDetail {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<VenueShowView>,
    pub upcoming_shows: Vec<VenueShowView>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistFormValues {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
}

pub struct ArtistService {
    db: Arc<Database>,
}

impl ArtistService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> ServiceResult<Vec<ArtistListing>> {
        let artists = artist::Entity::find()
            .order_by_asc(artist::Column::Name)
            .all(&self.db.conn)
            .await?;

        Ok(artists
            .into_iter()
            .map(|a| ArtistListing {
                id: a.id,
                name: a.name,
            })
            .collect())
    }

    /// Name search; each hit carries its count of shows strictly after `now`.
    pub async fn search(
        &self,
        term: &str,
        now: NaiveDateTime,
    ) -> ServiceResult<SearchResults<ListingSummary>> {
        log::debug!("Searching artists for '{}'", term);
        let artists = NameSearch::new(term).filter(
            artist::Entity::find()
                .order_by_asc(artist::Column::Name)
                .all(&self.db.conn)
                .await?,
            |row| row.name.as_str(),
        );

        let ids: Vec<i32> = artists.iter().map(|a| a.id).collect();
        let counts = upcoming_counts_by_artist(&self.db.conn, &ids, now).await?;

        Ok(SearchResults::new(
            artists
                .into_iter()
                .map(|a| ListingSummary {
                    num_upcoming_shows: counts.get(&a.id).copied().unwrap_or(0),
                    id: a.id,
                    name: a.name,
                })
                .collect(),
        ))
    }

    pub async fn get(&self, id: i32) -> ServiceResult<artist::Model> {
        artist::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or(ServiceError::not_found("Artist", id))
    }

    pub async fn detail(&self, id: i32, now: NaiveDateTime) -> ServiceResult<ArtistDetail> {
        let artist = self.get(id).await?;
        let genres = artist_genres(&self.db.conn, &artist).await?;
        let shows = partition_artist_shows(&self.db.conn, id, now).await?;

        Ok(ArtistDetail {
            id: artist.id,
            name: artist.name,
            genres: genres.into_iter().map(|g| g.name).collect(),
            city: artist.city,
            state: artist.state,
            phone: artist.phone,
            website: artist.website,
            facebook_link: artist.facebook_link,
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description,
            image_link: artist.image_link,
            past_shows_count: shows.past_count(),
            upcoming_shows_count: shows.upcoming_count(),
            past_shows: shows.past,
            upcoming_shows: shows.upcoming,
        })
    }

    pub async fn form_values(&self, id: i32) -> ServiceResult<ArtistFormValues> {
        let artist = self.get(id).await?;
        let genres = artist_genres(&self.db.conn, &artist).await?;

        Ok(ArtistFormValues {
            id: artist.id,
            name: artist.name,
            genres: genres.into_iter().map(|g| g.name).collect(),
            city: artist.city,
            state: artist.state,
            phone: artist.phone,
            website: artist.website,
            facebook_link: artist.facebook_link,
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description,
            image_link: artist.image_link,
        })
    }

    pub async fn create(&self, input: ArtistInput) -> ServiceResult<artist::Model> {
        log::debug!("Creating artist: '{}'", input.name);

        let artist = self
            .db
            .conn
            .transaction::<_, artist::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let genres = resolve_genres(txn, &input.genres).await?;

                    let mut model: artist::ActiveModel = Default::default();
                    input.apply(&mut model);
                    let artist = model.insert(txn).await?;

                    replace_artist_genres(txn, artist.id, &genres).await?;
                    Ok(artist)
                })
            })
            .await?;

        log::info!("Artist created: '{}' (ID: {})", artist.name, artist.id);
        Ok(artist)
    }

    /// Overwrites every field and replaces the genre list.
    pub async fn update(&self, id: i32, input: ArtistInput) -> ServiceResult<artist::Model> {
        log::debug!("Updating artist {}: '{}'", id, input.name);

        let artist = self
            .db
            .conn
            .transaction::<_, artist::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = artist::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(ServiceError::not_found("Artist", id))?;

                    let genres = resolve_genres(txn, &input.genres).await?;

                    let mut model: artist::ActiveModel = existing.into();
                    input.apply(&mut model);
                    let artist = model.update(txn).await?;

                    replace_artist_genres(txn, artist.id, &genres).await?;
                    Ok(artist)
                })
            })
            .await?;

        log::info!("Artist updated: '{}' (ID: {})", artist.name, artist.id);
        Ok(artist)
    }

    /// Deletes an artist that has no shows; see [`ServiceError::ArtistHasShows`].
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        log::debug!("Deleting artist {}", id);

        self.db
            .conn
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let artist = artist::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(ServiceError::not_found("Artist", id))?;

                    let shows = show::Entity::find()
                        .filter(show::Column::ArtistId.eq(id))
                        .count(txn)
                        .await?;
                    if shows > 0 {
                        return Err(ServiceError::ArtistHasShows { id, shows });
                    }

                    artist_genre::Entity::delete_many()
                        .filter(artist_genre::Column::ArtistId.eq(id))
                        .exec(txn)
                        .await?;
                    artist.delete(txn).await?;
                    Ok(())
                })
            })
            .await?;

        log::info!("Artist deleted (ID: {})", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::genre;
    use crate::services::test_fixtures::{at, insert_artist, insert_show, insert_venue};
    use crate::test_utils::test_db;
    use chrono::Duration;

    fn input(name: &str, genres: &[&str]) -> ArtistInput {
        ArtistInput {
            name: name.into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            phone: Some("326-123-5000".into()),
            website: Some("https://www.gunsnpetalsband.com".into()),
            facebook_link: None,
            seeking_venue: true,
            seeking_description: None,
            image_link: None,
        }
    }

    async fn seed_search_artists(db: &Database) {
        insert_artist(db, "Guns N Petals", &["Rock n Roll"]).await;
        insert_artist(db, "Matt Quevado", &["Jazz"]).await;
        insert_artist(db, "The Wild Sax Band", &["Jazz", "Classical"]).await;
    }

    #[tokio::test]
    async fn test_search_band() {
        let db = test_db().await;
        seed_search_artists(&db).await;

        let results = ArtistService::new(db)
            .search("band", at("2030-01-01 00:00:00"))
            .await
            .unwrap();

        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].name, "The Wild Sax Band");
    }

    #[tokio::test]
    async fn test_search_single_letter_matches_all() {
        let db = test_db().await;
        seed_search_artists(&db).await;

        let results = ArtistService::new(db)
            .search("A", at("2030-01-01 00:00:00"))
            .await
            .unwrap();

        assert_eq!(results.count, 3);
    }

    #[tokio::test]
    async fn test_search_counts_upcoming_shows() {
        let db = test_db().await;
        let venue = insert_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA", &["Jazz"]).await;
        let sax = insert_artist(&db, "The Wild Sax Band", &["Jazz"]).await;
        let now = at("2030-06-01 20:00:00");
        insert_show(&db, venue.id, sax.id, now + Duration::days(7)).await;
        insert_show(&db, venue.id, sax.id, now + Duration::days(14)).await;
        insert_show(&db, venue.id, sax.id, now - Duration::days(7)).await;
        insert_show(&db, venue.id, sax.id, now).await;

        let results = ArtistService::new(db).search("sax", now).await.unwrap();

        assert_eq!(results.data[0].num_upcoming_shows, 2);
    }

    #[tokio::test]
    async fn test_create_and_detail() {
        let db = test_db().await;
        let service = ArtistService::new(db.clone());

        let artist = service
            .create(input("Guns N Petals", &["rock n roll"]))
            .await
            .unwrap();
        let detail = service.detail(artist.id, at("2030-01-01 00:00:00")).await.unwrap();

        assert_eq!(detail.name, "Guns N Petals");
        assert_eq!(detail.genres, vec!["Rock N Roll"]);
        assert_eq!(detail.city, "San Francisco");
        assert!(detail.seeking_venue);
        assert_eq!(detail.past_shows_count, 0);
    }

    #[tokio::test]
    async fn test_update_replaces_genres() {
        let db = test_db().await;
        let service = ArtistService::new(db.clone());
        let artist = service.create(input("Matt Quevado", &["Jazz"])).await.unwrap();

        let mut changed = input("Matt Quevado", &["Swing", "Blues"]);
        changed.city = "New York".into();
        changed.state = "NY".into();
        service.update(artist.id, changed).await.unwrap();

        let values = service.form_values(artist.id).await.unwrap();
        assert_eq!(values.genres, vec!["Blues", "Swing"]);
        assert_eq!(values.city, "New York");
        // Jazz stays in the lookup table even though nobody references it.
        assert_eq!(genre::Entity::find().count(&db.conn).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_detail_not_found() {
        let db = test_db().await;

        let result = ArtistService::new(db).form_values(3).await;

        assert!(matches!(
            result,
            Err(ServiceError::NotFound {
                entity: "Artist",
                id: 3
            })
        ));
    }

    #[tokio::test]
    async fn test_delete_artist_with_shows_is_rejected() {
        let db = test_db().await;
        let venue = insert_venue(&db, "The Musical Hop", "San Francisco", "CA", &["Jazz"]).await;
        let artist = insert_artist(&db, "Guns N Petals", &["Rock n Roll"]).await;
        insert_show(&db, venue.id, artist.id, at("2019-05-21 21:30:00")).await;
        let service = ArtistService::new(db.clone());

        assert!(matches!(
            service.delete(artist.id).await,
            Err(ServiceError::ArtistHasShows { shows: 1, .. })
        ));
        assert_eq!(artist::Entity::find().count(&db.conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_artist() {
        let db = test_db().await;
        let artist = insert_artist(&db, "Matt Quevado", &["Jazz"]).await;

        ArtistService::new(db.clone()).delete(artist.id).await.unwrap();

        assert_eq!(artist::Entity::find().count(&db.conn).await.unwrap(), 0);
        assert_eq!(artist_genre::Entity::find().count(&db.conn).await.unwrap(), 0);
    }
}
