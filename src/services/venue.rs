use std::sync::Arc;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;

use super::error::{ServiceError, ServiceResult, ValidationError};
use super::form::FormData;
use super::lookup::{replace_venue_genres, resolve_area, resolve_genres};
use super::relations::{venue_genres, venue_with_area};
use super::search::NameSearch;
use super::show::{partition_venue_shows, upcoming_counts_by_venue};
use super::views::{ArtistShowView, ListingSummary, SearchResults};
use crate::database::Database;
use crate::entities::{area, show, venue, venue_genre};

/// Validated venue submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub genres: Vec<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
}

impl VenueInput {
    pub fn from_form(form: &FormData) -> Result<Self, ValidationError> {
        Ok(Self {
            name: form.required("name")?,
            city: form.required("city")?,
            state: form.required("state")?,
            address: form.required("address")?,
            genres: form.required_all("genres")?,
            phone: form.optional("phone"),
            website: form.optional("website"),
            facebook_link: form.optional("facebook_link"),
            seeking_talent: form.flag("seeking_talent"),
            seeking_description: form.optional("seeking_description"),
            image_link: form.optional("image_link"),
        })
    }

    fn apply(self, model: &mut venue::ActiveModel, area_id: i32) {
        model.name = Set(self.name);
        model.address = Set(self.address);
        model.area_id = Set(area_id);
        model.phone = Set(self.phone);
        model.website = Set(self.website);
        model.facebook_link = Set(self.facebook_link);
        model.seeking_talent = Set(self.seeking_talent);
        model.seeking_description = Set(self.seeking_description);
        model.image_link = Set(self.image_link);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaVenues {
    pub city: String,
    pub state: String,
    pub venues: Vec<ListingSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VenueDetail {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<ArtistShowView>,
    pub upcoming_shows: Vec<ArtistShowView>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Current values used to prefill the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueFormValues {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
}

pub struct VenueService {
    db: Arc<Database>,
}

impl VenueService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> ServiceResult<Vec<venue::Model>> {
        Ok(venue::Entity::find()
            .order_by_asc(venue::Column::Name)
            .all(&self.db.conn)
            .await?)
    }

    /// Every area that has venues, each venue with its upcoming show count.
    pub async fn list_by_area(&self, now: NaiveDateTime) -> ServiceResult<Vec<AreaVenues>> {
        let areas = area::Entity::find()
            .order_by_asc(area::Column::State)
            .order_by_asc(area::Column::City)
            .all(&self.db.conn)
            .await?;
        let venues = self.list().await?;

        let venue_ids: Vec<i32> = venues.iter().map(|v| v.id).collect();
        let counts = upcoming_counts_by_venue(&self.db.conn, &venue_ids, now).await?;

        let grouped = areas
            .into_iter()
            .filter_map(|area| {
                let venues: Vec<ListingSummary> = venues
                    .iter()
                    .filter(|v| v.area_id == area.id)
                    .map(|v| ListingSummary {
                        id: v.id,
                        name: v.name.clone(),
                        num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
                    })
                    .collect();
                if venues.is_empty() {
                    return None;
                }
                Some(AreaVenues {
                    city: area.city,
                    state: area.state,
                    venues,
                })
            })
            .collect();

        Ok(grouped)
    }

    pub async fn search(
        &self,
        term: &str,
        now: NaiveDateTime,
    ) -> ServiceResult<SearchResults<ListingSummary>> {
        log::debug!("Searching venues for '{}'", term);
        let venues = NameSearch::new(term).filter(
            venue::Entity::find()
                .order_by_asc(venue::Column::Name)
                .all(&self.db.conn)
                .await?,
            |row| row.name.as_str(),
        );

        let ids: Vec<i32> = venues.iter().map(|v| v.id).collect();
        let counts = upcoming_counts_by_venue(&self.db.conn, &ids, now).await?;

        Ok(SearchResults::new(
            venues
                .into_iter()
                .map(|v| ListingSummary {
                    num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
                    id: v.id,
                    name: v.name,
                })
                .collect(),
        ))
    }

    pub async fn detail(&self, id: i32, now: NaiveDateTime) -> ServiceResult<VenueDetail> {
        let joined = venue_with_area(&self.db.conn, id)
            .await?
            .ok_or(ServiceError::not_found("Venue", id))?;
        let genres = venue_genres(&self.db.conn, &joined.venue).await?;
        let shows = partition_venue_shows(&self.db.conn, id, now).await?;

        let city = joined.city().to_string();
        let state = joined.state().to_string();
        let venue = joined.venue;
        Ok(VenueDetail {
            id: venue.id,
            name: venue.name,
            genres: genres.into_iter().map(|g| g.name).collect(),
            address: venue.address,
            city,
            state,
            phone: venue.phone,
            website: venue.website,
            facebook_link: venue.facebook_link,
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description,
            image_link: venue.image_link,
            past_shows_count: shows.past_count(),
            upcoming_shows_count: shows.upcoming_count(),
            past_shows: shows.past,
            upcoming_shows: shows.upcoming,
        })
    }

    pub async fn form_values(&self, id: i32) -> ServiceResult<VenueFormValues> {
        let joined = venue_with_area(&self.db.conn, id)
            .await?
            .ok_or(ServiceError::not_found("Venue", id))?;
        let genres = venue_genres(&self.db.conn, &joined.venue).await?;

        let city = joined.city().to_string();
        let state = joined.state().to_string();
        let venue = joined.venue;
        Ok(VenueFormValues {
            id: venue.id,
            name: venue.name,
            genres: genres.into_iter().map(|g| g.name).collect(),
            address: venue.address,
            city,
            state,
            phone: venue.phone,
            website: venue.website,
            facebook_link: venue.facebook_link,
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description,
            image_link: venue.image_link,
        })
    }

    /// Creates the venue together with any new area or genre rows it needs,
    /// all in one transaction.
    pub async fn create(&self, input: VenueInput) -> ServiceResult<venue::Model> {
        log::debug!("Creating venue: '{}'", input.name);

        let venue = self
            .db
            .conn
            .transaction::<_, venue::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let area = resolve_area(txn, &input.city, &input.state).await?;
                    let genres = resolve_genres(txn, &input.genres).await?;

                    let mut model: venue::ActiveModel = Default::default();
                    input.apply(&mut model, area.id);
                    let venue = model.insert(txn).await?;

                    replace_venue_genres(txn, venue.id, &genres).await?;
                    Ok(venue)
                })
            })
            .await?;

        log::info!("Venue created: '{}' (ID: {})", venue.name, venue.id);
        Ok(venue)
    }

    /// Overwrites every field, re-resolves the area and replaces the genre list.
    pub async fn update(&self, id: i32, input: VenueInput) -> ServiceResult<venue::Model> {
        log::debug!("Updating venue {}: '{}'", id, input.name);

        let venue = self
            .db
            .conn
            .transaction::<_, venue::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = venue::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(ServiceError::not_found("Venue", id))?;

                    let area = resolve_area(txn, &input.city, &input.state).await?;
                    let genres = resolve_genres(txn, &input.genres).await?;

                    let mut model: venue::ActiveModel = existing.into();
                    input.apply(&mut model, area.id);
                    let venue = model.update(txn).await?;

                    replace_venue_genres(txn, venue.id, &genres).await?;
                    Ok(venue)
                })
            })
            .await?;

        log::info!("Venue updated: '{}' (ID: {})", venue.name, venue.id);
        Ok(venue)
    }

    /// Deletes a venue that has no shows. Venues with shows are rejected with
    /// [`ServiceError::VenueHasShows`] and left untouched.
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        log::debug!("Deleting venue {}", id);

        self.db
            .conn
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let venue = venue::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(ServiceError::not_found("Venue", id))?;

                    let shows = show::Entity::find()
                        .filter(show::Column::VenueId.eq(id))
                        .count(txn)
                        .await?;
                    if shows > 0 {
                        return Err(ServiceError::VenueHasShows { id, shows });
                    }

                    venue_genre::Entity::delete_many()
                        .filter(venue_genre::Column::VenueId.eq(id))
                        .exec(txn)
                        .await?;
                    venue.delete(txn).await?;
                    Ok(())
                })
            })
            .await?;

        log::info!("Venue deleted (ID: {})", id);
        Ok(())
    }
}
