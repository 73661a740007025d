//! Sample directory for local development, loaded through the regular
//! mutation operations so it exercises the same dedup and transaction paths.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use sea_orm::{EntityTrait, TransactionTrait};

use super::artist::{ArtistInput, ArtistService};
use super::error::{ServiceResult, ValidationError};
use super::form::parse_date_time;
use super::show::{ShowInput, ShowService};
use super::venue::{VenueInput, VenueService};
use crate::database::Database;
use crate::entities::{area, artist, artist_genre, genre, show, venue, venue_genre};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub venues: usize,
    pub artists: usize,
    pub shows: usize,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn sample_venues() -> Vec<VenueInput> {
    vec![
        VenueInput {
            name: "The Musical Hop".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            genres: strings(&["Jazz", "Reggae", "Swing", "Classical", "Folk"]),
            phone: Some("123-123-1234".into()),
            website: Some("https://www.themusicalhop.com".into()),
            facebook_link: Some("https://www.facebook.com/TheMusicalHop".into()),
            seeking_talent: true,
            seeking_description: Some(
                "We are on the lookout for a local artist to play every two weeks. Please call us."
                    .into(),
            ),
            image_link: None,
        },
        VenueInput {
            name: "The Dueling Pianos Bar".into(),
            city: "New York".into(),
            state: "NY".into(),
            address: "335 Delancey Street".into(),
            genres: strings(&["Classical", "R&B", "Hip-Hop"]),
            phone: Some("914-003-1132".into()),
            website: Some("https://www.theduelingpianos.com".into()),
            facebook_link: Some("https://www.facebook.com/theduelingpianos".into()),
            seeking_talent: false,
            seeking_description: None,
            image_link: None,
        },
        VenueInput {
            name: "Park Square Live Music & Coffee".into(),
            city: "san francisco".into(),
            state: "ca".into(),
            address: "34 Whiskey Moore Ave".into(),
            genres: strings(&["Rock n Roll", "jazz", "Classical", "Folk"]),
            phone: Some("415-000-1234".into()),
            website: Some("https://www.parksquarelivemusicandcoffee.com".into()),
            facebook_link: Some("https://www.facebook.com/ParkSquareLiveMusicAndCoffee".into()),
            seeking_talent: false,
            seeking_description: None,
            image_link: None,
        },
    ]
}

fn sample_artists() -> Vec<ArtistInput> {
    vec![
        ArtistInput {
            name: "Guns N Petals".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            genres: strings(&["Rock n Roll"]),
            phone: Some("326-123-5000".into()),
            website: Some("https://www.gunsnpetalsband.com".into()),
            facebook_link: Some("https://www.facebook.com/GunsNPetals".into()),
            seeking_venue: true,
            seeking_description: Some(
                "Looking for shows to perform at in the San Francisco Bay Area!".into(),
            ),
            image_link: None,
        },
        ArtistInput {
            name: "Matt Quevado".into(),
            city: "New York".into(),
            state: "NY".into(),
            genres: strings(&["Jazz"]),
            phone: Some("300-400-5000".into()),
            website: None,
            facebook_link: Some("https://www.facebook.com/mattquevedo923251523".into()),
            seeking_venue: false,
            seeking_description: None,
            image_link: None,
        },
        ArtistInput {
            name: "The Wild Sax Band".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            genres: strings(&["Jazz", "Classical"]),
            phone: Some("432-325-5432".into()),
            website: None,
            facebook_link: None,
            seeking_venue: false,
            seeking_description: None,
            image_link: None,
        },
    ]
}

/// Loads the sample directory. Past shows use fixed dates; upcoming ones are
/// placed after `now` so they stay upcoming.
pub async fn seed(db: Arc<Database>, now: NaiveDateTime) -> ServiceResult<SeedSummary> {
    let venue_service = VenueService::new(db.clone());
    let artist_service = ArtistService::new(db.clone());
    let show_service = ShowService::new(db);

    let mut venues = Vec::new();
    for input in sample_venues() {
        venues.push(venue_service.create(input).await?);
    }
    let mut artists = Vec::new();
    for input in sample_artists() {
        artists.push(artist_service.create(input).await?);
    }

    let past = |value: &str| {
        parse_date_time(value).ok_or_else(|| ValidationError::Invalid {
            field: "start_time",
            reason: format!("`{value}` is not a date and time"),
        })
    };
    let shows = vec![
        (0, 0, past("2019-05-21 21:30:00")?),
        (2, 1, past("2019-06-15 23:00:00")?),
        (2, 2, now + Duration::days(7)),
        (2, 2, now + Duration::days(14)),
        (2, 2, now + Duration::days(21)),
    ];
    for (venue, artist, start_time) in &shows {
        show_service
            .create(ShowInput {
                venue_id: venues[*venue].id,
                artist_id: artists[*artist].id,
                start_time: *start_time,
            })
            .await?;
    }

    log::info!(
        "Seeded {} venues, {} artists, {} shows",
        venues.len(),
        artists.len(),
        shows.len()
    );
    Ok(SeedSummary {
        venues: venues.len(),
        artists: artists.len(),
        shows: shows.len(),
    })
}

/// Deletes every row from every table, children first, in one transaction.
pub async fn clear_all(db: &Database) -> ServiceResult<()> {
    let txn = db.conn.begin().await?;
    show::Entity::delete_many().exec(&txn).await?;
    venue_genre::Entity::delete_many().exec(&txn).await?;
    artist_genre::Entity::delete_many().exec(&txn).await?;
    venue::Entity::delete_many().exec(&txn).await?;
    artist::Entity::delete_many().exec(&txn).await?;
    genre::Entity::delete_many().exec(&txn).await?;
    area::Entity::delete_many().exec(&txn).await?;
    txn.commit().await?;

    log::info!("All tables cleared");
    Ok(())
}
