//! Serializable shapes handed to the presentation layer.

use chrono::NaiveDateTime;
use serde::Serialize;

pub fn format_start_time(start_time: NaiveDateTime) -> String {
    start_time.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<T> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> SearchResults<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// Shows of one venue or artist split around a reference instant.
#[derive(Debug, Clone, Serialize)]
pub struct ShowPartition<T> {
    pub past: Vec<T>,
    pub upcoming: Vec<T>,
}

impl<T> ShowPartition<T> {
    pub fn past_count(&self) -> usize {
        self.past.len()
    }

    pub fn upcoming_count(&self) -> usize {
        self.upcoming.len()
    }
}

/// A show seen from its venue's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistShowView {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

/// A show seen from its artist's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueShowView {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: String,
}

/// Search hit or listing row with its upcoming show count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingSummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: u64,
}
