pub mod artists;
pub mod home;
pub mod shows;
pub mod venues;

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

/// The single instant a request classifies shows against.
pub(crate) fn request_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Describes one field of a submission form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,
}

const fn field(name: &'static str, required: bool) -> FormField {
    FormField {
        name,
        required,
        multiple: false,
    }
}

const fn multiple(name: &'static str) -> FormField {
    FormField {
        name,
        required: true,
        multiple: true,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormDescriptor {
    pub action: &'static str,
    pub fields: &'static [FormField],
}

pub const VENUE_FIELDS: &[FormField] = &[
    field("name", true),
    field("city", true),
    field("state", true),
    field("address", true),
    multiple("genres"),
    field("phone", false),
    field("website", false),
    field("facebook_link", false),
    field("seeking_talent", false),
    field("seeking_description", false),
    field("image_link", false),
];

pub const ARTIST_FIELDS: &[FormField] = &[
    field("name", true),
    field("city", true),
    field("state", true),
    multiple("genres"),
    field("phone", false),
    field("website", false),
    field("facebook_link", false),
    field("seeking_venue", false),
    field("seeking_description", false),
    field("image_link", false),
];

pub const SHOW_FIELDS: &[FormField] = &[
    field("artist_id", true),
    field("venue_id", true),
    field("start_time", true),
];
