//! Query and mutation operations over the booking directory.
//!
//! Read paths take an explicit `now` so past/upcoming classification is
//! evaluated against a single instant per request. Every mutation runs as
//! one transaction: committed as a whole or rolled back as a whole.

pub mod artist;
pub mod error;
pub mod form;
pub mod lookup;
pub mod relations;
pub mod sample_data;
pub mod search;
pub mod show;
pub mod venue;
pub mod views;

#[cfg(test)]
pub mod test_fixtures;

pub use error::ServiceError;
