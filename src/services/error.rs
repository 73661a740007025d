use sea_orm::{DbErr, TransactionError};

/// A required form field was missing or could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("The {field} field is required")]
    Missing { field: &'static str },
    #[error("The {field} field is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Venue {id} still has {shows} show(s) and cannot be deleted")]
    VenueHasShows { id: i32, shows: u64 },
    #[error("Artist {id} still has {shows} show(s) and cannot be deleted")]
    ArtistHasShows { id: i32, shows: u64 },
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<TransactionError<ServiceError>> for ServiceError {
    fn from(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Connection(e) => Self::Database(e),
            TransactionError::Transaction(e) => e,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
