use axum::{
    Json,
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};

use crate::http_server::flash::Flash;
use crate::services::ServiceError;

// A generic error report
// Produced via `Err(some_err).wrap_err("Some context")`
// or `Err(color_eyre::eyre::Report::new(SomeError))`
pub struct Report(color_eyre::Report);

impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<E> From<E> for Report
where
    E: Into<color_eyre::Report>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl ServiceError {
    /// Status for errors the caller can act on; `None` means a server fault.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ServiceError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            ServiceError::Validation(_) => Some(StatusCode::UNPROCESSABLE_ENTITY),
            ServiceError::VenueHasShows { .. } | ServiceError::ArtistHasShows { .. } => {
                Some(StatusCode::CONFLICT)
            }
            ServiceError::Database(_) => None,
        }
    }
}

// Tell axum how to convert `Report` into a response.
impl IntoResponse for Report {
    fn into_response(self) -> Response<Body> {
        let err = self.0;

        if let Some(service_err) = err.downcast_ref::<ServiceError>()
            && let Some(status) = service_err.status()
        {
            log::debug!("{service_err}");
            return (status, Json(Flash::error(service_err.to_string()))).into_response();
        }

        log::error!("{err:?}");

        // Fallback
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Flash::error("Something went wrong")),
        )
            .into_response()
    }
}
