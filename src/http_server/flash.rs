use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::services::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

/// One-shot user notification returned by every mutating route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
            id: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn respond(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Maps a failed mutation to its flash. Client errors echo the error itself;
/// anything else is logged and reported with `failure_message`.
pub fn mutation_failure(err: ServiceError, failure_message: String) -> Response {
    match err.status() {
        Some(status) => Flash::error(err.to_string()).respond(status),
        None => {
            log::error!("{failure_message}: {err}");
            Flash::error(failure_message).respond(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::error::ValidationError;

    #[test]
    fn test_flash_serializes_without_id() {
        let json = serde_json::to_value(Flash::success("Show was successfully listed!")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"level": "success", "message": "Show was successfully listed!"})
        );
    }

    #[test]
    fn test_mutation_failure_status() {
        let response = mutation_failure(
            ValidationError::Missing { field: "name" }.into(),
            "unused".to_string(),
        );
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = mutation_failure(
            ServiceError::Database(sea_orm::DbErr::Custom("boom".into())),
            "An error occurred. Show could not be listed.".to_string(),
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
