use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::Response,
};

use super::{FormDescriptor, SHOW_FIELDS};
use crate::http_server::{
    error::Report,
    flash::{Flash, mutation_failure},
    state::AppState,
};
use crate::services::{
    form::FormData,
    show::{ShowInput, ShowListing, ShowService},
};

pub async fn list_shows(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShowListing>>, Report> {
    Ok(Json(ShowService::new(app_state.db.clone()).list().await?))
}

pub async fn create_show_form() -> Json<FormDescriptor> {
    Json(FormDescriptor {
        action: "/shows/create",
        fields: SHOW_FIELDS,
    })
}

pub async fn create_show(
    State(app_state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let input = match ShowInput::from_form(&FormData::new(pairs)) {
        Ok(input) => input,
        Err(err) => return Flash::error(err.to_string()).respond(StatusCode::UNPROCESSABLE_ENTITY),
    };

    match ShowService::new(app_state.db.clone()).create(input).await {
        Ok(show) => Flash::success("Show was successfully listed!")
            .with_id(show.id)
            .respond(StatusCode::CREATED),
        Err(err) => mutation_failure(
            err,
            "An error occurred. Show could not be listed.".to_string(),
        ),
    }
}
