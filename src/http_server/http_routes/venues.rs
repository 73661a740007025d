use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::{FormDescriptor, VENUE_FIELDS, request_now};
use crate::http_server::{
    error::Report,
    flash::{Flash, mutation_failure},
    state::AppState,
};
use crate::services::{
    form::FormData,
    venue::{AreaVenues, VenueDetail, VenueFormValues, VenueInput, VenueService},
    views::{ListingSummary, SearchResults},
};

fn service(app_state: &AppState) -> VenueService {
    VenueService::new(app_state.db.clone())
}

pub async fn list_venues(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<AreaVenues>>, Report> {
    Ok(Json(service(&app_state).list_by_area(request_now()).await?))
}

pub async fn search_venues(
    State(app_state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Json<SearchResults<ListingSummary>>, Report> {
    let form = FormData::new(pairs);
    let results = service(&app_state)
        .search(form.raw("search_term"), request_now())
        .await?;
    Ok(Json(results))
}

pub async fn show_venue(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<VenueDetail>, Report> {
    Ok(Json(service(&app_state).detail(id, request_now()).await?))
}

pub async fn create_venue_form() -> Json<FormDescriptor> {
    Json(FormDescriptor {
        action: "/venues/create",
        fields: VENUE_FIELDS,
    })
}

pub async fn create_venue(
    State(app_state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::new(pairs);
    let name = form.raw("name").to_string();

    let input = match VenueInput::from_form(&form) {
        Ok(input) => input,
        Err(err) => return Flash::error(err.to_string()).respond(StatusCode::UNPROCESSABLE_ENTITY),
    };

    match service(&app_state).create(input).await {
        Ok(venue) => Flash::success(format!("Venue {} was successfully listed!", venue.name))
            .with_id(venue.id)
            .respond(StatusCode::CREATED),
        Err(err) => mutation_failure(
            err,
            format!("An error occurred. Venue {name} could not be listed."),
        ),
    }
}

pub async fn edit_venue_form(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<VenueFormValues>, Report> {
    Ok(Json(service(&app_state).form_values(id).await?))
}

pub async fn edit_venue(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::new(pairs);
    let name = form.raw("name").to_string();

    let input = match VenueInput::from_form(&form) {
        Ok(input) => input,
        Err(err) => return Flash::error(err.to_string()).respond(StatusCode::UNPROCESSABLE_ENTITY),
    };

    match service(&app_state).update(id, input).await {
        Ok(venue) => Flash::success(format!("Venue {} was successfully updated!", venue.name))
            .with_id(venue.id)
            .respond(StatusCode::OK),
        Err(err) => mutation_failure(
            err,
            format!("An error occurred. Venue {name} could not be updated."),
        ),
    }
}

pub async fn delete_venue(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Report> {
    service(&app_state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
