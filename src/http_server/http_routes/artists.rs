use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::{ARTIST_FIELDS, FormDescriptor, request_now};
use crate::http_server::{
    error::Report,
    flash::{Flash, mutation_failure},
    state::AppState,
};
use crate::services::{
    artist::{ArtistDetail, ArtistFormValues, ArtistInput, ArtistListing, ArtistService},
    form::FormData,
    views::{ListingSummary, SearchResults},
};

fn service(app_state: &AppState) -> ArtistService {
    ArtistService::new(app_state.db.clone())
}

pub async fn list_artists(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ArtistListing>>, Report> {
    Ok(Json(service(&app_state).list().await?))
}

pub async fn search_artists(
    State(app_state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Json<SearchResults<ListingSummary>>, Report> {
    let form = FormData::new(pairs);
    let results = service(&app_state)
        .search(form.raw("search_term"), request_now())
        .await?;
    Ok(Json(results))
}

pub async fn show_artist(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ArtistDetail>, Report> {
    Ok(Json(service(&app_state).detail(id, request_now()).await?))
}

pub async fn create_artist_form() -> Json<FormDescriptor> {
    Json(FormDescriptor {
        action: "/artists/create",
        fields: ARTIST_FIELDS,
    })
}

pub async fn create_artist(
    State(app_state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::new(pairs);
    let name = form.raw("name").to_string();

    let input = match ArtistInput::from_form(&form) {
        Ok(input) => input,
        Err(err) => return Flash::error(err.to_string()).respond(StatusCode::UNPROCESSABLE_ENTITY),
    };

    match service(&app_state).create(input).await {
        Ok(artist) => Flash::success(format!("Artist {} was successfully listed!", artist.name))
            .with_id(artist.id)
            .respond(StatusCode::CREATED),
        Err(err) => mutation_failure(
            err,
            format!("An error occurred. Artist {name} could not be listed."),
        ),
    }
}

pub async fn edit_artist_form(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ArtistFormValues>, Report> {
    Ok(Json(service(&app_state).form_values(id).await?))
}

pub async fn edit_artist(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::new(pairs);
    let name = form.raw("name").to_string();

    let input = match ArtistInput::from_form(&form) {
        Ok(input) => input,
        Err(err) => return Flash::error(err.to_string()).respond(StatusCode::UNPROCESSABLE_ENTITY),
    };

    match service(&app_state).update(id, input).await {
        Ok(artist) => Flash::success(format!("Artist {} was successfully updated!", artist.name))
            .with_id(artist.id)
            .respond(StatusCode::OK),
        Err(err) => mutation_failure(
            err,
            format!("An error occurred. Artist {name} could not be updated."),
        ),
    }
}

pub async fn delete_artist(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Report> {
    service(&app_state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
