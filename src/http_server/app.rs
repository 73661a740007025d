use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    response::Response,
    routing::{get, post},
};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    database::Database,
    http_server::{
        flash::Flash,
        http_routes::{artists, home, shows, venues},
        state::AppState,
    },
};

pub struct HttpServerConfig {
    pub port: u16,
    pub database: Database,
}

async fn not_found() -> Response {
    Flash::error("Not found").respond(StatusCode::NOT_FOUND)
}

pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home::home))
        .route("/venues", get(venues::list_venues))
        .route("/venues/search", post(venues::search_venues))
        .route(
            "/venues/create",
            get(venues::create_venue_form).post(venues::create_venue),
        )
        .route(
            "/venues/{id}",
            get(venues::show_venue).delete(venues::delete_venue),
        )
        .route(
            "/venues/{id}/edit",
            get(venues::edit_venue_form).post(venues::edit_venue),
        )
        .route("/artists", get(artists::list_artists))
        .route("/artists/search", post(artists::search_artists))
        .route(
            "/artists/create",
            get(artists::create_artist_form).post(artists::create_artist),
        )
        .route(
            "/artists/{id}",
            get(artists::show_artist).delete(artists::delete_artist),
        )
        .route(
            "/artists/{id}/edit",
            get(artists::edit_artist_form).post(artists::edit_artist),
        )
        .route("/shows", get(shows::list_shows))
        .route(
            "/shows/create",
            get(shows::create_show_form).post(shows::create_show),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(app_state)
}

#[cfg(debug_assertions)]
fn cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

#[cfg(not(debug_assertions))]
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
}

pub async fn start(config: HttpServerConfig) -> color_eyre::Result<()> {
    let HttpServerConfig { port, database } = config;
    let app_state = Arc::new(AppState {
        db: Arc::new(database),
    });

    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", port))?;
    log::info!("Listening on http://0.0.0.0:{port}");
    axum::serve(listener, app)
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}
