use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Home {
    name: &'static str,
    links: [&'static str; 3],
}

pub async fn home() -> Json<Home> {
    Json(Home {
        name: "Fyyur",
        links: ["/venues", "/artists", "/shows"],
    })
}
