// src/web/api.rs
//! Routes served to dashboard clients

use crate::{
    export::{self, Snapshot},
    nav::NavStore,
};
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, Json},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

#[derive(Clone)]
pub struct AppState {
    pub store: NavStore,
}

pub async fn get_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn get_data(State(state): State<AppState>) -> Json<Snapshot> {
    Json(export::snapshot(&state.store))
}

async fn not_found(uri: Uri) -> StatusCode {
    debug!(%uri, "No route");
    StatusCode::NOT_FOUND
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_index))
        .route("/index", get(get_index))
        .route("/index.html", get(get_index))
        .route("/data", get(get_data))
        .fallback(not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
