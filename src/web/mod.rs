// src/web/mod.rs
//! HTTP responder: dashboard page and JSON snapshot

pub mod api;
pub mod server;

pub use api::{create_router, AppState};
pub use server::start_web_server;
