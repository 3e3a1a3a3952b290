use axum::Router;

use crate::state::AppState;

pub mod client;
pub mod dto;
pub mod handlers;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::news_routes()
}
