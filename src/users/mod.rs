pub mod dto;
pub mod handlers;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::check_routes())
        .merge(handlers::account_routes())
        .merge(handlers::profile_routes())
}
