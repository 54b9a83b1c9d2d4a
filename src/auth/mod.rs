use axum::Router;

use crate::state::AppState;

mod dto;
pub(crate) mod extractors;
pub mod handlers;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
