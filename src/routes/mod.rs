use axum::Router;

use crate::state::AppState;

pub mod account;
pub mod auth;
pub mod doc;
pub mod geo;
pub mod health;
pub mod params;
pub mod vouchers;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/account", account::router())
        .nest("/vouchers", vouchers::router())
        .nest("/geo", geo::router())
}
