//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Redirect to /storeinfo
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (database)
//!
//! # Store directory
//! GET  /storeinfo                     - Search and page through stores
//! GET  /storeinfo/favorites           - The member's favorites
//! GET  /storeinfo/{id}                - Store detail with reviews
//! POST /storeinfo/{id}/favorite       - Add a favorite (members only)
//!
//! # Auth
//! GET  /login                         - Login page
//! POST /login                         - Login action
//! POST /logout                        - Logout action
//! ```

pub mod auth;
pub mod health;
pub mod storeinfo;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the store directory routes router.
pub fn storeinfo_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(storeinfo::index))
        .route("/favorites", get(storeinfo::favorites))
        .route("/{id}", get(storeinfo::show))
        .route("/{id}/favorite", post(storeinfo::add_favorite))
}

/// Create all routes for the web app.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/storeinfo") }))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/storeinfo", storeinfo_routes())
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}
