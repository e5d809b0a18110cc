//! HTTP middleware stack for the web app.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAuth, clear_current_member, set_current_member};
pub use request_id::request_id_middleware;
pub use session::{AppSessionLayer, create_session_layer};
