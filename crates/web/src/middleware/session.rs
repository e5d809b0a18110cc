//! Session middleware configuration.
//!
//! Production uses the `PostgreSQL` store from `tower-sessions-sqlx-store`;
//! tests pass a `MemoryStore`. Cookies are signed with the configured
//! session secret.

use secrecy::ExposeSecret;
use thiserror::Error;
use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore, cookie::Key, service::SignedCookie,
};

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "nagoyameshi_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The session secret could not be turned into a signing key.
#[derive(Debug, Error)]
#[error("invalid session key: {0}")]
pub struct SessionKeyError(String);

/// Session layer type used by the application.
pub type AppSessionLayer<S> = SessionManagerLayer<S, SignedCookie>;

/// Create the signed session layer over `store`.
///
/// The cookie is marked `Secure` only when the site is served over HTTPS.
///
/// # Errors
///
/// Returns `SessionKeyError` if the secret is shorter than 64 bytes.
pub fn create_session_layer<S>(
    store: S,
    config: &WebConfig,
) -> Result<AppSessionLayer<S>, SessionKeyError>
where
    S: SessionStore + Clone,
{
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())
        .map_err(|e| SessionKeyError(e.to_string()))?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
