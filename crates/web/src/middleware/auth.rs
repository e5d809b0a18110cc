//! Member identity extractor and session helpers.
//!
//! Handlers never read the session directly: they take [`OptionalAuth`] and
//! pass `Option<MemberId>` down to the services, which decide whether a
//! member is required.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use nagoyameshi_core::MemberId;

use crate::models::{CurrentMember, session_keys};

/// Extractor that optionally gets the logged-in member.
///
/// Never rejects: a missing session layer or an unreadable session both read
/// as anonymous.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalAuth(member): OptionalAuth) -> impl IntoResponse {
///     match member {
///         Some(m) => format!("Hello, {}!", m.name),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<CurrentMember>);

impl OptionalAuth {
    /// The member's ID, if logged in.
    #[must_use]
    pub fn member_id(&self) -> Option<MemberId> {
        self.0.as_ref().map(|m| m.id)
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let member = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentMember>(session_keys::CURRENT_MEMBER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        if let Some(ref m) = member {
            tracing::Span::current().record("member_id", m.id.as_i32());
        }

        Ok(Self(member))
    }
}

/// Store the logged-in member in the session.
///
/// The session ID is cycled first so a pre-login ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_member(
    session: &Session,
    member: &CurrentMember,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_MEMBER, member).await
}

/// Remove the logged-in member from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_member(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
