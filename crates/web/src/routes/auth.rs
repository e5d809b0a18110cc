//! Login and logout handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{LOGIN_PATH, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_member, set_current_member};
use crate::models::CurrentMember;
use crate::services::AuthError;
use crate::state::AppState;

/// Where members land after logging in or out.
const HOME_PATH: &str = "/storeinfo";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub member: Option<CurrentMember>,
    pub error: Option<&'static str>,
}

/// User-facing text for a `?error=` code.
fn error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Invalid email or password.",
        "session" => "Could not start your session. Please try again.",
        _ => "Something went wrong. Please try again.",
    }
}

/// `GET /login` - display the login form.
pub async fn login_page(auth: OptionalAuth, Query(query): Query<MessageQuery>) -> Response {
    if auth.0.is_some() {
        return Redirect::to(HOME_PATH).into_response();
    }

    LoginTemplate {
        member: None,
        error: query.error.as_deref().map(error_message),
    }
    .into_response()
}

/// `POST /login` - check the password and start a member session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let member = match state.auth().login(&form.email, &form.password).await {
        Ok(member) => member,
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
            tracing::warn!("Login failed: invalid credentials");
            return Redirect::to(&format!("{LOGIN_PATH}?error=credentials")).into_response();
        }
        Err(e) => return crate::error::AppError::from(e).into_response(),
    };

    let current = CurrentMember::from(&member);
    if let Err(e) = set_current_member(&session, &current).await {
        tracing::error!("Failed to set session: {}", e);
        return Redirect::to(&format!("{LOGIN_PATH}?error=session")).into_response();
    }

    set_sentry_user(&member.id, Some(member.email.as_str()));
    tracing::info!(member_id = %member.id, "Member logged in");

    Redirect::to(HOME_PATH).into_response()
}

/// `POST /logout` - end the member session.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_member(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();

    Redirect::to(HOME_PATH).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_codes() {
        assert_eq!(error_message("credentials"), "Invalid email or password.");
        assert_eq!(
            error_message("bogus"),
            "Something went wrong. Please try again."
        );
    }
}
