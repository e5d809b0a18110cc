//! Member management commands.

use std::sync::Arc;

use nagoyameshi_web::db::PgMemberRepository;
use nagoyameshi_web::services::{AuthError, AuthService};
use thiserror::Error;

use super::{CommandError, connect};

/// Errors that can occur during member operations.
#[derive(Debug, Error)]
pub enum MemberError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a member with a password.
///
/// # Returns
///
/// The ID of the created member.
pub async fn create(email: &str, name: &str, password: &str) -> Result<i32, MemberError> {
    let pool = connect().await?;
    let auth = AuthService::new(Arc::new(PgMemberRepository::new(pool)));

    tracing::info!("Creating member: {}", email);
    let member = auth.register(name, email, password).await?;

    tracing::info!(
        "Member created successfully! ID: {}, Email: {}",
        member.id,
        member.email
    );

    Ok(member.id.as_i32())
}
