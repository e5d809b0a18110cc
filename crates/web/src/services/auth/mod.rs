//! Authentication service.
//!
//! Members log in with email and password; the password is stored as an
//! argon2id PHC string. Successful logins put a [`CurrentMember`] in the
//! session (see [`crate::middleware::auth`]).
//!
//! [`CurrentMember`]: crate::models::CurrentMember

mod error;

pub use error::AuthError;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::instrument;

use nagoyameshi_core::Email;

use crate::db::{MemberRepository, RepositoryError};
use crate::models::Member;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    members: Arc<dyn MemberRepository>,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed.
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password does not match.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Member, AuthError> {
        let email = Email::parse(email)?;

        let (member, password_hash) = self
            .members
            .find_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        tracing::info!(member_id = %member.id, "Member logged in");
        Ok(member)
    }

    /// Register a member with a validated, hashed password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::MemberAlreadyExists` if the email is taken.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Member, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.members
            .create(name, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::MemberAlreadyExists,
                other => AuthError::Repository(other),
            })
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

/// Check a password against the minimum requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using argon2id with a random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password does not match.
/// Returns `AuthError::PasswordHash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use nagoyameshi_core::MemberId;

    use super::*;
    use crate::db::members::MockMemberRepository;

    fn member() -> Member {
        Member {
            id: MemberId::new(1),
            name: "Hanako".to_owned(),
            email: Email::parse("hanako@example.jp").unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::PasswordHash)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[tokio::test]
    async fn login_succeeds_with_matching_password() {
        let hash = hash_password("miso-katsu-2024").unwrap();
        let mut members = MockMemberRepository::new();
        members
            .expect_find_with_password_hash()
            .returning(move |_| Ok(Some((member(), hash.clone()))));

        let auth = AuthService::new(Arc::new(members));
        let logged_in = auth
            .login("Hanako@Example.jp", "miso-katsu-2024")
            .await
            .unwrap();
        assert_eq!(logged_in.id, MemberId::new(1));
    }

    #[tokio::test]
    async fn login_unknown_email_is_invalid_credentials() {
        let mut members = MockMemberRepository::new();
        members
            .expect_find_with_password_hash()
            .returning(|_| Ok(None));

        let auth = AuthService::new(Arc::new(members));
        let err = auth.login("nobody@example.jp", "whatever1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn register_maps_conflict() {
        let mut members = MockMemberRepository::new();
        members
            .expect_create()
            .returning(|_, _, _| Err(RepositoryError::Conflict("email already exists".to_owned())));

        let auth = AuthService::new(Arc::new(members));
        let err = auth
            .register("Hanako", "hanako@example.jp", "long enough")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MemberAlreadyExists));
    }
}
