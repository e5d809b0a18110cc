//! Member repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use nagoyameshi_core::{Email, MemberId};

use super::RepositoryError;
use crate::models::Member;

/// Persistence for members and their password hashes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// A member and their argon2 password hash, looked up by email.
    async fn find_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Member, String)>, RepositoryError>;

    /// Insert a member.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<Member, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: i32,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for Member {
    type Error = RepositoryError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: MemberId::new(row.id),
            name: row.name,
            email,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MemberPasswordRow {
    #[sqlx(flatten)]
    member: MemberRow,
    password_hash: String,
}

/// `PostgreSQL` implementation of [`MemberRepository`].
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new member repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn find_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Member, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, MemberPasswordRow>(
            r"
            SELECT id, name, email, created_at, password_hash
            FROM nagoyameshi.member
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let member = Member::try_from(row.member)?;
        Ok(Some((member, row.password_hash)))
    }

    async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<Member, RepositoryError> {
        let row = sqlx::query_as::<_, MemberRow>(
            r"
            INSERT INTO nagoyameshi.member (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, created_at
            ",
        )
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email"))?;

        Member::try_from(row)
    }
}
