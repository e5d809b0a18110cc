//! Seed the store directory from a YAML file.
//!
//! ```yaml
//! stores:
//!   - name: Cafe Nagoya
//!     address: Naka-ku, Nagoya
//!     categories: [Cafe]
//! ```
//!
//! Categories are created on first mention. Stores are always inserted, so
//! running the same file twice duplicates its stores.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use super::{CommandError, connect};

/// Top-level seed document.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub stores: Vec<SeedStore>,
}

/// One store to insert.
#[derive(Debug, Deserialize)]
pub struct SeedStore {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Check every store for blank fields, returning one message per problem.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();
    for (i, store) in seed.stores.iter().enumerate() {
        if store.name.trim().is_empty() {
            errors.push(format!("stores[{i}]: name is empty"));
        }
        if store.address.trim().is_empty() {
            errors.push(format!("stores[{i}]: address is empty"));
        }
        if store.categories.iter().any(|c| c.trim().is_empty()) {
            errors.push(format!("stores[{i}]: blank category name"));
        }
    }
    errors
}

/// Insert the stores in `file_path` in one transaction.
pub async fn stores(file_path: &str) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading stores from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    let pool = connect().await?;
    let mut tx = pool.begin().await?;
    let mut category_ids: HashMap<String, i32> = HashMap::new();

    for store in &seed.stores {
        let store_id: i32 = sqlx::query_scalar(
            "INSERT INTO nagoyameshi.store (name, address) VALUES ($1, $2) RETURNING id",
        )
        .bind(store.name.trim())
        .bind(store.address.trim())
        .fetch_one(&mut *tx)
        .await?;

        for name in &store.categories {
            let name = name.trim();
            let category_id = if let Some(&id) = category_ids.get(name) {
                id
            } else {
                let id: i32 = sqlx::query_scalar(
                    r"
                    INSERT INTO nagoyameshi.category (name) VALUES ($1)
                    ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                    RETURNING id
                    ",
                )
                .bind(name)
                .fetch_one(&mut *tx)
                .await?;
                category_ids.insert(name.to_owned(), id);
                id
            };

            sqlx::query(
                r"
                INSERT INTO nagoyameshi.store_category (store_id, category_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                ",
            )
            .bind(store_id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    info!("Seeding complete!");
    info!("  Stores inserted: {}", seed.stores.len());
    info!("  Categories used: {}", category_ids.len());

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_file() {
        let seed: SeedFile = serde_yaml::from_str(
            r"
stores:
  - name: Cafe Nagoya
    address: Naka-ku
    categories: [Cafe]
  - name: Yabaton
    address: Osu, Naka-ku
",
        )
        .unwrap();

        assert_eq!(seed.stores.len(), 2);
        assert_eq!(seed.stores[0].categories, vec!["Cafe".to_owned()]);
        assert!(seed.stores[1].categories.is_empty());
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_validate_reports_blank_fields() {
        let seed = SeedFile {
            stores: vec![SeedStore {
                name: " ".to_owned(),
                address: String::new(),
                categories: vec![String::new()],
            }],
        };

        let errors = validate(&seed);
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("name is empty"));
    }
}
