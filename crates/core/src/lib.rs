//! Nagoyameshi Core - Shared types library.
//!
//! This crate provides common types used across the Nagoyameshi components:
//! - `web` - The store directory site (listing, detail, favorites)
//! - `cli` - Command-line tools for migrations, members and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, email addresses and pagination

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
