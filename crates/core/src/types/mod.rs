//! Core types for Nagoyameshi.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod page;

pub use email::{Email, EmailError};
pub use id::*;
pub use page::{Direction, DirectionError, Page, PageRequest};
