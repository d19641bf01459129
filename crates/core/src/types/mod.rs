//! Core types for Storecast.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod media;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use media::{ContentType, RecurrenceType};
pub use role::Role;
