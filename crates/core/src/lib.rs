//! Storecast Core - Shared types library.
//!
//! This crate provides common types used across all Storecast components:
//! - `app` - The web application (client dashboard and admin console)
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids and emails, roles, media kinds
//! - [`status`] - Derived lifecycle status of scheduled content

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod status;
pub mod types;

pub use status::{ContentStatus, classify, classify_raw, parse_timestamp};
pub use types::*;
