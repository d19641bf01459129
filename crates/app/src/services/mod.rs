//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password sign-up/sign-in, password change, invite acceptance
//! - `resolver` - Session identity to `{identity, profile}`
//! - `content` - Upload and delete with object storage
//! - `accounts` - Admin role and email changes
//! - `storage` - Object storage client
//! - `export` - CSV export
//! - `invites` - Invite tokens
//! - `steps` - Best-effort step logs

pub mod accounts;
pub mod auth;
pub mod content;
pub mod export;
pub mod invites;
pub mod resolver;
pub mod steps;
pub mod storage;

pub use accounts::{AccountError, AccountService};
pub use auth::{AuthError, AuthService};
pub use content::{ContentError, ContentService, UploadForm};
pub use resolver::resolve_current_user;
pub use steps::{StepKind, StepLog};
pub use storage::{MediaStore, StorageClient, StorageError};
