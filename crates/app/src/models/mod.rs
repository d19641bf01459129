//! Domain models.
//!
//! These are the validated records handed out by the repositories. Raw rows
//! never leave the `db` module.

pub mod content;
pub mod identity;
pub mod invite;
pub mod profile;
pub mod session;
pub mod store;

pub use content::{ContentItem, ContentListing, NewContent};
pub use identity::Identity;
pub use invite::Invite;
pub use profile::{CurrentUser, NewProfile, Profile};
pub use session::{SessionIdentity, keys as session_keys};
pub use store::{Store, StoreInput};
