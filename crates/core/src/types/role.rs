//! Account roles.

use serde::{Deserialize, Serialize};

/// Application role of a profile.
///
/// The role is the authority for route access: `/admin` requires
/// [`Role::Admin`], `/dashboard` is the client area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Uploads content for their own stores.
    #[default]
    Client,
    /// Browses all content and manages client accounts.
    Admin,
}

impl Role {
    /// Interpret a raw session claim value.
    ///
    /// Claims come from identity metadata and are not validated on write, so
    /// anything unrecognized is treated as no claim at all.
    #[must_use]
    pub fn from_claim(claim: &str) -> Option<Self> {
        claim.trim().to_ascii_lowercase().parse().ok()
    }

    /// Returns true for [`Role::Admin`].
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// The lowercase wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_claim_is_lenient() {
        assert_eq!(Role::from_claim(" Admin "), Some(Role::Admin));
        assert_eq!(Role::from_claim("client"), Some(Role::Client));
        assert_eq!(Role::from_claim("superuser"), None);
        assert_eq!(Role::from_claim(""), None);
    }

    #[test]
    fn test_from_str_is_strict() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::default(), Role::Client);
    }
}
