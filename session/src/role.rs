//! Roles and the closed set of places a guard may send a visitor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The role a storefront account holds. Exactly one per user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seller,
    User,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Self; 3] = [Self::Admin, Self::Seller, Self::User];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Seller => "seller",
            Self::User => "user",
        }
    }

    /// Landing page for this role.
    #[must_use]
    pub fn home(self) -> RedirectTarget {
        match self {
            Self::Admin => RedirectTarget::AdminHome,
            Self::Seller => RedirectTarget::SellerHome,
            Self::User => RedirectTarget::Home,
        }
    }

    /// Only buyers are gated on a saved delivery address.
    #[must_use]
    pub fn requires_address(self) -> bool {
        matches!(self, Self::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "seller" => Ok(Self::Seller),
            "user" => Ok(Self::User),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}

/// Every route a guard is allowed to redirect to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RedirectTarget {
    Login,
    AccessDenied,
    AddressCompleted,
    AdminHome,
    SellerHome,
    Home,
}

impl RedirectTarget {
    pub const ALL: [Self; 6] = [
        Self::Login,
        Self::AccessDenied,
        Self::AddressCompleted,
        Self::AdminHome,
        Self::SellerHome,
        Self::Home,
    ];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::AccessDenied => "/access-denied",
            Self::AddressCompleted => "/address-completed",
            Self::AdminHome => "/admin",
            Self::SellerHome => "/seller",
            Self::Home => "/",
        }
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
#[path = "role_test.rs"]
mod tests;
