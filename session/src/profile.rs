//! User profile snapshot and the backend login response.
//!
//! DESIGN
//! ======
//! The profile is a cached copy of the login response, mirrored into both
//! session stores. It is never re-fetched, so it can lag the backend until the
//! next login.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::role::Role;

/// Signed-in user as returned by the backend login endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend user identifier. Numeric ids are kept in their decimal form.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Whether a delivery address is on file. Missing means no.
    #[serde(default)]
    pub has_address: bool,
}

impl UserProfile {
    /// Admins and sellers always count as address-complete.
    #[must_use]
    pub fn address_complete(&self) -> bool {
        !self.role.requires_address() || self.has_address
    }

    /// Parse the serialized form held in either session store.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not a JSON object of the expected shape.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Body of `POST /auth/login` on the backend.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub message: Option<String>,
}

pub(crate) fn id_from_value(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(format!("expected string or number id, got {other}")),
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    id_from_value(Value::deserialize(deserializer)?)
        .map_err(D::Error::custom)?
        .ok_or_else(|| D::Error::custom("user id must not be null"))
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
