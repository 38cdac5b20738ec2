use serde::{Deserialize, Serialize};
use std::fmt;

use super::{de, Id};
use crate::icons::Icon;

/// Supply-chain role. The backend spells roles in upper case, older
/// payloads in lower case; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Farmer,
    Processor,
    Distributor,
    Retailer,
    Admin,
    Other(String),
}

impl Role {
    pub const ASSIGNABLE: [Role; 5] = [
        Role::Farmer,
        Role::Processor,
        Role::Distributor,
        Role::Retailer,
        Role::Admin,
    ];

    pub fn code(&self) -> &str {
        match self {
            Role::Farmer => "FARMER",
            Role::Processor => "PROCESSOR",
            Role::Distributor => "DISTRIBUTOR",
            Role::Retailer => "RETAILER",
            Role::Admin => "ADMIN",
            Role::Other(raw) => raw,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Role::Farmer => "Farmer",
            Role::Processor => "Processor",
            Role::Distributor => "Distributor",
            Role::Retailer => "Retailer",
            Role::Admin => "Admin",
            Role::Other(raw) if raw.is_empty() => "Unknown",
            Role::Other(raw) => raw,
        }
    }

    pub fn icon(&self) -> Icon {
        match self {
            Role::Farmer => Icon::Leaf,
            Role::Processor => Icon::Factory,
            Role::Distributor => Icon::Truck,
            Role::Retailer => Icon::Store,
            Role::Admin => Icon::Shield,
            Role::Other(_) => Icon::User,
        }
    }

    /// CSS modifier used for role badges.
    pub fn css_class(&self) -> &'static str {
        match self {
            Role::Farmer => "role-farmer",
            Role::Processor => "role-processor",
            Role::Distributor => "role-distributor",
            Role::Retailer => "role-retailer",
            Role::Admin => "role-admin",
            Role::Other(_) => "role-other",
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "FARMER" => Role::Farmer,
            "PROCESSOR" => Role::Processor,
            "DISTRIBUTOR" => Role::Distributor,
            "RETAILER" => Role::Retailer,
            "ADMIN" => Role::Admin,
            _ => Role::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.code().to_string()
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Other(String::new())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The signed-in user as returned by `/auth/login`. Round-trips through the
/// persisted session store, so it serializes in the backend's own shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub organization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl User {
    pub fn has_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub organization: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
