use serde::Deserialize;
use std::collections::BTreeMap;

use super::{de, Id, Role};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_batches: u64,
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub total_handoffs: u64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub users_by_role: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserStats {
    #[serde(default)]
    pub batches_created: u64,
    #[serde(default)]
    pub handoffs_initiated: u64,
    #[serde(default)]
    pub handoffs_received: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: Id,
    #[serde(default, deserialize_with = "de::null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub stats: AdminUserStats,
}

impl AdminUser {
    /// Search over name, email and organization plus an optional role filter.
    pub fn matches(&self, query: &str, role: Option<&Role>) -> bool {
        if let Some(role) = role {
            if &self.role != role {
                return false;
            }
        }
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.email.to_lowercase().contains(&query)
            || self
                .organization
                .as_deref()
                .is_some_and(|o| o.to_lowercase().contains(&query))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Event,
    Handoff,
    BatchCreated,
    #[serde(other)]
    Other,
}

impl ActivityKind {
    pub const FILTERABLE: [ActivityKind; 3] =
        [ActivityKind::Event, ActivityKind::Handoff, ActivityKind::BatchCreated];

    pub fn code(&self) -> &'static str {
        match self {
            ActivityKind::Event => "event",
            ActivityKind::Handoff => "handoff",
            ActivityKind::BatchCreated => "batch_created",
            ActivityKind::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::Event => "Events",
            ActivityKind::Handoff => "Handoffs",
            ActivityKind::BatchCreated => "Batches Created",
            ActivityKind::Other => "Other",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::FILTERABLE.into_iter().find(|k| k.code() == code)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminActivity {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    #[serde(default, deserialize_with = "de::null_default")]
    pub sub_type: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub actor: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub batch: String,
    #[serde(default)]
    pub batch_id: Id,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub timestamp: String,
}
