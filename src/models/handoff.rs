use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{de, Id, Role};

/// Kind of custody transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffType {
    Pickup,
    ProcessingStart,
    ProcessingComplete,
    Delivery,
    RetailReceive,
    #[serde(other)]
    Unknown,
}

impl HandoffType {
    pub const ALL: [HandoffType; 5] = [
        HandoffType::Pickup,
        HandoffType::ProcessingStart,
        HandoffType::ProcessingComplete,
        HandoffType::Delivery,
        HandoffType::RetailReceive,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            HandoffType::Pickup => "pickup",
            HandoffType::ProcessingStart => "processing_start",
            HandoffType::ProcessingComplete => "processing_complete",
            HandoffType::Delivery => "delivery",
            HandoffType::RetailReceive => "retail_receive",
            HandoffType::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HandoffType::Pickup => "Pickup",
            HandoffType::ProcessingStart => "Processing Start",
            HandoffType::ProcessingComplete => "Processing Complete",
            HandoffType::Delivery => "Delivery",
            HandoffType::RetailReceive => "Retail Receive",
            HandoffType::Unknown => "Transfer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            HandoffType::Pickup => "Farmer → Processor/Distributor",
            HandoffType::ProcessingStart => "Start processing batch",
            HandoffType::ProcessingComplete => "Finished processing",
            HandoffType::Delivery => "Ship to next destination",
            HandoffType::RetailReceive => "Retailer receives batch",
            HandoffType::Unknown => "",
        }
    }
}

impl Default for HandoffType {
    fn default() -> Self {
        HandoffType::Pickup
    }
}

impl fmt::Display for HandoffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownHandoffType(pub String);

impl fmt::Display for UnknownHandoffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown handoff type `{}`", self.0)
    }
}

impl std::error::Error for UnknownHandoffType {}

impl FromStr for HandoffType {
    type Err = UnknownHandoffType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandoffType::ALL
            .into_iter()
            .find(|t| t.code() == s.trim())
            .ok_or_else(|| UnknownHandoffType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(default, deserialize_with = "de::null_default")]
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub organization: Option<String>,
}

/// A recorded transfer of custody between two parties.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handoff {
    pub id: Id,
    #[serde(rename = "type", alias = "handoffType", default)]
    pub handoff_type: HandoffType,
    pub from: Party,
    pub to: Party,
    #[serde(default, deserialize_with = "de::null_default")]
    pub timestamp: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

/// Projection of a handoff as it appears in a batch's custody chain: the
/// holder after the transfer, and who they received it from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodyChainItem {
    #[serde(default, deserialize_with = "de::null_default")]
    pub actor: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub action: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub location: String,
    #[serde(default)]
    pub from_actor: Option<String>,
    #[serde(default)]
    pub from_role: Option<Role>,
}

/// A user who may receive a handoff.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: Id,
    #[serde(default, deserialize_with = "de::null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub organization: Option<String>,
}

impl Recipient {
    pub fn label(&self) -> String {
        match self.organization.as_deref().filter(|o| !o.is_empty()) {
            Some(org) => format!("{} ({})", self.name, org),
            None => self.name.clone(),
        }
    }
}

/// Body of `POST /handoff/:batchId`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffRequest {
    pub to_user_id: Id,
    pub handoff_type: HandoffType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handoff_type_parses_from_form_values() {
        assert_eq!("retail_receive".parse::<HandoffType>(), Ok(HandoffType::RetailReceive));
        assert!("unknown".parse::<HandoffType>().is_err());
        assert!("teleport".parse::<HandoffType>().is_err());
    }

    #[test]
    fn handoff_request_matches_backend_shape() {
        let body = HandoffRequest {
            to_user_id: Id::from(5),
            handoff_type: HandoffType::ProcessingStart,
            notes: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"toUserId": 5, "handoffType": "processing_start"})
        );
    }

    #[test]
    fn unrecognised_handoff_type_is_kept_readable() {
        let raw = r#"{"id":1,"type":"airlift","from":{"name":"A","role":"FARMER"},"to":{"name":"B","role":"processor"},"timestamp":"2024-01-01T00:00:00Z"}"#;
        let handoff: Handoff = serde_json::from_str(raw).unwrap();
        assert_eq!(handoff.handoff_type, HandoffType::Unknown);
        assert_eq!(handoff.to.role, Role::Processor);
    }
}
