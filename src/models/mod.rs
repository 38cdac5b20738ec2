pub mod admin;
pub mod batch;
pub mod event;
pub mod handoff;
pub mod qr;
pub mod stats;
pub mod user;
pub mod verify;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub use admin::{ActivityKind, AdminActivity, AdminStats, AdminUser, AdminUserStats};
pub use batch::{
    BatchDetail, BatchStatus, BatchSummary, BlockchainRecord, Certification, ChildBatchSummary,
    CreateBatchRequest, Custodian, DocumentRef, Origin, ParentBatchRef, ProductInfo,
};
pub use event::{AddEventRequest, Attachment, BatchEvent, EventFeedItem, EventType};
pub use handoff::{CustodyChainItem, Handoff, HandoffRequest, HandoffType, Party, Recipient};
pub use qr::{GeneratedQr, QrCode, QrKind, QrStatus};
pub use stats::{ActivityItem, ChartPoint, DashboardData, DashboardStats, PieSlice, StatsPeriod};
pub use user::{RegisterRequest, Role, User};
pub use verify::{VerificationResult, VerifiedBlockchain, VerifiedOrigin, VerifiedProduct};

/// Backend identifier. The backend hands out both integer and string ids,
/// sometimes for the same entity depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Id(String);

impl Id {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        de::string_or_number(deserializer).map(Id)
    }
}

// Numeric ids go back out as JSON numbers so the backend sees what it issued.
impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(n) if n.to_string() == self.0 => serializer.serialize_i64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

/// Deserialization helpers for loosely typed backend fields.
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Str(String),
        Int(i64),
        Float(f64),
    }

    impl From<StringOrNumber> for String {
        fn from(value: StringOrNumber) -> Self {
            match value {
                StringOrNumber::Str(s) => s,
                StringOrNumber::Int(n) => n.to_string(),
                StringOrNumber::Float(f) => f.to_string(),
            }
        }
    }

    pub fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        StringOrNumber::deserialize(deserializer).map(String::from)
    }

    pub fn opt_string_or_number<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
    }

    /// `null` becomes the type's default instead of failing the whole payload.
    pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub fn default_true() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_accepts_numbers_and_strings() {
        let ids: Vec<Id> = serde_json::from_str(r#"[12, "B-2024-001"]"#).unwrap();
        assert_eq!(ids[0].as_str(), "12");
        assert_eq!(ids[1].as_str(), "B-2024-001");
    }

    #[test]
    fn numeric_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Id::from(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&Id::from("007")).unwrap(), "\"007\"");
        assert_eq!(serde_json::to_string(&Id::from("abc")).unwrap(), "\"abc\"");
    }
}
