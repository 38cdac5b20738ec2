use serde::Deserialize;

use super::{de, Id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrKind {
    #[default]
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrStatus {
    #[default]
    Active,
    Used,
    Expired,
}

impl QrStatus {
    pub fn label(&self) -> &'static str {
        match self {
            QrStatus::Active => "Active",
            QrStatus::Used => "Used",
            QrStatus::Expired => "Expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    pub id: Id,
    #[serde(deserialize_with = "de::string_or_number")]
    pub batch_id: String,
    #[serde(rename = "type", default)]
    pub kind: QrKind,
    #[serde(default, deserialize_with = "de::null_default")]
    pub product: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub created_at: String,
    #[serde(default)]
    pub scans: u64,
    #[serde(default)]
    pub last_scanned: Option<String>,
    #[serde(default)]
    pub status: QrStatus,
    #[serde(default, deserialize_with = "de::null_default")]
    pub url: String,
}

impl QrCode {
    /// Case-insensitive match on batch id or product name.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.batch_id.to_lowercase().contains(&query)
            || self.product.to_lowercase().contains(&query)
    }
}

/// Result of `POST /qr/generate/:batchId`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQr {
    pub qr_data_url: String,
    pub verify_url: String,
}
