use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{de, BatchEvent, Id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    #[default]
    Created,
    InTransit,
    Processing,
    Split,
    Completed,
    #[serde(other)]
    Unknown,
}

impl BatchStatus {
    pub const ALL: [BatchStatus; 5] = [
        BatchStatus::Created,
        BatchStatus::InTransit,
        BatchStatus::Processing,
        BatchStatus::Split,
        BatchStatus::Completed,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            BatchStatus::Created => "created",
            BatchStatus::InTransit => "in_transit",
            BatchStatus::Processing => "processing",
            BatchStatus::Split => "split",
            BatchStatus::Completed => "completed",
            BatchStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BatchStatus::Created => "Created",
            BatchStatus::InTransit => "In Transit",
            BatchStatus::Processing => "Processing",
            BatchStatus::Split => "Split",
            BatchStatus::Completed => "Completed",
            BatchStatus::Unknown => "Unknown",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            BatchStatus::Created => "status-created",
            BatchStatus::InTransit => "status-in-transit",
            BatchStatus::Processing => "status-processing",
            BatchStatus::Split => "status-split",
            BatchStatus::Completed => "status-completed",
            BatchStatus::Unknown => "status-unknown",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Row of `GET /batch`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub id: Id,
    pub batch_id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub product: String,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub weight: Decimal,
    #[serde(default)]
    pub weight_unit: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub status: BatchStatus,
    #[serde(default, deserialize_with = "de::null_default")]
    pub created_at: String,
    #[serde(default, rename = "hasQR", alias = "hasQr")]
    pub has_qr: bool,
    #[serde(default)]
    pub blockchain_verified: bool,
    #[serde(default)]
    pub ipfs: Option<String>,
    #[serde(default)]
    pub parent_batch_id: Option<Id>,
    #[serde(default)]
    pub child_batch_count: u32,
}

impl BatchSummary {
    pub fn unit(&self) -> &str {
        self.weight_unit.as_deref().unwrap_or("kg")
    }

    pub fn is_child(&self) -> bool {
        self.parent_batch_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    #[serde(default, deserialize_with = "de::null_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "de::null_default")]
    pub product_type: String,
    #[serde(default)]
    pub variety: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    #[serde(default, deserialize_with = "de::null_default")]
    pub farm: String,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub farmer_id: Option<String>,
    #[serde(default)]
    pub farmer_name: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub location: String,
    #[serde(default)]
    pub harvest_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// Anchoring record written by the backend when the batch was registered.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainRecord {
    #[serde(default, deserialize_with = "de::null_default")]
    pub hash: String,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub gas_used: Option<String>,
    #[serde(default)]
    pub ipfs_hash: Option<String>,
    #[serde(default)]
    pub ipfs_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Custodian {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub since: Option<String>,
}

/// A child produced by splitting this batch, as listed on the parent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildBatchSummary {
    pub id: Id,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub weight: Decimal,
    #[serde(default)]
    pub weight_unit: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: BatchStatus,
}

impl ChildBatchSummary {
    pub fn display_id(&self) -> String {
        self.batch_id.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// The parent a child batch was split from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentBatchRef {
    pub id: Id,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default, alias = "product")]
    pub product_name: Option<String>,
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub weight_unit: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl ParentBatchRef {
    pub fn display_id(&self) -> String {
        self.batch_id.clone().unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub size: Option<String>,
    pub url: String,
}

/// Full record from `GET /batch/:id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDetail {
    pub id: Id,
    pub batch_id: String,
    #[serde(default)]
    pub product: ProductInfo,
    #[serde(default, deserialize_with = "de::null_default")]
    pub weight: Decimal,
    #[serde(default, deserialize_with = "de::null_default")]
    pub weight_unit: String,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub quantity_unit: Option<String>,
    #[serde(default)]
    pub status: BatchStatus,
    #[serde(default)]
    pub origin: Origin,
    #[serde(default, deserialize_with = "de::null_default")]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub certification_id: Option<String>,
    #[serde(default)]
    pub blockchain: BlockchainRecord,
    #[serde(default)]
    pub current_custodian: Option<Custodian>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub events: Vec<BatchEvent>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub child_batches: Vec<ChildBatchSummary>,
    #[serde(default)]
    pub parent_batch_id: Option<Id>,
    #[serde(default)]
    pub parent_batch: Option<ParentBatchRef>,
    #[serde(default)]
    pub ipfs: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub documents: Vec<DocumentRef>,
    #[serde(default)]
    pub qr_scans: Option<u64>,
    #[serde(default)]
    pub last_scanned: Option<String>,
    #[serde(default, rename = "hasQR", alias = "hasQr")]
    pub has_qr: bool,
    #[serde(default, deserialize_with = "de::null_default")]
    pub created_at: String,
}

impl BatchDetail {
    pub fn unit(&self) -> &str {
        if self.weight_unit.is_empty() {
            "kg"
        } else {
            &self.weight_unit
        }
    }

    /// Produced by splitting another batch.
    pub fn is_child(&self) -> bool {
        self.parent_batch_id.is_some() || self.parent_batch.is_some()
    }

    /// Weight already handed to the children listed on this record.
    pub fn allocated_to_children(&self) -> Decimal {
        self.child_batches.iter().map(|c| c.weight).sum()
    }

    /// Where the split form's allocations are measured against.
    pub fn origin_label(&self) -> &str {
        if self.origin.location.is_empty() {
            &self.origin.farm
        } else {
            &self.origin.location
        }
    }
}

/// Body of `POST /batch/create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    pub product_name: String,
    pub product_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub weight: Decimal,
    pub weight_unit: String,
    pub farm_name: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub harvest_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub certifications: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certification_id: Option<String>,
}
