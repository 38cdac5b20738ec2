use rust_decimal::Decimal;
use serde::Deserialize;

use super::{
    de, BatchEvent, ChildBatchSummary, CustodyChainItem, Handoff, Id, ParentBatchRef, Role,
};

pub const DEFAULT_ANCHOR_NETWORK: &str = "IPFS (Pinata)";

#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedProduct {
    pub name: String,
    pub product_type: String,
    pub weight: Decimal,
    pub unit: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedOrigin {
    pub farm: String,
    pub location: String,
    pub harvest_date: String,
    pub farmer_name: Option<String>,
    pub current_holder: Option<String>,
    pub current_holder_role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedBlockchain {
    pub hash: String,
    pub network: String,
    pub timestamp: String,
    pub ipfs_hash: Option<String>,
    pub ipfs_url: Option<String>,
}

/// Public verification view of a batch: authenticity flags plus everything
/// needed to draw its origin and journey.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub batch_id: String,
    pub is_valid: bool,
    pub blockchain_verified: bool,
    pub product: VerifiedProduct,
    pub origin: VerifiedOrigin,
    pub certifications: Vec<String>,
    pub certification_id: Option<String>,
    pub journey: Vec<BatchEvent>,
    pub blockchain: VerifiedBlockchain,
    pub parent_batch: Option<ParentBatchRef>,
    pub child_batches: Vec<ChildBatchSummary>,
    pub custody_chain: Vec<CustodyChainItem>,
    pub handoffs: Vec<Handoff>,
}

impl VerificationResult {
    pub fn product_emoji(&self) -> &'static str {
        match self.product.product_type.to_lowercase().as_str() {
            "grain" | "wheat" => "🌾",
            "rice" => "🍚",
            "fruit" => "🍎",
            "vegetable" => "🥬",
            "spice" => "🌶️",
            "dairy" => "🥛",
            "beverage" => "🍵",
            "fiber" => "🧵",
            _ => "📦",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawProduct {
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(rename = "type", default, deserialize_with = "de::null_default")]
    product_type: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrigin {
    #[serde(default, deserialize_with = "de::null_default")]
    farm: String,
    #[serde(default, deserialize_with = "de::null_default")]
    location: String,
    #[serde(default)]
    harvest_date: Option<String>,
    #[serde(default)]
    farmer_name: Option<String>,
    #[serde(default)]
    current_holder: Option<String>,
    #[serde(default)]
    current_holder_role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawCertification {
    name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlockchain {
    #[serde(default, deserialize_with = "de::null_default")]
    hash: String,
    #[serde(default)]
    network: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    ipfs_hash: Option<String>,
    #[serde(default)]
    ipfs_url: Option<String>,
}

/// `batch` object inside `GET /verify/batch/:idOrCode`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifiedBatchRecord {
    #[serde(default)]
    id: Id,
    #[serde(default, deserialize_with = "de::null_default")]
    batch_id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    product: RawProduct,
    #[serde(default)]
    weight: Decimal,
    #[serde(default)]
    weight_unit: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    origin: RawOrigin,
    #[serde(default, deserialize_with = "de::null_default")]
    certifications: Vec<RawCertification>,
    #[serde(default)]
    certification_id: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    events: Vec<BatchEvent>,
    #[serde(default, deserialize_with = "de::null_default")]
    blockchain: RawBlockchain,
    #[serde(default)]
    parent_batch: Option<ParentBatchRef>,
    #[serde(default, deserialize_with = "de::null_default")]
    child_batches: Vec<ChildBatchSummary>,
    #[serde(default, deserialize_with = "de::null_default")]
    custody_chain: Vec<CustodyChainItem>,
    #[serde(default, deserialize_with = "de::null_default")]
    handoffs: Vec<Handoff>,
    #[serde(default, deserialize_with = "de::null_default")]
    created_at: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl VerifiedBatchRecord {
    pub(crate) fn into_result(self, batch_hash_valid: bool, event_chain_valid: bool) -> VerificationResult {
        let description = non_empty(self.product.description)
            .unwrap_or_else(|| format!("{} batch", self.product.name));
        let batch_id = if self.batch_id.is_empty() {
            self.id.to_string()
        } else {
            self.batch_id
        };

        VerificationResult {
            batch_id,
            is_valid: batch_hash_valid,
            blockchain_verified: event_chain_valid,
            product: VerifiedProduct {
                name: self.product.name,
                product_type: self.product.product_type,
                weight: self.weight,
                unit: non_empty(self.weight_unit).unwrap_or_else(|| "kg".to_string()),
                description,
            },
            origin: VerifiedOrigin {
                farm: self.origin.farm,
                location: self.origin.location,
                harvest_date: non_empty(self.origin.harvest_date)
                    .unwrap_or_else(|| self.created_at.clone()),
                farmer_name: self.origin.farmer_name,
                current_holder: self.origin.current_holder,
                current_holder_role: self.origin.current_holder_role,
            },
            certifications: self.certifications.into_iter().map(|c| c.name).collect(),
            certification_id: non_empty(self.certification_id),
            journey: self.events,
            blockchain: VerifiedBlockchain {
                hash: self.blockchain.hash,
                network: non_empty(self.blockchain.network)
                    .unwrap_or_else(|| DEFAULT_ANCHOR_NETWORK.to_string()),
                timestamp: non_empty(self.blockchain.timestamp)
                    .unwrap_or_else(|| self.created_at.clone()),
                ipfs_hash: non_empty(self.blockchain.ipfs_hash),
                ipfs_url: non_empty(self.blockchain.ipfs_url),
            },
            parent_batch: self.parent_batch,
            child_batches: self.child_batches,
            custody_chain: self.custody_chain,
            handoffs: self.handoffs,
        }
    }
}
