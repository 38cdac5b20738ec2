use serde::Deserialize;

use super::client::{degrade, segment, ApiClient, RequestOptions};
use crate::models::verify::VerifiedBatchRecord;
use crate::models::VerificationResult;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Verification {
    #[serde(default)]
    batch_hash_valid: Option<bool>,
    #[serde(default)]
    event_chain_valid: Option<bool>,
    #[serde(default)]
    batch: Option<VerifiedBatchRecord>,
}

impl ApiClient {
    /// Public lookup by batch id or QR code. Always sent without
    /// credentials. `None` when nothing matched or the lookup failed.
    pub async fn verify_batch(&self, id_or_code: &str) -> Option<VerificationResult> {
        let endpoint = format!("/verify/batch/{}", segment(id_or_code));
        let result = self
            .anonymous()
            .request::<Verification>(&endpoint, RequestOptions::get())
            .await;
        let verification = degrade("verification", result.map(Some), None)?;
        let batch = verification.batch?;
        Some(batch.into_result(
            verification.batch_hash_valid.unwrap_or(false),
            verification.event_chain_valid.unwrap_or(false),
        ))
    }
}
