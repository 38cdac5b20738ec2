use reqwest::Method;
use serde::Deserialize;

use super::client::{degrade, segment, ApiClient, RequestOptions};
use super::error::{RequestError, Result};
use crate::models::{de, HandoffRequest, Id, Recipient};

#[derive(Deserialize)]
struct RecipientList {
    #[serde(default, deserialize_with = "de::null_default")]
    recipients: Vec<Recipient>,
}

/// Receipt for an initiated handoff.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HandoffReceipt {
    pub id: Id,
    #[serde(default)]
    pub hash: Option<String>,
}

#[derive(Deserialize)]
struct Initiated {
    #[serde(default)]
    handoff: Option<HandoffReceipt>,
}

impl ApiClient {
    /// Users the caller may hand batches to; empty when unavailable.
    pub async fn fetch_available_recipients(&self) -> Vec<Recipient> {
        let result = self
            .request_enveloped::<RecipientList>("/handoff/available-recipients", RequestOptions::get())
            .await
            .map(|l| l.recipients);
        degrade("recipient listing", result, Vec::new())
    }

    pub async fn initiate_handoff(&self, batch_id: &str, request: &HandoffRequest) -> Result<HandoffReceipt> {
        let endpoint = format!("/handoff/{}", segment(batch_id));
        let options = RequestOptions::json(Method::POST, request)?;
        let initiated: Initiated = self.request_enveloped(&endpoint, options).await?;
        initiated.handoff.ok_or(RequestError::Unsuccessful(None))
    }
}
