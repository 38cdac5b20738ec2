use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::client::{degrade, segment, ApiClient, RequestOptions};
use super::error::{RequestError, Result};
use crate::models::{de, BatchDetail, BatchSummary, CreateBatchRequest, Id};

#[derive(Deserialize)]
struct BatchList {
    #[serde(default, deserialize_with = "de::null_default")]
    batches: Vec<BatchSummary>,
}

#[derive(Deserialize)]
struct BatchOne {
    #[serde(default)]
    batch: Option<BatchDetail>,
}

/// Identifiers of a newly registered batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBatch {
    pub id: Id,
    pub batch_id: String,
}

#[derive(Deserialize)]
struct Created {
    #[serde(default)]
    batch: Option<CreatedBatch>,
}

/// One child in a split request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitPart {
    #[serde(with = "rust_decimal::serde::float")]
    pub weight: Decimal,
    pub destination: String,
}

#[derive(Serialize)]
struct SplitBody<'a> {
    splits: &'a [SplitPart],
}

/// A child batch created by a split.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedChild {
    pub id: Id,
    pub batch_id: String,
    #[serde(default)]
    pub weight: Decimal,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SplitResult {
    #[serde(default)]
    child_batches: Option<Vec<CreatedChild>>,
}

impl ApiClient {
    pub async fn fetch_batches(&self) -> Result<Vec<BatchSummary>> {
        let list: BatchList = self.request("/batch", RequestOptions::get()).await?;
        Ok(list.batches)
    }

    /// `None` when the batch does not exist or could not be loaded.
    pub async fn fetch_batch(&self, id: &str) -> Option<BatchDetail> {
        let endpoint = format!("/batch/{}", segment(id));
        let result = self
            .request::<BatchOne>(&endpoint, RequestOptions::get())
            .await
            .map(|b| b.batch);
        degrade("batch lookup", result, None)
    }

    pub async fn create_batch(&self, request: &CreateBatchRequest) -> Result<CreatedBatch> {
        let options = RequestOptions::json(Method::POST, request)?;
        let created: Created = self.request_enveloped("/batch/create", options).await?;
        created.batch.ok_or(RequestError::Unsuccessful(None))
    }

    pub async fn split_batch(&self, id: &str, splits: &[SplitPart]) -> Result<Vec<CreatedChild>> {
        let endpoint = format!("/batch/split/{}", segment(id));
        let options = RequestOptions::json(Method::POST, &SplitBody { splits })?;
        let result: SplitResult = self.request_enveloped(&endpoint, options).await?;
        result.child_batches.ok_or(RequestError::Unsuccessful(None))
    }
}
