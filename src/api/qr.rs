use serde::Deserialize;

use super::client::{degrade, segment, ApiClient, RequestOptions};
use super::error::{RequestError, Result};
use crate::models::{de, GeneratedQr, QrCode};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QrList {
    #[serde(default, deserialize_with = "de::null_default")]
    qr_codes: Vec<QrCode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Generated {
    #[serde(default)]
    qr_data_url: Option<String>,
    #[serde(default)]
    verify_url: Option<String>,
}

impl ApiClient {
    pub async fn fetch_qr_codes(&self) -> Vec<QrCode> {
        let result = self
            .request::<QrList>("/qr/list", RequestOptions::get())
            .await
            .map(|l| l.qr_codes);
        degrade("QR code listing", result, Vec::new())
    }

    pub async fn generate_qr_code(&self, batch_id: &str) -> Result<GeneratedQr> {
        let endpoint = format!("/qr/generate/{}", segment(batch_id));
        let generated: Generated = self.request_enveloped(&endpoint, RequestOptions::post()).await?;
        match generated.qr_data_url {
            Some(qr_data_url) => Ok(GeneratedQr {
                qr_data_url,
                verify_url: generated.verify_url.unwrap_or_default(),
            }),
            None => Err(RequestError::Unsuccessful(Some("Failed to generate QR code".into()))),
        }
    }
}
