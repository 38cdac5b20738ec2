use axum::extract::{Path, Query, State};
use askama::Template;
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{render, signed_in, PageResult};
use crate::{
    filters,
    models::{BatchSummary, GeneratedQr, QrCode, User},
    AppState,
};

#[derive(Template)]
#[template(path = "qr.html")]
struct QrTemplate {
    user: User,
    codes: Vec<QrCode>,
    unlabelled: Vec<BatchSummary>,
    query: String,
    generated: Option<GeneratedQr>,
    generated_for: String,
    error: String,
}

#[derive(Deserialize)]
pub struct QrQuery {
    #[serde(default)]
    q: String,
}

async fn qr_page(
    page: super::SignedIn,
    query: String,
    generated: Option<(String, GeneratedQr)>,
    error: String,
) -> PageResult {
    let (generated_for, generated) = match generated {
        Some((batch_id, qr)) => (batch_id, Some(qr)),
        None => (String::new(), None),
    };

    let codes = page
        .api
        .fetch_qr_codes()
        .await
        .into_iter()
        .filter(|c| c.matches(&query))
        .collect();

    let unlabelled = match page.api.fetch_batches().await {
        Ok(batches) => batches.into_iter().filter(|b| !b.has_qr).collect(),
        Err(err) => {
            log::warn!("batch listing for QR page failed: {}", err);
            Vec::new()
        }
    };

    render(&QrTemplate {
        user: page.user,
        codes,
        unlabelled,
        query,
        generated,
        generated_for,
        error,
    })
}

pub async fn qr_codes(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(query): Query<QrQuery>,
) -> PageResult {
    let page = signed_in(cookies, &state)?;
    qr_page(page, query.q, None, String::new()).await
}

pub async fn generate_qr(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> PageResult {
    let page = signed_in(cookies, &state)?;

    match page.api.generate_qr_code(&batch_id).await {
        Ok(generated) => {
            log::info!("{} generated a QR code for batch {}", page.user.email, batch_id);
            qr_page(page, String::new(), Some((batch_id, generated)), String::new()).await
        }
        Err(err) => {
            log::warn!("QR generation for batch {} failed: {}", batch_id, err);
            qr_page(page, String::new(), None, err.to_string()).await
        }
    }
}
