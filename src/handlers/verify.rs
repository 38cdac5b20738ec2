//! Public product verification. No session is needed and the lookup is
//! always sent without credentials.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use askama::Template;
use serde::Deserialize;

use super::render;
use crate::{
    filters,
    models::VerificationResult,
    timeline::{self, TimelineItem},
    AppState,
};

#[derive(Template)]
#[template(path = "verify.html")]
struct VerifyTemplate {
    code: String,
    result: Option<VerificationResult>,
    journey: Vec<TimelineItem>,
}

#[derive(Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    id: String,
}

async fn verify_page(state: &AppState, code: String) -> Response {
    let code = code.trim().to_string();
    if code.is_empty() {
        let template = VerifyTemplate {
            code,
            result: None,
            journey: Vec::new(),
        };
        return render(&template).into_response();
    }

    let result = state.api.verify_batch(&code).await;
    let journey = result
        .as_ref()
        .map(|r| timeline::merge(&r.custody_chain, &r.journey))
        .unwrap_or_default();
    let status = if result.is_some() {
        StatusCode::OK
    } else {
        log::info!("verification found nothing for {:?}", code);
        StatusCode::NOT_FOUND
    };

    let template = VerifyTemplate {
        code,
        result,
        journey,
    };
    match render(&template) {
        Ok(page) => (status, page).into_response(),
        Err(reject) => reject.into_response(),
    }
}

/// `/verify?id=...`, the form the printed QR links use, or the empty search
/// form.
pub async fn verify_search(State(state): State<AppState>, Query(query): Query<VerifyQuery>) -> Response {
    verify_page(&state, query.id).await
}

pub async fn verify_code(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    verify_page(&state, code).await
}
