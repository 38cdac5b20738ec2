use axum::extract::{Query, State};
use axum_extra::extract::Form;
use askama::Template;
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{render, signed_in, PageResult, SignedIn};
use crate::{
    filters,
    api::ApiClient,
    models::{BatchSummary, HandoffRequest, HandoffType, Id, Recipient, User},
    AppState,
};

#[derive(Template)]
#[template(path = "transfer.html")]
struct TransferTemplate {
    user: User,
    batches: Vec<BatchSummary>,
    recipients: Vec<Recipient>,
    handoff_types: Vec<HandoffType>,
    form: TransferForm,
    error: String,
    success: String,
}

impl TransferTemplate {
    fn is_selected(&self, batch: &BatchSummary) -> bool {
        self.form.batch_ids.iter().any(|id| id == batch.id.as_str())
    }
}

#[derive(Deserialize, Clone, Default)]
pub struct TransferForm {
    #[serde(default)]
    batch_ids: Vec<String>,
    #[serde(default)]
    recipient_id: String,
    #[serde(default)]
    handoff_type: String,
    #[serde(default)]
    notes: String,
}

/// Checked transfer, ready to send.
#[derive(Debug, PartialEq)]
struct Transfer {
    batch_ids: Vec<String>,
    request: HandoffRequest,
}

/// `?batch=<id>` when arriving from a batch's detail page.
#[derive(Deserialize, Default)]
pub struct TransferQuery {
    #[serde(default)]
    batch: Option<String>,
}

impl TransferForm {
    fn preselected(query: TransferQuery) -> Self {
        Self {
            batch_ids: query
                .batch
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .into_iter()
                .collect(),
            handoff_type: HandoffType::default().code().to_string(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<Transfer, &'static str> {
        let batch_ids: Vec<String> = self
            .batch_ids
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if batch_ids.is_empty() {
            return Err("Please select at least one batch");
        }
        let recipient = self.recipient_id.trim();
        if recipient.is_empty() {
            return Err("Please select a recipient");
        }
        let handoff_type = self.handoff_type.parse().unwrap_or_default();
        let notes = Some(self.notes.trim().to_string()).filter(|n| !n.is_empty());

        Ok(Transfer {
            batch_ids,
            request: HandoffRequest {
                to_user_id: Id::from(recipient),
                handoff_type,
                notes,
            },
        })
    }
}

/// Send one handoff per batch. Returns how many went through.
async fn send_all(api: &ApiClient, transfer: &Transfer) -> usize {
    let mut sent = 0;
    for batch_id in &transfer.batch_ids {
        match api.initiate_handoff(batch_id, &transfer.request).await {
            Ok(receipt) => {
                log::info!("handoff {} started for batch {}", receipt.id, batch_id);
                sent += 1;
            }
            Err(err) => log::warn!("handoff of batch {} failed: {}", batch_id, err),
        }
    }
    sent
}

async fn transfer_page(page: SignedIn, form: TransferForm, error: String, success: String) -> PageResult {
    let batches = match page.api.fetch_batches().await {
        Ok(batches) => batches,
        Err(err) => {
            log::warn!("batch listing for transfer failed: {}", err);
            Vec::new()
        }
    };
    let recipients = page.api.fetch_available_recipients().await;

    render(&TransferTemplate {
        user: page.user,
        batches,
        recipients,
        handoff_types: HandoffType::ALL.to_vec(),
        form,
        error,
        success,
    })
}

pub async fn transfer_form(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(query): Query<TransferQuery>,
) -> PageResult {
    let page = signed_in(cookies, &state)?;
    let form = TransferForm::preselected(query);
    transfer_page(page, form, String::new(), String::new()).await
}

pub async fn transfer(
    cookies: Cookies,
    State(state): State<AppState>,
    Form(form): Form<TransferForm>,
) -> PageResult {
    let page = signed_in(cookies, &state)?;

    let transfer = match form.validate() {
        Ok(transfer) => transfer,
        Err(message) => return transfer_page(page, form, message.to_string(), String::new()).await,
    };

    let sent = send_all(&page.api, &transfer).await;
    if sent == 0 {
        return transfer_page(page, form, "Transfer failed".to_string(), String::new()).await;
    }

    let success = format!("{} batch(es) transferred", sent);
    let fresh = TransferForm {
        handoff_type: form.handoff_type,
        ..TransferForm::default()
    };
    transfer_page(page, fresh, String::new(), success).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_batches_then_recipient() {
        let mut form = TransferForm::default();
        assert_eq!(form.validate(), Err("Please select at least one batch"));

        form.batch_ids = vec!["12".into(), " ".into()];
        assert_eq!(form.validate(), Err("Please select a recipient"));

        form.recipient_id = "8".into();
        let transfer = form.validate().unwrap();
        assert_eq!(transfer.batch_ids, vec!["12".to_string()]);
        assert_eq!(transfer.request.handoff_type, HandoffType::Pickup);
        assert_eq!(transfer.request.notes, None);
    }

    #[test]
    fn batch_from_detail_page_is_preselected() {
        let form = TransferForm::preselected(TransferQuery {
            batch: Some("14".into()),
        });
        assert_eq!(form.batch_ids, vec!["14".to_string()]);
        assert_eq!(form.handoff_type, HandoffType::Pickup.code());
        assert_eq!(form.validate(), Err("Please select a recipient"));

        let form = TransferForm::preselected(TransferQuery { batch: Some(" ".into()) });
        assert!(form.batch_ids.is_empty());
        assert!(TransferForm::preselected(TransferQuery::default()).batch_ids.is_empty());
    }

    #[test]
    fn chosen_handoff_type_is_kept() {
        let form = TransferForm {
            batch_ids: vec!["1".into()],
            recipient_id: "2".into(),
            handoff_type: "delivery".into(),
            notes: "Truck 4".into(),
        };
        let transfer = form.validate().unwrap();
        assert_eq!(transfer.request.handoff_type, HandoffType::Delivery);
        assert_eq!(transfer.request.notes.as_deref(), Some("Truck 4"));
    }
}
