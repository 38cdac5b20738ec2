use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use askama::Template;
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{render, signed_in, PageResult, Reject};
use crate::{
    api::RequestError,
    filters,
    middleware::require_role,
    models::{
        BatchDetail, BatchEvent, BatchStatus, BatchSummary, CreateBatchRequest, HandoffRequest,
        HandoffType, Id, Recipient, Role, User,
    },
    AppState,
};

pub const PRODUCT_TYPES: [&str; 8] = [
    "Grain", "Fruit", "Vegetable", "Spice", "Fiber", "Dairy", "Beverage", "Other",
];

pub const WEIGHT_UNITS: [&str; 5] = ["kg", "g", "lb", "ton", "quintal"];

pub const CERTIFICATIONS: [&str; 6] = [
    "Organic Certified",
    "Fair Trade",
    "Non-GMO",
    "FSSAI Approved",
    "ISO 22000",
    "HACCP",
];

const CREATORS: [Role; 2] = [Role::Farmer, Role::Admin];

const PROCESSOR_TRANSFER_NOTE: &str = "Batch transferred from farmer to processor after creation";

#[derive(Template)]
#[template(path = "batches/list.html")]
struct BatchListTemplate {
    user: User,
    batches: Vec<BatchSummary>,
    query: String,
    status: String,
    statuses: Vec<BatchStatus>,
    error: String,
    can_create: bool,
}

#[derive(Template)]
#[template(path = "batches/detail.html")]
struct BatchDetailTemplate {
    user: User,
    batch: BatchDetail,
    events: Vec<BatchEvent>,
    remaining: Decimal,
    verify_url: String,
}

#[derive(Template)]
#[template(path = "batches/create.html")]
struct CreateBatchTemplate {
    user: User,
    form: CreateBatchForm,
    errors: Vec<(&'static str, &'static str)>,
    submit_error: String,
    processors: Vec<Recipient>,
    product_types: Vec<&'static str>,
    units: Vec<&'static str>,
    certification_options: Vec<&'static str>,
}

impl CreateBatchTemplate {
    fn error_for(&self, field: &str) -> &str {
        self.errors
            .iter()
            .find(|(key, _)| *key == field)
            .map(|(_, message)| *message)
            .unwrap_or("")
    }

    fn is_certified(&self, name: &str) -> bool {
        self.form.certifications.iter().any(|c| c == name)
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    q: String,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize, Default, Clone)]
pub struct CreateBatchForm {
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    product_type: String,
    #[serde(default)]
    weight: String,
    #[serde(default)]
    weight_unit: String,
    #[serde(default)]
    farm_name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    harvest_date: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    certifications: Vec<String>,
    #[serde(default)]
    certification_id: String,
    #[serde(default)]
    transfer_to_processor: Option<String>,
    #[serde(default)]
    processor_id: String,
}

impl CreateBatchForm {
    fn parsed_weight(&self) -> Option<Decimal> {
        self.weight
            .trim()
            .parse::<Decimal>()
            .ok()
            .filter(|w| *w > Decimal::ZERO)
    }

    /// Step one: what is being registered.
    fn validate_product(&self) -> Vec<(&'static str, &'static str)> {
        let mut errors = Vec::new();
        if self.product_name.trim().is_empty() {
            errors.push(("productName", "Product name is required"));
        }
        if self.product_type.trim().is_empty() {
            errors.push(("productType", "Select a product type"));
        }
        if self.parsed_weight().is_none() {
            errors.push(("weight", "Enter a valid weight"));
        }
        errors
    }

    /// Step two: where it comes from.
    fn validate_origin(&self) -> Vec<(&'static str, &'static str)> {
        let mut errors = Vec::new();
        if self.farm_name.trim().is_empty() {
            errors.push(("farmName", "Farm name is required"));
        }
        if self.location.trim().is_empty() {
            errors.push(("location", "Location is required"));
        }
        errors
    }

    /// Errors of the first step that fails.
    fn validate(&self) -> Vec<(&'static str, &'static str)> {
        let product = self.validate_product();
        if product.is_empty() {
            self.validate_origin()
        } else {
            product
        }
    }

    fn to_request(&self) -> Option<CreateBatchRequest> {
        let optional = |s: &str| Some(s.trim().to_string()).filter(|v| !v.is_empty());
        let unit = self.weight_unit.trim();
        Some(CreateBatchRequest {
            product_name: self.product_name.trim().to_string(),
            product_type: self.product_type.trim().to_string(),
            weight: self.parsed_weight()?,
            weight_unit: if unit.is_empty() { "kg" } else { unit }.to_string(),
            farm_name: self.farm_name.trim().to_string(),
            location: self.location.trim().to_string(),
            harvest_date: optional(&self.harvest_date),
            description: optional(&self.description),
            certifications: self.certifications.clone(),
            certification_id: optional(&self.certification_id),
        })
    }

    fn wants_processor_transfer(&self) -> Option<Id> {
        self.transfer_to_processor.as_ref()?;
        let id = self.processor_id.trim();
        if id.is_empty() {
            None
        } else {
            Some(Id::from(id))
        }
    }
}

pub async fn batches_list(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> PageResult {
    let page = signed_in(cookies, &state)?;

    let (batches, error) = match page.api.fetch_batches().await {
        Ok(batches) => (batches, String::new()),
        Err(err) => {
            log::warn!("batch listing failed: {}", err);
            (Vec::new(), err.to_string())
        }
    };

    let needle = query.q.trim().to_lowercase();
    let batches = batches
        .into_iter()
        .filter(|b| query.status.is_empty() || b.status.code() == query.status)
        .filter(|b| {
            needle.is_empty()
                || b.batch_id.to_lowercase().contains(&needle)
                || b.product.to_lowercase().contains(&needle)
        })
        .collect();

    let template = BatchListTemplate {
        can_create: page.user.has_role(&CREATORS),
        user: page.user,
        batches,
        query: query.q,
        status: query.status,
        statuses: BatchStatus::ALL.to_vec(),
        error,
    };
    render(&template)
}

pub async fn batch_detail(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> PageResult {
    let page = signed_in(cookies, &state)?;
    let batch = page
        .api
        .fetch_batch(&id)
        .await
        .ok_or(Reject::Status(axum::http::StatusCode::NOT_FOUND))?;

    let events = if batch.events.is_empty() {
        page.api.fetch_batch_events(&id).await
    } else {
        batch.events.clone()
    };

    let template = BatchDetailTemplate {
        user: page.user,
        remaining: batch.weight - batch.allocated_to_children(),
        verify_url: state.config.verify_link(&batch.batch_id),
        events,
        batch,
    };
    render(&template)
}

async fn processors_for(user: &User, api: &crate::api::ApiClient) -> Vec<Recipient> {
    if user.role != Role::Farmer {
        return Vec::new();
    }
    api.fetch_available_recipients()
        .await
        .into_iter()
        .filter(|r| r.role == Role::Processor)
        .collect()
}

fn create_template(
    user: User,
    form: CreateBatchForm,
    errors: Vec<(&'static str, &'static str)>,
    submit_error: String,
    processors: Vec<Recipient>,
) -> CreateBatchTemplate {
    CreateBatchTemplate {
        user,
        form,
        errors,
        submit_error,
        processors,
        product_types: PRODUCT_TYPES.to_vec(),
        units: WEIGHT_UNITS.to_vec(),
        certification_options: CERTIFICATIONS.to_vec(),
    }
}

pub async fn create_batch_page(cookies: Cookies, State(state): State<AppState>) -> PageResult {
    let page = signed_in(cookies, &state)?;
    require_role(&page.user, &CREATORS)?;

    let processors = processors_for(&page.user, &page.api).await;
    let form = CreateBatchForm {
        weight_unit: "kg".to_string(),
        ..CreateBatchForm::default()
    };
    render(&create_template(page.user, form, Vec::new(), String::new(), processors))
}

pub async fn create_batch(
    cookies: Cookies,
    State(state): State<AppState>,
    Form(form): Form<CreateBatchForm>,
) -> PageResult<Response> {
    let page = signed_in(cookies, &state)?;
    require_role(&page.user, &CREATORS)?;

    let errors = form.validate();
    let request = match form.to_request() {
        Some(request) if errors.is_empty() => request,
        _ => {
            let processors = processors_for(&page.user, &page.api).await;
            let template = create_template(page.user, form, errors, String::new(), processors);
            return Ok(render(&template)?.into_response());
        }
    };

    let created = match page.api.create_batch(&request).await {
        Ok(created) => created,
        Err(err) => {
            let message = match err {
                RequestError::Unsuccessful(_) => "Failed to create batch. Please try again.".to_string(),
                other => other.to_string(),
            };
            let processors = processors_for(&page.user, &page.api).await;
            let template = create_template(page.user, form, Vec::new(), message, processors);
            return Ok(render(&template)?.into_response());
        }
    };
    log::info!("{} created batch {}", page.user.email, created.batch_id);

    if page.user.role == Role::Farmer {
        if let Some(processor) = form.wants_processor_transfer() {
            let handoff = HandoffRequest {
                to_user_id: processor,
                handoff_type: HandoffType::Pickup,
                notes: Some(PROCESSOR_TRANSFER_NOTE.to_string()),
            };
            if let Err(err) = page.api.initiate_handoff(created.id.as_str(), &handoff).await {
                log::error!("handoff of new batch {} failed: {}", created.batch_id, err);
            }
        }
    }

    Ok(Redirect::to(&format!("/batches/{}", created.id)).into_response())
}
