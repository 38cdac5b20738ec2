use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::Form;
use askama::Template;
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_cookies::Cookies;
use uuid::Uuid;

use super::{render, signed_in, PageResult, Reject};
use crate::{
    allocation::{
        AllocationEntry, AllocationError, AllocationIssue, IssueTarget, ParentAllocation,
        SplitAllocator, SplitError,
    },
    api::CreatedChild,
    filters,
    models::User,
    AppState,
};

const DEFAULT_BAGS: &str = "2";
const DEFAULT_BAG_WEIGHT: &str = "10";

/// An allocation entry as drawn on the form, with its inline errors.
pub struct EntryRow {
    pub id: String,
    pub weight: String,
    pub destination: String,
    pub notes: String,
    pub weight_error: String,
    pub destination_error: String,
}

#[derive(Template)]
#[template(path = "batches/split.html")]
struct SplitTemplate {
    user: User,
    parent: ParentAllocation,
    rows: Vec<EntryRow>,
    common_location: String,
    bags: String,
    weight_per_bag: String,
    total_allocated: Decimal,
    remaining: Decimal,
    over_allocated: bool,
    total_error: String,
    submit_error: String,
}

#[derive(Template)]
#[template(path = "batches/split_done.html")]
struct SplitDoneTemplate {
    user: User,
    parent: ParentAllocation,
    children: Vec<CreatedChild>,
}

/// The posted split form. Entry fields arrive as parallel repeated fields.
#[derive(Deserialize, Default)]
pub struct SplitForm {
    #[serde(default)]
    entry_id: Vec<String>,
    #[serde(default)]
    weight: Vec<String>,
    #[serde(default)]
    destination: Vec<String>,
    #[serde(default)]
    notes: Vec<String>,
    #[serde(default)]
    common_location: String,
    #[serde(default)]
    bags: String,
    #[serde(default)]
    weight_per_bag: String,
    #[serde(default)]
    action: String,
}

/// What the clicked button asks for.
#[derive(Debug, PartialEq)]
enum SplitAction {
    Add,
    Remove(Uuid),
    Distribute,
    QuickSplit,
    Submit,
    Refresh,
}

impl SplitAction {
    fn parse(raw: &str) -> Self {
        match raw {
            "add" => SplitAction::Add,
            "distribute" => SplitAction::Distribute,
            "quick" => SplitAction::QuickSplit,
            "submit" => SplitAction::Submit,
            other => match other.strip_prefix("remove:").map(Uuid::parse_str) {
                Some(Ok(id)) => SplitAction::Remove(id),
                _ => SplitAction::Refresh,
            },
        }
    }
}

fn parse_weight(raw: &str) -> Decimal {
    raw.trim().parse().unwrap_or(Decimal::ZERO)
}

/// Run a quick split from the raw form fields. Bag counts too large for
/// `u32` are treated as too many bags.
fn quick_split(
    allocator: &mut SplitAllocator,
    bags: &str,
    weight_per_bag: &str,
) -> Result<(), AllocationError> {
    let bags = match bags.trim().parse::<u64>() {
        Ok(n) => u32::try_from(n).unwrap_or(u32::MAX),
        Err(_) => 0,
    };
    allocator.generate_quick_split(bags, parse_weight(weight_per_bag))
}

impl SplitForm {
    fn entries(&self) -> Vec<AllocationEntry> {
        self.entry_id
            .iter()
            .enumerate()
            .map(|(i, id)| AllocationEntry {
                id: Uuid::parse_str(id).unwrap_or_else(|_| Uuid::new_v4()),
                weight: self.weight.get(i).map(|w| parse_weight(w)).unwrap_or_default(),
                destination: self.destination.get(i).cloned().unwrap_or_default(),
                notes: self.notes.get(i).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

struct FormState {
    bags: String,
    weight_per_bag: String,
    issues: Vec<AllocationIssue>,
    submit_error: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            bags: DEFAULT_BAGS.to_string(),
            weight_per_bag: DEFAULT_BAG_WEIGHT.to_string(),
            issues: Vec::new(),
            submit_error: String::new(),
        }
    }
}

fn split_template(user: User, allocator: &SplitAllocator, state: FormState) -> SplitTemplate {
    let message_for = |target: IssueTarget| {
        state
            .issues
            .iter()
            .find(|i| i.target == target)
            .map(|i| i.message.clone())
            .unwrap_or_default()
    };

    let rows = allocator
        .entries()
        .iter()
        .map(|e| EntryRow {
            id: e.id.to_string(),
            weight: if e.weight.is_zero() {
                String::new()
            } else {
                e.weight.normalize().to_string()
            },
            destination: e.destination.clone(),
            notes: e.notes.clone(),
            weight_error: message_for(IssueTarget::Weight(e.id)),
            destination_error: message_for(IssueTarget::Destination(e.id)),
        })
        .collect();

    SplitTemplate {
        user,
        parent: allocator.parent().clone(),
        rows,
        common_location: allocator.common_location().to_string(),
        bags: state.bags.clone(),
        weight_per_bag: state.weight_per_bag.clone(),
        total_allocated: allocator.total_allocated().unwrap_or(Decimal::MAX),
        remaining: allocator.remaining().unwrap_or(Decimal::MIN),
        over_allocated: allocator.is_over_allocated(),
        total_error: message_for(IssueTarget::Total),
        submit_error: state.submit_error.clone(),
    }
}

async fn load_parent(api: &crate::api::ApiClient, id: &str) -> PageResult<ParentAllocation> {
    api.fetch_batch(id)
        .await
        .map(|batch| ParentAllocation::from(&batch))
        .ok_or(Reject::Status(StatusCode::NOT_FOUND))
}

pub async fn split_page(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> PageResult {
    let page = signed_in(cookies, &state)?;
    let parent = load_parent(&page.api, &id).await?;
    let allocator = SplitAllocator::new(parent);
    render(&split_template(page.user, &allocator, FormState::default()))
}

pub async fn split_submit(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<SplitForm>,
) -> PageResult {
    let page = signed_in(cookies, &state)?;
    let parent = load_parent(&page.api, &id).await?;
    let mut allocator = SplitAllocator::restore(parent, form.entries(), form.common_location.clone());

    let mut view = FormState {
        bags: form.bags.clone(),
        weight_per_bag: form.weight_per_bag.clone(),
        ..FormState::default()
    };

    match SplitAction::parse(&form.action) {
        SplitAction::Add => {
            allocator.add_allocation();
        }
        SplitAction::Remove(entry) => {
            if let Err(err) = allocator.remove_allocation(entry) {
                log::debug!("allocation not removed: {}", err);
            }
        }
        SplitAction::Distribute => allocator.distribute_evenly(),
        SplitAction::QuickSplit => {
            if let Err(err) = quick_split(&mut allocator, &form.bags, &form.weight_per_bag) {
                view.issues.push(AllocationIssue {
                    target: IssueTarget::Total,
                    message: err.to_string(),
                });
            }
        }
        SplitAction::Submit => match allocator.submit(&page.api).await {
            Ok(children) => {
                let template = SplitDoneTemplate {
                    user: page.user,
                    parent: allocator.parent().clone(),
                    children,
                };
                return render(&template);
            }
            Err(SplitError::Invalid(issues)) => view.issues = issues,
            Err(err) => view.submit_error = err.to_string(),
        },
        SplitAction::Refresh => {}
    }

    render(&split_template(page.user, &allocator, view))
}
