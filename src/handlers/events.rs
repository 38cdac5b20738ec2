use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Multipart;
use askama::Template;
use chrono::Utc;
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{render, signed_in, PageResult, Reject};
use crate::{
    filters,
    api::RequestError,
    models::{AddEventRequest, Attachment, BatchDetail, BatchEvent, EventFeedItem, EventType, User},
    AppState,
};

#[derive(Template)]
#[template(path = "events/feed.html")]
struct EventFeedTemplate {
    user: User,
    events: Vec<EventFeedItem>,
    event_types: Vec<EventType>,
    query: String,
    selected_type: String,
    error: String,
}

#[derive(Template)]
#[template(path = "events/batch.html")]
struct BatchEventsTemplate {
    user: User,
    batch: BatchDetail,
    events: Vec<BatchEvent>,
}

#[derive(Template)]
#[template(path = "events/new.html")]
struct AddEventTemplate {
    user: User,
    batch: BatchDetail,
    form: AddEventRequest,
    event_types: Vec<EventType>,
    errors: Vec<(&'static str, &'static str)>,
    submit_error: String,
}

impl AddEventTemplate {
    fn error_for(&self, field: &str) -> &str {
        self.errors
            .iter()
            .find(|(key, _)| *key == field)
            .map(|(_, message)| *message)
            .unwrap_or("")
    }
}

#[derive(Deserialize)]
pub struct FeedQuery {
    #[serde(default, rename = "type")]
    event_type: String,
    #[serde(default)]
    q: String,
}

pub async fn event_feed(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> PageResult {
    let page = signed_in(cookies, &state)?;

    let (events, error) = match page.api.fetch_event_feed().await {
        Ok(events) => (events, String::new()),
        Err(err) => {
            log::warn!("event feed failed: {}", err);
            (Vec::new(), "Failed to load events".to_string())
        }
    };

    let type_filter = Some(query.event_type.trim())
        .filter(|t| !t.is_empty())
        .map(EventType::from);
    let events = events
        .into_iter()
        .filter(|e| e.matches(&query.q, type_filter.as_ref()))
        .collect();

    let template = EventFeedTemplate {
        user: page.user,
        events,
        event_types: EventType::RECORDABLE.to_vec(),
        query: query.q,
        selected_type: query.event_type,
        error,
    };
    render(&template)
}

pub async fn batch_events(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> PageResult {
    let page = signed_in(cookies, &state)?;
    let batch = page
        .api
        .fetch_batch(&id)
        .await
        .ok_or(Reject::Status(StatusCode::NOT_FOUND))?;
    let events = page.api.fetch_batch_events(&id).await;

    render(&BatchEventsTemplate {
        user: page.user,
        batch,
        events,
    })
}

fn blank_event(user: &User) -> AddEventRequest {
    AddEventRequest {
        timestamp: Utc::now().format("%Y-%m-%dT%H:%M").to_string(),
        actor: user.name.clone(),
        location: user.location.clone().unwrap_or_default(),
        ..AddEventRequest::default()
    }
}

pub async fn add_event_page(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> PageResult {
    let page = signed_in(cookies, &state)?;
    let batch = page
        .api
        .fetch_batch(&id)
        .await
        .ok_or(Reject::Status(StatusCode::NOT_FOUND))?;

    render(&AddEventTemplate {
        form: blank_event(&page.user),
        user: page.user,
        batch,
        event_types: EventType::RECORDABLE.to_vec(),
        errors: Vec::new(),
        submit_error: String::new(),
    })
}

async fn read_text(field: axum_extra::extract::multipart::Field) -> Result<String, StatusCode> {
    let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| StatusCode::BAD_REQUEST)
}

/// Read the add-event form. File inputs submitted without a file are
/// skipped.
async fn parse_event_multipart(mut multipart: Multipart) -> Result<AddEventRequest, StatusCode> {
    let mut request = AddEventRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        match name.as_str() {
            "documents" | "photos" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                let Some(file_name) = file_name.filter(|f| !f.is_empty()) else {
                    continue;
                };
                if bytes.is_empty() {
                    continue;
                }
                let attachment = Attachment {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                };
                if name == "documents" {
                    request.documents.push(attachment);
                } else {
                    request.photos.push(attachment);
                }
            }
            _ => {
                let value = read_text(field).await?;
                match name.as_str() {
                    "eventType" => request.event_type = value,
                    "description" => request.description = value,
                    "location" => request.location = value,
                    "timestamp" => request.timestamp = value,
                    "actor" => request.actor = value,
                    "temperature" => request.temperature = Some(value),
                    "humidity" => request.humidity = Some(value),
                    "notes" => request.notes = Some(value),
                    _ => (),
                }
            }
        }
    }
    Ok(request)
}

pub async fn add_event(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> PageResult<Response> {
    let page = signed_in(cookies, &state)?;
    let mut form = parse_event_multipart(multipart).await?;
    if form.timestamp.trim().is_empty() {
        form.timestamp = Utc::now().to_rfc3339();
    }

    let errors = form.validate();
    let submit_error = if errors.is_empty() {
        match page.api.add_event(&id, &form).await {
            Ok(recorded) => {
                log::info!(
                    "{} recorded {} event {} on batch {}",
                    page.user.email,
                    form.event_type,
                    recorded.id,
                    id
                );
                return Ok(Redirect::to(&format!("/batches/{}", id)).into_response());
            }
            Err(RequestError::Unsuccessful(None)) => "Failed to add event".to_string(),
            Err(err) => {
                log::warn!("adding event to batch {} failed: {}", id, err);
                err.to_string()
            }
        }
    } else {
        String::new()
    };

    let batch = page
        .api
        .fetch_batch(&id)
        .await
        .ok_or(Reject::Status(StatusCode::NOT_FOUND))?;
    // Files are not echoed back into the form.
    form.documents.clear();
    form.photos.clear();

    let template = AddEventTemplate {
        user: page.user,
        batch,
        form,
        event_types: EventType::RECORDABLE.to_vec(),
        errors,
        submit_error,
    };
    Ok(render(&template)?.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Id, Role};

    #[test]
    fn blank_event_is_prefilled_from_the_user() {
        let user = User {
            id: Id::from(3),
            email: "ravi@mill.in".into(),
            name: "Ravi Kumar".into(),
            organization: "Shakti Mills".into(),
            location: Some("Indore".into()),
            role: Role::Processor,
            created_at: None,
        };
        let form = blank_event(&user);
        assert_eq!(form.actor, "Ravi Kumar");
        assert_eq!(form.location, "Indore");
        assert_eq!(form.timestamp.len(), "2024-01-01T10:00".len());
        assert_eq!(
            form.validate(),
            vec![
                ("eventType", "Please select an event type"),
                ("description", "Description is required"),
            ]
        );
    }
}
