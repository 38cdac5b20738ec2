pub mod admin;
pub mod auth;
pub mod batches;
pub mod dashboard;
pub mod events;
pub mod qr;
pub mod split;
pub mod transfer;
pub mod verify;

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use crate::{
    api::ApiClient,
    middleware::{get_current_user, web_session, WebSession},
    models::User,
    AppState,
};

/// Why a page could not be shown.
#[derive(Debug)]
pub enum Reject {
    /// No session; send the visitor to the login page.
    SignIn,
    Status(StatusCode),
}

impl From<StatusCode> for Reject {
    fn from(status: StatusCode) -> Self {
        Reject::Status(status)
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    message: String,
}

impl IntoResponse for Reject {
    fn into_response(self) -> Response {
        match self {
            Reject::SignIn => Redirect::to("/login").into_response(),
            Reject::Status(status) => {
                let message = match status {
                    StatusCode::FORBIDDEN => "You do not have access to this page.",
                    StatusCode::NOT_FOUND => "Nothing was found at this address.",
                    _ => "Something went wrong. Please try again.",
                };
                let template = ErrorTemplate {
                    status: status.as_u16(),
                    message: message.to_string(),
                };
                match template.render() {
                    Ok(body) => (status, Html(body)).into_response(),
                    Err(_) => status.into_response(),
                }
            }
        }
    }
}

pub type PageResult<T = Html<String>> = Result<T, Reject>;

pub(crate) fn render<T: Template>(template: &T) -> PageResult {
    template.render().map(Html).map_err(|err| {
        log::error!("template render failed: {}", err);
        Reject::Status(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

/// Everything an authenticated page needs.
pub(crate) struct SignedIn {
    pub session: WebSession,
    pub user: User,
    pub api: ApiClient,
}

pub(crate) fn signed_in(cookies: Cookies, state: &AppState) -> PageResult<SignedIn> {
    let session = web_session(cookies, &state.config);
    let user = get_current_user(&session).ok_or(Reject::SignIn)?;
    let api = session.api(&state.api);
    Ok(SignedIn { session, user, api })
}
