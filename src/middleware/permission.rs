use axum::http::StatusCode;
use tower_cookies::Cookies;

use super::CookieStore;
use crate::config::AppConfig;
use crate::models::{Role, User};
use crate::session::SessionContext;

pub type WebSession = SessionContext<CookieStore>;

/// Session persisted in this request's cookies.
pub fn web_session(cookies: Cookies, config: &AppConfig) -> WebSession {
    SessionContext::restore(CookieStore::new(cookies, config.cookie_secure))
}

pub fn get_current_user(session: &WebSession) -> Option<User> {
    session.user().cloned()
}

pub fn require_role(user: &User, roles: &[Role]) -> Result<(), StatusCode> {
    if user.has_role(roles) {
        Ok(())
    } else {
        log::warn!(
            "{} ({}) denied, needs one of {:?}",
            user.email,
            user.role.code(),
            roles.iter().map(Role::code).collect::<Vec<_>>()
        );
        Err(StatusCode::FORBIDDEN)
    }
}
