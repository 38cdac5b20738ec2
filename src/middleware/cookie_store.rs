use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

use crate::session::{SessionStore, StorageError};

/// Session persistence in the browser's cookie jar. Values are
/// percent-encoded so JSON survives the cookie grammar.
#[derive(Clone)]
pub struct CookieStore {
    cookies: Cookies,
    secure: bool,
}

impl CookieStore {
    pub fn new(cookies: Cookies, secure: bool) -> Self {
        Self { cookies, secure }
    }
}

impl SessionStore for CookieStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.cookies.get(key) {
            Some(cookie) => urlencoding::decode(cookie.value())
                .map(|v| Some(v.into_owned()))
                .map_err(|e| StorageError::Unavailable(e.to_string())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let cookie = Cookie::build((key.to_string(), urlencoding::encode(value).into_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::hours(24))
            .build();
        self.cookies.add(cookie);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.cookies
            .remove(Cookie::build((key.to_string(), "")).path("/").build());
        Ok(())
    }
}
