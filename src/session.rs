//! Signed-in user state and its persistence.
//!
//! A [`SessionContext`] is built per request from whatever store holds the
//! persisted session (cookies in the web app, memory in tests) and is the
//! only thing that logs users in or out. Store access is best effort: a
//! store that refuses reads or writes never turns into a user-facing error.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::api::{ApiClient, RequestError};
use crate::models::{RegisterRequest, User};

pub const TOKEN_KEY: &str = "agritrace_token";
pub const USER_KEY: &str = "agritrace_user";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage access denied")]
    Denied,

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Key/value store the session is persisted in.
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process store. Clones share the same map, so a clone handed to a new
/// context behaves like reloading the page.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    denied: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses every access.
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::default()
        }
    }

    fn with_map<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, String>) -> T,
    ) -> Result<T, StorageError> {
        if self.denied {
            return Err(StorageError::Denied);
        }
        let mut map = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(f(&mut map))
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_map(|m| m.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_map(|m| {
            m.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.with_map(|m| {
            m.remove(key);
        })
    }
}

/// The persisted bearer token, if any. Never fails: an unreadable store
/// reads as "no token".
pub fn read_token<S: SessionStore + ?Sized>(store: &S) -> Option<String> {
    match store.get(TOKEN_KEY) {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(err) => {
            log::warn!("could not read session token: {}", err);
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated { token: String, user: User },
}

/// Why a login or registration did not go through. `Display` is the text
/// shown on the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0}")]
    Rejected(String),

    #[error("Network error. Please try again.")]
    Network,
}

impl AuthError {
    fn from_request(err: &RequestError, fallback: &str) -> Self {
        match err {
            RequestError::Transport(_) | RequestError::Decode(_) => AuthError::Network,
            other => AuthError::Rejected(
                other
                    .server_message()
                    .unwrap_or(fallback)
                    .to_string(),
            ),
        }
    }
}

#[derive(Debug)]
pub struct SessionContext<S: SessionStore> {
    store: S,
    state: SessionState,
}

impl<S: SessionStore> SessionContext<S> {
    /// Read the persisted session. Missing or unreadable halves leave the
    /// context unauthenticated.
    pub fn restore(store: S) -> Self {
        let state = match (read_token(&store), Self::read_user(&store)) {
            (Some(token), Some(user)) => SessionState::Authenticated { token, user },
            _ => SessionState::Unauthenticated,
        };
        Self { store, state }
    }

    fn read_user(store: &S) -> Option<User> {
        let raw = match store.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                log::warn!("could not read session user: {}", err);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                log::warn!("discarding unreadable session user: {}", err);
                None
            }
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated { user, .. } => Some(user),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated { token, .. } => Some(token),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    /// Client carrying this session's token.
    pub fn api(&self, base: &ApiClient) -> ApiClient {
        base.with_token(self.token().map(str::to_string))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<&User, AuthError> {
        let reply = api
            .login(email, password)
            .await
            .map_err(|err| AuthError::from_request(&err, "Login failed"))?;

        match (reply.token, reply.user) {
            (Some(token), Some(user)) if !token.is_empty() => {
                log::info!("user {} signed in as {}", user.email, user.role.code());
                self.persist(&token, &user);
                self.state = SessionState::Authenticated { token, user };
                self.user()
                    .ok_or_else(|| AuthError::Rejected("Login failed".to_string()))
            }
            _ => Err(AuthError::Rejected(
                reply.error.unwrap_or_else(|| "Login failed".to_string()),
            )),
        }
    }

    /// Register, then sign in with the same credentials.
    pub async fn register(
        &mut self,
        api: &ApiClient,
        request: &RegisterRequest,
    ) -> Result<&User, AuthError> {
        let reply = api
            .register(request)
            .await
            .map_err(|err| AuthError::from_request(&err, "Registration failed"))?;

        if reply.user.is_none() {
            return Err(AuthError::Rejected(
                reply.error.unwrap_or_else(|| "Registration failed".to_string()),
            ));
        }
        log::info!("registered {} as {}", request.email, request.role.code());
        self.login(api, &request.email, &request.password).await
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user() {
            log::info!("user {} signed out", user.email);
        }
        self.state = SessionState::Unauthenticated;
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.store.remove(key) {
                log::warn!("could not clear {}: {}", key, err);
            }
        }
    }

    fn persist(&self, token: &str, user: &User) {
        if let Err(err) = self.store.set(TOKEN_KEY, token) {
            log::warn!("could not persist session token: {}", err);
        }
        match serde_json::to_string(user) {
            Ok(raw) => {
                if let Err(err) = self.store.set(USER_KEY, &raw) {
                    log::warn!("could not persist session user: {}", err);
                }
            }
            Err(err) => log::warn!("could not encode session user: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Id, Role};

    fn asha() -> User {
        User {
            id: Id::from(7),
            email: "asha@farm.in".into(),
            name: "Asha Patel".into(),
            organization: "Green Valley Farms".into(),
            location: Some("Karnal".into()),
            role: Role::Farmer,
            created_at: None,
        }
    }

    #[test]
    fn restore_needs_both_halves() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "tok").unwrap();
        assert!(!SessionContext::restore(store.clone()).is_authenticated());

        store
            .set(USER_KEY, &serde_json::to_string(&asha()).unwrap())
            .unwrap();
        let ctx = SessionContext::restore(store.clone());
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.user(), Some(&asha()));
        assert_eq!(ctx.token(), Some("tok"));
    }

    #[test]
    fn unreadable_user_starts_unauthenticated() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "tok").unwrap();
        store.set(USER_KEY, "{not json").unwrap();
        assert_eq!(
            SessionContext::restore(store).state(),
            &SessionState::Unauthenticated
        );
    }

    #[test]
    fn denied_store_is_silent() {
        let store = MemoryStore::denied();
        assert_eq!(read_token(&store), None);

        let mut ctx = SessionContext::restore(store);
        assert!(!ctx.is_authenticated());
        ctx.persist("tok", &asha());
        ctx.logout();
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn logout_clears_both_keys() {
        let store = MemoryStore::new();
        let mut ctx = SessionContext::restore(store.clone());
        ctx.persist("tok", &asha());
        assert!(SessionContext::restore(store.clone()).is_authenticated());

        ctx.logout();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(USER_KEY).unwrap(), None);
        assert!(!SessionContext::restore(store).is_authenticated());
    }

    #[test]
    fn session_client_carries_token() {
        let base = ApiClient::new("http://localhost:5000").unwrap();
        let store = MemoryStore::new();
        assert!(!SessionContext::restore(store.clone()).api(&base).has_token());

        store.set(TOKEN_KEY, "tok").unwrap();
        store
            .set(USER_KEY, &serde_json::to_string(&asha()).unwrap())
            .unwrap();
        assert!(SessionContext::restore(store).api(&base).has_token());
    }

    #[test]
    fn auth_error_messages() {
        let err = RequestError::Status {
            status: 401,
            detail: crate::api::ErrorDetail::Message("Invalid credentials".into()),
        };
        assert_eq!(
            AuthError::from_request(&err, "Login failed").to_string(),
            "Invalid credentials"
        );

        let err = RequestError::Status {
            status: 500,
            detail: crate::api::ErrorDetail::Unspecified,
        };
        assert_eq!(
            AuthError::from_request(&err, "Registration failed").to_string(),
            "Registration failed"
        );
    }
}
