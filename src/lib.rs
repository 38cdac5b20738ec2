pub mod allocation;
pub mod api;
pub mod config;
pub mod filters;
pub mod handlers;
pub mod icons;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod session;
pub mod timeline;

use std::sync::Arc;

use api::ApiClient;
use config::AppConfig;

/// Shared by every handler: the backend client (without credentials) and
/// the runtime settings.
#[derive(Debug, Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> api::Result<Self> {
        let api = ApiClient::new(config.api_url.clone())?;
        Ok(Self {
            api,
            config: Arc::new(config),
        })
    }
}
