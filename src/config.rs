use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (after `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the AgriTrace backend.
    pub api_url: String,
    pub port: u16,
    pub static_dir: PathBuf,
    /// Mark session cookies `Secure`.
    pub cookie_secure: bool,
    /// Public address of this dashboard, used in verification links.
    pub public_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("AGRITRACE_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:5000".to_string());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "AGRITRACE_API_URL",
                value: api_url,
            });
        }

        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 3000,
        };

        let cookie_secure = match lookup("COOKIE_SECURE").as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "COOKIE_SECURE",
                    value: other.to_string(),
                })
            }
        };

        let static_dir = PathBuf::from(lookup("STATIC_DIR").unwrap_or_else(|| "static".to_string()));
        let public_url = lookup("PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            port,
            static_dir,
            cookie_secure,
            public_url,
        })
    }

    pub fn verify_link(&self, batch_id: &str) -> String {
        format!("{}/verify/{}", self.public_url, urlencoding::encode(batch_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.api_url, "http://localhost:5000");
        assert_eq!(cfg.port, 3000);
        assert!(!cfg.cookie_secure);
        assert_eq!(cfg.verify_link("AGR-1"), "http://localhost:3000/verify/AGR-1");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("PORT", "eighty")]).is_err());
        assert!(config(&[("COOKIE_SECURE", "maybe")]).is_err());
        assert!(config(&[("AGRITRACE_API_URL", "localhost:5000")]).is_err());
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("AGRITRACE_API_URL", "https://api.agritrace.in/"),
            ("COOKIE_SECURE", "true"),
            ("PUBLIC_URL", "https://trace.example.org/"),
        ])
        .unwrap();
        assert_eq!(cfg.api_url, "https://api.agritrace.in");
        assert!(cfg.cookie_secure);
        assert_eq!(cfg.public_url, "https://trace.example.org");
    }
}
