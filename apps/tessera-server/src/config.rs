//! Server configuration via environment variables.
//!
//! ```bash
//! # Bearer token for the admin endpoints. Leave unset to disable the
//! # admin surface entirely (requests then get 403).
//! TESSERA_ADMIN_TOKEN=...
//! ```

use std::env;
use thiserror::Error;

/// Server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Bearer token required on admin endpoints; `None` disables them.
    pub admin_token: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let admin_token = match env::var("TESSERA_ADMIN_TOKEN") {
            Ok(v) if v.trim().is_empty() => {
                return Err(ConfigError::BlankAdminToken);
            }
            Ok(v) => Some(v),
            Err(env::VarError::NotPresent) => None,
            Err(e) => return Err(ConfigError::InvalidEnvVar(e.to_string())),
        };

        Ok(Self { admin_token })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TESSERA_ADMIN_TOKEN is set but blank")]
    BlankAdminToken,

    #[error("invalid environment variable: {0}")]
    InvalidEnvVar(String),
}
