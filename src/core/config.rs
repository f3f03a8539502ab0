use serde::Deserialize;
use std::time::Duration;

use crate::core::error::ConfigError;

const PLACEHOLDER_SECRETS: &[&str] = &[
    "your-fallback-secret-key",
    "secret",
    "changeme",
    "change-me",
    "default",
    "password",
];

const RECOMMENDED_SECRET_LEN: usize = 32;

const MAX_TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 365;

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct Args {
    pub(crate) database_host: String,
    pub(crate) database_port: u16,
    pub(crate) database_name: String,
    pub(crate) database_user: String,
    pub(crate) database_password: String,
    #[serde(default = "default_max_connections")]
    pub(crate) database_max_connections: u32,
    #[serde(default = "default_log_level")]
    pub(crate) log_level: String,
    #[serde(default = "default_port")]
    pub(crate) port: u16,
    pub(crate) secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub(crate) token_ttl_secs: i64,
    #[serde(default = "default_store_timeout_ms")]
    pub(crate) store_timeout_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub(crate) request_timeout_secs: u64,
    #[serde(default = "default_bcrypt_cost")]
    pub(crate) bcrypt_cost: u32,
    #[serde(default)]
    pub(crate) cookie_secure: bool,
    #[serde(default = "default_allowed_origin")]
    pub(crate) allowed_origin: String,
    #[serde(default = "default_rate_limit")]
    pub(crate) rate_limit_per_sec: u64,
    #[serde(default = "default_attachment_dir")]
    pub(crate) attachment_dir: String,
    /// Origin prepended to attachment download URLs; empty yields
    /// root-relative URLs.
    #[serde(default)]
    pub(crate) public_base_url: String,
    #[serde(default = "default_max_upload_bytes")]
    pub(crate) max_upload_bytes: usize,
}

impl Args {
    pub(crate) fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.database_user,
            self.database_password,
            self.database_host,
            self.database_port,
            self.database_name
        )
    }

    /// Startup checks for values that would otherwise fail per request.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.validate_secret()?;
        self.validate_token_ttl()
    }

    /// Refuses to start with an empty or guessable signing secret.
    pub(crate) fn validate_secret(&self) -> Result<(), ConfigError> {
        let secret = self.secret.trim();

        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        if PLACEHOLDER_SECRETS
            .iter()
            .any(|placeholder| secret.eq_ignore_ascii_case(placeholder))
        {
            return Err(ConfigError::InsecureSecret(secret.to_owned()));
        }

        if secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                "signing secret is shorter than {} bytes",
                RECOMMENDED_SECRET_LEN
            );
        }

        Ok(())
    }

    /// Zero or negative lifetimes expire every token on issue, and values past
    /// a year overflow timestamp arithmetic long before they make sense.
    pub(crate) fn validate_token_ttl(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            return Err(ConfigError::InvalidTokenTtl(self.token_ttl_secs));
        }

        Ok(())
    }

    pub(crate) fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_ttl_secs)
    }

    pub(crate) fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".into()
}

fn default_port() -> u16 {
    8080
}

fn default_token_ttl_secs() -> i64 {
    60 * 60 * 24 * 30
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".into()
}

fn default_rate_limit() -> u64 {
    50
}

fn default_attachment_dir() -> String {
    "attachments".into()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

#[cfg(test)]
pub(crate) fn test_args(secret: &str) -> Args {
    Args {
        database_host: "localhost".into(),
        database_port: 5432,
        database_name: "tasktrack".into(),
        database_user: "tasktrack".into(),
        database_password: "tasktrack".into(),
        database_max_connections: default_max_connections(),
        log_level: default_log_level(),
        port: default_port(),
        secret: secret.into(),
        token_ttl_secs: default_token_ttl_secs(),
        store_timeout_ms: 200,
        request_timeout_secs: default_request_timeout_secs(),
        bcrypt_cost: 4,
        cookie_secure: false,
        allowed_origin: default_allowed_origin(),
        rate_limit_per_sec: 10_000,
        attachment_dir: default_attachment_dir(),
        public_base_url: String::new(),
        max_upload_bytes: default_max_upload_bytes(),
    }
}
