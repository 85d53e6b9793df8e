use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{DbConfig, MailConfig, RuntimeConfig};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub public_base_url: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_seconds: u64,
    pub token_secret: Option<String>,
    pub token_ttl_minutes: u64,
    pub password_hash_rounds: u32,
    pub default_event_name: String,
    pub default_columns: String,
    pub export_path: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub mail_sender: Option<String>,
    pub mail_recipient: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            public_base_url: "http://127.0.0.1:8000".to_string(),
            database_url: "sqlite://rollcall.db".to_string(),
            db_max_connections: 5,
            db_acquire_timeout_seconds: 5,
            token_secret: None,
            token_ttl_minutes: 30,
            password_hash_rounds: 600_000,
            default_event_name: "default".to_string(),
            default_columns: "name".to_string(),
            export_path: "./exports/export.csv".to_string(),
            smtp_host: None,
            smtp_port: 465,
            smtp_username: None,
            smtp_password: None,
            mail_sender: None,
            mail_recipient: None,
            max_body_bytes: 8 * 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("ROLLCALL_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            Self::from_toml(&content)?
        } else {
            warn!("config.toml not found, using defaults");
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| anyhow!("invalid config: {}", err))
    }

    pub fn normalize(&mut self) {
        normalize_optional(&mut self.token_secret);
        normalize_optional(&mut self.smtp_host);
        normalize_optional(&mut self.smtp_username);
        normalize_optional(&mut self.smtp_password);
        normalize_optional(&mut self.mail_sender);
        normalize_optional(&mut self.mail_recipient);
        self.public_base_url = self.public_base_url.trim().trim_end_matches('/').to_string();
        self.default_event_name = self.default_event_name.trim().to_string();
        self.default_columns = self
            .default_columns
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(",");
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.export_path = resolve_path(base, &self.export_path);
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.public_base_url.trim().is_empty() {
            return Err(anyhow!("public_base_url must not be empty"));
        }
        if self.token_secret.is_none() {
            return Err(anyhow!("token_secret must be set"));
        }
        if self.token_ttl_minutes == 0 {
            return Err(anyhow!("token_ttl_minutes must be greater than 0"));
        }
        if self.password_hash_rounds == 0 {
            return Err(anyhow!("password_hash_rounds must be greater than 0"));
        }
        if self.db_max_connections == 0 {
            return Err(anyhow!("db_max_connections must be greater than 0"));
        }
        if self.export_path.trim().is_empty() {
            return Err(anyhow!("export_path must not be empty"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            public_base_url: self.public_base_url.clone(),
            token_secret: self.token_secret.clone().unwrap_or_default(),
            token_ttl_minutes: self.token_ttl_minutes,
            password_hash_rounds: self.password_hash_rounds,
            default_event_name: self.default_event_name.clone(),
            default_columns: self.default_columns.clone(),
            export_path: self.export_path.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            database_url: self.database_url.clone(),
            max_connections: self.db_max_connections,
            acquire_timeout_seconds: self.db_acquire_timeout_seconds,
        }
    }

    pub fn to_mail_config(&self) -> MailConfig {
        MailConfig {
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
            smtp_username: self.smtp_username.clone(),
            smtp_password: self.smtp_password.clone(),
            sender: self.mail_sender.clone(),
            recipient: self.mail_recipient.clone(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("ROLLCALL_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("ROLLCALL_PUBLIC_BASE_URL") {
            self.public_base_url = value;
        }
        if let Ok(value) = env::var("ROLLCALL_DATABASE_URL") {
            self.database_url = value;
        }
        if let Ok(value) = env::var("ROLLCALL_DB_MAX_CONNECTIONS") {
            self.db_max_connections = value.parse().unwrap_or(self.db_max_connections);
        }
        if let Ok(value) = env::var("ROLLCALL_DB_ACQUIRE_TIMEOUT_SECONDS") {
            self.db_acquire_timeout_seconds =
                value.parse().unwrap_or(self.db_acquire_timeout_seconds);
        }
        if let Ok(value) = env::var("ROLLCALL_TOKEN_SECRET") {
            self.token_secret = Some(value);
        }
        if let Ok(value) = env::var("ROLLCALL_TOKEN_TTL_MINUTES") {
            self.token_ttl_minutes = value.parse().unwrap_or(self.token_ttl_minutes);
        }
        if let Ok(value) = env::var("ROLLCALL_PASSWORD_HASH_ROUNDS") {
            self.password_hash_rounds = value.parse().unwrap_or(self.password_hash_rounds);
        }
        if let Ok(value) = env::var("ROLLCALL_DEFAULT_EVENT_NAME") {
            self.default_event_name = value;
        }
        if let Ok(value) = env::var("ROLLCALL_DEFAULT_COLUMNS") {
            self.default_columns = value;
        }
        if let Ok(value) = env::var("ROLLCALL_EXPORT_PATH") {
            self.export_path = value;
        }
        if let Ok(value) = env::var("ROLLCALL_SMTP_HOST") {
            self.smtp_host = Some(value);
        }
        if let Ok(value) = env::var("ROLLCALL_SMTP_PORT") {
            self.smtp_port = value.parse().unwrap_or(self.smtp_port);
        }
        if let Ok(value) = env::var("ROLLCALL_SMTP_USERNAME") {
            self.smtp_username = Some(value);
        }
        if let Ok(value) = env::var("ROLLCALL_SMTP_PASSWORD") {
            self.smtp_password = Some(value);
        }
        if let Ok(value) = env::var("ROLLCALL_MAIL_SENDER") {
            self.mail_sender = Some(value);
        }
        if let Ok(value) = env::var("ROLLCALL_MAIL_RECIPIENT") {
            self.mail_recipient = Some(value);
        }
        if let Ok(value) = env::var("ROLLCALL_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("ROLLCALL_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn normalize_optional(value: &mut Option<String>) {
    if let Some(raw) = value {
        if raw.trim().is_empty() {
            *value = None;
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_only_listed_fields() {
        let config = AppConfig::from_toml(
            r#"
            token_secret = "s3cret"
            default_event_name = "CONF"
            db_max_connections = 3
            "#,
        )
        .expect("parse");
        assert_eq!(config.token_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.default_event_name, "CONF");
        assert_eq!(config.db_max_connections, 3);
        assert_eq!(config.token_ttl_minutes, 30);
    }

    #[test]
    fn normalize_clears_blank_optionals_and_tidies_columns() {
        let mut config = AppConfig {
            token_secret: Some("  ".to_string()),
            smtp_host: Some(String::new()),
            public_base_url: "http://desk.local/ ".to_string(),
            default_columns: " name, ,email ,".to_string(),
            ..AppConfig::default()
        };
        config.normalize();
        assert_eq!(config.token_secret, None);
        assert_eq!(config.smtp_host, None);
        assert_eq!(config.public_base_url, "http://desk.local");
        assert_eq!(config.default_columns, "name,email");
    }

    #[test]
    fn validate_requires_token_secret() {
        let config = AppConfig::default();
        let err = config.validate().expect_err("missing secret");
        assert!(err.to_string().contains("token_secret"));
    }

    #[test]
    fn validate_rejects_zero_pool() {
        let config = AppConfig {
            token_secret: Some("s3cret".to_string()),
            db_max_connections: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn relative_export_path_resolves_against_config_dir() {
        let mut config = AppConfig::default();
        config.resolve_paths(Some(Path::new("/etc/rollcall")));
        assert_eq!(config.export_path, "/etc/rollcall/./exports/export.csv");
    }
}
