// Runtime configuration shared across layers

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub public_base_url: String,
    pub token_secret: String,
    pub token_ttl_minutes: u64,
    pub password_hash_rounds: u32,
    pub default_event_name: String,
    pub default_columns: String,
    pub export_path: String,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
}
