use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use backend_application::auth::TokenSigner;
use backend_application::{AppState, Metrics};
use backend_domain::{MailRelay, RecordRepository, RuntimeConfig, StaffRepository};
use backend_infrastructure::{
    connect_pool, AppConfig, CsvExportStore, SmtpMailRelay, SqlitePool, SqliteRecordRepo,
    SqliteStaffRepo,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        Self::from_config(&config).await
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let pool = connect_pool(&config.to_db_config()).await?;
        let mail_relay = SmtpMailRelay::new(config.to_mail_config());
        if !mail_relay.is_configured() {
            warn!("smtp relay is not fully configured, uploads will fail");
        }
        Self::assemble(config.to_runtime_config(), pool, Arc::new(mail_relay)).await
    }

    /// Wires repositories and services around an open pool.
    pub async fn assemble(
        config: RuntimeConfig,
        pool: SqlitePool,
        mail_relay: Arc<dyn MailRelay>,
    ) -> Result<Self> {
        let record_repo = Arc::new(SqliteRecordRepo::new(pool.clone()));
        record_repo.ensure_schema().await?;
        let staff_repo = Arc::new(SqliteStaffRepo::new(pool));
        staff_repo.ensure_schema().await?;

        let export_store = Arc::new(CsvExportStore::new(config.export_path.clone()));
        let tokens = Arc::new(TokenSigner::new(
            config.token_secret.clone(),
            config.token_ttl_minutes,
        ));
        info!(
            export_path = %config.export_path,
            token_ttl_minutes = config.token_ttl_minutes,
            "application context ready"
        );

        let state = AppState {
            config,
            record_repo,
            staff_repo,
            mail_relay,
            export_store,
            tokens,
            metrics: Arc::new(Metrics::default()),
        };
        Ok(Self { state })
    }
}
