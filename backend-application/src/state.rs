use std::sync::Arc;

use backend_domain::ports::{ExportStore, MailRelay, RecordRepository, StaffRepository};
use backend_domain::RuntimeConfig;

use crate::auth::TokenSigner;
use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub record_repo: Arc<dyn RecordRepository>,
    pub staff_repo: Arc<dyn StaffRepository>,
    pub mail_relay: Arc<dyn MailRelay>,
    pub export_store: Arc<dyn ExportStore>,
    pub tokens: Arc<TokenSigner>,
    pub metrics: Arc<Metrics>,
}
