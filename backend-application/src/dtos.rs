// Request and response shapes used by commands and queries

use serde::{Deserialize, Serialize};

use backend_domain::StaffView;

use crate::auth::IssuedToken;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterStaffRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub specified_columns: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChangeRequest {
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlagUpdateRequest {
    pub flag: String,
    pub value: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub staff: StaffView,
    pub token: IssuedToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignCodesResult {
    pub updated: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub column: String,
    pub rows: usize,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub message: String,
    pub filename: String,
}
