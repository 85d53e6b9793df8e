// Lifecycle flag value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

/// One of the two independent check-in checkpoints of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFlag {
    SignedIn,
    SignedOut,
}

impl RecordFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordFlag::SignedIn => "signed_in",
            RecordFlag::SignedOut => "signed_out",
        }
    }
}

impl fmt::Display for RecordFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordFlag {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "signed_in" => Ok(RecordFlag::SignedIn),
            "signed_out" => Ok(RecordFlag::SignedOut),
            other => Err(StoreError::InvalidArgument(format!(
                "unknown flag '{}', expected one of: signed_in, signed_out",
                other
            ))),
        }
    }
}
