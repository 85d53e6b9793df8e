// Record code value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// Width the numeric part of a code is zero-padded to. Longer ids are kept whole.
pub const CODE_ID_WIDTH: usize = 4;

/// Human-facing record identifier, `<event_name>-<id padded to 4 digits>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordCode(pub String);

impl RecordCode {
    pub fn derive(event_name: &str, id: i64) -> Self {
        Self(format!("{}-{:0width$}", event_name, id, width = CODE_ID_WIDTH))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
