// Exportable record columns
// The only names a CSV export may project. Nothing caller-supplied reaches SQL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::Record;
use crate::errors::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportColumn {
    Id,
    EventName,
    Parameters,
    Code,
    SignedIn,
    SignedOut,
    CreatedAt,
}

impl ExportColumn {
    pub const ALL: [ExportColumn; 7] = [
        ExportColumn::Id,
        ExportColumn::EventName,
        ExportColumn::Parameters,
        ExportColumn::Code,
        ExportColumn::SignedIn,
        ExportColumn::SignedOut,
        ExportColumn::CreatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportColumn::Id => "id",
            ExportColumn::EventName => "event_name",
            ExportColumn::Parameters => "parameters",
            ExportColumn::Code => "code",
            ExportColumn::SignedIn => "signed_in",
            ExportColumn::SignedOut => "signed_out",
            ExportColumn::CreatedAt => "created_at",
        }
    }

    /// Raw text value of this column for one record; absent values render empty.
    pub fn render(&self, record: &Record) -> String {
        match self {
            ExportColumn::Id => record.id.to_string(),
            ExportColumn::EventName => record.event_name.clone(),
            ExportColumn::Parameters => record.parameters_json(),
            ExportColumn::Code => record.code.clone().unwrap_or_default(),
            ExportColumn::SignedIn => render_flag(record.signed_in),
            ExportColumn::SignedOut => render_flag(record.signed_out),
            ExportColumn::CreatedAt => record.created_at.to_rfc3339(),
        }
    }
}

fn render_flag(value: Option<bool>) -> String {
    value.map(|flag| flag.to_string()).unwrap_or_default()
}

impl fmt::Display for ExportColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportColumn {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        ExportColumn::ALL
            .into_iter()
            .find(|column| column.as_str() == name)
            .ok_or_else(|| StoreError::InvalidArgument(format!("unknown column '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn sample() -> Record {
        Record {
            id: 7,
            event_name: "EXPO".to_string(),
            parameters: json!({"name": "Ana"}).as_object().cloned().unwrap_or_default(),
            code: None,
            signed_in: Some(true),
            signed_out: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn parses_every_real_column() {
        for column in ExportColumn::ALL {
            assert_eq!(column.as_str().parse::<ExportColumn>().unwrap(), column);
        }
    }

    #[test]
    fn rejects_injection_attempts() {
        assert!("id; DROP TABLE records".parse::<ExportColumn>().is_err());
        assert!("hashed_password".parse::<ExportColumn>().is_err());
    }

    #[test]
    fn renders_absent_values_as_empty() {
        let record = sample();
        assert_eq!(ExportColumn::Id.render(&record), "7");
        assert_eq!(ExportColumn::Code.render(&record), "");
        assert_eq!(ExportColumn::SignedIn.render(&record), "true");
        assert_eq!(ExportColumn::SignedOut.render(&record), "");
        assert_eq!(ExportColumn::Parameters.render(&record), r#"{"name":"Ana"}"#);
    }
}
