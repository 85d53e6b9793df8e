// Record entity
// One attendee entry of an event with free-form parameters and two check-in flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::StoreError;
use crate::value_objects::RecordCode;

/// Event-specific attendee attributes.
pub type Parameters = Map<String, Value>;

/// Field names owned by the record itself. Parameter keys may not reuse them.
pub const RESERVED_FIELDS: [&str; 7] = [
    "id",
    "event_name",
    "parameters",
    "code",
    "signed_in",
    "signed_out",
    "created_at",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub event_name: String,
    pub parameters: Parameters,
    pub code: Option<String>,
    pub signed_in: Option<bool>,
    pub signed_out: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl Record {
    pub fn derived_code(&self) -> RecordCode {
        RecordCode::derive(&self.event_name, self.id)
    }

    pub fn parameters_json(&self) -> String {
        Value::Object(self.parameters.clone()).to_string()
    }

    /// Single-level view: parameters first, then record fields, which win on collision.
    pub fn flattened(&self) -> Map<String, Value> {
        let mut out = self.parameters.clone();
        out.insert("id".to_string(), Value::from(self.id));
        out.insert(
            "event_name".to_string(),
            Value::String(self.event_name.clone()),
        );
        out.insert(
            "code".to_string(),
            self.code.clone().map(Value::String).unwrap_or(Value::Null),
        );
        out.insert("signed_in".to_string(), option_bool(self.signed_in));
        out.insert("signed_out".to_string(), option_bool(self.signed_out));
        out.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        out
    }

    /// Copy of the record keeping only the listed parameter keys.
    pub fn projected(&self, columns: &[String]) -> Record {
        let parameters = self
            .parameters
            .iter()
            .filter(|(key, _)| columns.iter().any(|column| column == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Record {
            parameters,
            ..self.clone()
        }
    }
}

fn option_bool(value: Option<bool>) -> Value {
    value.map(Value::Bool).unwrap_or(Value::Null)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub event_name: String,
    #[serde(default)]
    pub parameters: Parameters,
}

impl NewRecord {
    pub fn normalized(mut self) -> Result<Self, StoreError> {
        self.event_name = normalize_event_name(&self.event_name)?;
        check_reserved_keys(&self.parameters)?;
        Ok(self)
    }
}

/// Partial update: only the supplied fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub parameters: Option<Parameters>,
    #[serde(default)]
    pub signed_in: Option<bool>,
    #[serde(default)]
    pub signed_out: Option<bool>,
}

impl RecordPatch {
    pub fn normalized(mut self) -> Result<Self, StoreError> {
        if let Some(event_name) = self.event_name.take() {
            self.event_name = Some(normalize_event_name(&event_name)?);
        }
        if let Some(parameters) = &self.parameters {
            check_reserved_keys(parameters)?;
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.event_name.is_none()
            && self.parameters.is_none()
            && self.signed_in.is_none()
            && self.signed_out.is_none()
    }

    /// Applies the patch in place. An assigned code follows a renamed event.
    pub fn apply_to(&self, record: &mut Record) {
        if let Some(event_name) = &self.event_name {
            record.event_name = event_name.clone();
            if record.code.is_some() {
                record.code = Some(record.derived_code().into_inner());
            }
        }
        if let Some(parameters) = &self.parameters {
            record.parameters = parameters.clone();
        }
        if let Some(signed_in) = self.signed_in {
            record.signed_in = Some(signed_in);
        }
        if let Some(signed_out) = self.signed_out {
            record.signed_out = Some(signed_out);
        }
    }
}

fn normalize_event_name(raw: &str) -> Result<String, StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidArgument(
            "event_name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn check_reserved_keys(parameters: &Parameters) -> Result<(), StoreError> {
    let mut clashes = parameters
        .keys()
        .filter(|key| RESERVED_FIELDS.contains(&key.as_str()))
        .cloned()
        .collect::<Vec<_>>();
    if clashes.is_empty() {
        return Ok(());
    }
    clashes.sort();
    Err(StoreError::InvalidArgument(format!(
        "parameters use reserved field names: {}",
        clashes.join(", ")
    )))
}
