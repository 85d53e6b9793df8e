// Event staff entity
// An operator scoped to a single event and a subset of visible parameter columns.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct EventStaff {
    pub id: i64,
    pub email: String,
    pub hashed_password: String,
    pub event_name: String,
    pub specified_columns: String,
}

impl EventStaff {
    /// Parameter keys listed in `specified_columns`.
    pub fn columns(&self) -> Vec<String> {
        split_columns(&self.specified_columns)
    }

    pub fn view(&self) -> StaffView {
        StaffView {
            email: self.email.clone(),
            event_name: self.event_name.clone(),
            specified_columns: self.specified_columns.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewEventStaff {
    pub email: String,
    pub hashed_password: String,
    pub event_name: String,
    pub specified_columns: String,
}

/// Staff shape returned to clients. Never carries the hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffView {
    pub email: String,
    pub event_name: String,
    pub specified_columns: String,
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn split_columns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_split_on_commas_and_skip_blanks() {
        let staff = EventStaff {
            id: 1,
            email: "desk@example.com".to_string(),
            hashed_password: "x".to_string(),
            event_name: "CONF".to_string(),
            specified_columns: "name, email,,company ".to_string(),
        };
        assert_eq!(staff.columns(), vec!["name", "email", "company"]);
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Desk@Example.COM "), "desk@example.com");
    }
}
