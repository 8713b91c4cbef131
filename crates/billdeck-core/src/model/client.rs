// ── Client and reference-data domain types ──

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An advertiser account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Primary account executive handling the client.
    pub account_executive: Option<String>,
    pub status: Option<String>,
}

impl Client {
    /// Case-insensitive match on name, company, or contact.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [
            Some(self.name.as_str()),
            self.company.as_deref(),
            self.contact_person.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Payload for creating or editing a client.
#[derive(Debug, Clone, Default)]
pub struct ClientDraft {
    pub name: String,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub account_executive: Option<String>,
    pub status: Option<String>,
}

impl ClientDraft {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("client name is required"));
        }
        if let Some(ref email) = self.email {
            if !email.contains('@') {
                return Err(CoreError::validation(format!(
                    "'{email}' is not an email address"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
}

/// Advertising medium (static billboard, LED, transit, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medium {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
}
