//! Typed values kept in the profile store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// Identity used for commits and display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub github_username: String,
}

impl UserProfile {
    /// Name and email are required; the GitHub username is optional.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::MissingField("Name"));
        }
        if self.email.trim().is_empty() {
            return Err(ProfileError::MissingField("Email"));
        }
        Ok(())
    }
}

/// One completed update, shown in recent activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub date: DateTime<Utc>,
    pub repository: String,
    pub file_count: usize,
    pub free: bool,
    pub price: f64,
}

impl UsageRecord {
    /// Price as displayed: `Free` or a dollar amount.
    pub fn price_label(&self) -> String {
        if self.free {
            "Free".to_string()
        } else {
            format!("${:.2}", self.price)
        }
    }
}
