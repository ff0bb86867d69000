use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PENDING_WINDOW_DAYS: u8 = 7;
pub const MIN_PENDING_WINDOW_DAYS: u8 = 7;
pub const MAX_PENDING_WINDOW_DAYS: u8 = 30;

/// Lifecycle state reported by the key-management service for a single key.
///
/// Only [`KeyState::PendingDeletion`] influences classification. States the
/// service introduces later are preserved verbatim in [`KeyState::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KeyState {
    Creating,
    Enabled,
    Disabled,
    PendingDeletion,
    PendingImport,
    PendingReplicaDeletion,
    Unavailable,
    Updating,
    Unknown(String),
}

impl KeyState {
    pub fn parse(value: &str) -> Self {
        match value {
            "Creating" => Self::Creating,
            "Enabled" => Self::Enabled,
            "Disabled" => Self::Disabled,
            "PendingDeletion" => Self::PendingDeletion,
            "PendingImport" => Self::PendingImport,
            "PendingReplicaDeletion" => Self::PendingReplicaDeletion,
            "Unavailable" => Self::Unavailable,
            "Updating" => Self::Updating,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "Creating",
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
            Self::PendingDeletion => "PendingDeletion",
            Self::PendingImport => "PendingImport",
            Self::PendingReplicaDeletion => "PendingReplicaDeletion",
            Self::Unavailable => "Unavailable",
            Self::Updating => "Updating",
            Self::Unknown(value) => value,
        }
    }

    pub fn is_pending_deletion(&self) -> bool {
        matches!(self, Self::PendingDeletion)
    }
}

impl From<String> for KeyState {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<KeyState> for String {
    fn from(value: KeyState) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasEntry {
    pub alias_name: String,
    pub target_key_id: Option<String>,
}

/// One page of an alias listing. `next_marker == None` marks the last page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasPage {
    pub aliases: Vec<AliasEntry>,
    pub next_marker: Option<String>,
}

/// One page of a key listing. `next_marker == None` marks the last page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyPage {
    pub key_ids: Vec<String>,
    pub next_marker: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyDescription {
    pub key_id: String,
    pub state: KeyState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupSummary {
    pub run_id: String,
    pub keys_examined: usize,
    pub keys_retained: usize,
    pub scheduled_key_ids: Vec<String>,
    pub pending_window_days: u8,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Checks a pending window against the range the key service accepts.
pub fn validate_pending_window_days(days: u8) -> Result<u8, ValidationError> {
    if !(MIN_PENDING_WINDOW_DAYS..=MAX_PENDING_WINDOW_DAYS).contains(&days) {
        return Err(ValidationError::new(format!(
            "pending window must be between {MIN_PENDING_WINDOW_DAYS} and {MAX_PENDING_WINDOW_DAYS} days, got {days}"
        )));
    }
    Ok(days)
}
