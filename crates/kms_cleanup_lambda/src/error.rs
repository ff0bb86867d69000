use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CleanupError {
    #[error("listing {resource} failed: {message}")]
    Listing {
        resource: &'static str,
        message: String,
    },

    #[error("describing key {key_id} failed: {message}")]
    Lookup { key_id: String, message: String },

    #[error("scheduling deletion of key {key_id} failed: {message}")]
    Scheduling { key_id: String, message: String },

    #[error("publishing cleanup notification failed: {message}")]
    Notification { message: String },
}

impl CleanupError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Listing { .. } => "listing",
            Self::Lookup { .. } => "lookup",
            Self::Scheduling { .. } => "scheduling",
            Self::Notification { .. } => "notification",
        }
    }

    pub fn key_id(&self) -> Option<&str> {
        match self {
            Self::Lookup { key_id, .. } | Self::Scheduling { key_id, .. } => Some(key_id),
            Self::Listing { .. } | Self::Notification { .. } => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a whole number of days, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name}: {message}")]
    OutOfRange { name: &'static str, message: String },

    #[error("{name} must be a boolean (true/false/1/0/yes/no), got '{value}'")]
    InvalidFlag { name: &'static str, value: String },
}
