use kms_cleanup_core::contract::{validate_pending_window_days, DEFAULT_PENDING_WINDOW_DAYS};

use crate::error::ConfigError;

pub const NOTIFICATION_TOPIC_VAR: &str = "CLEANUP_NOTIFICATION_TOPIC_ARN";
pub const PENDING_WINDOW_DAYS_VAR: &str = "CLEANUP_PENDING_WINDOW_DAYS";
pub const REGION_VAR: &str = "CLEANUP_AWS_REGION";
pub const DRY_RUN_VAR: &str = "CLEANUP_DRY_RUN";
pub const LOG_FILTER_VAR: &str = "CLEANUP_LOG";
pub const DEFAULT_LOG_FILTER: &str = "kms_cleanup=info,cleanup_runtime=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupConfig {
    pub pending_window_days: u8,
    /// `None` means no reporter is configured and notification is skipped.
    pub notification_topic_arn: Option<String>,
    pub region: Option<String>,
    pub dry_run: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            pending_window_days: DEFAULT_PENDING_WINDOW_DAYS,
            notification_topic_arn: None,
            region: None,
            dry_run: false,
        }
    }
}

impl CleanupConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let pending_window_days = match non_blank(PENDING_WINDOW_DAYS_VAR) {
            Some(value) => parse_pending_window(&value)?,
            None => DEFAULT_PENDING_WINDOW_DAYS,
        };

        let dry_run = match non_blank(DRY_RUN_VAR) {
            Some(value) => parse_flag(DRY_RUN_VAR, &value)?,
            None => false,
        };

        Ok(Self {
            pending_window_days,
            notification_topic_arn: non_blank(NOTIFICATION_TOPIC_VAR),
            region: non_blank(REGION_VAR),
            dry_run,
        })
    }
}

fn parse_pending_window(value: &str) -> Result<u8, ConfigError> {
    let days = value
        .parse::<u8>()
        .map_err(|_| ConfigError::InvalidNumber {
            name: PENDING_WINDOW_DAYS_VAR,
            value: value.to_string(),
        })?;
    validate_pending_window_days(days).map_err(|error| ConfigError::OutOfRange {
        name: PENDING_WINDOW_DAYS_VAR,
        message: error.message().to_string(),
    })
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}
