use std::time::Instant;

use chrono::Utc;
use kms_cleanup_core::classify::should_schedule_deletion;
use kms_cleanup_core::contract::CleanupSummary;
use kms_cleanup_core::report::compose_notification;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::adapters::key_service::KeyService;
use crate::adapters::notifier::Notifier;
use crate::config::CleanupConfig;
use crate::error::CleanupError;
use crate::handlers::inventory::{build_alias_index, walk_inventory};

/// Clients a run talks to. A missing notifier means no reporter is configured.
#[derive(Clone, Copy)]
pub struct CleanupDependencies<'a> {
    pub key_service: &'a dyn KeyService,
    pub notifier: Option<&'a dyn Notifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed {
        summary: CleanupSummary,
        report: ReportStatus,
    },
    Failed {
        error: CleanupError,
        /// Keys whose deletion was already scheduled when the run failed.
        /// Always empty for a dry run.
        scheduled_before_failure: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Sent,
    SkippedEmptyBatch,
    SkippedNoReporter,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupRunResponse {
    pub status: String,
    pub run_id: String,
    pub started_at: String,
    pub dry_run: bool,
    /// Keys whose deletion was actually scheduled. Always empty in a dry run.
    pub scheduled_key_ids: Vec<String>,
    /// Keys a dry run found eligible without scheduling them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eligible_key_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Schedules deletion of one key with the configured pending window.
pub fn schedule_deletion(
    key_service: &dyn KeyService,
    key_id: &str,
    pending_window_days: u8,
) -> Result<(), CleanupError> {
    key_service
        .schedule_key_deletion(key_id, pending_window_days)
        .map_err(|message| CleanupError::Scheduling {
            key_id: key_id.to_string(),
            message,
        })?;
    info!(
        component = "cleanup",
        event = "deletion_scheduled",
        key_id,
        pending_window_days
    );
    Ok(())
}

/// Sends one notification for a run that acted on at least one key.
pub fn report_cleanup(
    notifier: Option<&dyn Notifier>,
    summary: &CleanupSummary,
) -> Result<ReportStatus, CleanupError> {
    let Some(notification) = compose_notification(summary) else {
        info!(
            component = "reporter",
            event = "notification_skipped",
            reason = "empty_batch"
        );
        return Ok(ReportStatus::SkippedEmptyBatch);
    };

    let Some(notifier) = notifier else {
        warn!(
            component = "reporter",
            event = "notification_skipped",
            reason = "no_reporter_configured",
            keys = summary.scheduled_key_ids.len()
        );
        return Ok(ReportStatus::SkippedNoReporter);
    };

    notifier
        .publish(&notification)
        .map_err(|message| CleanupError::Notification { message })?;
    info!(
        component = "reporter",
        event = "notification_sent",
        keys = summary.scheduled_key_ids.len()
    );
    Ok(ReportStatus::Sent)
}

/// Runs one cleanup pass: index aliases, walk the key inventory, schedule
/// deletion for every unaliased key not already pending, then report.
///
/// Errors end the pass early and are returned as [`RunOutcome::Failed`]
/// rather than propagated.
pub fn run_cleanup(
    deps: CleanupDependencies<'_>,
    config: &CleanupConfig,
    run_id: &str,
) -> RunOutcome {
    let started_at = Instant::now();
    let mut batch: Vec<String> = Vec::new();

    let result = execute_run(deps, config, run_id, &mut batch);
    let duration_ms = started_at.elapsed().as_millis() as u64;

    match result {
        Ok((summary, report)) => {
            info!(
                component = "orchestrator",
                event = "run_completed",
                run_id,
                keys_examined = summary.keys_examined,
                keys_retained = summary.keys_retained,
                keys_scheduled = summary.scheduled_key_ids.len(),
                dry_run = summary.dry_run,
                report = ?report,
                duration_ms
            );
            RunOutcome::Completed { summary, report }
        }
        Err(failure) => {
            // A dry-run batch only holds eligible keys; nothing was scheduled.
            let (scheduled_before_failure, eligible_before_failure) = if config.dry_run {
                (Vec::new(), batch)
            } else {
                (batch, Vec::new())
            };
            error!(
                component = "orchestrator",
                event = "run_failed",
                run_id,
                error_kind = failure.kind(),
                key_id = failure.key_id(),
                error = %failure,
                dry_run = config.dry_run,
                scheduled_before_failure = ?scheduled_before_failure,
                eligible_before_failure = ?eligible_before_failure,
                duration_ms
            );
            RunOutcome::Failed {
                error: failure,
                scheduled_before_failure,
            }
        }
    }
}

fn execute_run(
    deps: CleanupDependencies<'_>,
    config: &CleanupConfig,
    run_id: &str,
    batch: &mut Vec<String>,
) -> Result<(CleanupSummary, ReportStatus), CleanupError> {
    info!(
        component = "orchestrator",
        event = "run_started",
        run_id,
        pending_window_days = config.pending_window_days,
        dry_run = config.dry_run,
        reporter_configured = deps.notifier.is_some()
    );

    let alias_index = build_alias_index(deps.key_service)?;
    info!(
        component = "orchestrator",
        event = "alias_index_built",
        run_id,
        aliased_keys = alias_index.len()
    );

    let keys_examined = walk_inventory(deps.key_service, &mut |key_id, state| {
        let eligible = should_schedule_deletion(state, key_id, &alias_index);
        debug!(
            component = "orchestrator",
            event = "key_classified",
            key_id,
            state = %state,
            eligible
        );
        if !eligible {
            return Ok(());
        }

        if config.dry_run {
            info!(
                component = "orchestrator",
                event = "deletion_skipped_dry_run",
                key_id
            );
        } else {
            schedule_deletion(deps.key_service, key_id, config.pending_window_days)?;
        }
        batch.push(key_id.to_string());
        Ok(())
    })?;

    let summary = CleanupSummary {
        run_id: run_id.to_string(),
        keys_examined,
        keys_retained: keys_examined - batch.len(),
        scheduled_key_ids: batch.clone(),
        pending_window_days: config.pending_window_days,
        dry_run: config.dry_run,
    };
    let report = report_cleanup(deps.notifier, &summary)?;
    Ok((summary, report))
}

/// Entry point for the periodic trigger. The event payload carries nothing
/// the run needs; the response always reports a handled invocation, with run
/// failures visible only in the body and the logs.
pub fn handle_scheduled_event(
    event: &Value,
    run_id: &str,
    deps: CleanupDependencies<'_>,
    config: &CleanupConfig,
) -> CleanupRunResponse {
    let started_at = Utc::now().to_rfc3339();
    if let Some(trigger) = event.get("detail-type").and_then(Value::as_str) {
        debug!(component = "handler", event = "trigger_received", trigger, run_id);
    }

    match run_cleanup(deps, config, run_id) {
        RunOutcome::Completed { summary, .. } => {
            let (scheduled_key_ids, eligible_key_ids) = if summary.dry_run {
                (Vec::new(), summary.scheduled_key_ids)
            } else {
                (summary.scheduled_key_ids, Vec::new())
            };
            CleanupRunResponse {
                status: "completed".to_string(),
                run_id: summary.run_id,
                started_at,
                dry_run: summary.dry_run,
                scheduled_key_ids,
                eligible_key_ids,
                error: None,
            }
        }
        RunOutcome::Failed {
            error,
            scheduled_before_failure,
        } => CleanupRunResponse {
            status: "failed".to_string(),
            run_id: run_id.to_string(),
            started_at,
            dry_run: config.dry_run,
            scheduled_key_ids: scheduled_before_failure,
            eligible_key_ids: Vec::new(),
            error: Some(error.to_string()),
        },
    }
}
