use serde::{Deserialize, Serialize};

use crate::contract::CleanupSummary;

pub const SUBJECT_PREFIX: &str = "[kms-cleanup]";
/// SNS rejects subjects of 100 characters or more.
pub const MAX_SUBJECT_CHARS: usize = 99;
/// Keys listed by name in one message. Key ARNs stay under 128 bytes, so the
/// body stays well below the 256 KB SNS message limit.
pub const MAX_LISTED_KEYS: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupNotification {
    pub subject: String,
    pub body: String,
}

/// Builds the single notification for a run, or `None` when the run acted on
/// no keys. Key identifiers keep the order in which they were collected; past
/// [`MAX_LISTED_KEYS`] the remainder is summarised as a count.
pub fn compose_notification(summary: &CleanupSummary) -> Option<CleanupNotification> {
    if summary.scheduled_key_ids.is_empty() {
        return None;
    }

    let count = summary.scheduled_key_ids.len();
    let subject = if summary.dry_run {
        format!("{SUBJECT_PREFIX} dry run: {count} key(s) eligible for deletion")
    } else {
        format!("{SUBJECT_PREFIX} {count} key(s) scheduled for deletion")
    };

    let mut body = if summary.dry_run {
        format!(
            "Dry run {}: the following KMS keys have no alias and would be scheduled for deletion \
             with a {}-day pending window.\n\n",
            summary.run_id, summary.pending_window_days
        )
    } else {
        format!(
            "Run {}: the following KMS keys had no alias and were scheduled for deletion. \
             They are removed permanently after {} days unless deletion is cancelled.\n\n",
            summary.run_id, summary.pending_window_days
        )
    };
    for key_id in summary.scheduled_key_ids.iter().take(MAX_LISTED_KEYS) {
        body.push_str(key_id);
        body.push('\n');
    }
    if count > MAX_LISTED_KEYS {
        body.push_str(&format!("... and {} more\n", count - MAX_LISTED_KEYS));
    }
    body.push_str(&format!(
        "\nKeys examined: {}, retained: {}.\n",
        summary.keys_examined, summary.keys_retained
    ));

    Some(CleanupNotification {
        subject: truncate_chars(subject, MAX_SUBJECT_CHARS),
        body,
    })
}

fn truncate_chars(value: String, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(scheduled: &[&str], dry_run: bool) -> CleanupSummary {
        CleanupSummary {
            run_id: "run-1".to_string(),
            keys_examined: 5,
            keys_retained: 5 - scheduled.len(),
            scheduled_key_ids: scheduled.iter().map(|id| id.to_string()).collect(),
            pending_window_days: 7,
            dry_run,
        }
    }

    #[test]
    fn empty_batch_produces_no_notification() {
        assert_eq!(compose_notification(&summary(&[], false)), None);
        assert_eq!(compose_notification(&summary(&[], true)), None);
    }

    #[test]
    fn notification_lists_keys_in_collection_order() {
        let notification =
            compose_notification(&summary(&["key-2", "key-1"], false)).expect("notification");

        assert_eq!(
            notification.subject,
            "[kms-cleanup] 2 key(s) scheduled for deletion"
        );
        let key_2 = notification.body.find("key-2\n").expect("key-2 listed");
        let key_1 = notification.body.find("key-1\n").expect("key-1 listed");
        assert!(key_2 < key_1);
        assert!(notification.body.contains("after 7 days"));
        assert!(notification.body.contains("Keys examined: 5, retained: 3."));
    }

    #[test]
    fn dry_run_notification_is_labelled() {
        let notification = compose_notification(&summary(&["key-1"], true)).expect("notification");

        assert!(notification.subject.contains("dry run"));
        assert!(notification.body.starts_with("Dry run run-1"));
    }

    #[test]
    fn long_batches_list_the_first_keys_and_count_the_rest() {
        let scheduled: Vec<String> = (0..MAX_LISTED_KEYS + 25)
            .map(|index| format!("key-{index:05}"))
            .collect();
        let notification = compose_notification(&CleanupSummary {
            run_id: "run-big".to_string(),
            keys_examined: scheduled.len(),
            keys_retained: 0,
            scheduled_key_ids: scheduled,
            pending_window_days: 7,
            dry_run: false,
        })
        .expect("notification");

        assert_eq!(
            notification.subject,
            format!("[kms-cleanup] {} key(s) scheduled for deletion", MAX_LISTED_KEYS + 25)
        );
        assert!(notification.body.contains("key-00000\n"));
        assert!(notification.body.contains(&format!("key-{:05}\n", MAX_LISTED_KEYS - 1)));
        assert!(!notification.body.contains(&format!("key-{:05}\n", MAX_LISTED_KEYS)));
        assert!(notification.body.contains("... and 25 more\n"));
        assert!(notification.body.len() < 256 * 1024);
    }

    #[test]
    fn batch_at_the_listing_cap_has_no_overflow_line() {
        let scheduled: Vec<String> = (0..MAX_LISTED_KEYS).map(|index| format!("k{index}")).collect();
        let notification = compose_notification(&CleanupSummary {
            run_id: "run-cap".to_string(),
            keys_examined: scheduled.len(),
            keys_retained: 0,
            scheduled_key_ids: scheduled,
            pending_window_days: 7,
            dry_run: true,
        })
        .expect("notification");

        assert!(!notification.body.contains("more\n"));
        assert!(notification.body.contains(&format!("k{}\n", MAX_LISTED_KEYS - 1)));
    }

    #[test]
    fn subject_stays_within_sns_limit() {
        assert_eq!(truncate_chars("a".repeat(150), MAX_SUBJECT_CHARS).len(), 99);
        assert_eq!(truncate_chars("short".to_string(), MAX_SUBJECT_CHARS), "short");
    }
}
