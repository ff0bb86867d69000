use std::sync::Mutex;

use kms_cleanup_core::report::CleanupNotification;
use kms_cleanup_lambda::adapters::notifier::Notifier;

/// Captures every published notification; optionally fails each publish.
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<CleanupNotification>>,
    fail_with: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn notifications(&self) -> Vec<CleanupNotification> {
        self.notifications.lock().expect("poisoned mutex").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn publish(&self, notification: &CleanupNotification) -> Result<(), String> {
        if let Some(message) = &self.fail_with {
            return Err(message.clone());
        }
        self.notifications
            .lock()
            .expect("poisoned mutex")
            .push(notification.clone());
        Ok(())
    }
}
