use kms_cleanup_core::report::CleanupNotification;

/// Publishes a run's notification to the operator channel the implementation
/// was constructed with.
pub trait Notifier {
    fn publish(&self, notification: &CleanupNotification) -> Result<(), String>;
}
