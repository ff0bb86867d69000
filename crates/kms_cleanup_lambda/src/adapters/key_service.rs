use kms_cleanup_core::contract::{AliasPage, KeyDescription, KeyPage};

/// Operations the cleanup run needs from the key-management service.
///
/// Listing calls return one page at a time; callers pass back the previous
/// page's `next_marker` until it is `None`.
pub trait KeyService {
    fn list_aliases_page(&self, marker: Option<&str>) -> Result<AliasPage, String>;

    fn list_keys_page(&self, marker: Option<&str>) -> Result<KeyPage, String>;

    fn describe_key(&self, key_id: &str) -> Result<KeyDescription, String>;

    fn schedule_key_deletion(&self, key_id: &str, pending_window_days: u8) -> Result<(), String>;
}
