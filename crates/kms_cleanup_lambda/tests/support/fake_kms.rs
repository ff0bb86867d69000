use std::collections::HashSet;
use std::sync::Mutex;

use kms_cleanup_core::contract::{AliasEntry, AliasPage, KeyDescription, KeyPage, KeyState};
use kms_cleanup_lambda::adapters::key_service::KeyService;

/// External calls observed by the fake, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KmsCall {
    ListAliases(Option<String>),
    ListKeys(Option<String>),
    DescribeKey(String),
    ScheduleKeyDeletion { key_id: String, days: u8 },
}

/// In-memory key-management service with offset-based paging.
///
/// Scheduling deletion moves the key to `PendingDeletion`, so consecutive runs
/// observe each other's effects the way the real service does.
pub struct FakeKms {
    keys: Mutex<Vec<(String, KeyState)>>,
    aliases: Vec<AliasEntry>,
    page_size: usize,
    calls: Mutex<Vec<KmsCall>>,
    failing_lookups: HashSet<String>,
    failing_schedules: HashSet<String>,
    fail_alias_listing: bool,
}

impl FakeKms {
    pub fn new(keys: &[(&str, KeyState)], aliases: &[(&str, Option<&str>)]) -> Self {
        Self {
            keys: Mutex::new(
                keys.iter()
                    .map(|(key_id, state)| (key_id.to_string(), state.clone()))
                    .collect(),
            ),
            aliases: aliases
                .iter()
                .map(|(name, target)| AliasEntry {
                    alias_name: name.to_string(),
                    target_key_id: target.map(str::to_string),
                })
                .collect(),
            page_size: 100,
            calls: Mutex::new(Vec::new()),
            failing_lookups: HashSet::new(),
            failing_schedules: HashSet::new(),
            fail_alias_listing: false,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_failing_lookup(mut self, key_id: &str) -> Self {
        self.failing_lookups.insert(key_id.to_string());
        self
    }

    pub fn with_failing_schedule(mut self, key_id: &str) -> Self {
        self.failing_schedules.insert(key_id.to_string());
        self
    }

    pub fn with_failing_alias_listing(mut self) -> Self {
        self.fail_alias_listing = true;
        self
    }

    pub fn calls(&self) -> Vec<KmsCall> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().expect("poisoned mutex").clear();
    }

    pub fn scheduled_key_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                KmsCall::ScheduleKeyDeletion { key_id, .. } => Some(key_id),
                _ => None,
            })
            .collect()
    }

    pub fn state_of(&self, key_id: &str) -> Option<KeyState> {
        self.keys
            .lock()
            .expect("poisoned mutex")
            .iter()
            .find(|(id, _)| id == key_id)
            .map(|(_, state)| state.clone())
    }

    fn record(&self, call: KmsCall) {
        self.calls.lock().expect("poisoned mutex").push(call);
    }

    fn page_bounds(&self, marker: Option<&str>, total: usize) -> Result<(usize, usize), String> {
        let start = match marker {
            Some(value) => value
                .strip_prefix("offset-")
                .and_then(|offset| offset.parse::<usize>().ok())
                .ok_or_else(|| format!("InvalidMarkerException: {value}"))?,
            None => 0,
        };
        Ok((start, (start + self.page_size).min(total)))
    }

    fn next_marker(end: usize, total: usize) -> Option<String> {
        (end < total).then(|| format!("offset-{end}"))
    }
}

impl KeyService for FakeKms {
    fn list_aliases_page(&self, marker: Option<&str>) -> Result<AliasPage, String> {
        self.record(KmsCall::ListAliases(marker.map(str::to_string)));
        if self.fail_alias_listing {
            return Err("ThrottlingException: rate exceeded".to_string());
        }

        let total = self.aliases.len();
        let (start, end) = self.page_bounds(marker, total)?;
        Ok(AliasPage {
            aliases: self.aliases[start..end].to_vec(),
            next_marker: Self::next_marker(end, total),
        })
    }

    fn list_keys_page(&self, marker: Option<&str>) -> Result<KeyPage, String> {
        self.record(KmsCall::ListKeys(marker.map(str::to_string)));

        let keys = self.keys.lock().expect("poisoned mutex");
        let total = keys.len();
        let (start, end) = self.page_bounds(marker, total)?;
        Ok(KeyPage {
            key_ids: keys[start..end].iter().map(|(id, _)| id.clone()).collect(),
            next_marker: Self::next_marker(end, total),
        })
    }

    fn describe_key(&self, key_id: &str) -> Result<KeyDescription, String> {
        self.record(KmsCall::DescribeKey(key_id.to_string()));
        if self.failing_lookups.contains(key_id) {
            return Err("KMSInternalException".to_string());
        }

        self.state_of(key_id)
            .map(|state| KeyDescription {
                key_id: key_id.to_string(),
                state,
            })
            .ok_or_else(|| format!("NotFoundException: {key_id}"))
    }

    fn schedule_key_deletion(&self, key_id: &str, pending_window_days: u8) -> Result<(), String> {
        self.record(KmsCall::ScheduleKeyDeletion {
            key_id: key_id.to_string(),
            days: pending_window_days,
        });
        if self.failing_schedules.contains(key_id) {
            return Err("AccessDeniedException".to_string());
        }

        let mut keys = self.keys.lock().expect("poisoned mutex");
        let entry = keys
            .iter_mut()
            .find(|(id, _)| id == key_id)
            .ok_or_else(|| format!("NotFoundException: {key_id}"))?;
        entry.1 = KeyState::PendingDeletion;
        Ok(())
    }
}
