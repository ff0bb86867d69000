use crate::alias_index::AliasIndex;
use crate::contract::KeyState;

/// Decides whether a key should move to pending deletion.
///
/// True only for keys that are not already pending deletion and have no alias
/// in the index captured at the start of the run.
pub fn should_schedule_deletion(state: &KeyState, key_id: &str, alias_index: &AliasIndex) -> bool {
    !state.is_pending_deletion() && !alias_index.contains(key_id)
}
