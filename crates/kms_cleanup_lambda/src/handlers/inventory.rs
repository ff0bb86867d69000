use std::collections::HashSet;

use kms_cleanup_core::alias_index::AliasIndex;
use kms_cleanup_core::contract::KeyState;
use tracing::debug;

use crate::adapters::key_service::KeyService;
use crate::error::CleanupError;

/// Reads every alias page and indexes the keys that have an alias bound.
pub fn build_alias_index(key_service: &dyn KeyService) -> Result<AliasIndex, CleanupError> {
    let mut index = AliasIndex::new();
    let mut marker: Option<String> = None;
    let mut seen_markers = HashSet::new();
    let mut pages = 0usize;

    loop {
        let page = key_service
            .list_aliases_page(marker.as_deref())
            .map_err(|message| CleanupError::Listing {
                resource: "aliases",
                message,
            })?;
        pages += 1;
        index.extend(&page.aliases);

        match next_marker("aliases", &mut seen_markers, page.next_marker)? {
            Some(next) => marker = Some(next),
            None => break,
        }
    }

    debug!(
        component = "inventory",
        event = "alias_pages_read",
        pages,
        aliased_keys = index.len()
    );
    Ok(index)
}

/// Lists every key page and describes each key in listing order, handing the
/// key identifier and the state observed at lookup time to `visit`.
///
/// Returns the number of keys visited. The first lookup or visitor error stops
/// the walk.
pub fn walk_inventory(
    key_service: &dyn KeyService,
    visit: &mut dyn FnMut(&str, &KeyState) -> Result<(), CleanupError>,
) -> Result<usize, CleanupError> {
    let mut marker: Option<String> = None;
    let mut seen_markers = HashSet::new();
    let mut visited = 0usize;

    loop {
        let page = key_service
            .list_keys_page(marker.as_deref())
            .map_err(|message| CleanupError::Listing {
                resource: "keys",
                message,
            })?;

        for key_id in &page.key_ids {
            let description =
                key_service
                    .describe_key(key_id)
                    .map_err(|message| CleanupError::Lookup {
                        key_id: key_id.clone(),
                        message,
                    })?;
            visit(key_id, &description.state)?;
            visited += 1;
        }

        match next_marker("keys", &mut seen_markers, page.next_marker)? {
            Some(next) => marker = Some(next),
            None => break,
        }
    }

    Ok(visited)
}

/// Rejects a marker the listing already handed out, which would otherwise
/// page forever.
fn next_marker(
    resource: &'static str,
    seen_markers: &mut HashSet<String>,
    next: Option<String>,
) -> Result<Option<String>, CleanupError> {
    match next {
        Some(next) if !seen_markers.insert(next.clone()) => Err(CleanupError::Listing {
            resource,
            message: format!("pagination did not advance past marker '{next}'"),
        }),
        other => Ok(other),
    }
}
