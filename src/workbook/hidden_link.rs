//! Hidden parent link
//!
//! The workbooks API has no field referencing the Application Insights
//! component a workbook belongs to. The portal instead expects a tag
//! `hidden-link:<component id>` with the value `Resource`. Writing and
//! reading that tag goes through this module only, so it can be replaced if
//! the API ever grows a real reference.

use super::error::WorkbookResult;
use super::identity::ResourceId;
use std::collections::BTreeMap;

/// Prefix shared by every hidden link tag key
pub const HIDDEN_LINK_PREFIX: &str = "hidden-link";

/// Value stored under a hidden link tag
pub const HIDDEN_LINK_VALUE: &str = "Resource";

/// Build the hidden link tag key pointing at `parent_identity`
///
/// Namespace, type and name come from the parent identity; subscription and
/// resource group come from the arguments.
pub fn encode(
    parent_identity: &str,
    resource_group: &str,
    subscription_id: &str,
) -> WorkbookResult<String> {
    let parent = ResourceId::parse(parent_identity)?;
    let (parent_type, parent_name) = parent.type_and_name();

    Ok(format!(
        "{}:/subscriptions/{}/resourceGroups/{}/providers/{}/{}/{}",
        HIDDEN_LINK_PREFIX, subscription_id, resource_group, parent.provider, parent_type, parent_name
    ))
}

/// Whether a tag key is a hidden link
pub fn is_hidden_link(key: &str) -> bool {
    key.starts_with(HIDDEN_LINK_PREFIX)
}

/// Recover the parent identity from a tag map
///
/// Only `hidden-link:<id>` keys count. Keys are visited in sorted order, so
/// with several links the lexicographically smallest one wins.
pub fn decode(tags: &BTreeMap<String, String>) -> Option<String> {
    let mut links = tags
        .keys()
        .filter_map(|k| k.strip_prefix(HIDDEN_LINK_PREFIX)?.strip_prefix(':'))
        .filter(|identity| !identity.is_empty());
    let first = links.next()?;

    let extra = links.count();
    if extra > 0 {
        tracing::warn!(
            "Found {} hidden-link tags, using {:?}",
            extra + 1,
            first
        );
    }

    Some(first.to_string())
}

/// Copy of `tags` carrying `link_key` as its only hidden link
///
/// Any hidden link already present, stale or user-declared, is dropped.
pub fn merge(tags: &BTreeMap<String, String>, link_key: String) -> BTreeMap<String, String> {
    let mut merged = strip(tags);
    merged.insert(link_key, HIDDEN_LINK_VALUE.to_string());
    merged
}

/// Copy of `tags` without any hidden link entries
pub fn strip(tags: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    tags.iter()
        .filter(|(k, _)| !is_hidden_link(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::WorkbookError;

    const PARENT: &str = "/subscriptions/S/resourceGroups/rg1/providers/ns/components/app1";

    #[test]
    fn test_encode() {
        let key = encode(PARENT, "rg1", "S").unwrap();
        assert_eq!(
            key,
            "hidden-link:/subscriptions/S/resourceGroups/rg1/providers/ns/components/app1"
        );
    }

    #[test]
    fn test_encode_uses_given_scope() {
        let key = encode(PARENT, "other-rg", "T").unwrap();
        assert_eq!(
            key,
            "hidden-link:/subscriptions/T/resourceGroups/other-rg/providers/ns/components/app1"
        );
    }

    #[test]
    fn test_encode_rejects_bad_parent() {
        let err = encode("not-an-id", "rg1", "S").unwrap_err();
        assert!(matches!(err, WorkbookError::MalformedIdentity { .. }));
    }

    #[test]
    fn test_decode_round_trip() {
        let key = encode(PARENT, "rg1", "S").unwrap();
        let mut tags = BTreeMap::new();
        tags.insert("Hello".to_string(), "World".to_string());
        let tags = merge(&tags, key);

        assert_eq!(decode(&tags).as_deref(), Some(PARENT));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_decode_absent() {
        let mut tags = BTreeMap::new();
        tags.insert("Hello".to_string(), "World".to_string());
        assert_eq!(decode(&tags), None);
        assert_eq!(decode(&BTreeMap::new()), None);
    }

    #[test]
    fn test_decode_picks_smallest_key() {
        let mut tags = BTreeMap::new();
        tags.insert(
            "hidden-link:/subscriptions/S/resourceGroups/rg/providers/ns/components/b".to_string(),
            HIDDEN_LINK_VALUE.to_string(),
        );
        tags.insert(
            "hidden-link:/subscriptions/S/resourceGroups/rg/providers/ns/components/a".to_string(),
            HIDDEN_LINK_VALUE.to_string(),
        );

        assert_eq!(
            decode(&tags).as_deref(),
            Some("/subscriptions/S/resourceGroups/rg/providers/ns/components/a")
        );
    }

    #[test]
    fn test_decode_skips_keys_without_identity() {
        let mut tags = BTreeMap::new();
        tags.insert("hidden-link".to_string(), "x".to_string());
        tags.insert("hidden-links".to_string(), "x".to_string());
        tags.insert("hidden-link:".to_string(), "x".to_string());
        tags.insert(format!("hidden-link:{}", PARENT), HIDDEN_LINK_VALUE.to_string());

        assert_eq!(decode(&tags).as_deref(), Some(PARENT));
    }

    #[test]
    fn test_merge_replaces_existing_links() {
        let mut tags = BTreeMap::new();
        tags.insert("Hello".to_string(), "World".to_string());
        tags.insert(
            "hidden-link:/subscriptions/S/resourceGroups/rg1/providers/ns/components/aaa".to_string(),
            HIDDEN_LINK_VALUE.to_string(),
        );
        tags.insert("hidden-link".to_string(), "x".to_string());

        let key = encode(PARENT, "rg1", "S").unwrap();
        let merged = merge(&tags, key.clone());

        let links: Vec<_> = merged.keys().filter(|k| is_hidden_link(k)).collect();
        assert_eq!(links, vec![&key]);
        assert_eq!(merged.len(), 2);
        assert_eq!(decode(&merged).as_deref(), Some(PARENT));
    }

    #[test]
    fn test_merge_overwrites_same_key() {
        let key = encode(PARENT, "rg1", "S").unwrap();
        let mut tags = BTreeMap::new();
        tags.insert(key.clone(), "stale".to_string());

        let merged = merge(&tags, key.clone());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[&key], HIDDEN_LINK_VALUE);
        // input untouched
        assert_eq!(tags[&key], "stale");
    }

    #[test]
    fn test_strip() {
        let key = encode(PARENT, "rg1", "S").unwrap();
        let mut tags = BTreeMap::new();
        tags.insert("Hello".to_string(), "World".to_string());
        let stripped = strip(&merge(&tags, key));
        assert_eq!(stripped, tags);
    }
}
