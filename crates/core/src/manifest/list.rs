//! Ordered, URL-keyed precache list.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use url::Url;

use super::entry::{ManifestEntry, parse_manifest};
use crate::Error;

/// Insertion-ordered set of manifest entries keyed by URL.
///
/// Each URL maps to exactly one revision. `add_entries` is atomic: a call
/// that fails validation or hits a revision conflict leaves the list as it
/// was before the call.
#[derive(Debug, Clone)]
pub struct PrecacheList {
    base: Url,
    entries: Vec<ManifestEntry>,
    index: HashMap<String, usize>,
}

impl PrecacheList {
    /// Create an empty list that resolves relative URLs against `base`.
    pub fn new(base: Url) -> Self {
        Self { base, entries: Vec::new(), index: HashMap::new() }
    }

    /// Base URL used to resolve relative entries.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Merge a raw manifest (array or `{revisionedFiles: [...]}`) into the list.
    ///
    /// Returns how many entries were newly inserted. Re-adding a URL with the
    /// same revision is a no-op; a different revision fails with
    /// [`Error::DuplicateEntryDifferentRevisions`].
    pub fn add_entries(&mut self, manifest: &Value) -> Result<usize, Error> {
        let parsed = parse_manifest(manifest, &self.base)?;

        let mut staged: Vec<ManifestEntry> = Vec::new();
        let mut staged_index: HashMap<String, usize> = HashMap::new();

        for entry in parsed {
            let previous = self
                .get(&entry.url)
                .or_else(|| staged_index.get(&entry.url).map(|&i| &staged[i]))
                .map(ManifestEntry::entry_ref);

            match previous {
                Some(first) if first.revision == entry.revision => {}
                Some(first) => {
                    return Err(Error::DuplicateEntryDifferentRevisions { first, second: entry.entry_ref() });
                }
                None => {
                    staged_index.insert(entry.url.clone(), staged.len());
                    staged.push(entry);
                }
            }
        }

        let added = staged.len();
        for entry in staged {
            self.index.insert(entry.url.clone(), self.entries.len());
            self.entries.push(entry);
        }

        tracing::debug!(added, total = self.entries.len(), "merged manifest entries");
        Ok(added)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Set of URLs currently in the list.
    pub fn urls(&self) -> HashSet<&str> {
        self.entries.iter().map(|e| e.url.as_str()).collect()
    }

    pub fn get(&self, url: &str) -> Option<&ManifestEntry> {
        self.index.get(url).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::EntryRef;
    use serde_json::json;

    fn new_list() -> PrecacheList {
        PrecacheList::new(Url::parse("https://app.example.com/").unwrap())
    }

    #[test]
    fn test_add_same_entry_twice_is_noop() {
        let mut list = new_list();
        let manifest = json!({"revisionedFiles": [{"url": "/a.js", "revision": "1"}]});

        assert_eq!(list.add_entries(&manifest).unwrap(), 1);
        assert_eq!(list.add_entries(&manifest).unwrap(), 0);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_relative_and_absolute_forms_merge() {
        let mut list = new_list();
        list.add_entries(&json!([{"url": "/a.js", "revision": "1"}])).unwrap();
        list.add_entries(&json!([{"url": "https://app.example.com/a.js", "revision": "1"}])).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_conflicting_revisions_across_calls() {
        let mut list = new_list();
        list.add_entries(&json!({"revisionedFiles": [{"url": "/__echo/date/hello.txt", "revision": "1234"}]}))
            .unwrap();

        let err = list
            .add_entries(&json!({"revisionedFiles": [{"url": "/__echo/date/hello.txt", "revision": "5678"}]}))
            .unwrap_err();

        let url = "https://app.example.com/__echo/date/hello.txt".to_string();
        match err {
            Error::DuplicateEntryDifferentRevisions { first, second } => {
                assert_eq!(first, EntryRef { url: url.clone(), revision: "1234".into() });
                assert_eq!(second, EntryRef { url, revision: "5678".into() });
            }
            other => panic!("expected DuplicateEntryDifferentRevisions, got {other:?}"),
        }
        assert_eq!(list.get("https://app.example.com/__echo/date/hello.txt").unwrap().revision, "1234");
    }

    #[test]
    fn test_conflict_within_one_call() {
        let mut list = new_list();
        let result = list.add_entries(&json!([
            {"url": "/a.js", "revision": "1"},
            {"url": "/a.js", "revision": "2"},
        ]));
        assert!(matches!(result, Err(Error::DuplicateEntryDifferentRevisions { .. })));
    }

    #[test]
    fn test_failed_call_leaves_list_unchanged() {
        let mut list = new_list();
        list.add_entries(&json!(["/keep.js"])).unwrap();

        let result = list.add_entries(&json!([
            {"url": "/new.js", "revision": "1"},
            {"url": "/bad.js", "revision": ""},
        ]));
        assert!(matches!(result, Err(Error::InvalidFieldValue { .. })));

        let result = list.add_entries(&json!([
            {"url": "/other.js", "revision": "1"},
            {"url": "/keep.js", "revision": "changed"},
        ]));
        assert!(matches!(result, Err(Error::DuplicateEntryDifferentRevisions { .. })));

        assert_eq!(list.len(), 1);
        assert!(list.get("https://app.example.com/new.js").is_none());
        assert!(list.get("https://app.example.com/other.js").is_none());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut list = new_list();
        list.add_entries(&json!(["/c.js", "/a.js"])).unwrap();
        list.add_entries(&json!(["/b.js", "/a.js"])).unwrap();

        let urls: Vec<&str> = list.entries().iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            ["https://app.example.com/c.js", "https://app.example.com/a.js", "https://app.example.com/b.js"]
        );
        assert_eq!(list.urls().len(), 3);
    }

    #[test]
    fn test_invalid_manifest_types() {
        let mut list = new_list();
        assert!(matches!(list.add_entries(&Value::Null), Err(Error::InvalidManifestType { .. })));
        assert!(matches!(
            list.add_entries(&json!({"revisionedFiles": null})),
            Err(Error::InvalidManifestType { .. })
        ));
        assert!(matches!(list.add_entries(&json!({"revisionedFiles": [null]})), Err(Error::InvalidEntry { .. })));
        assert!(list.is_empty());
    }
}
