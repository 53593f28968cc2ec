//! Revision-keyed stanza cache.
//!
//! Stanzas only depend on a watcher's backends and options, so they are
//! recomputed when the watcher's revision moves and reused otherwise.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// A cached value and the revision it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    pub value: V,
    pub revision: u64,
}

/// Per-watcher memoization keyed by revision.
#[derive(Debug, Clone)]
pub struct RevisionCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V> Default for RevisionCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> RevisionCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value cached for `name` at `revision`, computing and
    /// storing it when the entry is missing or was computed from another
    /// revision.
    pub fn get_or_compute<F>(&mut self, name: &str, revision: u64, compute: F) -> &V
    where
        F: FnOnce() -> V,
    {
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().revision != revision {
                    tracing::debug!(
                        service = %name,
                        cached = entry.get().revision,
                        revision,
                        "Regenerating stanzas"
                    );
                    entry.insert(CacheEntry {
                        value: compute(),
                        revision,
                    });
                }
                &entry.into_mut().value
            }
            Entry::Vacant(entry) => {
                tracing::debug!(service = %name, revision, "Generating stanzas");
                &entry
                    .insert(CacheEntry {
                        value: compute(),
                        revision,
                    })
                    .value
            }
        }
    }

    /// Drop entries for every name not in `live`. Returns how many were removed.
    pub fn retain_names(&mut self, live: &HashSet<&str>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|name, _| live.contains(name.as_str()));
        before - self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
