// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry for discovered plugin records.
//!
//! The `PluginRegistry` indexes records by id and by capability type. Both
//! indexes live behind one lock so a record is reachable through the type
//! index exactly when it is present in the id index.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tether_core::{CapabilityType, PluginId, PluginStatus};
use tokio::sync::RwLock;

use crate::record::PluginRecord;

#[derive(Default)]
struct Indexes {
    by_id: HashMap<PluginId, Arc<PluginRecord>>,
    by_type: HashMap<CapabilityType, HashSet<PluginId>>,
}

impl Indexes {
    fn unlink_type(&mut self, capability: &CapabilityType, id: &PluginId) {
        if let Some(members) = self.by_type.get_mut(capability) {
            members.remove(id);
            if members.is_empty() {
                self.by_type.remove(capability);
            }
        }
    }

    fn collect<'a>(&self, ids: impl Iterator<Item = &'a PluginId>) -> Vec<Arc<PluginRecord>> {
        let mut records: Vec<Arc<PluginRecord>> =
            ids.filter_map(|id| self.by_id.get(id).cloned()).collect();
        sort_records(&mut records);
        records
    }
}

/// Orders records by name, then by id for records sharing a name.
fn sort_records(records: &mut [Arc<PluginRecord>]) {
    records.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())));
}

/// Registry of discovered plugins.
pub struct PluginRegistry {
    index: RwLock<Indexes>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            index: RwLock::new(Indexes::default()),
        }
    }

    /// Insert a record into both indexes.
    ///
    /// Re-adding an id replaces the previous record and moves its type
    /// membership if the capability type changed.
    pub async fn add(&self, record: Arc<PluginRecord>) {
        let mut index = self.index.write().await;
        let id = record.id();
        let capability = record.capability_type().clone();
        if let Some(previous) = index.by_id.insert(id, record)
            && previous.capability_type() != &capability
        {
            index.unlink_type(previous.capability_type(), &id);
        }
        index.by_type.entry(capability).or_default().insert(id);
    }

    /// Remove a record from both indexes. Returns false if it was absent.
    pub async fn remove(&self, record: &PluginRecord) -> bool {
        let mut index = self.index.write().await;
        let id = record.id();
        match index.by_id.remove(&id) {
            Some(stored) => {
                index.unlink_type(stored.capability_type(), &id);
                true
            }
            None => false,
        }
    }

    /// Get a record by id.
    pub async fn get_by_id(&self, id: &PluginId) -> Option<Arc<PluginRecord>> {
        self.index.read().await.by_id.get(id).cloned()
    }

    /// Snapshot of the records providing `capability`, sorted by name.
    ///
    /// `None` when no record provides the type. The snapshot does not follow
    /// later registry changes.
    pub async fn get_by_type(&self, capability: &CapabilityType) -> Option<Vec<Arc<PluginRecord>>> {
        let index = self.index.read().await;
        let members = index.by_type.get(capability)?;
        let records = index.collect(members.iter());
        (!records.is_empty()).then_some(records)
    }

    /// All records, sorted by name.
    pub async fn all(&self) -> Vec<Arc<PluginRecord>> {
        let index = self.index.read().await;
        index.collect(index.by_id.keys())
    }

    /// Records whose `match` patterns cover `url`, sorted by name.
    pub async fn by_url(&self, url: &str) -> Vec<Arc<PluginRecord>> {
        self.all()
            .await
            .into_iter()
            .filter(|record| record.matches_url(url))
            .collect()
    }

    /// Records that are currently loaded, sorted by name.
    pub async fn loaded(&self) -> Vec<Arc<PluginRecord>> {
        self.all()
            .await
            .into_iter()
            .filter(|record| record.status() == PluginStatus::Loaded)
            .collect()
    }

    /// Capability types with at least one provider, sorted.
    pub async fn capability_types(&self) -> Vec<CapabilityType> {
        let mut types: Vec<_> = self.index.read().await.by_type.keys().cloned().collect();
        types.sort();
        types
    }

    /// Returns the number of registered records.
    pub async fn len(&self) -> usize {
        self.index.read().await.by_id.len()
    }

    /// Returns true if no records are registered.
    pub async fn is_empty(&self) -> bool {
        self.index.read().await.by_id.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry").finish_non_exhaustive()
    }
}
