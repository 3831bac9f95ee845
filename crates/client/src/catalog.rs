//! In-memory service catalog.
//!
//! Populated by one fetch after construction and refreshed on demand.
//! Every refresh replaces the whole list in a single reference swap:
//! concurrent readers observe either the old or the new list
//! atomically, never a torn one. Entries keep backend order and are
//! never merged, deduplicated, or edited in place.

use std::sync::{Arc, RwLock};

use atelier_core::types::Service;

/// Shared, swap-on-refresh list of services.
#[derive(Default)]
pub struct ServiceCatalog {
    services: RwLock<Arc<Vec<Service>>>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list with a freshly fetched one.
    pub fn replace(&self, services: Vec<Service>) {
        *self.services.write().unwrap() = Arc::new(services);
    }

    /// Snapshot of the current list. Cheap: clones the `Arc`, not the
    /// entries.
    pub fn snapshot(&self) -> Arc<Vec<Service>> {
        Arc::clone(&self.services.read().unwrap())
    }

    /// Look up a service by exact name match. No case folding, no
    /// fuzzy matching.
    pub fn find_by_name(&self, name: &str) -> Option<Service> {
        self.snapshot().iter().find(|s| s.name == name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
