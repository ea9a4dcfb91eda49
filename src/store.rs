//! Normalized resource store.
//!
//! Key invariants:
//! - `(type, id)` is unique across the store.
//! - Buckets and resources are held behind `Arc`, so cloning a `Store` is
//!   cheap and every clone is an independent snapshot.
//! - Writes go through `Arc::make_mut`: only the touched bucket and the
//!   touched resource are copied, untouched branches stay shared.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::resource::{Resource, ResourceIdentifier};

/// All resources stored under one bucket name, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bucket {
    resources: BTreeMap<String, Arc<Resource>>,
}

impl Bucket {
    /// Get a resource by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.resources.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterate resources in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(id, r)| (id.as_str(), r.as_ref()))
    }
}

/// Type/id-indexed snapshot of every known resource.
///
/// # Examples
///
/// ```
/// use jsonapi_normalizer::{Resource, Store};
///
/// let mut store = Store::new();
/// store.insert("user", Resource::new("user", "1"));
///
/// let snapshot = store.clone();
/// store.remove("user", "1");
///
/// assert!(snapshot.contains("user", "1"));
/// assert!(!store.contains("user", "1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store {
    buckets: BTreeMap<String, Arc<Bucket>>,
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a resource by bucket name and id.
    #[must_use]
    pub fn get(&self, bucket: &str, id: &str) -> Option<&Resource> {
        self.buckets.get(bucket)?.get(id)
    }

    /// Look up the resource an identifier points at.
    ///
    /// Returns `None` for dangling references.
    #[must_use]
    pub fn resolve(&self, identifier: &ResourceIdentifier) -> Option<&Resource> {
        self.get(&identifier.resource_type, &identifier.id)
    }

    #[must_use]
    pub fn bucket(&self, bucket: &str) -> Option<&Bucket> {
        self.buckets.get(bucket).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn contains(&self, bucket: &str, id: &str) -> bool {
        self.buckets.get(bucket).is_some_and(|b| b.contains(id))
    }

    /// Total number of resources across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(|b| b.is_empty())
    }

    /// Bucket names in sorted order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Store a resource under `bucket`, replacing any previous version.
    pub fn insert(&mut self, bucket: impl Into<String>, resource: Resource) {
        let id = resource.id.clone();
        let bucket = self.buckets.entry(bucket.into()).or_default();
        Arc::make_mut(bucket).resources.insert(id, Arc::new(resource));
    }

    /// Remove a resource, returning it if it was present.
    ///
    /// Buckets that do not hold `id` are left untouched and stay shared.
    pub fn remove(&mut self, bucket: &str, id: &str) -> Option<Resource> {
        if !self.contains(bucket, id) {
            return None;
        }
        let bucket = self.buckets.get_mut(bucket)?;
        let removed = Arc::make_mut(bucket).resources.remove(id)?;
        Some(Arc::try_unwrap(removed).unwrap_or_else(|shared| shared.as_ref().clone()))
    }

    /// Replace the resource at `(bucket, id)` with the result of `f`.
    ///
    /// `f` receives the stored version, if any.
    pub(crate) fn upsert_with<F>(&mut self, bucket: &str, id: &str, f: F)
    where
        F: FnOnce(Option<&Resource>) -> Resource,
    {
        let bucket = Arc::make_mut(self.buckets.entry(bucket.to_string()).or_default());
        let merged = f(bucket.get(id));
        bucket.resources.insert(id.to_string(), Arc::new(merged));
    }

    /// Mutable access to an existing resource, copying it and its bucket if shared.
    pub(crate) fn get_mut(&mut self, bucket: &str, id: &str) -> Option<&mut Resource> {
        if !self.contains(bucket, id) {
            return None;
        }
        let bucket = Arc::make_mut(self.buckets.get_mut(bucket)?);
        bucket.resources.get_mut(id).map(Arc::make_mut)
    }

    /// Returns true if both snapshots share the same allocation for `bucket`.
    #[must_use]
    pub fn shares_bucket(&self, other: &Self, bucket: &str) -> bool {
        match (self.buckets.get(bucket), other.buckets.get(bucket)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Returns true if both snapshots share the same allocation for `(bucket, id)`.
    #[must_use]
    pub fn shares_resource(&self, other: &Self, bucket: &str, id: &str) -> bool {
        let lookup = |store: &Self| store.buckets.get(bucket)?.resources.get(id).cloned();
        match (lookup(self), lookup(other)) {
            (Some(a), Some(b)) => Arc::ptr_eq(&a, &b),
            _ => false,
        }
    }
}
