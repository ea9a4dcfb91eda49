//! Merge and preprocessing strategies.
//!
//! A resource type's configuration carries two hooks: a [`Preprocess`] hook
//! applied to every incoming resource, and a [`MergeStrategy`] that combines
//! the incoming resource with the stored version. Plain closures implement
//! both traits.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::resource::{Relationship, Resource};

/// Combines an incoming resource with the version already stored.
///
/// `existing` is `None` the first time a `(type, id)` is written.
pub trait MergeStrategy: Send + Sync {
    /// Produce the resource to store.
    fn merge(&self, existing: Option<&Resource>, incoming: Resource) -> Resource;
}

impl<F> MergeStrategy for F
where
    F: Fn(Option<&Resource>, Resource) -> Resource + Send + Sync,
{
    fn merge(&self, existing: Option<&Resource>, incoming: Resource) -> Resource {
        self(existing, incoming)
    }
}

/// Transforms an incoming resource before it is merged.
pub trait Preprocess: Send + Sync {
    /// Return the resource to merge in place of `resource`.
    fn preprocess(&self, resource: Resource) -> Resource;
}

impl<F> Preprocess for F
where
    F: Fn(Resource) -> Resource + Send + Sync,
{
    fn preprocess(&self, resource: Resource) -> Resource {
        self(resource)
    }
}

/// Default strategy: every top-level member present on the incoming
/// resource overwrites the stored member. Absent members are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShallowMerge;

impl MergeStrategy for ShallowMerge {
    fn merge(&self, existing: Option<&Resource>, incoming: Resource) -> Resource {
        let Some(existing) = existing else {
            return incoming;
        };

        let mut merged = existing.clone();
        merged.resource_type = incoming.resource_type;
        merged.id = incoming.id;
        if incoming.attributes.is_some() {
            merged.attributes = incoming.attributes;
        }
        if incoming.relationships.is_some() {
            merged.relationships = incoming.relationships;
        }
        if incoming.links.is_some() {
            merged.links = incoming.links;
        }
        if incoming.meta.is_some() {
            merged.meta = incoming.meta;
        }
        merged.extra.extend(incoming.extra);
        merged
    }
}

/// Recursive strategy: objects are merged key by key, everything else
/// (scalars, arrays, relationship linkage) is replaced by the incoming value.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepMerge;

impl MergeStrategy for DeepMerge {
    fn merge(&self, existing: Option<&Resource>, incoming: Resource) -> Resource {
        match existing {
            Some(existing) => deep_merge_resource(existing.clone(), incoming),
            None => incoming,
        }
    }
}

/// Deep-merge `source` into `target`.
///
/// # Examples
///
/// ```
/// use jsonapi_normalizer::{deep_merge_resource, Resource};
/// use serde_json::json;
///
/// let stored = Resource::new("user", "1").with_attribute("profile", json!({"a": 1}));
/// let incoming = Resource::new("user", "1").with_attribute("profile", json!({"b": 2}));
///
/// let merged = deep_merge_resource(stored, incoming);
/// assert_eq!(merged.attribute("profile"), Some(&json!({"a": 1, "b": 2})));
/// ```
#[must_use]
pub fn deep_merge_resource(mut target: Resource, source: Resource) -> Resource {
    target.resource_type = source.resource_type;
    target.id = source.id;
    target.attributes = merge_maps(target.attributes, source.attributes);
    target.relationships = merge_relationships(target.relationships, source.relationships);
    target.links = merge_values(target.links, source.links);
    target.meta = merge_values(target.meta, source.meta);
    merge_object(&mut target.extra, source.extra);
    target
}

/// Deep-merge two JSON values in place.
pub fn merge_json(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => merge_object(target, source),
        (target, source) => *target = source,
    }
}

fn merge_object(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match target.get_mut(&key) {
            Some(slot) => merge_json(slot, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}

fn merge_maps(
    target: Option<Map<String, Value>>,
    source: Option<Map<String, Value>>,
) -> Option<Map<String, Value>> {
    match (target, source) {
        (Some(mut target), Some(source)) => {
            merge_object(&mut target, source);
            Some(target)
        }
        (target, None) => target,
        (None, source) => source,
    }
}

fn merge_values(target: Option<Value>, source: Option<Value>) -> Option<Value> {
    match (target, source) {
        (Some(mut target), Some(source)) => {
            merge_json(&mut target, source);
            Some(target)
        }
        (target, None) => target,
        (None, source) => source,
    }
}

fn merge_relationships(
    target: Option<BTreeMap<String, Relationship>>,
    source: Option<BTreeMap<String, Relationship>>,
) -> Option<BTreeMap<String, Relationship>> {
    let (mut target, source) = match (target, source) {
        (Some(target), Some(source)) => (target, source),
        (target, None) => return target,
        (None, source) => return source,
    };

    for (name, incoming) in source {
        match target.remove(&name) {
            Some(stored) => {
                let merged = Relationship {
                    data: incoming.data.or(stored.data),
                    links: merge_values(stored.links, incoming.links),
                    meta: merge_values(stored.meta, incoming.meta),
                };
                target.insert(name, merged);
            }
            None => {
                target.insert(name, incoming);
            }
        }
    }
    Some(target)
}
