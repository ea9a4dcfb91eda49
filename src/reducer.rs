//! The normalizer/merger.
//!
//! [`apply`] folds one [`DocumentEvent`] into a store snapshot and returns
//! the next snapshot. Steps run in a fixed order:
//!
//! 1. included resources are merged,
//! 2. primary data is merged,
//! 3. the deleted resource is removed,
//! 4. relationship links are added,
//! 5. relationship links are removed.
//!
//! Key invariants:
//! - The input snapshot is never modified. On error it is still the valid
//!   current state.
//! - Unconfigured types are never written or deleted.
//! - A relationship keeps the cardinality it was first stored with.

use tracing::{debug, trace};

use crate::action::{self, Action, Meta};
use crate::config::{MergeConfig, ResourceConfig};
use crate::document::{DocumentEvent, PrimaryData};
use crate::error::ReduceError;
use crate::relationship::{Linkage, RelationshipUpdate};
use crate::resource::{RelationshipData, Resource, ResourceIdentifier};
use crate::store::Store;

/// Apply one document event to `store` and return the next snapshot.
///
/// Buckets and resources the event does not touch are shared with `store`.
///
/// Types configured with a `target` are deleted and patched in that target
/// bucket, the same bucket they are inserted into. Deleting or linking an
/// aliased `people` resource therefore acts on the `user` bucket when
/// `people` targets `user`.
///
/// # Errors
/// - `UnknownRelationship`: an update names a relationship the stored
///   resource does not declare.
/// - `CardinalityMismatch`: list data for a to-one relationship, or scalar
///   data for a to-many relationship.
/// - `NoCurrentResource`: an update links the current resource but the
///   event has no single primary resource.
///
/// # Examples
///
/// ```
/// use jsonapi_normalizer::{apply, DocumentEvent, MergeConfig, Resource, ResourceConfig, Store};
///
/// let config = MergeConfig::new().with_type("user", ResourceConfig::new());
/// let user = Resource::new("user", "1").with_attribute("name", "A");
/// let event = DocumentEvent::new().primary(user);
///
/// let store = apply(&Store::new(), &event, &config).unwrap();
/// assert!(store.contains("user", "1"));
/// ```
pub fn apply(
    store: &Store,
    event: &DocumentEvent,
    config: &MergeConfig,
) -> Result<Store, ReduceError> {
    let mut next = store.clone();

    for resource in &event.included {
        insert_resource(&mut next, config.resolve(&resource.resource_type), resource);
    }

    match &event.primary_data {
        Some(PrimaryData::Many(resources)) => insert_resource_list(&mut next, config, resources),
        Some(PrimaryData::One(resource)) => {
            insert_resource(&mut next, config.resolve(&resource.resource_type), resource);
        }
        None => {}
    }

    if let Some(identifier) = &event.delete {
        delete_resource(&mut next, config, identifier);
    }

    let current = event.current_resource();

    for update in &event.relationship_links_to_add {
        patch_relationships(&mut next, config, update, current.as_ref(), add_links)?;
    }

    for update in &event.relationship_links_to_remove {
        patch_relationships(&mut next, config, update, current.as_ref(), remove_links)?;
    }

    debug!(
        included = event.included.len(),
        deleted = event.delete.is_some(),
        links_added = event.relationship_links_to_add.len(),
        links_removed = event.relationship_links_to_remove.len(),
        "applied document event"
    );

    Ok(next)
}

fn insert_resource(store: &mut Store, config: Option<&ResourceConfig>, resource: &Resource) {
    let Some(config) = config else {
        trace!(
            resource_type = %resource.resource_type,
            id = %resource.id,
            "skipping unconfigured type"
        );
        return;
    };

    let bucket = config.bucket_for(&resource.resource_type);
    store.upsert_with(bucket, &resource.id, |existing| {
        config.merge(existing, resource.clone())
    });
}

/// Every element shares the bucket and config resolved from the first one.
fn insert_resource_list(store: &mut Store, config: &MergeConfig, resources: &[Resource]) {
    let Some(first) = resources.first() else {
        return;
    };
    let Some(resource_config) = config.resolve(&first.resource_type) else {
        trace!(
            resource_type = %first.resource_type,
            count = resources.len(),
            "skipping unconfigured list"
        );
        return;
    };

    let bucket = resource_config.bucket_for(&first.resource_type);
    for resource in resources {
        store.upsert_with(bucket, &resource.id, |existing| {
            resource_config.merge(existing, resource.clone())
        });
    }
}

fn delete_resource(store: &mut Store, config: &MergeConfig, identifier: &ResourceIdentifier) {
    let Some(resource_config) = config.resolve(&identifier.resource_type) else {
        trace!(resource = %identifier, "ignoring delete of unconfigured type");
        return;
    };
    let bucket = resource_config.bucket_for(&identifier.resource_type);
    if store.remove(bucket, &identifier.id).is_none() {
        trace!(resource = %identifier, "delete target not stored");
    }
}

/// Update data with every link target resolved.
enum ResolvedLinkage {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

fn add_links(data: &mut RelationshipData, linkage: ResolvedLinkage) {
    match (data, linkage) {
        (RelationshipData::ToMany(existing), ResolvedLinkage::Many(added)) => {
            existing.extend(added);
        }
        (data, ResolvedLinkage::One(id)) => *data = RelationshipData::ToOne(Some(id)),
        (data, ResolvedLinkage::Many(ids)) => *data = RelationshipData::ToMany(ids),
    }
}

/// To-one relationships are cleared whether or not the stored link matches.
fn remove_links(data: &mut RelationshipData, linkage: ResolvedLinkage) {
    match (data, linkage) {
        (RelationshipData::ToMany(existing), ResolvedLinkage::Many(removed)) => {
            existing.retain(|link| !removed.iter().any(|r| r.matches(link)));
        }
        (data, _) => *data = RelationshipData::ToOne(None),
    }
}

fn resolve_linkage(
    relationship: &str,
    linkage: &Linkage,
    current: Option<&ResourceIdentifier>,
) -> Result<ResolvedLinkage, ReduceError> {
    let no_current = || ReduceError::NoCurrentResource {
        relationship: relationship.to_string(),
    };
    match linkage {
        Linkage::One(target) => target
            .resolve(current)
            .map(ResolvedLinkage::One)
            .ok_or_else(no_current),
        Linkage::Many(targets) => targets
            .iter()
            .map(|target| target.resolve(current).ok_or_else(no_current))
            .collect::<Result<Vec<_>, _>>()
            .map(ResolvedLinkage::Many),
    }
}

fn patch_relationships<F>(
    store: &mut Store,
    config: &MergeConfig,
    update: &RelationshipUpdate,
    current: Option<&ResourceIdentifier>,
    patch: F,
) -> Result<(), ReduceError>
where
    F: Fn(&mut RelationshipData, ResolvedLinkage),
{
    let Some(resource_config) = config.resolve(&update.resource_type) else {
        trace!(
            resource_type = %update.resource_type,
            "ignoring relationship update for unconfigured type"
        );
        return Ok(());
    };
    let bucket = resource_config.bucket_for(&update.resource_type);
    let Some(stored) = store.get(bucket, &update.id) else {
        trace!(resource = %update.identifier(), "relationship update target not stored");
        return Ok(());
    };

    // Validate every relationship before writing so the copy stays untouched on error.
    let mut resolved = Vec::with_capacity(update.relationships.len());
    for (name, linkage) in &update.relationships {
        let Some(relationship) = stored.relationship(name) else {
            return Err(ReduceError::UnknownRelationship {
                resource_type: update.resource_type.clone(),
                id: update.id.clone(),
                relationship: name.clone(),
            });
        };

        let expected = relationship.cardinality();
        if linkage.cardinality() != expected {
            return Err(ReduceError::CardinalityMismatch {
                resource_type: update.resource_type.clone(),
                id: update.id.clone(),
                relationship: name.clone(),
                expected,
            });
        }

        resolved.push((name, resolve_linkage(name, linkage, current)?));
    }

    if resolved.is_empty() {
        return Ok(());
    }

    let Some(resource) = store.get_mut(bucket, &update.id) else {
        return Ok(());
    };
    let Some(relationships) = resource.relationships.as_mut() else {
        return Ok(());
    };
    for (name, linkage) in resolved {
        if let Some(relationship) = relationships.get_mut(name) {
            // Absent data is treated as to-one null.
            let data = relationship.data.get_or_insert_with(RelationshipData::default);
            patch(data, linkage);
        }
    }
    Ok(())
}

/// A reducer bound to a scope id and a merge configuration.
///
/// # Examples
///
/// ```
/// use jsonapi_normalizer::{
///     Action, Document, JsonApiReducer, MergeConfig, Resource, ResourceConfig, Store,
/// };
///
/// let config = MergeConfig::new().with_type("user", ResourceConfig::new());
/// let reducer = JsonApiReducer::new("users", config);
/// let action = Action::new("users/read")
///     .payload(Document { data: Some(Resource::new("user", "1").into()), included: vec![] })
///     .meta(reducer.updates_resources());
///
/// let store = reducer.reduce(&Store::new(), &action).unwrap();
/// assert!(store.contains("user", "1"));
/// ```
#[derive(Debug, Clone)]
pub struct JsonApiReducer {
    id: String,
    config: MergeConfig,
}

impl JsonApiReducer {
    pub fn new(id: impl Into<String>, config: MergeConfig) -> Self {
        Self {
            id: id.into(),
            config,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Returns true if `action` is addressed to this reducer and is not an error.
    #[must_use]
    pub fn handles(&self, action: &Action) -> bool {
        !action.error && action.meta.scope.as_deref() == Some(self.id.as_str())
    }

    /// Reduce an action. Actions this reducer does not handle leave the store unchanged.
    pub fn reduce(&self, store: &Store, action: &Action) -> Result<Store, ReduceError> {
        if !self.handles(action) {
            trace!(reducer = %self.id, kind = %action.kind, "action not addressed to reducer");
            return Ok(store.clone());
        }
        self.apply(store, &action.event())
    }

    /// Apply a document event with this reducer's configuration.
    pub fn apply(&self, store: &Store, event: &DocumentEvent) -> Result<Store, ReduceError> {
        apply(store, event, &self.config)
    }

    /// Scope tag addressing this reducer.
    #[must_use]
    pub fn updates_resources(&self) -> Meta {
        action::updates_resources(self.id.clone())
    }

    /// Scope tag addressing this reducer that also deletes `identifier`.
    #[must_use]
    pub fn deletes_resource(&self, identifier: ResourceIdentifier) -> Meta {
        action::deletes_resource(self.id.clone(), identifier)
    }
}
