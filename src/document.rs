//! Documents and document events.

use serde::{Deserialize, Serialize};

use crate::relationship::RelationshipUpdate;
use crate::resource::{Resource, ResourceIdentifier};

/// Primary data of a document: one resource or a homogeneous list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Many(Vec<Resource>),
    One(Resource),
}

impl PrimaryData {
    /// Identifier of the single primary resource, if there is exactly one.
    #[must_use]
    pub fn single_identifier(&self) -> Option<ResourceIdentifier> {
        match self {
            Self::One(resource) => Some(resource.identifier()),
            Self::Many(_) => None,
        }
    }
}

impl From<Resource> for PrimaryData {
    fn from(resource: Resource) -> Self {
        Self::One(resource)
    }
}

impl From<Vec<Resource>> for PrimaryData {
    fn from(resources: Vec<Resource>) -> Self {
        Self::Many(resources)
    }
}

/// A JSON:API top-level document, as produced by the fetch layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Resource>,
}

/// Everything one `apply` call acts on.
///
/// Steps run in field order: included, primary data, delete, links to add,
/// links to remove.
///
/// # Examples
///
/// ```
/// use jsonapi_normalizer::{DocumentEvent, Resource, ResourceIdentifier};
///
/// let event = DocumentEvent::new()
///     .primary(Resource::new("post", "9"))
///     .include(Resource::new("user", "1"))
///     .delete(ResourceIdentifier::new("post", "8"));
///
/// assert_eq!(event.current_resource(), Some(ResourceIdentifier::new("post", "9")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_data: Option<PrimaryData>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<ResourceIdentifier>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relationship_links_to_add: Vec<RelationshipUpdate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relationship_links_to_remove: Vec<RelationshipUpdate>,
}

impl DocumentEvent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Event carrying the primary data and included resources of `document`.
    #[must_use]
    pub fn from_document(document: Document) -> Self {
        Self {
            primary_data: document.data,
            included: document.included,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn primary(mut self, data: impl Into<PrimaryData>) -> Self {
        self.primary_data = Some(data.into());
        self
    }

    #[must_use]
    pub fn include(mut self, resource: Resource) -> Self {
        self.included.push(resource);
        self
    }

    #[must_use]
    pub fn delete(mut self, identifier: ResourceIdentifier) -> Self {
        self.delete = Some(identifier);
        self
    }

    #[must_use]
    pub fn add_links(mut self, update: RelationshipUpdate) -> Self {
        self.relationship_links_to_add.push(update);
        self
    }

    #[must_use]
    pub fn remove_links(mut self, update: RelationshipUpdate) -> Self {
        self.relationship_links_to_remove.push(update);
        self
    }

    /// Identifier that [`LinkTarget::CurrentResource`](crate::LinkTarget::CurrentResource)
    /// resolves to: the single primary resource, if any.
    #[must_use]
    pub fn current_resource(&self) -> Option<ResourceIdentifier> {
        self.primary_data.as_ref()?.single_identifier()
    }
}
