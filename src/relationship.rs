//! Relationship update instructions.
//!
//! A [`RelationshipUpdate`] names an already-stored resource and, per
//! relationship, the identifiers to link or unlink. Updates never create
//! relationships, they only patch ones the stored resource already has.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Cardinality, ValidationError};
use crate::resource::ResourceIdentifier;

/// Wire encoding of [`LinkTarget::CurrentResource`].
pub const RESOURCE_LINKAGE_MARKER: &str = "__jsonapi/resource-linkage";

/// One identifier in a relationship update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLinkTarget", into = "RawLinkTarget")]
pub enum LinkTarget {
    /// An explicit resource.
    Resource(ResourceIdentifier),
    /// The single primary resource carried by the same event.
    CurrentResource,
}

impl LinkTarget {
    /// Resolve to a concrete identifier.
    ///
    /// Returns `None` for `CurrentResource` when there is no current resource.
    #[must_use]
    pub fn resolve(&self, current: Option<&ResourceIdentifier>) -> Option<ResourceIdentifier> {
        match self {
            Self::Resource(id) => Some(id.clone()),
            Self::CurrentResource => current.cloned(),
        }
    }
}

impl From<ResourceIdentifier> for LinkTarget {
    fn from(id: ResourceIdentifier) -> Self {
        Self::Resource(id)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawLinkTarget {
    Marker(String),
    Resource(ResourceIdentifier),
}

impl TryFrom<RawLinkTarget> for LinkTarget {
    type Error = String;

    fn try_from(raw: RawLinkTarget) -> Result<Self, Self::Error> {
        match raw {
            RawLinkTarget::Resource(id) => Ok(Self::Resource(id)),
            RawLinkTarget::Marker(marker) if marker == RESOURCE_LINKAGE_MARKER => {
                Ok(Self::CurrentResource)
            }
            RawLinkTarget::Marker(other) => Err(format!(
                "unknown link marker: {other}. Use a resource identifier or {RESOURCE_LINKAGE_MARKER}"
            )),
        }
    }
}

impl From<LinkTarget> for RawLinkTarget {
    fn from(target: LinkTarget) -> Self {
        match target {
            LinkTarget::Resource(id) => Self::Resource(id),
            LinkTarget::CurrentResource => Self::Marker(RESOURCE_LINKAGE_MARKER.to_string()),
        }
    }
}

/// Update data for one relationship: scalar for to-one, list for to-many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    Many(Vec<LinkTarget>),
    One(LinkTarget),
}

impl Linkage {
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        match self {
            Self::Many(_) => Cardinality::ToMany,
            Self::One(_) => Cardinality::ToOne,
        }
    }
}

impl From<LinkTarget> for Linkage {
    fn from(target: LinkTarget) -> Self {
        Self::One(target)
    }
}

impl From<ResourceIdentifier> for Linkage {
    fn from(id: ResourceIdentifier) -> Self {
        Self::One(LinkTarget::Resource(id))
    }
}

impl From<Vec<LinkTarget>> for Linkage {
    fn from(targets: Vec<LinkTarget>) -> Self {
        Self::Many(targets)
    }
}

impl From<Vec<ResourceIdentifier>> for Linkage {
    fn from(ids: Vec<ResourceIdentifier>) -> Self {
        Self::Many(ids.into_iter().map(LinkTarget::Resource).collect())
    }
}

/// Links to add to, or remove from, relationships of one stored resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipUpdate {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    pub relationships: BTreeMap<String, Linkage>,
}

impl RelationshipUpdate {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> RelationshipUpdateBuilder {
        RelationshipUpdateBuilder::new()
    }

    /// Update for the resource `identifier` points at.
    ///
    /// Returns `None` when `relationships` is empty, so the result can be
    /// passed straight to [`creates_relationship`](crate::creates_relationship).
    #[must_use]
    pub fn for_resource(
        identifier: &ResourceIdentifier,
        relationships: BTreeMap<String, Linkage>,
    ) -> Option<Self> {
        if relationships.is_empty() {
            return None;
        }
        Some(Self {
            resource_type: identifier.resource_type.clone(),
            id: identifier.id.clone(),
            relationships,
        })
    }

    /// Identifier of the resource this update targets.
    #[must_use]
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.resource_type.clone(), self.id.clone())
    }
}

/// Builder for [`RelationshipUpdate`].
///
/// # Example
/// ```
/// use jsonapi_normalizer::{LinkTarget, RelationshipUpdate, ResourceIdentifier};
///
/// let update = RelationshipUpdate::builder()
///     .resource_type("user")
///     .id("1")
///     .link("posts", vec![LinkTarget::CurrentResource])
///     .link("best_friend", ResourceIdentifier::new("user", "2"))
///     .build()
///     .unwrap();
///
/// assert_eq!(update.relationships.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RelationshipUpdateBuilder {
    resource_type: Option<String>,
    id: Option<String>,
    relationships: Option<BTreeMap<String, Linkage>>,
}

impl RelationshipUpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target resource type (required).
    #[must_use]
    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    /// Set the target resource id (required).
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add linkage for one relationship. At least one is required.
    #[must_use]
    pub fn link(mut self, relationship: impl Into<String>, linkage: impl Into<Linkage>) -> Self {
        self.relationships
            .get_or_insert_with(BTreeMap::new)
            .insert(relationship.into(), linkage.into());
        self
    }

    /// Replace all relationship linkage at once.
    #[must_use]
    pub fn relationships(mut self, relationships: BTreeMap<String, Linkage>) -> Self {
        self.relationships = Some(relationships);
        self
    }

    /// Build the update.
    ///
    /// Returns `ValidationError::MissingField` if any field was never set.
    /// Returns `ValidationError::EmptyField` if type or id is blank.
    pub fn build(self) -> Result<RelationshipUpdate, ValidationError> {
        let resource_type = self
            .resource_type
            .ok_or_else(|| ValidationError::MissingField {
                field: "type".to_string(),
            })?;
        if resource_type.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "type".to_string(),
            });
        }

        let id = self.id.ok_or_else(|| ValidationError::MissingField {
            field: "id".to_string(),
        })?;
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "id".to_string(),
            });
        }

        let relationships = self
            .relationships
            .ok_or_else(|| ValidationError::MissingField {
                field: "relationships".to_string(),
            })?;

        Ok(RelationshipUpdate {
            resource_type,
            id,
            relationships,
        })
    }
}

/// Build a [`RelationshipUpdate`] from its three required parts.
pub fn define_relationship<I, K, L>(
    resource_type: impl Into<String>,
    id: impl Into<String>,
    relationships: I,
) -> Result<RelationshipUpdate, ValidationError>
where
    I: IntoIterator<Item = (K, L)>,
    K: Into<String>,
    L: Into<Linkage>,
{
    let relationships = relationships
        .into_iter()
        .map(|(name, linkage)| (name.into(), linkage.into()))
        .collect();
    RelationshipUpdateBuilder::new()
        .resource_type(resource_type)
        .id(id)
        .relationships(relationships)
        .build()
}
